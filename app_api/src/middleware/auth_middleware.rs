use actix_service::{Service, Transform};
use actix_web::http::Method;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    web,
};
use biz_service::biz_service::auth_service::AuthService;
use biz_service::biz_service::role_service::RoleService;
use common::errors::AppError;
use futures_util::future::{LocalBoxFuture, Ready, ok};
use log::warn;
use std::rc::Rc;
use std::task::{Context, Poll};

pub const TOKEN_COOKIE: &str = "admin_token";

/// 请求所需的访问级别
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    /// `resource:action`
    Permission(String),
}

/// 由 method + path 推导访问级别；`/admin` 之后的第一段是资源，GET 为 read，其余为 write
pub fn required_access(method: &Method, path: &str) -> Access {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let action = if *method == Method::GET || *method == Method::HEAD { "read" } else { "write" };

    match segments.as_slice() {
        ["admin", "login"] | ["admin", "logout"] => Access::Public,
        ["admin"] | ["admin", "me"] => Access::Authenticated,
        ["admin", resource, ..] => Access::Permission(format!("{resource}:{action}")),
        _ if action == "read" || *method == Method::OPTIONS => Access::Public,
        ["send"] if *method == Method::POST => Access::Public,
        // 公开的分类删除只做软删除
        ["categories"] if *method == Method::DELETE => Access::Public,
        [resource, ..] => Access::Permission(format!("{resource}:write")),
        [] => Access::Public,
    }
}

/// Bearer 头优先，其次 `admin_token` cookie
fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(value) = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }
    req.cookie(TOKEN_COOKIE).map(|c| c.value().to_string())
}

/// 后台鉴权中间件：校验 token 并按角色权限放行
pub struct AuthMiddleware {
    pub auth: web::Data<AuthService>,
    pub role: web::Data<RoleService>,
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService { service: Rc::new(service), auth: self.auth.clone(), role: self.role.clone() })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    auth: web::Data<AuthService>,
    role: web::Data<RoleService>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let auth = self.auth.clone();
        let role = self.role.clone();

        Box::pin(async move {
            let access = required_access(req.method(), req.path());
            if access == Access::Public {
                return srv.call(req).await.map(ServiceResponse::map_into_left_body);
            }

            let session = extract_token(&req).and_then(|token| auth.verify(&token));
            let Some(session) = session else {
                let err = AppError::Unauthorized("Authentication required".to_string());
                return Ok(req.into_response(err.error_response()).map_into_right_body());
            };

            if let Access::Permission(permission) = &access {
                let allowed = match role.is_allowed(&session.role, permission).await {
                    Ok(allowed) => allowed,
                    Err(err) => return Ok(req.into_response(err.error_response()).map_into_right_body()),
                };
                if !allowed {
                    warn!("{} ({}) denied {} {}", session.username, session.role, req.method(), req.path());
                    let err = AppError::Forbidden(format!("Missing permission '{permission}'"));
                    return Ok(req.into_response(err.error_response()).map_into_right_body());
                }
            }

            req.extensions_mut().insert(session);
            srv.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}
