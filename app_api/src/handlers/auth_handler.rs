use crate::middleware::auth_middleware::TOKEN_COOKIE;
use crate::result::ApiResponse;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpResponse, Responder, get, post, web};
use biz_service::biz_service::auth_service::{AdminSession, AuthService, LoginRequest, LoginResult};
use biz_service::biz_service::role_service::RoleService;
use common::errors::AppError;
use log::info;
use serde::Serialize;
use utoipa::ToSchema;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(admin_login).service(admin_logout).service(admin_me);
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    #[serde(flatten)]
    pub session: AdminSession,
    pub permissions: Vec<String>,
}

fn token_cookie(value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    tag = "Admin Auth",
    summary = "Admin login; the token is also set as an HttpOnly cookie",
    responses(
        (status = 200, description = "Logged in", body = LoginResult),
        (status = 401, description = "Invalid username or password")
    )
)]
#[post("/admin/login")]
pub async fn admin_login(
    service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let result = service.login(&request)?;
    info!("admin {} logged in", result.session.username);
    let cookie = token_cookie(result.token.clone(), service.token_ttl_secs());
    Ok(HttpResponse::Ok().cookie(cookie).json(ApiResponse::data("Login successful", result)))
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    tag = "Admin Auth",
    responses((status = 200, description = "Cookie cleared"))
)]
#[post("/admin/logout")]
pub async fn admin_logout() -> Result<impl Responder, AppError> {
    let cookie = token_cookie(String::new(), 0);
    Ok(HttpResponse::Ok().cookie(cookie).json(ApiResponse::message("Logout successful")))
}

#[utoipa::path(
    get,
    path = "/admin/me",
    tag = "Admin Auth",
    responses((status = 200, description = "Current session", body = MeResponse), (status = 401, description = "Not logged in"))
)]
#[get("/admin/me")]
pub async fn admin_me(
    session: web::ReqData<AdminSession>,
    roles: web::Data<RoleService>,
) -> Result<impl Responder, AppError> {
    let session = session.into_inner();
    let permissions = roles.permissions_for(&session.role).await?.as_ref().clone();
    Ok(HttpResponse::Ok().json(ApiResponse::data("Session fetched successfully", MeResponse { session, permissions })))
}
