pub mod handlers;
pub mod middleware;
pub mod result;

#[cfg(test)]
mod api_tests;

use actix_web::web;
use biz_service::BizServices;
use common::errors::AppError;

/// 注册业务服务、请求体解析错误处理与全部路由
pub fn configure_app(cfg: &mut web::ServiceConfig, services: BizServices) {
    biz_service::configure(cfg, services);
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation(format!("Invalid request body: {err}")).into()),
    );
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(format!("Invalid query string: {err}")).into()),
    );
    cfg.app_data(
        web::PathConfig::default().error_handler(|err, _req| AppError::validation(format!("Invalid path: {err}")).into()),
    );
    handlers::configure(cfg);
}
