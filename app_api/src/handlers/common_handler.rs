use crate::result::result_msg;
use actix_web::{Responder, get, web};
use common::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(status);
}

#[utoipa::path(
    get,
    path = "/status",
    tag = "Common",
    summary = "Liveness probe",
    responses(
        (status = 200, description = "Service is up")
    )
)]
#[get("/status")]
pub async fn status() -> Result<impl Responder, AppError> {
    Ok(result_msg("OK"))
}
