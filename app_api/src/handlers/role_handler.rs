use crate::result::{result_created, result_data, result_msg};
use actix_web::{Responder, delete, get, post, put, web};
use biz_service::biz_service::role_service::{RoleRequest, RoleService};
use biz_service::entitys::role_entity::RoleEntity;
use common::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(role_list).service(role_create).service(role_update).service(role_delete);
}

#[utoipa::path(
    get,
    path = "/admin/roles",
    tag = "Admin Roles",
    responses((status = 200, description = "Builtin and custom roles", body = [RoleEntity]))
)]
#[get("/admin/roles")]
pub async fn role_list(service: web::Data<RoleService>) -> Result<impl Responder, AppError> {
    Ok(result_data("Roles fetched successfully", service.list().await?))
}

#[utoipa::path(
    post,
    path = "/admin/roles",
    request_body = RoleRequest,
    tag = "Admin Roles",
    responses(
        (status = 201, description = "Created", body = RoleEntity),
        (status = 400, description = "Invalid code or permission"),
        (status = 409, description = "Code already taken")
    )
)]
#[post("/admin/roles")]
pub async fn role_create(service: web::Data<RoleService>, request: web::Json<RoleRequest>) -> Result<impl Responder, AppError> {
    let role = service.create(request.into_inner()).await?;
    Ok(result_created("Role created successfully", role))
}

#[utoipa::path(
    put,
    path = "/admin/roles/{code}",
    params(("code" = String, Path, description = "Role code")),
    request_body = RoleRequest,
    tag = "Admin Roles",
    responses(
        (status = 200, description = "Updated", body = RoleEntity),
        (status = 403, description = "Builtin roles are read-only"),
        (status = 404, description = "Not found")
    )
)]
#[put("/admin/roles/{code}")]
pub async fn role_update(
    service: web::Data<RoleService>,
    code: web::Path<String>,
    request: web::Json<RoleRequest>,
) -> Result<impl Responder, AppError> {
    let role = service.update(&code, request.into_inner()).await?;
    Ok(result_data("Role updated successfully", role))
}

#[utoipa::path(
    delete,
    path = "/admin/roles/{code}",
    params(("code" = String, Path, description = "Role code")),
    tag = "Admin Roles",
    responses((status = 200, description = "Deleted"), (status = 403, description = "Builtin roles are read-only"))
)]
#[delete("/admin/roles/{code}")]
pub async fn role_delete(service: web::Data<RoleService>, code: web::Path<String>) -> Result<impl Responder, AppError> {
    service.delete(&code).await?;
    Ok(result_msg("Role deleted successfully"))
}
