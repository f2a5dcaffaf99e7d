use crate::result::{CachePolicy, result_cached, result_created, result_data, result_msg};
use actix_web::{Responder, delete, get, post, put, web};
use biz_service::biz_service::category_service::{CategoryPayload, CategoryService};
use biz_service::entitys::category_entity::CategoryEntity;
use common::errors::AppError;
use serde::Deserialize;
use utoipa::IntoParams;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(category_list)
        .service(category_detail)
        .service(category_soft_delete)
        .service(admin_category_list)
        .service(admin_category_create)
        .service(admin_category_get)
        .service(admin_category_update)
        .service(admin_category_delete);
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlugQuery {
    pub slug: Option<String>,
}

impl SlugQuery {
    fn required(&self) -> Result<&str, AppError> {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => Ok(slug),
            _ => Err(AppError::missing_fields(&["slug"])),
        }
    }
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    responses((status = 200, description = "Active categories", body = [CategoryEntity]))
)]
#[get("/categories")]
pub async fn category_list(service: web::Data<CategoryService>) -> Result<impl Responder, AppError> {
    let categories = service.list(false).await?;
    Ok(result_cached("Categories fetched successfully", categories, CachePolicy::CATEGORIES))
}

#[utoipa::path(
    get,
    path = "/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    tag = "Categories",
    responses((status = 200, description = "Category", body = CategoryEntity), (status = 404, description = "Missing or inactive"))
)]
#[get("/categories/{slug}")]
pub async fn category_detail(
    service: web::Data<CategoryService>,
    slug: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let category = service.find_active_by_slug(&slug).await?;
    Ok(result_cached("Category fetched successfully", category, CachePolicy::CATEGORIES))
}

/// 公共删除只隐藏分类
#[utoipa::path(
    delete,
    path = "/categories",
    params(SlugQuery),
    tag = "Categories",
    responses((status = 200, description = "Category deactivated"), (status = 404, description = "Not found"))
)]
#[delete("/categories")]
pub async fn category_soft_delete(
    service: web::Data<CategoryService>,
    query: web::Query<SlugQuery>,
) -> Result<impl Responder, AppError> {
    service.soft_delete(query.required()?).await?;
    Ok(result_msg("Category deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/admin/categories",
    tag = "Admin Categories",
    responses((status = 200, description = "All categories", body = [CategoryEntity]))
)]
#[get("/admin/categories")]
pub async fn admin_category_list(service: web::Data<CategoryService>) -> Result<impl Responder, AppError> {
    Ok(result_data("Categories fetched successfully", service.list(true).await?))
}

#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CategoryPayload,
    tag = "Admin Categories",
    responses((status = 201, description = "Created", body = CategoryEntity), (status = 409, description = "Slug already taken"))
)]
#[post("/admin/categories")]
pub async fn admin_category_create(
    service: web::Data<CategoryService>,
    payload: web::Json<CategoryPayload>,
) -> Result<impl Responder, AppError> {
    let category = service.create(payload.into_inner()).await?;
    Ok(result_created("Category created successfully", category))
}

#[utoipa::path(
    get,
    path = "/admin/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    tag = "Admin Categories",
    responses((status = 200, description = "Category, active or not", body = CategoryEntity), (status = 404, description = "Not found"))
)]
#[get("/admin/categories/{id}")]
pub async fn admin_category_get(
    service: web::Data<CategoryService>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    Ok(result_data("Category fetched successfully", service.find_by_id(&id).await?))
}

#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    request_body = CategoryPayload,
    tag = "Admin Categories",
    responses((status = 200, description = "Updated", body = CategoryEntity), (status = 404, description = "Not found"))
)]
#[put("/admin/categories/{id}")]
pub async fn admin_category_update(
    service: web::Data<CategoryService>,
    id: web::Path<String>,
    payload: web::Json<CategoryPayload>,
) -> Result<impl Responder, AppError> {
    let category = service.update(&id, payload.into_inner()).await?;
    Ok(result_data("Category updated successfully", category))
}

#[utoipa::path(
    delete,
    path = "/admin/categories",
    params(SlugQuery),
    tag = "Admin Categories",
    responses((status = 200, description = "Category removed"), (status = 404, description = "Not found"))
)]
#[delete("/admin/categories")]
pub async fn admin_category_delete(
    service: web::Data<CategoryService>,
    query: web::Query<SlugQuery>,
) -> Result<impl Responder, AppError> {
    service.hard_delete(query.required()?).await?;
    Ok(result_msg("Category deleted successfully"))
}
