use crate::result::{CachePolicy, result_cached, result_created, result_data, result_msg};
use actix_web::{Responder, delete, get, post, put, web};
use biz_service::biz_service::college_service::{CollegePayload, CollegeQuery, CollegeService};
use common::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(college_list)
        .service(college_detail)
        .service(college_create)
        .service(college_update)
        .service(admin_college_list)
        .service(admin_college_get)
        .service(admin_college_create)
        .service(admin_college_update)
        .service(admin_college_delete);
}

#[utoipa::path(
    get,
    path = "/colleges",
    params(CollegeQuery),
    tag = "Colleges",
    summary = "Search active colleges",
    description = "Filters intersect. Ordered by ranking ascending then name; unranked colleges come after every ranked one. A page past the end returns an empty list.",
    responses(
        (status = 200, description = "{colleges, total, page, limit, totalPages, hasNext}"),
        (status = 400, description = "Unknown category")
    )
)]
#[get("/colleges")]
pub async fn college_list(
    service: web::Data<CollegeService>,
    query: web::Query<CollegeQuery>,
) -> Result<impl Responder, AppError> {
    let page = service.search(&query, false).await?;
    Ok(result_cached("Colleges fetched successfully", page.to_data("colleges")?, CachePolicy::COLLEGES))
}

#[utoipa::path(
    get,
    path = "/colleges/{slug}",
    params(("slug" = String, Path, description = "College slug")),
    tag = "Colleges",
    responses(
        (status = 200, description = "College with its country expanded"),
        (status = 404, description = "Missing or inactive")
    )
)]
#[get("/colleges/{slug}")]
pub async fn college_detail(
    service: web::Data<CollegeService>,
    slug: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let college = service.find_active_by_slug(&slug).await?;
    Ok(result_cached("College fetched successfully", college, CachePolicy::COLLEGES))
}

#[utoipa::path(
    post,
    path = "/colleges",
    request_body = CollegePayload,
    tag = "Colleges",
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Slug already taken")
    )
)]
#[post("/colleges")]
pub async fn college_create(
    service: web::Data<CollegeService>,
    payload: web::Json<CollegePayload>,
) -> Result<impl Responder, AppError> {
    let college = service.create(payload.into_inner()).await?;
    Ok(result_created("College created successfully", college))
}

#[utoipa::path(
    put,
    path = "/colleges/{id}",
    params(("id" = String, Path, description = "College id")),
    request_body = CollegePayload,
    tag = "Colleges",
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Not found")
    )
)]
#[put("/colleges/{id}")]
pub async fn college_update(
    service: web::Data<CollegeService>,
    id: web::Path<String>,
    payload: web::Json<CollegePayload>,
) -> Result<impl Responder, AppError> {
    let college = service.update(&id, payload.into_inner()).await?;
    Ok(result_data("College updated successfully", college))
}

#[utoipa::path(
    get,
    path = "/admin/colleges",
    params(CollegeQuery),
    tag = "Admin Colleges",
    responses((status = 200, description = "Colleges including inactive ones"))
)]
#[get("/admin/colleges")]
pub async fn admin_college_list(
    service: web::Data<CollegeService>,
    query: web::Query<CollegeQuery>,
) -> Result<impl Responder, AppError> {
    let page = service.search(&query, true).await?;
    Ok(result_data("Colleges fetched successfully", page.to_data("colleges")?))
}

#[utoipa::path(
    get,
    path = "/admin/colleges/{id}",
    params(("id" = String, Path, description = "College id")),
    tag = "Admin Colleges",
    responses((status = 200, description = "College"), (status = 404, description = "Not found"))
)]
#[get("/admin/colleges/{id}")]
pub async fn admin_college_get(
    service: web::Data<CollegeService>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    Ok(result_data("College fetched successfully", service.find_by_id(&id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/colleges",
    request_body = CollegePayload,
    tag = "Admin Colleges",
    responses((status = 201, description = "Created"), (status = 409, description = "Slug already taken"))
)]
#[post("/admin/colleges")]
pub async fn admin_college_create(
    service: web::Data<CollegeService>,
    payload: web::Json<CollegePayload>,
) -> Result<impl Responder, AppError> {
    let college = service.create(payload.into_inner()).await?;
    Ok(result_created("College created successfully", college))
}

#[utoipa::path(
    put,
    path = "/admin/colleges/{id}",
    params(("id" = String, Path, description = "College id")),
    request_body = CollegePayload,
    tag = "Admin Colleges",
    responses((status = 200, description = "Updated"), (status = 404, description = "Not found"))
)]
#[put("/admin/colleges/{id}")]
pub async fn admin_college_update(
    service: web::Data<CollegeService>,
    id: web::Path<String>,
    payload: web::Json<CollegePayload>,
) -> Result<impl Responder, AppError> {
    let college = service.update(&id, payload.into_inner()).await?;
    Ok(result_data("College updated successfully", college))
}

#[utoipa::path(
    delete,
    path = "/admin/colleges/{id}",
    params(("id" = String, Path, description = "College id")),
    tag = "Admin Colleges",
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found"))
)]
#[delete("/admin/colleges/{id}")]
pub async fn admin_college_delete(
    service: web::Data<CollegeService>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    service.delete(&id).await?;
    Ok(result_msg("College deleted successfully"))
}
