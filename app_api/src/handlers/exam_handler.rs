use crate::result::{CachePolicy, result_cached, result_created, result_data, result_msg};
use actix_web::{Responder, delete, get, post, put, web};
use biz_service::biz_service::exam_service::{ExamPayload, ExamQuery, ExamService};
use biz_service::entitys::exam_entity::ExamEntity;
use common::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(exam_list)
        .service(exam_detail)
        .service(admin_exam_list)
        .service(admin_exam_get)
        .service(admin_exam_create)
        .service(admin_exam_update)
        .service(admin_exam_delete);
}

#[utoipa::path(
    get,
    path = "/exams",
    params(ExamQuery),
    tag = "Exams",
    summary = "Search active exams",
    responses((status = 200, description = "{exams, total, page, limit, totalPages, hasNext}"))
)]
#[get("/exams")]
pub async fn exam_list(service: web::Data<ExamService>, query: web::Query<ExamQuery>) -> Result<impl Responder, AppError> {
    let page = service.search(&query, false).await?;
    Ok(result_cached("Exams fetched successfully", page.to_data("exams")?, CachePolicy::EXAMS))
}

#[utoipa::path(
    get,
    path = "/exams/{slug}",
    params(("slug" = String, Path, description = "Exam slug")),
    tag = "Exams",
    responses((status = 200, description = "Exam", body = ExamEntity), (status = 404, description = "Missing or inactive"))
)]
#[get("/exams/{slug}")]
pub async fn exam_detail(service: web::Data<ExamService>, slug: web::Path<String>) -> Result<impl Responder, AppError> {
    let exam = service.find_active_by_slug(&slug).await?;
    Ok(result_cached("Exam fetched successfully", exam, CachePolicy::EXAMS))
}

#[utoipa::path(
    get,
    path = "/admin/exams",
    params(ExamQuery),
    tag = "Admin Exams",
    responses((status = 200, description = "Exams including inactive ones"))
)]
#[get("/admin/exams")]
pub async fn admin_exam_list(
    service: web::Data<ExamService>,
    query: web::Query<ExamQuery>,
) -> Result<impl Responder, AppError> {
    let page = service.search(&query, true).await?;
    Ok(result_data("Exams fetched successfully", page.to_data("exams")?))
}

#[utoipa::path(
    get,
    path = "/admin/exams/{id}",
    params(("id" = String, Path, description = "Exam id")),
    tag = "Admin Exams",
    responses((status = 200, description = "Exam", body = ExamEntity), (status = 404, description = "Not found"))
)]
#[get("/admin/exams/{id}")]
pub async fn admin_exam_get(service: web::Data<ExamService>, id: web::Path<String>) -> Result<impl Responder, AppError> {
    Ok(result_data("Exam fetched successfully", service.find_by_id(&id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/exams",
    request_body = ExamPayload,
    tag = "Admin Exams",
    responses(
        (status = 201, description = "Created", body = ExamEntity),
        (status = 400, description = "Missing sections or invalid nested fields"),
        (status = 409, description = "Slug already taken")
    )
)]
#[post("/admin/exams")]
pub async fn admin_exam_create(
    service: web::Data<ExamService>,
    payload: web::Json<ExamPayload>,
) -> Result<impl Responder, AppError> {
    let exam = service.create(payload.into_inner()).await?;
    Ok(result_created("Exam created successfully", exam))
}

#[utoipa::path(
    put,
    path = "/admin/exams/{id}",
    params(("id" = String, Path, description = "Exam id")),
    request_body = ExamPayload,
    tag = "Admin Exams",
    responses((status = 200, description = "Updated", body = ExamEntity), (status = 404, description = "Not found"))
)]
#[put("/admin/exams/{id}")]
pub async fn admin_exam_update(
    service: web::Data<ExamService>,
    id: web::Path<String>,
    payload: web::Json<ExamPayload>,
) -> Result<impl Responder, AppError> {
    let exam = service.update(&id, payload.into_inner()).await?;
    Ok(result_data("Exam updated successfully", exam))
}

#[utoipa::path(
    delete,
    path = "/admin/exams/{id}",
    params(("id" = String, Path, description = "Exam id")),
    tag = "Admin Exams",
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found"))
)]
#[delete("/admin/exams/{id}")]
pub async fn admin_exam_delete(service: web::Data<ExamService>, id: web::Path<String>) -> Result<impl Responder, AppError> {
    service.delete(&id).await?;
    Ok(result_msg("Exam deleted successfully"))
}
