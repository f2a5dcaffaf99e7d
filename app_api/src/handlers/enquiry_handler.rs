use crate::result::{result_created, result_data, result_msg};
use actix_web::{Responder, delete, get, post, put, web};
use biz_service::biz_service::enquiry_service::{
    CreateEnquiryRequest, EnquiryPatch, EnquiryQuery, EnquiryService, SendEnquiryRequest, SubmitOutcome,
};
use biz_service::entitys::enquiry_entity::EnquiryEntity;
use common::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(enquiry_send)
        .service(admin_enquiry_list)
        .service(admin_enquiry_get)
        .service(admin_enquiry_create)
        .service(admin_enquiry_update)
        .service(admin_enquiry_delete);
}

/// 官网咨询表单；通知失败不影响提交结果
#[utoipa::path(
    post,
    path = "/send",
    request_body = SendEnquiryRequest,
    tag = "Enquiries",
    summary = "Submit a public enquiry",
    responses(
        (status = 200, description = "Enquiry stored; emailSent reports the notification outcome", body = SubmitOutcome),
        (status = 400, description = "Missing fields or invalid email")
    )
)]
#[post("/send")]
pub async fn enquiry_send(
    service: web::Data<EnquiryService>,
    request: web::Json<SendEnquiryRequest>,
) -> Result<impl Responder, AppError> {
    let outcome = service.submit(request.into_inner()).await?;
    Ok(result_data("Enquiry submitted successfully", outcome))
}

#[utoipa::path(
    get,
    path = "/admin/enquiries",
    params(EnquiryQuery),
    tag = "Admin Enquiries",
    responses(
        (status = 200, description = "{enquiries, total, page, limit, totalPages, hasNext}"),
        (status = 400, description = "Unknown status, priority or source")
    )
)]
#[get("/admin/enquiries")]
pub async fn admin_enquiry_list(
    service: web::Data<EnquiryService>,
    query: web::Query<EnquiryQuery>,
) -> Result<impl Responder, AppError> {
    let page = service.search(&query).await?;
    Ok(result_data("Enquiries fetched successfully", page.to_data("enquiries")?))
}

#[utoipa::path(
    get,
    path = "/admin/enquiries/{id}",
    params(("id" = String, Path, description = "Enquiry id")),
    tag = "Admin Enquiries",
    responses((status = 200, description = "Enquiry", body = EnquiryEntity), (status = 404, description = "Not found"))
)]
#[get("/admin/enquiries/{id}")]
pub async fn admin_enquiry_get(
    service: web::Data<EnquiryService>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    Ok(result_data("Enquiry fetched successfully", service.find_by_id(&id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/enquiries",
    request_body = CreateEnquiryRequest,
    tag = "Admin Enquiries",
    responses((status = 201, description = "Created", body = EnquiryEntity), (status = 400, description = "Validation failed"))
)]
#[post("/admin/enquiries")]
pub async fn admin_enquiry_create(
    service: web::Data<EnquiryService>,
    request: web::Json<CreateEnquiryRequest>,
) -> Result<impl Responder, AppError> {
    let enquiry = service.create(request.into_inner()).await?;
    Ok(result_created("Enquiry created successfully", enquiry))
}

#[utoipa::path(
    put,
    path = "/admin/enquiries/{id}",
    params(("id" = String, Path, description = "Enquiry id")),
    request_body = EnquiryPatch,
    tag = "Admin Enquiries",
    responses(
        (status = 200, description = "Updated", body = EnquiryEntity),
        (status = 400, description = "Unknown status or priority"),
        (status = 404, description = "Not found")
    )
)]
#[put("/admin/enquiries/{id}")]
pub async fn admin_enquiry_update(
    service: web::Data<EnquiryService>,
    id: web::Path<String>,
    patch: web::Json<EnquiryPatch>,
) -> Result<impl Responder, AppError> {
    let enquiry = service.update(&id, patch.into_inner()).await?;
    Ok(result_data("Enquiry updated successfully", enquiry))
}

#[utoipa::path(
    delete,
    path = "/admin/enquiries/{id}",
    params(("id" = String, Path, description = "Enquiry id")),
    tag = "Admin Enquiries",
    responses((status = 200, description = "Enquiry archived"), (status = 404, description = "Not found"))
)]
#[delete("/admin/enquiries/{id}")]
pub async fn admin_enquiry_delete(
    service: web::Data<EnquiryService>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    service.delete(&id).await?;
    Ok(result_msg("Enquiry deleted successfully"))
}
