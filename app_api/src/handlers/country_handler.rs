use crate::result::{CachePolicy, result_cached, result_created, result_data, result_msg};
use actix_web::{Responder, delete, get, post, put, web};
use biz_service::biz_service::country_service::{CountryDetail, CountryPayload, CountryService};
use biz_service::entitys::country_entity::CountryEntity;
use common::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(country_list)
        .service(country_detail)
        .service(admin_country_list)
        .service(admin_country_get)
        .service(admin_country_create)
        .service(admin_country_update)
        .service(admin_country_delete);
}

#[utoipa::path(
    get,
    path = "/countries",
    tag = "Countries",
    summary = "Active countries ordered by display order",
    responses((status = 200, description = "Countries", body = [CountryEntity]))
)]
#[get("/countries")]
pub async fn country_list(service: web::Data<CountryService>) -> Result<impl Responder, AppError> {
    let countries = service.list(false).await?;
    Ok(result_cached("Countries fetched successfully", countries, CachePolicy::COUNTRIES))
}

#[utoipa::path(
    get,
    path = "/countries/{slug}",
    params(("slug" = String, Path, description = "Country slug")),
    tag = "Countries",
    responses(
        (status = 200, description = "Country with active college count", body = CountryDetail),
        (status = 404, description = "Missing or inactive")
    )
)]
#[get("/countries/{slug}")]
pub async fn country_detail(
    service: web::Data<CountryService>,
    slug: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let country = service.find_active_by_slug(&slug).await?;
    Ok(result_cached("Country fetched successfully", country, CachePolicy::COUNTRIES))
}

#[utoipa::path(
    get,
    path = "/admin/countries",
    tag = "Admin Countries",
    responses((status = 200, description = "All countries", body = [CountryEntity]))
)]
#[get("/admin/countries")]
pub async fn admin_country_list(service: web::Data<CountryService>) -> Result<impl Responder, AppError> {
    Ok(result_data("Countries fetched successfully", service.list(true).await?))
}

#[utoipa::path(
    get,
    path = "/admin/countries/{id}",
    params(("id" = String, Path, description = "Country id")),
    tag = "Admin Countries",
    responses((status = 200, description = "Country", body = CountryEntity), (status = 404, description = "Not found"))
)]
#[get("/admin/countries/{id}")]
pub async fn admin_country_get(
    service: web::Data<CountryService>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    Ok(result_data("Country fetched successfully", service.find_by_id(&id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/countries",
    request_body = CountryPayload,
    tag = "Admin Countries",
    responses((status = 201, description = "Created", body = CountryEntity), (status = 409, description = "Slug already taken"))
)]
#[post("/admin/countries")]
pub async fn admin_country_create(
    service: web::Data<CountryService>,
    payload: web::Json<CountryPayload>,
) -> Result<impl Responder, AppError> {
    let country = service.create(payload.into_inner()).await?;
    Ok(result_created("Country created successfully", country))
}

#[utoipa::path(
    put,
    path = "/admin/countries/{id}",
    params(("id" = String, Path, description = "Country id")),
    request_body = CountryPayload,
    tag = "Admin Countries",
    responses((status = 200, description = "Updated", body = CountryEntity), (status = 404, description = "Not found"))
)]
#[put("/admin/countries/{id}")]
pub async fn admin_country_update(
    service: web::Data<CountryService>,
    id: web::Path<String>,
    payload: web::Json<CountryPayload>,
) -> Result<impl Responder, AppError> {
    let country = service.update(&id, payload.into_inner()).await?;
    Ok(result_data("Country updated successfully", country))
}

#[utoipa::path(
    delete,
    path = "/admin/countries/{id}",
    params(("id" = String, Path, description = "Country id")),
    tag = "Admin Countries",
    responses(
        (status = 200, description = "Deleted"),
        (status = 409, description = "Colleges still reference this country")
    )
)]
#[delete("/admin/countries/{id}")]
pub async fn admin_country_delete(
    service: web::Data<CountryService>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    service.delete(&id).await?;
    Ok(result_msg("Country deleted successfully"))
}
