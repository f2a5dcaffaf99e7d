use crate::result::{CachePolicy, result_cached, result_created, result_data, result_msg};
use actix_web::{Responder, delete, get, post, put, web};
use biz_service::biz_service::blog_service::{BlogPayload, BlogQuery, BlogService};
use biz_service::entitys::blog_entity::BlogEntity;
use common::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(blog_list)
        .service(blog_detail)
        .service(admin_blog_list)
        .service(admin_blog_get)
        .service(admin_blog_create)
        .service(admin_blog_update)
        .service(admin_blog_delete);
}

#[utoipa::path(
    get,
    path = "/blogs",
    params(BlogQuery),
    tag = "Blogs",
    summary = "Active blog posts, newest first",
    responses((status = 200, description = "{blogs, total, page, limit, totalPages, hasNext}"))
)]
#[get("/blogs")]
pub async fn blog_list(service: web::Data<BlogService>, query: web::Query<BlogQuery>) -> Result<impl Responder, AppError> {
    let page = service.search(&query, false).await?;
    Ok(result_cached("Blogs fetched successfully", page.to_data("blogs")?, CachePolicy::BLOGS))
}

#[utoipa::path(
    get,
    path = "/blogs/{slug}",
    params(("slug" = String, Path, description = "Blog slug")),
    tag = "Blogs",
    responses((status = 200, description = "Blog post", body = BlogEntity), (status = 404, description = "Missing or inactive"))
)]
#[get("/blogs/{slug}")]
pub async fn blog_detail(service: web::Data<BlogService>, slug: web::Path<String>) -> Result<impl Responder, AppError> {
    let blog = service.find_active_by_slug(&slug).await?;
    Ok(result_cached("Blog fetched successfully", blog, CachePolicy::BLOGS))
}

#[utoipa::path(
    get,
    path = "/admin/blogs",
    params(BlogQuery),
    tag = "Admin Blogs",
    responses((status = 200, description = "Blog posts including inactive ones"))
)]
#[get("/admin/blogs")]
pub async fn admin_blog_list(
    service: web::Data<BlogService>,
    query: web::Query<BlogQuery>,
) -> Result<impl Responder, AppError> {
    let page = service.search(&query, true).await?;
    Ok(result_data("Blogs fetched successfully", page.to_data("blogs")?))
}

#[utoipa::path(
    get,
    path = "/admin/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    tag = "Admin Blogs",
    responses((status = 200, description = "Blog post", body = BlogEntity), (status = 404, description = "Not found"))
)]
#[get("/admin/blogs/{id}")]
pub async fn admin_blog_get(service: web::Data<BlogService>, id: web::Path<String>) -> Result<impl Responder, AppError> {
    Ok(result_data("Blog fetched successfully", service.find_by_id(&id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/blogs",
    request_body = BlogPayload,
    tag = "Admin Blogs",
    responses(
        (status = 201, description = "Created", body = BlogEntity),
        (status = 400, description = "Title or content missing"),
        (status = 409, description = "Slug already taken")
    )
)]
#[post("/admin/blogs")]
pub async fn admin_blog_create(
    service: web::Data<BlogService>,
    payload: web::Json<BlogPayload>,
) -> Result<impl Responder, AppError> {
    let blog = service.create(payload.into_inner()).await?;
    Ok(result_created("Blog created successfully", blog))
}

#[utoipa::path(
    put,
    path = "/admin/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    request_body = BlogPayload,
    tag = "Admin Blogs",
    responses((status = 200, description = "Updated", body = BlogEntity), (status = 404, description = "Not found"))
)]
#[put("/admin/blogs/{id}")]
pub async fn admin_blog_update(
    service: web::Data<BlogService>,
    id: web::Path<String>,
    payload: web::Json<BlogPayload>,
) -> Result<impl Responder, AppError> {
    let blog = service.update(&id, payload.into_inner()).await?;
    Ok(result_data("Blog updated successfully", blog))
}

#[utoipa::path(
    delete,
    path = "/admin/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    tag = "Admin Blogs",
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found"))
)]
#[delete("/admin/blogs/{id}")]
pub async fn admin_blog_delete(service: web::Data<BlogService>, id: web::Path<String>) -> Result<impl Responder, AppError> {
    service.delete(&id).await?;
    Ok(result_msg("Blog deleted successfully"))
}
