use crate::handlers::auth_handler::*;
use crate::handlers::blog_handler::*;
use crate::handlers::category_handler::*;
use crate::handlers::college_handler::*;
use crate::handlers::common_handler::*;
use crate::handlers::country_handler::*;
use crate::handlers::enquiry_handler::*;
use crate::handlers::exam_handler::*;
use crate::handlers::role_handler::*;
use actix_web::{HttpResponse, Responder, get, web};
use biz_service::biz_service::auth_service::{AdminSession, LoginRequest, LoginResult};
use biz_service::biz_service::blog_service::BlogPayload;
use biz_service::biz_service::category_service::CategoryPayload;
use biz_service::biz_service::college_service::CollegePayload;
use biz_service::biz_service::country_service::{CountryDetail, CountryPayload};
use biz_service::biz_service::enquiry_service::{CreateEnquiryRequest, EnquiryPatch, SendEnquiryRequest, SubmitOutcome};
use biz_service::biz_service::exam_service::ExamPayload;
use biz_service::biz_service::role_service::RoleRequest;
use biz_service::entitys::blog_entity::BlogEntity;
use biz_service::entitys::category_entity::CategoryEntity;
use biz_service::entitys::country_entity::{CountryEntity, CountrySummary};
use biz_service::entitys::enquiry_entity::EnquiryEntity;
use biz_service::entitys::exam_entity::ExamEntity;
use biz_service::entitys::role_entity::RoleEntity;
use common::errors::AppError;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        status,

        //学院
        college_list,
        college_detail,
        college_create,
        college_update,
        admin_college_list,
        admin_college_get,
        admin_college_create,
        admin_college_update,
        admin_college_delete,

        //国家
        country_list,
        country_detail,
        admin_country_list,
        admin_country_get,
        admin_country_create,
        admin_country_update,
        admin_country_delete,

        //考试
        exam_list,
        exam_detail,
        admin_exam_list,
        admin_exam_get,
        admin_exam_create,
        admin_exam_update,
        admin_exam_delete,

        //分类
        category_list,
        category_detail,
        category_soft_delete,
        admin_category_list,
        admin_category_create,
        admin_category_get,
        admin_category_update,
        admin_category_delete,

        //文章
        blog_list,
        blog_detail,
        admin_blog_list,
        admin_blog_get,
        admin_blog_create,
        admin_blog_update,
        admin_blog_delete,

        //咨询
        enquiry_send,
        admin_enquiry_list,
        admin_enquiry_get,
        admin_enquiry_create,
        admin_enquiry_update,
        admin_enquiry_delete,

        //角色 / 登录
        role_list,
        role_create,
        role_update,
        role_delete,
        admin_login,
        admin_logout,
        admin_me,
    ),
    components(schemas(
        CollegePayload,
        CountryEntity,
        CountrySummary,
        CountryDetail,
        CountryPayload,
        ExamEntity,
        ExamPayload,
        CategoryEntity,
        CategoryPayload,
        BlogEntity,
        BlogPayload,
        EnquiryEntity,
        SendEnquiryRequest,
        SubmitOutcome,
        CreateEnquiryRequest,
        EnquiryPatch,
        RoleEntity,
        RoleRequest,
        LoginRequest,
        LoginResult,
        AdminSession,
        MeResponse,
    )),
    tags(
        (name = "admission-api", description = "College admission catalog and enquiry API")
    )
)]
struct ApiDoc;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json)
        .service(actix_files::Files::new("/swagger-ui", "./static/swagger-ui").index_file("index.html"));
}

#[get("/openapi.json")]
async fn openapi_json() -> Result<impl Responder, AppError> {
    let json = ApiDoc::openapi().to_json()?;
    Ok(HttpResponse::Ok().content_type("application/json").body(json))
}
