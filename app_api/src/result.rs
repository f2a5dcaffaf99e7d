use actix_web::HttpResponse;
use actix_web::http::header::CACHE_CONTROL;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 成功响应外壳，失败响应由 `AppError` 渲染，两者字段一致
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn data(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: message.into(), data: Some(data) }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), data: None }
    }
}

/// 公开读接口的 CDN 缓存策略：`public, s-maxage=N, stale-while-revalidate=M`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_age: u32,
    pub stale_while_revalidate: u32,
}

impl CachePolicy {
    pub const COLLEGES: CachePolicy = CachePolicy { max_age: 300, stale_while_revalidate: 600 };
    pub const COUNTRIES: CachePolicy = CachePolicy { max_age: 900, stale_while_revalidate: 1800 };
    pub const EXAMS: CachePolicy = CachePolicy { max_age: 600, stale_while_revalidate: 1200 };
    // 分类与文章更新最频繁
    pub const CATEGORIES: CachePolicy = CachePolicy { max_age: 180, stale_while_revalidate: 360 };
    pub const BLOGS: CachePolicy = CachePolicy { max_age: 180, stale_while_revalidate: 360 };

    pub fn header_value(&self) -> String {
        format!("public, s-maxage={}, stale-while-revalidate={}", self.max_age, self.stale_while_revalidate)
    }
}

pub fn result_data<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::data(message, data))
}

pub fn result_created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::data(message, data))
}

pub fn result_cached<T: Serialize>(message: &str, data: T, policy: CachePolicy) -> HttpResponse {
    HttpResponse::Ok().insert_header((CACHE_CONTROL, policy.header_value())).json(ApiResponse::data(message, data))
}

pub fn result_msg(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::{Value, json};

    #[test]
    fn cache_policy_renders_header() {
        assert_eq!(CachePolicy::COLLEGES.header_value(), "public, s-maxage=300, stale-while-revalidate=600");
        assert!(CachePolicy::CATEGORIES.max_age < CachePolicy::COUNTRIES.max_age);
    }

    #[actix_web::test]
    async fn message_only_response_omits_data() {
        let resp = result_msg("Category deleted");
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "success": true, "message": "Category deleted" }));
    }

    #[actix_web::test]
    async fn cached_response_sets_header() {
        let resp = result_cached("ok", json!([]), CachePolicy::BLOGS);
        let header = resp.headers().get(CACHE_CONTROL).unwrap().to_str().unwrap().to_string();
        assert_eq!(header, "public, s-maxage=180, stale-while-revalidate=360");
    }
}
