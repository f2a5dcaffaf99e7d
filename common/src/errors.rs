use crate::config::is_development;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use serde::Serialize;
use serde_json::{Value, json};
use std::io;
use thiserror::Error;

/// 统一错误响应结构，与成功响应共用 `{success, message, data?, error?}` 约定
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

const DUPLICATE_KEY: i32 = 11000;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    // ==== 常规业务错误 ====
    #[error("{message}")]
    Validation { message: String, details: Option<Value> },

    #[error("{message}")]
    Conflict { message: String, value: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    // ==== 系统错误 ====
    #[error("MongoDB error: {0}")]
    Mongo(MongoError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation { message: message.into(), details: None }
    }

    pub fn validation_with(message: impl Into<String>, details: Value) -> Self {
        AppError::Validation { message: message.into(), details: Some(details) }
    }

    /// 缺失必填字段，details 中给出字段列表
    pub fn missing_fields(fields: &[&str]) -> Self {
        AppError::Validation {
            message: format!("Missing required fields: {}", fields.join(", ")),
            details: Some(json!({ "missing": fields })),
        }
    }

    pub fn conflict(field: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        AppError::Conflict { message: format!("A record with {field} '{value}' already exists"), value }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(format!("{} not found", what.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Mongo(_) | AppError::Json(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<MongoError> for AppError {
    fn from(e: MongoError) -> Self {
        if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = e.kind.as_ref() {
            if write_error.code == DUPLICATE_KEY {
                return AppError::Conflict {
                    message: "A record with the same unique key already exists".to_string(),
                    value: write_error.message.clone(),
                };
            }
        }
        AppError::Mongo(e)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut fields = vec![];
        collect_field_paths(&e, "", &mut fields);
        fields.sort();
        AppError::Validation {
            message: format!("Invalid fields: {}", fields.join(", ")),
            details: Some(json!({ "fields": fields })),
        }
    }
}

fn collect_field_paths(errors: &validator::ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() { field.to_string() } else { format!("{prefix}.{field}") };
        match kind {
            ValidationErrorsKind::Field(_) => out.push(path),
            ValidationErrorsKind::Struct(nested) => collect_field_paths(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_paths(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let (message, error) = match self {
            AppError::Validation { message, details } => (message.clone(), details.clone()),
            AppError::Conflict { message, value } => (message.clone(), Some(json!({ "value": value }))),
            AppError::NotFound(msg) | AppError::Unauthorized(msg) | AppError::Forbidden(msg) => (msg.clone(), None),
            e => {
                error!("{:?}", e);
                let detail = if is_development() { Some(Value::String(e.to_string())) } else { None };
                ("Internal server error".to_string(), detail)
            }
        };

        HttpResponse::build(status).json(ErrorResponse { success: false, message, error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[tokio::test]
    async fn validation_error_renders_envelope() {
        let err = AppError::missing_fields(&["name", "country_ref"]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["missing"], json!(["name", "country_ref"]));
    }

    #[tokio::test]
    async fn internal_error_hides_detail_outside_development() {
        let err = AppError::Internal("db unreachable".into());
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["message"], "Internal server error");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn conflict_carries_colliding_value() {
        let err = AppError::conflict("slug", "test-college");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("test-college"));
    }
}
