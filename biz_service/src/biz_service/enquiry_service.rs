use crate::biz_service::mail_service::Notifier;
use crate::entitys::enquiry_entity::{EnquiryEntity, EnquiryPriority, EnquirySource, EnquiryStatus};
use common::errors::AppError;
use common::query_builder::filter_value;
use common::repository_util::{OrderType, PageResult, RepoResult, Repository, normalize_page, sort_by};
use common::util::common_utils::build_uuid;
use common::util::date_util::now;
use common::util::validate::{is_blank, is_email, validate_email_str, validate_not_blank};
use log::{info, warn};
use mongo_macro::QueryFilter;
use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use strum::VariantNames;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// 官网表单提交
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SendEnquiryRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    /// 手机号
    pub number: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub enquiry_id: String,
    /// 通知是否成功入队；失败不影响提交结果
    pub email_sent: bool,
}

/// 后台手工录入
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct CreateEnquiryRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_email_str"))]
    pub email: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
}

/// 后台只允许修改这四个字段
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EnquiryPatch {
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, QueryFilter)]
#[into_params(parameter_in = Query)]
pub struct EnquiryQuery {
    /// pending | contacted | resolved | closed | all
    #[query(eq)]
    pub status: Option<String>,
    #[query(eq)]
    pub priority: Option<String>,
    #[query(eq)]
    pub source: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub struct EnquiryService {
    pub dao: Arc<dyn Repository<EnquiryEntity>>,
    notifier: Arc<dyn Notifier>,
    notify_timeout: Duration,
}

impl EnquiryService {
    pub fn new(dao: Arc<dyn Repository<EnquiryEntity>>, notifier: Arc<dyn Notifier>, notify_timeout: Duration) -> Self {
        Self { dao, notifier, notify_timeout }
    }

    /// 官网提交：先入库，再尽力通知
    ///
    /// 通知失败或超时只记录日志，`email_sent` 为 false，提交仍然成功。
    pub async fn submit(&self, request: SendEnquiryRequest) -> RepoResult<SubmitOutcome> {
        let fields = [
            ("name", request.name.as_deref()),
            ("email", request.email.as_deref()),
            ("number", request.number.as_deref()),
            ("city", request.city.as_deref()),
        ];
        let missing: Vec<&str> = fields.iter().filter(|(_, v)| is_blank(*v)).map(|(name, _)| *name).collect();
        if !missing.is_empty() {
            return Err(AppError::missing_fields(&missing));
        }
        let email = request.email.unwrap_or_default().trim().to_string();
        if !is_email(&email) {
            return Err(AppError::validation_with("Invalid email address", json!({ "fields": ["email"] })));
        }

        let now = now();
        let enquiry = EnquiryEntity {
            id: build_uuid(),
            name: request.name.unwrap_or_default().trim().to_string(),
            email,
            phone: request.number.unwrap_or_default().trim().to_string(),
            city: request.city.unwrap_or_default().trim().to_string(),
            subject: None,
            message: None,
            status: EnquiryStatus::Pending,
            priority: EnquiryPriority::Medium,
            source: EnquirySource::Website,
            assigned_to: None,
            notes: None,
            is_active: true,
            create_time: now,
            update_time: now,
        };
        self.dao.insert(&enquiry).await?;
        info!("enquiry {} saved", enquiry.id);

        let email_sent = match tokio::time::timeout(self.notify_timeout, self.notifier.notify(&enquiry)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("enquiry {} notification failed: {:?}", enquiry.id, e);
                false
            }
            Err(_) => {
                warn!("enquiry {} notification timed out after {:?}", enquiry.id, self.notify_timeout);
                false
            }
        };
        Ok(SubmitOutcome { enquiry_id: enquiry.id, email_sent })
    }

    /// 后台列表：只含未删除的，最新的在前
    pub async fn search(&self, query: &EnquiryQuery) -> RepoResult<PageResult<EnquiryEntity>> {
        if let Some(status) = filter_value(query.status.as_deref()) {
            parse_status(status)?;
        }
        if let Some(priority) = filter_value(query.priority.as_deref()) {
            parse_priority(priority)?;
        }
        if let Some(source) = filter_value(query.source.as_deref()) {
            EnquirySource::from_str(source).map_err(|_| invalid_value("source", source, EnquirySource::VARIANTS))?;
        }
        let (page, limit) = normalize_page(query.page, query.limit);
        let mut builder = query.query_builder().eq("is_active", true);
        if let Some(text) = filter_value(query.search.as_deref()) {
            builder = builder.any_like(&["name", "email", "phone", "city"], text);
        }
        self.dao.query_by_page(builder.build(), newest_first(), page, limit).await
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<EnquiryEntity> {
        self.dao
            .find_one(doc! { "_id": id, "is_active": true })
            .await?
            .ok_or_else(|| AppError::not_found("Enquiry"))
    }

    pub async fn create(&self, request: CreateEnquiryRequest) -> RepoResult<EnquiryEntity> {
        request.validate()?;
        let status = request.status.as_deref().map(parse_status).transpose()?.unwrap_or_default();
        let priority = request.priority.as_deref().map(parse_priority).transpose()?.unwrap_or_default();
        let now = now();
        let enquiry = EnquiryEntity {
            id: build_uuid(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            city: request.city.trim().to_string(),
            subject: request.subject,
            message: request.message,
            status,
            priority,
            source: EnquirySource::Admin,
            assigned_to: request.assigned_to,
            notes: request.notes,
            is_active: true,
            create_time: now,
            update_time: now,
        };
        self.dao.insert(&enquiry).await?;
        Ok(enquiry)
    }

    /// 状态与优先级写入前按固定枚举校验
    pub async fn update(&self, id: &str, patch: EnquiryPatch) -> RepoResult<EnquiryEntity> {
        let mut set = Document::new();
        if let Some(status) = patch.status.as_deref() {
            set.insert("status", parse_status(status)?.as_ref());
        }
        if let Some(priority) = patch.priority.as_deref() {
            set.insert("priority", parse_priority(priority)?.as_ref());
        }
        if let Some(assigned_to) = patch.assigned_to {
            set.insert("assignedTo", assigned_to);
        }
        if let Some(notes) = patch.notes {
            set.insert("notes", notes);
        }
        if set.is_empty() {
            return Err(AppError::validation_with(
                "Nothing to update",
                json!({ "fields": ["status", "priority", "assignedTo", "notes"] }),
            ));
        }
        set.insert("update_time", now());
        let matched = self.dao.update_one(doc! { "_id": id, "is_active": true }, doc! { "$set": set }).await?;
        if matched == 0 {
            return Err(AppError::not_found("Enquiry"));
        }
        self.find_by_id(id).await
    }

    /// 咨询只做软删除
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let matched = self
            .dao
            .update_one(doc! { "_id": id, "is_active": true }, doc! { "$set": { "is_active": false, "update_time": now() } })
            .await?;
        if matched == 0 {
            return Err(AppError::not_found("Enquiry"));
        }
        Ok(())
    }
}

fn newest_first() -> Document {
    sort_by(&[("create_time", OrderType::Desc), ("_id", OrderType::Desc)])
}

fn parse_status(raw: &str) -> RepoResult<EnquiryStatus> {
    EnquiryStatus::from_str(raw.trim()).map_err(|_| invalid_value("status", raw, EnquiryStatus::VARIANTS))
}

fn parse_priority(raw: &str) -> RepoResult<EnquiryPriority> {
    EnquiryPriority::from_str(raw.trim()).map_err(|_| invalid_value("priority", raw, EnquiryPriority::VARIANTS))
}

fn invalid_value(field: &str, raw: &str, valid: &[&str]) -> AppError {
    AppError::validation_with(
        format!("Invalid {field} '{raw}'. Valid values: {}", valid.join(", ")),
        json!({ "fields": [field], "validValues": valid }),
    )
}
