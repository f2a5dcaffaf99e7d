use mongo_macro::MongoIndexModelProvider;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, VariantNames};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr, VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EnquiryStatus {
    #[default]
    Pending,
    Contacted,
    Resolved,
    Closed,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr, VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EnquiryPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// 咨询来源
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnquirySource {
    #[default]
    Website,
    ContactForm,
    Phone,
    Email,
    Referral,
    Admin,
}

/// 咨询线索，只做软删除
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, MongoIndexModelProvider)]
#[mongo(collection = "enquiry")]
#[mongo_index(fields["is_active", "create_time"], order("desc"))]
#[mongo_index(fields["status"])]
pub struct EnquiryEntity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: EnquiryStatus,
    #[serde(default)]
    pub priority: EnquiryPriority,
    #[serde(default)]
    pub source: EnquirySource,
    #[serde(rename = "assignedTo", default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "crate::entitys::default_true")]
    pub is_active: bool,
    pub create_time: i64,
    pub update_time: i64,
}
