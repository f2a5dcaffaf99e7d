use mongo_macro::MongoIndexModelProvider;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum ExamType {
    National,
    State,
    University,
    International,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
pub enum ExamMode {
    Online,
    Offline,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
pub enum ExamFrequency {
    Annual,
    Biannual,
    Multiple,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct HeroSection {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ExamOverview {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct Registration {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub fee: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// 考试结构表中的一行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct PatternRow {
    #[validate(length(min = 1))]
    pub section: String,
    #[validate(range(min = 1))]
    pub questions: i64,
    #[validate(range(min = 1))]
    pub duration_mins: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ExamPattern {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 1))]
    pub total_duration_mins: i64,
    #[serde(default)]
    #[validate(nested)]
    pub table_data: Vec<PatternRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ImportantDate {
    #[validate(length(min = 1))]
    pub event: String,
    #[validate(length(min = 1))]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ExamDates {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    #[validate(nested)]
    pub important_dates: Vec<ImportantDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ResultStatistics {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 1))]
    pub total_marks: i64,
    #[validate(range(min = 0))]
    pub passing_marks: i64,
    #[validate(length(min = 1))]
    pub passing_criteria: String,
}

/// 入学考试
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, MongoIndexModelProvider)]
#[mongo(collection = "exam")]
#[mongo_index(fields["slug"], unique)]
#[mongo_index(fields["is_active", "display_order", "name"])]
pub struct ExamEntity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub short_name: String,
    pub exam_type: ExamType,
    #[serde(default)]
    pub conducting_body: String,
    pub exam_mode: ExamMode,
    pub frequency: ExamFrequency,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hero_section: HeroSection,
    #[serde(default)]
    pub overview: ExamOverview,
    #[serde(default)]
    pub registration: Registration,
    #[serde(default)]
    pub exam_pattern: ExamPattern,
    #[serde(default)]
    pub exam_dates: ExamDates,
    #[serde(default)]
    pub result_statistics: ResultStatistics,
    #[serde(default = "crate::entitys::default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: i32,
    pub create_time: i64,
    pub update_time: i64,
}
