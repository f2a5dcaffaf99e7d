use mongo_macro::MongoIndexModelProvider;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, MongoIndexModelProvider)]
#[mongo(collection = "blog")]
#[mongo_index(fields["slug"], unique)]
#[mongo_index(fields["create_time"], order("desc"))]
pub struct BlogEntity {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    /// 自由文本分类
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// markdown 风格的正文
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub related_exams: Vec<String>,
    #[serde(default = "crate::entitys::default_true")]
    pub is_active: bool,
    pub create_time: i64,
    pub update_time: i64,
}
