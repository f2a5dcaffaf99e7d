use mongo_macro::MongoIndexModelProvider;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 内容分类（博客等内容分组），与学院上的 `CollegeCategory` 枚举无关
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, MongoIndexModelProvider)]
#[mongo(collection = "category")]
#[mongo_index(fields["slug"], unique)]
pub struct CategoryEntity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    /// 公共删除只把它置为 false
    #[serde(default = "crate::entitys::default_true")]
    pub is_active: bool,
    pub create_time: i64,
    pub update_time: i64,
}
