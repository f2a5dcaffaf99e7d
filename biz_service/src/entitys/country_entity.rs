use mongo_macro::MongoIndexModelProvider;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 国家（留学目的地）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, MongoIndexModelProvider)]
#[mongo(collection = "country")]
#[mongo_index(fields["slug"], unique)]
#[mongo_index(fields["is_active", "display_order"])]
pub struct CountryEntity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// 全局唯一，只在显式改名时重新生成
    pub slug: String,
    /// emoji 或图片地址
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default = "crate::entitys::default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: i32,
    pub create_time: i64,
    pub update_time: i64,
}

/// 学院列表中展开的国家信息
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CountrySummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub flag: String,
}

impl From<&CountryEntity> for CountrySummary {
    fn from(country: &CountryEntity) -> Self {
        Self { id: country.id.clone(), name: country.name.clone(), slug: country.slug.clone(), flag: country.flag.clone() }
    }
}

impl CountryEntity {
    pub fn is_india(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case("india")
    }
}
