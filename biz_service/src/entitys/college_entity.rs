use mongo_macro::MongoIndexModelProvider;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, VariantNames};
use utoipa::ToSchema;

/// 学院上的专业方向标签（反规范化存储为数组）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr, VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CollegeCategory {
    Management,
    Engineering,
    Medical,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TextSection {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ListSection {
    pub title: String,
    pub description: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RankingSection {
    pub title: String,
    pub description: String,
    /// 排名，越小越靠前；未排名为 null
    pub position: Option<i32>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FeeRow {
    pub course: String,
    pub amount: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FeesSection {
    pub title: String,
    pub description: String,
    pub rows: Vec<FeeRow>,
}

/// 学院
///
/// `C` 是 `country_ref` 的表示：入库时为国家 id（`String`），
/// 对外输出时展开为 `Option<CountrySummary>`，客户端永远拿不到裸 id。
#[derive(Debug, Clone, Serialize, Deserialize, MongoIndexModelProvider)]
#[mongo(collection = "college")]
#[mongo_index(fields["slug"], unique)]
#[mongo_index(fields["country_ref"])]
#[mongo_index(fields["is_active", "ranking.position", "name"])]
pub struct CollegeEntity<C = String> {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub country_ref: C,
    /// 国家为 India 时必填
    #[serde(default)]
    pub city: Option<String>,
    /// 考试名称，自由字符串，不是外键
    #[serde(default)]
    pub exams: Vec<String>,
    #[serde(default)]
    pub categories: Vec<CollegeCategory>,

    // ==== 结构化内容 ====
    #[serde(default)]
    pub overview: TextSection,
    #[serde(default)]
    pub key_highlights: ListSection,
    #[serde(default)]
    pub why_choose_us: ListSection,
    #[serde(default)]
    pub ranking: RankingSection,
    #[serde(default)]
    pub admission_process: ListSection,
    #[serde(default)]
    pub documents_required: ListSection,
    #[serde(default)]
    pub fees_structure: FeesSection,
    #[serde(default)]
    pub campus_highlights: ListSection,

    // ==== 兼容旧数据的标量字段 ====
    #[serde(default)]
    pub fees: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub establishment_year: Option<i32>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default = "crate::entitys::default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: i32,
    pub create_time: i64,
    pub update_time: i64,
}

impl<C> CollegeEntity<C> {
    /// 替换 `country_ref` 的表示，其余字段原样保留
    pub fn with_country<D>(self, country: D) -> CollegeEntity<D> {
        CollegeEntity {
            id: self.id,
            name: self.name,
            slug: self.slug,
            country_ref: country,
            city: self.city,
            exams: self.exams,
            categories: self.categories,
            overview: self.overview,
            key_highlights: self.key_highlights,
            why_choose_us: self.why_choose_us,
            ranking: self.ranking,
            admission_process: self.admission_process,
            documents_required: self.documents_required,
            fees_structure: self.fees_structure,
            campus_highlights: self.campus_highlights,
            fees: self.fees,
            duration: self.duration,
            establishment_year: self.establishment_year,
            about: self.about,
            image: self.image,
            is_active: self.is_active,
            display_order: self.display_order,
            create_time: self.create_time,
            update_time: self.update_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(CollegeCategory::from_str("Engineering").unwrap(), CollegeCategory::Engineering);
        assert!(CollegeCategory::from_str("law").is_err());
        assert_eq!(CollegeCategory::Medical.as_ref(), "medical");
    }

    #[test]
    fn omitted_sections_default_to_empty_shapes() {
        let college: CollegeEntity = serde_json::from_value(serde_json::json!({
            "_id": "c1",
            "name": "Test College",
            "slug": "test-college",
            "country_ref": "india-id",
            "create_time": 0,
            "update_time": 0
        }))
        .unwrap();
        assert!(college.is_active);
        assert_eq!(college.ranking, RankingSection::default());
        let value = serde_json::to_value(&college).unwrap();
        assert_eq!(value["admission_process"]["items"], serde_json::json!([]));
        assert_eq!(value["ranking"]["position"], serde_json::Value::Null);
    }
}
