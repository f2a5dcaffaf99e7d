use crate::entitys::college_entity::CollegeEntity;
use crate::entitys::country_entity::CountryEntity;
use common::errors::AppError;
use common::repository_util::{OrderType, RepoResult, Repository, sort_by, to_set_document};
use common::util::common_utils::build_uuid;
use common::util::date_util::now;
use common::util::slug::{claim_slug, unique_slug};
use common::util::validate::is_blank;
use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CountryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

/// 国家详情，附带启用学院数量
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CountryDetail {
    #[serde(flatten)]
    pub country: CountryEntity,
    #[serde(rename = "collegeCount")]
    pub college_count: u64,
}

pub struct CountryService {
    pub dao: Arc<dyn Repository<CountryEntity>>,
    college_dao: Arc<dyn Repository<CollegeEntity>>,
}

impl CountryService {
    pub fn new(dao: Arc<dyn Repository<CountryEntity>>, college_dao: Arc<dyn Repository<CollegeEntity>>) -> Self {
        Self { dao, college_dao }
    }

    pub async fn list(&self, include_inactive: bool) -> RepoResult<Vec<CountryEntity>> {
        let filter = if include_inactive { doc! {} } else { doc! { "is_active": true } };
        self.dao.query(filter, Some(country_sort())).await
    }

    pub async fn find_active_by_slug(&self, slug: &str) -> RepoResult<CountryDetail> {
        let country = self
            .dao
            .find_one(doc! { "slug": slug.to_lowercase(), "is_active": true })
            .await?
            .ok_or_else(|| AppError::not_found("Country"))?;
        let college_count = self.college_dao.count(doc! { "country_ref": country.id.as_str(), "is_active": true }).await?;
        Ok(CountryDetail { country, college_count })
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<CountryEntity> {
        self.dao.find_by_id(id).await?.ok_or_else(|| AppError::not_found("Country"))
    }

    pub async fn create(&self, payload: CountryPayload) -> RepoResult<CountryEntity> {
        if is_blank(payload.name.as_deref()) {
            return Err(AppError::missing_fields(&["name"]));
        }
        let name = payload.name.unwrap_or_default().trim().to_string();
        let slug = match payload.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(requested) => claim_slug(self.dao.as_ref(), requested, None).await?,
            None => unique_slug(self.dao.as_ref(), &name, None).await?,
        };
        let now = now();
        let country = CountryEntity {
            id: build_uuid(),
            name,
            slug,
            flag: payload.flag.unwrap_or_default(),
            description: payload.description.unwrap_or_default(),
            meta_title: payload.meta_title,
            meta_description: payload.meta_description,
            is_active: payload.is_active.unwrap_or(true),
            display_order: payload.display_order.unwrap_or(0),
            create_time: now,
            update_time: now,
        };
        self.dao.insert(&country).await?;
        Ok(country)
    }

    /// slug 只在显式给出或改名时重新生成，并做冲突检查
    pub async fn update(&self, id: &str, payload: CountryPayload) -> RepoResult<CountryEntity> {
        let existing = self.find_by_id(id).await?;
        if payload.name.is_some() && is_blank(payload.name.as_deref()) {
            return Err(AppError::missing_fields(&["name"]));
        }

        let requested_slug = payload.slug.as_deref().filter(|s| !s.trim().is_empty());
        let renamed = payload.name.as_deref().map(str::trim).filter(|n| *n != existing.name);
        let new_slug = match (requested_slug, renamed) {
            (Some(requested), _) => Some(claim_slug(self.dao.as_ref(), requested, Some(id)).await?),
            (None, Some(name)) => Some(unique_slug(self.dao.as_ref(), name, Some(id)).await?),
            (None, None) => None,
        };

        let mut set = to_set_document(&payload)?;
        set.remove("slug");
        if let Some(slug) = new_slug.filter(|s| *s != existing.slug) {
            set.insert("slug", slug);
        }
        if let Some(name) = &payload.name {
            set.insert("name", name.trim());
        }
        set.insert("update_time", now());
        self.dao.update_one(doc! { "_id": id }, doc! { "$set": set }).await?;
        self.find_by_id(id).await
    }

    /// 仍被学院引用的国家不能删除
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let country = self.find_by_id(id).await?;
        let referenced = self.college_dao.count(doc! { "country_ref": id }).await?;
        if referenced > 0 {
            return Err(AppError::Conflict {
                message: format!("Country '{}' is still referenced by {referenced} college(s)", country.slug),
                value: country.slug,
            });
        }
        self.dao.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }
}

fn country_sort() -> Document {
    sort_by(&[("display_order", OrderType::Asc), ("name", OrderType::Asc)])
}
