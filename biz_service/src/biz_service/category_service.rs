use crate::entitys::category_entity::CategoryEntity;
use common::errors::AppError;
use common::repository_util::{OrderType, RepoResult, Repository, sort_by, to_set_document};
use common::util::common_utils::build_uuid;
use common::util::date_util::now;
use common::util::slug::{claim_slug, unique_slug};
use common::util::validate::is_blank;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CategoryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub struct CategoryService {
    pub dao: Arc<dyn Repository<CategoryEntity>>,
}

impl CategoryService {
    pub fn new(dao: Arc<dyn Repository<CategoryEntity>>) -> Self {
        Self { dao }
    }

    pub async fn list(&self, include_inactive: bool) -> RepoResult<Vec<CategoryEntity>> {
        let filter = if include_inactive { doc! {} } else { doc! { "is_active": true } };
        self.dao.query(filter, Some(sort_by(&[("name", OrderType::Asc)]))).await
    }

    pub async fn find_active_by_slug(&self, slug: &str) -> RepoResult<CategoryEntity> {
        self.dao
            .find_one(doc! { "slug": slug.to_lowercase(), "is_active": true })
            .await?
            .ok_or_else(|| AppError::not_found("Category"))
    }

    /// 后台按 id 读取，包含已软删除的记录
    pub async fn find_by_id(&self, id: &str) -> RepoResult<CategoryEntity> {
        self.dao.find_by_id(id).await?.ok_or_else(|| AppError::not_found("Category"))
    }

    /// slug 由名称派生，冲突时追加 `-1`、`-2` …
    pub async fn create(&self, payload: CategoryPayload) -> RepoResult<CategoryEntity> {
        if is_blank(payload.name.as_deref()) {
            return Err(AppError::missing_fields(&["name"]));
        }
        let name = payload.name.unwrap_or_default().trim().to_string();
        let slug = match payload.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(requested) => claim_slug(self.dao.as_ref(), requested, None).await?,
            None => unique_slug(self.dao.as_ref(), &name, None).await?,
        };
        let now = now();
        let category = CategoryEntity {
            id: build_uuid(),
            name,
            slug,
            description: payload.description.unwrap_or_default(),
            image: payload.image,
            is_active: payload.is_active.unwrap_or(true),
            create_time: now,
            update_time: now,
        };
        self.dao.insert(&category).await?;
        Ok(category)
    }

    pub async fn update(&self, id: &str, payload: CategoryPayload) -> RepoResult<CategoryEntity> {
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

    /// 公共删除：只置 is_active=false，记录仍可按 id 取回
    pub async fn soft_delete(&self, slug: &str) -> RepoResult<()> {
        let matched = self
            .dao
            .update_one(doc! { "slug": slug.to_lowercase() }, doc! { "$set": { "is_active": false, "update_time": now() } })
            .await?;
        if matched == 0 {
            return Err(AppError::not_found("Category"));
        }
        Ok(())
    }

    /// 后台删除：直接移除记录
    pub async fn hard_delete(&self, slug: &str) -> RepoResult<()> {
        if self.dao.delete_one(doc! { "slug": slug.to_lowercase() }).await? == 0 {
            return Err(AppError::not_found("Category"));
        }
        Ok(())
    }
}
