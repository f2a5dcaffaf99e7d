use crate::entitys::blog_entity::BlogEntity;
use common::errors::AppError;
use common::query_builder::filter_value;
use common::repository_util::{
    OrderType, PageResult, RepoResult, Repository, normalize_page, sort_by, to_set_document,
};
use common::util::common_utils::build_uuid;
use common::util::date_util::now;
use common::util::slug::{claim_slug, slugify, unique_slug};
use common::util::validate::is_blank;
use mongo_macro::QueryFilter;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Default, Deserialize, IntoParams, QueryFilter)]
#[into_params(parameter_in = Query)]
pub struct BlogQuery {
    pub search: Option<String>,
    #[query(eq_ignore_case)]
    pub category: Option<String>,
    #[query(eq_ignore_case, field = "tags")]
    pub tag: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BlogPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_exams: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub struct BlogService {
    pub dao: Arc<dyn Repository<BlogEntity>>,
}

impl BlogService {
    pub fn new(dao: Arc<dyn Repository<BlogEntity>>) -> Self {
        Self { dao }
    }

    /// 最新的在前
    pub async fn search(&self, query: &BlogQuery, include_inactive: bool) -> RepoResult<PageResult<BlogEntity>> {
        let (page, limit) = normalize_page(query.page, query.limit);
        let mut builder = query.query_builder();
        if !include_inactive {
            builder = builder.eq("is_active", true);
        }
        if let Some(text) = filter_value(query.search.as_deref()) {
            builder = builder.any_like(&["title", "excerpt", "content"], text);
        }
        let sort = sort_by(&[("create_time", OrderType::Desc), ("_id", OrderType::Desc)]);
        self.dao.query_by_page(builder.build(), sort, page, limit).await
    }

    pub async fn find_active_by_slug(&self, slug: &str) -> RepoResult<BlogEntity> {
        self.dao
            .find_one(doc! { "slug": slug.to_lowercase(), "is_active": true })
            .await?
            .ok_or_else(|| AppError::not_found("Blog"))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<BlogEntity> {
        self.dao.find_by_id(id).await?.ok_or_else(|| AppError::not_found("Blog"))
    }

    pub async fn create(&self, payload: BlogPayload) -> RepoResult<BlogEntity> {
        let mut missing = vec![];
        if is_blank(payload.title.as_deref()) {
            missing.push("title");
        }
        if is_blank(payload.content.as_deref()) {
            missing.push("content");
        }
        if !missing.is_empty() {
            return Err(AppError::missing_fields(&missing));
        }
        let title = payload.title.unwrap_or_default().trim().to_string();
        let slug = match payload.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(requested) => claim_slug(self.dao.as_ref(), requested, None).await?,
            None => unique_slug(self.dao.as_ref(), &title, None).await?,
        };
        let now = now();
        let blog = BlogEntity {
            id: build_uuid(),
            title,
            slug,
            category: payload.category.unwrap_or_default(),
            tags: payload.tags.unwrap_or_default(),
            content: payload.content.unwrap_or_default(),
            excerpt: payload.excerpt,
            author: payload.author,
            image: payload.image,
            related_exams: payload.related_exams.unwrap_or_default(),
            is_active: payload.is_active.unwrap_or(true),
            create_time: now,
            update_time: now,
        };
        self.dao.insert(&blog).await?;
        Ok(blog)
    }

    pub async fn update(&self, id: &str, payload: BlogPayload) -> RepoResult<BlogEntity> {
        let existing = self.find_by_id(id).await?;
        let mut missing = vec![];
        if payload.title.is_some() && is_blank(payload.title.as_deref()) {
            missing.push("title");
        }
        if payload.content.is_some() && is_blank(payload.content.as_deref()) {
            missing.push("content");
        }
        if !missing.is_empty() {
            return Err(AppError::missing_fields(&missing));
        }
        let slug_change = match payload.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(requested) if slugify(requested) != existing.slug => {
                Some(claim_slug(self.dao.as_ref(), requested, Some(id)).await?)
            }
            _ => None,
        };
        let mut set = to_set_document(&payload)?;
        set.remove("slug");
        if let Some(slug) = slug_change {
            set.insert("slug", slug);
        }
        set.insert("update_time", now());
        self.dao.update_one(doc! { "_id": id }, doc! { "$set": set }).await?;
        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        if self.dao.delete_one(doc! { "_id": id }).await? == 0 {
            return Err(AppError::not_found("Blog"));
        }
        Ok(())
    }
}
