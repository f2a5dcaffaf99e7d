use crate::entitys::exam_entity::{
    ExamDates, ExamEntity, ExamFrequency, ExamMode, ExamOverview, ExamPattern, ExamType, HeroSection, Registration,
    ResultStatistics,
};
use common::errors::AppError;
use common::query_builder::{QueryBuilder, filter_value};
use common::repository_util::{
    OrderType, PageResult, RepoResult, Repository, normalize_page, sort_by, to_set_document,
};
use common::util::common_utils::build_uuid;
use common::util::date_util::now;
use common::util::slug::{claim_slug, slugify, unique_slug};
use common::util::validate::is_blank;
use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExamQuery {
    pub search: Option<String>,
    /// National | State | University | International
    pub exam_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// 创建时各段都必填并完整校验；更新时只校验出现的段
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct ExamPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<ExamType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conducting_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_mode: Option<ExamMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<ExamFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub hero_section: Option<HeroSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub overview: Option<ExamOverview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub registration: Option<Registration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub exam_pattern: Option<ExamPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub exam_dates: Option<ExamDates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub result_statistics: Option<ResultStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

impl ExamPayload {
    fn missing_on_create(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if is_blank(self.name.as_deref()) {
            missing.push("name");
        }
        if self.exam_type.is_none() {
            missing.push("exam_type");
        }
        if self.exam_mode.is_none() {
            missing.push("exam_mode");
        }
        if self.frequency.is_none() {
            missing.push("frequency");
        }
        let sections = [
            ("hero_section", self.hero_section.is_none()),
            ("overview", self.overview.is_none()),
            ("registration", self.registration.is_none()),
            ("exam_pattern", self.exam_pattern.is_none()),
            ("exam_dates", self.exam_dates.is_none()),
            ("result_statistics", self.result_statistics.is_none()),
        ];
        missing.extend(sections.iter().filter(|(_, absent)| *absent).map(|(name, _)| *name));
        missing
    }
}

pub struct ExamService {
    pub dao: Arc<dyn Repository<ExamEntity>>,
}

impl ExamService {
    pub fn new(dao: Arc<dyn Repository<ExamEntity>>) -> Self {
        Self { dao }
    }

    pub async fn search(&self, query: &ExamQuery, include_inactive: bool) -> RepoResult<PageResult<ExamEntity>> {
        let (page, limit) = normalize_page(query.page, query.limit);
        let mut builder = QueryBuilder::new();
        if !include_inactive {
            builder = builder.eq("is_active", true);
        }
        if let Some(text) = filter_value(query.search.as_deref()) {
            builder = builder.any_like(&["name", "short_name", "conducting_body"], text);
        }
        if let Some(raw) = filter_value(query.exam_type.as_deref()) {
            let exam_type = ExamType::from_str(raw).map_err(|_| {
                AppError::validation_with(
                    format!("Invalid exam_type '{raw}'"),
                    json!({ "fields": ["exam_type"], "validValues": ["National", "State", "University", "International"] }),
                )
            })?;
            builder = builder.eq("exam_type", exam_type.as_ref());
        }
        self.dao.query_by_page(builder.build(), exam_sort(), page, limit).await
    }

    pub async fn find_active_by_slug(&self, slug: &str) -> RepoResult<ExamEntity> {
        self.dao
            .find_one(doc! { "slug": slug.to_lowercase(), "is_active": true })
            .await?
            .ok_or_else(|| AppError::not_found("Exam"))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<ExamEntity> {
        self.dao.find_by_id(id).await?.ok_or_else(|| AppError::not_found("Exam"))
    }

    pub async fn create(&self, payload: ExamPayload) -> RepoResult<ExamEntity> {
        let missing = payload.missing_on_create();
        if !missing.is_empty() {
            return Err(AppError::missing_fields(&missing));
        }
        payload.validate()?;

        let name = payload.name.clone().unwrap_or_default().trim().to_string();
        let slug = match payload.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(requested) => claim_slug(self.dao.as_ref(), requested, None).await?,
            None => unique_slug(self.dao.as_ref(), &name, None).await?,
        };
        let (Some(exam_type), Some(exam_mode), Some(frequency)) = (payload.exam_type, payload.exam_mode, payload.frequency)
        else {
            return Err(AppError::missing_fields(&["exam_type", "exam_mode", "frequency"]));
        };
        let now = now();
        let exam = ExamEntity {
            id: build_uuid(),
            name,
            slug,
            short_name: payload.short_name.unwrap_or_default(),
            exam_type,
            conducting_body: payload.conducting_body.unwrap_or_default(),
            exam_mode,
            frequency,
            description: payload.description.unwrap_or_default(),
            hero_section: payload.hero_section.unwrap_or_default(),
            overview: payload.overview.unwrap_or_default(),
            registration: payload.registration.unwrap_or_default(),
            exam_pattern: payload.exam_pattern.unwrap_or_default(),
            exam_dates: payload.exam_dates.unwrap_or_default(),
            result_statistics: payload.result_statistics.unwrap_or_default(),
            is_active: payload.is_active.unwrap_or(true),
            display_order: payload.display_order.unwrap_or(0),
            create_time: now,
            update_time: now,
        };
        self.dao.insert(&exam).await?;
        Ok(exam)
    }

    pub async fn update(&self, id: &str, payload: ExamPayload) -> RepoResult<ExamEntity> {
        let existing = self.find_by_id(id).await?;
        payload.validate()?;
        if payload.name.is_some() && is_blank(payload.name.as_deref()) {
            return Err(AppError::missing_fields(&["name"]));
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
            return Err(AppError::not_found("Exam"));
        }
        Ok(())
    }
}

fn exam_sort() -> Document {
    sort_by(&[("display_order", OrderType::Asc), ("name", OrderType::Asc), ("_id", OrderType::Asc)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitys::exam_entity::{ImportantDate, PatternRow};
    use common::memory_repository::MemoryRepository;

    fn service() -> ExamService {
        ExamService::new(Arc::new(MemoryRepository::<ExamEntity>::new()))
    }

    fn complete(name: &str, exam_type: ExamType) -> ExamPayload {
        ExamPayload {
            name: Some(name.into()),
            short_name: Some(name.into()),
            exam_type: Some(exam_type),
            exam_mode: Some(ExamMode::Online),
            frequency: Some(ExamFrequency::Biannual),
            hero_section: Some(HeroSection { title: name.into(), description: "Entrance test".into(), image: None }),
            overview: Some(ExamOverview { title: "Overview".into(), description: "About".into(), highlights: vec![] }),
            registration: Some(Registration {
                title: "Registration".into(),
                description: "Apply online".into(),
                ..Default::default()
            }),
            exam_pattern: Some(ExamPattern {
                title: "Pattern".into(),
                description: "CBT".into(),
                total_duration_mins: 180,
                table_data: vec![PatternRow { section: "Physics".into(), questions: 30, duration_mins: 60 }],
            }),
            exam_dates: Some(ExamDates {
                title: "Dates".into(),
                description: "Schedule".into(),
                important_dates: vec![ImportantDate { event: "Session 1".into(), date: "2026-01-22".into() }],
            }),
            result_statistics: Some(ResultStatistics {
                title: "Result".into(),
                description: "Scorecard".into(),
                total_marks: 300,
                passing_marks: 90,
                passing_criteria: "Percentile".into(),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_requires_every_section() {
        let svc = service();
        let payload = ExamPayload { exam_dates: None, result_statistics: None, ..complete("JEE Main", ExamType::National) };
        match svc.create(payload).await.unwrap_err() {
            AppError::Validation { details: Some(details), .. } => {
                assert_eq!(details["missing"], json!(["exam_dates", "result_statistics"]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn nested_rules_report_field_paths() {
        let svc = service();
        let mut payload = complete("JEE Main", ExamType::National);
        if let Some(pattern) = payload.exam_pattern.as_mut() {
            pattern.table_data[0].questions = 0;
        }
        match svc.create(payload).await.unwrap_err() {
            AppError::Validation { details: Some(details), .. } => {
                assert_eq!(details["fields"], json!(["exam_pattern.table_data[0].questions"]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_validates_only_present_sections() {
        let svc = service();
        let exam = svc.create(complete("JEE Main", ExamType::National)).await.unwrap();

        let bad = ExamPayload {
            result_statistics: Some(ResultStatistics { total_marks: 0, ..Default::default() }),
            ..Default::default()
        };
        assert!(svc.update(&exam.id, bad).await.is_err());

        let rename = ExamPayload { short_name: Some("JEE".into()), ..Default::default() };
        let updated = svc.update(&exam.id, rename).await.unwrap();
        assert_eq!(updated.short_name, "JEE");
        assert_eq!(updated.exam_pattern.total_duration_mins, 180);
    }

    #[tokio::test]
    async fn list_filters_by_exam_type() {
        let svc = service();
        svc.create(complete("JEE Main", ExamType::National)).await.unwrap();
        svc.create(complete("MHT CET", ExamType::State)).await.unwrap();

        let query = ExamQuery { exam_type: Some("state".into()), ..Default::default() };
        let page = svc.search(&query, false).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "mht-cet");

        let invalid = ExamQuery { exam_type: Some("galactic".into()), ..Default::default() };
        assert!(svc.search(&invalid, false).await.is_err());
    }
}
