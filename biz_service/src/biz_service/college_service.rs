use crate::entitys::college_entity::{
    CollegeCategory, CollegeEntity, FeesSection, ListSection, RankingSection, TextSection,
};
use crate::entitys::country_entity::{CountryEntity, CountrySummary};
use common::errors::AppError;
use common::query_builder::filter_value;
use common::repository_util::{
    OrderType, PageResult, RepoResult, Repository, normalize_page, page_offset, sort_by, to_set_document,
};
use common::util::common_utils::build_uuid;
use common::util::date_util::now;
use common::util::slug::{claim_slug, slugify, unique_slug};
use common::util::validate::is_blank;
use mongo_macro::QueryFilter;
use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use strum::VariantNames;
use utoipa::{IntoParams, ToSchema};

/// 对外输出的学院，`country_ref` 已展开
pub type CollegeView = CollegeEntity<Option<CountrySummary>>;

/// 公共文本搜索覆盖的字段
const SEARCH_FIELDS: [&str; 3] = ["name", "about", "overview.description"];

#[derive(Debug, Clone, Default, Deserialize, IntoParams, QueryFilter)]
#[into_params(parameter_in = Query)]
pub struct CollegeQuery {
    /// 名称 / 简介模糊搜索
    pub search: Option<String>,
    /// 国家 slug
    pub country: Option<String>,
    /// 考试名称，`all` 或空表示不过滤
    #[query(eq_ignore_case, field = "exams")]
    pub exam: Option<String>,
    /// management | engineering | medical | all
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// 创建与局部更新共用的载荷；未出现的字段不会被写入
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CollegePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// 国家 slug（也接受国家 id）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exams: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CollegeCategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<TextSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_highlights: Option<ListSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_choose_us: Option<ListSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<RankingSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_process: Option<ListSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_required: Option<ListSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees_structure: Option<FeesSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campus_highlights: Option<ListSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub establishment_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

pub struct CollegeService {
    pub dao: Arc<dyn Repository<CollegeEntity>>,
    country_dao: Arc<dyn Repository<CountryEntity>>,
}

impl CollegeService {
    pub fn new(dao: Arc<dyn Repository<CollegeEntity>>, country_dao: Arc<dyn Repository<CountryEntity>>) -> Self {
        Self { dao, country_dao }
    }

    /// 学院列表：各过滤条件取交集，公共查询只返回 is_active 的记录
    ///
    /// 国家 slug 解析不到时返回空页而不是报错。
    pub async fn search(&self, query: &CollegeQuery, include_inactive: bool) -> RepoResult<PageResult<CollegeView>> {
        let (page, limit) = normalize_page(query.page, query.limit);
        let mut builder = query.query_builder();
        if !include_inactive {
            builder = builder.eq("is_active", true);
        }
        if let Some(text) = filter_value(query.search.as_deref()) {
            builder = builder.any_like(&SEARCH_FIELDS, text);
        }
        if let Some(slug) = filter_value(query.country.as_deref()) {
            match self.country_dao.find_one(doc! { "slug": slug.to_lowercase() }).await? {
                Some(country) => builder = builder.eq("country_ref", country.id),
                None => return Ok(PageResult::empty(page, limit)),
            }
        }
        if let Some(raw) = filter_value(query.category.as_deref()) {
            let category = parse_category(raw)?;
            builder = builder.eq("categories", category.as_ref());
        }

        let result = self.page_ranked_first(builder.build(), page, limit).await?;
        self.expand_countries(result).await
    }

    /// 排名升序分页，未排名的学院排在所有已排名学院之后（各自再按名称、id 排序）
    ///
    /// 拆成已排名、未排名两段分别计数，页偏移跨越两段时由第二段补齐。
    async fn page_ranked_first(&self, filter: Document, page: u64, limit: u64) -> RepoResult<PageResult<CollegeEntity>> {
        let ranked = doc! { "$and": [filter.clone(), { "ranking.position": { "$ne": null } }] };
        let unranked = doc! { "$and": [filter, { "ranking.position": null }] };
        let ranked_total = self.dao.count(ranked.clone()).await?;
        let total = ranked_total + self.dao.count(unranked.clone()).await?;

        let skip = page_offset(page, limit);
        if skip >= total {
            return Ok(PageResult::new(vec![], total, page, limit));
        }
        let mut items = vec![];
        if skip < ranked_total {
            items = self.dao.query_page(ranked, ranked_sort(), skip, limit as i64).await?;
        }
        let remaining = limit.saturating_sub(items.len() as u64);
        if remaining > 0 {
            let unranked_skip = skip.saturating_sub(ranked_total);
            items.extend(self.dao.query_page(unranked, unranked_sort(), unranked_skip, remaining as i64).await?);
        }
        Ok(PageResult::new(items, total, page, limit))
    }

    /// 公共详情：不存在或未启用都是 404
    pub async fn find_active_by_slug(&self, slug: &str) -> RepoResult<CollegeView> {
        let college = self
            .dao
            .find_one(doc! { "slug": slug.to_lowercase(), "is_active": true })
            .await?
            .ok_or_else(|| AppError::not_found("College"))?;
        self.expand_one(college).await
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<CollegeView> {
        let college = self.dao.find_by_id(id).await?.ok_or_else(|| AppError::not_found("College"))?;
        self.expand_one(college).await
    }

    pub async fn create(&self, payload: CollegePayload) -> RepoResult<CollegeView> {
        // 1. 必填字段
        let mut missing = vec![];
        if is_blank(payload.name.as_deref()) {
            missing.push("name");
        }
        if is_blank(payload.country_ref.as_deref()) {
            missing.push("country_ref");
        }
        if is_blank(payload.overview.as_ref().map(|o| o.description.as_str())) {
            missing.push("overview.description");
        }
        if !missing.is_empty() {
            return Err(AppError::missing_fields(&missing));
        }
        let name = payload.name.clone().unwrap_or_default().trim().to_string();

        // 2. 国家解析
        let country = self.resolve_country(payload.country_ref.as_deref().unwrap_or_default()).await?;

        // 3. 印度学院必须有城市
        check_city_rule(&country, payload.city.as_deref())?;

        // 4. slug 唯一：显式给出的冲突即 409，名称派生的自动加后缀
        let slug = match payload.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(requested) => claim_slug(self.dao.as_ref(), requested, None).await?,
            None => unique_slug(self.dao.as_ref(), &name, None).await?,
        };

        // 5. 入库；并发下的同名 slug 由唯一索引裁决
        let now = now();
        let college = CollegeEntity {
            id: build_uuid(),
            name,
            slug,
            country_ref: country.id.clone(),
            city: payload.city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            exams: payload.exams.unwrap_or_default(),
            categories: payload.categories.unwrap_or_default(),
            overview: payload.overview.unwrap_or_default(),
            key_highlights: payload.key_highlights.unwrap_or_default(),
            why_choose_us: payload.why_choose_us.unwrap_or_default(),
            ranking: payload.ranking.unwrap_or_default(),
            admission_process: payload.admission_process.unwrap_or_default(),
            documents_required: payload.documents_required.unwrap_or_default(),
            fees_structure: payload.fees_structure.unwrap_or_default(),
            campus_highlights: payload.campus_highlights.unwrap_or_default(),
            fees: payload.fees,
            duration: payload.duration,
            establishment_year: payload.establishment_year,
            about: payload.about,
            image: payload.image,
            is_active: payload.is_active.unwrap_or(true),
            display_order: payload.display_order.unwrap_or(0),
            create_time: now,
            update_time: now,
        };
        self.dao.insert(&college).await?;
        Ok(college.with_country(Some(CountrySummary::from(&country))))
    }

    /// 局部更新：只写入载荷中出现的字段，规则按合并后的视图校验
    pub async fn update(&self, id: &str, payload: CollegePayload) -> RepoResult<CollegeView> {
        let existing = self.dao.find_by_id(id).await?.ok_or_else(|| AppError::not_found("College"))?;

        let mut missing = vec![];
        if payload.name.is_some() && is_blank(payload.name.as_deref()) {
            missing.push("name");
        }
        if payload.country_ref.is_some() && is_blank(payload.country_ref.as_deref()) {
            missing.push("country_ref");
        }
        if let Some(overview) = &payload.overview {
            if overview.description.trim().is_empty() {
                missing.push("overview.description");
            }
        }
        if !missing.is_empty() {
            return Err(AppError::missing_fields(&missing));
        }

        // 国家总是重新解析，哪怕只改了 city
        let country_ref = payload.country_ref.as_deref().unwrap_or(&existing.country_ref);
        let country = self.resolve_country(country_ref).await?;
        let merged_city = payload.city.as_deref().or(existing.city.as_deref());
        check_city_rule(&country, merged_city)?;

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
        if set.contains_key("country_ref") {
            set.insert("country_ref", country.id.clone());
        }
        if let Some(name) = &payload.name {
            set.insert("name", name.trim());
        }
        if let Some(city) = &payload.city {
            set.insert("city", city.trim());
        }
        set.insert("update_time", now());

        self.dao.update_one(doc! { "_id": id }, doc! { "$set": set }).await?;
        self.find_by_id(id).await
    }

    /// 后台硬删除
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        if self.dao.delete_one(doc! { "_id": id }).await? == 0 {
            return Err(AppError::not_found("College"));
        }
        Ok(())
    }

    /// country_ref 允许是 slug 或 id；解析失败时列出当前可用的国家 slug
    async fn resolve_country(&self, reference: &str) -> RepoResult<CountryEntity> {
        let reference = reference.trim();
        let filter = doc! { "$or": [ { "slug": reference.to_lowercase() }, { "_id": reference } ] };
        if let Some(country) = self.country_dao.find_one(filter).await? {
            return Ok(country);
        }
        let valid: Vec<String> = self
            .country_dao
            .query(doc! {}, Some(sort_by(&[("slug", OrderType::Asc)])))
            .await?
            .into_iter()
            .map(|c| c.slug)
            .collect();
        Err(AppError::validation_with(
            format!("Invalid country_ref '{reference}': no such country"),
            json!({ "fields": ["country_ref"], "validCountries": valid }),
        ))
    }

    async fn expand_one(&self, college: CollegeEntity) -> RepoResult<CollegeView> {
        let country = self.country_dao.find_by_id(&college.country_ref).await?;
        Ok(college.with_country(country.as_ref().map(CountrySummary::from)))
    }

    /// 一次 `$in` 查询展开当前页所有学院的国家
    async fn expand_countries(&self, page: PageResult<CollegeEntity>) -> RepoResult<PageResult<CollegeView>> {
        let mut ids: Vec<&str> = page.items.iter().map(|c| c.country_ref.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        let countries: HashMap<String, CountrySummary> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.country_dao
                .query(doc! { "_id": { "$in": ids } }, None)
                .await?
                .iter()
                .map(|c| (c.id.clone(), CountrySummary::from(c)))
                .collect()
        };
        Ok(page.map(|college| {
            let country = countries.get(&college.country_ref).cloned();
            college.with_country(country)
        }))
    }
}

/// 排名升序，再按名称，最后按 id 保证稳定
fn ranked_sort() -> Document {
    sort_by(&[("ranking.position", OrderType::Asc), ("name", OrderType::Asc), ("_id", OrderType::Asc)])
}

fn unranked_sort() -> Document {
    sort_by(&[("name", OrderType::Asc), ("_id", OrderType::Asc)])
}

fn parse_category(raw: &str) -> RepoResult<CollegeCategory> {
    CollegeCategory::from_str(raw).map_err(|_| {
        AppError::validation_with(
            format!("Invalid category '{raw}'. Valid values: {}", CollegeCategory::VARIANTS.join(", ")),
            json!({ "fields": ["category"], "validValues": CollegeCategory::VARIANTS }),
        )
    })
}

fn check_city_rule(country: &CountryEntity, city: Option<&str>) -> RepoResult<()> {
    if country.is_india() && is_blank(city) {
        return Err(AppError::validation_with(
            "City is required for Indian colleges",
            json!({ "fields": ["city"] }),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::memory_repository::MemoryRepository;

    fn country(id: &str, name: &str, slug: &str) -> CountryEntity {
        CountryEntity {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            flag: "🏳".into(),
            description: String::new(),
            meta_title: None,
            meta_description: None,
            is_active: true,
            display_order: 0,
            create_time: 0,
            update_time: 0,
        }
    }

    async fn service() -> CollegeService {
        let countries: Arc<dyn Repository<CountryEntity>> = Arc::new(MemoryRepository::<CountryEntity>::new());
        countries.insert(&country("in", "India", "india")).await.unwrap();
        countries.insert(&country("uk", "United Kingdom", "uk")).await.unwrap();
        CollegeService::new(Arc::new(MemoryRepository::<CollegeEntity>::new()), countries)
    }

    fn payload(name: &str, country_ref: &str, city: Option<&str>) -> CollegePayload {
        CollegePayload {
            name: Some(name.into()),
            country_ref: Some(country_ref.into()),
            city: city.map(str::to_string),
            overview: Some(TextSection { title: "Overview".into(), description: "About the campus".into() }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_fields_are_listed() {
        let svc = service().await;
        let err = svc.create(CollegePayload::default()).await.unwrap_err();
        match err {
            AppError::Validation { details: Some(details), .. } => {
                assert_eq!(details["missing"], json!(["name", "country_ref", "overview.description"]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_country_lists_valid_slugs() {
        let svc = service().await;
        let err = svc.create(payload("Oxford", "atlantis", None)).await.unwrap_err();
        match err {
            AppError::Validation { details: Some(details), .. } => {
                assert_eq!(details["validCountries"], json!(["india", "uk"]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn india_requires_city_case_insensitively() {
        let svc = service().await;
        let err = svc.create(payload("Test College", "INDIA", None)).await.unwrap_err();
        assert_eq!(err.to_string(), "City is required for Indian colleges");

        let created = svc.create(payload("Test College", "india", Some("Pune"))).await.unwrap();
        assert_eq!(created.city.as_deref(), Some("Pune"));
        assert_eq!(created.country_ref.unwrap().slug, "india");

        // 非印度学院不要求城市
        assert!(svc.create(payload("Oxford", "uk", None)).await.is_ok());
    }

    #[tokio::test]
    async fn derived_slugs_are_suffixed_but_explicit_slugs_conflict() {
        let svc = service().await;
        let first = svc.create(payload("Test College", "uk", None)).await.unwrap();
        let second = svc.create(payload("Test College", "uk", None)).await.unwrap();
        assert_eq!(first.slug, "test-college");
        assert_eq!(second.slug, "test-college-1");

        let explicit = CollegePayload { slug: Some("test-college".into()), ..payload("Other", "uk", None) };
        let err = svc.create(explicit).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn update_checks_city_against_merged_state() {
        let svc = service().await;
        let created = svc.create(payload("Test College", "india", Some("Pune"))).await.unwrap();

        let clear_city = CollegePayload { city: Some("  ".into()), ..Default::default() };
        assert!(svc.update(&created.id, clear_city).await.is_err());

        let moved = CollegePayload { city: Some("Mumbai".into()), ..Default::default() };
        let updated = svc.update(&created.id, moved).await.unwrap();
        assert_eq!(updated.city.as_deref(), Some("Mumbai"));
        assert_eq!(updated.name, "Test College");
        assert_eq!(updated.overview.description, "About the campus");
    }

    #[tokio::test]
    async fn update_keeps_own_slug_without_conflict() {
        let svc = service().await;
        let created = svc.create(payload("Test College", "uk", None)).await.unwrap();
        let same_slug = CollegePayload { slug: Some("test-college".into()), ..Default::default() };
        assert_eq!(svc.update(&created.id, same_slug).await.unwrap().slug, "test-college");

        svc.create(payload("Another College", "uk", None)).await.unwrap();
        let taken = CollegePayload { slug: Some("another-college".into()), ..Default::default() };
        assert!(matches!(svc.update(&created.id, taken).await.unwrap_err(), AppError::Conflict { .. }));
    }

    fn ranked(name: &str, position: Option<i32>) -> CollegePayload {
        CollegePayload { ranking: Some(RankingSection { position, ..Default::default() }), ..payload(name, "uk", None) }
    }

    fn names(page: &PageResult<CollegeView>) -> Vec<&str> {
        page.items.iter().map(|c| c.name.as_str()).collect()
    }

    #[tokio::test]
    async fn unranked_colleges_sort_after_ranked_across_pages() {
        let svc = service().await;
        for (name, position) in [("Zeta", None), ("Beta", Some(2)), ("Alpha", None), ("Gamma", Some(1))] {
            svc.create(ranked(name, position)).await.unwrap();
        }

        let all = svc.search(&CollegeQuery::default(), false).await.unwrap();
        assert_eq!(names(&all), ["Gamma", "Beta", "Alpha", "Zeta"]);

        // 第二页跨越已排名与未排名的分界
        let query = CollegeQuery { page: Some(2), limit: Some(1), ..Default::default() };
        assert_eq!(names(&svc.search(&query, false).await.unwrap()), ["Beta"]);
        let query = CollegeQuery { page: Some(2), limit: Some(3), ..Default::default() };
        let page = svc.search(&query, false).await.unwrap();
        assert_eq!(names(&page), ["Zeta"]);
        assert_eq!(page.total, 4);
        assert!(!page.has_next);
        let query = CollegeQuery { page: Some(1), limit: Some(3), ..Default::default() };
        let page = svc.search(&query, false).await.unwrap();
        assert_eq!(names(&page), ["Gamma", "Beta", "Alpha"]);
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn search_text_combines_with_other_filters() {
        let svc = service().await;
        let maple = CollegePayload {
            exams: Some(vec!["JEE".into()]),
            categories: Some(vec![CollegeCategory::Engineering]),
            ..payload("Maple Institute", "india", Some("Pune"))
        };
        svc.create(maple).await.unwrap();
        let oak = CollegePayload {
            overview: Some(TextSection { title: "Overview".into(), description: "All about Oak (est. 1901)".into() }),
            exams: Some(vec!["JEE".into()]),
            categories: Some(vec![CollegeCategory::Engineering]),
            ..payload("Riverside College", "uk", None)
        };
        svc.create(oak).await.unwrap();
        let elm = CollegePayload {
            about: Some("Maple grove campus".into()),
            categories: Some(vec![CollegeCategory::Medical]),
            ..payload("Elm University", "uk", None)
        };
        svc.create(elm).await.unwrap();

        let search = |text: &str| CollegeQuery { search: Some(text.into()), ..Default::default() };

        // 名称、about 都参与匹配，且不区分大小写
        assert_eq!(names(&svc.search(&search("MAPLE"), false).await.unwrap()), ["Elm University", "Maple Institute"]);
        // 只在 overview 中出现的文本
        assert_eq!(names(&svc.search(&search("about oak"), false).await.unwrap()), ["Riverside College"]);
        // 正则元字符按字面匹配
        assert_eq!(names(&svc.search(&search("(est. 1901)"), false).await.unwrap()), ["Riverside College"]);
        assert_eq!(svc.search(&search("est.*1901"), false).await.unwrap().total, 0);

        let with_category = CollegeQuery { category: Some("engineering".into()), ..search("maple") };
        assert_eq!(names(&svc.search(&with_category, false).await.unwrap()), ["Maple Institute"]);
        let with_exam = CollegeQuery { exam: Some("jee".into()), ..search("college") };
        assert_eq!(names(&svc.search(&with_exam, false).await.unwrap()), ["Riverside College"]);
        let with_country = CollegeQuery { country: Some("uk".into()), ..search("maple") };
        assert_eq!(names(&svc.search(&with_country, false).await.unwrap()), ["Elm University"]);
        let disjoint = CollegeQuery { country: Some("india".into()), ..search("oak") };
        assert_eq!(svc.search(&disjoint, false).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_slug_yield_one_conflict() {
        let svc = service().await;
        let first = CollegePayload { slug: Some("shared-slug".into()), ..payload("First", "uk", None) };
        let second = CollegePayload { slug: Some("shared-slug".into()), ..payload("Second", "uk", None) };
        let (a, b) = tokio::join!(svc.create(first), svc.create(second));

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(results.iter().filter(|r| matches!(r, Err(AppError::Conflict { .. }))).count(), 1);
        let stored = svc.dao.count(doc! { "slug": "shared-slug" }).await.unwrap();
        assert_eq!(stored, 1);
    }

    #[tokio::test]
    async fn invalid_category_filter_is_rejected() {
        let svc = service().await;
        let query = CollegeQuery { category: Some("law".into()), ..Default::default() };
        assert!(matches!(svc.search(&query, false).await.unwrap_err(), AppError::Validation { .. }));

        let all = CollegeQuery { category: Some("all".into()), ..Default::default() };
        assert_eq!(svc.search(&all, false).await.unwrap().total, 0);
    }
}
