use crate::errors::AppError;
use crate::index_trait::MongoIndexModelProvider;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use log::{error, info};
use mongodb::bson::{Document, doc};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, AppError>;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// 偏移分页结果：skip = (page - 1) * limit，has_next = skip + limit < total
#[derive(Debug, Clone, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub has_next: bool,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let skip = page_offset(page, limit);
        Self { items, total, page, limit, total_pages: total.div_ceil(limit), has_next: skip.saturating_add(limit) < total }
    }

    pub fn empty(page: u64, limit: u64) -> Self {
        Self::new(vec![], 0, page, limit)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            has_next: self.has_next,
        }
    }
}

impl<T: Serialize> PageResult<T> {
    /// 按接口约定输出：`{<key>: [...], total, page, limit, totalPages, hasNext}`
    pub fn to_data(&self, key: &str) -> RepoResult<Value> {
        let mut data = json!({
            "total": self.total,
            "page": self.page,
            "limit": self.limit,
            "totalPages": self.total_pages,
            "hasNext": self.has_next,
        });
        data[key] = serde_json::to_value(&self.items)?;
        Ok(data)
    }
}

/// 页码换算成偏移量；超大页码饱和到 u64::MAX，由调用方按越界空页处理
pub fn page_offset(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit)
}

/// 规范化分页参数：page 从 1 开始，limit 限制在 [1, MAX_PAGE_SIZE]
pub fn normalize_page(page: Option<i64>, limit: Option<i64>) -> (u64, u64) {
    let page = page.filter(|p| *p >= 1).unwrap_or(1);
    let limit = limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    (page as u64, limit as u64)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderType {
    #[default]
    Asc,
    Desc,
}

/// 多字段排序文档，字段顺序即优先级
pub fn sort_by(fields: &[(&str, OrderType)]) -> Document {
    let mut sort = Document::new();
    for (field, order) in fields {
        sort.insert(*field, if *order == OrderType::Asc { 1 } else { -1 });
    }
    sort
}

/// 载荷转为 `$set` 文档；载荷字段用 `skip_serializing_if` 跳过未出现的值
pub fn to_set_document<T: Serialize>(payload: &T) -> RepoResult<Document> {
    mongodb::bson::to_document(payload).map_err(|e| AppError::Internal(format!("failed to encode update: {e}")))
}

#[async_trait]
pub trait Repository<T: Send + Sync + 'static>: Send + Sync {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<T>> {
        self.find_one(doc! { "_id": id }).await
    }
    async fn find_one(&self, filter: Document) -> RepoResult<Option<T>>;
    async fn query(&self, filter: Document, sort: Option<Document>) -> RepoResult<Vec<T>>;
    async fn query_page(&self, filter: Document, sort: Document, skip: u64, limit: i64) -> RepoResult<Vec<T>>;
    async fn count(&self, filter: Document) -> RepoResult<u64>;
    async fn exists(&self, filter: Document) -> RepoResult<bool> {
        Ok(self.count(filter).await? > 0)
    }
    async fn insert(&self, entity: &T) -> RepoResult<()>;
    /// 返回命中的文档数
    async fn update_one(&self, filter: Document, update: Document) -> RepoResult<u64>;
    async fn delete_one(&self, filter: Document) -> RepoResult<u64>;

    async fn query_by_page(&self, filter: Document, sort: Document, page: u64, limit: u64) -> RepoResult<PageResult<T>> {
        let total = self.count(filter.clone()).await?;
        let skip = page_offset(page, limit);
        if skip >= total {
            return Ok(PageResult::new(vec![], total, page, limit));
        }
        let items = self.query_page(filter, sort, skip, limit as i64).await?;
        Ok(PageResult::new(items, total, page, limit))
    }
}

pub struct BaseRepository<T: Send + Sync> {
    pub collection: Collection<T>,
    _marker: PhantomData<T>,
}

impl<T> BaseRepository<T>
where
    T: MongoIndexModelProvider + Send + Sync,
{
    /// 绑定实体声明的集合，并确保索引存在（唯一 slug 索引是并发写入的唯一仲裁）
    pub async fn new(db: &Database) -> Self {
        let collection = db.collection::<T>(T::collection_name());
        ensure_indexes(&collection).await;
        Self { collection, _marker: PhantomData }
    }
}

async fn ensure_indexes<T: MongoIndexModelProvider + Send + Sync>(collection: &Collection<T>) {
    let models = T::index_models();
    if models.is_empty() {
        return;
    }
    match collection.create_indexes(models).await {
        Ok(result) => info!("✅ indexes ready on {}: {:?}", T::collection_name(), result.index_names),
        Err(e) => error!("❌ failed to create indexes on {}: {:?}", T::collection_name(), e),
    }
}

#[async_trait]
impl<T> Repository<T> for BaseRepository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + 'static,
{
    async fn find_one(&self, filter: Document) -> RepoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    async fn query(&self, filter: Document, sort: Option<Document>) -> RepoResult<Vec<T>> {
        let mut find_options = FindOptions::default();
        find_options.sort = sort;
        let cursor = self.collection.find(filter).with_options(find_options).await?;
        Ok(cursor.try_collect::<Vec<T>>().await?)
    }

    async fn query_page(&self, filter: Document, sort: Document, skip: u64, limit: i64) -> RepoResult<Vec<T>> {
        let mut find_options = FindOptions::default();
        find_options.sort = Some(sort);
        find_options.skip = Some(skip);
        find_options.limit = Some(limit);
        let cursor = self.collection.find(filter).with_options(find_options).await?;
        Ok(cursor.try_collect::<Vec<T>>().await?)
    }

    async fn count(&self, filter: Document) -> RepoResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }

    async fn insert(&self, entity: &T) -> RepoResult<()> {
        self.collection.insert_one(entity).await?;
        Ok(())
    }

    async fn update_one(&self, filter: Document, update: Document) -> RepoResult<u64> {
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, filter: Document) -> RepoResult<u64> {
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_math_matches_offset_contract() {
        let page: PageResult<u8> = PageResult::new(vec![1, 2], 12, 2, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);

        let last: PageResult<u8> = PageResult::new(vec![1, 2], 12, 3, 5);
        assert!(!last.has_next);
    }

    #[test]
    fn normalize_page_clamps_input() {
        assert_eq!(normalize_page(None, None), (1, DEFAULT_PAGE_SIZE as u64));
        assert_eq!(normalize_page(Some(0), Some(-3)), (1, DEFAULT_PAGE_SIZE as u64));
        assert_eq!(normalize_page(Some(4), Some(1000)), (4, MAX_PAGE_SIZE as u64));
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let (page, limit) = normalize_page(Some(i64::MAX), Some(100));
        assert_eq!(page_offset(page, limit), u64::MAX);
        let empty: PageResult<u8> = PageResult::new(vec![], 12, page, limit);
        assert!(!empty.has_next);
        assert_eq!(empty.total_pages, 1);
    }

    #[test]
    fn page_data_uses_entity_key() {
        let page = PageResult::new(vec!["a"], 1, 1, 10);
        let data = page.to_data("colleges").unwrap();
        assert_eq!(data["colleges"], json!(["a"]));
        assert_eq!(data["totalPages"], 1);
        assert_eq!(data["hasNext"], false);
    }
}
