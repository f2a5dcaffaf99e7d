use crate::doc_matcher::{apply_update, compare_by_sort, lookup, matches};
use crate::errors::AppError;
use crate::index_trait::MongoIndexModelProvider;
use crate::repository_util::{RepoResult, Repository};
use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 进程内仓库，用于本地开发（`memory://`）和测试
///
/// 文档以 BSON 形式保存，查询语义与 [`crate::doc_matcher`] 一致，
/// 唯一索引取自实体的 `MongoIndexModelProvider` 声明。
pub struct MemoryRepository<T> {
    docs: RwLock<Vec<Document>>,
    unique_keys: Vec<Vec<String>>,
    _marker: PhantomData<T>,
}

impl<T: MongoIndexModelProvider> MemoryRepository<T> {
    pub fn new() -> Self {
        Self { docs: RwLock::new(vec![]), unique_keys: T::unique_keys(), _marker: PhantomData }
    }
}

impl<T: MongoIndexModelProvider> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryRepository<T> {
    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Vec<Document>>> {
        self.docs.read().map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Vec<Document>>> {
        self.docs.write().map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }

    /// 与其它文档在任一唯一索引上冲突时返回冲突的值
    fn unique_violation(&self, docs: &[Document], candidate: &Document, skip_index: Option<usize>) -> Option<String> {
        for keys in &self.unique_keys {
            let values: Vec<Bson> = keys.iter().map(|k| lookup(candidate, k).cloned().unwrap_or(Bson::Null)).collect();
            let clash = docs.iter().enumerate().any(|(i, other)| {
                Some(i) != skip_index
                    && keys
                        .iter()
                        .zip(&values)
                        .all(|(k, v)| lookup(other, k).cloned().unwrap_or(Bson::Null) == *v)
            });
            if clash {
                return Some(
                    values
                        .iter()
                        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                        .collect::<Vec<_>>()
                        .join(","),
                );
            }
        }
        None
    }

    fn conflict(value: String) -> AppError {
        AppError::Conflict { message: "A record with the same unique key already exists".to_string(), value }
    }
}

fn decode<T: DeserializeOwned>(doc: &Document) -> RepoResult<T> {
    bson::from_document(doc.clone()).map_err(|e| AppError::Internal(format!("failed to decode document: {e}")))
}

#[async_trait]
impl<T> Repository<T> for MemoryRepository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn find_one(&self, filter: Document) -> RepoResult<Option<T>> {
        let docs = self.read()?;
        docs.iter().find(|d| matches(d, &filter)).map(decode).transpose()
    }

    async fn query(&self, filter: Document, sort: Option<Document>) -> RepoResult<Vec<T>> {
        let docs = self.read()?;
        let mut hits: Vec<&Document> = docs.iter().filter(|d| matches(d, &filter)).collect();
        if let Some(sort) = sort {
            hits.sort_by(|a, b| compare_by_sort(a, b, &sort));
        }
        hits.into_iter().map(decode).collect()
    }

    async fn query_page(&self, filter: Document, sort: Document, skip: u64, limit: i64) -> RepoResult<Vec<T>> {
        let docs = self.read()?;
        let mut hits: Vec<&Document> = docs.iter().filter(|d| matches(d, &filter)).collect();
        hits.sort_by(|a, b| compare_by_sort(a, b, &sort));
        let take = if limit > 0 { limit as usize } else { usize::MAX };
        hits.into_iter().skip(skip as usize).take(take).map(decode).collect()
    }

    async fn count(&self, filter: Document) -> RepoResult<u64> {
        let docs = self.read()?;
        Ok(docs.iter().filter(|d| matches(d, &filter)).count() as u64)
    }

    async fn insert(&self, entity: &T) -> RepoResult<()> {
        let doc = bson::to_document(entity).map_err(|e| AppError::Internal(format!("failed to encode document: {e}")))?;
        let mut docs = self.write()?;
        if docs.iter().any(|d| d.get("_id").is_some() && d.get("_id") == doc.get("_id")) {
            return Err(Self::conflict(doc.get("_id").map(|id| id.to_string()).unwrap_or_default()));
        }
        if let Some(value) = self.unique_violation(&docs, &doc, None) {
            return Err(Self::conflict(value));
        }
        docs.push(doc);
        Ok(())
    }

    async fn update_one(&self, filter: Document, update: Document) -> RepoResult<u64> {
        let mut docs = self.write()?;
        let Some(index) = docs.iter().position(|d| matches(d, &filter)) else {
            return Ok(0);
        };
        let mut updated = docs[index].clone();
        apply_update(&mut updated, &update).map_err(AppError::Internal)?;
        if let Some(value) = self.unique_violation(&docs, &updated, Some(index)) {
            return Err(Self::conflict(value));
        }
        docs[index] = updated;
        Ok(1)
    }

    async fn delete_one(&self, filter: Document) -> RepoResult<u64> {
        let mut docs = self.write()?;
        match docs.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
