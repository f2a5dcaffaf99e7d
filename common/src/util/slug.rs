use crate::errors::AppError;
use crate::repository_util::{RepoResult, Repository};
use lazy_static::lazy_static;
use mongodb::bson::{Document, doc};
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"[^a-z0-9_\-]").unwrap();
    static ref HYPHENS: Regex = Regex::new(r"-{2,}").unwrap();
}

/// 小写、空白转连字符、去掉非单词字符、合并连续连字符、去掉首尾连字符
pub fn slugify(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let hyphenated = WHITESPACE.replace_all(&lower, "-");
    let stripped = NON_WORD.replace_all(&hyphenated, "");
    let collapsed = HYPHENS.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// 名称派生 slug，并返回可用的唯一值：`base`、`base-1`、`base-2` …
///
/// `exclude_id` 为更新场景下记录自身的 id。
pub async fn unique_slug<T: Send + Sync + 'static>(
    repo: &dyn Repository<T>,
    source: &str,
    exclude_id: Option<&str>,
) -> RepoResult<String> {
    let base = slugify(source);
    if base.is_empty() {
        return Err(AppError::validation_with(
            "Cannot derive a slug from the given name",
            serde_json::json!({ "fields": ["slug"] }),
        ));
    }
    let mut candidate = base.clone();
    let mut suffix = 1;
    while slug_taken(repo, &candidate, exclude_id).await? {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    Ok(candidate)
}

/// 调用方显式给出的 slug：规范化后被其它记录占用即冲突，不做后缀处理
pub async fn claim_slug<T: Send + Sync + 'static>(
    repo: &dyn Repository<T>,
    requested: &str,
    exclude_id: Option<&str>,
) -> RepoResult<String> {
    let slug = slugify(requested);
    if slug.is_empty() {
        return Err(AppError::validation_with("Invalid slug", serde_json::json!({ "fields": ["slug"] })));
    }
    if slug_taken(repo, &slug, exclude_id).await? {
        return Err(AppError::conflict("slug", slug));
    }
    Ok(slug)
}

pub async fn slug_taken<T: Send + Sync + 'static>(
    repo: &dyn Repository<T>,
    slug: &str,
    exclude_id: Option<&str>,
) -> RepoResult<bool> {
    let mut filter: Document = doc! { "slug": slug };
    if let Some(id) = exclude_id {
        filter.insert("_id", doc! { "$ne": id });
    }
    repo.exists(filter).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_normalizes_names() {
        assert_eq!(slugify("Test College"), "test-college");
        assert_eq!(slugify("  IIT  Bombay (Mumbai) "), "iit-bombay-mumbai");
        assert_eq!(slugify("Arts & Science -- College"), "arts-science-college");
        assert_eq!(slugify("--Already-a-slug--"), "already-a-slug");
        assert_eq!(slugify("snake_case name"), "snake_case-name");
        assert_eq!(slugify("!!!"), "");
    }
}
