use mongodb::bson::{Bson, Document, doc};
use serde::Serialize;

/// 过滤参数为空或为 `all` 时不参与查询
pub fn is_skip_value(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("all")
}

/// 取出有效的过滤参数（去掉空白与 `all`）
pub fn filter_value(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !is_skip_value(v))
}

/// 过滤参数转为 BSON；空字符串与 `all` 返回 None
pub fn filter_bson<T: Serialize + ?Sized>(value: &T) -> Option<Bson> {
    match mongodb::bson::to_bson(value).ok()? {
        Bson::String(s) if is_skip_value(&s) => None,
        Bson::String(s) => Some(Bson::String(s.trim().to_string())),
        Bson::Null => None,
        other => Some(other),
    }
}

#[derive(Debug, Default, Clone)]
pub struct QueryBuilder {
    clauses: Vec<Document>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.clauses.push(doc! { field: value.into() });
        self
    }

    pub fn ne(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.clauses.push(doc! { field: { "$ne": value.into() } });
        self
    }

    pub fn in_array<T: Into<Bson>>(mut self, field: &str, values: Vec<T>) -> Self {
        let arr = values.into_iter().map(Into::into).collect::<Vec<_>>();
        self.clauses.push(doc! { field: { "$in": arr } });
        self
    }

    /// 不区分大小写的子串匹配，输入按字面量转义
    pub fn like(mut self, field: &str, text: &str) -> Self {
        self.clauses.push(like_clause(field, text));
        self
    }

    /// 不区分大小写的整值匹配；数组字段匹配任一元素
    pub fn eq_ignore_case(mut self, field: &str, text: &str) -> Self {
        let pattern = format!("^{}$", regex::escape(text));
        self.clauses.push(doc! { field: { "$regex": pattern, "$options": "i" } });
        self
    }

    /// 任一字段包含 text 即命中（`$or`）
    pub fn any_like(mut self, fields: &[&str], text: &str) -> Self {
        let ors = fields.iter().map(|f| like_clause(f, text)).collect::<Vec<_>>();
        self.clauses.push(doc! { "$or": ors });
        self
    }

    /// 合并一个已有的过滤文档（例如 `QueryFilter` 派生生成的条件）
    pub fn merge(mut self, filter: Document) -> Self {
        if !filter.is_empty() {
            self.clauses.push(filter);
        }
        self
    }

    pub fn build(mut self) -> Document {
        match self.clauses.len() {
            0 => doc! {},
            1 => self.clauses.remove(0),
            _ => doc! { "$and": self.clauses },
        }
    }
}

fn like_clause(field: &str, text: &str) -> Document {
    doc! { field: { "$regex": regex::escape(text), "$options": "i" } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_values_are_ignored() {
        assert!(is_skip_value(""));
        assert!(is_skip_value(" ALL "));
        assert_eq!(filter_value(Some(" JEE ")), Some("JEE"));
        assert_eq!(filter_value(Some("all")), None);
        assert_eq!(filter_value(None), None);
    }

    #[test]
    fn filter_bson_drops_skip_values() {
        assert_eq!(filter_bson("all"), None);
        assert_eq!(filter_bson(&String::from(" pending ")), Some(Bson::String("pending".into())));
        assert_eq!(filter_bson(&3), Some(Bson::Int32(3)));
    }

    #[test]
    fn single_clause_is_not_wrapped() {
        let filter = QueryBuilder::new().eq("is_active", true).build();
        assert_eq!(filter, doc! { "is_active": true });
        assert_eq!(QueryBuilder::new().build(), doc! {});
    }

    #[test]
    fn like_escapes_regex_metacharacters() {
        let filter = QueryBuilder::new().eq("is_active", true).like("name", "a+b").build();
        assert_eq!(
            filter,
            doc! { "$and": [ { "is_active": true }, { "name": { "$regex": "a\\+b", "$options": "i" } } ] }
        );
    }
}
