//! 内存仓库使用的 MongoDB 查询子集：
//! `$and` `$or` 相等（数组字段按成员匹配）`$eq` `$ne` `$in` `$nin`
//! `$gt` `$gte` `$lt` `$lte` `$exists` `$regex`/`$options`，以及 `$set` 更新。

use mongodb::bson::{Bson, Document};
use regex::RegexBuilder;
use std::cmp::Ordering;

/// 按点分路径取值，如 `overview.description`
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = doc.get(first)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, condition)| match key.as_str() {
        "$and" => clauses(condition).iter().all(|c| matches(doc, c)),
        "$or" => clauses(condition).iter().any(|c| matches(doc, c)),
        field => field_matches(lookup(doc, field), condition),
    })
}

fn clauses(condition: &Bson) -> Vec<&Document> {
    match condition {
        Bson::Array(items) => items.iter().filter_map(Bson::as_document).collect(),
        _ => vec![],
    }
}

fn is_operator_doc(condition: &Bson) -> bool {
    match condition {
        Bson::Document(d) => !d.is_empty() && d.keys().all(|k| k.starts_with('$')),
        _ => false,
    }
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> bool {
    if !is_operator_doc(condition) {
        return equals(value, condition);
    }
    let Bson::Document(ops) = condition else {
        return false;
    };
    ops.iter().all(|(op, operand)| match op.as_str() {
        "$eq" => equals(value, operand),
        "$ne" => !equals(value, operand),
        "$in" => in_list(value, operand),
        "$nin" => !in_list(value, operand),
        "$gt" => compare_scalar(value, operand).is_some_and(|o| o == Ordering::Greater),
        "$gte" => compare_scalar(value, operand).is_some_and(|o| o != Ordering::Less),
        "$lt" => compare_scalar(value, operand).is_some_and(|o| o == Ordering::Less),
        "$lte" => compare_scalar(value, operand).is_some_and(|o| o != Ordering::Greater),
        "$exists" => value.is_some() == operand.as_bool().unwrap_or(true),
        "$regex" => regex_matches(value, operand, ops.get_str("$options").unwrap_or("")),
        "$options" => true,
        _ => false,
    })
}

/// 与 MongoDB 一致：数组字段只要任一元素相等即命中；null 同时匹配缺失字段
fn equals(value: Option<&Bson>, target: &Bson) -> bool {
    match (value, target) {
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(Bson::Array(items)), target) if !matches!(target, Bson::Array(_)) => {
            items.iter().any(|item| scalar_eq(item, target))
        }
        (Some(v), target) => scalar_eq(v, target),
    }
}

fn in_list(value: Option<&Bson>, operand: &Bson) -> bool {
    match operand {
        Bson::Array(candidates) => candidates.iter().any(|c| equals(value, c)),
        _ => false,
    }
}

fn scalar_eq(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn compare_scalar(value: Option<&Bson>, operand: &Bson) -> Option<Ordering> {
    let value = value?;
    if type_rank(value) != type_rank(operand) {
        return None;
    }
    Some(compare_bson(Some(value), Some(operand)))
}

fn regex_matches(value: Option<&Bson>, operand: &Bson, options: &str) -> bool {
    let (pattern, options) = match operand {
        Bson::String(p) => (p.as_str(), options.to_string()),
        Bson::RegularExpression(re) => (re.pattern.as_str(), re.options.clone()),
        _ => return false,
    };
    let Ok(re) = RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .build()
    else {
        return false;
    };
    match value {
        Some(Bson::String(s)) => re.is_match(s),
        Some(Bson::Array(items)) => items.iter().any(|item| matches!(item, Bson::String(s) if re.is_match(s))),
        _ => false,
    }
}

/// BSON 比较顺序：缺失/Null < 数字 < 字符串 < 文档 < 数组 < 布尔 < 日期
fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        _ => 12,
    }
}

pub fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let a = a.unwrap_or(&Bson::Null);
    let b = b.unwrap_or(&Bson::Null);
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

/// 按排序文档（`{field: 1 | -1}`）比较两个文档
pub fn compare_by_sort(a: &Document, b: &Document, sort: &Document) -> Ordering {
    for (field, direction) in sort {
        let ordering = compare_bson(lookup(a, field), lookup(b, field));
        let descending = as_number(direction).is_some_and(|d| d < 0.0);
        let ordering = if descending { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// 应用 `$set` / `$unset` 更新；其它操作符视为非法
pub fn apply_update(doc: &mut Document, update: &Document) -> Result<(), String> {
    for (op, fields) in update {
        let Bson::Document(fields) = fields else {
            return Err(format!("update operator {op} expects a document"));
        };
        match op.as_str() {
            "$set" => {
                for (path, value) in fields {
                    set_path(doc, path, value.clone());
                }
            }
            "$unset" => {
                for (path, _) in fields {
                    unset_path(doc, path);
                }
            }
            other => return Err(format!("unsupported update operator {other}")),
        }
    }
    Ok(())
}

fn set_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(inner)) = doc.get_mut(head) {
                set_path(inner, rest, value);
            }
        }
    }
}

fn unset_path(doc: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(inner)) = doc.get_mut(head) {
                unset_path(inner, rest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn college() -> Document {
        doc! {
            "_id": "c1",
            "name": "IIT Bombay",
            "is_active": true,
            "exams": ["JEE", "GATE"],
            "categories": ["engineering"],
            "overview": { "title": "Overview", "description": "Premier engineering institute" },
            "ranking": { "position": 3 },
        }
    }

    #[test]
    fn array_fields_match_by_membership() {
        assert!(matches(&college(), &doc! { "exams": "JEE" }));
        assert!(!matches(&college(), &doc! { "exams": "NEET" }));
        assert!(matches(&college(), &doc! { "categories": { "$in": ["medical", "engineering"] } }));
    }

    #[test]
    fn or_and_regex_compose() {
        let filter = doc! {
            "is_active": true,
            "$or": [
                { "name": { "$regex": "bombay", "$options": "i" } },
                { "overview.description": { "$regex": "nothing", "$options": "i" } },
            ],
        };
        assert!(matches(&college(), &filter));
        let miss = doc! { "$and": [ { "is_active": true }, { "name": { "$regex": "delhi", "$options": "i" } } ] };
        assert!(!matches(&college(), &miss));
    }

    #[test]
    fn comparison_and_exists_operators() {
        assert!(matches(&college(), &doc! { "ranking.position": { "$gte": 3, "$lt": 10 } }));
        assert!(!matches(&college(), &doc! { "ranking.position": { "$gt": 3 } }));
        assert!(matches(&college(), &doc! { "city": { "$exists": false } }));
        assert!(matches(&college(), &doc! { "_id": { "$ne": "c2" } }));
        assert!(matches(&college(), &doc! { "city": Bson::Null }));
    }

    #[test]
    fn missing_values_sort_first_ascending() {
        let ranked = college();
        let unranked = doc! { "_id": "c2", "name": "Alpha" };
        let sort = doc! { "ranking.position": 1, "name": 1 };
        assert_eq!(compare_by_sort(&unranked, &ranked, &sort), Ordering::Less);
        let by_name = doc! { "name": -1 };
        assert_eq!(compare_by_sort(&unranked, &ranked, &by_name), Ordering::Greater);
    }

    #[test]
    fn set_update_writes_nested_paths() {
        let mut doc = college();
        apply_update(&mut doc, &doc! { "$set": { "city": "Mumbai", "overview.title": "About" } }).unwrap();
        assert_eq!(doc.get_str("city").unwrap(), "Mumbai");
        assert_eq!(lookup(&doc, "overview.title"), Some(&Bson::String("About".into())));
        assert_eq!(lookup(&doc, "overview.description").and_then(Bson::as_str), Some("Premier engineering institute"));
        assert!(apply_update(&mut doc, &doc! { "$inc": { "n": 1 } }).is_err());
    }
}
