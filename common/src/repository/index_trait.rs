use mongodb::IndexModel;

/// 实体声明自己的集合名与索引，Mongo 与内存仓库都依赖它
pub trait MongoIndexModelProvider {
    fn collection_name() -> &'static str;
    fn index_models() -> Vec<IndexModel>;

    /// 唯一索引的字段组合
    fn unique_keys() -> Vec<Vec<String>> {
        Self::index_models()
            .into_iter()
            .filter(|model| model.options.as_ref().and_then(|o| o.unique).unwrap_or(false))
            .map(|model| model.keys.keys().cloned().collect())
            .collect()
    }
}
