use mongo_macro::MongoIndexModelProvider;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 角色：编码 + 权限集合
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoIndexModelProvider)]
#[mongo(collection = "role")]
#[mongo_index(fields["code"], unique)]
pub struct RoleEntity {
    #[serde(rename = "_id")]
    pub id: String,
    /// 角色编码（如 "admin"、"editor"，用于程序判断）
    pub code: String,
    /// 角色名称
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `resource:action`，两段都可以是 `*`
    #[serde(default)]
    pub permissions: Vec<String>,
    /// 预置角色不允许修改和删除
    #[serde(default)]
    pub is_builtin: bool,
    pub create_time: i64,
    pub update_time: i64,
}
