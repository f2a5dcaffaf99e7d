use crate::entitys::role_entity::RoleEntity;
use common::errors::AppError;
use common::repository_util::{OrderType, RepoResult, Repository, sort_by};
use common::util::common_utils::build_uuid;
use common::util::date_util::now;
use common::util::validate::is_blank;
use lazy_static::lazy_static;
use log::info;
use moka::sync::Cache;
use mongodb::bson::doc;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_SUPPORT: &str = "support";

lazy_static! {
    // resource:action，两段可以是 *
    static ref PERMISSION_RE: Regex = Regex::new(r"^(\*|[a-z][a-z_]*):(\*|[a-z][a-z_]*)$").unwrap();
    static ref ROLE_CODE_RE: Regex = Regex::new(r"^[a-z][a-z0-9_\-]{1,31}$").unwrap();
}

/// 预置角色：(code, name, permissions)
const BUILTIN_ROLES: [(&str, &str, &[&str]); 3] = [
    (ROLE_ADMIN, "Administrator", &["*"]),
    (
        ROLE_EDITOR,
        "Content editor",
        &["colleges:*", "countries:*", "exams:*", "categories:*", "blogs:*", "enquiries:read"],
    ),
    (ROLE_SUPPORT, "Admissions support", &["enquiries:*", "colleges:read"]),
];

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RoleRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

/// 授予的权限是否覆盖所需权限，两段都支持 `*`
pub fn permission_matches(granted: &str, required: &str) -> bool {
    if granted == "*" {
        return true;
    }
    let (granted_resource, granted_action) = granted.split_once(':').unwrap_or((granted, "*"));
    let Some((resource, action)) = required.split_once(':') else {
        return false;
    };
    (granted_resource == "*" || granted_resource == resource) && (granted_action == "*" || granted_action == action)
}

pub struct RoleService {
    pub dao: Arc<dyn Repository<RoleEntity>>,
    cache: Cache<String, Arc<Vec<String>>>,
}

impl RoleService {
    pub fn new(dao: Arc<dyn Repository<RoleEntity>>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(256).time_to_live(ttl).build();
        Self { dao, cache }
    }

    /// 启动时补齐缺失的预置角色
    pub async fn seed_builtin(&self) -> RepoResult<()> {
        for (code, name, permissions) in BUILTIN_ROLES {
            if self.dao.exists(doc! { "code": code }).await? {
                continue;
            }
            let now = now();
            let role = RoleEntity {
                id: build_uuid(),
                code: code.to_string(),
                name: name.to_string(),
                description: None,
                permissions: permissions.iter().map(|p| p.to_string()).collect(),
                is_builtin: true,
                create_time: now,
                update_time: now,
            };
            self.dao.insert(&role).await?;
            info!("seeded builtin role {}", code);
        }
        Ok(())
    }

    pub async fn list(&self) -> RepoResult<Vec<RoleEntity>> {
        self.dao.query(doc! {}, Some(sort_by(&[("code", OrderType::Asc)]))).await
    }

    /// 角色的权限集合；未知角色为空集合
    pub async fn permissions_for(&self, code: &str) -> RepoResult<Arc<Vec<String>>> {
        if let Some(cached) = self.cache.get(code) {
            return Ok(cached);
        }
        let permissions = match self.dao.find_one(doc! { "code": code }).await? {
            Some(role) => Arc::new(role.permissions),
            None => return Ok(Arc::new(vec![])),
        };
        self.cache.insert(code.to_string(), permissions.clone());
        Ok(permissions)
    }

    pub async fn is_allowed(&self, code: &str, required: &str) -> RepoResult<bool> {
        let permissions = self.permissions_for(code).await?;
        Ok(permissions.iter().any(|granted| permission_matches(granted, required)))
    }

    pub async fn create(&self, request: RoleRequest) -> RepoResult<RoleEntity> {
        let mut missing = vec![];
        if is_blank(request.code.as_deref()) {
            missing.push("code");
        }
        if is_blank(request.name.as_deref()) {
            missing.push("name");
        }
        if !missing.is_empty() {
            return Err(AppError::missing_fields(&missing));
        }
        let code = request.code.unwrap_or_default().trim().to_lowercase();
        if !ROLE_CODE_RE.is_match(&code) {
            return Err(AppError::validation_with(format!("Invalid role code '{code}'"), json!({ "fields": ["code"] })));
        }
        let permissions = check_permissions(request.permissions.unwrap_or_default())?;
        if self.dao.exists(doc! { "code": code.as_str() }).await? {
            return Err(AppError::conflict("code", code));
        }
        let now = now();
        let role = RoleEntity {
            id: build_uuid(),
            code,
            name: request.name.unwrap_or_default().trim().to_string(),
            description: request.description,
            permissions,
            is_builtin: false,
            create_time: now,
            update_time: now,
        };
        self.dao.insert(&role).await?;
        Ok(role)
    }

    /// 替换自定义角色的权限；预置角色不可修改
    pub async fn update(&self, code: &str, request: RoleRequest) -> RepoResult<RoleEntity> {
        let role = self.find_custom(code).await?;
        let mut set = doc! { "update_time": now() };
        if let Some(permissions) = request.permissions {
            set.insert("permissions", check_permissions(permissions)?);
        }
        if let Some(name) = request.name.filter(|n| !n.trim().is_empty()) {
            set.insert("name", name.trim());
        }
        if let Some(description) = request.description {
            set.insert("description", description);
        }
        self.dao.update_one(doc! { "_id": role.id.as_str() }, doc! { "$set": set }).await?;
        self.cache.invalidate(code);
        self.dao.find_by_id(&role.id).await?.ok_or_else(|| AppError::not_found("Role"))
    }

    pub async fn delete(&self, code: &str) -> RepoResult<()> {
        let role = self.find_custom(code).await?;
        self.dao.delete_one(doc! { "_id": role.id.as_str() }).await?;
        self.cache.invalidate(code);
        Ok(())
    }

    async fn find_custom(&self, code: &str) -> RepoResult<RoleEntity> {
        let role = self.dao.find_one(doc! { "code": code }).await?.ok_or_else(|| AppError::not_found("Role"))?;
        if role.is_builtin {
            return Err(AppError::Forbidden(format!("Builtin role '{code}' cannot be modified")));
        }
        Ok(role)
    }
}

fn check_permissions(permissions: Vec<String>) -> RepoResult<Vec<String>> {
    let mut normalized = Vec::with_capacity(permissions.len());
    for permission in permissions {
        let permission = permission.trim().to_lowercase();
        if permission != "*" && !PERMISSION_RE.is_match(&permission) {
            return Err(AppError::validation_with(
                format!("Invalid permission '{permission}', expected resource:action"),
                json!({ "fields": ["permissions"] }),
            ));
        }
        if !normalized.contains(&permission) {
            normalized.push(permission);
        }
    }
    Ok(normalized)
}
