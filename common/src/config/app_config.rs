use anyhow::{Context, Result};
use config::Config;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;

pub const MEMORY_URL_PREFIX: &str = "memory://";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub server: Option<ServerConfig>,
    pub sys: Option<SysConfig>,
    pub admin: Option<AdminConfig>,
    pub cache: Option<CacheConfig>,
}

impl AppConfig {
    /// 读取配置文件，并叠加 `APP__` 前缀的环境变量
    pub fn new(file: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(config::File::with_name(file).required(true))
            .add_source(config::Environment::with_prefix("APP").prefix_separator("__").separator("__"))
            .build()
            .with_context(|| format!("failed to build configuration from {file}"))?;
        let cfg = config.try_deserialize::<AppConfig>().context("failed to deserialize configuration")?;
        Ok(cfg)
    }

    pub fn init(file: &str) -> Result<Arc<Self>> {
        let instance = Arc::new(Self::new(file)?);
        INSTANCE.set(instance.clone()).map_err(|_| anyhow::anyhow!("AppConfig already initialized"))?;
        Ok(instance)
    }

    pub fn get_database(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }
    pub fn get_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }
    pub fn get_sys(&self) -> SysConfig {
        self.sys.clone().unwrap_or_default()
    }
    pub fn get_admin(&self) -> AdminConfig {
        self.admin.clone().unwrap_or_default()
    }
    pub fn get_cache(&self) -> CacheConfig {
        self.cache.clone().unwrap_or_default()
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("AppConfig is not initialized").clone()
    }

    pub fn try_get() -> Option<Arc<Self>> {
        INSTANCE.get().cloned()
    }
}

static INSTANCE: OnceCell<Arc<AppConfig>> = OnceCell::new();

/// 开发环境下 500 错误会带上详细信息
pub fn is_development() -> bool {
    AppConfig::try_get().map(|cfg| cfg.get_sys().is_development()).unwrap_or(false)
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: String,
    pub db_name: String,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with(MEMORY_URL_PREFIX)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SysConfig {
    //全局日志级别
    pub log_level: String,
    // development | production
    pub env: String,
    //md5混淆 key，同时用于签发管理员 token
    pub md5_key: String,
    pub notify_timeout_ms: u64,
    pub notify_sender: String,
    pub notify_receiver: String,
}

impl Default for SysConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            env: "production".to_string(),
            md5_key: String::new(),
            notify_timeout_ms: 3000,
            notify_sender: "no-reply@localhost".to_string(),
            notify_receiver: "admissions@localhost".to_string(),
        }
    }
}

impl SysConfig {
    pub fn is_development(&self) -> bool {
        self.env.eq_ignore_ascii_case("development")
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AdminConfig {
    pub token_ttl_secs: i64,
    pub users: Vec<AdminAccount>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { token_ttl_secs: 60 * 60 * 24, users: vec![] }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminAccount {
    pub username: String,
    pub password_md5: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub role_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { role_ttl_secs: 300 }
    }
}
