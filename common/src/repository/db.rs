use crate::config::DatabaseConfig;
use anyhow::{Result, anyhow};
use log::info;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

/// 创建 MongoDB 数据库句柄
///
/// 驱动内部维护连接池，连接在第一次请求时才真正建立；
/// 数据库不可达会在请求里表现为 500，而不是启动失败。
pub async fn init_db(config: &DatabaseConfig) -> Result<Database> {
    let client_options = ClientOptions::parse(&config.url)
        .await
        .map_err(|e| anyhow!("MongoDB URI parse error: {}", e))?;

    let client = Client::with_options(client_options).map_err(|e| anyhow!("MongoDB client init error: {}", e))?;

    info!("MongoDB client ready, database: {}", config.db_name);
    Ok(client.database(&config.db_name))
}
