use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use app_api::configure_app;
use app_api::middleware::AuthMiddleware;
use biz_service::BizServices;
use common::config::AppConfig;
use common::repository::db::init_db;
use log::{LevelFilter, info};
use std::io;
use std::str::FromStr;

fn init_log(level: &str) {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);
    // RUST_LOG 优先于配置文件
    env_logger::Builder::new().filter_level(level).parse_default_env().init();
}

fn to_io(e: anyhow::Error) -> io::Error {
    io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 读取配置文件
    let config_file = std::env::args().nth(1).unwrap_or_else(|| "api-config.toml".to_string());
    let app_cfg = AppConfig::init(&config_file).map_err(to_io)?;
    init_log(&app_cfg.get_sys().log_level);
    info!("configuration loaded from {}", config_file);

    let database = app_cfg.get_database();
    let db = if database.is_memory() {
        info!("using in-memory store, data is lost on restart");
        None
    } else {
        Some(init_db(&database).await.map_err(to_io)?)
    };
    let services = BizServices::build(db.as_ref(), &app_cfg).await.map_err(to_io)?;

    let server = app_cfg.get_server();
    let address_and_port = format!("{}:{}", server.host, server.port);
    info!("Starting server on {}", address_and_port);

    let auth = web::Data::from(services.auth.clone());
    let role = web::Data::from(services.role.clone());
    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware { auth: auth.clone(), role: role.clone() })
            .wrap(Logger::default())
            // 配置 控制器
            .configure(|cfg| configure_app(cfg, services.clone()))
    })
    .keep_alive(actix_web::http::KeepAlive::Timeout(std::time::Duration::from_secs(75)))
    .bind(address_and_port)?
    .run()
    .await
}
