pub mod auth_service;
pub mod blog_service;
pub mod category_service;
pub mod college_service;
pub mod country_service;
pub mod enquiry_service;
pub mod exam_service;
pub mod mail_service;
pub mod role_service;

use crate::entitys::blog_entity::BlogEntity;
use crate::entitys::category_entity::CategoryEntity;
use crate::entitys::college_entity::CollegeEntity;
use crate::entitys::country_entity::CountryEntity;
use crate::entitys::enquiry_entity::EnquiryEntity;
use crate::entitys::exam_entity::ExamEntity;
use crate::entitys::mail_entity::MailEntity;
use crate::entitys::role_entity::RoleEntity;
use actix_web::web;
use auth_service::AuthService;
use blog_service::BlogService;
use category_service::CategoryService;
use college_service::CollegeService;
use common::config::AppConfig;
use common::index_trait::MongoIndexModelProvider;
use common::memory_repository::MemoryRepository;
use common::repository_util::{BaseRepository, Repository};
use country_service::CountryService;
use enquiry_service::EnquiryService;
use exam_service::ExamService;
use log::info;
use mail_service::{MailService, Notifier};
use mongodb::Database;
use role_service::RoleService;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// 按存储选择仓库实现：有数据库句柄走 MongoDB，否则走进程内存储
async fn repository<T>(db: Option<&Database>) -> Arc<dyn Repository<T>>
where
    T: MongoIndexModelProvider + Serialize + DeserializeOwned + Unpin + Send + Sync + 'static,
{
    match db {
        Some(db) => Arc::new(BaseRepository::<T>::new(db).await),
        None => Arc::new(MemoryRepository::<T>::new()),
    }
}

/// 所有业务服务，进程内只构建一次，再以 `web::Data` 注册给每个 worker
#[derive(Clone)]
pub struct BizServices {
    pub country: Arc<CountryService>,
    pub college: Arc<CollegeService>,
    pub exam: Arc<ExamService>,
    pub category: Arc<CategoryService>,
    pub blog: Arc<BlogService>,
    pub enquiry: Arc<EnquiryService>,
    pub role: Arc<RoleService>,
    pub auth: Arc<AuthService>,
}

impl BizServices {
    pub async fn build(db: Option<&Database>, config: &AppConfig) -> anyhow::Result<Self> {
        Self::build_with_notifier(db, config, None).await
    }

    /// `notifier` 为空时使用写 outbox 的 `MailService`
    pub async fn build_with_notifier(
        db: Option<&Database>,
        config: &AppConfig,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> anyhow::Result<Self> {
        let sys = config.get_sys();
        let country_dao = repository::<CountryEntity>(db).await;
        let college_dao = repository::<CollegeEntity>(db).await;

        let notifier = match notifier {
            Some(notifier) => notifier,
            None => {
                let outbox = repository::<MailEntity>(db).await;
                Arc::new(MailService::new(outbox, sys.notify_sender.clone(), sys.notify_receiver.clone()))
            }
        };

        let role_ttl = Duration::from_secs(config.get_cache().role_ttl_secs);
        let role = Arc::new(RoleService::new(repository::<RoleEntity>(db).await, role_ttl));
        role.seed_builtin().await?;

        let services = Self {
            country: Arc::new(CountryService::new(country_dao.clone(), college_dao.clone())),
            college: Arc::new(CollegeService::new(college_dao, country_dao)),
            exam: Arc::new(ExamService::new(repository::<ExamEntity>(db).await)),
            category: Arc::new(CategoryService::new(repository::<CategoryEntity>(db).await)),
            blog: Arc::new(BlogService::new(repository::<BlogEntity>(db).await)),
            enquiry: Arc::new(EnquiryService::new(
                repository::<EnquiryEntity>(db).await,
                notifier,
                Duration::from_millis(sys.notify_timeout_ms),
            )),
            role,
            auth: Arc::new(AuthService::new(config.get_admin(), sys.md5_key.clone())),
        };
        info!("business services ready ({} store)", if db.is_some() { "mongodb" } else { "memory" });
        Ok(services)
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, services: BizServices) {
    cfg.app_data(web::Data::from(services.country));
    cfg.app_data(web::Data::from(services.college));
    cfg.app_data(web::Data::from(services.exam));
    cfg.app_data(web::Data::from(services.category));
    cfg.app_data(web::Data::from(services.blog));
    cfg.app_data(web::Data::from(services.enquiry));
    cfg.app_data(web::Data::from(services.role));
    cfg.app_data(web::Data::from(services.auth));
}
