use crate::entitys::enquiry_entity::EnquiryEntity;
use crate::entitys::mail_entity::MailEntity;
use async_trait::async_trait;
use common::repository_util::Repository;
use common::util::common_utils::build_uuid;
use common::util::date_util::{now, time_to_str};
use std::sync::Arc;

/// 新咨询通知的外部协作方；失败不影响咨询本身
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, enquiry: &EnquiryEntity) -> anyhow::Result<()>;
}

/// 把通知写入 `mail` 集合，由邮件服务商的投递进程异步发送
pub struct MailService {
    pub dao: Arc<dyn Repository<MailEntity>>,
    sender: String,
    receiver: String,
}

impl MailService {
    pub fn new(dao: Arc<dyn Repository<MailEntity>>, sender: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self { dao, sender: sender.into(), receiver: receiver.into() }
    }

    fn build_mail(&self, enquiry: &EnquiryEntity) -> MailEntity {
        let content = format!(
            "Name: {}\nEmail: {}\nPhone: {}\nCity: {}\nSource: {}\nReceived: {}",
            enquiry.name,
            enquiry.email,
            enquiry.phone,
            enquiry.city,
            enquiry.source,
            time_to_str(enquiry.create_time),
        );
        let now = now();
        MailEntity {
            id: build_uuid(),
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
            subject: format!("New admission enquiry from {}", enquiry.name),
            content,
            status: 0,
            send_count: 0,
            create_time: now,
            update_time: now,
        }
    }
}

#[async_trait]
impl Notifier for MailService {
    async fn notify(&self, enquiry: &EnquiryEntity) -> anyhow::Result<()> {
        let mail = self.build_mail(enquiry);
        self.dao.insert(&mail).await?;
        Ok(())
    }
}
