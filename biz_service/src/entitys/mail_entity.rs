use mongo_macro::MongoIndexModelProvider;
use serde::{Deserialize, Serialize};

/// 待发送邮件（outbox），由外部投递进程消费
#[derive(Debug, Serialize, Deserialize, Clone, MongoIndexModelProvider)]
#[mongo(collection = "mail")]
#[mongo_index(fields["status", "create_time"])]
pub struct MailEntity {
    #[serde(rename = "_id")]
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub subject: String,
    pub content: String,
    /// 0 待发送，1 已发送，2 失败
    pub status: i32,
    pub send_count: i32,
    pub create_time: i64,
    pub update_time: i64,
}
