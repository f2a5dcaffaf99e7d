pub mod biz_service;
pub mod entitys;

pub use biz_service::{BizServices, configure};
