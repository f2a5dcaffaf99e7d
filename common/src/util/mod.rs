pub mod common_utils;
pub mod date_util;
pub mod slug;
pub mod validate;
