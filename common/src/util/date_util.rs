use chrono::DateTime;

/// 当前 Unix 时间戳（秒）
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn time_to_str(time: i64) -> String {
    match DateTime::from_timestamp(time, 0) {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => time.to_string(),
    }
}
