use hex::encode;
use md5::{Digest, Md5};
use uuid::Uuid;

pub fn build_uuid() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn build_md5(content: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(content);
    encode(hasher.finalize())
}

/// md5(key + content)，用于管理员密码摘要与 token 签名
pub fn build_md5_with_key(key: &str, content: &str) -> String {
    build_md5(&format!("{key}{content}"))
}

/// 常量时间比较，避免签名比对泄露前缀长度
pub fn secure_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_with_key_is_salted() {
        assert_eq!(build_md5(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_ne!(build_md5_with_key("k1", "pw"), build_md5_with_key("k2", "pw"));
        assert_eq!(build_md5_with_key("k", "pw"), build_md5("kpw"));
    }

    #[test]
    fn uuid_is_simple_hex() {
        let id = build_uuid();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn secure_eq_compares_whole_string() {
        assert!(secure_eq("abc", "abc"));
        assert!(!secure_eq("abc", "abd"));
        assert!(!secure_eq("abc", "ab"));
    }
}
