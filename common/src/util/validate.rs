use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    // local@domain.tld
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// ✅ 邮箱格式校验
pub fn validate_email_str(email: &str) -> Result<(), ValidationError> {
    if is_email(email) { Ok(()) } else { Err(ValidationError::new("email")) }
}

/// 缺失或只有空白
pub fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).is_none_or(str::is_empty)
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { Err(ValidationError::new("required")) } else { Ok(()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_requires_local_domain_and_tld() {
        assert!(is_email("student@example.com"));
        assert!(is_email(" a.b@c.co.in "));
        assert!(!is_email("student@example"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("student example@x.com"));
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(None));
        assert!(is_blank(Some("  ")));
        assert!(!is_blank(Some("Pune")));
    }
}
