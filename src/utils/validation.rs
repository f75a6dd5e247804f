use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn mobile_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{8,10}$").expect("valid mobile regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

/// 候选人手机号：8-10 位纯数字
pub fn validate_mobile(mobile: &str) -> AppResult<()> {
    if !mobile_regex().is_match(mobile) {
        return Err(AppError::ValidationError(
            "Mobile number must be 8 to 10 digits".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !email_regex().is_match(email) {
        return Err(AppError::ValidationError(format!(
            "Invalid email address: {email}"
        )));
    }
    Ok(())
}

/// 邮箱统一小写存储
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns the trimmed value, or a validation error naming the missing field.
pub fn require<'a>(value: Option<&'a str>, field: &str) -> AppResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::ValidationError(format!("{field} is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mobile() {
        assert!(validate_mobile("98765432").is_ok());
        assert!(validate_mobile("9876543210").is_ok());
        assert!(validate_mobile("9876543").is_err());
        assert!(validate_mobile("98765432101").is_err());
        assert!(validate_mobile("+919876543").is_err());
        // 阿拉伯-印度数字不算
        assert!(validate_mobile("\u{0669}\u{0668}\u{0667}\u{0666}\u{0665}\u{0664}\u{0663}\u{0662}").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("someone@example.com").is_ok());
        assert!(validate_email("someone@example").is_err());
        assert!(validate_email("some one@example.com").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Foo@Example.COM "), "foo@example.com");
    }

    #[test]
    fn test_require() {
        assert_eq!(require(Some(" abc "), "title").unwrap(), "abc");
        assert!(require(Some("   "), "title").is_err());
        assert!(require(None, "title").is_err());
    }
}
