use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// 一次性验证码有效期（分钟）
pub const OTP_TTL_MINUTES: i64 = 10;

/// 生成6位数字验证码
pub fn generate_six_digit_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(100000..=999999))
}

pub fn otp_expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(OTP_TTL_MINUTES)
}

/// 校验已保存的验证码：必须存在、相等且未过期
pub fn otp_is_valid(
    stored: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    given: &str,
    now: DateTime<Utc>,
) -> bool {
    match (stored, expires_at) {
        (Some(code), Some(exp)) => code == given && exp >= now,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_six_digit_code() {
        let code = generate_six_digit_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let code_num: u32 = code.parse().unwrap();
        assert!((100000..=999999).contains(&code_num));
    }

    #[test]
    fn test_otp_validity_window() {
        let now = Utc::now();
        let exp = otp_expiry_from(now);
        assert!(otp_is_valid(Some("123456"), Some(exp), "123456", now));
        assert!(!otp_is_valid(Some("123456"), Some(exp), "654321", now));
        assert!(!otp_is_valid(
            Some("123456"),
            Some(exp),
            "123456",
            now + Duration::minutes(OTP_TTL_MINUTES + 1)
        ));
        assert!(!otp_is_valid(None, None, "123456", now));
    }
}
