pub mod jwt;
pub mod lenient;
pub mod otp;
pub mod password;
pub mod sequence;
pub mod validation;

pub use jwt::*;
pub use otp::{OTP_TTL_MINUTES, generate_six_digit_code, otp_expiry_from, otp_is_valid};
pub use password::*;
pub use validation::*;
