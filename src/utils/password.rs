use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};

/// 对密码进行哈希
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

/// 验证密码
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))
}

/// Derives the initial candidate password from a `DD/MM/YYYY` or `DD-MM-YYYY`
/// date of birth, e.g. `5-3-2001` -> `05032001`.
pub fn derive_password_from_dob(dob: &str) -> AppResult<String> {
    let invalid = || {
        AppError::ValidationError("Invalid DOB format. Use DD/MM/YYYY or DD-MM-YYYY".to_string())
    };

    let normalized = dob.trim().replace('-', "/");
    let parts: Vec<&str> = normalized.split('/').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }

    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !parts.iter().all(|p| numeric(p)) {
        return Err(invalid());
    }

    let (day, month, year) = (parts[0], parts[1], parts[2]);
    Ok(format!("{day:0>2}{month:0>2}{year}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "Password123";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("WrongPassword", &hashed).unwrap());
    }

    #[test]
    fn test_derive_password_from_dob() {
        assert_eq!(derive_password_from_dob("5-3-2001").unwrap(), "05032001");
        assert_eq!(derive_password_from_dob("15/11/1999").unwrap(), "15111999");
        assert_eq!(derive_password_from_dob("01-01-2000").unwrap(), "01012000");
    }

    #[test]
    fn test_derive_password_rejects_bad_dob() {
        assert!(matches!(
            derive_password_from_dob("2001.03.05"),
            Err(AppError::ValidationError(_))
        ));
        assert!(derive_password_from_dob("aa/bb/cccc").is_err());
        assert!(derive_password_from_dob("05/03").is_err());
        assert!(derive_password_from_dob("05//2001").is_err());
    }
}
