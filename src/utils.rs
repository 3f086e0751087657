use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};

use crate::errors::AppError;

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Argon2::default()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))
        .map(|hash| hash.to_string())
        .map_err(|e| {
            log::error!("Failed to hash password: {}", e);
            AppError::PasswordError(e.to_string())
        })
}

/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(provided: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        log::error!("Stored password hash is malformed: {}", e);
        AppError::PasswordError(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(provided.as_bytes(), &parsed)
        .is_ok())
}

/// Argon2 is deliberately slow, keep it off the async workers.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::PasswordError(e.to_string()))?
}

pub async fn verify_password_blocking(provided: String, stored_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&provided, &stored_hash))
        .await
        .map_err(|e| AppError::PasswordError(e.to_string()))?
}

pub fn check_password_strength(password: &str) -> Result<(), AppError> {
    let fail = |msg: &str| Err(AppError::Validation(msg.to_owned()));
    if password.chars().count() < 8 {
        return fail("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return fail("Password must contain at least one special character");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return fail("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return fail("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return fail("Password must contain at least one number");
    }
    Ok(())
}

/// 20 random bytes, hex encoded.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 20];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// `None` for absent or whitespace-only input.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("Sup3r!secret").unwrap();
        assert!(verify_password("Sup3r!secret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn password_strength_rules() {
        assert!(check_password_strength("Sh0rt!").is_err());
        assert!(check_password_strength("NoSpecial123").is_err());
        assert!(check_password_strength("nouppercase1!").is_err());
        assert!(check_password_strength("NOLOWERCASE1!").is_err());
        assert!(check_password_strength("NoDigits!!").is_err());
        assert!(check_password_strength("Valid1Pass!").is_ok());
    }

    #[test]
    fn reset_tokens_are_hex_and_distinct() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" Ana ".into())), Some("Ana".into()));
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("ana@x.com"));
        assert!(!looks_like_email("ana.x.com"));
        assert!(!looks_like_email("@x.com"));
        assert!(!looks_like_email("ana@x"));
        assert!(!looks_like_email("a na@x.com"));
    }
}
