/// Password hashing for register and login

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Reject a weak password, then bcrypt it at the default cost
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    check_strength(password)?;

    hash(password, cost).map_err(|e| AppError::Internal(format!("bcrypt: {}", e)))
}

/// `true` only when `password` matches `stored`; an unreadable hash never matches
pub fn verify_password(password: &str, stored: &str) -> bool {
    match verify(password, stored) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        }
    }
}

fn check_strength(password: &str) -> Result<(), ValidationError> {
    let field = || "password".to_string();

    match password.len() {
        n if n < MIN_PASSWORD_LENGTH => {
            return Err(ValidationError::TooShort(field(), MIN_PASSWORD_LENGTH))
        }
        n if n > MAX_PASSWORD_LENGTH => {
            return Err(ValidationError::TooLong(field(), MAX_PASSWORD_LENGTH))
        }
        _ => {}
    }

    let classes: [fn(char) -> bool; 3] = [
        |c| c.is_ascii_digit(),
        char::is_lowercase,
        char::is_uppercase,
    ];
    if classes.iter().all(|class| password.chars().any(class)) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat(
            "password needs a digit, a lowercase and an uppercase letter".to_string(),
        ))
    }
}
