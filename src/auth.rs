//! Password hashing, password rules and login keys.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

use crate::domain::value_objects::Email;

const MIN_PASSWORD_LENGTH: usize = 8;
const MIN_LOCAL_PART_CHECK: usize = 3;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "12345678", "123456789", "1234567890", "qwerty123", "qwertyuiop", "iloveyou",
    "admin123", "welcome1", "letmein1", "abc12345", "11111111", "00000000", "football", "baseball",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    WeakPassword(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed")]
    PasswordHash,
}

/// Rejects passwords that are short, entirely numeric, common, or contain
/// the account's email name.
pub fn validate_password(password: &str, email: &Email) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword("password cannot be entirely numeric".to_string()));
    }
    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(AuthError::WeakPassword("password is too common".to_string()));
    }
    let local = email.local_part().to_lowercase();
    if local.chars().count() >= MIN_LOCAL_PART_CHECK && lowered.contains(&local) {
        return Err(AuthError::WeakPassword("password is too similar to the email".to_string()));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// A fresh random key for login or email confirmation.
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
