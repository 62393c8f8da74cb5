//! Credential verification.
//!
//! Passwords are hashed with argon2id and a per-password random salt.
//! Authentication distinguishes an unknown username from a wrong
//! password internally, for diagnostics only; handlers must collapse
//! both into the single generic message below so the login page never
//! confirms whether a username exists.

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use tracing::debug;

use crate::{models::User, repositories::UserRepository};

/// The one message the login page shows for any failed attempt.
pub const LOGIN_FAILED_MESSAGE: &str = "Incorrect username or password";

/// Why an authentication attempt failed. Internal only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    UnknownUser,
    IncorrectPassword,
}

/// Hash a plaintext password for storage.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(hash)
}

/// Check a plaintext password against a stored hash.
pub fn verify_password(hash: &str, plain: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    let argon2 = Argon2::default();
    Ok(argon2.verify_password(plain.as_bytes(), &parsed_hash).is_ok())
}

/// Authenticate a username/password pair against the user store.
///
/// The outer `Result` is for store or hashing faults; the inner one
/// carries the tagged failure reason.
pub async fn authenticate(
    users: &UserRepository,
    username: &str,
    password: &str,
) -> Result<Result<User, CredentialFailure>> {
    let Some(user) = users.find_by_username(username).await? else {
        debug!(reason = "unknown_user", "Login attempt failed");
        return Ok(Err(CredentialFailure::UnknownUser));
    };

    if verify_password(&user.password_hash, password)? {
        Ok(Ok(user))
    } else {
        debug!(reason = "incorrect_password", "Login attempt failed");
        Ok(Err(CredentialFailure::IncorrectPassword))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_the_hashed_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse").unwrap());
    }

    #[test]
    fn verify_rejects_a_different_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password(&hash, "battery staple").unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same input").unwrap();
        let second = hash_password("same input").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn hash_never_contains_the_plaintext() {
        let hash = hash_password("visible-secret").unwrap();
        assert!(!hash.contains("visible-secret"));
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_match() {
        assert!(verify_password("not a phc string", "anything").is_err());
    }
}
