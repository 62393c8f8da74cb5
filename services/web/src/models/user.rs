//! User entity and form payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User account.
///
/// The password hash never reaches a template context; it is skipped
/// on serialization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub is_admin: bool,
    pub first_name: String,
    pub family_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name: "First Family".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.family_name)
    }

    /// Canonical page for this user.
    pub fn url(&self) -> String {
        format!("/users/{}", self.id)
    }
}

/// Validated payload for creating or replacing a user.
///
/// `password` is the plaintext submitted by the form; the repository
/// hashes it before anything is written.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub is_admin: bool,
    pub first_name: String,
    pub family_name: String,
}

/// Raw user form submission, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<String>,
    pub first_name: Option<String>,
    pub family_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            password_hash: "hash".to_string(),
            email: "ada@example.com".to_string(),
            is_admin: false,
            first_name: "Ada".to_string(),
            family_name: "Lovelace".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn full_name_joins_first_and_family() {
        assert_eq!(sample_user().full_name(), "Ada Lovelace");
    }

    #[test]
    fn serialization_omits_password_hash() {
        let value = serde_json::to_value(sample_user()).unwrap();
        assert!(value.get("password_hash").is_none());
        assert!(value.get("username").is_some());
    }
}
