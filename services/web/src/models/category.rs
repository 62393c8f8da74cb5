//! Category entity and form payload.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Item category. Deleting one cascades to its items, atomically.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl Category {
    /// Canonical page for this category.
    pub fn url(&self) -> String {
        format!("/categories/{}", self.id)
    }
}

/// Raw category form submission, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    pub name: Option<String>,
    pub description: Option<String>,
}
