//! Item entity and form payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Inventory item. Always references exactly one existing category.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub image: String,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Canonical page for this item.
    pub fn url(&self) -> String {
        format!("/items/{}", self.id)
    }

    /// Price formatted for display, e.g. "$4.50".
    pub fn price_formatted(&self) -> String {
        format!("${:.2}", self.price)
    }

    /// Public path the static layer serves the image from.
    pub fn image_src(&self) -> String {
        format!("/images/{}", self.image)
    }
}

/// Item joined with its category for the detail view.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub category_name: String,
}

/// Validated payload for creating or replacing an item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub image: String,
    pub category_id: Uuid,
}

/// Raw item form fields, before validation. The image arrives as a
/// separate multipart file part.
#[derive(Debug, Clone, Default)]
pub struct ItemForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
}
