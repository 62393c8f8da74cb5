//! Item repository.

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{Item, ItemDetail, NewItem};

const ITEM_COLUMNS: &str = "id, name, description, price, quantity, image, category_id, created_at";

fn item_from_row(row: &PgRow) -> Item {
    Item {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        quantity: row.get("quantity"),
        image: row.get("image"),
        category_id: row.get("category_id"),
        created_at: row.get("created_at"),
    }
}

/// Item repository over the entity store.
#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an item.
    pub async fn create(&self, new_item: &NewItem) -> Result<Item> {
        info!("Creating item: {}", new_item.name);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO items (name, description, price, quantity, image, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(&new_item.name)
        .bind(&new_item.description)
        .bind(new_item.price)
        .bind(new_item.quantity)
        .bind(&new_item.image)
        .bind(new_item.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(item_from_row(&row))
    }

    /// Find an item by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(item_from_row))
    }

    /// Find an item joined with its category name, for the detail view.
    pub async fn find_detail(&self, id: Uuid) -> Result<Option<ItemDetail>> {
        let row = sqlx::query(
            r#"
            SELECT i.id, i.name, i.description, i.price, i.quantity, i.image,
                   i.category_id, i.created_at, c.name AS category_name
            FROM items i
            JOIN categories c ON c.id = i.category_id
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ItemDetail {
            item: item_from_row(&row),
            category_name: row.get("category_name"),
        }))
    }

    /// All items, newest first.
    pub async fn list(&self) -> Result<Vec<Item>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            ORDER BY created_at DESC
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(item_from_row).collect())
    }

    /// Items in one category, newest first.
    pub async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Item>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE category_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(item_from_row).collect())
    }

    /// Replace an item's fields.
    pub async fn update(&self, id: Uuid, new_item: &NewItem) -> Result<Option<Item>> {
        info!(%id, "Updating item");

        let row = sqlx::query(&format!(
            r#"
            UPDATE items
            SET name = $2, description = $3, price = $4, quantity = $5,
                image = $6, category_id = $7
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&new_item.name)
        .bind(&new_item.description)
        .bind(new_item.price)
        .bind(new_item.quantity)
        .bind(&new_item.image)
        .bind(new_item.category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(item_from_row))
    }

    /// Delete an item. Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!(%id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
