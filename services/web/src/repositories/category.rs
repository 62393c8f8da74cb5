//! Category repository, including the cascading transactional delete.

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::Category;

fn category_from_row(row: &PgRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
    }
}

/// Category repository over the entity store.
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a category.
    pub async fn create(&self, name: &str, description: &str) -> Result<Category> {
        info!("Creating category: {}", name);

        let row = sqlx::query(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(category_from_row(&row))
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    /// All categories, ordered by name.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description
            FROM categories
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    /// Replace a category's fields.
    pub async fn update(&self, id: Uuid, name: &str, description: &str) -> Result<Option<Category>> {
        info!(%id, "Updating category");

        let row = sqlx::query(
            r#"
            UPDATE categories
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    /// Delete a category and every item referencing it, atomically.
    ///
    /// Both deletes run inside one transaction: either the category and
    /// all of its items are gone afterwards, or the store is untouched.
    /// Any failure aborts the transaction (rollback happens when the
    /// uncommitted transaction drops) and propagates to the caller.
    pub async fn delete_with_items(&self, id: Uuid) -> Result<()> {
        info!(%id, "Deleting category and its items");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM items WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
