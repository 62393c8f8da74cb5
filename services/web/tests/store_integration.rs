//! Entity store integration tests.
//!
//! Requires a live PostgreSQL instance reachable through `DATABASE_URL`
//! with the migrations applied (the harness runs them itself), and a
//! Redis server at localhost:6379 for the session round trip.

use axum::{http::StatusCode, response::IntoResponse};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, init_pool},
};
use sqlx::{PgPool, Row};
use uuid::Uuid;
use web::{
    AppState,
    models::{NewItem, NewUser},
    repositories::{CategoryRepository, ItemRepository, UserRepository},
    routes,
    session::{SessionConfig, SessionStore},
    uploads::UploadConfig,
    views::Renderer,
};

async fn test_pool() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

fn sample_item(category_id: Uuid, suffix: &str) -> NewItem {
    NewItem {
        name: format!("Test item {suffix}"),
        description: "An item created by the integration suite".to_string(),
        price: 4.5,
        quantity: 3,
        // Image names are unique in the schema.
        image: format!("{}.png", Uuid::new_v4()),
        category_id,
    }
}

async fn item_count(pool: &PgPool, category_id: Uuid) -> Result<i64, Box<dyn std::error::Error>> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM items WHERE category_id = $1")
        .bind(category_id)
        .fetch_one(pool)
        .await?;
    Ok(row.get("count"))
}

#[tokio::test]
async fn deleting_a_category_removes_its_items_atomically()
-> Result<(), Box<dyn std::error::Error>> {
    let pool = test_pool().await?;
    let categories = CategoryRepository::new(pool.clone());
    let items = ItemRepository::new(pool.clone());

    let category = categories
        .create("Integration cascade", "Deleted together with its items")
        .await?;

    for n in 0..3 {
        items.create(&sample_item(category.id, &n.to_string())).await?;
    }
    assert_eq!(item_count(&pool, category.id).await?, 3);

    categories.delete_with_items(category.id).await?;

    assert_eq!(item_count(&pool, category.id).await?, 0);
    assert!(categories.find_by_id(category.id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn uncommitted_delete_rolls_back() -> Result<(), Box<dyn std::error::Error>> {
    let pool = test_pool().await?;
    let categories = CategoryRepository::new(pool.clone());
    let items = ItemRepository::new(pool.clone());

    let category = categories
        .create("Integration rollback", "Survives an aborted transaction")
        .await?;
    let item = items.create(&sample_item(category.id, "rollback")).await?;

    {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM items WHERE category_id = $1")
            .bind(category.id)
            .execute(&mut *tx)
            .await?;
        // Dropped without commit: the delete must not take effect.
    }

    assert_eq!(item_count(&pool, category.id).await?, 1);
    assert!(items.find_by_id(item.id).await?.is_some());

    categories.delete_with_items(category.id).await?;
    Ok(())
}

#[tokio::test]
async fn session_resolves_only_while_user_and_token_exist()
-> Result<(), Box<dyn std::error::Error>> {
    let pool = test_pool().await?;
    let users = UserRepository::new(pool.clone());

    let redis_pool = RedisPool::new(&RedisConfig {
        url: "redis://localhost:6379".to_string(),
    })
    .await?;
    let sessions = SessionStore::new(redis_pool, SessionConfig { ttl_seconds: 60 });

    let user = users
        .create(&NewUser {
            username: format!("it-{}", Uuid::new_v4()),
            password: "hunter42".to_string(),
            email: "integration@example.com".to_string(),
            is_admin: false,
            first_name: "Inte".to_string(),
            family_name: "Gration".to_string(),
        })
        .await?;

    let token = sessions.create(user.id).await?;
    assert_eq!(sessions.user_id(&token).await?, Some(user.id));

    // The token may outlive the user; identity resolution then has to
    // come up empty at the user lookup.
    assert!(users.delete(user.id).await?);
    let resolved = match sessions.user_id(&token).await? {
        Some(id) => users.find_by_id(id).await?,
        None => None,
    };
    assert!(resolved.is_none());

    sessions.destroy(&token).await?;
    Ok(())
}

#[tokio::test]
async fn health_endpoint_probes_both_stores() -> Result<(), Box<dyn std::error::Error>> {
    let pool = test_pool().await?;
    let redis_pool = RedisPool::new(&RedisConfig {
        url: "redis://localhost:6379".to_string(),
    })
    .await?;

    let state = AppState {
        db_pool: pool.clone(),
        redis_pool: redis_pool.clone(),
        sessions: SessionStore::new(redis_pool, SessionConfig { ttl_seconds: 60 }),
        renderer: Renderer::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"))?,
        users: UserRepository::new(pool.clone()),
        categories: CategoryRepository::new(pool.clone()),
        items: ItemRepository::new(pool),
        uploads: UploadConfig {
            dir: "public/images".into(),
        },
    };

    let response = routes::health_check(axum::extract::State(state))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(value["status"], "ok");
    assert_eq!(value["database"], true);
    assert_eq!(value["redis"], true);

    Ok(())
}
