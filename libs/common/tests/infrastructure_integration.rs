//! Infrastructure integration tests.
//!
//! Verifies that PostgreSQL and Redis are reachable with the
//! configuration the application boots with. Requires live services
//! and a `DATABASE_URL` in the environment.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool},
};
use sqlx::Row;

#[tokio::test]
async fn postgres_and_redis_are_reachable() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1);

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    assert!(redis_pool.health_check().await?, "redis health check failed");

    redis_pool.set("infra_test_key", "infra_test_value", Some(10)).await?;
    assert_eq!(
        redis_pool.get("infra_test_key").await?,
        Some("infra_test_value".to_string())
    );

    redis_pool.delete("infra_test_key").await?;
    assert_eq!(redis_pool.get("infra_test_key").await?, None);

    Ok(())
}
