use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::{cache, database};
use web::{
    AppState,
    config::ServerConfig,
    repositories::{CategoryRepository, ItemRepository, UserRepository},
    routes,
    session::{SessionConfig, SessionStore},
    uploads::UploadConfig,
    views::Renderer,
};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting stocklist web service");

    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations applied");

    let redis_config = cache::RedisConfig::from_env()?;
    let redis_pool = cache::RedisPool::new(&redis_config).await?;

    let session_config = SessionConfig::from_env()?;
    let sessions = SessionStore::new(redis_pool.clone(), session_config);

    let upload_config = UploadConfig::from_env()?;
    upload_config.ensure_dir().await?;

    let renderer = Renderer::from_env()?;

    let app_state = AppState {
        db_pool: pool.clone(),
        redis_pool,
        sessions,
        renderer,
        users: UserRepository::new(pool.clone()),
        categories: CategoryRepository::new(pool.clone()),
        items: ItemRepository::new(pool),
        uploads: upload_config,
    };

    let server_config = ServerConfig::from_env()?;
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr).await?;
    info!("Stocklist listening on {}", server_config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
