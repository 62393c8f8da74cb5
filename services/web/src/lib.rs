//! Stocklist web service.
//!
//! Server-rendered inventory management: authenticated users browse
//! items and categories, administrators manage items, categories, and
//! user accounts. Persistence lives in PostgreSQL, sessions in Redis,
//! views in tera templates.

use common::cache::RedisPool;
use sqlx::PgPool;

pub mod config;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod uploads;
pub mod validation;
pub mod views;

use crate::{
    repositories::{CategoryRepository, ItemRepository, UserRepository},
    session::SessionStore,
    uploads::UploadConfig,
    views::Renderer,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis_pool: RedisPool,
    pub sessions: SessionStore,
    pub renderer: Renderer,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub items: ItemRepository,
    pub uploads: UploadConfig,
}
