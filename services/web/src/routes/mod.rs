//! Route assembly and handler helpers.
//!
//! Three scopes: public (health, login), authenticated (browsing), and
//! admin (every mutating form). The guards are applied per scope with
//! `route_layer`, so a request that fails admission is answered with a
//! redirect before any handler runs.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    middleware::{require_admin, require_authenticated},
    models::{Category, Item, User},
};

pub mod auth;
pub mod categories;
pub mod items;
pub mod users;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/categories/create",
            get(categories::create_get).post(categories::create_post),
        )
        .route(
            "/categories/:id/update",
            get(categories::update_get).post(categories::update_post),
        )
        .route(
            "/categories/:id/delete",
            get(categories::delete_get).post(categories::delete_post),
        )
        .route("/items/create", get(items::create_get).post(items::create_post))
        .route(
            "/items/:id/update",
            get(items::update_get).post(items::update_post),
        )
        .route(
            "/items/:id/delete",
            get(items::delete_get).post(items::delete_post),
        )
        .route("/users/create", get(users::create_get).post(users::create_post))
        .route(
            "/users/:id/update",
            get(users::update_get).post(users::update_post),
        )
        .route(
            "/users/:id/delete",
            get(users::delete_get).post(users::delete_post),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let authenticated_routes = Router::new()
        .route("/", get(auth::index))
        .route("/profile", get(auth::profile))
        .route("/categories", get(categories::index))
        .route("/categories/:id", get(categories::items_by_category))
        .route("/items", get(items::index))
        .route("/items/:id", get(items::detail))
        .route("/users", get(users::index))
        .route("/users/:id", get(users::detail))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_authenticated,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/login", get(auth::login_get).post(auth::login_post))
        .route("/logout", post(auth::logout))
        .merge(admin_routes)
        .merge(authenticated_routes)
        .with_state(state)
}

/// Health check endpoint. Probes the entity store and the session
/// backend, reporting 503 when either is unreachable.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);
    let redis = state.redis_pool.health_check().await.unwrap_or(false);

    let status = if database && redis {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "service": "stocklist-web",
            "database": database,
            "redis": redis
        })),
    )
}

/// Parse a path identifier; anything malformed is a 404, never a
/// store-level fault.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

/// Context shared by every rendered page: title, the current user (or
/// null), and the category navigation.
pub(crate) fn base_context(
    title: &str,
    current_user: Option<&User>,
    categories: &[Category],
) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("title", title);
    ctx.insert("current_user", &current_user);
    ctx.insert("categories", categories);
    ctx
}

/// Item plus its display-derived fields, for listing templates.
pub(crate) fn item_context(item: &Item) -> serde_json::Value {
    json!({
        "id": item.id,
        "name": item.name,
        "description": item.description,
        "price": item.price,
        "price_formatted": item.price_formatted(),
        "quantity": item.quantity,
        "image_src": item.image_src(),
        "category_id": item.category_id,
        "url": item.url(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_identifier_is_not_found() {
        assert!(matches!(parse_id("definitely-not-a-uuid"), Err(AppError::NotFound)));
        assert!(matches!(parse_id(""), Err(AppError::NotFound)));
    }

    #[test]
    fn well_formed_identifier_parses() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
