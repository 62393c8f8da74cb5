//! Login, logout, home, and profile handlers.

use axum::{
    Extension, Form,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::info;

use crate::{
    AppState,
    credentials::{self, LOGIN_FAILED_MESSAGE},
    error::{AppError, AppResult},
    middleware::{CurrentUser, SESSION_COOKIE, resolve_user},
    validation::{FormState, validate_login_form},
};

use super::{base_context, item_context};

/// Raw login form submission.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Home page: every item, newest first, plus the category navigation.
pub async fn index(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let categories = state.categories.list().await?;
    let items = state.items.list().await?;

    let mut ctx = base_context("Inventory", Some(&user), &categories);
    ctx.insert(
        "items",
        &items.iter().map(item_context).collect::<Vec<_>>(),
    );
    ctx.insert("category", &serde_json::Value::Null);

    state.renderer.render("index.html", &ctx)
}

fn render_login(state: &AppState, form: &FormState, auth_error: &str) -> Result<Html<String>, AppError> {
    let mut ctx = base_context("Login", None, &[]);
    ctx.insert("form", form);
    ctx.insert("auth_error", auth_error);

    state.renderer.render("login.html", &ctx)
}

/// Login page. Already-authenticated visitors go straight home.
pub async fn login_get(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if resolve_user(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let form = FormState::prefilled(&[("username", ""), ("password", "")]);
    Ok(render_login(&state, &form, "")?.into_response())
}

/// Handle a login attempt.
///
/// Validation failures re-render the form with per-field messages. A
/// failed credential check re-renders with one generic message — the
/// page never reveals whether the username or the password was wrong.
pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(payload): Form<LoginForm>,
) -> AppResult<Response> {
    let form = validate_login_form(payload.username.as_deref(), payload.password.as_deref());

    // Password inputs are never re-filled by the template, so the form
    // state can be re-displayed as-is.
    if !form.is_valid() {
        return Ok(render_login(&state, &form, "")?.into_response());
    }

    match credentials::authenticate(&state.users, form.value("username"), form.value("password"))
        .await?
    {
        Ok(user) => {
            let token = state.sessions.create(user.id).await?;
            info!("User {} logged in", user.username);

            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build();

            Ok((jar.add(cookie), Redirect::to("/")).into_response())
        }
        Err(_) => {
            let redisplay =
                FormState::prefilled(&[("username", form.value("username")), ("password", "")]);
            Ok(render_login(&state, &redisplay, LOGIN_FAILED_MESSAGE)?.into_response())
        }
    }
}

/// Destroy the session and clear the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> AppResult<impl IntoResponse> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await?;
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    Ok((jar.remove(removal), Redirect::to("/login")))
}

/// The logged-in user's own detail page.
pub async fn profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let categories = state.categories.list().await?;

    let mut ctx = base_context("Profile", Some(&user), &categories);
    ctx.insert("user", &user);

    state.renderer.render("user_detail.html", &ctx)
}
