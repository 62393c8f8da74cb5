//! User administration handlers.

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    middleware::CurrentUser,
    models::{Category, NewUser, User, UserForm},
    validation::{FormState, validate_user_form},
};

use super::{base_context, parse_id};

const USERNAME_TAKEN_MESSAGE: &str = "This username is already taken.";

/// User directory, ordered by first name.
pub async fn index(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let categories = state.categories.list().await?;
    let users = state.users.list().await?;

    let mut ctx = base_context("Users", Some(&user), &categories);
    ctx.insert("users", &users);

    state.renderer.render("user_list.html", &ctx)
}

/// A user's detail page. One's own id lives at `/profile` instead.
pub async fn detail(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    if id == current.id {
        return Ok(Redirect::to("/profile").into_response());
    }

    let user = state.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    let categories = state.categories.list().await?;

    let mut ctx = base_context(&user.full_name(), Some(&current), &categories);
    ctx.insert("user", &user);

    Ok(state.renderer.render("user_detail.html", &ctx)?.into_response())
}

/// Username uniqueness needs the store, so it runs after the chain.
/// `allow` exempts the user being updated from matching itself.
async fn check_username_free(
    state: &AppState,
    form: &mut FormState,
    allow: Option<Uuid>,
) -> AppResult<()> {
    if !form.field_is_valid("username") {
        return Ok(());
    }

    if let Some(existing) = state.users.find_by_username(form.value("username")).await? {
        if Some(existing.id) != allow {
            form.set_error("username", USERNAME_TAKEN_MESSAGE);
        }
    }

    Ok(())
}

/// Assemble the store payload from a fully validated form.
fn build_new_user(form: &FormState) -> NewUser {
    NewUser {
        username: form.value("username").to_string(),
        password: form.value("password").to_string(),
        email: form.value("email").to_string(),
        is_admin: form.value("is_admin") == "true",
        first_name: form.value("first_name").to_string(),
        family_name: form.value("family_name").to_string(),
    }
}

fn render_user_form(
    state: &AppState,
    user: &User,
    categories: &[Category],
    title: &str,
    form: &FormState,
    action: &str,
) -> Result<Html<String>, AppError> {
    let mut ctx = base_context(title, Some(user), categories);
    ctx.insert("form", form);
    ctx.insert("action", action);

    state.renderer.render("user_form.html", &ctx)
}

fn blank_user_form() -> FormState {
    FormState::prefilled(&[
        ("username", ""),
        ("password", ""),
        ("confirm_password", ""),
        ("email", ""),
        ("is_admin", "false"),
        ("first_name", ""),
        ("family_name", ""),
    ])
}

/// Blank user form.
pub async fn create_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let categories = state.categories.list().await?;

    render_user_form(
        &state,
        &user,
        &categories,
        "Create User",
        &blank_user_form(),
        "/users/create",
    )
}

/// Create a user, or re-render the form with per-field messages.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Form(payload): Form<UserForm>,
) -> AppResult<Response> {
    let mut form = validate_user_form(&payload);
    check_username_free(&state, &mut form, None).await?;

    if !form.is_valid() {
        let categories = state.categories.list().await?;
        return Ok(render_user_form(
            &state,
            &current,
            &categories,
            "Create User",
            &form,
            "/users/create",
        )?
        .into_response());
    }

    let user = state.users.create(&build_new_user(&form)).await?;
    Ok(Redirect::to(&user.url()).into_response())
}

/// Update form, prefilled from the stored user. Password fields start
/// empty; a fresh password must be entered to save.
pub async fn update_get(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let user = state.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;

    let categories = state.categories.list().await?;
    let form = FormState::prefilled(&[
        ("username", &user.username),
        ("password", ""),
        ("confirm_password", ""),
        ("email", &user.email),
        ("is_admin", if user.is_admin { "true" } else { "false" }),
        ("first_name", &user.first_name),
        ("family_name", &user.family_name),
    ]);

    render_user_form(
        &state,
        &current,
        &categories,
        "Update User",
        &form,
        &format!("/users/{id}/update"),
    )
}

/// Apply an update, or re-render the form with per-field messages.
pub async fn update_post(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(payload): Form<UserForm>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    state.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;

    let mut form = validate_user_form(&payload);
    check_username_free(&state, &mut form, Some(id)).await?;

    if !form.is_valid() {
        let categories = state.categories.list().await?;
        return Ok(render_user_form(
            &state,
            &current,
            &categories,
            "Update User",
            &form,
            &format!("/users/{id}/update"),
        )?
        .into_response());
    }

    let user = state
        .users
        .update(id, &build_new_user(&form))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Redirect::to(&user.url()).into_response())
}

/// Confirmation page before deleting a user. Deleting oneself is not
/// offered; the request is sent back to the profile.
pub async fn delete_get(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    if id == current.id {
        return Ok(Redirect::to("/profile").into_response());
    }

    let user = state.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    let categories = state.categories.list().await?;

    let mut ctx = base_context("Delete User", Some(&current), &categories);
    ctx.insert("user", &user);

    Ok(state
        .renderer
        .render("user_delete.html", &ctx)?
        .into_response())
}

/// Delete a user and return to the directory. A user may never delete
/// their own account.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    if id == current.id {
        return Ok(Redirect::to("/profile").into_response());
    }

    if !state.users.delete(id).await? {
        return Err(AppError::NotFound);
    }

    Ok(Redirect::to("/users").into_response())
}
