//! Category handlers: browse, create, update, and the cascading delete.

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    middleware::CurrentUser,
    models::{Category, CategoryForm, User},
    validation::{FormState, validate_category_form},
};

use super::{base_context, item_context, parse_id};

/// The category list is the navigation sidebar on every page, so the
/// bare collection route just goes home.
pub async fn index() -> Redirect {
    Redirect::to("/")
}

/// One category's page: its description and every item filed under it.
pub async fn items_by_category(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let categories = state.categories.list().await?;
    let items = state.items.list_by_category(id).await?;

    let mut ctx = base_context(
        &format!("Inventory - {}", category.name),
        Some(&user),
        &categories,
    );
    ctx.insert("category", &category);
    ctx.insert(
        "items",
        &items.iter().map(item_context).collect::<Vec<_>>(),
    );

    state.renderer.render("index.html", &ctx)
}

fn render_category_form(
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

    state.renderer.render("category_form.html", &ctx)
}

/// Blank category form.
pub async fn create_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let categories = state.categories.list().await?;
    let form = FormState::prefilled(&[("name", ""), ("description", "")]);

    render_category_form(
        &state,
        &user,
        &categories,
        "Create Category",
        &form,
        "/categories/create",
    )
}

/// Create a category, or re-render the form with per-field messages.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(payload): Form<CategoryForm>,
) -> AppResult<Response> {
    let form = validate_category_form(&payload);

    if !form.is_valid() {
        let categories = state.categories.list().await?;
        return Ok(render_category_form(
            &state,
            &user,
            &categories,
            "Create Category",
            &form,
            "/categories/create",
        )?
        .into_response());
    }

    let category = state
        .categories
        .create(form.value("name"), form.value("description"))
        .await?;

    Ok(Redirect::to(&category.url()).into_response())
}

/// Update form, prefilled from the stored category.
pub async fn update_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let categories = state.categories.list().await?;
    let form = FormState::prefilled(&[
        ("name", &category.name),
        ("description", &category.description),
    ]);

    render_category_form(
        &state,
        &user,
        &categories,
        "Update Category",
        &form,
        &format!("/categories/{id}/update"),
    )
}

/// Apply an update, or re-render the form with per-field messages.
pub async fn update_post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(payload): Form<CategoryForm>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    let form = validate_category_form(&payload);

    if !form.is_valid() {
        let categories = state.categories.list().await?;
        return Ok(render_category_form(
            &state,
            &user,
            &categories,
            "Update Category",
            &form,
            &format!("/categories/{id}/update"),
        )?
        .into_response());
    }

    let category = state
        .categories
        .update(id, form.value("name"), form.value("description"))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Redirect::to(&category.url()).into_response())
}

/// Confirmation page listing everything the delete will take with it.
pub async fn delete_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let categories = state.categories.list().await?;
    let items = state.items.list_by_category(id).await?;

    let mut ctx = base_context("Delete Category", Some(&user), &categories);
    ctx.insert("category", &category);
    ctx.insert(
        "items",
        &items.iter().map(item_context).collect::<Vec<_>>(),
    );

    state.renderer.render("category_delete.html", &ctx)
}

/// Delete the category and all of its items in one transaction.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    state
        .categories
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;

    state.categories.delete_with_items(id).await?;
    Ok(Redirect::to("/"))
}
