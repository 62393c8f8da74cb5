//! Item handlers, including the multipart create/update flow.

use anyhow::Context as _;
use axum::{
    Extension,
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    middleware::CurrentUser,
    models::{Category, ItemForm, NewItem, User},
    uploads::{self, IMAGE_REQUIRED_MESSAGE, IMAGE_TYPE_MESSAGE},
    validation::{FormState, validate_item_form},
};

use super::{base_context, item_context, parse_id};

/// Items all live on the home page; the bare collection route goes
/// there.
pub async fn index() -> Redirect {
    Redirect::to("/")
}

/// Item detail page, with the category name joined in.
pub async fn detail(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let item = state
        .items
        .find_detail(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let categories = state.categories.list().await?;

    let mut ctx = base_context(&item.item.name, Some(&user), &categories);
    let mut value = item_context(&item.item);
    value["category_name"] = serde_json::Value::String(item.category_name.clone());
    ctx.insert("item", &value);

    state.renderer.render("item_detail.html", &ctx)
}

/// An image part pulled out of the multipart body.
struct UploadedFile {
    original_name: String,
    content_type: String,
    data: Vec<u8>,
}

/// Drain the multipart body into the raw text form plus the image
/// part, if one was submitted. A file input left empty arrives as a
/// part with an empty filename and counts as absent.
async fn read_item_form(mut multipart: Multipart) -> AppResult<(ItemForm, Option<UploadedFile>)> {
    let mut form = ItemForm::default();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .context("Reading multipart field")?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let original_name = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().unwrap_or("").to_string();
            let data = field.bytes().await.context("Reading image part")?;
            if !original_name.is_empty() && !data.is_empty() {
                upload = Some(UploadedFile {
                    original_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await.context("Reading form field")?;
        match name.as_str() {
            "name" => form.name = Some(value),
            "description" => form.description = Some(value),
            "price" => form.price = Some(value),
            "quantity" => form.quantity = Some(value),
            "category" => form.category = Some(value),
            _ => {}
        }
    }

    Ok((form, upload))
}

/// Image checks run outside the text chain because the value is a
/// file part. The error lands on the form's "image" field.
fn check_image(form: &mut FormState, upload: Option<&UploadedFile>) {
    match upload {
        None => form.set_error("image", IMAGE_REQUIRED_MESSAGE),
        Some(file) => {
            if !uploads::is_acceptable_image(&file.original_name, &file.content_type) {
                form.set_error("image", IMAGE_TYPE_MESSAGE);
            }
        }
    }
}

/// The category must exist in the store, not merely parse. Attaches
/// the same message the format rule uses.
async fn check_category(state: &AppState, form: &mut FormState) -> AppResult<Option<Uuid>> {
    if !form.field_is_valid("category") {
        return Ok(None);
    }

    let id = match Uuid::parse_str(form.value("category")) {
        Ok(id) => id,
        Err(_) => {
            form.set_error("category", "Category must be a valid category");
            return Ok(None);
        }
    };

    if state.categories.find_by_id(id).await?.is_none() {
        form.set_error("category", "Category must be a valid category");
        return Ok(None);
    }

    Ok(Some(id))
}

/// Assemble the store payload from a fully validated form.
fn build_new_item(
    form: &FormState,
    image: String,
    category_id: Uuid,
) -> Result<NewItem, AppError> {
    let price: f64 = form
        .value("price")
        .parse()
        .context("Validated price failed to parse")?;
    let quantity: i32 = form
        .value("quantity")
        .parse()
        .context("Validated quantity failed to parse")?;

    Ok(NewItem {
        name: form.value("name").to_string(),
        description: form.value("description").to_string(),
        price,
        quantity,
        image,
        category_id,
    })
}

fn render_item_form(
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

    state.renderer.render("item_form.html", &ctx)
}

fn blank_item_form() -> FormState {
    FormState::prefilled(&[
        ("name", ""),
        ("description", ""),
        ("price", ""),
        ("quantity", ""),
        ("category", ""),
    ])
}

/// Blank item form with the category choices.
pub async fn create_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let categories = state.categories.list().await?;

    render_item_form(
        &state,
        &user,
        &categories,
        "Create Item",
        &blank_item_form(),
        "/items/create",
    )
}

/// Create an item from the multipart submission.
///
/// The image is written to disk only after every field has passed, so
/// a rejected form never leaves an orphaned file behind.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (payload, upload) = read_item_form(multipart).await?;

    let mut form = validate_item_form(&payload);
    check_image(&mut form, upload.as_ref());
    let category_id = check_category(&state, &mut form).await?;

    let (Some(category_id), Some(upload), true) = (category_id, upload, form.is_valid()) else {
        let categories = state.categories.list().await?;
        return Ok(render_item_form(
            &state,
            &user,
            &categories,
            "Create Item",
            &form,
            "/items/create",
        )?
        .into_response());
    };

    let filename = state
        .uploads
        .store_image(&upload.original_name, &upload.data)
        .await?;
    let item = state
        .items
        .create(&build_new_item(&form, filename, category_id)?)
        .await?;

    Ok(Redirect::to(&item.url()).into_response())
}

/// Update form, prefilled from the stored item. The image must be
/// re-submitted; file inputs cannot be prefilled.
pub async fn update_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let item = state.items.find_by_id(id).await?.ok_or(AppError::NotFound)?;

    let categories = state.categories.list().await?;
    let form = FormState::prefilled(&[
        ("name", &item.name),
        ("description", &item.description),
        ("price", &item.price.to_string()),
        ("quantity", &item.quantity.to_string()),
        ("category", &item.category_id.to_string()),
    ]);

    render_item_form(
        &state,
        &user,
        &categories,
        "Update Item",
        &form,
        &format!("/items/{id}/update"),
    )
}

/// Replace an item from the multipart submission.
pub async fn update_post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    state.items.find_by_id(id).await?.ok_or(AppError::NotFound)?;

    let (payload, upload) = read_item_form(multipart).await?;

    let mut form = validate_item_form(&payload);
    check_image(&mut form, upload.as_ref());
    let category_id = check_category(&state, &mut form).await?;

    let (Some(category_id), Some(upload), true) = (category_id, upload, form.is_valid()) else {
        let categories = state.categories.list().await?;
        return Ok(render_item_form(
            &state,
            &user,
            &categories,
            "Update Item",
            &form,
            &format!("/items/{id}/update"),
        )?
        .into_response());
    };

    let filename = state
        .uploads
        .store_image(&upload.original_name, &upload.data)
        .await?;
    let item = state
        .items
        .update(id, &build_new_item(&form, filename, category_id)?)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Redirect::to(&item.url()).into_response())
}

/// Confirmation page before deleting an item.
pub async fn delete_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let item = state.items.find_by_id(id).await?.ok_or(AppError::NotFound)?;

    let categories = state.categories.list().await?;

    let mut ctx = base_context("Delete Item", Some(&user), &categories);
    ctx.insert("item", &item_context(&item));

    state.renderer.render("item_delete.html", &ctx)
}

/// Delete an item and go back to the listing.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    if !state.items.delete(id).await? {
        return Err(AppError::NotFound);
    }

    Ok(Redirect::to("/"))
}
