//! Application error type and its HTTP mapping.
//!
//! Authorization failures turn into redirects and missing or malformed
//! identifiers into 404s; only store and template failures surface as
//! 500s. Validation failures never reach this type — handlers recover
//! them locally by re-rendering the form.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

/// Errors a request handler can bubble up to the boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// The referenced entity does not exist (covers malformed ids).
    #[error("Not found")]
    NotFound,

    /// No valid session is bound to the request.
    #[error("Unauthorized")]
    Unauthorized,

    /// A session is bound but lacks the admin role.
    #[error("Forbidden")]
    Forbidden,

    /// View rendering failure.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Store or infrastructure failure; no local recovery.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            AppError::Unauthorized => Redirect::to("/login").into_response(),
            AppError::Forbidden => Redirect::to("/").into_response(),
            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Result alias for request handlers.
pub type AppResult<T> = Result<T, AppError>;
