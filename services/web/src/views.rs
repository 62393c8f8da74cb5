//! Template renderer boundary.
//!
//! Handlers hand over a view name and a context; HTML only ever comes
//! out of the tera instance behind this seam.

use std::sync::Arc;

use anyhow::Result;
use axum::response::Html;
use tera::{Context, Tera};
use tracing::info;

use crate::error::AppError;

/// Shared, clonable handle to the loaded template set.
#[derive(Clone)]
pub struct Renderer {
    tera: Arc<Tera>,
}

impl Renderer {
    /// Load templates from the configured directory.
    ///
    /// # Environment Variables
    /// - `TEMPLATE_DIR`: template directory (default: the crate's
    ///   `templates/` directory)
    pub fn from_env() -> Result<Self> {
        let dir = std::env::var("TEMPLATE_DIR")
            .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string());

        Renderer::new(&dir)
    }

    /// Load every `.html` template under `dir`.
    pub fn new(dir: &str) -> Result<Self> {
        let glob = format!("{}/**/*.html", dir.trim_end_matches('/'));
        let tera = Tera::new(&glob)
            .map_err(|e| anyhow::anyhow!("Failed to load templates from {}: {}", dir, e))?;

        info!("Templates loaded from {}", dir);
        Ok(Renderer {
            tera: Arc::new(tera),
        })
    }

    /// Render `name` with `context` into an HTML response body.
    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, AppError> {
        let body = self.tera.render(name, context)?;
        Ok(Html(body))
    }
}
