//! Item image uploads.
//!
//! The web layer only validates the submitted filename and
//! content-type and records the name it stored the bytes under; the
//! static file layer serves them back by that name.

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;
use tracing::info;
use uuid::Uuid;

/// Validation message for a missing image part.
pub const IMAGE_REQUIRED_MESSAGE: &str = "Image must be specified";

/// Validation message for a non-image filename or content-type.
pub const IMAGE_TYPE_MESSAGE: &str = "Only image files are allowed";

/// Upload directory settings.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploaded images are written to.
    pub dir: PathBuf,
}

impl UploadConfig {
    /// Read the configuration from the environment.
    ///
    /// # Environment Variables
    /// - `UPLOAD_DIR`: image directory (default: "public/images")
    pub fn from_env() -> Result<Self> {
        let dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "public/images".to_string());

        Ok(UploadConfig {
            dir: PathBuf::from(dir),
        })
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Write image bytes under a fresh name and return that name.
    ///
    /// The stored name is a UUID plus the original extension, so the
    /// uniqueness the item schema demands holds without coordination.
    pub async fn store_image(&self, original_name: &str, data: &[u8]) -> Result<String> {
        let extension = image_extension(original_name)
            .ok_or_else(|| anyhow::anyhow!("Unvalidated image filename: {}", original_name))?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(self.dir.join(&filename), data).await?;

        info!(%filename, "Image stored");
        Ok(filename)
    }
}

/// Extract the image extension if the filename is an accepted image
/// type (`.jpg`, `.jpeg`, `.png`).
pub fn image_extension(filename: &str) -> Option<&str> {
    static IMAGE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = IMAGE_REGEX
        .get_or_init(|| Regex::new(r"\.(jpg|jpeg|png)$").expect("Failed to compile image regex"));

    regex
        .captures(filename)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Whether the upload looks like an image, by filename and declared
/// content-type.
pub fn is_acceptable_image(filename: &str, content_type: &str) -> bool {
    image_extension(filename).is_some() && content_type.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_three_image_extensions() {
        assert_eq!(image_extension("photo.jpg"), Some("jpg"));
        assert_eq!(image_extension("photo.jpeg"), Some("jpeg"));
        assert_eq!(image_extension("photo.png"), Some("png"));
    }

    #[test]
    fn rejects_other_extensions() {
        assert_eq!(image_extension("archive.zip"), None);
        assert_eq!(image_extension("script.png.exe"), None);
        assert_eq!(image_extension("noextension"), None);
    }

    #[test]
    fn content_type_must_be_an_image() {
        assert!(is_acceptable_image("photo.png", "image/png"));
        assert!(!is_acceptable_image("photo.png", "application/octet-stream"));
        assert!(!is_acceptable_image("payload.exe", "image/png"));
    }
}
