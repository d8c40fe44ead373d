//! Filesystem content store for uploaded media.
//!
//! Stored names are the upload time in unix milliseconds plus the
//! original extension, mirroring what catalog rows reference.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Common image and video extensions accepted for upload.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "jpeg", "jpg", "png", "gif", "bmp", "webp", "tiff", "svg", "mp4", "mov", "avi", "mkv", "flv",
    "wmv", "webm", "mpg", "mpeg", "3gp",
];

pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the original filename carries an accepted image/video
    /// extension whose guessed media type is image or video.
    #[must_use]
    pub fn is_allowed(original_name: &str) -> bool {
        let Some(ext) = extension_of(original_name) else {
            return false;
        };

        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return false;
        }

        mime_guess::from_ext(&ext).first().is_some_and(|mime| {
            mime.type_() == mime_guess::mime::IMAGE || mime.type_() == mime_guess::mime::VIDEO
        })
    }

    /// Write the bytes under a timestamp-based name and return the
    /// stored filename.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let extension = extension_of(original_name)
            .ok_or_else(|| anyhow::anyhow!("Upload has no file extension: {original_name}"))?;

        let filename = format!("{}.{extension}", chrono::Utc::now().timestamp_millis());

        if !self.root.exists() {
            fs::create_dir_all(&self.root).await?;
        }

        let file_path = self.root.join(&filename);

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write upload to {}", file_path.display()))?;

        info!(path = %file_path.display(), "Stored upload");

        Ok(filename)
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}
