//! Stored image lifecycle: canonical filename derivation, transcoding of
//! uploads into a stored full-size image plus a derived thumbnail, and
//! best-effort removal of superseded or deleted files.
//!
//! Stored files live under `{root}/img/{collection}/` and
//! `{root}/thumb/{collection}/`; uploads are spooled under `{root}/tmp/`
//! until the transcode that reads them has completed.

use crate::config::MediaConfig;
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// What an image-bearing entity stores on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// A bounded full-size render plus a thumbnail (articles, products,
    /// projects, gallery images)
    FullAndThumb,
    /// Thumbnail only (user avatars)
    ThumbnailOnly,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("unsupported image format: {0}")]
    Format(String),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker failed: {0}")]
    Worker(String),
}

impl From<MediaError> for crate::errors::ServiceError {
    fn from(err: MediaError) -> Self {
        crate::errors::ServiceError::MediaError(err.to_string())
    }
}

/// Normalizes a display name into a filename-safe slug: diacritics folded,
/// lowercase, whitespace turned into hyphens, everything else dropped.
pub fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());

    for c in value.to_lowercase().chars() {
        if c.is_whitespace() {
            out.push('-');
        } else if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
        } else {
            out.push_str(fold_diacritic(c));
        }
    }

    out
}

fn fold_diacritic(c: char) -> &'static str {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        _ => "",
    }
}

/// Filesystem store for entity images and thumbnails.
pub struct MediaStore {
    root: PathBuf,
    cfg: MediaConfig,
}

impl MediaStore {
    pub fn new(cfg: MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&cfg.root),
            cfg,
        }
    }

    /// Creates the base partitions; called once at startup.
    pub async fn prepare(&self) -> Result<(), MediaError> {
        for dir in ["img", "thumb", "tmp"] {
            tokio::fs::create_dir_all(self.root.join(dir)).await?;
        }
        Ok(())
    }

    /// Spool directory for multipart uploads.
    pub fn upload_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    /// Canonical stored filename: slug plus a millisecond timestamp token,
    /// so repeated edits of the same record never collide.
    pub fn stored_name(&self, display: &str) -> String {
        format!(
            "{}-{}.{}",
            slug(display),
            chrono::Utc::now().timestamp_millis(),
            self.cfg.image_ext
        )
    }

    /// Poster filename used for gallery covers (derived, no upload).
    pub fn poster_name(&self, display: &str) -> String {
        format!("{}-01.{}", slug(display), self.cfg.image_ext)
    }

    pub fn image_path(&self, collection: &str, name: &str) -> PathBuf {
        self.root.join("img").join(collection).join(name)
    }

    pub fn thumb_path(&self, collection: &str, name: &str) -> PathBuf {
        self.root.join("thumb").join(collection).join(self.thumb_name(name))
    }

    /// Thumbnails share the stored stem but carry the configured thumbnail
    /// extension.
    fn thumb_name(&self, stored: &str) -> String {
        match stored.rsplit_once('.') {
            Some((stem, _)) => format!("{}.{}", stem, self.cfg.thumb_ext),
            None => format!("{}.{}", stored, self.cfg.thumb_ext),
        }
    }

    /// Transcodes an uploaded file into the stored image and thumbnail.
    ///
    /// The upload is only read, never moved: callers remove it themselves
    /// once this step has completed (success or failure).
    pub async fn ingest(
        &self,
        collection: &str,
        upload: &Path,
        stored: &str,
        kind: ImageKind,
    ) -> Result<(), MediaError> {
        let image_path = self.image_path(collection, stored);
        let thumb_path = self.thumb_path(collection, stored);

        if let Some(parent) = image_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if let Some(parent) = thumb_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let image_format = format_for(&self.cfg.image_ext)?;
        let thumb_format = format_for(&self.cfg.thumb_ext)?;

        let upload = upload.to_path_buf();
        let cfg = self.cfg.clone();

        // Decode and re-encode off the async runtime; both outputs are
        // written before the caller persists the row referencing them.
        tokio::task::spawn_blocking(move || -> Result<(), MediaError> {
            let source = image::open(&upload)?;

            if kind == ImageKind::FullAndThumb {
                let full = source.resize(cfg.image_width, cfg.image_height, FilterType::Lanczos3);
                full.save_with_format(&image_path, image_format)?;
            }

            let thumb = if cfg.thumb_fit == "contain" {
                source.resize(cfg.thumb_width, cfg.thumb_height, FilterType::Lanczos3)
            } else {
                cover_crop(
                    &source,
                    cfg.thumb_width,
                    cfg.thumb_height,
                    &cfg.thumb_position,
                )
            };
            thumb.save_with_format(&thumb_path, thumb_format)?;

            Ok(())
        })
        .await
        .map_err(|e| MediaError::Worker(e.to_string()))?
    }

    /// Best-effort removal of a stored image and its thumbnail. A missing
    /// file is not an error: deletes must succeed even when the files are
    /// already gone.
    pub async fn remove(&self, collection: &str, stored: &str) {
        for path in [
            self.image_path(collection, stored),
            self.thumb_path(collection, stored),
        ] {
            if let Err(err) = tokio::fs::remove_file(&path).await {
                debug!(path = %path.display(), %err, "stored file removal skipped");
            }
        }
    }

    /// Best-effort removal of a spooled upload.
    pub async fn discard_upload(&self, upload: &Path) {
        if let Err(err) = tokio::fs::remove_file(upload).await {
            warn!(path = %upload.display(), %err, "upload removal skipped");
        }
    }
}

fn format_for(ext: &str) -> Result<ImageFormat, MediaError> {
    ImageFormat::from_extension(ext).ok_or_else(|| MediaError::Format(ext.to_string()))
}

/// Scales the source to cover the target box, then crops the overflow
/// anchored at the configured position.
fn cover_crop(source: &DynamicImage, width: u32, height: u32, position: &str) -> DynamicImage {
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return source.clone();
    }

    let scale = f64::max(width as f64 / w as f64, height as f64 / h as f64);
    let scaled_w = ((w as f64 * scale).ceil() as u32).max(width);
    let scaled_h = ((h as f64 * scale).ceil() as u32).max(height);

    let resized = source.resize_exact(scaled_w, scaled_h, FilterType::Lanczos3);

    let x = anchor(scaled_w - width, position);
    let y = anchor(scaled_h - height, position);

    resized.crop_imm(x, y, width, height)
}

fn anchor(overflow: u32, position: &str) -> u32 {
    match position {
        "start" => 0,
        "end" => overflow,
        _ => overflow / 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;

    fn store_at(root: &Path) -> MediaStore {
        MediaStore::new(MediaConfig {
            root: root.to_string_lossy().into_owned(),
            image_ext: "png".into(),
            thumb_ext: "png".into(),
            thumb_width: 8,
            thumb_height: 8,
            image_width: 32,
            image_height: 32,
            ..Default::default()
        })
    }

    #[test]
    fn slug_folds_accents_and_whitespace() {
        assert_eq!(slug("Rénée Joséphine ñoño"), "renee-josephine-nono");
        assert_eq!(slug(""), "");
        assert_eq!(slug("foobar"), "foobar");
        assert_eq!(slug("Hello World"), "hello-world");
    }

    #[test]
    fn stored_name_carries_timestamp_token() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_at(tmp.path());

        let name = store.stored_name("Hello World");
        assert!(name.starts_with("hello-world-"));
        assert!(name.ends_with(".png"));

        let token = name
            .strip_prefix("hello-world-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .unwrap();
        assert!(token.parse::<i64>().is_ok());
    }

    #[test]
    fn poster_name_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_at(tmp.path());
        assert_eq!(store.poster_name("Mes Vacances"), "mes-vacances-01.png");
    }

    #[tokio::test]
    async fn ingest_writes_both_outputs_and_remove_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_at(tmp.path());
        store.prepare().await.unwrap();

        // Spool a small source image
        let upload = store.upload_dir().join("upload.png");
        image::RgbImage::from_pixel(16, 12, image::Rgb([120, 10, 10]))
            .save_with_format(&upload, ImageFormat::Png)
            .unwrap();

        store
            .ingest("articles", &upload, "demo-1.png", ImageKind::FullAndThumb)
            .await
            .unwrap();

        let image_path = store.image_path("articles", "demo-1.png");
        let thumb_path = store.thumb_path("articles", "demo-1.png");
        assert!(image_path.exists());
        assert!(thumb_path.exists());

        let thumb = image::open(&thumb_path).unwrap();
        assert_eq!(thumb.dimensions(), (8, 8));

        store.remove("articles", "demo-1.png").await;
        assert!(!image_path.exists());
        assert!(!thumb_path.exists());

        // Removing again must not fail
        store.remove("articles", "demo-1.png").await;
    }

    #[tokio::test]
    async fn ingest_rejects_non_image_upload() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_at(tmp.path());
        store.prepare().await.unwrap();

        let upload = store.upload_dir().join("not-an-image");
        tokio::fs::write(&upload, b"plain text").await.unwrap();

        let result = store
            .ingest("articles", &upload, "bad-1.png", ImageKind::FullAndThumb)
            .await;
        assert!(result.is_err());
    }
}
