//! Multipart form decoding.
//!
//! Writes arrive as multipart forms carrying text fields and at most one
//! file part named `image`. The file part is spooled to the media tmp
//! partition; the caller owns the spooled file and removes it once the
//! transcode step that reads it has completed.

use crate::errors::ServiceError;
use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// An upload spooled to disk, keeping its client-side extension.
#[derive(Debug)]
pub struct TempUpload {
    pub path: PathBuf,
    pub original_name: String,
}

/// Decoded multipart request: text fields plus an optional upload.
#[derive(Debug, Default)]
pub struct FormFields {
    fields: HashMap<String, String>,
    pub upload: Option<TempUpload>,
}

impl FormFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Missing required fields fail the validation gate.
    pub fn require(&self, name: &str) -> Result<&str, ServiceError> {
        self.get(name)
            .ok_or_else(|| ServiceError::ValidationRejected(format!("{} is required", name)))
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            upload: None,
        }
    }
}

/// Drains a multipart stream into a `FormFields`, spooling the `image`
/// part under `spool_dir`. Decoder failures abort the request before any
/// gate runs.
pub async fn collect(mut multipart: Multipart, spool_dir: &Path) -> Result<FormFields, ServiceError> {
    let mut form = FormFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::BadRequest(format!("malformed form data: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(original_name) if name == "image" => {
                let extension = Path::new(&original_name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("bin")
                    .to_string();

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::BadRequest(format!("malformed form data: {}", e)))?;

                tokio::fs::create_dir_all(spool_dir)
                    .await
                    .map_err(|e| ServiceError::BadRequest(format!("upload spool failed: {}", e)))?;

                let path = spool_dir.join(format!("upload-{}.{}", Uuid::new_v4(), extension));
                tokio::fs::write(&path, &bytes)
                    .await
                    .map_err(|e| ServiceError::BadRequest(format!("upload spool failed: {}", e)))?;

                form.upload = Some(TempUpload {
                    path,
                    original_name,
                });
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ServiceError::BadRequest(format!("malformed form data: {}", e)))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}
