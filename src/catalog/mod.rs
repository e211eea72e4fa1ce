//! Entity CRUD orchestration.
//!
//! One generic [`Catalog`] sequences every write the same way:
//! validation gate, sibling uniqueness scan, image resource lifecycle,
//! persistence. The per-entity differences (field set, unique fields,
//! image policy, parent scope, persistence statements) live in a
//! [`Resource`] descriptor implemented once per entity, so the sequence
//! itself exists in exactly one place.

use crate::{
    config::LimitsConfig,
    db::DbPool,
    errors::ServiceError,
    forms::{FormFields, TempUpload},
    gates::{
        unique::{self, UniqueWitness},
        validate,
    },
    media::{ImageKind, MediaStore},
};
use async_trait::async_trait;
use sea_orm::DbErr;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

pub mod article;
pub mod gallery;
pub mod image;
pub mod link;
pub mod order;
pub mod product;
pub mod project;
pub mod user;

pub use article::ArticleResource;
pub use gallery::GalleryResource;
pub use image::ImageResource;
pub use link::LinkResource;
pub use order::OrderResource;
pub use product::ProductResource;
pub use project::ProjectResource;
pub use user::UserResource;

/// Per-entity descriptor consumed by the orchestrator.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Singular noun used in response messages ("Article").
    const NOUN: &'static str;
    /// Collection name used in messages ("articles").
    const COLLECTION: &'static str;
    /// Media partition holding this resource's files.
    const STORE_DIR: &'static str;
    /// Image handling, if the resource owns one.
    const IMAGE: Option<ImageKind>;

    type Row: UniqueWitness + Send + Sync;
    type Draft: Send + Sync;
    type View: Serialize + Send;

    /// Validation gate: bound-check the form fields into a draft.
    fn draft(form: &FormFields, limits: &LimitsConfig) -> Result<Self::Draft, ServiceError>;

    /// Extra requirements that only apply when creating (fields that may
    /// be omitted on update, like a replacement password).
    fn ensure_create(_draft: &Self::Draft) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Designated unique `(field, value)` pairs of a draft.
    fn unique_pairs(draft: &Self::Draft) -> Vec<(&'static str, String)>;

    /// Parent scope for child collections (the gallery id for images).
    fn scope(_draft: &Self::Draft) -> Option<i32> {
        None
    }

    /// Verifies the parent exists before anything is written.
    async fn ensure_scope(_db: &DbPool, _scope: Option<i32>) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Derived or expensive draft fields (derived cover names, password
    /// hashing). Runs after validation, before the uniqueness scan.
    async fn prepare(
        _db: &DbPool,
        _media: &MediaStore,
        _draft: &mut Self::Draft,
    ) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Display name the stored filename derives from.
    async fn naming_source(_db: &DbPool, _draft: &Self::Draft) -> Result<String, ServiceError> {
        Ok(String::new())
    }

    async fn load_all(db: &DbPool, scope: Option<i32>) -> Result<Vec<Self::Row>, DbErr>;
    async fn find(db: &DbPool, id: i32) -> Result<Option<Self::Row>, DbErr>;

    /// Stored image filename referenced by an existing row.
    fn stored_image(_row: &Self::Row) -> Option<&str> {
        None
    }

    /// Response shape for reads (lets users hide their password hash).
    fn view(row: Self::Row) -> Self::View;

    async fn insert(db: &DbPool, draft: Self::Draft, image: Option<String>) -> Result<(), DbErr>;
    async fn apply_update(
        db: &DbPool,
        row: Self::Row,
        draft: Self::Draft,
        image: Option<String>,
    ) -> Result<(), DbErr>;
    async fn delete_row(db: &DbPool, id: i32) -> Result<(), DbErr>;

    /// Consistency hook running before a row and its files are removed
    /// (parent checks, cascades to child rows and their files).
    async fn before_remove(
        _db: &DbPool,
        _media: &MediaStore,
        _row: &Self::Row,
    ) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Generic orchestrator shared by all entity routes.
#[derive(Clone)]
pub struct Catalog {
    db: Arc<DbPool>,
    media: Arc<MediaStore>,
    limits: LimitsConfig,
}

impl Catalog {
    pub fn new(db: Arc<DbPool>, media: Arc<MediaStore>, limits: LimitsConfig) -> Self {
        Self { db, media, limits }
    }

    fn collection_missing<R: Resource>() -> ServiceError {
        ServiceError::NotFound(format!("{} could not be loaded", R::COLLECTION))
    }

    fn record_missing<R: Resource>() -> ServiceError {
        ServiceError::NotFound(format!("{} not found", R::NOUN))
    }

    pub async fn list<R: Resource>(&self, scope: Option<i32>) -> Result<Vec<R::View>, ServiceError> {
        R::ensure_scope(&self.db, scope).await?;

        let rows = R::load_all(&self.db, scope)
            .await
            .map_err(|_| Self::collection_missing::<R>())?;

        Ok(rows.into_iter().map(R::view).collect())
    }

    pub async fn get<R: Resource>(&self, id: i32) -> Result<R::View, ServiceError> {
        let row = R::find(&self.db, id)
            .await
            .map_err(|_| Self::record_missing::<R>())?
            .ok_or_else(Self::record_missing::<R>)?;

        Ok(R::view(row))
    }

    pub async fn create<R: Resource>(&self, form: FormFields) -> Result<(), ServiceError> {
        let draft = R::draft(&form, &self.limits)?;
        R::ensure_create(&draft)?;

        let upload = form.upload;
        let result = self.create_gated::<R>(draft, upload.as_ref()).await;

        // The spooled upload goes away on every exit path, but only once
        // the transcode that reads it has run.
        if let Some(upload) = &upload {
            self.media.discard_upload(&upload.path).await;
        }

        result
    }

    async fn create_gated<R: Resource>(
        &self,
        mut draft: R::Draft,
        upload: Option<&TempUpload>,
    ) -> Result<(), ServiceError> {
        if R::IMAGE.is_some() && upload.is_none() {
            return Err(ServiceError::ValidationRejected(
                "an image upload is required".into(),
            ));
        }

        let scope = R::scope(&draft);
        R::ensure_scope(&self.db, scope).await?;
        R::prepare(&self.db, &self.media, &mut draft).await?;

        let siblings = R::load_all(&self.db, scope)
            .await
            .map_err(|_| Self::collection_missing::<R>())?;
        unique::scan(&R::unique_pairs(&draft), None, &siblings)
            .map_err(|conflict| ServiceError::UniquenessConflict(conflict.field.to_string()))?;

        let stored = match (R::IMAGE, upload) {
            (Some(kind), Some(upload)) => {
                let source = R::naming_source(&self.db, &draft).await?;
                let name = self.media.stored_name(&source);
                self.media
                    .ingest(R::STORE_DIR, &upload.path, &name, kind)
                    .await?;
                Some(name)
            }
            _ => None,
        };

        if let Err(err) = R::insert(&self.db, draft, stored.clone()).await {
            if let Some(name) = stored {
                // Acceptable degraded state: the row never landed, the
                // files stay behind. Logged, not rolled back.
                error!(collection = R::COLLECTION, file = %name, "stored image orphaned by failed insert");
            }
            return Err(ServiceError::from_db_write(err));
        }

        Ok(())
    }

    pub async fn update<R: Resource>(&self, id: i32, form: FormFields) -> Result<(), ServiceError> {
        let draft = R::draft(&form, &self.limits)?;

        let upload = form.upload;
        let result = self.update_gated::<R>(id, draft, upload.as_ref()).await;

        if let Some(upload) = &upload {
            self.media.discard_upload(&upload.path).await;
        }

        result
    }

    async fn update_gated<R: Resource>(
        &self,
        id: i32,
        mut draft: R::Draft,
        upload: Option<&TempUpload>,
    ) -> Result<(), ServiceError> {
        let scope = R::scope(&draft);
        R::ensure_scope(&self.db, scope).await?;

        let row = R::find(&self.db, id)
            .await
            .map_err(|_| Self::record_missing::<R>())?
            .ok_or_else(Self::record_missing::<R>)?;

        R::prepare(&self.db, &self.media, &mut draft).await?;

        let siblings = R::load_all(&self.db, scope)
            .await
            .map_err(|_| Self::collection_missing::<R>())?;
        unique::scan(&R::unique_pairs(&draft), Some(id), &siblings)
            .map_err(|conflict| ServiceError::UniquenessConflict(conflict.field.to_string()))?;

        let replacement = match (R::IMAGE, upload) {
            (Some(kind), Some(upload)) => {
                let source = R::naming_source(&self.db, &draft).await?;
                let name = self.media.stored_name(&source);
                self.media
                    .ingest(R::STORE_DIR, &upload.path, &name, kind)
                    .await?;

                // The new pair exists on disk; the superseded one goes away
                if let Some(old) = R::stored_image(&row) {
                    self.media.remove(R::STORE_DIR, old).await;
                }

                Some(name)
            }
            _ => None,
        };

        if let Err(err) = R::apply_update(&self.db, row, draft, replacement.clone()).await {
            if let Some(name) = replacement {
                error!(collection = R::COLLECTION, file = %name, "stored image orphaned by failed update");
            }
            return Err(ServiceError::from_db_write(err));
        }

        Ok(())
    }

    pub async fn delete<R: Resource>(&self, id: i32) -> Result<(), ServiceError> {
        let row = R::find(&self.db, id)
            .await
            .map_err(|_| Self::record_missing::<R>())?
            .ok_or_else(Self::record_missing::<R>)?;

        R::before_remove(&self.db, &self.media, &row).await?;

        if let Some(stored) = R::stored_image(&row) {
            self.media.remove(R::STORE_DIR, stored).await;
        }

        R::delete_row(&self.db, id)
            .await
            .map_err(ServiceError::from_db_write)?;

        Ok(())
    }
}

/// Shared draft helpers used by the per-entity descriptors.
pub(crate) fn check_range(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ServiceError> {
    if validate::range_ok(value, min, max) {
        Ok(())
    } else {
        Err(ServiceError::ValidationRejected(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )))
    }
}

/// Serialized lists travel as JSON text; anything else fails the gate.
pub(crate) fn check_list(field: &'static str, raw: Option<&str>) -> Result<String, ServiceError> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok("[]".to_string()),
    };

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) if value.is_array() => Ok(raw.to_string()),
        _ => Err(ServiceError::ValidationRejected(format!(
            "{} must be a JSON list",
            field
        ))),
    }
}
