use super::{check_range, Resource};
use crate::{
    config::LimitsConfig,
    db::DbPool,
    entities::{
        gallery::Entity as Gallery,
        image::{self, Entity as Image},
    },
    errors::ServiceError,
    forms::FormFields,
    gates::unique::UniqueWitness,
    media::{ImageKind, MediaStore},
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};

pub struct ImageResource;

pub struct ImageDraft {
    description: String,
    gallery_id: i32,
}

impl UniqueWitness for image::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn unique_values(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }
}

async fn gallery_exists(db: &DbPool, id: i32) -> Result<bool, ServiceError> {
    Gallery::find_by_id(id)
        .one(db)
        .await
        .map(|found| found.is_some())
        .map_err(ServiceError::DatabaseError)
}

#[async_trait]
impl Resource for ImageResource {
    const NOUN: &'static str = "Image";
    const COLLECTION: &'static str = "images";
    // Gallery images live in the galleries partition
    const STORE_DIR: &'static str = "galleries";
    const IMAGE: Option<ImageKind> = Some(ImageKind::FullAndThumb);

    type Row = image::Model;
    type Draft = ImageDraft;
    type View = image::Model;

    fn draft(form: &FormFields, limits: &LimitsConfig) -> Result<Self::Draft, ServiceError> {
        let description = form.require("description")?;
        let gallery_id = form
            .require("gallery_id")?
            .parse()
            .map_err(|_| ServiceError::ValidationRejected("gallery_id must be an id".into()))?;

        check_range("description", description, limits.string_min, limits.text_max)?;

        Ok(ImageDraft {
            description: description.to_string(),
            gallery_id,
        })
    }

    // The stored filename is derived and timestamped; nothing else on an
    // image is designated unique
    fn unique_pairs(_draft: &Self::Draft) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn scope(draft: &Self::Draft) -> Option<i32> {
        Some(draft.gallery_id)
    }

    async fn ensure_scope(db: &DbPool, scope: Option<i32>) -> Result<(), ServiceError> {
        let Some(id) = scope else {
            return Err(ServiceError::NotFound("Gallery not found".into()));
        };

        if gallery_exists(db, id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("Gallery not found".into()))
        }
    }

    async fn naming_source(db: &DbPool, draft: &Self::Draft) -> Result<String, ServiceError> {
        Gallery::find_by_id(draft.gallery_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .map(|gallery| gallery.name)
            .ok_or_else(|| ServiceError::NotFound("Gallery not found".into()))
    }

    async fn load_all(db: &DbPool, scope: Option<i32>) -> Result<Vec<Self::Row>, DbErr> {
        let mut query = Image::find();
        if let Some(gallery_id) = scope {
            query = query.filter(image::Column::GalleryId.eq(gallery_id));
        }
        query.all(db).await
    }

    async fn find(db: &DbPool, id: i32) -> Result<Option<Self::Row>, DbErr> {
        Image::find_by_id(id).one(db).await
    }

    fn stored_image(row: &Self::Row) -> Option<&str> {
        Some(&row.name)
    }

    fn view(row: Self::Row) -> Self::View {
        row
    }

    async fn insert(db: &DbPool, draft: Self::Draft, image: Option<String>) -> Result<(), DbErr> {
        let model = image::ActiveModel {
            name: Set(image.unwrap_or_default()),
            description: Set(draft.description),
            gallery_id: Set(draft.gallery_id),
            ..Default::default()
        };

        model.insert(db).await.map(|_| ())
    }

    async fn apply_update(
        db: &DbPool,
        row: Self::Row,
        draft: Self::Draft,
        image: Option<String>,
    ) -> Result<(), DbErr> {
        let mut model: image::ActiveModel = row.into();

        model.description = Set(draft.description);
        model.gallery_id = Set(draft.gallery_id);
        if let Some(image) = image {
            model.name = Set(image);
        }

        model.update(db).await.map(|_| ())
    }

    async fn delete_row(db: &DbPool, id: i32) -> Result<(), DbErr> {
        Image::delete_by_id(id).exec(db).await.map(|_| ())
    }

    /// The owning gallery must still exist before any file is touched:
    /// deleting an image of a missing gallery is a 404, not a partial
    /// cleanup.
    async fn before_remove(
        db: &DbPool,
        _media: &MediaStore,
        row: &Self::Row,
    ) -> Result<(), ServiceError> {
        if gallery_exists(db, row.gallery_id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("Gallery not found".into()))
        }
    }
}
