use super::{check_range, Resource};
use crate::{
    config::LimitsConfig,
    db::DbPool,
    entities::{
        gallery::{self, Entity as Gallery},
        image::{self, Entity as Image},
    },
    errors::ServiceError,
    forms::FormFields,
    gates::unique::UniqueWitness,
    media::{ImageKind, MediaStore},
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};

pub struct GalleryResource;

pub struct GalleryDraft {
    name: String,
    author: String,
    /// Derived poster filename; filled in by `prepare`
    cover: String,
}

impl UniqueWitness for gallery::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn unique_values(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone()), ("cover", self.cover.clone())]
    }
}

#[async_trait]
impl Resource for GalleryResource {
    const NOUN: &'static str = "Gallery";
    const COLLECTION: &'static str = "galleries";
    const STORE_DIR: &'static str = "galleries";
    // The cover is a derived name, not an upload of its own
    const IMAGE: Option<ImageKind> = None;

    type Row = gallery::Model;
    type Draft = GalleryDraft;
    type View = gallery::Model;

    fn draft(form: &FormFields, limits: &LimitsConfig) -> Result<Self::Draft, ServiceError> {
        let name = form.require("name")?;
        let author = form.require("author")?;

        check_range("name", name, limits.string_min, limits.string_max)?;
        check_range("author", author, limits.string_min, limits.string_max)?;

        Ok(GalleryDraft {
            name: name.to_string(),
            author: author.to_string(),
            cover: String::new(),
        })
    }

    fn unique_pairs(draft: &Self::Draft) -> Vec<(&'static str, String)> {
        vec![("name", draft.name.clone()), ("cover", draft.cover.clone())]
    }

    async fn prepare(
        _db: &DbPool,
        media: &MediaStore,
        draft: &mut Self::Draft,
    ) -> Result<(), ServiceError> {
        draft.cover = media.poster_name(&draft.name);
        Ok(())
    }

    async fn load_all(db: &DbPool, _scope: Option<i32>) -> Result<Vec<Self::Row>, DbErr> {
        Gallery::find().all(db).await
    }

    async fn find(db: &DbPool, id: i32) -> Result<Option<Self::Row>, DbErr> {
        Gallery::find_by_id(id).one(db).await
    }

    fn view(row: Self::Row) -> Self::View {
        row
    }

    async fn insert(db: &DbPool, draft: Self::Draft, _image: Option<String>) -> Result<(), DbErr> {
        let model = gallery::ActiveModel {
            name: Set(draft.name),
            author: Set(draft.author),
            cover: Set(draft.cover),
            ..Default::default()
        };

        model.insert(db).await.map(|_| ())
    }

    async fn apply_update(
        db: &DbPool,
        row: Self::Row,
        draft: Self::Draft,
        _image: Option<String>,
    ) -> Result<(), DbErr> {
        let mut model: gallery::ActiveModel = row.into();

        model.name = Set(draft.name);
        model.author = Set(draft.author);
        model.cover = Set(draft.cover);

        model.update(db).await.map(|_| ())
    }

    async fn delete_row(db: &DbPool, id: i32) -> Result<(), DbErr> {
        Gallery::delete_by_id(id).exec(db).await.map(|_| ())
    }

    /// Deleting a gallery removes its images first: their stored files,
    /// then their rows.
    async fn before_remove(
        db: &DbPool,
        media: &MediaStore,
        row: &Self::Row,
    ) -> Result<(), ServiceError> {
        let images = Image::find()
            .filter(image::Column::GalleryId.eq(row.id))
            .all(db)
            .await
            .map_err(|_| ServiceError::NotFound("images could not be loaded".into()))?;

        for child in &images {
            media.remove(Self::STORE_DIR, &child.name).await;
        }

        Image::delete_many()
            .filter(image::Column::GalleryId.eq(row.id))
            .exec(db)
            .await
            .map_err(ServiceError::from_db_write)?;

        Ok(())
    }
}
