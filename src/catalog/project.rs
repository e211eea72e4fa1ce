use super::{check_range, Resource};
use crate::{
    config::LimitsConfig,
    db::DbPool,
    entities::project::{self, Entity as Project},
    errors::ServiceError,
    forms::FormFields,
    gates::{unique::UniqueWitness, validate},
    media::ImageKind,
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, Set};

pub struct ProjectResource;

pub struct ProjectDraft {
    name: String,
    description: String,
    alt: String,
    url: Option<String>,
    cat: String,
}

impl UniqueWitness for project::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn unique_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("description", self.description.clone()),
        ]
    }
}

#[async_trait]
impl Resource for ProjectResource {
    const NOUN: &'static str = "Project";
    const COLLECTION: &'static str = "projects";
    const STORE_DIR: &'static str = "projects";
    const IMAGE: Option<ImageKind> = Some(ImageKind::FullAndThumb);

    type Row = project::Model;
    type Draft = ProjectDraft;
    type View = project::Model;

    fn draft(form: &FormFields, limits: &LimitsConfig) -> Result<Self::Draft, ServiceError> {
        let name = form.require("name")?;
        let description = form.require("description")?;
        let alt = form.require("alt")?;
        let cat = form.require("cat")?;

        check_range("name", name, limits.string_min, limits.string_max)?;
        check_range("description", description, limits.text_min, limits.text_max)?;
        check_range("alt", alt, limits.string_min, limits.string_max)?;
        check_range("cat", cat, limits.string_min, limits.string_max)?;

        // The homepage is optional; when present it is stored scheme-less
        let url = form.get("url").filter(|url| !url.is_empty());
        if let Some(url) = url {
            if !validate::url_ok(&format!("https://{}", url)) {
                return Err(ServiceError::ValidationRejected(
                    "url must be a well-formed URL".into(),
                ));
            }
        }

        Ok(ProjectDraft {
            name: name.to_string(),
            description: description.to_string(),
            alt: alt.to_string(),
            url: url.map(str::to_string),
            cat: cat.to_string(),
        })
    }

    fn unique_pairs(draft: &Self::Draft) -> Vec<(&'static str, String)> {
        vec![
            ("name", draft.name.clone()),
            ("description", draft.description.clone()),
        ]
    }

    async fn naming_source(_db: &DbPool, draft: &Self::Draft) -> Result<String, ServiceError> {
        Ok(draft.name.clone())
    }

    async fn load_all(db: &DbPool, _scope: Option<i32>) -> Result<Vec<Self::Row>, DbErr> {
        Project::find().all(db).await
    }

    async fn find(db: &DbPool, id: i32) -> Result<Option<Self::Row>, DbErr> {
        Project::find_by_id(id).one(db).await
    }

    fn stored_image(row: &Self::Row) -> Option<&str> {
        Some(&row.image)
    }

    fn view(row: Self::Row) -> Self::View {
        row
    }

    async fn insert(db: &DbPool, draft: Self::Draft, image: Option<String>) -> Result<(), DbErr> {
        let model = project::ActiveModel {
            name: Set(draft.name),
            description: Set(draft.description),
            image: Set(image.unwrap_or_default()),
            alt: Set(draft.alt),
            url: Set(draft.url),
            cat: Set(draft.cat),
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
        let mut model: project::ActiveModel = row.into();

        model.name = Set(draft.name);
        model.description = Set(draft.description);
        model.alt = Set(draft.alt);
        model.url = Set(draft.url);
        model.cat = Set(draft.cat);
        if let Some(image) = image {
            model.image = Set(image);
        }

        model.update(db).await.map(|_| ())
    }

    async fn delete_row(db: &DbPool, id: i32) -> Result<(), DbErr> {
        Project::delete_by_id(id).exec(db).await.map(|_| ())
    }
}
