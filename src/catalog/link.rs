use super::{check_range, Resource};
use crate::{
    config::LimitsConfig,
    db::DbPool,
    entities::link::{self, Entity as Link},
    errors::ServiceError,
    forms::FormFields,
    gates::{unique::UniqueWitness, validate},
    media::ImageKind,
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, Set};

pub struct LinkResource;

pub struct LinkDraft {
    name: String,
    url: String,
    cat: String,
}

impl UniqueWitness for link::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn unique_values(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone()), ("url", self.url.clone())]
    }
}

#[async_trait]
impl Resource for LinkResource {
    const NOUN: &'static str = "Link";
    const COLLECTION: &'static str = "links";
    const STORE_DIR: &'static str = "links";
    const IMAGE: Option<ImageKind> = None;

    type Row = link::Model;
    type Draft = LinkDraft;
    type View = link::Model;

    fn draft(form: &FormFields, limits: &LimitsConfig) -> Result<Self::Draft, ServiceError> {
        let name = form.require("name")?;
        let url = form.require("url")?;
        let cat = form.require("cat")?;

        check_range("name", name, limits.string_min, limits.string_max)?;
        check_range("cat", cat, limits.string_min, limits.string_max)?;

        // Links are stored scheme-less and checked as https URLs
        if !validate::url_ok(&format!("https://{}", url)) {
            return Err(ServiceError::ValidationRejected(
                "url must be a well-formed URL".into(),
            ));
        }

        Ok(LinkDraft {
            name: name.to_string(),
            url: url.to_string(),
            cat: cat.to_string(),
        })
    }

    fn unique_pairs(draft: &Self::Draft) -> Vec<(&'static str, String)> {
        vec![("name", draft.name.clone()), ("url", draft.url.clone())]
    }

    async fn load_all(db: &DbPool, _scope: Option<i32>) -> Result<Vec<Self::Row>, DbErr> {
        Link::find().all(db).await
    }

    async fn find(db: &DbPool, id: i32) -> Result<Option<Self::Row>, DbErr> {
        Link::find_by_id(id).one(db).await
    }

    fn view(row: Self::Row) -> Self::View {
        row
    }

    async fn insert(db: &DbPool, draft: Self::Draft, _image: Option<String>) -> Result<(), DbErr> {
        let model = link::ActiveModel {
            name: Set(draft.name),
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
        _image: Option<String>,
    ) -> Result<(), DbErr> {
        let mut model: link::ActiveModel = row.into();

        model.name = Set(draft.name);
        model.url = Set(draft.url);
        model.cat = Set(draft.cat);

        model.update(db).await.map(|_| ())
    }

    async fn delete_row(db: &DbPool, id: i32) -> Result<(), DbErr> {
        Link::delete_by_id(id).exec(db).await.map(|_| ())
    }
}
