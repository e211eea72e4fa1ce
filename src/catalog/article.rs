use super::{check_list, check_range, Resource};
use crate::{
    config::LimitsConfig,
    db::DbPool,
    entities::article::{self, Entity as Article},
    errors::ServiceError,
    forms::FormFields,
    gates::unique::UniqueWitness,
    media::ImageKind,
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, Set};

pub struct ArticleResource;

#[derive(Debug)]
pub struct ArticleDraft {
    name: String,
    text: String,
    alt: String,
    likes: String,
    cat: String,
}

impl UniqueWitness for article::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn unique_values(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone()), ("text", self.text.clone())]
    }
}

#[async_trait]
impl Resource for ArticleResource {
    const NOUN: &'static str = "Article";
    const COLLECTION: &'static str = "articles";
    const STORE_DIR: &'static str = "articles";
    const IMAGE: Option<ImageKind> = Some(ImageKind::FullAndThumb);

    type Row = article::Model;
    type Draft = ArticleDraft;
    type View = article::Model;

    fn draft(form: &FormFields, limits: &LimitsConfig) -> Result<Self::Draft, ServiceError> {
        let name = form.require("name")?;
        let text = form.require("text")?;
        let alt = form.require("alt")?;
        let cat = form.require("cat")?;

        check_range("name", name, limits.string_min, limits.string_max)?;
        check_range("text", text, limits.text_min, limits.text_max)?;
        check_range("alt", alt, limits.string_min, limits.string_max)?;
        check_range("cat", cat, limits.string_min, limits.string_max)?;

        Ok(ArticleDraft {
            name: name.to_string(),
            text: text.to_string(),
            alt: alt.to_string(),
            likes: check_list("likes", form.get("likes"))?,
            cat: cat.to_string(),
        })
    }

    fn unique_pairs(draft: &Self::Draft) -> Vec<(&'static str, String)> {
        vec![("name", draft.name.clone()), ("text", draft.text.clone())]
    }

    async fn naming_source(_db: &DbPool, draft: &Self::Draft) -> Result<String, ServiceError> {
        Ok(draft.name.clone())
    }

    async fn load_all(db: &DbPool, _scope: Option<i32>) -> Result<Vec<Self::Row>, DbErr> {
        Article::find().all(db).await
    }

    async fn find(db: &DbPool, id: i32) -> Result<Option<Self::Row>, DbErr> {
        Article::find_by_id(id).one(db).await
    }

    fn stored_image(row: &Self::Row) -> Option<&str> {
        Some(&row.image)
    }

    fn view(row: Self::Row) -> Self::View {
        row
    }

    async fn insert(db: &DbPool, draft: Self::Draft, image: Option<String>) -> Result<(), DbErr> {
        let model = article::ActiveModel {
            name: Set(draft.name),
            text: Set(draft.text),
            image: Set(image.unwrap_or_default()),
            alt: Set(draft.alt),
            likes: Set(draft.likes),
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
        let mut model: article::ActiveModel = row.into();

        model.name = Set(draft.name);
        model.text = Set(draft.text);
        model.alt = Set(draft.alt);
        model.likes = Set(draft.likes);
        model.cat = Set(draft.cat);
        if let Some(image) = image {
            model.image = Set(image);
        }

        model.update(db).await.map(|_| ())
    }

    async fn delete_row(db: &DbPool, id: i32) -> Result<(), DbErr> {
        Article::delete_by_id(id).exec(db).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> LimitsConfig {
        LimitsConfig::default()
    }

    #[test]
    fn draft_accepts_fields_within_bounds() {
        let form = FormFields::from_pairs(&[
            ("name", "Hello World"),
            ("text", "A body text that is long enough."),
            ("alt", "An illustration"),
            ("cat", "news"),
        ]);

        let draft = ArticleResource::draft(&form, &limits()).unwrap();
        assert_eq!(
            ArticleResource::unique_pairs(&draft),
            vec![
                ("name", "Hello World".to_string()),
                ("text", "A body text that is long enough.".to_string()),
            ]
        );
    }

    #[test]
    fn draft_rejects_out_of_bound_name() {
        let form = FormFields::from_pairs(&[
            ("name", "x"),
            ("text", "A body text that is long enough."),
            ("alt", "An illustration"),
            ("cat", "news"),
        ]);

        let err = ArticleResource::draft(&form, &limits()).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationRejected(_)));
    }

    #[test]
    fn draft_rejects_missing_field() {
        let form = FormFields::from_pairs(&[("name", "Hello World")]);
        assert!(ArticleResource::draft(&form, &limits()).is_err());
    }

    #[test]
    fn draft_rejects_malformed_likes_list() {
        let form = FormFields::from_pairs(&[
            ("name", "Hello World"),
            ("text", "A body text that is long enough."),
            ("alt", "An illustration"),
            ("cat", "news"),
            ("likes", "not json"),
        ]);
        assert!(ArticleResource::draft(&form, &limits()).is_err());
    }
}
