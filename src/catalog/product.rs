use super::{check_list, check_range, Resource};
use crate::{
    config::LimitsConfig,
    db::DbPool,
    entities::product::{self, Entity as Product},
    errors::ServiceError,
    forms::FormFields,
    gates::{unique::UniqueWitness, validate},
    media::ImageKind,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, Set};
use std::str::FromStr;

pub struct ProductResource;

pub struct ProductDraft {
    name: String,
    description: String,
    alt: String,
    price: Decimal,
    options: String,
    cat: String,
}

impl UniqueWitness for product::Model {
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
impl Resource for ProductResource {
    const NOUN: &'static str = "Product";
    const COLLECTION: &'static str = "products";
    const STORE_DIR: &'static str = "products";
    const IMAGE: Option<ImageKind> = Some(ImageKind::FullAndThumb);

    type Row = product::Model;
    type Draft = ProductDraft;
    type View = product::Model;

    fn draft(form: &FormFields, limits: &LimitsConfig) -> Result<Self::Draft, ServiceError> {
        let name = form.require("name")?;
        let description = form.require("description")?;
        let alt = form.require("alt")?;
        let price = form.require("price")?;
        let cat = form.require("cat")?;

        check_range("name", name, limits.string_min, limits.string_max)?;
        check_range("description", description, limits.text_min, limits.text_max)?;
        check_range("alt", alt, limits.string_min, limits.string_max)?;
        check_range("cat", cat, limits.string_min, limits.string_max)?;

        let in_range = price
            .parse::<f64>()
            .map(|value| validate::number_ok(value, limits.price_min, limits.price_max))
            .unwrap_or(false);
        if !in_range {
            return Err(ServiceError::ValidationRejected(format!(
                "price must be between {} and {}",
                limits.price_min, limits.price_max
            )));
        }
        let price = Decimal::from_str(price)
            .map_err(|_| ServiceError::ValidationRejected("price must be a number".into()))?;

        Ok(ProductDraft {
            name: name.to_string(),
            description: description.to_string(),
            alt: alt.to_string(),
            price,
            options: check_list("options", form.get("options"))?,
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
        Product::find().all(db).await
    }

    async fn find(db: &DbPool, id: i32) -> Result<Option<Self::Row>, DbErr> {
        Product::find_by_id(id).one(db).await
    }

    fn stored_image(row: &Self::Row) -> Option<&str> {
        Some(&row.image)
    }

    fn view(row: Self::Row) -> Self::View {
        row
    }

    async fn insert(db: &DbPool, draft: Self::Draft, image: Option<String>) -> Result<(), DbErr> {
        let model = product::ActiveModel {
            name: Set(draft.name),
            description: Set(draft.description),
            image: Set(image.unwrap_or_default()),
            alt: Set(draft.alt),
            price: Set(draft.price),
            options: Set(draft.options),
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
        let mut model: product::ActiveModel = row.into();

        model.name = Set(draft.name);
        model.description = Set(draft.description);
        model.alt = Set(draft.alt);
        model.price = Set(draft.price);
        model.options = Set(draft.options);
        model.cat = Set(draft.cat);
        if let Some(image) = image {
            model.image = Set(image);
        }

        model.update(db).await.map(|_| ())
    }

    async fn delete_row(db: &DbPool, id: i32) -> Result<(), DbErr> {
        Product::delete_by_id(id).exec(db).await.map(|_| ())
    }
}
