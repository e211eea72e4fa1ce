use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Product name, unique
    #[sea_orm(unique)]
    pub name: String,

    /// Product description, unique
    #[sea_orm(column_type = "Text", unique)]
    pub description: String,

    /// Stored image filename (slug + timestamp + extension)
    #[sea_orm(unique)]
    pub image: String,

    /// Alternative text for the image
    pub alt: String,

    /// Product base price
    pub price: Decimal,

    /// Serialized list of purchase options (sizes, colors, ...).
    /// Opaque to validation and uniqueness.
    #[sea_orm(column_type = "Text")]
    pub options: String,

    /// Category
    pub cat: String,

    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            active_model.created = Set(Utc::now());
        }
        active_model.updated = Set(Some(Utc::now()));

        Ok(active_model)
    }
}
