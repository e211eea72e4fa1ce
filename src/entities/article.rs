use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

/// Article entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Article title, unique across all articles
    #[sea_orm(unique)]
    pub name: String,

    /// Article body, also unique
    #[sea_orm(column_type = "Text", unique)]
    pub text: String,

    /// Stored image filename (slug + timestamp + extension)
    #[sea_orm(unique)]
    pub image: String,

    /// Alternative text for the image
    pub alt: String,

    /// Serialized list of user ids that liked the article
    #[sea_orm(column_type = "Text")]
    pub likes: String,

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
            if let ActiveValue::NotSet = active_model.likes {
                active_model.likes = Set("[]".to_string());
            }
            active_model.created = Set(Utc::now());
        }
        active_model.updated = Set(Some(Utc::now()));

        Ok(active_model)
    }
}
