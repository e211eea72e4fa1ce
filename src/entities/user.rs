use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

/// User account entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Display name, unique
    #[sea_orm(unique)]
    pub name: String,

    /// Login email, unique
    #[sea_orm(unique)]
    pub email: String,

    /// Stored avatar filename
    #[sea_orm(unique)]
    pub image: String,

    /// Argon2 password hash; never serialized into responses (handlers
    /// expose a dedicated view type)
    pub pass: String,

    /// Account role (user, editor, admin)
    pub role: String,

    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

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
