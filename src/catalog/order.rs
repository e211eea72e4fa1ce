use super::{check_range, Resource};
use crate::{
    config::LimitsConfig,
    db::DbPool,
    entities::order::{self, Entity as Order},
    errors::ServiceError,
    forms::FormFields,
    gates::unique::UniqueWitness,
    media::ImageKind,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};
use std::str::FromStr;

pub struct OrderResource;

pub struct OrderDraft {
    pub products: serde_json::Value,
    pub total: Decimal,
    pub payment_id: String,
    pub status: String,
    pub user_id: i32,
}

impl UniqueWitness for order::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn unique_values(&self) -> Vec<(&'static str, String)> {
        vec![("payment_id", self.payment_id.clone())]
    }
}

#[async_trait]
impl Resource for OrderResource {
    const NOUN: &'static str = "Order";
    const COLLECTION: &'static str = "orders";
    const STORE_DIR: &'static str = "orders";
    const IMAGE: Option<ImageKind> = None;

    type Row = order::Model;
    type Draft = OrderDraft;
    type View = order::Model;

    fn draft(form: &FormFields, limits: &LimitsConfig) -> Result<Self::Draft, ServiceError> {
        let payment_id = form.require("payment_id")?;
        let status = form.require("status")?;

        check_range("payment_id", payment_id, limits.string_min, limits.string_max)?;
        check_range("status", status, limits.string_min, limits.string_max)?;

        // The basket is opaque; it only has to be a JSON list
        let products: serde_json::Value = serde_json::from_str(form.require("products")?)
            .ok()
            .filter(serde_json::Value::is_array)
            .ok_or_else(|| {
                ServiceError::ValidationRejected("products must be a JSON list".into())
            })?;

        let total = Decimal::from_str(form.require("total")?)
            .ok()
            .filter(|total| total > &Decimal::ZERO)
            .ok_or_else(|| {
                ServiceError::ValidationRejected("total must be a positive amount".into())
            })?;

        let user_id = form
            .require("user_id")?
            .parse()
            .map_err(|_| ServiceError::ValidationRejected("user_id must be an id".into()))?;

        Ok(OrderDraft {
            products,
            total,
            payment_id: payment_id.to_string(),
            status: status.to_string(),
            user_id,
        })
    }

    fn unique_pairs(draft: &Self::Draft) -> Vec<(&'static str, String)> {
        vec![("payment_id", draft.payment_id.clone())]
    }

    async fn load_all(db: &DbPool, scope: Option<i32>) -> Result<Vec<Self::Row>, DbErr> {
        let mut query = Order::find();
        if let Some(user_id) = scope {
            query = query.filter(order::Column::UserId.eq(user_id));
        }
        query.all(db).await
    }

    async fn find(db: &DbPool, id: i32) -> Result<Option<Self::Row>, DbErr> {
        Order::find_by_id(id).one(db).await
    }

    fn view(row: Self::Row) -> Self::View {
        row
    }

    async fn insert(db: &DbPool, draft: Self::Draft, _image: Option<String>) -> Result<(), DbErr> {
        let model = order::ActiveModel {
            products: Set(draft.products),
            total: Set(draft.total),
            payment_id: Set(draft.payment_id),
            status: Set(draft.status),
            user_id: Set(draft.user_id),
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
        let mut model: order::ActiveModel = row.into();

        model.products = Set(draft.products);
        model.total = Set(draft.total);
        model.payment_id = Set(draft.payment_id);
        model.status = Set(draft.status);
        model.user_id = Set(draft.user_id);

        model.update(db).await.map(|_| ())
    }

    async fn delete_row(db: &DbPool, id: i32) -> Result<(), DbErr> {
        Order::delete_by_id(id).exec(db).await.map(|_| ())
    }
}
