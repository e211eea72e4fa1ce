//! Order routes that go beyond the generic pipeline: creation sends a
//! confirmation mail to the account owner, and the per-user listing is
//! identity-bound.

use super::common::{created_message, MessageResponse};
use crate::{
    auth::{ensure_self, AuthUser},
    catalog::OrderResource,
    entities::{order, user::Entity as User},
    errors::ServiceError,
    forms, AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::EntityTrait;
use serde::Deserialize;
use tracing::error;

/// One basket line, as serialized into `Order.products`.
#[derive(Debug, Deserialize)]
struct OrderLine {
    id: serde_json::Value,
    name: String,
    #[serde(default)]
    option: Option<String>,
    quantity: u32,
    price: String,
}

fn order_summary_html(total: &str, payment_id: &str, products_json: &str) -> String {
    let mut html = format!(
        "<h1>Thank you for your order</h1>\n<p>Total <b>{}</b>, payment <b>#{}</b>.</p>",
        total, payment_id
    );

    if let Ok(lines) = serde_json::from_str::<Vec<OrderLine>>(products_json) {
        for line in lines {
            let option = line.option.unwrap_or_default();
            html.push_str(&format!(
                "\n<ul><li><i>id</i>: {}</li><li><i>name</i>: <b>{}</b></li><li><i>option</i>: <b>{}</b></li><li><i>quantity</i>: {}</li><li><i>price</i>: {}</li></ul>",
                line.id, line.name, option, line.quantity, line.price
            ));
        }
    }

    html
}

/// Records the order, then mails a summary to the account owner. The mail
/// is awaited; a delivery failure keeps the created order but is reported
/// in the response message instead of being swallowed.
pub async fn create_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> Result<Response, ServiceError> {
    let form = forms::collect(multipart, &state.media.upload_dir()).await?;

    let claimed_id: i32 = form
        .require("user_id")?
        .parse()
        .map_err(|_| ServiceError::ValidationRejected("user_id must be an id".into()))?;
    ensure_self(&auth_user, claimed_id)?;

    let total = form.require("total")?.to_string();
    let payment_id = form.require("payment_id")?.to_string();
    let products = form.require("products")?.to_string();

    state.catalog.create::<OrderResource>(form).await?;

    let account = User::find_by_id(claimed_id)
        .one(&*state.db)
        .await
        .map_err(ServiceError::DatabaseError)?
        .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

    let html = order_summary_html(&total, &payment_id, &products);
    match state
        .mailer
        .send(&account.email, "Order confirmation", &html)
        .await
    {
        Ok(()) => Ok(created_message("Order created")),
        Err(err) => {
            error!(user_id = claimed_id, %err, "order confirmation mail failed");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse {
                    message: "Order created; the confirmation email could not be sent".into(),
                }),
            )
                .into_response())
        }
    }
}

/// Orders of one account; only that account may list them.
pub async fn list_user_orders(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<order::Model>>, ServiceError> {
    ensure_self(&auth_user, id)?;

    state.catalog.list::<OrderResource>(Some(id)).await.map(Json)
}
