use super::common::accepted_message;
use crate::{errors::ServiceError, forms, services::accounts::LoginResponse, AppState};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};

/// Credential login; the response carries the account id and a fresh
/// bearer token.
pub async fn login(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<LoginResponse>, ServiceError> {
    let form = forms::collect(multipart, &state.media.upload_dir()).await?;

    let email = form.require("email")?;
    let pass = form.require("pass")?;

    state.accounts.login(email, pass).await.map(Json)
}

/// Password reset: generates a replacement password, persists its hash and
/// mails the plaintext to the account address.
pub async fn forgot_password(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let form = forms::collect(multipart, &state.media.upload_dir()).await?;

    let email = form.require("email")?;
    let subject = form.get("subject").unwrap_or("Your new password");
    let body = form.get("html").unwrap_or("Here is your new password:");

    state.accounts.forgot_password(email, subject, body).await?;

    Ok(accepted_message("Replacement password sent"))
}

/// Public profile subset (name, image, role).
pub async fn avatar(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.accounts.avatar(id).await.map(Json)
}

/// Contact-form relay to the configured inbox.
pub async fn contact(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let form = forms::collect(multipart, &state.media.upload_dir()).await?;

    let email = form.require("email")?;
    let subject = form.get("subject").unwrap_or("Contact message");
    let body = form.require("html")?;

    state.accounts.contact(email, subject, body).await?;

    Ok(accepted_message("Message sent"))
}
