//! User routes with identity binding: accounts may only modify
//! themselves.

use super::common::{no_content_response, success_message};
use crate::{
    auth::{ensure_self, AuthUser},
    catalog::UserResource,
    errors::ServiceError,
    forms, AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
};

pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    ensure_self(&auth_user, id)?;

    let form = forms::collect(multipart, &state.media.upload_dir()).await?;
    state.catalog.update::<UserResource>(id, form).await?;

    Ok(success_message("User updated"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    ensure_self(&auth_user, id)?;

    state.catalog.delete::<UserResource>(id).await?;

    Ok(no_content_response())
}
