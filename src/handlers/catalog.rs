//! Generic CRUD handlers, instantiated once per entity when the router is
//! assembled. Reads are open; writes sit behind the bearer middleware.

use super::common::{created_message, no_content_response, success_message};
use crate::{
    catalog::{ImageResource, Resource},
    errors::ServiceError,
    forms,
    AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};

pub async fn list<R: Resource>(
    State(state): State<AppState>,
) -> Result<Json<Vec<R::View>>, ServiceError> {
    state.catalog.list::<R>(None).await.map(Json)
}

pub async fn get_one<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<R::View>, ServiceError> {
    state.catalog.get::<R>(id).await.map(Json)
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let form = forms::collect(multipart, &state.media.upload_dir()).await?;
    state.catalog.create::<R>(form).await?;

    Ok(created_message(format!("{} created", R::NOUN)))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let form = forms::collect(multipart, &state.media.upload_dir()).await?;
    state.catalog.update::<R>(id, form).await?;

    Ok(success_message(format!("{} updated", R::NOUN)))
}

pub async fn remove<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.catalog.delete::<R>(id).await?;

    Ok(no_content_response())
}

/// Child listing: the images belonging to one gallery.
pub async fn list_gallery_images(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<<ImageResource as Resource>::View>>, ServiceError> {
    state.catalog.list::<ImageResource>(Some(id)).await.map(Json)
}
