//! Vitrine API Library
//!
//! REST backend for a small content and e-commerce site: articles,
//! galleries and their images, links, products, orders, projects and user
//! accounts behind JWT authentication.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod forms;
pub mod gates;
pub mod handlers;
pub mod mailer;
pub mod media;
pub mod migrator;
pub mod services;

use axum::{
    extract::State,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use catalog::{
    ArticleResource, GalleryResource, ImageResource, LinkResource, OrderResource, ProductResource,
    ProjectResource, UserResource,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub catalog: catalog::Catalog,
    pub media: Arc<media::MediaStore>,
    pub mailer: Arc<dyn mailer::Mailer>,
    pub auth: Arc<auth::AuthService>,
    pub accounts: Arc<services::accounts::AccountService>,
}

impl AppState {
    pub fn new(
        config: config::AppConfig,
        db: db::DbPool,
        mailer: Arc<dyn mailer::Mailer>,
    ) -> Self {
        let db = Arc::new(db);
        let media = Arc::new(media::MediaStore::new(config.media.clone()));
        let auth = Arc::new(auth::AuthService::new(
            config.jwt_secret.clone(),
            Duration::from_secs(config.jwt_expiration),
        ));
        let catalog = catalog::Catalog::new(db.clone(), media.clone(), config.limits.clone());
        let accounts = Arc::new(services::accounts::AccountService::new(
            db.clone(),
            auth.clone(),
            mailer.clone(),
            config.limits.clone(),
        ));

        Self {
            db,
            config,
            catalog,
            media,
            mailer,
            auth,
            accounts,
        }
    }
}

/// Standard CRUD sub-router: public reads, guarded writes.
fn crud_routes<R: catalog::Resource>(auth_service: Arc<auth::AuthService>) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::catalog::list::<R>))
        .route("/:id", get(handlers::catalog::get_one::<R>))
        .merge(
            Router::new()
                .route("/", post(handlers::catalog::create::<R>))
                .route(
                    "/:id",
                    put(handlers::catalog::update::<R>).delete(handlers::catalog::remove::<R>),
                )
                .route_layer(middleware::from_fn_with_state(
                    auth_service,
                    auth::require_auth,
                )),
        )
}

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let auth_service = state.auth.clone();
    let guard = middleware::from_fn_with_state(auth_service.clone(), auth::require_auth);

    let galleries = crud_routes::<GalleryResource>(auth_service.clone())
        .route("/:id/images", get(handlers::catalog::list_gallery_images));

    // Gallery images are created and modified individually; the listing
    // lives under the owning gallery
    let images = Router::new()
        .route("/", post(handlers::catalog::create::<ImageResource>))
        .route(
            "/:id",
            put(handlers::catalog::update::<ImageResource>)
                .delete(handlers::catalog::remove::<ImageResource>),
        )
        .route_layer(guard.clone());

    let orders = Router::new()
        .route(
            "/",
            get(handlers::catalog::list::<OrderResource>).post(handlers::orders::create_order),
        )
        .route(
            "/:id",
            get(handlers::catalog::get_one::<OrderResource>)
                .put(handlers::catalog::update::<OrderResource>)
                .delete(handlers::catalog::remove::<OrderResource>),
        )
        .route("/user/:id", get(handlers::orders::list_user_orders))
        .route_layer(guard.clone());

    let users = Router::new()
        .route("/", post(handlers::catalog::create::<UserResource>))
        .merge(
            Router::new()
                .route("/", get(handlers::catalog::list::<UserResource>))
                .route(
                    "/:id",
                    get(handlers::catalog::get_one::<UserResource>)
                        .put(handlers::users::update_user)
                        .delete(handlers::users::delete_user),
                )
                .route_layer(guard),
        );

    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/avatar/:id", get(handlers::auth::avatar));

    Router::new()
        .route("/", get(|| async { "vitrine-api up" }))
        .route("/health", get(health_check))
        .nest(
            "/api/articles",
            crud_routes::<ArticleResource>(auth_service.clone()),
        )
        .nest("/api/galleries", galleries)
        .nest("/api/images", images)
        .nest(
            "/api/links",
            crud_routes::<LinkResource>(auth_service.clone()),
        )
        .nest("/api/orders", orders)
        .nest(
            "/api/products",
            crud_routes::<ProductResource>(auth_service.clone()),
        )
        .nest("/api/projects", crud_routes::<ProjectResource>(auth_service))
        .nest("/api/users", users)
        .nest("/api/auth", auth_routes)
        .route("/api/contact", post(handlers::auth::contact))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Json(json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
