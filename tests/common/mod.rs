//! Shared harness for the integration suites: in-memory SQLite, a
//! temporary media root, a recording mail transport and raw multipart
//! request helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;
use vitrine_api::{
    config::{AppConfig, LimitsConfig, MailConfig, MediaConfig},
    db,
    mailer::{MailError, Mailer},
    AppState,
};

pub const BOUNDARY: &str = "vitrine-test-boundary";

/// Mail transport that records deliveries instead of performing them.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        self.sent.lock().expect("mailer lock").push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }

    fn inbox(&self) -> &str {
        "inbox@test.local"
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    // Dropped last; owns the media root
    pub media_root: tempfile::TempDir,
}

fn test_config(media_root: &str) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        jwt_secret: "integration-test-signing-key-0123456789abcdef".into(),
        jwt_expiration: 3600,
        host: "127.0.0.1".into(),
        port: 0,
        environment: "development".into(),
        log_level: "info".into(),
        log_json: false,
        auto_migrate: false,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 600,
        db_acquire_timeout_secs: 5,
        limits: LimitsConfig::default(),
        media: MediaConfig {
            root: media_root.to_string(),
            image_ext: "png".into(),
            thumb_ext: "png".into(),
            image_width: 64,
            image_height: 64,
            thumb_width: 16,
            thumb_height: 16,
            thumb_fit: "cover".into(),
            thumb_position: "center".into(),
        },
        mail: MailConfig::default(),
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let media_root = tempfile::tempdir().expect("media root");
        let cfg = test_config(&media_root.path().to_string_lossy());

        // A single connection keeps every query on the same in-memory
        // SQLite database
        let db_cfg = db::DbConfig {
            url: cfg.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(5),
        };
        let pool = db::establish_connection_with_config(&db_cfg)
            .await
            .expect("sqlite pool");
        db::run_migrations(&pool).await.expect("migrations");

        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(cfg, pool, mailer.clone());
        state.media.prepare().await.expect("media partitions");

        let router = vitrine_api::app(state.clone());

        Self {
            router,
            state,
            mailer,
            media_root,
        }
    }

    pub fn token_for(&self, user_id: i32) -> String {
        self.state.auth.issue_token(user_id).expect("token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if body.is_some() {
            builder = builder.header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        }
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = builder
            .body(Body::from(body.unwrap_or_default()))
            .expect("request");

        self.router.clone().oneshot(request).await.expect("response")
    }

    pub async fn seed_user(&self, name: &str, email: &str, pass: &str) -> i32 {
        let body = multipart_body(
            &[
                ("name", name),
                ("email", email),
                ("role", "user"),
                ("pass", pass),
            ],
            Some(("avatar.png", &png_bytes())),
        );

        let response = self
            .request(Method::POST, "/api/users", Some(body), None)
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "user seed failed");

        use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
        use vitrine_api::entities::user;

        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.state.db)
            .await
            .expect("user query")
            .expect("seeded user")
            .id
    }
}

/// Builds a raw multipart body with the shared test boundary.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// A small valid PNG to use as an upload.
pub fn png_bytes() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(24, 18, image::Rgb([20, 90, 160])))
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("png fixture");
    buffer.into_inner()
}

pub async fn response_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Files currently present under a media partition subdirectory.
pub fn files_in(root: &std::path::Path, partition: &str, collection: &str) -> Vec<String> {
    let dir = root.join(partition).join(collection);
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}
