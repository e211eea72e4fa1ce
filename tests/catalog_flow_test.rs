//! End-to-end CRUD flows: gates, image lifecycle and persistence driven
//! through the HTTP surface against in-memory SQLite and a temporary
//! media root.

mod common;

use axum::http::{Method, StatusCode};
use common::{files_in, multipart_body, png_bytes, response_json, TestApp};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use vitrine_api::entities::{article, gallery, image};

fn article_fields<'a>(name: &'a str, text: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", name),
        ("text", text),
        ("alt", "An illustration"),
        ("cat", "news"),
    ]
}

#[tokio::test]
async fn create_article_stores_slugged_image_and_removes_upload() {
    let app = TestApp::new().await;
    let token = app.token_for(1);

    let body = multipart_body(
        &article_fields("Hello World", "A first article body with enough length."),
        Some(("photo.png", &png_bytes())),
    );
    let response = app
        .request(Method::POST, "/api/articles", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Stored image and thumbnail derive from the slug of the name
    let root = app.media_root.path();
    let images = files_in(root, "img", "articles");
    assert_eq!(images.len(), 1);
    assert!(images[0].starts_with("hello-world-"));
    assert!(images[0].ends_with(".png"));
    assert_eq!(files_in(root, "thumb", "articles"), images);

    // The spooled upload is gone
    assert!(files_in(root, "tmp", "").is_empty());

    // The row references the stored name
    let row = article::Entity::find()
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.name, "Hello World");
    assert_eq!(row.image, images[0]);
    assert_eq!(row.likes, "[]");
}

#[tokio::test]
async fn duplicate_article_name_is_a_conflict() {
    let app = TestApp::new().await;
    let token = app.token_for(1);

    let body = multipart_body(
        &article_fields("Hello World", "A first article body with enough length."),
        Some(("photo.png", &png_bytes())),
    );
    let response = app
        .request(Method::POST, "/api/articles", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same name, different everything else
    let body = multipart_body(
        &article_fields("Hello World", "A completely different body text."),
        Some(("other.png", &png_bytes())),
    );
    let response = app
        .request(Method::POST, "/api/articles", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let payload = response_json(response).await;
    assert!(payload["message"].as_str().unwrap().contains("name"));

    let count = article::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn out_of_bounds_field_fails_before_any_mutation() {
    let app = TestApp::new().await;
    let token = app.token_for(1);

    // One-character name is below the configured minimum
    let body = multipart_body(
        &article_fields("x", "A body text that is long enough to pass."),
        Some(("photo.png", &png_bytes())),
    );
    let response = app
        .request(Method::POST, "/api/articles", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let count = article::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(count, 0);
    assert!(files_in(app.media_root.path(), "img", "articles").is_empty());
}

#[tokio::test]
async fn image_bearing_create_requires_an_upload() {
    let app = TestApp::new().await;
    let token = app.token_for(1);

    let body = multipart_body(
        &article_fields("No Upload", "A body text that is long enough to pass."),
        None,
    );
    let response = app
        .request(Method::POST, "/api/articles", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn writes_require_a_bearer_token() {
    let app = TestApp::new().await;

    let body = multipart_body(
        &article_fields("Hello World", "A first article body with enough length."),
        Some(("photo.png", &png_bytes())),
    );
    let response = app
        .request(Method::POST, "/api/articles", Some(body), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Reads stay public
    let response = app.request(Method::GET, "/api/articles", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn update_with_new_upload_replaces_stored_files() {
    let app = TestApp::new().await;
    let token = app.token_for(1);

    let body = multipart_body(
        &article_fields("Hello World", "A first article body with enough length."),
        Some(("photo.png", &png_bytes())),
    );
    app.request(Method::POST, "/api/articles", Some(body), Some(&token))
        .await;

    let row = article::Entity::find()
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    let old_image = row.image.clone();

    let body = multipart_body(
        &article_fields("Fresh Title", "A replacement body, also long enough."),
        Some(("new.png", &png_bytes())),
    );
    let response = app
        .request(
            Method::PUT,
            &format!("/api/articles/{}", row.id),
            Some(body),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let images = files_in(app.media_root.path(), "img", "articles");
    assert_eq!(images.len(), 1, "superseded image should be removed");
    assert!(images[0].starts_with("fresh-title-"));
    assert_ne!(images[0], old_image);

    let row = article::Entity::find_by_id(row.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.image, images[0]);
}

#[tokio::test]
async fn delete_succeeds_when_files_are_already_gone() {
    let app = TestApp::new().await;
    let token = app.token_for(1);

    let body = multipart_body(
        &article_fields("Hello World", "A first article body with enough length."),
        Some(("photo.png", &png_bytes())),
    );
    app.request(Method::POST, "/api/articles", Some(body), Some(&token))
        .await;

    let row = article::Entity::find()
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();

    // Pull the files out from under the API
    std::fs::remove_file(app.media_root.path().join("img/articles").join(&row.image)).unwrap();
    std::fs::remove_file(app.media_root.path().join("thumb/articles").join(&row.image)).unwrap();

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/articles/{}", row.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let count = article::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn deleting_image_of_missing_gallery_is_not_found() {
    let app = TestApp::new().await;
    let token = app.token_for(1);

    // An orphaned image row whose gallery no longer exists
    let orphan = image::ActiveModel {
        name: Set("ghost-01.png".into()),
        description: Set("left behind".into()),
        gallery_id: Set(999),
        ..Default::default()
    }
    .insert(&*app.state.db)
    .await
    .unwrap();

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/images/{}", orphan.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // No filesystem mutation was attempted and the row is untouched
    assert!(files_in(app.media_root.path(), "img", "galleries").is_empty());
    let still_there = image::Entity::find_by_id(orphan.id)
        .one(&*app.state.db)
        .await
        .unwrap();
    assert!(still_there.is_some());
}

#[tokio::test]
async fn gallery_delete_cascades_to_images_and_their_files() {
    let app = TestApp::new().await;
    let token = app.token_for(1);

    let body = multipart_body(&[("name", "Summer Trip"), ("author", "Renee")], None);
    let response = app
        .request(Method::POST, "/api/galleries", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let owner = gallery::Entity::find()
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(owner.cover, "summer-trip-01.png");

    let gallery_id = owner.id.to_string();
    let body = multipart_body(
        &[
            ("description", "On the beach"),
            ("gallery_id", gallery_id.as_str()),
        ],
        Some(("beach.png", &png_bytes())),
    );
    let response = app
        .request(Method::POST, "/api/images", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let stored = files_in(app.media_root.path(), "img", "galleries");
    assert_eq!(stored.len(), 1);
    assert!(stored[0].starts_with("summer-trip-"));

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/galleries/{}", owner.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(files_in(app.media_root.path(), "img", "galleries").is_empty());
    let images_left = image::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(images_left, 0);
    let galleries_left = gallery::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(galleries_left, 0);
}

#[tokio::test]
async fn listing_images_of_missing_gallery_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/galleries/999/images", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn link_url_gate_and_round_trip() {
    let app = TestApp::new().await;
    let token = app.token_for(1);

    let body = multipart_body(
        &[("name", "Rust"), ("url", "www.rust-lang.org"), ("cat", "dev")],
        None,
    );
    let response = app
        .request(Method::POST, "/api/links", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = multipart_body(
        &[("name", "Broken"), ("url", "not a url"), ("cat", "dev")],
        None,
    );
    let response = app
        .request(Method::POST, "/api/links", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.request(Method::GET, "/api/links", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(payload.as_array().unwrap().len(), 1);
    assert_eq!(payload[0]["url"], "www.rust-lang.org");
}

#[tokio::test]
async fn order_creation_mails_the_owner_and_enforces_payment_uniqueness() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("Renee", "renee@example.com", "Abcdef1!").await;
    let token = app.token_for(user_id);

    let user_id_text = user_id.to_string();
    let products = r#"[{"id":1,"name":"Mug","option":"blue","quantity":2,"price":"12.50"}]"#;
    let fields = vec![
        ("products", products),
        ("total", "25.00"),
        ("payment_id", "pay-0001"),
        ("status", "pending"),
        ("user_id", user_id_text.as_str()),
    ];

    let response = app
        .request(
            Method::POST,
            "/api/orders",
            Some(multipart_body(&fields, None)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The confirmation went to the account address and lists the basket
    let sent = app.mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "renee@example.com");
    assert!(sent[0].html.contains("Mug"));
    assert!(sent[0].html.contains("pay-0001"));

    // Same payment id again: uniqueness conflict
    let response = app
        .request(
            Method::POST,
            "/api/orders",
            Some(multipart_body(&fields, None)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Creating an order for somebody else is blocked by identity binding
    let other = vec![
        ("products", products),
        ("total", "25.00"),
        ("payment_id", "pay-0002"),
        ("status", "pending"),
        ("user_id", "9999"),
    ];
    let response = app
        .request(
            Method::POST,
            "/api/orders",
            Some(multipart_body(&other, None)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
