//! API integration tests
//!
//! Drive the real router over an in-memory book store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use book_lending_server::{
    api, auth::StaticSecretAuthenticator, config::AppConfig, repository::MemoryBookStore,
    services::Services, AppState,
};

const ADMIN_SECRET: &str = "test-secret";

fn app() -> Router {
    let state = AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(Services::new(Arc::new(MemoryBookStore::new()))),
        authenticator: Arc::new(StaticSecretAuthenticator::new(ADMIN_SECRET)),
    };
    api::create_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, admin: bool, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(format!("/api/v1{}", uri));
    if admin {
        builder = builder.header("X-Admin-Secret", ADMIN_SECRET);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = app.clone().oneshot(request).await.expect("Failed to send request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn create_book(app: &Router, title: &str, author: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/books",
        true,
        Some(json!({
            "title": title,
            "author": author,
            "published": 1954,
            "pages": 423
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("No book ID").to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_admin_routes_require_secret() {
    let app = app();
    let payload = json!({"title": "Dune", "author": "Frank Herbert", "published": 1965, "pages": 412});

    let (status, body) = send(&app, Method::POST, "/books", false, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/books")
        .header("X-Admin-Secret", "wrong")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let id = create_book(&app, "Dune", "Frank Herbert").await;
    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", id), false, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        false,
        Some(json!({"pages": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_get_book() {
    let app = app();
    let id = create_book(&app, "The Fellowship of the Ring", "J.R.R. Tolkien").await;

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "The Fellowship of the Ring");
    assert_eq!(body["status"], "available");
    assert!(body["taken_by"].is_null());
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn test_create_rejects_invalid_book() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        true,
        Some(json!({"title": "", "author": "Anon", "published": 2000, "pages": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "title required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        true,
        Some(json!({"title": "Future", "author": "Anon", "published": 99999, "pages": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "published year cannot be in the future");
}

#[tokio::test]
async fn test_get_unknown_book_is_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::GET,
        "/books/00000000-0000-4000-8000-000000000000",
        false,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchBook");
}

#[tokio::test]
async fn test_take_return_cycle() {
    let app = app();
    let id = create_book(&app, "The Two Towers", "J.R.R. Tolkien").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/books/{}/take", id),
        false,
        Some(json!({"email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid email format");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/books/{}/take", id),
        false,
        Some(json!({"email": "sam@shire.me"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "taken");
    assert_eq!(body["taken_by"], "sam@shire.me");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/books/{}/take", id),
        false,
        Some(json!({"email": "merry@shire.me"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", id), true, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) =
        send(&app, Method::POST, &format!("/books/{}/return", id), false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
    assert!(body["taken_by"].is_null());

    let (status, _) =
        send(&app, Method::POST, &format!("/books/{}/return", id), false, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", id), true, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/books/{}", id), false, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_book() {
    let app = app();
    let id = create_book(&app, "The Return of the King", "J.R.R. Tolkien").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        true,
        Some(json!({"pages": 416, "status": "taken"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pages"], 416);
    assert_eq!(body["title"], "The Return of the King");
    assert_eq!(body["status"], "available");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        true,
        Some(json!({"pages": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "pages must be positive");
}

#[tokio::test]
async fn test_list_filters() {
    let app = app();
    let fellowship = create_book(&app, "The Fellowship of the Ring", "J.R.R. Tolkien").await;
    create_book(&app, "Dune", "Frank Herbert").await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/books/{}/take", fellowship),
        false,
        Some(json!({"email": "frodo@shire.me"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/books", false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (_, body) = send(&app, Method::GET, "/books?status=taken", false, None).await;
    let books = body.as_array().expect("Expected array");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["id"], fellowship.as_str());

    let (_, body) = send(&app, Method::GET, "/books?author=tolkien", false, None).await;
    let books = body.as_array().expect("Expected array");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["author"], "J.R.R. Tolkien");

    let (_, body) = send(&app, Method::GET, "/books?status=available&author=TOLKIEN", false, None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_missing_fields_are_validation_errors() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        true,
        Some(json!({"author": "Anon", "published": 2000, "pages": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["message"], "title required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        true,
        Some(json!({"title": "Dune", "author": "Frank Herbert", "published": 1965})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "pages must be positive");

    let id = create_book(&app, "Dune", "Frank Herbert").await;
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/books/{}/take", id),
        false,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid email format");
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        true,
        Some(json!({"title": "Dune", "author": "Frank Herbert", "published": 1965, "pages": "many"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_text_is_stored_as_given() {
    let app = app();
    let id = create_book(&app, " Dune ", "  Frank Herbert").await;

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], " Dune ");
    assert_eq!(body["author"], "  Frank Herbert");
}

#[tokio::test]
async fn test_status_filter_values() {
    let app = app();
    create_book(&app, "Dune", "Frank Herbert").await;
    create_book(&app, "Emma", "Jane Austen").await;

    let (status, body) = send(&app, Method::GET, "/books?status=", false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, body) = send(&app, Method::GET, "/books?status=&author=", false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, body) = send(&app, Method::GET, "/books?status=lost", false, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert!(body["message"].as_str().unwrap_or_default().contains("lost"));
}
