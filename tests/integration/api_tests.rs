//! API integration tests
//!
//! Most tests drive the router in-process over [`MemoryBookStore`]. The
//! admin client tests serve it over loopback TCP, and the `#[ignore]`d ones
//! at the bottom hit a running server.

use std::net::SocketAddr;
use std::sync::{mpsc, Arc};
use std::thread;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        request::Parts,
        HeaderMap, Method, Request, StatusCode,
    },
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use library_manager::{
    admin::{ApiError, BookDraft, BooksApi, HttpBooksApi},
    api,
    config::{AdminConfig, AppConfig},
    models::book::{BookFields, BookStatus},
    repository::{BookStore, MemoryBookStore},
    AppState,
};

/// Requests carrying this header hold the edit capability.
const EDITOR_HEADER: &str = "x-test-editor";

fn test_app() -> (Router, Arc<MemoryBookStore>) {
    let store = Arc::new(MemoryBookStore::new());
    let capability = Arc::new(|parts: &Parts| parts.headers.contains_key(EDITOR_HEADER));
    let state = AppState::new(AppConfig::default(), store.clone(), capability);
    (api::router(state), store)
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>, editor: bool) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if editor {
        builder = builder.header(EDITOR_HEADER, "1");
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse { status, headers, body }
}

fn header_i64(response: &TestResponse, name: &str) -> i64 {
    response.headers[name].to_str().unwrap().parse().unwrap()
}

async fn seed(store: &MemoryBookStore, count: usize) {
    for n in 0..count {
        store
            .insert(&BookFields {
                title: Some(format!("Book {n}")),
                ..Default::default()
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = test_app();
    let response = send(&app, Method::GET, "/library/v1/health", None, false).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_follows_storage() {
    let (app, store) = test_app();
    let response = send(&app, Method::GET, "/library/v1/ready", None, false).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ready");

    store.set_offline(true);
    let response = send(&app, Method::GET, "/library/v1/ready", None, false).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_book_lifecycle() {
    let (app, _) = test_app();

    let created = send(
        &app,
        Method::POST,
        "/library/v1/books",
        Some(json!({
            "title": "<b>Dune</b>",
            "author": "Frank Herbert",
            "publication_year": 1965
        })),
        true,
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["title"], "Dune");
    assert_eq!(created.body["author"], "Frank Herbert");
    assert_eq!(created.body["publication_year"], 1965);
    assert_eq!(created.body["status"], "available");
    assert_eq!(created.body["description"], "");
    let id = created.body["id"].as_i64().unwrap();

    let fetched = send(&app, Method::GET, &format!("/library/v1/books/{id}"), None, false).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["title"], "Dune");

    let updated = send(
        &app,
        Method::PUT,
        &format!("/library/v1/books/{id}"),
        Some(json!({"status": "borrowed"})),
        true,
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["status"], "borrowed");
    assert_eq!(updated.body["title"], "Dune");
    assert_eq!(updated.body["publication_year"], 1965);
    assert_eq!(updated.body["created_at"], created.body["created_at"]);

    let deleted = send(&app, Method::DELETE, &format!("/library/v1/books/{id}"), None, true).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = send(&app, Method::GET, &format!("/library/v1/books/{id}"), None, false).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["code"], "not_found");
    assert_eq!(gone.body["status"], 404);
}

#[tokio::test]
async fn test_minimal_create_applies_defaults() {
    let (app, _) = test_app();
    let created = send(&app, Method::POST, "/library/v1/books", Some(json!({"title": "Dune"})), true).await;

    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "available");
    assert!(created.body["publication_year"].is_null());
    assert_eq!(created.body["author"], "");
    assert_eq!(created.body["created_at"], created.body["updated_at"]);
}

#[tokio::test]
async fn test_mutations_require_edit_capability() {
    let (app, store) = test_app();
    seed(&store, 1).await;

    let create = send(&app, Method::POST, "/library/v1/books", Some(json!({"title": "Dune"})), false).await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);
    assert_eq!(create.body["code"], "forbidden");
    assert_eq!(
        create.body["message"],
        "You do not have permission to perform this action."
    );

    let update = send(&app, Method::PUT, "/library/v1/books/1", Some(json!({"title": "x"})), false).await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);

    let delete = send(&app, Method::DELETE, "/library/v1/books/1", None, false).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let books = send(&app, Method::GET, "/library/v1/books", None, false).await;
    assert_eq!(books.body.as_array().unwrap().len(), 1);
    assert_eq!(books.body[0]["title"], "Book 0");
}

#[tokio::test]
async fn test_create_validation_errors() {
    let (app, store) = test_app();

    let cases = [
        (json!({}), "missing_title"),
        (json!({"title": "<script>alert(1)</script>"}), "missing_title"),
        (json!({"title": "Dune", "publication_year": -1}), "invalid_year"),
        (json!({"title": "Dune", "publication_year": "soon"}), "invalid_year"),
        (json!({"title": "Dune", "status": "lost"}), "invalid_status"),
    ];
    for (payload, code) in cases {
        let response = send(&app, Method::POST, "/library/v1/books", Some(payload.clone()), true).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(response.body["code"], code, "payload {payload}");
    }

    assert!(store.list(&Default::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (app, _) = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/library/v1/books")
        .header(EDITOR_HEADER, "1")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_update_checks_existence_before_validation() {
    let (app, _) = test_app();
    let response = send(
        &app,
        Method::PUT,
        "/library/v1/books/99",
        Some(json!({"status": "lost"})),
        true,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = send(&app, Method::DELETE, "/library/v1/books/99", None, true).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_sanitizes_description() {
    let (app, store) = test_app();
    seed(&store, 1).await;

    let response = send(
        &app,
        Method::PUT,
        "/library/v1/books/1",
        Some(json!({"description": "<p>Desert planet</p><script>evil()</script>", "title": "  "})),
        true,
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "missing_title");

    let response = send(
        &app,
        Method::PUT,
        "/library/v1/books/1",
        Some(json!({"description": "<p>Desert planet</p><script>evil()</script>"})),
        true,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["description"], "<p>Desert planet</p>");
    assert_eq!(response.body["title"], "Book 0");
}

#[tokio::test]
async fn test_pagination_headers() {
    let (app, store) = test_app();
    seed(&store, 45).await;

    let first = send(&app, Method::GET, "/library/v1/books", None, false).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body.as_array().unwrap().len(), 20);
    assert_eq!(first.body[0]["title"], "Book 44");
    assert_eq!(header_i64(&first, "x-total"), 45);
    assert_eq!(header_i64(&first, "x-totalpages"), 3);

    let last = send(&app, Method::GET, "/library/v1/books?page=3&per_page=20", None, false).await;
    assert_eq!(last.body.as_array().unwrap().len(), 5);
    assert_eq!(last.body[4]["title"], "Book 0");

    let beyond = send(&app, Method::GET, "/library/v1/books?page=9", None, false).await;
    assert_eq!(beyond.status, StatusCode::OK);
    assert!(beyond.body.as_array().unwrap().is_empty());
    assert_eq!(header_i64(&beyond, "x-total"), 45);

    let capped = send(&app, Method::GET, "/library/v1/books?per_page=1000", None, false).await;
    assert_eq!(capped.body.as_array().unwrap().len(), 45);
    assert_eq!(header_i64(&capped, "x-totalpages"), 1);

    let clamped = send(&app, Method::GET, "/library/v1/books?page=0&per_page=0", None, false).await;
    assert_eq!(clamped.body.as_array().unwrap().len(), 1);
    assert_eq!(header_i64(&clamped, "x-totalpages"), 45);
}

#[tokio::test]
async fn test_huge_page_number_is_past_the_end() {
    let (app, store) = test_app();
    seed(&store, 3).await;

    let response = send(
        &app,
        Method::GET,
        "/library/v1/books?page=9223372036854775807&per_page=20",
        None,
        false,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.as_array().unwrap().is_empty());
    assert_eq!(header_i64(&response, "x-total"), 3);
    assert_eq!(header_i64(&response, "x-totalpages"), 1);
}

#[tokio::test]
async fn test_unparseable_paging_falls_back_to_defaults() {
    let (app, store) = test_app();
    seed(&store, 25).await;

    for uri in ["/library/v1/books?page=abc", "/library/v1/books?page=", "/library/v1/books?per_page=xyz"] {
        let response = send(&app, Method::GET, uri, None, false).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
        assert_eq!(response.body.as_array().unwrap().len(), 20, "{uri}");
        assert_eq!(response.body[0]["title"], "Book 24", "{uri}");
        assert_eq!(header_i64(&response, "x-totalpages"), 2, "{uri}");
    }
}

#[tokio::test]
async fn test_non_numeric_id_is_not_found() {
    let (app, _) = test_app();

    let get = send(&app, Method::GET, "/library/v1/books/abc", None, false).await;
    assert_eq!(get.status, StatusCode::NOT_FOUND);
    assert_eq!(get.body["code"], "not_found");
    assert_eq!(get.body["message"], "Book abc not found");

    let update = send(&app, Method::PUT, "/library/v1/books/abc", Some(json!({"title": "x"})), true).await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);
    assert_eq!(update.body["code"], "not_found");

    let delete = send(&app, Method::DELETE, "/library/v1/books/-1", None, true).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let overflow = send(&app, Method::GET, "/library/v1/books/99999999999999999999", None, false).await;
    assert_eq!(overflow.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters() {
    let (app, _) = test_app();
    for payload in [
        json!({"title": "Dune", "author": "Frank Herbert", "publication_year": 1965, "status": "borrowed"}),
        json!({"title": "Children of Dune", "author": "Frank Herbert", "publication_year": 1976}),
        json!({"title": "Solaris", "author": "Stanisław Lem", "publication_year": 1961}),
    ] {
        let response = send(&app, Method::POST, "/library/v1/books", Some(payload), true).await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let titles = |response: &TestResponse| -> Vec<String> {
        response
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap().to_string())
            .collect()
    };

    let by_author = send(&app, Method::GET, "/library/v1/books?author=Frank%20Herbert", None, false).await;
    assert_eq!(titles(&by_author), ["Children of Dune", "Dune"]);
    assert_eq!(header_i64(&by_author, "x-total"), 2);

    let combined = send(
        &app,
        Method::GET,
        "/library/v1/books?author=Frank%20Herbert&status=available",
        None,
        false,
    )
    .await;
    assert_eq!(titles(&combined), ["Children of Dune"]);

    let by_year = send(&app, Method::GET, "/library/v1/books?year=1961", None, false).await;
    assert_eq!(titles(&by_year), ["Solaris"]);

    let empty_filter = send(&app, Method::GET, "/library/v1/books?status=&author=", None, false).await;
    assert_eq!(titles(&empty_filter).len(), 3);

    let bad_status = send(&app, Method::GET, "/library/v1/books?status=lost", None, false).await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_status.body["code"], "invalid_filter");

    let bad_year = send(&app, Method::GET, "/library/v1/books?year=nineteen", None, false).await;
    assert_eq!(bad_year.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_year.body["code"], "invalid_filter");
}

#[tokio::test]
async fn test_storage_failure_is_opaque() {
    let (app, store) = test_app();
    store.set_offline(true);

    let response = send(&app, Method::GET, "/library/v1/books", None, false).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["code"], "db_error");
    assert!(!response.body["message"].as_str().unwrap().contains("pool"));

    let response = send(&app, Method::POST, "/library/v1/books", Some(json!({"title": "Dune"})), true).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _) = test_app();
    let response = send(&app, Method::GET, "/api-docs/openapi.json", None, false).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/books/{id}"].is_object());
}

// Live tests. Run with: cargo test -- --ignored

/// Serve the router over real TCP from its own runtime thread, seeded with
/// `rows` books. Requests bearing `test-token` may edit.
fn spawn_server(rows: usize) -> SocketAddr {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let store = Arc::new(MemoryBookStore::new());
            seed(&store, rows).await;
            let capability = Arc::new(|parts: &Parts| {
                parts
                    .headers
                    .get(AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    == Some("Bearer test-token")
            });
            let state = AppState::new(AppConfig::default(), store, capability);

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, api::router(state)).await.unwrap();
        });
    });
    rx.recv().unwrap()
}

fn http_client(addr: SocketAddr, token: Option<&str>) -> HttpBooksApi {
    HttpBooksApi::new(&AdminConfig {
        base_url: format!("http://{addr}/library/v1"),
        token: token.map(str::to_string),
        timeout_secs: 5,
    })
    .unwrap()
}

fn draft(title: &str) -> BookDraft {
    BookDraft {
        title: title.to_string(),
        author: String::new(),
        description: String::new(),
        publication_year: String::new(),
        status: BookStatus::Available,
    }
}

#[test]
fn test_admin_client_walks_every_page() {
    let addr = spawn_server(150);
    let client = http_client(addr, None);

    let books = client.list_books().unwrap();
    assert_eq!(books.len(), 150);
    assert_eq!(books[0].title, "Book 149");
    assert_eq!(books[149].title, "Book 0");
}

#[test]
fn test_admin_client_surfaces_error_bodies() {
    let addr = spawn_server(0);

    let anonymous = http_client(addr, None);
    match anonymous.create_book(&draft("Dune")) {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "You do not have permission to perform this action.");
        }
        other => panic!("expected a 403, got {other:?}"),
    }

    let editor = http_client(addr, Some("test-token"));
    let created = editor.create_book(&draft("Dune")).unwrap();
    assert_eq!(created.title, "Dune");

    match editor.get_book(9999) {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Book 9999 not found");
        }
        other => panic!("expected a 404, got {other:?}"),
    }
}

#[tokio::test]
#[ignore]
async fn test_postgres_store_round_trip() {
    use library_manager::{models::book::BookStatus, repository::PgBookStore};

    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let store = PgBookStore::new(pool);
    store.ping().await.unwrap();

    let id = store
        .insert(&BookFields {
            title: Some("Dune".into()),
            publication_year: Some(1965),
            ..Default::default()
        })
        .await
        .unwrap();
    let book = store.get(id).await.unwrap();
    assert_eq!(book.status, BookStatus::Available);

    let updated = store
        .update(
            id,
            &BookFields {
                status: Some(BookStatus::Borrowed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Dune");
    assert_eq!(updated.publication_year, Some(1965));
    assert!(updated.updated_at >= book.updated_at);

    store.delete(id).await.unwrap();
    assert!(store.get(id).await.is_err());
}

const BASE_URL: &str = "http://localhost:8080/library/v1";

#[tokio::test]
#[ignore]
async fn test_live_health_check() {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_live_list_books_headers() {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/books?per_page=5", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-total"));
    assert!(response.headers().contains_key("x-totalpages"));
}

#[tokio::test]
#[ignore]
async fn test_live_create_without_token_is_forbidden() {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({"title": "Dune"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}
