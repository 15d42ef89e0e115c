//! Book catalog endpoints

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    models::book::{BookListQuery, BookPayload, BookResponse},
    AppState,
};

use super::{BookId, Editor};

/// Total number of books matching the list filter
pub const X_TOTAL: HeaderName = HeaderName::from_static("x-total");
/// Number of pages at the requested page size
pub const X_TOTAL_PAGES: HeaderName = HeaderName::from_static("x-totalpages");

/// List books with filters and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookListQuery),
    responses(
        (status = 200, description = "One page of books", body = Vec<BookResponse>,
            headers(
                ("X-Total" = i64, description = "Books matching the filter"),
                ("X-TotalPages" = i64, description = "Pages at this page size")
            )),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> AppResult<(HeaderMap, Json<Vec<BookResponse>>)> {
    let filter = query.filter()?;
    let pagination = query.pagination(&state.config.api);

    let page = state.services.books.list(&filter, pagination).await?;

    let mut headers = HeaderMap::new();
    headers.insert(X_TOTAL, HeaderValue::from(page.total));
    headers.insert(X_TOTAL_PAGES, HeaderValue::from(pagination.total_pages(page.total)));

    let items = page.items.into_iter().map(BookResponse::from).collect();
    Ok((headers, Json(items)))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    BookId(id): BookId,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book.into()))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse),
        (status = 403, description = "Edit capability required", body = crate::error::ErrorResponse),
        (status = 500, description = "Persistence failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    _editor: Editor,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let created = state.services.books.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Partially update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse),
        (status = 403, description = "Edit capability required", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    _editor: Editor,
    BookId(id): BookId,
    Json(payload): Json<Value>,
) -> AppResult<Json<BookResponse>> {
    let updated = state.services.books.update(id, &payload).await?;
    Ok(Json(updated.into()))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Edit capability required", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    _editor: Editor,
    BookId(id): BookId,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
