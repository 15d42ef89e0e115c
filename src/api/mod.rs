//! API handlers for the library REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// Base path of every REST route
pub const API_BASE: &str = "/library/v1";

/// Extractor proving the caller holds the edit capability
pub struct Editor;

#[async_trait]
impl FromRequestParts<AppState> for Editor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if state.capability.can_edit(parts) {
            Ok(Editor)
        } else {
            Err(AppError::PermissionDenied(
                "You do not have permission to perform this action.".to_string(),
            ))
        }
    }
}

/// Numeric `{id}` path segment. Anything that is not a run of digits names
/// no book, so it is a 404 like any other unknown id.
pub struct BookId(pub i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BookId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::NotFound(format!("Book {} not found", raw)));
        }
        raw.parse()
            .map(BookId)
            .map_err(|_| AppError::NotFound(format!("Book {} not found", raw)))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([books::X_TOTAL, books::X_TOTAL_PAGES]);

    let library_v1 = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .with_state(state);

    Router::new()
        .nest(API_BASE, library_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
