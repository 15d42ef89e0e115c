//! Repository layer for book persistence
//!
//! [`BookStore`] is the storage contract. [`books::PgBookStore`] backs it with
//! PostgreSQL; [`memory::MemoryBookStore`] keeps rows in process for tests and
//! demos.

pub mod books;
pub mod memory;

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFields, BookFilter, BookPage, Pagination},
};

pub use books::PgBookStore;
pub use memory::MemoryBookStore;

/// Raw persistence operations over the book table, keyed by `id`.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Write a new row. Unset optional fields take server defaults
    /// (`status = available`, everything else NULL). Returns the new id.
    async fn insert(&self, fields: &BookFields) -> AppResult<i64>;

    async fn get(&self, id: i64) -> AppResult<Book>;

    /// All rows matching `filter`, newest id first.
    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>>;

    /// One page of `list` plus the number of matching rows.
    async fn page(&self, filter: &BookFilter, pagination: Pagination) -> AppResult<BookPage> {
        let all = self.list(filter).await?;
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(pagination.per_page).unwrap_or(usize::MAX))
            .collect();
        Ok(BookPage { items, total })
    }

    /// Overwrite only the supplied fields and refresh `updated_at`.
    async fn update(&self, id: i64, fields: &BookFields) -> AppResult<Book>;

    /// Hard delete.
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Connectivity check backing readiness
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub(crate) fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}
