//! Book catalog service: validation in front of storage

use std::sync::Arc;

use serde_json::Value;

use crate::{
    error::AppResult,
    models::book::{Book, BookFilter, BookPage, Pagination},
    repository::BookStore,
    validation::validate,
};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// One page of books matching `filter`, with the total match count
    pub async fn list(&self, filter: &BookFilter, pagination: Pagination) -> AppResult<BookPage> {
        self.store.page(filter, pagination).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Book> {
        self.store.get(id).await
    }

    /// Validate a full payload and create the book. Nothing is written when
    /// validation fails.
    pub async fn create(&self, payload: &Value) -> AppResult<Book> {
        let fields = validate(payload, true)?;
        let id = self.store.insert(&fields).await?;
        tracing::info!("Created book id={}", id);
        self.store.get(id).await
    }

    /// Apply a partial update. The book must exist before the payload is
    /// even looked at.
    pub async fn update(&self, id: i64, payload: &Value) -> AppResult<Book> {
        self.store.get(id).await?;
        let fields = validate(payload, false)?;
        let book = self.store.update(id, &fields).await?;
        tracing::info!("Updated book id={}", id);
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.store.get(id).await?;
        self.store.delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    /// Storage readiness check
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
