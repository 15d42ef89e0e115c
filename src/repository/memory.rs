//! In-process book storage

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{not_found, BookStore};
use crate::{
    error::{AppError, AppResult, ValidationError},
    models::book::{Book, BookFields, BookFilter},
};

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Book>,
}

/// Book storage held in memory. Ids grow monotonically and are never reused,
/// even after deletes.
#[derive(Default)]
pub struct MemoryBookStore {
    table: RwLock<Table>,
    offline: AtomicBool,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn insert(&self, fields: &BookFields) -> AppResult<i64> {
        self.check_online()?;
        let title = fields
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingTitle)?;

        let mut table = self.table.write().await;
        table.last_id += 1;
        let id = table.last_id;
        let now = Utc::now();

        table.rows.insert(
            id,
            Book {
                id,
                title,
                description: fields.description.clone(),
                author: fields.author.clone(),
                publication_year: fields.publication_year,
                status: fields.status.unwrap_or_default(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> AppResult<Book> {
        self.check_online()?;
        let table = self.table.read().await;
        table.rows.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        self.check_online()?;
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .rev()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, fields: &BookFields) -> AppResult<Book> {
        self.check_online()?;
        let mut table = self.table.write().await;
        let book = table.rows.get_mut(&id).ok_or_else(|| not_found(id))?;

        if let Some(ref title) = fields.title {
            book.title = title.clone();
        }
        if let Some(ref description) = fields.description {
            book.description = Some(description.clone());
        }
        if let Some(ref author) = fields.author {
            book.author = Some(author.clone());
        }
        if let Some(year) = fields.publication_year {
            book.publication_year = Some(year);
        }
        if let Some(status) = fields.status {
            book.status = status;
        }
        book.updated_at = Utc::now();

        Ok(book.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.check_online()?;
        let mut table = self.table.write().await;
        table.rows.remove(&id).map(|_| ()).ok_or_else(|| not_found(id))
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_online()
    }
}
