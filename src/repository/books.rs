//! PostgreSQL book storage

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, QueryBuilder};

use super::{not_found, BookStore};
use crate::{
    error::{AppResult, ValidationError},
    models::book::{Book, BookFields, BookFilter, BookPage, Pagination},
};

const COLUMNS: &str =
    "id, title, description, author, publication_year, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Append the WHERE clause for `filter`. Every value goes through a bind.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &BookFilter) {
    builder.push(" WHERE 1=1");

    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }

    if let Some(ref author) = filter.author {
        builder.push(" AND author = ").push_bind(author.clone());
    }

    if let Some(year) = filter.publication_year {
        builder.push(" AND publication_year = ").push_bind(year);
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn insert(&self, fields: &BookFields) -> AppResult<i64> {
        let title = fields
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingTitle)?;
        let now = Utc::now();

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO library_books
                (title, description, author, publication_year, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(&fields.description)
        .bind(&fields.author)
        .bind(fields.publication_year)
        .bind(fields.status.unwrap_or_default())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Inserted book id={}", id);
        Ok(id)
    }

    async fn get(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM library_books WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM library_books", COLUMNS));
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY id DESC");

        let rows = builder.build_query_as::<Book>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn page(&self, filter: &BookFilter, pagination: Pagination) -> AppResult<BookPage> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM library_books");
        push_filter(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(format!("SELECT {} FROM library_books", COLUMNS));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(pagination.per_page)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let items = select.build_query_as::<Book>().fetch_all(&self.pool).await?;
        tracing::debug!(
            "Book page {} ({} per page): {} of {} rows",
            pagination.page,
            pagination.per_page,
            items.len(),
            total
        );

        Ok(BookPage { items, total })
    }

    async fn update(&self, id: i64, fields: &BookFields) -> AppResult<Book> {
        let mut builder = QueryBuilder::new("UPDATE library_books SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(ref title) = fields.title {
            builder.push(", title = ").push_bind(title.clone());
        }
        if let Some(ref description) = fields.description {
            builder.push(", description = ").push_bind(description.clone());
        }
        if let Some(ref author) = fields.author {
            builder.push(", author = ").push_bind(author.clone());
        }
        if let Some(year) = fields.publication_year {
            builder.push(", publication_year = ").push_bind(year);
        }
        if let Some(status) = fields.status {
            builder.push(", status = ").push_bind(status);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(COLUMNS);

        builder
            .build_query_as::<Book>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM library_books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
