//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

use crate::{config::ApiConfig, error::ValidationError, sanitize};

/// Circulation status of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Borrowed,
    Unavailable,
}

impl BookStatus {
    pub const ALL: [BookStatus; 3] = [
        BookStatus::Available,
        BookStatus::Borrowed,
        BookStatus::Unavailable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Unavailable => "unavailable",
        }
    }

    /// Human label used by the admin console
    pub fn label(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Borrowed => "Borrowed",
            BookStatus::Unavailable => "Unavailable",
        }
    }
}

impl Default for BookStatus {
    fn default() -> Self {
        BookStatus::Available
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = ValidationError;

    /// Exact, case-sensitive match against the stored values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            "unavailable" => Ok(BookStatus::Unavailable),
            _ => Err(ValidationError::InvalidStatus),
        }
    }
}

// Stored as TEXT, constrained by a CHECK in the migration
impl sqlx::Type<Postgres> for BookStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BookStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse()
            .map_err(|_| format!("Invalid book status in database: {}", s).into())
    }
}

impl Encode<'_, Postgres> for BookStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// Stored book row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publication_year: Option<i32>,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized book representation returned by every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    /// May contain a restricted HTML subset
    pub description: String,
    pub author: String,
    pub publication_year: Option<i32>,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    /// Text fields are sanitized again on the way out.
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: sanitize::plain_text(&book.title),
            description: book
                .description
                .as_deref()
                .map(sanitize::rich_text)
                .unwrap_or_default(),
            author: book
                .author
                .as_deref()
                .map(sanitize::plain_text)
                .unwrap_or_default(),
            publication_year: book.publication_year,
            status: book.status,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// Clean, validated fields ready to persist. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publication_year: Option<i32>,
    pub status: Option<BookStatus>,
}

impl BookFields {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.author.is_none()
            && self.publication_year.is_none()
            && self.status.is_none()
    }
}

/// Request body schema for create/update (documentation only; bodies are
/// validated from raw JSON so absent and invalid fields can be told apart)
#[derive(Debug, Deserialize, ToSchema)]
pub struct BookPayload {
    /// Required on create
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    /// Integer or numeric string
    pub publication_year: Option<i32>,
    pub status: Option<BookStatus>,
}

/// Conjunctive list filter, each member optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub status: Option<BookStatus>,
    pub author: Option<String>,
    pub publication_year: Option<i32>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        self.status.map_or(true, |s| book.status == s)
            && self
                .author
                .as_ref()
                .map_or(true, |a| book.author.as_deref() == Some(a.as_str()))
            && self
                .publication_year
                .map_or(true, |y| book.publication_year == Some(y))
    }
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Saturates for absurd page numbers, which then land past the last row.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        total.saturating_add(self.per_page - 1) / self.per_page
    }
}

/// One page of books plus the number of rows matching the filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    pub items: Vec<Book>,
    pub total: i64,
}

/// Query string accepted by `GET /books`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookListQuery {
    /// Filter by status (available|borrowed|unavailable)
    pub status: Option<String>,
    /// Filter by exact author name
    pub author: Option<String>,
    /// Filter by exact publication year
    pub year: Option<String>,
    /// Page number (default: 1)
    #[param(value_type = Option<i64>)]
    pub page: Option<String>,
    /// Items per page (default: 20)
    #[param(value_type = Option<i64>)]
    pub per_page: Option<String>,
}

impl BookListQuery {
    /// Turn the raw query into a storage filter. Empty values mean "no filter".
    pub fn filter(&self) -> Result<BookFilter, ValidationError> {
        let status = match self.status.as_deref().map(sanitize::plain_text) {
            Some(s) if !s.is_empty() => Some(s.parse().map_err(|_| {
                ValidationError::InvalidFilter(format!("unknown status '{}'", s))
            })?),
            _ => None,
        };

        let author = self
            .author
            .as_deref()
            .map(sanitize::plain_text)
            .filter(|a| !a.is_empty());

        let publication_year = match self.year.as_deref().map(str::trim) {
            Some(y) if !y.is_empty() => Some(
                y.parse::<i32>()
                    .ok()
                    .filter(|y| *y >= 0)
                    .ok_or_else(|| ValidationError::InvalidFilter(format!("invalid year '{}'", y)))?,
            ),
            _ => None,
        };

        Ok(BookFilter {
            status,
            author,
            publication_year,
        })
    }

    /// Page and page size, leniently parsed. Anything unparseable falls back
    /// to the default.
    pub fn pagination(&self, api: &ApiConfig) -> Pagination {
        let per_page = lenient_int(self.per_page.as_deref())
            .unwrap_or(api.default_per_page)
            .min(api.max_per_page);
        Pagination::new(lenient_int(self.page.as_deref()).unwrap_or(1), per_page)
    }
}

fn lenient_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}
