//! HTTP client the admin console uses to talk to the REST API

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use thiserror::Error;

use crate::{
    api::books::X_TOTAL_PAGES,
    config::AdminConfig,
    models::book::{BookResponse, BookStatus},
};

/// Page size used when walking the whole catalog
const FETCH_PAGE_SIZE: i64 = 100;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
}

/// Body sent on create and update. The form always submits every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub description: String,
    /// Empty string leaves the year unset
    pub publication_year: String,
    pub status: BookStatus,
}

/// Operations the console needs from the catalog
#[cfg_attr(test, mockall::automock)]
pub trait BooksApi {
    /// Every book, walking all pages
    fn list_books(&self) -> Result<Vec<BookResponse>, ApiError>;
    fn get_book(&self, id: i64) -> Result<BookResponse, ApiError>;
    fn create_book(&self, draft: &BookDraft) -> Result<BookResponse, ApiError>;
    fn update_book(&self, id: i64, draft: &BookDraft) -> Result<BookResponse, ApiError>;
    fn delete_book(&self, id: i64) -> Result<(), ApiError>;
}

pub struct HttpBooksApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBooksApi {
    pub fn new(config: &AdminConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Turn any non-success answer into an error carrying the server message.
    fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(body);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl BooksApi for HttpBooksApi {
    fn list_books(&self) -> Result<Vec<BookResponse>, ApiError> {
        let mut books = Vec::new();
        let mut page = 1;
        loop {
            let response = Self::check(
                self.client
                    .get(self.url("/books"))
                    .query(&[("page", page), ("per_page", FETCH_PAGE_SIZE)])
                    .send()?,
            )?;
            let total_pages = response
                .headers()
                .get(X_TOTAL_PAGES)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(1);
            books.extend(response.json::<Vec<BookResponse>>()?);

            if page >= total_pages {
                return Ok(books);
            }
            page += 1;
        }
    }

    fn get_book(&self, id: i64) -> Result<BookResponse, ApiError> {
        let response = Self::check(self.client.get(self.url(&format!("/books/{}", id))).send()?)?;
        Ok(response.json()?)
    }

    fn create_book(&self, draft: &BookDraft) -> Result<BookResponse, ApiError> {
        let request = self.authorize(self.client.post(self.url("/books")).json(draft));
        Ok(Self::check(request.send()?)?.json()?)
    }

    fn update_book(&self, id: i64, draft: &BookDraft) -> Result<BookResponse, ApiError> {
        let request = self.authorize(
            self.client
                .put(self.url(&format!("/books/{}", id)))
                .json(draft),
        );
        Ok(Self::check(request.send()?)?.json()?)
    }

    fn delete_book(&self, id: i64) -> Result<(), ApiError> {
        let request = self.authorize(self.client.delete(self.url(&format!("/books/{}", id))));
        Self::check(request.send()?)?;
        Ok(())
    }
}
