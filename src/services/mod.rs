//! Business logic services

pub mod books;
pub mod import;

use std::sync::Arc;

use crate::repository::BookStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub import: import::ImportService,
}

impl Services {
    /// Create all services over the given storage backend
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self {
            books: books::BooksService::new(store.clone()),
            import: import::ImportService::new(store),
        }
    }
}
