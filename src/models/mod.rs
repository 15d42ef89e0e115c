//! Data models for the library manager

pub mod book;
pub mod import_report;

// Re-export commonly used types
pub use book::{Book, BookFields, BookFilter, BookPage, BookResponse, BookStatus, Pagination};
pub use import_report::{ImportFailure, ImportSummary};
