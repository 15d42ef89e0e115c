//! Terminal admin console for managing the catalog through the REST API

mod api;
mod app;
mod form;
mod list;
mod terminal;
mod widgets;

pub use api::{ApiError, BookDraft, BooksApi, HttpBooksApi};
pub use app::{App, View};
pub use terminal::run_app;

use anyhow::Context;

use crate::config::AdminConfig;

/// Open the console against the API described by `config`.
pub fn run(config: &AdminConfig) -> anyhow::Result<()> {
    let api = HttpBooksApi::new(config).context("failed to build HTTP client")?;
    let mut app = App::new(api);
    run_app(&mut app)
}
