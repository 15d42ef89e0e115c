use crate::models::book::BookResponse;

use super::api::BooksApi;

/// Progress of a blocking fetch.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Load<T> {
    Loading,
    Ready(T),
    Failed(String),
}

/// State of the book table screen.
#[derive(Debug)]
pub(crate) struct ListView {
    pub(crate) books: Load<Vec<BookResponse>>,
    pub(crate) search: String,
    pub(crate) searching: bool,
    pub(crate) selected: usize,
    /// Book awaiting a `y` to be deleted
    pub(crate) confirm_delete: Option<BookResponse>,
}

impl ListView {
    pub(crate) fn new() -> Self {
        Self {
            books: Load::Loading,
            search: String::new(),
            searching: false,
            selected: 0,
            confirm_delete: None,
        }
    }

    pub(crate) fn needs_fetch(&self) -> bool {
        matches!(self.books, Load::Loading)
    }

    /// Fetch every book, keeping the selection in range.
    pub(crate) fn load(&mut self, api: &impl BooksApi) {
        self.books = match api.list_books() {
            Ok(books) => Load::Ready(books),
            Err(e) => {
                tracing::warn!("Failed to load books: {}", e);
                Load::Failed(e.to_string())
            }
        };
        self.clamp_selection();
    }

    pub(crate) fn reload(&mut self) {
        self.books = Load::Loading;
    }

    /// Books whose title or author contains the search text, ignoring case.
    pub(crate) fn visible(&self) -> Vec<&BookResponse> {
        let Load::Ready(ref books) = self.books else {
            return Vec::new();
        };
        let needle = self.search.trim().to_lowercase();
        books
            .iter()
            .filter(|book| {
                needle.is_empty()
                    || book.title.to_lowercase().contains(&needle)
                    || book.author.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub(crate) fn selected_book(&self) -> Option<&BookResponse> {
        self.visible().get(self.selected).copied()
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    pub(crate) fn push_search(&mut self, ch: char) {
        self.search.push(ch);
        self.selected = 0;
    }

    pub(crate) fn pop_search(&mut self) {
        self.search.pop();
        self.selected = 0;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}
