use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::book::{BookResponse, BookStatus};

use super::api::BookDraft;
use super::widgets::status_badge;

/// Fields of the book form, in focus order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Description,
    PublicationYear,
    Status,
}

impl BookField {
    const ORDER: [BookField; 5] = [
        BookField::Title,
        BookField::Author,
        BookField::Description,
        BookField::PublicationYear,
        BookField::Status,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub(crate) fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub(crate) fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Description => "Description",
            BookField::PublicationYear => "Publication year",
            BookField::Status => "Status",
        }
    }
}

/// Editable copy of a book. New books start as available.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) description: String,
    pub(crate) publication_year: String,
    pub(crate) status: BookStatus,
    pub(crate) active: BookField,
}

impl BookForm {
    /// Populate the form from an existing book when editing.
    pub(crate) fn from_book(book: &BookResponse) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone(),
            publication_year: book
                .publication_year
                .map(|y| y.to_string())
                .unwrap_or_default(),
            status: book.status,
            active: BookField::Title,
        }
    }

    pub(crate) fn focus_next(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn focus_prev(&mut self) {
        self.active = self.active.prev();
    }

    fn active_text(&mut self) -> Option<&mut String> {
        match self.active {
            BookField::Title => Some(&mut self.title),
            BookField::Author => Some(&mut self.author),
            BookField::Description => Some(&mut self.description),
            BookField::PublicationYear => Some(&mut self.publication_year),
            BookField::Status => None,
        }
    }

    /// Append a character to the active field. The year only takes digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if self.active == BookField::PublicationYear && !ch.is_ascii_digit() {
            return false;
        }
        match self.active_text() {
            Some(text) => {
                text.push(ch);
                true
            }
            None => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(text) = self.active_text() {
            text.pop();
        }
    }

    /// Step through the three statuses in either direction.
    pub(crate) fn cycle_status(&mut self, forward: bool) {
        let all = BookStatus::ALL;
        let current = all.iter().position(|s| *s == self.status).unwrap_or(0);
        let next = if forward {
            (current + 1) % all.len()
        } else {
            (current + all.len() - 1) % all.len()
        };
        self.status = all[next];
    }

    /// Check the form and produce the request body.
    pub(crate) fn to_draft(&self) -> Result<BookDraft, &'static str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required.");
        }
        Ok(BookDraft {
            title: title.to_string(),
            author: self.author.trim().to_string(),
            description: self.description.trim().to_string(),
            publication_year: self.publication_year.trim().to_string(),
            status: self.status,
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let label_style = if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let label = Span::styled(format!("{:>17}: ", field.label()), label_style);

        if field == BookField::Status {
            let hint = if is_active { "  (←/→ to change)" } else { "" };
            return Line::from(vec![
                label,
                status_badge(self.status),
                Span::styled(hint, Style::default().fg(Color::DarkGray)),
            ]);
        }

        let value = match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Description => &self.description,
            _ => &self.publication_year,
        };
        let (display, style) = if value.is_empty() {
            let placeholder = if field == BookField::Title {
                "<required>"
            } else {
                "<empty>"
            };
            (placeholder.to_string(), Style::default().fg(Color::DarkGray))
        } else if is_active {
            (format!("{value}_"), Style::default().fg(Color::Yellow))
        } else {
            (value.clone(), Style::default())
        };

        Line::from(vec![label, Span::styled(display, style)])
    }
}
