use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use super::api::{ApiError, BooksApi};
use super::form::{BookField, BookForm};
use super::list::{ListView, Load};
use super::widgets::{centered_rect, render_loading, status_badge};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Whether the form creates a book or edits an existing one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormMode {
    Add,
    Edit(i64),
}

pub(crate) struct FormView {
    pub(crate) mode: FormMode,
    pub(crate) form: Load<BookForm>,
}

impl FormView {
    fn add() -> Self {
        Self {
            mode: FormMode::Add,
            form: Load::Ready(BookForm::default()),
        }
    }

    /// Edit starts empty; the book is fetched on the next tick.
    fn edit(id: i64) -> Self {
        Self {
            mode: FormMode::Edit(id),
            form: Load::Loading,
        }
    }

    fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add New Book",
            FormMode::Edit(_) => "Edit Book",
        }
    }
}

enum Screen {
    List(ListView),
    Form(FormView),
}

/// Where the console currently is, for callers that only need the route.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum View {
    List,
    Add,
    Edit(i64),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }

    fn failure(err: &ApiError) -> Self {
        tracing::warn!("Admin operation failed: {}", err);
        Self::error(format!("Operation failed: {err}"))
    }
}

/// Admin console state: the active screen plus the API it drives.
pub struct App<A: BooksApi> {
    api: A,
    screen: Screen,
    status: Option<StatusMessage>,
}

impl<A: BooksApi> App<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            screen: Screen::List(ListView::new()),
            status: None,
        }
    }

    pub fn view(&self) -> View {
        match self.screen {
            Screen::List(_) => View::List,
            Screen::Form(ref form) => match form.mode {
                FormMode::Add => View::Add,
                FormMode::Edit(id) => View::Edit(id),
            },
        }
    }

    /// True while the current screen waits on data. The caller draws once
    /// before calling [`App::tick`] so the loading placeholder shows up.
    pub fn has_pending_fetch(&self) -> bool {
        match self.screen {
            Screen::List(ref view) => view.needs_fetch(),
            Screen::Form(ref view) => matches!(view.form, Load::Loading),
        }
    }

    /// Run the pending fetch, if any.
    pub fn tick(&mut self) {
        match self.screen {
            Screen::List(ref mut view) => {
                if view.needs_fetch() {
                    view.load(&self.api);
                }
            }
            Screen::Form(ref mut view) => {
                let FormMode::Edit(id) = view.mode else {
                    return;
                };
                if matches!(view.form, Load::Loading) {
                    view.form = match self.api.get_book(id) {
                        Ok(book) => Load::Ready(BookForm::from_book(&book)),
                        Err(e) => {
                            self.status = Some(StatusMessage::failure(&e));
                            Load::Failed(e.to_string())
                        }
                    };
                }
            }
        }
    }

    /// Handle one key press. Returns true when the console should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.screen {
            Screen::List(_) => self.handle_list_key(code),
            Screen::Form(_) => {
                self.handle_form_key(code);
                false
            }
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) -> bool {
        let Screen::List(ref mut view) = self.screen else {
            return false;
        };

        if let Some(book) = view.confirm_delete.take() {
            if matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                match self.api.delete_book(book.id) {
                    Ok(()) => {
                        self.status = Some(StatusMessage::info(format!(
                            "Deleted \"{}\".",
                            book.title
                        )));
                        view.reload();
                    }
                    // The row may already be gone server-side; refetch either way
                    Err(e) => {
                        self.status = Some(StatusMessage::failure(&e));
                        view.reload();
                    }
                }
            } else {
                self.status = Some(StatusMessage::info("Delete cancelled."));
            }
            return false;
        }

        if view.searching {
            match code {
                KeyCode::Esc => {
                    view.searching = false;
                    view.search.clear();
                    view.selected = 0;
                }
                KeyCode::Enter => view.searching = false,
                KeyCode::Backspace => view.pop_search(),
                KeyCode::Char(ch) => view.push_search(ch),
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') => view.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => view.move_selection(1),
            KeyCode::Char('/') => {
                view.searching = true;
                self.status = None;
            }
            KeyCode::Char('r') => view.reload(),
            KeyCode::Char('a') => {
                self.status = None;
                self.screen = Screen::Form(FormView::add());
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let selected = view.selected_book().map(|b| b.id);
                if let Some(id) = selected {
                    self.status = None;
                    self.screen = Screen::Form(FormView::edit(id));
                }
            }
            KeyCode::Char('d') => {
                view.confirm_delete = view.selected_book().cloned();
            }
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        if code == KeyCode::Esc {
            self.screen = Screen::List(ListView::new());
            return;
        }
        if code == KeyCode::Enter {
            self.submit_form();
            return;
        }

        let Screen::Form(FormView {
            form: Load::Ready(ref mut form),
            ..
        }) = self.screen
        else {
            return;
        };

        match code {
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left if form.active == BookField::Status => form.cycle_status(false),
            KeyCode::Right if form.active == BookField::Status => form.cycle_status(true),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let (mode, draft) = match self.screen {
            Screen::Form(FormView {
                mode,
                form: Load::Ready(ref form),
            }) => (mode, form.to_draft()),
            _ => return,
        };
        let draft = match draft {
            Ok(draft) => draft,
            Err(message) => {
                self.status = Some(StatusMessage::error(message));
                return;
            }
        };

        let result = match mode {
            FormMode::Add => self.api.create_book(&draft),
            FormMode::Edit(id) => self.api.update_book(id, &draft),
        };
        match result {
            Ok(book) => {
                let verb = match mode {
                    FormMode::Add => "Created",
                    FormMode::Edit(_) => "Updated",
                };
                self.status = Some(StatusMessage::info(format!("{verb} \"{}\".", book.title)));
                self.screen = Screen::List(ListView::new());
            }
            Err(e) => self.status = Some(StatusMessage::failure(&e)),
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        let subtitle = match self.screen {
            Screen::List(_) => "Books",
            Screen::Form(ref view) => view.title(),
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "Library Manager",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  /  {subtitle}")),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        match self.screen {
            Screen::List(ref view) => draw_list(frame, chunks[1], view),
            Screen::Form(ref view) => draw_form(frame, chunks[1], view),
        }

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let line = match self.screen {
            Screen::List(ref view) if view.searching => Line::from(vec![
                Span::styled("Search: ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("{}_", view.search)),
            ]),
            _ => match self.status {
                Some(ref status) => Line::from(Span::styled(status.text.clone(), status.kind.style())),
                None => Line::from(Span::styled(
                    self.instructions(),
                    Style::default().fg(Color::DarkGray),
                )),
            },
        };
        let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
    }

    fn instructions(&self) -> &'static str {
        match self.screen {
            Screen::List(_) => "↑/↓ move  / search  a add  e edit  d delete  r refresh  q quit",
            Screen::Form(_) => "Tab/Shift-Tab move  ←/→ status  Enter save  Esc back",
        }
    }
}

fn draw_list(frame: &mut Frame, area: Rect, view: &ListView) {
    match view.books {
        Load::Loading => render_loading(frame, area, "books"),
        Load::Failed(ref message) => {
            let paragraph = Paragraph::new(format!("Could not load books: {message}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Books"));
            frame.render_widget(paragraph, area);
        }
        Load::Ready(_) => {
            let books = view.visible();
            if books.is_empty() {
                let paragraph = Paragraph::new("No books found.")
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title("Books"));
                frame.render_widget(paragraph, area);
            } else {
                let rows = books.iter().map(|book| {
                    Row::new(vec![
                        Cell::from(book.title.clone()),
                        Cell::from(book.author.clone()),
                        Cell::from(
                            book.publication_year
                                .map(|y| y.to_string())
                                .unwrap_or_default(),
                        ),
                        Cell::from(Line::from(status_badge(book.status))),
                    ])
                });
                let header = Row::new(vec!["Title", "Author", "Year", "Status"])
                    .style(Style::default().add_modifier(Modifier::BOLD));
                let table = Table::new(
                    rows,
                    [
                        Constraint::Percentage(45),
                        Constraint::Percentage(30),
                        Constraint::Length(6),
                        Constraint::Length(13),
                    ],
                )
                .header(header)
                .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("Books ({})", books.len())),
                );
                let mut state = TableState::default().with_selected(Some(view.selected));
                frame.render_stateful_widget(table, area, &mut state);
            }
        }
    }

    if let Some(ref book) = view.confirm_delete {
        let popup = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup);
        let paragraph = Paragraph::new(vec![
            Line::from(format!("Delete \"{}\"?", book.title)),
            Line::from(""),
            Line::from(Span::styled(
                "y to confirm, any other key to cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm delete")
                .border_style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(paragraph, popup);
    }
}

fn draw_form(frame: &mut Frame, area: Rect, view: &FormView) {
    match view.form {
        Load::Loading => render_loading(frame, area, "book"),
        Load::Failed(ref message) => {
            let paragraph = Paragraph::new(format!("Could not load book: {message}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(view.title()));
            frame.render_widget(paragraph, area);
        }
        Load::Ready(ref form) => {
            let fields = [
                BookField::Title,
                BookField::Author,
                BookField::Description,
                BookField::PublicationYear,
                BookField::Status,
            ];
            let mut lines = Vec::with_capacity(fields.len() * 2);
            for field in fields {
                lines.push(form.build_line(field));
                lines.push(Line::from(""));
            }
            let paragraph = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title(view.title()));
            frame.render_widget(paragraph, area);
        }
    }
}
