//! Terminal UI: input form, expenses table, export prompt.
//!
//! One `App` owns the storage connection and the current view of records.
//! Every key handler calls exactly one record operation (or the exporter)
//! and then refreshes the table from storage.

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use rusqlite::Connection;
use std::io;
use std::path::Path;

use crate::db::{self, Expense};
use crate::error::{ExpenseError, ExpenseResult};
use crate::export;
use crate::ops::{self, RawExpense};

const DEFAULT_EXPORT_PATH: &str = "expenses.csv";

/// A single-line text input with a cursor.
#[derive(Debug, Clone)]
pub struct TextInput {
    label: &'static str,
    placeholder: &'static str,
    content: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(label: &'static str, placeholder: &'static str) -> Self {
        Self {
            label,
            placeholder,
            content: String::new(),
            cursor: 0,
        }
    }

    pub fn value(&self) -> &str {
        &self.content
    }

    pub fn set(&mut self, content: &str) {
        self.content = content.to_string();
        self.cursor = self.content.len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.content[..self.cursor].char_indices().last() {
            self.content.remove(idx);
            self.cursor = idx;
        }
    }

    pub fn move_left(&mut self) {
        if let Some((idx, _)) = self.content[..self.cursor].char_indices().last() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.content[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    fn render_line(&self, focused: bool) -> Line<'_> {
        let label_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let mut spans = vec![Span::styled(format!(" {:<13}", self.label), label_style)];

        if focused {
            let (before, after) = self.content.split_at(self.cursor);
            let mut rest = after.chars();
            let under_cursor = rest.next().unwrap_or(' ');
            spans.push(Span::raw(before.to_string()));
            spans.push(Span::styled(
                under_cursor.to_string(),
                Style::default().add_modifier(Modifier::REVERSED),
            ));
            spans.push(Span::raw(rest.as_str().to_string()));
        } else if self.content.is_empty() {
            spans.push(Span::styled(
                self.placeholder,
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            spans.push(Span::raw(self.content.clone()));
        }

        Line::from(spans)
    }
}

/// Which form field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Date,
    Category,
    Amount,
    Description,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            Self::Date => Self::Category,
            Self::Category => Self::Amount,
            Self::Amount => Self::Description,
            Self::Description => Self::Date,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Date => Self::Description,
            Self::Category => Self::Date,
            Self::Amount => Self::Category,
            Self::Description => Self::Amount,
        }
    }
}

/// The four input fields of the add-expense form.
#[derive(Debug, Clone)]
pub struct ExpenseForm {
    pub date: TextInput,
    pub category: TextInput,
    pub amount: TextInput,
    pub description: TextInput,
    pub focused: FormField,
}

impl ExpenseForm {
    pub fn new() -> Self {
        let mut form = Self {
            date: TextInput::new("Date", "YYYY-MM-DD"),
            category: TextInput::new("Category", "e.g. Food"),
            amount: TextInput::new("Amount", "0.00"),
            description: TextInput::new("Description", "What was it for?"),
            focused: FormField::Date,
        };
        form.reset();
        form
    }

    /// Clear all fields, pre-fill the date with today, focus the first field.
    pub fn reset(&mut self) {
        self.date
            .set(&Local::now().date_naive().format("%Y-%m-%d").to_string());
        self.category.clear();
        self.amount.clear();
        self.description.clear();
        self.focused = FormField::Date;
    }

    pub fn focused_input_mut(&mut self) -> &mut TextInput {
        match self.focused {
            FormField::Date => &mut self.date,
            FormField::Category => &mut self.category,
            FormField::Amount => &mut self.amount,
            FormField::Description => &mut self.description,
        }
    }

    /// Snapshot the raw field text for the record operation.
    pub fn raw(&self) -> RawExpense {
        RawExpense {
            date: self.date.value().to_string(),
            category: self.category.value().to_string(),
            amount: self.amount.value().to_string(),
            description: self.description.value().to_string(),
        }
    }
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Form,
    ExportPrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A modal message. While one is shown, keys only dismiss it.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

pub struct App {
    conn: Connection,
    pub expenses: Vec<Expense>,
    pub table_state: TableState,
    pub mode: Mode,
    pub form: ExpenseForm,
    pub export_input: TextInput,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl App {
    pub fn new(conn: Connection) -> ExpenseResult<Self> {
        let mut app = Self {
            conn,
            expenses: Vec::new(),
            table_state: TableState::default(),
            mode: Mode::Browse,
            form: ExpenseForm::new(),
            export_input: TextInput::new("File", DEFAULT_EXPORT_PATH),
            notice: None,
            should_quit: false,
        };
        app.refresh()?;
        Ok(app)
    }

    /// Re-query storage and clamp the table selection.
    pub fn refresh(&mut self) -> ExpenseResult<()> {
        self.expenses = db::list_expenses(&self.conn)?;

        if self.expenses.is_empty() {
            self.table_state.select(None);
        } else {
            let i = self
                .table_state
                .selected()
                .unwrap_or(0)
                .min(self.expenses.len() - 1);
            self.table_state.select(Some(i));
        }

        Ok(())
    }

    pub fn selected_expense(&self) -> Option<&Expense> {
        self.table_state
            .selected()
            .and_then(|i| self.expenses.get(i))
    }

    pub fn next(&mut self) {
        let len = self.expenses.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.expenses.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn info(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Info,
            message: message.into(),
        });
    }

    fn report(&mut self, err: ExpenseError) {
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            message: err.to_string(),
        });
    }

    /// Run the add operation against the current form content.
    fn submit_form(&mut self) {
        match ops::add_expense(&self.conn, &self.form.raw()) {
            Ok(_) => {
                self.form.reset();
                self.mode = Mode::Browse;
                match self.refresh() {
                    Ok(()) => self.info("Expense added!"),
                    Err(err) => self.report(err),
                }
            }
            // Stay in the form so the input can be corrected
            Err(err) => self.report(err),
        }
    }

    fn delete_selected(&mut self) {
        let id = match self.selected_expense() {
            Some(expense) => expense.id,
            None => {
                self.report(ExpenseError::NoSelection);
                return;
            }
        };

        let result = ops::delete_expense(&self.conn, id).and_then(|()| self.refresh());
        match result {
            Ok(()) => self.info("Expense deleted."),
            Err(err) => self.report(err),
        }
    }

    fn run_export(&mut self) {
        let path = self.export_input.value().trim().to_string();
        self.mode = Mode::Browse;

        // Empty path means the prompt was abandoned: no-op, no error
        if path.is_empty() {
            return;
        }

        match export::export_to_path(&self.conn, Path::new(&path)) {
            Ok(count) => self.info(format!("Exported {count} expenses to {path}")),
            Err(err) => self.report(err),
        }
    }

    /// Dispatch one key press according to the current mode.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // A visible notice is modal
        if self.notice.is_some() {
            if matches!(
                key.code,
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')
            ) {
                self.notice = None;
            }
            return;
        }

        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Form => self.handle_form_key(key),
            Mode::ExportPrompt => self.handle_export_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('a') => self.mode = Mode::Form,
            KeyCode::Char('e') => {
                self.export_input.set(DEFAULT_EXPORT_PATH);
                self.mode = Mode::ExportPrompt;
            }
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => {
                if !self.expenses.is_empty() {
                    self.table_state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.expenses.is_empty() {
                    self.table_state.select(Some(self.expenses.len() - 1));
                }
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.form.reset();
                self.mode = Mode::Browse;
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.form.focused = self.form.focused.prev();
            }
            KeyCode::Tab | KeyCode::Down => self.form.focused = self.form.focused.next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focused = self.form.focused.prev(),
            KeyCode::Backspace => self.form.focused_input_mut().backspace(),
            KeyCode::Left => self.form.focused_input_mut().move_left(),
            KeyCode::Right => self.form.focused_input_mut().move_right(),
            KeyCode::Char(c) => self.form.focused_input_mut().insert(c),
            _ => {}
        }
    }

    fn handle_export_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Enter => self.run_export(),
            KeyCode::Backspace => self.export_input.backspace(),
            KeyCode::Left => self.export_input.move_left(),
            KeyCode::Right => self.export_input.move_right(),
            KeyCode::Char(c) => self.export_input.insert(c),
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key(key);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(7), // Input form
            Constraint::Min(0),    // Expenses table
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_form(f, chunks[1], app);
    render_table(f, chunks[2], app);
    render_status_bar(f, chunks[3], app);

    if app.mode == Mode::ExportPrompt {
        render_export_prompt(f, app);
    }
    if let Some(notice) = app.notice.clone() {
        render_notice(f, &notice);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let header_text = vec![Line::from(vec![
        Span::styled(
            "Expense Ledger",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("{} expenses recorded", app.expenses.len()),
            Style::default().fg(Color::White),
        ),
    ])];

    let header = Paragraph::new(header_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.mode == Mode::Form;
    let focused = app.form.focused;

    let lines = vec![
        app.form
            .date
            .render_line(editing && focused == FormField::Date),
        app.form
            .category
            .render_line(editing && focused == FormField::Category),
        app.form
            .amount
            .render_line(editing && focused == FormField::Amount),
        app.form
            .description
            .render_line(editing && focused == FormField::Description),
        Line::from(Span::styled(
            if editing {
                " Enter save · Tab next field · Esc cancel"
            } else {
                " Press 'a' to start a new entry"
            },
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Add New Expense "),
    );

    f.render_widget(form, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["ID", "Date", "Category", "Amount", "Description"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.expenses.iter().map(|expense| {
        let cells = vec![
            Cell::from(expense.id.to_string()),
            Cell::from(expense.date.clone()),
            Cell::from(expense.category.clone()),
            Cell::from(format!("{:.2}", expense.amount)).style(Style::default().fg(Color::Red)),
            Cell::from(expense.description.clone()),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(20),
            Constraint::Length(10),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" All Expenses "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = match app.mode {
        Mode::Browse => vec![
            Span::styled(" a", Style::default().fg(Color::Yellow)),
            Span::raw(" Add | "),
            Span::styled("e", Style::default().fg(Color::Yellow)),
            Span::raw(" Export CSV | "),
            Span::styled("d", Style::default().fg(Color::Yellow)),
            Span::raw(" Delete Selected | "),
            Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
            Span::raw(" Nav | "),
            Span::styled("q", Style::default().fg(Color::Red)),
            Span::raw(" Quit"),
        ],
        Mode::Form => vec![
            Span::styled(" Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Save | "),
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" Next field | "),
            Span::styled("Esc", Style::default().fg(Color::Red)),
            Span::raw(" Cancel"),
        ],
        Mode::ExportPrompt => vec![
            Span::styled(" Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Export | "),
            Span::styled("Esc", Style::default().fg(Color::Red)),
            Span::raw(" Cancel"),
        ],
    };

    if let Some(i) = app.table_state.selected() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("Row {}/{}", i + 1, app.expenses.len()),
            Style::default().fg(Color::Cyan),
        ));
    }

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_export_prompt(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 5, f.size());
    f.render_widget(Clear, area);

    let lines = vec![
        app.export_input.render_line(true),
        Line::from(Span::styled(
            " Enter to save, Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let prompt = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Export to CSV "),
    );

    f.render_widget(prompt, area);
}

fn render_notice(f: &mut Frame, notice: &Notice) {
    let (title, color) = match notice.kind {
        NoticeKind::Info => (" Success ", Color::Green),
        NoticeKind::Error => (" Error ", Color::Red),
    };

    let area = centered_rect(60, 5, f.size());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(format!(" {}", notice.message)),
        Line::from(Span::styled(
            " Press Enter to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title),
    );

    f.render_widget(popup, area);
}

/// A centered rect `percent_x` wide and `height` rows tall.
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = (u32::from(r.width) * u32::from(percent_x) / 100) as u16;
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(r.height),
    }
}
