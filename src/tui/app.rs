//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which drives a [`Session`] from
//! keyboard input and renders the sidebar menu, the header, the content of the
//! active view (task list, form or statistics) and the status bar.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::display::{format_created, status_mark, truncate};
use crate::error::Error;
use crate::session::{Session, Submitted};
use crate::storage::TaskSlot;
use crate::task::TaskId;
use crate::tui::{
    colors::{ACCENT, DARK_RED, DONE_GREEN, INK, PENDING_AMBER},
    enums::{AppState, FormField},
    input::InputField,
    task_form::TaskForm,
    utils::centered_rect,
};
use crate::validate::{DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use crate::view::{ActiveView, ListFilter, MenuItem, Screen, Stats};

const SIDEBAR_WIDTH: u16 = 28;

/// Main application state for the terminal user interface.
pub struct App<S: TaskSlot> {
    session: Session<S>,
    state: AppState,
    task_list_state: TableState,
    /// Ids of the rows in the current list view, in display order.
    visible_tasks: Vec<TaskId>,
    task_form: TaskForm,
    status_message: String,
    status_is_error: bool,
    confirm_target: Option<TaskId>,
}

impl<S: TaskSlot> App<S> {
    pub fn new(session: Session<S>) -> Self {
        let mut app = App {
            session,
            state: AppState::Browse,
            task_list_state: TableState::default(),
            visible_tasks: Vec::new(),
            task_form: TaskForm::new(),
            status_message: String::new(),
            status_is_error: false,
            confirm_target: None,
        };
        if let Some(e) = app.session.load_error() {
            let msg = format!("Saved tasks could not be read ({e}). Starting with an empty list.");
            app.set_error_message(msg);
        }
        app.refresh_visible();
        app
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Rebuild the visible rows, keeping the selection on the same task when possible.
    fn refresh_visible(&mut self) {
        let selected_id = self.selected_task_id();
        self.visible_tasks = match self.session.screen() {
            Screen::List { tasks, .. } => tasks.iter().map(|t| t.id).collect(),
            _ => Vec::new(),
        };
        let selection = if self.visible_tasks.is_empty() {
            None
        } else {
            selected_id
                .and_then(|id| self.visible_tasks.iter().position(|&v| v == id))
                .or_else(|| {
                    let previous = self.task_list_state.selected().unwrap_or(0);
                    Some(previous.min(self.visible_tasks.len() - 1))
                })
        };
        self.task_list_state.select(selection);
    }

    fn selected_task_id(&self) -> Option<TaskId> {
        self.task_list_state
            .selected()
            .and_then(|i| self.visible_tasks.get(i).copied())
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_is_error = false;
    }

    fn set_error_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_is_error = true;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
        self.status_is_error = false;
    }

    fn select_view(&mut self, item: MenuItem) {
        self.session.select_view(item);
        if item == MenuItem::Add {
            self.task_form = TaskForm::new();
        }
        self.refresh_visible();
    }

    fn move_selection(&mut self, down: bool) {
        if self.visible_tasks.is_empty() {
            return;
        }
        let last = self.visible_tasks.len() - 1;
        let next = match self.task_list_state.selected() {
            Some(i) if down => (i + 1).min(last),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.task_list_state.select(Some(next));
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        match self.session.toggle_completed(id) {
            Ok(_) => {
                let done = self.session.store().get(id).is_some_and(|t| t.completed);
                self.set_status_message(if done { "Task completed" } else { "Task reopened" });
            }
            Err(e) => self.set_error_message(format!("Error: {e}")),
        }
        self.refresh_visible();
    }

    fn edit_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        if self.session.begin_edit(id) {
            if let Some(task) = self.session.store().get(id) {
                self.task_form = TaskForm::from_task(task);
            }
        }
        self.refresh_visible();
    }

    fn request_delete(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.confirm_target = Some(id);
            self.state = AppState::Confirm;
        }
    }

    fn submit_form(&mut self) {
        match self.session.submit(self.task_form.to_input()) {
            Ok(Submitted::Added(_)) => {
                self.task_form = TaskForm::new();
                self.set_status_message("Task added");
            }
            Ok(Submitted::Updated(_)) => {
                self.task_form = TaskForm::new();
                self.set_status_message("Task updated");
            }
            Err(Error::Validation(e)) => self.set_error_message(format!("Cannot save: {e}")),
            Err(e) => {
                // The change is applied in memory; only the write failed.
                self.task_form = TaskForm::new();
                self.set_error_message(format!("Error: {e}"));
            }
        }
        self.refresh_visible();
    }

    /// Handle keyboard input while a list or the statistics view is showing.
    /// Returns true if the application should quit.
    fn handle_browse_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        let current = self.session.view().active().menu_item();
        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            KeyCode::Char(c @ '1'..='5') => {
                let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
                if let Some(&item) = MenuItem::ALL.get(index) {
                    self.select_view(item);
                }
            }
            KeyCode::Left => self.select_view(current.cycle(false)),
            KeyCode::Right => self.select_view(current.cycle(true)),
            KeyCode::Char('a') => self.select_view(MenuItem::Add),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(),
            KeyCode::Char('e') => self.edit_selected(),
            KeyCode::Char('d') => self.request_delete(),
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input in the add/edit form.
    fn handle_form_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Esc => {
                self.session.cancel_edit();
                self.task_form = TaskForm::new();
                self.refresh_visible();
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.task_form.next_field();
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Left => self.task_form.current_input_mut().move_cursor_left(),
            KeyCode::Right => self.task_form.current_input_mut().move_cursor_right(),
            KeyCode::Home => self.task_form.current_input_mut().move_home(),
            KeyCode::End => self.task_form.current_input_mut().move_end(),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.current_input_mut().handle_delete(),
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.task_form.handle_char(c);
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_confirm_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.confirm_target.take() {
                    match self.session.remove(id) {
                        Ok(_) => self.set_status_message("Task deleted"),
                        Err(e) => self.set_error_message(format!("Error deleting task: {e}")),
                    }
                }
                self.state = AppState::Browse;
                self.refresh_visible();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::Browse;
                self.confirm_target = None;
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_help_input(&mut self, _key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        self.state = AppState::Browse;
        Ok(false)
    }

    /// Dispatch one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> io::Result<bool> {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }
        self.clear_status_message();
        match self.state {
            AppState::Browse => match self.session.view().active() {
                ActiveView::Form { .. } => self.handle_form_input(key, modifiers),
                _ => self.handle_browse_input(key, modifiers),
            },
            AppState::Help => self.handle_help_input(key, modifiers),
            AppState::Confirm => self.handle_confirm_input(key, modifiers),
        }
    }

    /// Poll for and handle keyboard events.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return self.handle_key(key.code, key.modifiers);
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let active = self.session.view().active();
        let badge = active.badge(self.visible_tasks.len());
        let header = Line::from(vec![
            Span::styled("TASK MANAGER", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                active.subtitle(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
            Span::raw("  "),
            Span::styled(format!(" {badge} "), Style::default().bg(ACCENT).fg(Color::White)),
        ]);
        let block = Paragraph::new(header)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(block, area);
    }

    fn render_sidebar(&self, f: &mut Frame, area: Rect) {
        let current = self.session.view().active().menu_item();
        let mut lines = Vec::with_capacity(MenuItem::ALL.len() * 3);
        for (i, item) in MenuItem::ALL.iter().enumerate() {
            let title_style = if *item == current {
                Style::default().bg(ACCENT).fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(Span::styled(format!(" {} {} ", i + 1, item.title()), title_style)));
            lines.push(Line::from(Span::styled(
                format!("   {}", item.description()),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(""));
        }
        let menu = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Menu"));
        f.render_widget(menu, area);
    }

    /// Render the task table for a list view, or its empty state.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect, filter: ListFilter) {
        let title = format!(
            "{} ({}) - Press 'h' for help",
            MenuItem::from(filter).title(),
            self.visible_tasks.len()
        );
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.visible_tasks.is_empty() {
            let (heading, hint) = match filter {
                ListFilter::All => ("No tasks yet", "Press 'a' to add your first task."),
                ListFilter::Pending => ("Nothing pending", "Every task is done. Press 'a' to add another."),
                ListFilter::Completed => ("No completed tasks", "Press Space on a task to mark it done."),
            };
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(heading, Style::default().add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
            ];
            f.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center), area);
            return;
        }

        let header = Row::new(
            ["", "Title", "Description", "Created"]
                .iter()
                .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .style(Style::default().bg(ACCENT).fg(Color::White))
        .height(1);

        let rows: Vec<Row> = self
            .visible_tasks
            .iter()
            .filter_map(|&id| self.session.store().get(id))
            .map(|task| {
                let style = if task.completed {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(Color::White)
                };
                let mark_color = if task.completed { DONE_GREEN } else { PENDING_AMBER };
                Row::new(vec![
                    Cell::from(status_mark(task)).style(Style::default().fg(mark_color)),
                    Cell::from(task.title.as_str()),
                    Cell::from(truncate(&task.description, 60)),
                    Cell::from(format_created(task.created_at)),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Percentage(35),
            Constraint::Min(20),
            Constraint::Length(24),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.task_list_state);
    }

    fn render_task_form(&self, f: &mut Frame, area: Rect, is_edit: bool) {
        let outer = Block::default()
            .borders(Borders::ALL)
            .title(if is_edit { "Edit Task" } else { "New Task" });
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(6), // Description
                Constraint::Min(1),    // Instructions
            ])
            .split(inner);

        let field_style = |field: FormField| {
            if self.task_form.current_field == field {
                Style::default().fg(ACCENT)
            } else {
                Style::default()
            }
        };

        let title = &self.task_form.title;
        let title_input = Paragraph::new(title.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Title * ({}/{})", title.value.chars().count(), TITLE_MAX_CHARS))
                .border_style(field_style(FormField::Title)),
        );
        f.render_widget(title_input, chunks[0]);

        let description = &self.task_form.description;
        let desc_input = Paragraph::new(description.value.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(
                        "Description ({}/{})",
                        description.value.chars().count(),
                        DESCRIPTION_MAX_CHARS
                    ))
                    .border_style(field_style(FormField::Description)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(desc_input, chunks[1]);

        let submit = if is_edit { "Enter update" } else { "Enter add" };
        let instructions = Paragraph::new(format!("Tab switch field  {submit}  Esc cancel"))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(instructions, chunks[2]);

        let field_area = match self.task_form.current_field {
            FormField::Title => chunks[0],
            FormField::Description => chunks[1],
        };
        if let Some((x, y)) = cursor_position(self.task_form.current_input(), field_area) {
            f.set_cursor_position((x, y));
        }
    }

    fn render_stats(&self, f: &mut Frame, area: Rect) {
        let stats = Stats::from_tasks(self.session.tasks());
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let numbers = vec![
            Line::from(vec![
                Span::styled("Total tasks: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(stats.total.to_string()),
            ]),
            Line::from(vec![
                Span::styled("Completed:   ", Style::default().fg(DONE_GREEN).add_modifier(Modifier::BOLD)),
                Span::raw(stats.completed.to_string()),
            ]),
            Line::from(vec![
                Span::styled("Pending:     ", Style::default().fg(PENDING_AMBER).add_modifier(Modifier::BOLD)),
                Span::raw(stats.pending.to_string()),
            ]),
        ];
        let summary = Paragraph::new(numbers)
            .block(Block::default().borders(Borders::ALL).title("Statistics"));
        f.render_widget(summary, chunks[0]);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Completion"))
            .gauge_style(Style::default().fg(DONE_GREEN).bg(Color::Black))
            .percent(u16::from(stats.percent))
            .label(format!("{}%", stats.percent));
        f.render_widget(gauge, chunks[1]);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let section = |title: &'static str| {
            Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
        };
        let help_text = vec![
            section("Task Manager Help"),
            Line::from(""),
            section("Navigation:"),
            Line::from("  1-5          New Task, All, Pending, Completed, Statistics"),
            Line::from("  ←/→          Previous / next view"),
            Line::from("  a            Add new task"),
            Line::from("  h/F1         Show this help"),
            Line::from("  q/Ctrl+C     Quit"),
            Line::from(""),
            section("Task Lists:"),
            Line::from("  ↑/k, ↓/j     Move selection"),
            Line::from("  Space/x      Toggle completed"),
            Line::from("  e            Edit selected task"),
            Line::from("  d            Delete selected task"),
            Line::from(""),
            section("Form:"),
            Line::from("  Tab          Switch between title and description"),
            Line::from("  Enter        Save"),
            Line::from("  Esc          Cancel and return to the last list"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press any key to return"),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the delete confirmation over the current view.
    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED).fg(Color::White));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let task_title = self
            .confirm_target
            .and_then(|id| self.session.store().get(id))
            .map(|t| truncate(&t.title, 40))
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Are you sure you want to delete:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(task_title),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match (self.state, self.session.view().active()) {
                (AppState::Help, _) => "Help".to_string(),
                (AppState::Confirm, _) => "Confirm delete".to_string(),
                (AppState::Browse, ActiveView::Form { editing: Some(_) }) => "Edit Task".to_string(),
                (AppState::Browse, ActiveView::Form { editing: None }) => "Add New Task".to_string(),
                (AppState::Browse, ActiveView::Stats) => {
                    format!("Tasks: {} | Press 'h' for help", self.session.store().len())
                }
                (AppState::Browse, ActiveView::List(_)) => {
                    format!("Tasks: {} | Press 'h' for help", self.visible_tasks.len())
                }
            }
        };
        let style = if self.status_is_error {
            Style::default().bg(DARK_RED).fg(Color::White)
        } else if self.status_message.is_empty() {
            Style::default().bg(ACCENT).fg(Color::White)
        } else {
            Style::default().bg(PENDING_AMBER).fg(INK)
        };
        let status = Paragraph::new(status_text).style(style).alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render(&mut self, f: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(rows[1]);

        self.render_header(f, rows[0]);
        self.render_sidebar(f, body[0]);

        match self.state {
            AppState::Help => self.render_help(f, body[1]),
            AppState::Browse | AppState::Confirm => match self.session.view().active() {
                ActiveView::List(filter) => self.render_task_list(f, body[1], filter),
                ActiveView::Form { editing } => self.render_task_form(f, body[1], editing.is_some()),
                ActiveView::Stats => self.render_stats(f, body[1]),
            },
        }
        if self.state == AppState::Confirm {
            self.render_confirm(f, body[1]);
        }

        self.render_status_bar(f, rows[2]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Terminal cursor position for a field drawn with a one-cell border.
fn cursor_position(input: &InputField, area: Rect) -> Option<(u16, u16)> {
    let width = area.width.checked_sub(2).filter(|w| *w > 0)?;
    let height = area.height.checked_sub(2).filter(|h| *h > 0)?;
    let cursor = u16::try_from(input.cursor).ok()?;
    let row = (cursor / width).min(height - 1);
    let col = cursor % width;
    Some((area.x + 1 + col, area.y + 1 + row))
}
