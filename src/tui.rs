use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::api::{ApiClient, ApiError};
use crate::models::{AccountStatus, CandidateUser, WorkflowAction, demo_candidate_users};

struct AppState {
    records: Vec<CandidateUser>,
    selected: usize,
    scroll_offset: u16,
    /// Inline error/info slot; failures land here, never crash the view.
    status_line: Option<String>,
}

impl AppState {
    fn new(records: Vec<CandidateUser>) -> Self {
        Self {
            records,
            selected: 0,
            scroll_offset: 0,
            status_line: None,
        }
    }

    fn current(&self) -> Option<&CandidateUser> {
        self.records.get(self.selected)
    }

    fn next(&mut self) {
        if !self.records.is_empty() && self.selected < self.records.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn replace_records(&mut self, records: Vec<CandidateUser>) {
        self.records = records;
        if self.selected >= self.records.len() {
            self.selected = self.records.len().saturating_sub(1);
        }
    }
}

pub fn run_browse(api: &ApiClient) -> Result<()> {
    let mut state = match api.list_candidate_users(None, None) {
        Ok(records) => AppState::new(records),
        Err(ApiError::Unreachable(_)) => {
            let mut state = AppState::new(demo_candidate_users());
            state.status_line = Some("Server unreachable, showing offline demo data".to_string());
            state
        }
        Err(e) => return Err(e.into()),
    };

    if state.records.is_empty() {
        println!("No candidate records found.");
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, api);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    api: &ApiClient,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('r') => refresh(state, api),
                KeyCode::Char('a') => fire_action(state, api, WorkflowAction::Approve),
                KeyCode::Char('x') => fire_action(state, api, WorkflowAction::Reject),
                KeyCode::Char('s') => {
                    // Suspend or unsuspend depending on where the record is
                    let action = match state.current().map(|c| c.status) {
                        Some(AccountStatus::Suspended) => WorkflowAction::Unsuspend,
                        _ => WorkflowAction::Suspend,
                    };
                    fire_action(state, api, action);
                }
                _ => {}
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn refresh(state: &mut AppState, api: &ApiClient) {
    match api.list_candidate_users(None, None) {
        Ok(records) => {
            state.replace_records(records);
            state.status_line = None;
        }
        Err(e) => state.status_line = Some(e.to_string()),
    }
}

/// One transition call, then a full re-fetch; the list is left untouched
/// when the call fails.
fn fire_action(state: &mut AppState, api: &ApiClient, action: WorkflowAction) {
    let Some((id, name, status)) = state
        .current()
        .map(|r| (r.id.clone(), r.full_name.clone(), r.status))
    else {
        return;
    };
    if !status.can_transition(action) {
        state.status_line = Some(format!("Cannot {} a {} record", action.segment(), status));
        return;
    }
    match api.candidate_user_action(&id, action) {
        Ok(()) => {
            refresh(state, api);
            state.status_line = Some(format!("{}: {}", action.segment(), name));
        }
        Err(e) => state.status_line = Some(format!("Failed to {}: {}", action.segment(), e)),
    }
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(frame.area());

    // Left panel: candidate list
    let items: Vec<ListItem> = state
        .records
        .iter()
        .map(|record| {
            let status_icon = match record.status {
                AccountStatus::Pending => "?",
                AccountStatus::Approved => "+",
                AccountStatus::Rejected => "x",
                AccountStatus::Suspended => "-",
            };
            let name = if record.full_name.len() > 30 {
                format!("{}...", &record.full_name[..27])
            } else {
                record.full_name.clone()
            };
            ListItem::new(format!("{} {} | {}", status_icon, name, record.email))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Candidates ({}) ", state.records.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: profile and timeline
    let detail = build_detail(state);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer: status slot when set, key help otherwise
    let footer_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let footer = match &state.status_line {
        Some(message) => {
            Paragraph::new(format!(" {}", message)).style(Style::default().fg(Color::Yellow))
        }
        None => Paragraph::new(
            " j/k:navigate  J/K:scroll  a:approve x:reject s:suspend/unsuspend  r:refresh  q:quit",
        )
        .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, footer_area[1]);
}

fn status_style(status: AccountStatus) -> Style {
    match status {
        AccountStatus::Pending => Style::default().fg(Color::Yellow),
        AccountStatus::Approved => Style::default().fg(Color::Green),
        AccountStatus::Rejected => Style::default().fg(Color::Red),
        AccountStatus::Suspended => Style::default().fg(Color::DarkGray),
    }
}

fn build_detail<'a>(state: &'a AppState) -> Text<'a> {
    let Some(record) = state.current() else {
        return Text::raw("No candidate selected");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        &record.full_name,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", record.status),
        status_style(record.status),
    )));
    lines.push(Line::from(format!("Email: {}", record.email)));
    if let Some(phone) = &record.phone {
        lines.push(Line::from(format!("Phone: {}", phone)));
    }
    if let Some(uan) = &record.uan {
        lines.push(Line::from(format!("UAN: {}", uan)));
    }
    if let Some(pan) = &record.pan {
        lines.push(Line::from(format!("PAN: {}", pan)));
    }
    if let Some(qualification) = &record.qualification {
        lines.push(Line::from(format!("Qualification: {}", qualification)));
    }
    if !record.skills.is_empty() {
        lines.push(Line::from(format!("Skills: {}", record.skills.join(", "))));
    }
    if let Some(ctc) = &record.current_ctc {
        lines.push(Line::from(format!("Current CTC: {}", ctc)));
    }
    if let Some(notice) = &record.notice_period {
        lines.push(Line::from(format!("Notice period: {}", notice)));
    }

    lines.push(Line::from(""));

    if record.update_history.is_empty() {
        lines.push(Line::from(Span::styled(
            "(No status updates yet)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("UPDATE HISTORY ({})", record.update_history.len()),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));

        for entry in &record.update_history {
            let company = entry
                .company_name
                .as_deref()
                .map(|c| format!(" ({})", c))
                .unwrap_or_default();
            lines.push(Line::from(Span::styled(
                format!(
                    "  #{} {} [{}] {}{}",
                    entry.points, entry.date, entry.updated_by_role, entry.updated_by_name, company
                ),
                Style::default().fg(Color::Cyan),
            )));
            for line in textwrap::fill(&entry.notes, 70).lines() {
                lines.push(Line::from(format!("    {}", line)));
            }
            for comment in &entry.comments {
                lines.push(Line::from(Span::styled(
                    format!("      > {}", comment.text),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::from(""));
        }
    }

    Text::from(lines)
}
