// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use passbook_app::{
    CharClass, CredentialDraft, CredentialService, GenerationPolicy, ViewName, Workbench,
    Workspace,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::time::Duration;

const OWNERSHIP_MARK: &str = "read-only";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    SiteName,
    SiteUrl,
    Login,
    Org,
    Category,
    Password,
    Generator,
}

impl FormField {
    const ALL: [Self; 7] = [
        Self::SiteName,
        Self::SiteUrl,
        Self::Login,
        Self::Org,
        Self::Category,
        Self::Password,
        Self::Generator,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::SiteName => "Site name",
            Self::SiteUrl => "Site URL",
            Self::Login => "Login",
            Self::Org => "Organization",
            Self::Category => "Category",
            Self::Password => "Password",
            Self::Generator => "Generate",
        }
    }

    const fn is_text(self) -> bool {
        matches!(
            self,
            Self::SiteName | Self::SiteUrl | Self::Login | Self::Password
        )
    }
}

#[derive(Debug, Clone, Default)]
struct UiState {
    menu_cursor: usize,
    browse_cursor: usize,
    form_cursor: usize,
    search_input: Option<String>,
    status: Option<String>,
}

impl UiState {
    fn emit_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

pub fn run_app<S: CredentialService, W: Workbench>(
    workspace: &mut Workspace,
    service: &mut S,
    workbench: &mut W,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut ui = UiState::default();
    if let Err(error) = workspace.open(service) {
        ui.emit_status(format!("load failed: {error:#}"));
    }

    let mut result = Ok(());
    loop {
        if let Err(error) = terminal.draw(|frame| render(frame, workspace, &ui)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(workspace, service, workbench, &mut ui, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Apply one key event. Returns true when the application should quit.
fn handle_key_event<S: CredentialService, W: Workbench>(
    workspace: &mut Workspace,
    service: &mut S,
    workbench: &mut W,
    ui: &mut UiState,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if ui.search_input.is_some() {
        handle_search_key(workspace, service, ui, key);
        return false;
    }

    match workspace.registry.active() {
        Some(ViewName::Menu) => handle_menu_key(workspace, service, ui, key),
        Some(ViewName::Browse) => handle_browse_key(workspace, service, workbench, ui, key),
        Some(ViewName::Add) | Some(ViewName::Edit) => {
            handle_form_key(workspace, service, ui, key);
            false
        }
        None => key.code == KeyCode::Char('q') || key.code == KeyCode::Esc,
    }
}

fn handle_search_key<S: CredentialService>(
    workspace: &mut Workspace,
    service: &mut S,
    ui: &mut UiState,
    key: KeyEvent,
) {
    let Some(input) = ui.search_input.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => {
            ui.search_input = None;
        }
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Enter => {
            let term = input.trim().to_owned();
            ui.search_input = None;
            if term.is_empty() {
                return;
            }
            ui.status = None;
            ui.browse_cursor = 0;
            if let Err(error) = workspace.search(&term, service) {
                ui.emit_status(format!("search failed: {error:#}"));
            }
        }
        KeyCode::Char(ch) => {
            input.push(ch);
        }
        _ => {}
    }
}

fn handle_menu_key<S: CredentialService>(
    workspace: &mut Workspace,
    service: &mut S,
    ui: &mut UiState,
    key: KeyEvent,
) -> bool {
    let buttons = workspace.menu.buttons();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Up | KeyCode::Char('k') => {
            ui.menu_cursor = ui.menu_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            ui.menu_cursor = (ui.menu_cursor + 1).min(buttons.len().saturating_sub(1));
        }
        KeyCode::Enter => {
            let Some(button) = buttons.get(ui.menu_cursor).copied() else {
                return false;
            };
            ui.status = None;
            ui.browse_cursor = 0;
            ui.form_cursor = 0;
            if let Err(error) = workspace.select_button(button, service) {
                ui.emit_status(format!("load failed: {error:#}"));
            }
        }
        KeyCode::Char('/') => {
            ui.search_input = Some(String::new());
        }
        KeyCode::Tab | KeyCode::Char('b') => {
            ui.status = None;
            let _ = workspace.show_browse();
        }
        KeyCode::Char('r') => {
            ui.status = None;
            if let Err(error) = workspace.refresh(service) {
                ui.emit_status(format!("refresh failed: {error:#}"));
            }
            ui.menu_cursor = ui.menu_cursor.min(workspace.menu.buttons().len().saturating_sub(1));
        }
        _ => {}
    }
    false
}

fn handle_browse_key<S: CredentialService, W: Workbench>(
    workspace: &mut Workspace,
    service: &mut S,
    workbench: &mut W,
    ui: &mut UiState,
    key: KeyEvent,
) -> bool {
    let row_count = workspace.browse.credentials().len();
    let selected = workspace
        .browse
        .credentials()
        .get(ui.browse_cursor)
        .map(|credential| (credential.id, workspace.browse.actions_enabled(credential)));

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Up | KeyCode::Char('k') => {
            ui.browse_cursor = ui.browse_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            ui.browse_cursor = (ui.browse_cursor + 1).min(row_count.saturating_sub(1));
        }
        KeyCode::Esc | KeyCode::Char('m') => {
            ui.status = None;
            let _ = workspace.show_menu();
        }
        KeyCode::Char('/') => {
            ui.search_input = Some(String::new());
        }
        KeyCode::Char('a') => {
            ui.status = None;
            ui.form_cursor = 0;
            if let Err(error) = workspace.open_add(service) {
                ui.emit_status(format!("load failed: {error:#}"));
            }
        }
        KeyCode::Char('r') => {
            ui.status = None;
            if let Err(error) = workspace.refresh(service) {
                ui.emit_status(format!("refresh failed: {error:#}"));
            }
            ui.browse_cursor = ui
                .browse_cursor
                .min(workspace.browse.credentials().len().saturating_sub(1));
        }
        KeyCode::Enter | KeyCode::Char('o') => {
            if let Some((id, _)) = selected {
                report_action(ui, workspace.open_site(id, workbench), "opened site URL");
            }
        }
        KeyCode::Char('l') => {
            if let Some((id, _)) = selected {
                report_action(ui, workspace.copy_login(id, workbench), "login copied");
            }
        }
        KeyCode::Char('p') => {
            if let Some((id, _)) = selected {
                report_action(ui, workspace.copy_password(id, workbench), "password copied");
            }
        }
        KeyCode::Char('e') => {
            if let Some((id, enabled)) = selected {
                if !enabled {
                    ui.emit_status("cannot edit: not your credential");
                    return false;
                }
                ui.status = None;
                ui.form_cursor = 0;
                if let Err(error) = workspace.open_edit(id, service) {
                    ui.emit_status(format!("load failed: {error:#}"));
                }
            }
        }
        KeyCode::Char('d') => {
            if let Some((id, enabled)) = selected {
                if !enabled {
                    ui.emit_status("cannot delete: not your credential");
                    return false;
                }
                ui.status = None;
                if let Err(error) = workspace.delete_credential(id, service) {
                    ui.emit_status(format!("delete failed: {error:#}"));
                }
                ui.browse_cursor = ui
                    .browse_cursor
                    .min(workspace.browse.credentials().len().saturating_sub(1));
            }
        }
        _ => {}
    }
    false
}

fn handle_form_key<S: CredentialService>(
    workspace: &mut Workspace,
    service: &mut S,
    ui: &mut UiState,
    key: KeyEvent,
) {
    let field = FormField::ALL[ui.form_cursor.min(FormField::ALL.len() - 1)];

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('g') => {
                generate_into_form(workspace, ui);
            }
            KeyCode::Char('r') => {
                if let Some(form) = workspace.active_form_mut() {
                    form.clear();
                    ui.emit_status("form reset");
                }
            }
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => {
            ui.status = None;
            ui.form_cursor = 0;
            if let Err(error) = workspace.cancel_active_form() {
                ui.emit_status(format!("cancel failed: {error:#}"));
            }
        }
        KeyCode::Enter => {
            ui.status = None;
            match workspace.submit_active_form(service) {
                Ok(()) => {
                    ui.form_cursor = 0;
                    ui.browse_cursor = 0;
                    ui.emit_status("saved");
                }
                Err(error) => ui.emit_status(format!("submit failed: {error:#}")),
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            ui.form_cursor = (ui.form_cursor + 1) % FormField::ALL.len();
        }
        KeyCode::BackTab | KeyCode::Up => {
            ui.form_cursor = (ui.form_cursor + FormField::ALL.len() - 1) % FormField::ALL.len();
        }
        KeyCode::Left | KeyCode::Right => {
            let delta = if key.code == KeyCode::Left { -1 } else { 1 };
            match field {
                FormField::Org => cycle_org(workspace, delta),
                FormField::Category => cycle_category(workspace, delta),
                FormField::Generator => {
                    if let Some(form) = workspace.active_form_mut() {
                        form.policy_mut().change_length(delta as i64);
                    }
                }
                _ => {}
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = workspace.active_form_mut()
                && let Some(value) = text_field_mut(form.draft_mut(), field)
            {
                value.pop();
            }
        }
        KeyCode::Char(ch) => {
            if field.is_text() {
                if let Some(form) = workspace.active_form_mut()
                    && let Some(value) = text_field_mut(form.draft_mut(), field)
                {
                    value.push(ch);
                }
            } else if field == FormField::Generator {
                match ch {
                    'g' => generate_into_form(workspace, ui),
                    _ => {
                        if let Some(class) = class_for_caption(ch)
                            && let Some(form) = workspace.active_form_mut()
                        {
                            let enabled = form.policy_mut().toggle(class);
                            let state = if enabled { "on" } else { "off" };
                            ui.emit_status(format!("{} {state}", class.label()));
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn generate_into_form(workspace: &mut Workspace, ui: &mut UiState) {
    if let Some(form) = workspace.active_form_mut() {
        match form.generate_password() {
            Ok(()) => ui.emit_status("password generated"),
            Err(error) => ui.emit_status(format!("generate failed: {error}")),
        }
    }
}

fn report_action(ui: &mut UiState, result: Result<()>, success: &str) {
    match result {
        Ok(()) => ui.emit_status(success),
        Err(error) => ui.emit_status(format!("action failed: {error:#}")),
    }
}

fn text_field_mut(draft: &mut CredentialDraft, field: FormField) -> Option<&mut String> {
    match field {
        FormField::SiteName => Some(&mut draft.site_name),
        FormField::SiteUrl => Some(&mut draft.site_url),
        FormField::Login => Some(&mut draft.site_login),
        FormField::Password => Some(&mut draft.site_pwd),
        _ => None,
    }
}

fn class_for_caption(ch: char) -> Option<CharClass> {
    match ch {
        'a' => Some(CharClass::Lower),
        'A' => Some(CharClass::Upper),
        '1' => Some(CharClass::Digits),
        '#' => Some(CharClass::Symbols),
        '?' => Some(CharClass::Punctuation),
        '(' | ')' => Some(CharClass::Brackets),
        _ => None,
    }
}

fn cycle_org(workspace: &mut Workspace, delta: isize) {
    let Some(form) = workspace.active_form_mut() else {
        return;
    };
    let ids: Vec<_> = form.orgs().iter().map(|org| org.id).collect();
    if ids.is_empty() {
        return;
    }
    let current = form
        .draft()
        .org_id
        .and_then(|id| ids.iter().position(|candidate| *candidate == id))
        .unwrap_or(0);
    let next = (current as isize + delta).rem_euclid(ids.len() as isize) as usize;
    form.draft_mut().org_id = Some(ids[next]);
}

fn cycle_category(workspace: &mut Workspace, delta: isize) {
    let Some(form) = workspace.active_form_mut() else {
        return;
    };
    let ids: Vec<_> = form.categories().iter().map(|category| category.id).collect();
    if ids.is_empty() {
        return;
    }
    let current = form
        .draft()
        .category_id
        .and_then(|id| ids.iter().position(|candidate| *candidate == id))
        .unwrap_or(0);
    let next = (current as isize + delta).rem_euclid(ids.len() as isize) as usize;
    form.draft_mut().category_id = Some(ids[next]);
}

fn render(frame: &mut ratatui::Frame<'_>, workspace: &Workspace, ui: &UiState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = workspace
        .registry
        .active()
        .and_then(|active| ViewName::ALL.iter().position(|name| *name == active))
        .unwrap_or(0);
    let titles: Vec<String> = ViewName::ALL
        .iter()
        .map(|name| name.as_str().to_owned())
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("passbook").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match workspace.registry.active() {
        Some(ViewName::Browse) => render_browse_table(frame, layout[1], workspace, ui),
        Some(ViewName::Add) | Some(ViewName::Edit) => {
            let title = if workspace.registry.active() == Some(ViewName::Add) {
                "add credential"
            } else {
                "edit credential"
            };
            let body = Paragraph::new(render_form_text(workspace, ui))
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(body, layout[1]);
        }
        _ => {
            let body = Paragraph::new(render_menu_text(workspace, ui))
                .block(Block::default().borders(Borders::ALL).title("filters"));
            frame.render_widget(body, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(workspace, ui))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(input) = &ui.search_input {
        let area = centered_rect(60, 20, frame.area());
        frame.render_widget(Clear, area);
        let search = Paragraph::new(format!("search: {input}_"))
            .block(Block::default().title("search").borders(Borders::ALL));
        frame.render_widget(search, area);
    }
}

fn render_browse_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    workspace: &Workspace,
    ui: &UiState,
) {
    let header = Row::new(vec!["site", "login", "url", "access"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = workspace
        .browse
        .credentials()
        .iter()
        .enumerate()
        .map(|(index, credential)| {
            let access = if workspace.browse.actions_enabled(credential) {
                ""
            } else {
                OWNERSHIP_MARK
            };
            let row = Row::new(vec![
                Cell::from(credential.site_name.clone()),
                Cell::from(credential.site_login.clone()),
                Cell::from(credential.site_url.clone()),
                Cell::from(access),
            ]);
            if index == ui.browse_cursor {
                row.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(40),
            Constraint::Percentage(15),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(browse_title(workspace)),
    );
    frame.render_widget(table, area);
}

fn browse_title(workspace: &Workspace) -> String {
    let query = workspace.browse.query().to_query_string();
    if query.is_empty() {
        "credentials".to_owned()
    } else {
        format!("credentials {query}")
    }
}

fn render_menu_text(workspace: &Workspace, ui: &UiState) -> String {
    let buttons = workspace.menu.buttons();
    let mut lines = Vec::with_capacity(buttons.len());
    for (index, button) in buttons.iter().enumerate() {
        let cursor = if index == ui.menu_cursor { ">" } else { " " };
        let active = if *button == workspace.menu.active() {
            " *"
        } else {
            ""
        };
        lines.push(format!(
            "{cursor} {}{active}",
            workspace.menu.label_for(*button)
        ));
    }
    lines.join("\n")
}

fn render_form_text(workspace: &Workspace, ui: &UiState) -> String {
    let Some(form) = workspace.active_form() else {
        return String::new();
    };
    let draft = form.draft();

    FormField::ALL
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let cursor = if index == ui.form_cursor { ">" } else { " " };
            let value = match field {
                FormField::SiteName => draft.site_name.clone(),
                FormField::SiteUrl => draft.site_url.clone(),
                FormField::Login => draft.site_login.clone(),
                FormField::Password => draft.site_pwd.clone(),
                FormField::Org => selected_name(
                    form.orgs().iter().map(|org| (org.id.get(), org.name.as_str())),
                    draft.org_id.map(passbook_app::OrgId::get),
                ),
                FormField::Category => selected_name(
                    form.categories()
                        .iter()
                        .map(|category| (category.id.get(), category.name.as_str())),
                    draft.category_id.map(passbook_app::CategoryId::get),
                ),
                FormField::Generator => generator_line(form.policy()),
            };
            format!("{cursor} {:<13} {value}", format!("{}:", field.label()))
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn selected_name<'a>(
    mut options: impl Iterator<Item = (i64, &'a str)>,
    selected: Option<i64>,
) -> String {
    match selected {
        Some(id) => options
            .find(|(candidate, _)| *candidate == id)
            .map_or_else(|| format!("#{id}"), |(_, name)| format!("{name} <>")),
        None => "(none)".to_owned(),
    }
}

fn generator_line(policy: &GenerationPolicy) -> String {
    let toggles: Vec<String> = CharClass::ALL
        .iter()
        .map(|class| {
            if policy.is_enabled(*class) {
                format!("[{}]", class.caption())
            } else {
                format!(" {} ", class.caption())
            }
        })
        .collect();
    let floor = if policy.decrease_disabled() {
        " (at minimum)"
    } else {
        ""
    };
    format!("{}  length {}{floor}", toggles.join(" "), policy.length())
}

fn status_text(workspace: &Workspace, ui: &UiState) -> String {
    if let Some(status) = &ui.status {
        return status.clone();
    }
    hint_text(workspace.registry.active(), workspace)
}

fn hint_text(active: Option<ViewName>, workspace: &Workspace) -> String {
    match active {
        Some(ViewName::Menu) => {
            "enter select | / search | b browse | r refresh | q quit".to_owned()
        }
        Some(ViewName::Browse) => {
            let mut hint =
                "o open | l copy login | p copy password | e edit | d delete | a add | m menu | / search"
                    .to_owned();
            if workspace.browse.query().is_search() {
                hint.push_str(" | searching");
            }
            hint
        }
        Some(ViewName::Add) | Some(ViewName::Edit) => {
            "enter submit | esc cancel | ctrl-g generate | ctrl-r reset | tab next field".to_owned()
        }
        None => "loading".to_owned(),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
