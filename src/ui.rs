use crate::app::{
    AddField, AddForm, AddMode, App, AuthField, AuthMode, AuthVariant, Overlay, PendingDelete,
    ProfileForm, ProjectsPane, View, PIN_LEN,
};
use crate::calendar::{month_cells, month_label};
use crate::models::{display_color, Task, TaskKind, PALETTE};
use crate::store::{Filter, ListRow};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Terminal,
};
use std::io;
use std::time::Duration;

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Length((r.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn key_span(key: &str) -> Span<'static> {
    Span::styled(format!(" {} ", key), Style::default().fg(Color::Red))
}

fn get_legend(app: &App) -> Text<'static> {
    if !app.store.signed_in() {
        return Text::from(Line::from(vec![
            key_span("Tab"),
            Span::raw(": Field "),
            key_span("Ctrl+t"),
            Span::raw(": Sign in/Register "),
            key_span("Ctrl+p"),
            Span::raw(": Email/PIN "),
            key_span("Enter"),
            Span::raw(": Submit "),
            key_span("Esc"),
            Span::raw(": Quit "),
        ]));
    }
    match &app.overlay {
        Overlay::None => {
            let mut spans = vec![
                key_span("q"),
                Span::raw(": Quit "),
                key_span("1/2/3"),
                Span::raw(": View "),
                key_span("/"),
                Span::raw(": Search "),
                key_span("a"),
                Span::raw(": Add "),
                key_span("e"),
                Span::raw(": Profile "),
                key_span("r"),
                Span::raw(": Reload "),
                key_span("o"),
                Span::raw(": Sign out "),
            ];
            match app.view {
                View::List => spans.extend([
                    key_span("Space"),
                    Span::raw(": Toggle/Advance "),
                    key_span("+/-"),
                    Span::raw(": Progress "),
                    key_span("d"),
                    Span::raw(": Delete "),
                ]),
                View::Calendar => spans.extend([
                    key_span("n/p"),
                    Span::raw(": Month "),
                ]),
                View::Projects => spans.extend([
                    key_span("Enter"),
                    Span::raw(": Filter "),
                    key_span("f/t"),
                    Span::raw(": New folder/tag "),
                    key_span("d"),
                    Span::raw(": Delete "),
                ]),
            }
            Text::from(Line::from(spans))
        }
        Overlay::ConfirmDelete(_) => Text::from(Line::from(vec![
            key_span("y"),
            Span::raw(": Delete "),
            key_span("n"),
            Span::raw(": Keep "),
        ])),
        Overlay::Add(_) => Text::from(Line::from(vec![
            key_span("Tab"),
            Span::raw(": Task/Deadline "),
            key_span("Shift+Tab"),
            Span::raw(": Field "),
            key_span("Up/Down"),
            Span::raw(": Parent "),
            key_span("Enter"),
            Span::raw(": Save "),
            key_span("Esc"),
            Span::raw(": Cancel "),
        ])),
        _ => Text::from(Line::from(vec![
            key_span("Enter"),
            Span::raw(": Save "),
            key_span("Esc"),
            Span::raw(": Cancel "),
        ])),
    }
}

pub fn draw(f: &mut ratatui::Frame, app: &mut App) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(size);
    let body_chunk = chunks[0];
    let footer_chunk = chunks[1];

    if !app.store.signed_in() {
        draw_auth(f, app, body_chunk);
    } else {
        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)].as_ref())
            .split(body_chunk);
        draw_header(f, app, main[0]);
        match app.view {
            View::List => draw_list(f, app, main[1]),
            View::Calendar => draw_calendar(f, app, main[1]),
            View::Projects => draw_projects(f, app, main[1]),
        }
        match app.overlay.clone() {
            Overlay::None => {}
            Overlay::Add(form) => draw_add_popup(f, app, &form, size),
            Overlay::ConfirmDelete(pending) => draw_confirm_popup(f, &pending, size),
            Overlay::Profile(form) => draw_profile_popup(f, &form, size),
            Overlay::NewFolder(name) => draw_bucket_popup(f, "New Folder", &name, size),
            Overlay::NewTag(name) => draw_bucket_popup(f, "New Tag", &name, size),
        }
    }

    let mut footer_lines = vec![Line::from("")];
    if let Some(status) = &app.status {
        footer_lines[0] = Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }
    let legend = Paragraph::new(get_legend(app))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    let footer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)].as_ref())
        .split(footer_chunk);
    f.render_widget(Paragraph::new(footer_lines), footer[0]);
    f.render_widget(legend, footer[1]);
}

fn draw_header(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let profile = &app.store.snapshot.profile;
    let name = if profile.display_name.is_empty() {
        "Deadlines".to_string()
    } else {
        profile.display_name.clone()
    };
    let filter_label = match &app.filter {
        Filter::All => String::new(),
        Filter::Folder(id) => app
            .store
            .snapshot
            .folder(id)
            .map(|fo| format!("  #{}", fo.name))
            .unwrap_or_default(),
        Filter::Tag(id) => app
            .store
            .snapshot
            .tag(id)
            .map(|t| format!("  @{}", t.name))
            .unwrap_or_default(),
    };
    let search_label = if app.searching {
        format!("  /{}_", app.search)
    } else if !app.search.is_empty() {
        format!("  /{}", app.search)
    } else {
        String::new()
    };
    let tabs = |view: View, label: &str| -> Span<'static> {
        if app.view == view {
            Span::styled(
                format!(" {} ", label),
                Style::default().fg(Color::Black).bg(Color::White),
            )
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::DarkGray))
        }
    };
    let line = Line::from(vec![
        Span::styled(
            name,
            Style::default()
                .fg(display_color(&profile.display_color))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {}", app.today().format("%Y-%m-%d"))),
        Span::styled(filter_label, Style::default().fg(Color::Cyan)),
        Span::styled(search_label, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        tabs(View::List, "1 List"),
        tabs(View::Calendar, "2 Calendar"),
        tabs(View::Projects, "3 Projects"),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn task_line(app: &App, task: &Task) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();

    // Active swipe shifts the row and tints it toward the pending action.
    let swiping = app.swipe_task.as_deref() == Some(task.id.as_str());
    let delta = if swiping { app.swipe.delta() } else { 0 };
    if delta > 0 {
        spans.push(Span::raw(" ".repeat(delta as usize)));
    }
    let swipe_style = if !swiping || delta == 0 {
        Style::default()
    } else if delta > 0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };

    match task.kind {
        TaskKind::Classic => {
            let check = if task.done { "[x] " } else { "[ ] " };
            spans.push(Span::styled(check.to_string(), swipe_style));
            let title_style = if task.done {
                swipe_style
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                swipe_style
            };
            spans.push(Span::styled(task.title.clone(), title_style));
        }
        TaskKind::Gradual => {
            let width = 10usize;
            let filled = (task.progress_ratio() * width as f64).round() as usize;
            let bar = format!(
                "[{}{}] {}/{} ",
                "#".repeat(filled.min(width)),
                "-".repeat(width - filled.min(width)),
                task.current,
                task.target
            );
            spans.push(Span::styled(bar, swipe_style.fg(Color::Cyan)));
            spans.push(Span::styled(task.title.clone(), swipe_style));
        }
    }

    if let Some(folder) = task
        .folder_id
        .as_deref()
        .and_then(|id| app.store.snapshot.folder(id))
    {
        spans.push(Span::styled(
            format!(" #{}", folder.name),
            Style::default().fg(display_color(&folder.color)),
        ));
    }
    if let Some(tag) = task
        .tag_id
        .as_deref()
        .and_then(|id| app.store.snapshot.tag(id))
    {
        spans.push(Span::styled(
            format!(" @{}", tag.name),
            Style::default().fg(display_color(&tag.color)),
        ));
    }
    if let Some(minutes) = task.duration_minutes {
        spans.push(Span::styled(
            format!(" ~{}m", minutes),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn draw_list(f: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Deadlines");
    let inner = block.inner(area);
    app.list_area = inner;

    let today = app.today();
    let items: Vec<ListItem> = if app.rows.is_empty() {
        vec![ListItem::new("Nothing here yet. Press 'a' to add something.")]
    } else {
        app.rows
            .iter()
            .map(|row| match row {
                ListRow::DeadlineHeader(id) => match app.store.snapshot.deadline(id) {
                    Some(dl) => {
                        let days = dl.days_left(today);
                        let days_style = if days < 0 {
                            Style::default().fg(Color::Red)
                        } else {
                            Style::default().fg(Color::DarkGray)
                        };
                        ListItem::new(Line::from(vec![
                            Span::styled(
                                dl.title.clone(),
                                Style::default()
                                    .fg(display_color(&dl.color))
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(format!("  {}d", days), days_style),
                        ]))
                    }
                    None => ListItem::new(""),
                },
                ListRow::Task(id) => match app.store.snapshot.task(id) {
                    Some(task) => ListItem::new(task_line(app, task)),
                    None => ListItem::new(""),
                },
                ListRow::OrphanHeader => ListItem::new(Line::from(Span::styled(
                    "OTHER TASKS",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                ))),
            })
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_calendar(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(month_label(app.month));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cells = month_cells(app.month);
    let weeks = cells.len().div_ceil(7);
    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(std::iter::repeat(Constraint::Min(3)).take(weeks));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let day_names = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7].as_ref())
        .split(rows[0]);
    for (i, name) in ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"].iter().enumerate() {
        f.render_widget(
            Paragraph::new(Span::styled(*name, Style::default().fg(Color::DarkGray))),
            day_names[i],
        );
    }

    let today = app.today();
    for week in 0..weeks {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7].as_ref())
            .split(rows[week + 1]);
        for day in 0..7 {
            let index = week * 7 + day;
            let date = match cells.get(index) {
                Some(Some(date)) => *date,
                _ => continue,
            };
            let mut lines = Vec::new();
            let day_style = if date == today {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            lines.push(Line::from(Span::styled(format!("{:2}", date.format("%-d")), day_style)));
            let (deadlines, tasks) = app.store.snapshot.on_date(date);
            for dl in deadlines {
                lines.push(Line::from(Span::styled(
                    dl.title.clone(),
                    Style::default().fg(display_color(&dl.color)),
                )));
            }
            for task in tasks {
                lines.push(Line::from(Span::styled(
                    task.title.clone(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), cols[day]);
        }
    }
}

fn draw_projects(f: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let active_border = Style::default().fg(Color::Green);
    let idle_border = Style::default();

    let folder_items: Vec<ListItem> = if app.store.snapshot.folders.is_empty() {
        vec![ListItem::new("No folders. Press 'f' to create one.")]
    } else {
        app.store
            .snapshot
            .folders
            .iter()
            .map(|folder| {
                let count = app
                    .store
                    .snapshot
                    .tasks
                    .iter()
                    .filter(|t| t.folder_id.as_deref() == Some(folder.id.as_str()))
                    .count();
                ListItem::new(Line::from(vec![
                    Span::styled("■ ", Style::default().fg(display_color(&folder.color))),
                    Span::raw(folder.name.clone()),
                    Span::styled(
                        format!("  {} tasks", count),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect()
    };
    let tag_items: Vec<ListItem> = if app.store.snapshot.tags.is_empty() {
        vec![ListItem::new("No tags. Press 't' to create one.")]
    } else {
        app.store
            .snapshot
            .tags
            .iter()
            .map(|tag| {
                ListItem::new(Line::from(Span::styled(
                    format!(" @{} ", tag.name),
                    Style::default()
                        .fg(Color::Black)
                        .bg(display_color(&tag.color)),
                )))
            })
            .collect()
    };

    let folders = List::new(folder_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Folders")
                .border_style(if app.projects_pane == ProjectsPane::Folders {
                    active_border
                } else {
                    idle_border
                }),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");
    let tags = List::new(tag_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Tags")
                .border_style(if app.projects_pane == ProjectsPane::Tags {
                    active_border
                } else {
                    idle_border
                }),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    match app.projects_pane {
        ProjectsPane::Folders => {
            f.render_stateful_widget(folders, panes[0], &mut app.projects_state);
            f.render_widget(tags, panes[1]);
        }
        ProjectsPane::Tags => {
            f.render_widget(folders, panes[0]);
            f.render_stateful_widget(tags, panes[1], &mut app.projects_state);
        }
    }
}

fn draw_auth(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let title = match (app.auth.mode, app.auth.variant) {
        (AuthMode::SignIn, AuthVariant::Email) => "Sign in",
        (AuthMode::Register, AuthVariant::Email) => "Create an account",
        (AuthMode::SignIn, AuthVariant::Pin) => "Sign in with PIN",
        (AuthMode::Register, AuthVariant::Pin) => "Register with PIN",
    };
    let popup = centered_rect_absolute(46, 9, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));

    let field_style = |field: AuthField| {
        if app.auth.field == field {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let mut lines = Vec::new();
    let identity_label = match app.auth.variant {
        AuthVariant::Email => "Email:  ",
        AuthVariant::Pin => "Pseudo: ",
    };
    lines.push(Line::from(vec![
        Span::styled(identity_label, field_style(AuthField::Identity)),
        Span::raw(app.auth.identity.clone()),
    ]));
    match app.auth.variant {
        AuthVariant::Email => {
            lines.push(Line::from(vec![
                Span::styled("Password: ", field_style(AuthField::Secret)),
                Span::raw("•".repeat(app.auth.secret.chars().count())),
            ]));
        }
        AuthVariant::Pin => {
            // One dot per accumulated digit, hollow for the rest.
            let mut dots = Vec::new();
            dots.push(Span::styled("PIN:    ", field_style(AuthField::Secret)));
            for i in 0..PIN_LEN {
                let dot = if i < app.auth.pin.len() { "● " } else { "○ " };
                let style = if i < app.auth.pin.len() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                dots.push(Span::styled(dot, style));
            }
            lines.push(Line::from(dots));
        }
    }
    lines.push(Line::from(""));
    if let Some(error) = &app.auth.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        let hint = match app.auth.mode {
            AuthMode::SignIn => "Ctrl+t to create an account instead",
            AuthMode::Register => "Ctrl+t to sign in instead",
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn draw_add_popup(f: &mut ratatui::Frame, app: &App, form: &AddForm, area: Rect) {
    let popup = centered_rect_absolute(56, 10, area);
    let tab = |mode: AddMode, label: &str| -> Span<'static> {
        if form.mode == mode {
            Span::styled(
                format!(" {} ", label),
                Style::default().fg(Color::Black).bg(Color::White),
            )
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::DarkGray))
        }
    };
    let field_style = |field: AddField| {
        if form.field == field {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let mut lines = vec![
        Line::from(vec![tab(AddMode::Task, "Task"), tab(AddMode::Deadline, "Deadline")]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Title: ", field_style(AddField::Title)),
            Span::raw(form.title.clone()),
        ]),
    ];
    match form.mode {
        AddMode::Task => {
            lines.push(Line::from(vec![
                Span::styled("Notes: ", field_style(AddField::Description)),
                Span::raw(form.description.clone()),
            ]));
            let parent = form
                .deadline_index
                .checked_sub(1)
                .and_then(|i| app.store.snapshot.deadlines.get(i))
                .map(|dl| dl.title.clone())
                .unwrap_or_else(|| "None (other task)".to_string());
            lines.push(Line::from(vec![
                Span::styled("Parent: ", Style::default().fg(Color::DarkGray)),
                Span::raw(parent),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Tokens: *10 target  #folder  @tag  ^2025-06-01  ~45",
                Style::default().fg(Color::DarkGray),
            )));
        }
        AddMode::Deadline => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Tokens: ^2025-06-01 (required)  %red",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let block = Block::default()
        .title("Add")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));
    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn draw_confirm_popup(f: &mut ratatui::Frame, pending: &PendingDelete, area: Rect) {
    let popup = centered_rect_absolute(44, 5, area);
    let block = Block::default()
        .title("Delete?")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Red));
    let text = vec![
        Line::from(format!("Delete \"{}\"?", pending.label)),
        Line::from(Span::styled(
            "y to confirm, n to keep",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn draw_profile_popup(f: &mut ratatui::Frame, form: &ProfileForm, area: Rect) {
    let popup = centered_rect_absolute(44, 6, area);
    let block = Block::default()
        .title("Profile")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));
    let mut swatches: Vec<Span<'static>> = vec![Span::raw("Color: ")];
    for (i, name) in PALETTE.iter().enumerate() {
        let style = if form.custom.is_none() && i == form.color_index {
            Style::default()
                .fg(display_color(name))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(display_color(name))
        };
        swatches.push(Span::styled(format!("■ {} ", name), style));
    }
    if let Some(custom) = &form.custom {
        swatches.push(Span::styled(
            format!("■ {} ", custom),
            Style::default()
                .fg(display_color(custom))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ));
    }
    let text = vec![
        Line::from(format!("Name: {}", form.name)),
        Line::from(swatches),
        Line::from(Span::styled(
            "Left/Right to pick a palette color",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn draw_bucket_popup(f: &mut ratatui::Frame, title: &str, name: &str, area: Rect) {
    let popup = centered_rect_absolute(44, 4, area);
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));
    let text = vec![
        Line::from(format!("Name: {}", name)),
        Line::from(Span::styled(
            "Optional %color token",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key).await
                }
                CEvent::Mouse(mouse) => app.handle_mouse(mouse).await,
                _ => {}
            }
        } else {
            app.tick();
        }
        if app.should_quit {
            return Ok(());
        }
    }
}
