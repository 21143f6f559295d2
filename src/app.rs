use crate::api::ApiError;
use crate::calendar;
use crate::models::{NewTask, Profile, Task, TaskKind, PALETTE};
use crate::parser::parse_input;
use crate::store::{list_rows, Filter, ItemKind, ListRow, Store};
use crate::swipe::{Swipe, SwipeOutcome};
use chrono::{Local, NaiveDate};
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

/// The three mutually exclusive signed-in views. Switching is a direct
/// assignment, no history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    List,
    Calendar,
    Projects,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    Register,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthVariant {
    Email,
    Pin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthField {
    Identity,
    Secret,
}

pub const PIN_LEN: usize = 6;

/// Sign-in / registration form state.
#[derive(Clone, Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub variant: AuthVariant,
    pub field: AuthField,
    pub identity: String,
    pub secret: String,
    pub pin: String,
    pub error: Option<String>,
}

impl Default for AuthForm {
    fn default() -> Self {
        AuthForm {
            mode: AuthMode::SignIn,
            variant: AuthVariant::Email,
            field: AuthField::Identity,
            identity: String::new(),
            secret: String::new(),
            pin: String::new(),
            error: None,
        }
    }
}

impl AuthForm {
    /// PIN digits accumulate up to six; extra presses are ignored.
    pub fn push_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.pin.len() < PIN_LEN {
            self.pin.push(c);
        }
    }
}

/// The pseudo/PIN variant rides on the same identity backend as email
/// sign-in: the pseudo becomes a synthetic address.
pub fn pin_identity(pseudo: &str) -> String {
    format!("{}@deadline.app", pseudo.trim().to_lowercase())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddMode {
    Task,
    Deadline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddField {
    Title,
    Description,
}

/// State of the add popup. The title field accepts quick-add tokens; the
/// parent deadline is picked with Up/Down.
#[derive(Clone, Debug)]
pub struct AddForm {
    pub mode: AddMode,
    pub field: AddField,
    pub title: String,
    pub description: String,
    /// 0 = no parent, n = deadlines[n - 1].
    pub deadline_index: usize,
}

impl Default for AddForm {
    fn default() -> Self {
        AddForm {
            mode: AddMode::Task,
            field: AddField::Title,
            title: String::new(),
            description: String::new(),
            deadline_index: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PendingDelete {
    pub kind: ItemKind,
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, Default)]
pub struct ProfileForm {
    pub name: String,
    pub color_index: usize,
    /// A stored color that is not a palette entry (a custom `#rrggbb` value).
    /// Kept verbatim on save unless the user cycles the palette.
    pub custom: Option<String>,
}

impl ProfileForm {
    pub fn for_profile(profile: &Profile) -> ProfileForm {
        let color_index = PALETTE.iter().position(|c| *c == profile.display_color);
        ProfileForm {
            name: profile.display_name.clone(),
            color_index: color_index.unwrap_or(0),
            custom: if color_index.is_none() {
                Some(profile.display_color.clone())
            } else {
                None
            },
        }
    }

    /// Cycling discards a custom value in favor of the palette.
    pub fn cycle(&mut self, step: isize) {
        let len = PALETTE.len() as isize;
        self.color_index = (self.color_index as isize + step).rem_euclid(len) as usize;
        self.custom = None;
    }

    pub fn selected_color(&self) -> &str {
        self.custom
            .as_deref()
            .unwrap_or(PALETTE[self.color_index % PALETTE.len()])
    }
}

#[derive(Clone, Debug)]
pub enum Overlay {
    None,
    Add(AddForm),
    ConfirmDelete(PendingDelete),
    Profile(ProfileForm),
    NewFolder(String),
    NewTag(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectsPane {
    Folders,
    Tags,
}

pub struct App {
    pub store: Store,
    pub view: View,
    pub auth: AuthForm,
    pub overlay: Overlay,
    pub search: String,
    pub searching: bool,
    pub filter: Filter,
    pub rows: Vec<ListRow>,
    pub list_state: ListState,
    /// Inner list area from the last draw, for mouse hit testing.
    pub list_area: Rect,
    pub month: NaiveDate,
    pub projects_pane: ProjectsPane,
    pub projects_state: ListState,
    pub swipe: Swipe,
    pub swipe_task: Option<String>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: Store) -> App {
        let mut app = App {
            store,
            view: View::List,
            auth: AuthForm::default(),
            overlay: Overlay::None,
            search: String::new(),
            searching: false,
            filter: Filter::All,
            rows: Vec::new(),
            list_state: ListState::default(),
            list_area: Rect::default(),
            month: Local::now().date_naive(),
            projects_pane: ProjectsPane::Folders,
            projects_state: ListState::default(),
            swipe: Swipe::new(),
            swipe_task: None,
            status: None,
            should_quit: false,
        };
        app.refresh_rows();
        app
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Rebuild the visible list rows after any snapshot or filter change and
    /// keep the selection in bounds.
    pub fn refresh_rows(&mut self) {
        self.rows = list_rows(&self.store.snapshot, &self.search, &self.filter);
        if self.rows.is_empty() {
            self.list_state.select(None);
        } else {
            match self.list_state.selected() {
                Some(i) if i < self.rows.len() => {}
                _ => self.list_state.select(Some(0)),
            }
        }
    }

    fn report(&mut self, err: ApiError) {
        self.status = Some(err.to_string());
    }

    fn next_row(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i >= self.rows.len() - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous_row(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn selected_row(&self) -> Option<ListRow> {
        self.rows.get(self.list_state.selected()?).cloned()
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if !self.store.signed_in() {
            self.handle_auth_key(key).await;
            return;
        }
        match std::mem::replace(&mut self.overlay, Overlay::None) {
            Overlay::None => self.handle_main_key(key).await,
            Overlay::Add(form) => self.handle_add_key(key, form).await,
            Overlay::ConfirmDelete(pending) => self.handle_confirm_key(key, pending).await,
            Overlay::Profile(form) => self.handle_profile_key(key, form).await,
            Overlay::NewFolder(name) => self.handle_bucket_key(key, name, true).await,
            Overlay::NewTag(name) => self.handle_bucket_key(key, name, false).await,
        }
    }

    async fn handle_auth_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('t') => {
                    self.auth.mode = match self.auth.mode {
                        AuthMode::SignIn => AuthMode::Register,
                        AuthMode::Register => AuthMode::SignIn,
                    };
                    self.auth.error = None;
                }
                KeyCode::Char('p') => {
                    self.auth.variant = match self.auth.variant {
                        AuthVariant::Email => AuthVariant::Pin,
                        AuthVariant::Pin => AuthVariant::Email,
                    };
                    self.auth.field = AuthField::Identity;
                    self.auth.error = None;
                }
                KeyCode::Char('c') => self.should_quit = true,
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.auth.field = match self.auth.field {
                    AuthField::Identity => AuthField::Secret,
                    AuthField::Secret => AuthField::Identity,
                };
            }
            KeyCode::Enter => self.submit_auth().await,
            KeyCode::Backspace => match (self.auth.field, self.auth.variant) {
                (AuthField::Identity, _) => {
                    self.auth.identity.pop();
                }
                (AuthField::Secret, AuthVariant::Email) => {
                    self.auth.secret.pop();
                }
                (AuthField::Secret, AuthVariant::Pin) => {
                    self.auth.pin.pop();
                }
            },
            KeyCode::Char(c) => match (self.auth.field, self.auth.variant) {
                (AuthField::Identity, _) => self.auth.identity.push(c),
                (AuthField::Secret, AuthVariant::Email) => self.auth.secret.push(c),
                (AuthField::Secret, AuthVariant::Pin) => self.auth.push_digit(c),
            },
            _ => {}
        }
    }

    async fn submit_auth(&mut self) {
        let (email, password) = match self.auth.variant {
            AuthVariant::Email => (self.auth.identity.trim().to_string(), self.auth.secret.clone()),
            AuthVariant::Pin => {
                if self.auth.pin.len() < PIN_LEN {
                    self.auth.error = Some(format!("PIN needs {} digits", PIN_LEN));
                    return;
                }
                (pin_identity(&self.auth.identity), self.auth.pin.clone())
            }
        };
        if email.is_empty() {
            self.auth.error = Some("Enter an identity first".to_string());
            return;
        }
        let result = match self.auth.mode {
            AuthMode::SignIn => self.store.api().sign_in(&email, &password).await,
            AuthMode::Register => self.store.api().sign_up(&email, &password).await,
        };
        match result {
            Ok(session) => {
                if let Err(err) = self.store.init_session(Some(session)).await {
                    self.report(err);
                }
                self.auth = AuthForm::default();
                self.refresh_rows();
            }
            Err(err) => {
                self.auth.error = Some(err.to_string());
            }
        }
    }

    async fn handle_main_key(&mut self, key: KeyEvent) {
        if self.searching {
            match key.code {
                KeyCode::Esc => {
                    self.search.clear();
                    self.searching = false;
                }
                KeyCode::Enter => self.searching = false,
                KeyCode::Backspace => {
                    self.search.pop();
                }
                KeyCode::Char(c) => self.search.push(c),
                _ => {}
            }
            self.refresh_rows();
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.view = View::List,
            KeyCode::Char('2') => self.view = View::Calendar,
            KeyCode::Char('3') => self.view = View::Projects,
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('a') => self.overlay = Overlay::Add(AddForm::default()),
            KeyCode::Char('e') => {
                self.overlay =
                    Overlay::Profile(ProfileForm::for_profile(&self.store.snapshot.profile));
            }
            KeyCode::Char('o') => {
                self.store.sign_out();
                self.auth = AuthForm::default();
                self.view = View::List;
                self.filter = Filter::All;
                self.search.clear();
                self.refresh_rows();
            }
            KeyCode::Char('r') => {
                if let Err(err) = self.store.refresh().await {
                    self.report(err);
                }
                self.refresh_rows();
            }
            KeyCode::Esc => {
                self.filter = Filter::All;
                self.refresh_rows();
            }
            _ => match self.view {
                View::List => self.handle_list_key(key).await,
                View::Calendar => self.handle_calendar_key(key),
                View::Projects => self.handle_projects_key(key).await,
            },
        }
    }

    async fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.next_row(),
            KeyCode::Char('k') | KeyCode::Up => self.previous_row(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(ListRow::Task(id)) = self.selected_row() {
                    self.activate_task(&id).await;
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                if let Some(ListRow::Task(id)) = self.selected_row() {
                    self.bump_gradual(&id, 1).await;
                }
            }
            KeyCode::Char('-') => {
                if let Some(ListRow::Task(id)) = self.selected_row() {
                    self.bump_gradual(&id, -1).await;
                }
            }
            KeyCode::Char('d') => match self.selected_row() {
                Some(ListRow::Task(id)) => {
                    let label = self
                        .store
                        .snapshot
                        .task(&id)
                        .map(|t| t.title.clone())
                        .unwrap_or_default();
                    self.overlay = Overlay::ConfirmDelete(PendingDelete {
                        kind: ItemKind::Task,
                        id,
                        label,
                    });
                }
                Some(ListRow::DeadlineHeader(id)) => {
                    let label = self
                        .store
                        .snapshot
                        .deadline(&id)
                        .map(|dl| dl.title.clone())
                        .unwrap_or_default();
                    self.overlay = Overlay::ConfirmDelete(PendingDelete {
                        kind: ItemKind::Deadline,
                        id,
                        label,
                    });
                }
                _ => {}
            },
            _ => {}
        }
    }

    /// Space/Enter on a task row: toggle a classic task, advance a gradual one.
    async fn activate_task(&mut self, id: &str) {
        let kind = match self.store.snapshot.task(id) {
            Some(task) => task.kind,
            None => return,
        };
        let result = match kind {
            TaskKind::Classic => self.store.toggle_task(id).await.map(|_| ()),
            TaskKind::Gradual => self.store.update_gradual(id, 1).await.map(|_| ()),
        };
        if let Err(err) = result {
            self.report(err);
        }
        self.refresh_rows();
    }

    async fn bump_gradual(&mut self, id: &str, delta: i64) {
        if let Err(err) = self.store.update_gradual(id, delta).await {
            self.report(err);
        }
        self.refresh_rows();
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Right => {
                self.month = calendar::next_month(self.month);
            }
            KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::Left => {
                self.month = calendar::prev_month(self.month);
            }
            _ => {}
        }
    }

    async fn handle_projects_key(&mut self, key: KeyEvent) {
        let len = match self.projects_pane {
            ProjectsPane::Folders => self.store.snapshot.folders.len(),
            ProjectsPane::Tags => self.store.snapshot.tags.len(),
        };
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.projects_pane = match self.projects_pane {
                    ProjectsPane::Folders => ProjectsPane::Tags,
                    ProjectsPane::Tags => ProjectsPane::Folders,
                };
                let new_len = match self.projects_pane {
                    ProjectsPane::Folders => self.store.snapshot.folders.len(),
                    ProjectsPane::Tags => self.store.snapshot.tags.len(),
                };
                self.projects_state
                    .select(if new_len == 0 { None } else { Some(0) });
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if len > 0 {
                    let i = match self.projects_state.selected() {
                        Some(i) if i >= len - 1 => 0,
                        Some(i) => i + 1,
                        None => 0,
                    };
                    self.projects_state.select(Some(i));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if len > 0 {
                    let i = match self.projects_state.selected() {
                        Some(0) | None => len - 1,
                        Some(i) => i - 1,
                    };
                    self.projects_state.select(Some(i));
                }
            }
            KeyCode::Enter => {
                // Selecting a tile makes it the active list-view filter.
                if let Some(i) = self.projects_state.selected() {
                    self.filter = match self.projects_pane {
                        ProjectsPane::Folders => match self.store.snapshot.folders.get(i) {
                            Some(folder) => Filter::Folder(folder.id.clone()),
                            None => return,
                        },
                        ProjectsPane::Tags => match self.store.snapshot.tags.get(i) {
                            Some(tag) => Filter::Tag(tag.id.clone()),
                            None => return,
                        },
                    };
                    self.view = View::List;
                    self.refresh_rows();
                }
            }
            KeyCode::Char('f') => self.overlay = Overlay::NewFolder(String::new()),
            KeyCode::Char('t') => self.overlay = Overlay::NewTag(String::new()),
            KeyCode::Char('d') => {
                if let Some(i) = self.projects_state.selected() {
                    let pending = match self.projects_pane {
                        ProjectsPane::Folders => self.store.snapshot.folders.get(i).map(|f| {
                            PendingDelete {
                                kind: ItemKind::Folder,
                                id: f.id.clone(),
                                label: f.name.clone(),
                            }
                        }),
                        ProjectsPane::Tags => self.store.snapshot.tags.get(i).map(|t| {
                            PendingDelete {
                                kind: ItemKind::Tag,
                                id: t.id.clone(),
                                label: t.name.clone(),
                            }
                        }),
                    };
                    if let Some(pending) = pending {
                        self.overlay = Overlay::ConfirmDelete(pending);
                    }
                }
            }
            _ => {}
        }
    }

    async fn handle_add_key(&mut self, key: KeyEvent, mut form: AddForm) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Tab => {
                form.mode = match form.mode {
                    AddMode::Task => AddMode::Deadline,
                    AddMode::Deadline => AddMode::Task,
                };
            }
            KeyCode::BackTab => {
                form.field = match form.field {
                    AddField::Title => AddField::Description,
                    AddField::Description => AddField::Title,
                };
            }
            KeyCode::Up if form.mode == AddMode::Task => {
                let max = self.store.snapshot.deadlines.len();
                form.deadline_index = if form.deadline_index == 0 {
                    max
                } else {
                    form.deadline_index - 1
                };
            }
            KeyCode::Down if form.mode == AddMode::Task => {
                let max = self.store.snapshot.deadlines.len();
                form.deadline_index = if form.deadline_index >= max {
                    0
                } else {
                    form.deadline_index + 1
                };
            }
            KeyCode::Enter => {
                self.submit_add(form).await;
                return;
            }
            KeyCode::Backspace => match form.field {
                AddField::Title => {
                    form.title.pop();
                }
                AddField::Description => {
                    form.description.pop();
                }
            },
            KeyCode::Char(c) => match form.field {
                AddField::Title => form.title.push(c),
                AddField::Description => form.description.push(c),
            },
            _ => {}
        }
        self.overlay = Overlay::Add(form);
    }

    async fn submit_add(&mut self, form: AddForm) {
        let parsed = parse_input(&form.title);
        if parsed.title.is_empty() {
            self.status = Some("Title cannot be empty".to_string());
            self.overlay = Overlay::Add(form);
            return;
        }
        match form.mode {
            AddMode::Deadline => {
                let date = match parsed.date {
                    Some(date) => date,
                    None => {
                        self.status = Some("Deadline needs a ^YYYY-MM-DD date".to_string());
                        self.overlay = Overlay::Add(form);
                        return;
                    }
                };
                let color = parsed.color.as_deref().unwrap_or("blue");
                if let Err(err) = self.store.add_deadline(&parsed.title, date, color).await {
                    self.report(err);
                }
            }
            AddMode::Task => {
                let deadline_id = form
                    .deadline_index
                    .checked_sub(1)
                    .and_then(|i| self.store.snapshot.deadlines.get(i))
                    .map(|dl| dl.id.clone());
                let folder_id = parsed
                    .folder
                    .as_deref()
                    .and_then(|name| self.store.snapshot.folder_by_name(name))
                    .map(|f| f.id.clone());
                let tag_id = parsed
                    .tag
                    .as_deref()
                    .and_then(|name| self.store.snapshot.tag_by_name(name))
                    .map(|t| t.id.clone());
                let description = if form.description.trim().is_empty() {
                    None
                } else {
                    Some(form.description.clone())
                };
                let new = NewTask {
                    title: parsed.title,
                    kind: parsed.target.map(|_| TaskKind::Gradual),
                    target: parsed.target,
                    deadline_id,
                    folder_id,
                    tag_id,
                    date: parsed.date,
                    description,
                    duration_minutes: parsed.duration_minutes,
                };
                if let Err(err) = self.store.add_task(new).await {
                    self.report(err);
                }
            }
        }
        self.refresh_rows();
    }

    async fn handle_confirm_key(&mut self, key: KeyEvent, pending: PendingDelete) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Err(err) = self.store.delete(pending.kind, &pending.id).await {
                    self.report(err);
                }
                self.refresh_rows();
            }
            KeyCode::Char('n') | KeyCode::Esc => {}
            _ => self.overlay = Overlay::ConfirmDelete(pending),
        }
    }

    async fn handle_profile_key(&mut self, key: KeyEvent, mut form: ProfileForm) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Left => form.cycle(-1),
            KeyCode::Right => form.cycle(1),
            KeyCode::Enter => {
                let color = form.selected_color().to_string();
                if let Err(err) = self.store.update_profile(form.name.trim(), &color).await {
                    self.report(err);
                }
                return;
            }
            KeyCode::Backspace => {
                form.name.pop();
            }
            KeyCode::Char(c) => form.name.push(c),
            _ => {}
        }
        self.overlay = Overlay::Profile(form);
    }

    async fn handle_bucket_key(&mut self, key: KeyEvent, mut name: String, folder: bool) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                let parsed = parse_input(&name);
                if parsed.title.is_empty() {
                    return;
                }
                let color = parsed.color.as_deref().unwrap_or("gray");
                let result = if folder {
                    self.store.add_folder(&parsed.title, color).await
                } else {
                    self.store.add_tag(&parsed.title, color).await
                };
                if let Err(err) = result {
                    self.report(err);
                }
                self.refresh_rows();
                return;
            }
            KeyCode::Backspace => {
                name.pop();
            }
            KeyCode::Char(c) => name.push(c),
            _ => {}
        }
        self.overlay = if folder {
            Overlay::NewFolder(name)
        } else {
            Overlay::NewTag(name)
        };
    }

    /// Mouse wiring for the swipe gesture: a horizontal drag on a task row
    /// completes (right) or deletes (left) past the threshold.
    pub async fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !self.store.signed_in() || self.view != View::List {
            return;
        }
        if !matches!(self.overlay, Overlay::None) {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.row_at(mouse.row) {
                    if let Some(ListRow::Task(id)) = self.rows.get(index).cloned() {
                        self.list_state.select(Some(index));
                        self.swipe.begin(mouse.column);
                        self.swipe_task = Some(id);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.swipe.drag(mouse.column);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let outcome = self.swipe.release();
                let task_id = match outcome {
                    SwipeOutcome::Revert => None,
                    _ => self.swipe_task.take(),
                };
                if let Some(id) = task_id {
                    match outcome {
                        SwipeOutcome::Complete => self.swipe_complete(&id).await,
                        SwipeOutcome::Delete => {
                            // Intent is already explicit; no confirm step.
                            if let Err(err) = self.store.delete(ItemKind::Task, &id).await {
                                self.report(err);
                            }
                        }
                        SwipeOutcome::Revert => {}
                    }
                    self.refresh_rows();
                }
            }
            _ => {}
        }
    }

    async fn swipe_complete(&mut self, id: &str) {
        let plan = match self.store.snapshot.task(id) {
            Some(task) => complete_plan(task),
            None => CompletePlan::Nothing,
        };
        let result = match plan {
            CompletePlan::Fill(remaining) => {
                self.store.update_gradual(id, remaining).await.map(|_| ())
            }
            CompletePlan::Toggle => self.store.toggle_task(id).await.map(|_| ()),
            CompletePlan::Nothing => Ok(()),
        };
        if let Err(err) = result {
            self.report(err);
        }
    }

    fn row_at(&self, screen_row: u16) -> Option<usize> {
        if screen_row < self.list_area.y || screen_row >= self.list_area.y + self.list_area.height {
            return None;
        }
        let index = (screen_row - self.list_area.y) as usize + self.list_state.offset();
        if index < self.rows.len() {
            Some(index)
        } else {
            None
        }
    }

    /// Advance animations; called once per poll interval.
    pub fn tick(&mut self) {
        self.swipe.tick();
        if !self.swipe.is_active() {
            self.swipe_task = None;
        }
    }
}

/// What a completing swipe should do to a task. Tasks already at their
/// target or already done need no remote write at all.
#[derive(Debug, PartialEq, Eq)]
enum CompletePlan {
    Fill(i64),
    Toggle,
    Nothing,
}

fn complete_plan(task: &Task) -> CompletePlan {
    match task.kind {
        TaskKind::Gradual if task.current < task.target => {
            CompletePlan::Fill(task.target - task.current)
        }
        TaskKind::Gradual => CompletePlan::Nothing,
        TaskKind::Classic if !task.done => CompletePlan::Toggle,
        TaskKind::Classic => CompletePlan::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pin_identity_normalizes_pseudo() {
        assert_eq!(pin_identity("  Marie "), "marie@deadline.app");
    }

    #[test]
    fn test_pin_accumulates_at_most_six_digits() {
        let mut form = AuthForm::default();
        for c in "1234567".chars() {
            form.push_digit(c);
        }
        assert_eq!(form.pin, "123456");
        form.push_digit('x');
        assert_eq!(form.pin, "123456");
    }

    #[test]
    fn test_profile_form_keeps_custom_color() {
        let profile = Profile {
            display_name: "Ada".into(),
            display_color: "#123456".into(),
        };
        let form = ProfileForm::for_profile(&profile);
        assert_eq!(form.custom.as_deref(), Some("#123456"));
        assert_eq!(form.selected_color(), "#123456");

        // Cycling is an explicit choice to replace the custom value.
        let mut cycled = form.clone();
        cycled.cycle(1);
        assert_eq!(cycled.custom, None);
        assert_eq!(cycled.selected_color(), PALETTE[1]);
    }

    #[test]
    fn test_profile_form_palette_color_selects_its_swatch() {
        let profile = Profile {
            display_name: String::new(),
            display_color: "green".into(),
        };
        let form = ProfileForm::for_profile(&profile);
        assert_eq!(form.custom, None);
        assert_eq!(form.selected_color(), "green");
    }

    fn task(kind: TaskKind, done: bool, current: i64, target: i64) -> Task {
        Task {
            id: "t1".into(),
            title: "Read".into(),
            kind,
            done,
            current,
            target,
            deadline_id: None,
            folder_id: None,
            tag_id: None,
            date: None,
            description: None,
            duration_minutes: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_complete_plan_fills_remaining_progress() {
        let plan = complete_plan(&task(TaskKind::Gradual, false, 3, 10));
        assert_eq!(plan, CompletePlan::Fill(7));
    }

    #[test]
    fn test_complete_plan_skips_full_and_done_tasks() {
        assert_eq!(
            complete_plan(&task(TaskKind::Gradual, false, 10, 10)),
            CompletePlan::Nothing
        );
        assert_eq!(
            complete_plan(&task(TaskKind::Classic, true, 0, 0)),
            CompletePlan::Nothing
        );
        assert_eq!(
            complete_plan(&task(TaskKind::Classic, false, 0, 0)),
            CompletePlan::Toggle
        );
    }
}
