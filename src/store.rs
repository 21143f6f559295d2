use crate::api::{Api, ApiError, Session};
use crate::config;
use crate::firestore::{profile_fields, DocModel, Fields, Value};
use crate::models::{Deadline, Folder, NewTask, Profile, Tag, Task, TaskKind};
use chrono::{NaiveDate, SecondsFormat, Utc};

/// Which collection a delete targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Deadline,
    Task,
    Folder,
    Tag,
}

impl ItemKind {
    pub fn collection(&self) -> &'static str {
        match self {
            ItemKind::Deadline => Deadline::COLLECTION,
            ItemKind::Task => Task::COLLECTION,
            ItemKind::Folder => Folder::COLLECTION,
            ItemKind::Tag => Tag::COLLECTION,
        }
    }
}

/// Active list-view filter: everything, one folder, or one tag.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Folder(String),
    Tag(String),
}

/// In-memory copy of all of the user's records. A cache, never the source of
/// truth; the remote store wins.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub profile: Profile,
    pub deadlines: Vec<Deadline>,
    pub tasks: Vec<Task>,
    pub folders: Vec<Folder>,
    pub tags: Vec<Tag>,
}

impl Snapshot {
    /// Non-decreasing calendar-date order, kept after every refresh.
    pub fn sort_deadlines(&mut self) {
        self.deadlines.sort_by_key(|dl| dl.date);
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn deadline(&self, id: &str) -> Option<&Deadline> {
        self.deadlines.iter().find(|dl| dl.id == id)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn folder_by_name(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn tasks_for_deadline(&self, deadline_id: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.deadline_id.as_deref() == Some(deadline_id))
            .collect()
    }

    /// Tasks with no parent deadline. A reference to a deadline that no longer
    /// exists counts as orphaned too, so deleting a deadline surfaces its
    /// former tasks here instead of silently hiding them.
    pub fn orphan_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| match &t.deadline_id {
                None => true,
                Some(id) => self.deadline(id).is_none(),
            })
            .collect()
    }

    /// Deadlines and undone tasks scheduled on one calendar day.
    pub fn on_date(&self, date: NaiveDate) -> (Vec<&Deadline>, Vec<&Task>) {
        let deadlines = self.deadlines.iter().filter(|dl| dl.date == date).collect();
        let tasks = self
            .tasks
            .iter()
            .filter(|t| !t.done && t.date == Some(date))
            .collect();
        (deadlines, tasks)
    }
}

/// A task matches when its title contains the search substring
/// (case-insensitively) and its folder/tag association matches the filter.
pub fn task_matches(task: &Task, search: &str, filter: &Filter) -> bool {
    let matches_search = task
        .title
        .to_lowercase()
        .contains(&search.to_lowercase());
    let matches_filter = match filter {
        Filter::All => true,
        Filter::Folder(id) => task.folder_id.as_deref() == Some(id),
        Filter::Tag(id) => task.tag_id.as_deref() == Some(id),
    };
    matches_search && matches_filter
}

/// One rendered row of the list view, identified by record id so the row list
/// survives a snapshot refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListRow {
    DeadlineHeader(String),
    Task(String),
    OrphanHeader,
}

/// Flatten the snapshot into list-view rows under the current search term and
/// filter. A deadline section with no matching tasks is hidden unless the
/// deadline's own title matches the search term.
pub fn list_rows(snapshot: &Snapshot, search: &str, filter: &Filter) -> Vec<ListRow> {
    let mut rows = Vec::new();
    for dl in &snapshot.deadlines {
        let tasks: Vec<&Task> = snapshot
            .tasks_for_deadline(&dl.id)
            .into_iter()
            .filter(|t| task_matches(t, search, filter))
            .collect();
        let title_matches = dl.title.to_lowercase().contains(&search.to_lowercase());
        if tasks.is_empty() && !title_matches {
            continue;
        }
        rows.push(ListRow::DeadlineHeader(dl.id.clone()));
        for task in tasks {
            rows.push(ListRow::Task(task.id.clone()));
        }
    }
    let orphans: Vec<&Task> = snapshot
        .orphan_tasks()
        .into_iter()
        .filter(|t| task_matches(t, search, filter))
        .collect();
    if !orphans.is_empty() {
        rows.push(ListRow::OrphanHeader);
        for task in orphans {
            rows.push(ListRow::Task(task.id.clone()));
        }
    }
    rows
}

/// Clamp a progress mutation into `[0, target]`.
pub fn clamp_progress(current: i64, delta: i64, target: i64) -> i64 {
    (current + delta).clamp(0, target.max(0))
}

/// Sole authority for reading and writing the user's collections. Every
/// structural mutation is followed by a full refresh; single-field toggles
/// patch the remote record and mirror the value locally.
pub struct Store {
    api: Api,
    pub session: Option<Session>,
    pub snapshot: Snapshot,
}

impl Store {
    pub fn new(api: Api) -> Store {
        Store {
            api,
            session: None,
            snapshot: Snapshot::default(),
        }
    }

    pub fn signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// The raw client, for the auth flow that runs before a session exists.
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// Establish the user context from an authentication event and load the
    /// first snapshot. `None` is a logical sign-out.
    pub async fn init_session(&mut self, session: Option<Session>) -> Result<(), ApiError> {
        match session {
            Some(session) => {
                config::save_session(&session.refresh_token);
                self.session = Some(session);
                self.refresh().await
            }
            None => {
                self.sign_out();
                Ok(())
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.session = None;
        self.snapshot = Snapshot::default();
        config::clear_saved_session();
    }

    /// Fetch all four collections and the profile concurrently and replace the
    /// snapshot atomically. On any failure the previous snapshot stays.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let session = match &self.session {
            Some(session) => session,
            None => return Ok(()),
        };
        let (deadlines, tasks, folders, tags, profile) = tokio::try_join!(
            self.api.list::<Deadline>(session),
            self.api.list::<Task>(session),
            self.api.list::<Folder>(session),
            self.api.list::<Tag>(session),
            self.api.fetch_profile(session),
        )?;
        self.snapshot = Snapshot {
            profile,
            deadlines,
            tasks,
            folders,
            tags,
        };
        self.snapshot.sort_deadlines();
        Ok(())
    }

    pub async fn add_deadline(
        &mut self,
        title: &str,
        date: NaiveDate,
        color: &str,
    ) -> Result<(), ApiError> {
        let session = match &self.session {
            Some(session) => session,
            None => return Ok(()),
        };
        let deadline = Deadline {
            id: String::new(),
            title: title.to_string(),
            date,
            color: color.to_string(),
        };
        self.api.create(session, &deadline).await?;
        self.refresh().await
    }

    pub async fn add_task(&mut self, new: NewTask) -> Result<(), ApiError> {
        let session = match &self.session {
            Some(session) => session,
            None => return Ok(()),
        };
        let task = Task {
            id: String::new(),
            title: new.title,
            kind: new.kind.unwrap_or_default(),
            done: false,
            current: 0,
            target: new.target.unwrap_or(0),
            deadline_id: new.deadline_id,
            folder_id: new.folder_id,
            tag_id: new.tag_id,
            date: new.date,
            description: new.description,
            duration_minutes: new.duration_minutes,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.api.create(session, &task).await?;
        self.refresh().await
    }

    pub async fn add_folder(&mut self, name: &str, color: &str) -> Result<(), ApiError> {
        let session = match &self.session {
            Some(session) => session,
            None => return Ok(()),
        };
        let folder = Folder {
            id: String::new(),
            name: name.to_string(),
            color: color.to_string(),
        };
        self.api.create(session, &folder).await?;
        self.refresh().await
    }

    pub async fn add_tag(&mut self, name: &str, color: &str) -> Result<(), ApiError> {
        let session = match &self.session {
            Some(session) => session,
            None => return Ok(()),
        };
        let tag = Tag {
            id: String::new(),
            name: name.to_string(),
            color: color.to_string(),
        };
        self.api.create(session, &tag).await?;
        self.refresh().await
    }

    /// Flip a classic task's completion flag, persisting only that field.
    /// Silent no-op when the id is not in the snapshot.
    pub async fn toggle_task(&mut self, id: &str) -> Result<Option<bool>, ApiError> {
        let (session, new_done) = match (&self.session, self.snapshot.task(id)) {
            (Some(session), Some(task)) => (session, !task.done),
            _ => return Ok(None),
        };
        let mut fields = Fields::new();
        fields.insert("done".into(), Value::Bool(new_done));
        self.api.patch(session, Task::COLLECTION, id, fields).await?;
        if let Some(task) = self.snapshot.tasks.iter_mut().find(|t| t.id == id) {
            task.done = new_done;
        }
        Ok(Some(new_done))
    }

    /// Apply a delta to a gradual task's progress, clamped into `[0, target]`,
    /// persisting only the clamped value. Returns the updated pair.
    pub async fn update_gradual(
        &mut self,
        id: &str,
        delta: i64,
    ) -> Result<Option<(i64, i64)>, ApiError> {
        let (session, current, target) = match (&self.session, self.snapshot.task(id)) {
            (Some(session), Some(task)) if task.kind == TaskKind::Gradual => {
                (session, task.current, task.target)
            }
            _ => return Ok(None),
        };
        let clamped = clamp_progress(current, delta, target);
        let mut fields = Fields::new();
        fields.insert("current".into(), Value::int(clamped));
        self.api.patch(session, Task::COLLECTION, id, fields).await?;
        if let Some(task) = self.snapshot.tasks.iter_mut().find(|t| t.id == id) {
            task.current = clamped;
        }
        Ok(Some((clamped, target)))
    }

    /// Merge the display name and color onto the profile document without
    /// clobbering other fields.
    pub async fn update_profile(&mut self, name: &str, color: &str) -> Result<(), ApiError> {
        let session = match &self.session {
            Some(session) => session,
            None => return Ok(()),
        };
        let profile = Profile {
            display_name: name.to_string(),
            display_color: color.to_string(),
        };
        self.api.patch_profile(session, profile_fields(&profile)).await?;
        self.snapshot.profile = profile;
        Ok(())
    }

    /// Delete a remote record and refresh. Confirmation happens in the UI;
    /// the swipe-delete path arrives here with intent already explicit.
    pub async fn delete(&mut self, kind: ItemKind, id: &str) -> Result<(), ApiError> {
        let session = match &self.session {
            Some(session) => session,
            None => return Ok(()),
        };
        self.api.delete(session, kind.collection(), id).await?;
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn deadline(id: &str, title: &str, d: &str) -> Deadline {
        Deadline {
            id: id.into(),
            title: title.into(),
            date: date(d),
            color: "blue".into(),
        }
    }

    fn task(id: &str, title: &str, deadline_id: Option<&str>) -> Task {
        Task {
            id: id.into(),
            title: title.into(),
            kind: TaskKind::Classic,
            done: false,
            current: 0,
            target: 0,
            deadline_id: deadline_id.map(str::to_string),
            folder_id: None,
            tag_id: None,
            date: None,
            description: None,
            duration_minutes: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_clamp_progress_sequence_stays_in_bounds() {
        let target = 10;
        let mut current = 0;
        for delta in [3, 3, 3, -1] {
            current = clamp_progress(current, delta, target);
            assert!((0..=target).contains(&current));
        }
        assert_eq!(current, 8);
        assert_eq!(clamp_progress(9, 5, 10), 10);
        assert_eq!(clamp_progress(1, -5, 10), 0);
    }

    #[test]
    fn test_sort_deadlines_non_decreasing() {
        let mut snapshot = Snapshot::default();
        snapshot.deadlines = vec![
            deadline("d2", "Later", "2025-07-01"),
            deadline("d1", "Sooner", "2025-06-01"),
            deadline("d3", "Same day", "2025-06-01"),
        ];
        snapshot.sort_deadlines();
        let dates: Vec<NaiveDate> = snapshot.deadlines.iter().map(|dl| dl.date).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_orphans_include_dangling_references() {
        let mut snapshot = Snapshot::default();
        snapshot.deadlines = vec![deadline("d1", "Launch", "2025-06-01")];
        snapshot.tasks = vec![
            task("t1", "Attached", Some("d1")),
            task("t2", "No parent", None),
            task("t3", "Dangling", Some("gone")),
        ];
        let orphan_ids: Vec<&str> = snapshot.orphan_tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(orphan_ids, vec!["t2", "t3"]);
        let attached: Vec<&str> = snapshot
            .tasks_for_deadline("d1")
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(attached, vec!["t1"]);
    }

    #[test]
    fn test_task_matches_search_and_filter() {
        let mut t = task("t1", "Milestone review", None);
        t.folder_id = Some("f1".into());
        assert!(task_matches(&t, "mile", &Filter::All));
        assert!(task_matches(&t, "MILE", &Filter::Folder("f1".into())));
        assert!(!task_matches(&t, "mile", &Filter::Folder("f2".into())));
        assert!(!task_matches(&t, "launch", &Filter::All));
        assert!(task_matches(&t, "", &Filter::All));
    }

    #[test]
    fn test_list_rows_hides_deadline_unless_title_matches() {
        let mut snapshot = Snapshot::default();
        snapshot.deadlines = vec![
            deadline("d1", "Milestone week", "2025-06-01"),
            deadline("d2", "Launch", "2025-07-01"),
        ];
        snapshot.tasks = vec![
            task("t1", "Review", Some("d1")),
            task("t2", "Review", Some("d2")),
        ];
        // "mile" matches neither task title, but d1's own title matches, so
        // d1 renders (with no task rows) while d2 disappears entirely.
        let rows = list_rows(&snapshot, "mile", &Filter::All);
        assert_eq!(rows, vec![ListRow::DeadlineHeader("d1".into())]);
    }

    #[test]
    fn test_list_rows_orphan_section_is_last() {
        let mut snapshot = Snapshot::default();
        snapshot.deadlines = vec![deadline("d1", "Launch", "2025-06-01")];
        snapshot.tasks = vec![
            task("t1", "Write docs", Some("d1")),
            task("t2", "Water plants", None),
        ];
        let rows = list_rows(&snapshot, "", &Filter::All);
        assert_eq!(
            rows,
            vec![
                ListRow::DeadlineHeader("d1".into()),
                ListRow::Task("t1".into()),
                ListRow::OrphanHeader,
                ListRow::Task("t2".into()),
            ]
        );
    }

    #[test]
    fn test_calendar_accessor_skips_done_tasks() {
        let mut snapshot = Snapshot::default();
        snapshot.deadlines = vec![deadline("d1", "Launch", "2025-06-01")];
        let mut scheduled = task("t1", "Prep", None);
        scheduled.date = Some(date("2025-06-01"));
        let mut finished = task("t2", "Old", None);
        finished.date = Some(date("2025-06-01"));
        finished.done = true;
        snapshot.tasks = vec![scheduled, finished];
        let (deadlines, tasks) = snapshot.on_date(date("2025-06-01"));
        assert_eq!(deadlines.len(), 1);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "t1");
    }
}
