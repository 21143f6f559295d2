use chrono::NaiveDate;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Binary checkbox task or progress-counter task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    #[serde(rename = "CLASSIC")]
    Classic,
    #[serde(rename = "GRADUAL")]
    Gradual,
}

impl Default for TaskKind {
    fn default() -> Self {
        TaskKind::Classic
    }
}

/// A dated goal owning zero or more tasks by back-reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Deadline {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub color: String,
}

impl Deadline {
    /// Signed days remaining until the deadline, negative when overdue.
    /// Calendar-date precision, not timestamps.
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.date - today).num_days()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub kind: TaskKind,
    pub done: bool,
    pub current: i64,
    pub target: i64,
    pub deadline_id: Option<String>,
    pub folder_id: Option<String>,
    pub tag_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub created_at: String,
}

impl Task {
    /// Fill ratio of a gradual task in `[0, 1]`. Zero-target tasks read as empty.
    pub fn progress_ratio(&self) -> f64 {
        if self.target <= 0 {
            0.0
        } else {
            self.current as f64 / self.target as f64
        }
    }
}

/// Fields accepted by `Store::add_task`; everything but the title is optional.
#[derive(Clone, Debug, Default)]
pub struct NewTask {
    pub title: String,
    pub kind: Option<TaskKind>,
    pub target: Option<i64>,
    pub deadline_id: Option<String>,
    pub folder_id: Option<String>,
    pub tag_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
}

/// Single-level grouping bucket, usable as a list filter.
#[derive(Clone, Debug, PartialEq)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Lightweight label, distinct from `Folder` in presentation only.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Per-user display settings stored on the user document itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub display_name: String,
    pub display_color: String,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            display_name: String::new(),
            display_color: "blue".to_string(),
        }
    }
}

/// Named display palette; entries cycle in the profile and add forms.
pub const PALETTE: &[&str] = &["blue", "red", "green", "purple", "yellow", "gray"];

/// Resolve a stored color value: a named palette entry or a `#rrggbb` custom
/// value. Unknown names fall back to the default foreground.
pub fn display_color(value: &str) -> Color {
    match value {
        "blue" => Color::Blue,
        "red" => Color::Red,
        "green" => Color::Green,
        "purple" => Color::Magenta,
        "yellow" => Color::Yellow,
        "gray" => Color::DarkGray,
        custom => parse_hex(custom).unwrap_or(Color::Reset),
    }
}

fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_days_left_future_and_overdue() {
        let dl = Deadline {
            id: "d1".into(),
            title: "Launch".into(),
            date: date("2025-06-01"),
            color: "red".into(),
        };
        assert_eq!(dl.days_left(date("2025-05-29")), 3);
        assert_eq!(dl.days_left(date("2025-06-01")), 0);
        assert_eq!(dl.days_left(date("2025-06-04")), -3);
    }

    #[test]
    fn test_progress_ratio_zero_target() {
        let task = Task {
            id: "t1".into(),
            title: "Read".into(),
            kind: TaskKind::Gradual,
            done: false,
            current: 0,
            target: 0,
            deadline_id: None,
            folder_id: None,
            tag_id: None,
            date: None,
            description: None,
            duration_minutes: None,
            created_at: String::new(),
        };
        assert_eq!(task.progress_ratio(), 0.0);
    }

    #[test]
    fn test_display_color_custom_hex() {
        assert_eq!(display_color("#102030"), Color::Rgb(0x10, 0x20, 0x30));
        assert_eq!(display_color("purple"), Color::Magenta);
        assert_eq!(display_color("#xyz"), Color::Reset);
    }
}
