//! Firestore REST document codec. Every stored record travels as a
//! `Document` whose fields are typed values (`stringValue`, `integerValue`,
//! ...); integers are strings on the wire.

use crate::models::{Deadline, Folder, Profile, Tag, Task, TaskKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Fields = BTreeMap<String, Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "stringValue")]
    Str(String),
    #[serde(rename = "integerValue")]
    Int(String),
    #[serde(rename = "booleanValue")]
    Bool(bool),
    #[serde(rename = "nullValue")]
    Null(()),
    /// Value types this app never writes (timestamps, maps, arrays); kept so
    /// a foreign field cannot fail a whole collection fetch.
    #[serde(untagged)]
    Other(serde_json::Value),
}

impl Value {
    pub fn str(value: impl Into<String>) -> Value {
        Value::Str(value.into())
    }

    pub fn int(value: i64) -> Value {
        Value::Int(value.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Document {
    /// Full resource name; empty on documents built for creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    pub fn new(fields: Fields) -> Document {
        Document {
            name: String::new(),
            fields,
        }
    }

    /// Server-assigned id: the last segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or("")
    }

    fn str_field(&self, key: &str) -> Option<String> {
        self.fields.get(key)?.as_str().map(str::to_string)
    }

    fn int_field(&self, key: &str) -> Option<i64> {
        self.fields.get(key)?.as_i64()
    }

    fn date_field(&self, key: &str) -> Option<NaiveDate> {
        let raw = self.str_field(key)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default, rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// Mapping between a domain entity and its Firestore document shape.
pub trait DocModel: Sized {
    const COLLECTION: &'static str;

    /// Returns `None` for documents that do not decode to a usable record;
    /// such records are skipped rather than failing the whole fetch.
    fn from_doc(doc: &Document) -> Option<Self>;

    fn to_fields(&self) -> Fields;
}

impl DocModel for Deadline {
    const COLLECTION: &'static str = "deadlines";

    fn from_doc(doc: &Document) -> Option<Deadline> {
        Some(Deadline {
            id: doc.id().to_string(),
            title: doc.str_field("title")?,
            date: doc.date_field("date")?,
            color: doc.str_field("color").unwrap_or_else(|| "blue".to_string()),
        })
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".into(), Value::str(&self.title));
        fields.insert("date".into(), Value::str(self.date.format("%Y-%m-%d").to_string()));
        fields.insert("color".into(), Value::str(&self.color));
        fields
    }
}

impl DocModel for Task {
    const COLLECTION: &'static str = "tasks";

    fn from_doc(doc: &Document) -> Option<Task> {
        let kind = match doc.str_field("kind").as_deref() {
            Some("GRADUAL") => TaskKind::Gradual,
            // Missing or unknown kinds read as classic.
            _ => TaskKind::Classic,
        };
        Some(Task {
            id: doc.id().to_string(),
            title: doc.str_field("title")?,
            kind,
            done: doc.fields.get("done").and_then(Value::as_bool).unwrap_or(false),
            current: doc.int_field("current").unwrap_or(0),
            target: doc.int_field("target").unwrap_or(0),
            deadline_id: doc.str_field("deadlineId"),
            folder_id: doc.str_field("folderId"),
            tag_id: doc.str_field("tagId"),
            date: doc.date_field("date"),
            description: doc.str_field("description"),
            duration_minutes: doc.int_field("durationMinutes"),
            created_at: doc.str_field("createdAt").unwrap_or_default(),
        })
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".into(), Value::str(&self.title));
        let kind = match self.kind {
            TaskKind::Classic => "CLASSIC",
            TaskKind::Gradual => "GRADUAL",
        };
        fields.insert("kind".into(), Value::str(kind));
        fields.insert("done".into(), Value::Bool(self.done));
        fields.insert("current".into(), Value::int(self.current));
        fields.insert("target".into(), Value::int(self.target));
        match &self.deadline_id {
            Some(id) => fields.insert("deadlineId".into(), Value::str(id)),
            None => fields.insert("deadlineId".into(), Value::Null(())),
        };
        if let Some(id) = &self.folder_id {
            fields.insert("folderId".into(), Value::str(id));
        }
        if let Some(id) = &self.tag_id {
            fields.insert("tagId".into(), Value::str(id));
        }
        if let Some(date) = self.date {
            fields.insert("date".into(), Value::str(date.format("%Y-%m-%d").to_string()));
        }
        if let Some(description) = &self.description {
            fields.insert("description".into(), Value::str(description));
        }
        if let Some(minutes) = self.duration_minutes {
            fields.insert("durationMinutes".into(), Value::int(minutes));
        }
        fields.insert("createdAt".into(), Value::str(&self.created_at));
        fields
    }
}

impl DocModel for Folder {
    const COLLECTION: &'static str = "folders";

    fn from_doc(doc: &Document) -> Option<Folder> {
        Some(Folder {
            id: doc.id().to_string(),
            name: doc.str_field("name")?,
            color: doc.str_field("color").unwrap_or_else(|| "gray".to_string()),
        })
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".into(), Value::str(&self.name));
        fields.insert("color".into(), Value::str(&self.color));
        fields
    }
}

impl DocModel for Tag {
    const COLLECTION: &'static str = "tags";

    fn from_doc(doc: &Document) -> Option<Tag> {
        Some(Tag {
            id: doc.id().to_string(),
            name: doc.str_field("name")?,
            color: doc.str_field("color").unwrap_or_else(|| "gray".to_string()),
        })
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".into(), Value::str(&self.name));
        fields.insert("color".into(), Value::str(&self.color));
        fields
    }
}

/// The profile lives on the `users/{uid}` document itself and is written as a
/// field-masked merge, never a full overwrite.
pub fn profile_from_doc(doc: &Document) -> Profile {
    Profile {
        display_name: doc.str_field("displayName").unwrap_or_default(),
        display_color: doc
            .str_field("displayColor")
            .unwrap_or_else(|| Profile::default().display_color),
    }
}

pub fn profile_fields(profile: &Profile) -> Fields {
    let mut fields = Fields::new();
    fields.insert("displayName".into(), Value::str(&profile.display_name));
    fields.insert("displayColor".into(), Value::str(&profile.display_color));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_document_id_is_last_path_segment() {
        let doc = Document {
            name: "projects/p/databases/(default)/documents/users/u1/tasks/abc123".into(),
            fields: Fields::new(),
        };
        assert_eq!(doc.id(), "abc123");
    }

    #[test]
    fn test_value_wire_shape() {
        assert_eq!(
            serde_json::to_value(Value::int(10)).unwrap(),
            json!({"integerValue": "10"})
        );
        assert_eq!(
            serde_json::to_value(Value::Null(())).unwrap(),
            json!({"nullValue": null})
        );
    }

    #[test]
    fn test_task_decodes_with_optionals_absent() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/users/u1/tasks/t9",
            "fields": {
                "title": {"stringValue": "Write docs"},
                "done": {"booleanValue": false},
                "target": {"integerValue": "10"}
            }
        }))
        .unwrap();
        let task = Task::from_doc(&doc).unwrap();
        assert_eq!(task.id, "t9");
        assert_eq!(task.kind, TaskKind::Classic);
        assert_eq!(task.target, 10);
        assert_eq!(task.deadline_id, None);
        assert_eq!(task.date, None);
    }

    #[test]
    fn test_task_null_parent_reads_as_none() {
        let doc: Document = serde_json::from_value(json!({
            "name": "u/tasks/t1",
            "fields": {
                "title": {"stringValue": "Orphan"},
                "kind": {"stringValue": "GRADUAL"},
                "deadlineId": {"nullValue": null}
            }
        }))
        .unwrap();
        let task = Task::from_doc(&doc).unwrap();
        assert_eq!(task.kind, TaskKind::Gradual);
        assert_eq!(task.deadline_id, None);
    }

    #[test]
    fn test_list_response_carries_page_token() {
        let list: ListResponse = serde_json::from_value(json!({
            "documents": [],
            "nextPageToken": "abc"
        }))
        .unwrap();
        assert_eq!(list.next_page_token.as_deref(), Some("abc"));

        let last: ListResponse = serde_json::from_value(json!({"documents": []})).unwrap();
        assert_eq!(last.next_page_token, None);
    }

    #[test]
    fn test_deadline_without_title_is_skipped() {
        let doc: Document = serde_json::from_value(json!({
            "name": "u/deadlines/d1",
            "fields": {"date": {"stringValue": "2025-06-01"}}
        }))
        .unwrap();
        assert!(Deadline::from_doc(&doc).is_none());
    }
}
