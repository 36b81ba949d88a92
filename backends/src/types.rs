use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entity families stored as sheets in the workbook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Task,
    Project,
    Area,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Task, EntityKind::Project, EntityKind::Area];

    /// Sheet name in the workbook. Doubles as the URL path segment the
    /// gateway accepts for this kind.
    pub const fn sheet(&self) -> &'static str {
        match self {
            EntityKind::Task => "tasks",
            EntityKind::Project => "projects",
            EntityKind::Area => "areas",
        }
    }

    pub fn from_path(segment: &str) -> Option<EntityKind> {
        match segment {
            "tasks" => Some(EntityKind::Task),
            "projects" => Some(EntityKind::Project),
            "areas" => Some(EntityKind::Area),
            _ => None,
        }
    }
}

/// One row of a sheet. `id` is the row key; the remaining columns ride
/// along untouched so the edge can evolve without gateway changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Combined contents of the workbook, served by the data.load read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<EntityRecord>,
    #[serde(default)]
    pub projects: Vec<EntityRecord>,
    #[serde(default)]
    pub areas: Vec<EntityRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePage {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityDraft {
    pub kind: EntityKind,
    pub fields: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityUpdate {
    pub kind: EntityKind,
    pub id: String,
    pub fields: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageRequest {
    pub page_token: Option<String>,
    pub page_size: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectFilesQuery {
    pub project_id: String,
    pub page: PageRequest,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriveListQuery {
    pub page: PageRequest,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DriveSearchQuery {
    pub term: String,
    pub page: PageRequest,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttachFileRequest {
    pub project_id: String,
    pub name: String,
    pub mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_maps_path_segments() {
        assert_eq!(EntityKind::from_path("tasks"), Some(EntityKind::Task));
        assert_eq!(EntityKind::from_path("projects"), Some(EntityKind::Project));
        assert_eq!(EntityKind::from_path("areas"), Some(EntityKind::Area));
        assert_eq!(EntityKind::from_path("drive"), None);
        assert_eq!(EntityKind::from_path("Tasks"), None);
    }

    #[test]
    fn entity_record_keeps_unknown_columns() {
        let record: EntityRecord = serde_json::from_str(
            r#"{"id": "t1", "title": "Buy milk", "done": false, "priority": 2}"#,
        )
        .unwrap();
        assert_eq!(record.id, "t1");
        assert_eq!(record.fields["title"], "Buy milk");
        assert_eq!(record.fields["priority"], 2);

        let rendered = serde_json::to_value(&record).unwrap();
        assert_eq!(rendered["id"], "t1");
        assert_eq!(rendered["done"], false);
    }

    #[test]
    fn drive_file_uses_camel_case_wire_names() {
        let file: DriveFile = serde_json::from_str(
            r#"{"id": "f1", "name": "notes.txt", "mimeType": "text/plain", "webViewLink": "https://drive.example/f1"}"#,
        )
        .unwrap();
        assert_eq!(file.mime_type.as_deref(), Some("text/plain"));
        assert_eq!(file.web_view_link.as_deref(), Some("https://drive.example/f1"));
        assert_eq!(file.modified_time, None);
    }
}
