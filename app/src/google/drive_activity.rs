//! Google Drive Activity API v2 Client
//!
//! Queries the activity stream of a file or folder and renders each
//! activity's primary action through the `ActionDetail` sum type.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::{GoogleClient, ListField};
use crate::common::AppResult;

const DRIVE_ACTIVITY_API_BASE: &str = "https://driveactivity.googleapis.com/v2";
const ACTIVITIES: ListField = ListField::new("activities", "pageSize");

pub struct DriveActivityApi {
    client: GoogleClient,
}

super::google_api_wrapper!(DriveActivityApi);

/// What an activity query is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityScope {
    /// A single file or folder
    Item(String),
    /// Everything below a folder
    Ancestor(String),
    /// Everything visible to the user
    All,
}

impl DriveActivityApi {
    pub async fn query(
        &self,
        scope: &ActivityScope,
        filter: Option<&str>,
        max_results: Option<usize>,
    ) -> AppResult<Vec<Value>> {
        info!("Querying Drive activity: {:?}", scope);

        let mut body = json!({});
        match scope {
            ActivityScope::Item(id) => body["itemName"] = json!(item_name(id)),
            ActivityScope::Ancestor(id) => body["ancestorName"] = json!(item_name(id)),
            ActivityScope::All => {}
        }
        if let Some(filter) = filter {
            body["filter"] = json!(filter);
        }

        let url = format!("{}/activity:query", DRIVE_ACTIVITY_API_BASE);
        let activities = self
            .client
            .post_paginated(&url, &body, ACTIVITIES, max_results)
            .await?;

        debug!("Retrieved {} activities", activities.len());
        Ok(activities)
    }
}

fn item_name(id: &str) -> String {
    if id.starts_with("items/") {
        id.to_string()
    } else {
        format!("items/{}", id)
    }
}

/// How a created item came to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOrigin {
    New,
    Upload,
    Copy { original: Option<String> },
}

/// The primary action of a Drive activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDetail {
    Create { origin: CreateOrigin },
    Edit,
    Move { added_parents: Vec<String>, removed_parents: Vec<String> },
    Rename { old_title: String, new_title: String },
    Delete { kind: String },
    Restore { kind: String },
    PermissionChange { added: usize, removed: usize },
    Comment { kind: String },
    DlpChange { kind: String },
    Reference { kind: String },
    SettingsChange { changes: usize },
    AppliedLabelChange { changes: usize },
    Unknown(String),
}

impl ActionDetail {
    /// Decode an `ActionDetail` object, which carries exactly one of its
    /// variant keys (`{"rename": {...}}`, `{"edit": {}}`, ...).
    pub fn from_value(detail: &Value) -> Self {
        let Some((key, body)) = detail.as_object().and_then(|o| o.iter().next()) else {
            return ActionDetail::Unknown("empty".to_string());
        };

        match key.as_str() {
            "create" => {
                let origin = if body.get("upload").is_some() {
                    CreateOrigin::Upload
                } else if let Some(copy) = body.get("copy") {
                    CreateOrigin::Copy {
                        original: copy.pointer("/originalObject/driveItem").and_then(target_title),
                    }
                } else {
                    CreateOrigin::New
                };
                ActionDetail::Create { origin }
            }
            "edit" => ActionDetail::Edit,
            "move" => ActionDetail::Move {
                added_parents: parent_titles(body.get("addedParents")),
                removed_parents: parent_titles(body.get("removedParents")),
            },
            "rename" => ActionDetail::Rename {
                old_title: str_field(body, "oldTitle"),
                new_title: str_field(body, "newTitle"),
            },
            "delete" => ActionDetail::Delete { kind: str_field(body, "type") },
            "restore" => ActionDetail::Restore { kind: str_field(body, "type") },
            "permissionChange" => ActionDetail::PermissionChange {
                added: array_len(body.get("addedPermissions")),
                removed: array_len(body.get("removedPermissions")),
            },
            "comment" => {
                let kind = ["post", "assignment", "suggestion"]
                    .iter()
                    .find_map(|k| {
                        body.get(*k).map(|c| match c.get("subtype").and_then(|s| s.as_str()) {
                            Some(subtype) => format!("{}:{}", k, subtype),
                            None => k.to_string(),
                        })
                    })
                    .unwrap_or_else(|| "comment".to_string());
                ActionDetail::Comment { kind }
            }
            "dlpChange" => ActionDetail::DlpChange { kind: str_field(body, "type") },
            "reference" => ActionDetail::Reference { kind: str_field(body, "type") },
            "settingsChange" => ActionDetail::SettingsChange {
                changes: array_len(body.get("restrictionChanges")),
            },
            "appliedLabelChange" => ActionDetail::AppliedLabelChange {
                changes: array_len(body.get("changes")),
            },
            other => ActionDetail::Unknown(other.to_string()),
        }
    }

    /// Short machine-friendly name of the action
    pub fn kind(&self) -> &str {
        match self {
            ActionDetail::Create { .. } => "create",
            ActionDetail::Edit => "edit",
            ActionDetail::Move { .. } => "move",
            ActionDetail::Rename { .. } => "rename",
            ActionDetail::Delete { .. } => "delete",
            ActionDetail::Restore { .. } => "restore",
            ActionDetail::PermissionChange { .. } => "permission_change",
            ActionDetail::Comment { .. } => "comment",
            ActionDetail::DlpChange { .. } => "dlp_change",
            ActionDetail::Reference { .. } => "reference",
            ActionDetail::SettingsChange { .. } => "settings_change",
            ActionDetail::AppliedLabelChange { .. } => "applied_label_change",
            ActionDetail::Unknown(kind) => kind,
        }
    }

    /// One-line human description
    pub fn describe(&self) -> String {
        match self {
            ActionDetail::Create { origin: CreateOrigin::New } => "created".to_string(),
            ActionDetail::Create { origin: CreateOrigin::Upload } => "uploaded".to_string(),
            ActionDetail::Create { origin: CreateOrigin::Copy { original: Some(t) } } => {
                format!("copied from \"{}\"", t)
            }
            ActionDetail::Create { origin: CreateOrigin::Copy { original: None } } => "copied".to_string(),
            ActionDetail::Edit => "edited".to_string(),
            ActionDetail::Move { added_parents, removed_parents } => format!(
                "moved from [{}] to [{}]",
                removed_parents.join(", "),
                added_parents.join(", ")
            ),
            ActionDetail::Rename { old_title, new_title } => {
                format!("renamed \"{}\" to \"{}\"", old_title, new_title)
            }
            ActionDetail::Delete { kind } => format!("deleted ({})", kind),
            ActionDetail::Restore { kind } => format!("restored ({})", kind),
            ActionDetail::PermissionChange { added, removed } => {
                format!("sharing changed: {} added, {} removed", added, removed)
            }
            ActionDetail::Comment { kind } => format!("comment {}", kind),
            ActionDetail::DlpChange { kind } => format!("DLP {}", kind),
            ActionDetail::Reference { kind } => format!("reference {}", kind),
            ActionDetail::SettingsChange { changes } => format!("{} setting(s) changed", changes),
            ActionDetail::AppliedLabelChange { changes } => format!("{} label change(s)", changes),
            ActionDetail::Unknown(kind) => format!("unrecognized action ({})", kind),
        }
    }
}

/// Simplified view of one activity
#[derive(Debug, Clone, Serialize)]
pub struct ActivitySummary {
    pub time: Option<String>,
    pub action: String,
    pub detail: String,
    pub actors: Vec<String>,
    pub targets: Vec<String>,
}

impl ActivitySummary {
    pub fn from_activity(activity: &Value) -> Self {
        let action = activity
            .get("primaryActionDetail")
            .map(ActionDetail::from_value)
            .unwrap_or_else(|| ActionDetail::Unknown("missing".to_string()));

        let time = activity
            .get("timestamp")
            .or_else(|| activity.pointer("/timeRange/endTime"))
            .and_then(|v| v.as_str())
            .map(String::from);

        let actors = activity
            .get("actors")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(actor_label).collect())
            .unwrap_or_default();

        let targets = activity
            .get("targets")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|t| {
                        t.get("driveItem")
                            .or_else(|| t.get("drive"))
                            .or_else(|| t.pointer("/fileComment/parent"))
                            .and_then(target_title)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            time,
            action: action.kind().to_string(),
            detail: action.describe(),
            actors,
            targets,
        }
    }
}

fn actor_label(actor: &Value) -> String {
    if let Some(known) = actor.pointer("/user/knownUser") {
        if known.get("isCurrentUser").and_then(|v| v.as_bool()) == Some(true) {
            return "me".to_string();
        }
        return known
            .get("personName")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown user")
            .to_string();
    }

    ["user", "anonymous", "impersonation", "system", "administrator"]
        .iter()
        .find(|k| actor.get(**k).is_some())
        .map(|k| k.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn target_title(item: &Value) -> Option<String> {
    item.get("title")
        .or_else(|| item.get("name"))
        .and_then(|v| v.as_str())
        .map(String::from)
}

fn parent_titles(parents: Option<&Value>) -> Vec<String> {
    parents
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|p| p.get("driveItem").or_else(|| p.get("drive")).and_then(target_title))
                .collect()
        })
        .unwrap_or_default()
}

fn str_field(body: &Value, key: &str) -> String {
    body.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("TYPE_UNSPECIFIED")
        .to_string()
}

fn array_len(v: Option<&Value>) -> usize {
    v.and_then(|v| v.as_array()).map_or(0, Vec::len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_each_variant() {
        assert_eq!(
            ActionDetail::from_value(&json!({"create": {"upload": {}}})),
            ActionDetail::Create { origin: CreateOrigin::Upload }
        );
        assert_eq!(
            ActionDetail::from_value(&json!({"create": {"copy": {"originalObject": {"driveItem": {"title": "Plan"}}}}})),
            ActionDetail::Create { origin: CreateOrigin::Copy { original: Some("Plan".to_string()) } }
        );
        assert_eq!(ActionDetail::from_value(&json!({"edit": {}})), ActionDetail::Edit);
        assert_eq!(
            ActionDetail::from_value(&json!({"rename": {"oldTitle": "a", "newTitle": "b"}})),
            ActionDetail::Rename { old_title: "a".to_string(), new_title: "b".to_string() }
        );
        assert_eq!(
            ActionDetail::from_value(&json!({"delete": {"type": "TRASH"}})),
            ActionDetail::Delete { kind: "TRASH".to_string() }
        );
        assert_eq!(
            ActionDetail::from_value(&json!({"permissionChange": {"addedPermissions": [{}, {}]}})),
            ActionDetail::PermissionChange { added: 2, removed: 0 }
        );
        assert_eq!(
            ActionDetail::from_value(&json!({"comment": {"post": {"subtype": "ADDED"}}})),
            ActionDetail::Comment { kind: "post:ADDED".to_string() }
        );
        assert_eq!(
            ActionDetail::from_value(&json!({"somethingNew": {}})),
            ActionDetail::Unknown("somethingNew".to_string())
        );
    }

    #[test]
    fn test_move_description() {
        let detail = ActionDetail::from_value(&json!({"move": {
            "addedParents": [{"driveItem": {"name": "items/2", "title": "Archive"}}],
            "removedParents": [{"driveItem": {"name": "items/1", "title": "Inbox"}}]
        }}));
        assert_eq!(detail.kind(), "move");
        assert_eq!(detail.describe(), "moved from [Inbox] to [Archive]");
    }

    #[test]
    fn test_activity_summary() {
        let activity = json!({
            "primaryActionDetail": {"edit": {}},
            "actors": [
                {"user": {"knownUser": {"personName": "people/123", "isCurrentUser": true}}},
                {"user": {"knownUser": {"personName": "people/456"}}},
                {"administrator": {}}
            ],
            "targets": [{"driveItem": {"name": "items/abc", "title": "Budget"}}],
            "timestamp": "2026-03-01T10:00:00Z"
        });

        let summary = ActivitySummary::from_activity(&activity);
        assert_eq!(summary.action, "edit");
        assert_eq!(summary.detail, "edited");
        assert_eq!(summary.actors, vec!["me", "people/456", "administrator"]);
        assert_eq!(summary.targets, vec!["Budget"]);
        assert_eq!(summary.time.as_deref(), Some("2026-03-01T10:00:00Z"));
    }

    #[test]
    fn test_item_name() {
        assert_eq!(item_name("abc"), "items/abc");
        assert_eq!(item_name("items/abc"), "items/abc");
    }
}
