//! Google Drive Handler

use serde_json::{json, Value};

use super::common::{
    bool_with_default, done, list_response, optional_string, optional_usize, require_string, string_with_default,
};
use crate::commands::schema::{CommandSpec, ParamSpec};
use crate::common::{AppError, AppResult};
use crate::context::AppContext;
use crate::google::common::pick;
use crate::google::drive::{quote_query_value, ShareRequest};
use crate::google::DriveApi;

const ID: ParamSpec = ParamSpec::arg("id", "File or folder ID");
const MAX_RESULTS: ParamSpec = ParamSpec::number("max-results", "Maximum number of files").default("50");

const ROLES: &[&str] = &["reader", "commenter", "writer", "fileOrganizer", "organizer", "owner"];
const GRANTEE_TYPES: &[&str] = &["user", "group", "domain", "anyone"];

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        namespace: "drive",
        action: "list",
        about: "List files, optionally inside a folder",
        params: &[
            ParamSpec::text("folder", "Only files directly inside this folder"),
            ParamSpec::text("query", "Extra Drive query clause, e.g. \"mimeType = 'application/pdf'\""),
            MAX_RESULTS,
            ParamSpec::flag("trashed", "List trashed files instead"),
        ],
    },
    CommandSpec {
        namespace: "drive",
        action: "search",
        about: "Full-text search",
        params: &[ParamSpec::arg("text", "Text to search for"), MAX_RESULTS],
    },
    CommandSpec {
        namespace: "drive",
        action: "get",
        about: "Show file metadata",
        params: &[ID],
    },
    CommandSpec {
        namespace: "drive",
        action: "mkdir",
        about: "Create a folder",
        params: &[
            ParamSpec::arg("name", "Folder name"),
            ParamSpec::text("parent", "Parent folder ID"),
        ],
    },
    CommandSpec {
        namespace: "drive",
        action: "rename",
        about: "Rename a file or folder",
        params: &[ID, ParamSpec::arg("name", "New name")],
    },
    CommandSpec {
        namespace: "drive",
        action: "move",
        about: "Move a file into another folder",
        params: &[ID, ParamSpec::text("to", "Destination folder ID").required()],
    },
    CommandSpec {
        namespace: "drive",
        action: "delete",
        about: "Move a file to trash, or delete it permanently",
        params: &[ID, ParamSpec::flag("permanent", "Skip the trash")],
    },
    CommandSpec {
        namespace: "drive",
        action: "share",
        about: "Grant access to a file",
        params: &[
            ID,
            ParamSpec::text("email", "User or group email"),
            ParamSpec::text("role", "reader, commenter, writer or owner").default("reader"),
            ParamSpec::text("type", "user, group, domain or anyone").default("user"),
            ParamSpec::text("domain", "Domain for --type domain"),
            ParamSpec::flag("notify", "Send a notification email"),
        ],
    },
    CommandSpec {
        namespace: "drive",
        action: "permissions",
        about: "List who has access to a file",
        params: &[ID],
    },
];

/// Handle Drive-related commands
pub async fn handle(ctx: &AppContext, action: &str, params: &Value) -> AppResult<Value> {
    let drive = DriveApi::new(ctx.google().await?);

    match action {
        "list" => {
            let query = list_query(
                optional_string(params, "folder"),
                optional_string(params, "query"),
                bool_with_default(params, "trashed", false),
            );
            let files = drive.list_files(&query, optional_usize(params, "max-results")).await?;
            Ok(list_response("files", files.iter().map(summarize_file).collect()))
        }
        "search" => {
            let text = require_string(params, "text")?;
            let files = drive
                .list_files(&search_query(text), optional_usize(params, "max-results"))
                .await?;
            Ok(list_response("files", files.iter().map(summarize_file).collect()))
        }
        "get" => {
            let file = drive.get_file(require_string(params, "id")?).await?;
            Ok(summarize_file(&file))
        }
        "mkdir" => {
            let name = require_string(params, "name")?;
            let folder = drive.create_folder(name, optional_string(params, "parent")).await?;
            Ok(summarize_file(&folder))
        }
        "rename" => {
            let id = require_string(params, "id")?;
            let name = require_string(params, "name")?;
            let file = drive.update_file(id, &json!({ "name": name }), None, None).await?;
            Ok(summarize_file(&file))
        }
        "move" => handle_move(params, &drive).await,
        "delete" => {
            let id = require_string(params, "id")?;
            if bool_with_default(params, "permanent", false) {
                drive.delete_file(id).await?;
                Ok(done(json!({ "id": id, "deleted": true })))
            } else {
                let file = drive.update_file(id, &json!({ "trashed": true }), None, None).await?;
                Ok(done(json!({ "id": id, "trashed": file.get("trashed") })))
            }
        }
        "share" => {
            let id = require_string(params, "id")?;
            let share = share_request(params)?;
            let permission = drive.create_permission(id, &share).await?;
            Ok(summarize_permission(&permission))
        }
        "permissions" => {
            let permissions = drive.list_permissions(require_string(params, "id")?).await?;
            Ok(list_response(
                "permissions",
                permissions.iter().map(summarize_permission).collect(),
            ))
        }
        _ => Err(AppError::not_found(format!("unknown command: drive {}", action))),
    }
}

async fn handle_move(params: &Value, drive: &DriveApi) -> AppResult<Value> {
    let id = require_string(params, "id")?;
    let to = require_string(params, "to")?;

    let current = drive.get_file(id).await?;
    let previous: Vec<&str> = current
        .get("parents")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|p| p.as_str()).collect())
        .unwrap_or_default();
    let remove = parents_to_remove(&previous, to);

    let file = drive
        .update_file(id, &json!({}), Some(to), remove.as_deref())
        .await?;
    Ok(summarize_file(&file))
}

/// Every current parent except the destination, comma-joined for `removeParents`
fn parents_to_remove(previous: &[&str], to: &str) -> Option<String> {
    let remove: Vec<&str> = previous.iter().copied().filter(|p| *p != to).collect();
    if remove.is_empty() {
        None
    } else {
        Some(remove.join(","))
    }
}

fn list_query(folder: Option<&str>, extra: Option<&str>, trashed: bool) -> String {
    let mut clauses = vec![format!("trashed = {}", trashed)];
    if let Some(folder) = folder {
        clauses.push(format!("{} in parents", quote_query_value(folder)));
    }
    if let Some(extra) = extra.filter(|q| !q.trim().is_empty()) {
        clauses.push(format!("({})", extra));
    }
    clauses.join(" and ")
}

fn search_query(text: &str) -> String {
    format!("fullText contains {} and trashed = false", quote_query_value(text))
}

fn share_request(params: &Value) -> AppResult<ShareRequest> {
    let role = string_with_default(params, "role", "reader");
    let kind = string_with_default(params, "type", "user");
    if !ROLES.contains(&role) {
        return Err(AppError::invalid_input(format!("invalid role: {}", role)));
    }
    if !GRANTEE_TYPES.contains(&kind) {
        return Err(AppError::invalid_input(format!("invalid type: {}", kind)));
    }

    let email = optional_string(params, "email").map(String::from);
    let domain = optional_string(params, "domain").map(String::from);
    match kind {
        "user" | "group" if email.is_none() => return Err(AppError::missing_param("email")),
        "domain" if domain.is_none() => return Err(AppError::missing_param("domain")),
        _ => {}
    }

    Ok(ShareRequest {
        role: role.to_string(),
        kind: kind.to_string(),
        email,
        domain,
        notify: bool_with_default(params, "notify", false),
    })
}

fn summarize_file(file: &Value) -> Value {
    pick(
        file,
        &["id", "name", "mimeType", "modifiedTime", "size", "parents", "webViewLink"],
    )
}

fn summarize_permission(permission: &Value) -> Value {
    pick(permission, &["id", "type", "role", "emailAddress", "domain"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query() {
        assert_eq!(list_query(None, None, false), "trashed = false");
        assert_eq!(
            list_query(Some("f1"), Some("mimeType = 'application/pdf'"), false),
            "trashed = false and 'f1' in parents and (mimeType = 'application/pdf')"
        );
        assert_eq!(list_query(None, Some("  "), true), "trashed = true");
    }

    #[test]
    fn test_move_keeps_destination_parent() {
        assert_eq!(parents_to_remove(&["a", "b"], "c"), Some("a,b".to_string()));
        assert_eq!(parents_to_remove(&["a", "dest"], "dest"), Some("a".to_string()));
        assert_eq!(parents_to_remove(&["dest"], "dest"), None);
        assert_eq!(parents_to_remove(&[], "dest"), None);
    }

    #[test]
    fn test_search_query_escapes_text() {
        assert_eq!(
            search_query("it's a\\b"),
            "fullText contains 'it\\'s a\\\\b' and trashed = false"
        );
    }

    #[test]
    fn test_summarize_file_drops_absent_fields() {
        let file = json!({"id": "f1", "name": "Notes", "mimeType": "text/plain", "trashed": false});
        assert_eq!(
            summarize_file(&file),
            json!({"id": "f1", "name": "Notes", "mimeType": "text/plain"})
        );
    }

    #[test]
    fn test_share_request_validation() {
        let share = share_request(&json!({"email": "bob@example.com", "role": "writer"})).unwrap();
        assert_eq!((share.role.as_str(), share.kind.as_str()), ("writer", "user"));
        assert!(!share.notify);

        assert!(share_request(&json!({"role": "writer"})).is_err());
        assert!(share_request(&json!({"type": "domain"})).is_err());
        assert!(share_request(&json!({"type": "anyone", "role": "boss"})).is_err());
        assert!(share_request(&json!({"type": "anyone"})).is_ok());
    }
}
