//! Google Keep Handler

use serde_json::{json, Value};

use super::common::{done, list_response, optional_string, optional_string_array, optional_usize, require_string};
use crate::commands::schema::{CommandSpec, ParamSpec};
use crate::common::{AppError, AppResult};
use crate::context::AppContext;
use crate::google::keep::NoteBody;
use crate::google::KeepApi;

const NOTE: ParamSpec = ParamSpec::arg("note", "Note name (notes/ID) or ID");

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        namespace: "keep",
        action: "list",
        about: "List notes",
        params: &[
            ParamSpec::text("filter", "List filter, e.g. \"trashed=true\""),
            ParamSpec::number("max-results", "Maximum number of notes"),
        ],
    },
    CommandSpec {
        namespace: "keep",
        action: "get",
        about: "Show a note",
        params: &[NOTE],
    },
    CommandSpec {
        namespace: "keep",
        action: "create",
        about: "Create a text note or a checklist",
        params: &[
            ParamSpec::text("title", "Note title"),
            ParamSpec::text("text", "Note text"),
            ParamSpec::list("items", "Checklist items"),
        ],
    },
    CommandSpec {
        namespace: "keep",
        action: "delete",
        about: "Delete a note",
        params: &[NOTE],
    },
];

/// Handle Google Keep commands
pub async fn handle(ctx: &AppContext, action: &str, params: &Value) -> AppResult<Value> {
    match action {
        "list" => {
            let keep = KeepApi::new(ctx.google().await?);
            let notes = keep
                .list_notes(optional_string(params, "filter"), optional_usize(params, "max-results"))
                .await?;
            Ok(list_response("notes", notes.iter().map(summarize_note).collect()))
        }
        "get" => {
            let keep = KeepApi::new(ctx.google().await?);
            let note = keep.get_note(require_string(params, "note")?).await?;
            Ok(summarize_note(&note))
        }
        "create" => {
            let body = note_body(params)?;
            let keep = KeepApi::new(ctx.google().await?);
            let note = keep.create_note(optional_string(params, "title"), &body).await?;
            Ok(summarize_note(&note))
        }
        "delete" => {
            let name = require_string(params, "note")?;
            let keep = KeepApi::new(ctx.google().await?);
            keep.delete_note(name).await?;
            Ok(done(json!({ "note": name })))
        }
        _ => Err(AppError::not_found(format!("unknown command: keep {}", action))),
    }
}

fn note_body(params: &Value) -> AppResult<NoteBody> {
    let text = optional_string(params, "text");
    let items = optional_string_array(params, "items").filter(|items| !items.is_empty());
    match (text, items) {
        (Some(_), Some(_)) => Err(AppError::invalid_input("--text and --items are mutually exclusive")),
        (Some(text), None) => Ok(NoteBody::Text(text.to_string())),
        (None, Some(items)) => Ok(NoteBody::Checklist(items)),
        (None, None) => Err(AppError::invalid_input("a note needs --text or --items")),
    }
}

fn summarize_note(note: &Value) -> Value {
    let body = note.pointer("/body/text/text").cloned().unwrap_or(Value::Null);
    let items: Vec<Value> = note
        .pointer("/body/list/listItems")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .map(|item| {
                    json!({
                        "text": item.pointer("/text/text"),
                        "checked": item.get("checked").and_then(|v| v.as_bool()).unwrap_or(false),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    json!({
        "name": note.get("name"),
        "title": note.get("title"),
        "text": body,
        "items": items,
        "trashed": note.get("trashed").and_then(|v| v.as_bool()).unwrap_or(false),
        "updateTime": note.get("updateTime"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_body_is_text_or_items() {
        assert_eq!(
            note_body(&json!({"text": "milk"})).unwrap(),
            NoteBody::Text("milk".to_string())
        );
        assert_eq!(
            note_body(&json!({"items": ["eggs"]})).unwrap(),
            NoteBody::Checklist(vec!["eggs".to_string()])
        );
        assert!(note_body(&json!({"text": "a", "items": ["b"]})).is_err());
        assert!(note_body(&json!({"items": []})).is_err());
    }

    #[test]
    fn test_summarize_checklist() {
        let note = json!({
            "name": "notes/1",
            "title": "Shopping",
            "body": {"list": {"listItems": [{"text": {"text": "eggs"}, "checked": true}]}}
        });
        let summary = summarize_note(&note);
        assert_eq!(summary["text"], Value::Null);
        assert_eq!(summary["items"][0], json!({"text": "eggs", "checked": true}));
        assert_eq!(summary["trashed"], false);
    }
}
