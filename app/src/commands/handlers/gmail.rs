//! Gmail Handler
//!
//! Message search and reading, sending, label management, and bulk archive.

use std::future::Future;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::common::{
    bool_with_default, done, list_response, optional_string, optional_usize, require_string,
    string_array,
};
use crate::commands::schema::{CommandSpec, ParamSpec};
use crate::common::{AppError, AppResult};
use crate::context::AppContext;
use crate::google::gmail::{extract_body, message_header, resolve_label_ids, OutgoingMessage, SUMMARY_HEADERS};
use crate::google::GmailApi;

const ID: ParamSpec = ParamSpec::arg("id", "Message ID");
const MAX_RESULTS: ParamSpec = ParamSpec::number("max-results", "Maximum number of messages").default("20");

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        namespace: "gmail",
        action: "search",
        about: "Search messages and show their headers",
        params: &[
            ParamSpec::text("query", "Gmail search query, e.g. \"from:alice is:unread\""),
            ParamSpec::list("label", "Only messages with these labels (names or IDs)"),
            MAX_RESULTS,
        ],
    },
    CommandSpec {
        namespace: "gmail",
        action: "get",
        about: "Show a message with its decoded body",
        params: &[ID],
    },
    CommandSpec {
        namespace: "gmail",
        action: "thread",
        about: "Show every message in a thread",
        params: &[ParamSpec::arg("id", "Thread ID")],
    },
    CommandSpec {
        namespace: "gmail",
        action: "send",
        about: "Send a plain-text email",
        params: &[
            ParamSpec::list("to", "Recipients").required(),
            ParamSpec::text("subject", "Subject line").required(),
            ParamSpec::text("body", "Message body").required(),
            ParamSpec::list("cc", "Cc recipients"),
            ParamSpec::list("bcc", "Bcc recipients"),
            ParamSpec::text("thread-id", "Reply within this thread"),
        ],
    },
    CommandSpec {
        namespace: "gmail",
        action: "labels",
        about: "List labels",
        params: &[],
    },
    CommandSpec {
        namespace: "gmail",
        action: "label-create",
        about: "Create a label",
        params: &[ParamSpec::arg("name", "Label name")],
    },
    CommandSpec {
        namespace: "gmail",
        action: "label-delete",
        about: "Delete a label",
        params: &[ParamSpec::arg("label", "Label name or ID")],
    },
    CommandSpec {
        namespace: "gmail",
        action: "modify",
        about: "Add or remove labels on a message",
        params: &[
            ID,
            ParamSpec::list("add", "Labels to add (names or IDs)"),
            ParamSpec::list("remove", "Labels to remove (names or IDs)"),
        ],
    },
    CommandSpec {
        namespace: "gmail",
        action: "trash",
        about: "Move a message to trash",
        params: &[ID],
    },
    CommandSpec {
        namespace: "gmail",
        action: "untrash",
        about: "Restore a message from trash",
        params: &[ID],
    },
    CommandSpec {
        namespace: "gmail",
        action: "archive",
        about: "Remove messages or threads from the inbox",
        params: &[
            ParamSpec::list("ids", "Message (or thread) IDs"),
            ParamSpec::text("query", "Archive everything matching this query"),
            ParamSpec::flag("threads", "Archive whole threads"),
            ParamSpec::number("max-results", "Maximum number of query matches").default("100"),
        ],
    },
];

/// Handle Gmail-related commands
pub async fn handle(ctx: &AppContext, action: &str, params: &Value) -> AppResult<Value> {
    let gmail = GmailApi::new(ctx.google().await?);

    match action {
        "search" => handle_search(params, &gmail).await,
        "get" => handle_get(params, &gmail).await,
        "thread" => handle_thread(params, &gmail).await,
        "send" => handle_send(params, &gmail).await,
        "labels" => handle_labels(&gmail).await,
        "label-create" => handle_label_create(params, &gmail).await,
        "label-delete" => handle_label_delete(params, &gmail).await,
        "modify" => handle_modify(params, &gmail).await,
        "trash" => {
            let id = require_string(params, "id")?;
            let message = gmail.trash_message(id).await?;
            Ok(label_state(&message))
        }
        "untrash" => {
            let id = require_string(params, "id")?;
            let message = gmail.untrash_message(id).await?;
            Ok(label_state(&message))
        }
        "archive" => handle_archive(params, &gmail).await,
        _ => Err(AppError::not_found(format!("unknown command: gmail {}", action))),
    }
}

/// Resolve label names to IDs, fetching the label list only when needed
async fn label_ids(gmail: &GmailApi, names: &[String]) -> AppResult<Vec<String>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let labels = gmail.list_labels().await?;
    resolve_label_ids(&labels, names)
}

async fn handle_search(params: &Value, gmail: &GmailApi) -> AppResult<Value> {
    let query = optional_string(params, "query");
    let labels = label_ids(gmail, &string_array(params, "label")).await?;
    let max_results = optional_usize(params, "max-results");

    let stubs = gmail.list_messages(query, &labels, max_results).await?;

    let mut messages = Vec::with_capacity(stubs.len());
    for stub in &stubs {
        let Some(id) = stub.get("id").and_then(|v| v.as_str()) else {
            continue;
        };
        let message = gmail.get_message(id, "metadata", SUMMARY_HEADERS).await?;
        messages.push(summarize_message(&message));
    }

    Ok(list_response("messages", messages))
}

async fn handle_get(params: &Value, gmail: &GmailApi) -> AppResult<Value> {
    let id = require_string(params, "id")?;
    let message = gmail.get_message(id, "full", &[]).await?;

    let mut out = summarize_message(&message);
    out["cc"] = json!(message_header(&message, "Cc"));
    out["body"] = json!(message.get("payload").and_then(extract_body));
    Ok(out)
}

async fn handle_thread(params: &Value, gmail: &GmailApi) -> AppResult<Value> {
    let id = require_string(params, "id")?;
    let thread = gmail.get_thread(id, "metadata", SUMMARY_HEADERS).await?;

    let messages: Vec<Value> = thread
        .get("messages")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(summarize_message).collect())
        .unwrap_or_default();

    Ok(json!({
        "id": thread.get("id"),
        "messageCount": messages.len(),
        "messages": messages,
    }))
}

async fn handle_send(params: &Value, gmail: &GmailApi) -> AppResult<Value> {
    let message = OutgoingMessage {
        to: string_array(params, "to"),
        cc: string_array(params, "cc"),
        bcc: string_array(params, "bcc"),
        subject: require_string(params, "subject")?.to_string(),
        body: require_string(params, "body")?.to_string(),
        thread_id: optional_string(params, "thread-id").map(String::from),
    };
    if message.to.is_empty() {
        return Err(AppError::missing_param("to"));
    }

    let sent = gmail.send_message(&message).await?;
    Ok(json!({
        "id": sent.get("id"),
        "threadId": sent.get("threadId"),
        "labelIds": sent.get("labelIds"),
    }))
}

async fn handle_labels(gmail: &GmailApi) -> AppResult<Value> {
    let labels = gmail
        .list_labels()
        .await?
        .iter()
        .map(|l| json!({ "id": l.get("id"), "name": l.get("name"), "type": l.get("type") }))
        .collect();
    Ok(list_response("labels", labels))
}

async fn handle_label_create(params: &Value, gmail: &GmailApi) -> AppResult<Value> {
    let name = require_string(params, "name")?;
    let label = gmail.create_label(name).await?;
    Ok(json!({ "id": label.get("id"), "name": label.get("name") }))
}

async fn handle_label_delete(params: &Value, gmail: &GmailApi) -> AppResult<Value> {
    let label = require_string(params, "label")?;
    let ids = label_ids(gmail, &[label.to_string()]).await?;
    for id in &ids {
        gmail.delete_label(id).await?;
    }
    Ok(done(json!({ "deleted": ids })))
}

async fn handle_modify(params: &Value, gmail: &GmailApi) -> AppResult<Value> {
    let id = require_string(params, "id")?;
    let add = string_array(params, "add");
    let remove = string_array(params, "remove");
    if add.is_empty() && remove.is_empty() {
        return Err(AppError::invalid_input("nothing to do: pass --add and/or --remove"));
    }

    let mut names = add.clone();
    names.extend(remove.iter().cloned());
    let resolved = label_ids(gmail, &names).await?;
    let (add_ids, remove_ids) = resolved.split_at(add.len());

    let message = gmail.modify_message(id, add_ids, remove_ids).await?;
    Ok(label_state(&message))
}

async fn handle_archive(params: &Value, gmail: &GmailApi) -> AppResult<Value> {
    let threads = bool_with_default(params, "threads", false);
    let mut ids = string_array(params, "ids");

    if let Some(query) = optional_string(params, "query") {
        let matches = gmail
            .list_messages(Some(query), &[], optional_usize(params, "max-results"))
            .await?;
        ids.extend(archive_targets(&matches, threads));
    }
    dedup_in_order(&mut ids);

    if ids.is_empty() {
        return Err(AppError::invalid_input("nothing to archive: pass --ids or a --query that matches"));
    }

    info!("Archiving {} {}", ids.len(), if threads { "thread(s)" } else { "message(s)" });
    let inbox = vec!["INBOX".to_string()];
    let tally = archive_each(&ids, |id| {
        let inbox = &inbox;
        async move {
            if threads {
                gmail.modify_thread(&id, &[], inbox).await
            } else {
                gmail.modify_message(&id, &[], inbox).await
            }
        }
    })
    .await;

    serde_json::to_value(tally).map_err(|e| AppError::internal(e.to_string()))
}

#[derive(Debug, Default, Serialize)]
pub struct ArchiveTally {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<ArchiveFailure>,
}

#[derive(Debug, Serialize)]
pub struct ArchiveFailure {
    pub id: String,
    pub error: String,
}

/// Apply `op` to each ID in turn, recording failures instead of stopping
async fn archive_each<F, Fut>(ids: &[String], mut op: F) -> ArchiveTally
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<Value>>,
{
    let mut tally = ArchiveTally::default();
    for id in ids {
        match op(id.clone()).await {
            Ok(_) => tally.succeeded += 1,
            Err(e) => {
                warn!("Failed to archive {}: {}", id, e);
                tally.failed += 1;
                tally.failures.push(ArchiveFailure {
                    id: id.clone(),
                    error: e.message,
                });
            }
        }
    }
    tally
}

/// Message IDs, or distinct thread IDs, from a message list
fn archive_targets(messages: &[Value], threads: bool) -> Vec<String> {
    let key = if threads { "threadId" } else { "id" };
    let mut ids: Vec<String> = messages
        .iter()
        .filter_map(|m| m.get(key).and_then(|v| v.as_str()).map(String::from))
        .collect();
    dedup_in_order(&mut ids);
    ids
}

fn dedup_in_order(ids: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

fn summarize_message(message: &Value) -> Value {
    json!({
        "id": message.get("id"),
        "threadId": message.get("threadId"),
        "from": message_header(message, "From"),
        "to": message_header(message, "To"),
        "subject": message_header(message, "Subject"),
        "date": message_header(message, "Date"),
        "snippet": message.get("snippet"),
        "labelIds": message.get("labelIds"),
    })
}

fn label_state(message: &Value) -> Value {
    json!({ "id": message.get("id"), "labelIds": message.get("labelIds") })
}
