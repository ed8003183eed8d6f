//! Gmail API v1 Client
//!
//! Provides methods for interacting with Gmail API:
//! - List/search messages and fetch messages or threads
//! - Send emails
//! - Manage labels and message/thread label state
//!
//! Also hosts the label-name-to-ID resolution and MIME body decoding used by
//! the gmail commands.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::{GoogleClient, ListField};
use super::common::{extract_array, segment};
use crate::common::{AppError, AppResult};

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";
const MESSAGES: ListField = ListField::new("messages", "maxResults");

/// Headers requested when only a summary of a message is needed
pub const SUMMARY_HEADERS: &[&str] = &["From", "To", "Subject", "Date"];

pub struct GmailApi {
    client: GoogleClient,
}

super::google_api_wrapper!(GmailApi);

/// A message to send
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub thread_id: Option<String>,
}

impl GmailApi {
    /// List messages matching a query
    ///
    /// # Arguments
    /// * `query` - Gmail search query (same syntax as web UI)
    /// * `label_ids` - Filter by label IDs (e.g., ["INBOX", "UNREAD"])
    /// * `max_results` - Maximum number of messages to return
    ///
    /// # Returns
    /// Array of message stubs with id and threadId
    pub async fn list_messages(
        &self,
        query: Option<&str>,
        label_ids: &[String],
        max_results: Option<usize>,
    ) -> AppResult<Vec<Value>> {
        info!("Listing Gmail messages");

        let mut query_params = vec![];
        if let Some(q) = query {
            query_params.push(("q", q.to_string()));
        }
        for label in label_ids {
            query_params.push(("labelIds", label.clone()));
        }

        let url = format!("{}/users/me/messages", GMAIL_API_BASE);
        let messages = self
            .client
            .get_paginated(&url, &query_params, MESSAGES, max_results)
            .await?;

        debug!("Retrieved {} messages", messages.len());
        Ok(messages)
    }

    /// Get a message by ID
    ///
    /// `format` is one of "full", "metadata", "minimal", "raw". With
    /// "metadata", `headers` limits which headers come back.
    pub async fn get_message(&self, id: &str, format: &str, headers: &[&str]) -> AppResult<Value> {
        debug!("Fetching Gmail message: {}", id);

        let mut query_params = vec![("format", format.to_string())];
        for header in headers {
            query_params.push(("metadataHeaders", header.to_string()));
        }

        let url = format!("{}/users/me/messages/{}", GMAIL_API_BASE, segment(id));
        self.client.get(&url, &query_params).await
    }

    /// Get a thread with all of its messages
    pub async fn get_thread(&self, id: &str, format: &str, headers: &[&str]) -> AppResult<Value> {
        info!("Fetching Gmail thread: {}", id);

        let mut query_params = vec![("format", format.to_string())];
        for header in headers {
            query_params.push(("metadataHeaders", header.to_string()));
        }

        let url = format!("{}/users/me/threads/{}", GMAIL_API_BASE, segment(id));
        self.client.get(&url, &query_params).await
    }

    /// Send an email
    ///
    /// # Returns
    /// Sent message object with id and threadId
    pub async fn send_message(&self, message: &OutgoingMessage) -> AppResult<Value> {
        info!("Sending Gmail message to: {:?}", message.to);

        let mut request_body = json!({
            "raw": base64_url_encode(build_rfc2822(message).as_bytes()),
        });
        if let Some(thread_id) = &message.thread_id {
            request_body["threadId"] = json!(thread_id);
        }

        let url = format!("{}/users/me/messages/send", GMAIL_API_BASE);
        let response = self.client.post(&url, &request_body).await?;

        info!("Message sent successfully");
        Ok(response)
    }

    /// List all labels
    ///
    /// # Returns
    /// Array of label objects with id, name, type
    pub async fn list_labels(&self) -> AppResult<Vec<Value>> {
        info!("Listing Gmail labels");

        let url = format!("{}/users/me/labels", GMAIL_API_BASE);
        let response = self.client.get(&url, &[]).await?;

        let labels = extract_array(&response, "labels");
        debug!("Retrieved {} labels", labels.len());
        Ok(labels)
    }

    /// Create a user label
    pub async fn create_label(&self, name: &str) -> AppResult<Value> {
        info!("Creating label: {}", name);

        let body = json!({
            "name": name,
            "labelListVisibility": "labelShow",
            "messageListVisibility": "show",
        });
        let url = format!("{}/users/me/labels", GMAIL_API_BASE);
        self.client.post(&url, &body).await
    }

    /// Delete a user label by ID
    pub async fn delete_label(&self, label_id: &str) -> AppResult<()> {
        info!("Deleting label: {}", label_id);

        let url = format!("{}/users/me/labels/{}", GMAIL_API_BASE, segment(label_id));
        self.client.delete(&url).await?;
        Ok(())
    }

    /// Modify message labels (add/remove label IDs)
    pub async fn modify_message(
        &self,
        message_id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> AppResult<Value> {
        debug!("Modifying labels for message: {}", message_id);

        let body = json!({
            "addLabelIds": add_label_ids,
            "removeLabelIds": remove_label_ids,
        });
        let url = format!("{}/users/me/messages/{}/modify", GMAIL_API_BASE, segment(message_id));
        self.client.post(&url, &body).await
    }

    /// Modify labels on every message of a thread
    pub async fn modify_thread(
        &self,
        thread_id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> AppResult<Value> {
        debug!("Modifying labels for thread: {}", thread_id);

        let body = json!({
            "addLabelIds": add_label_ids,
            "removeLabelIds": remove_label_ids,
        });
        let url = format!("{}/users/me/threads/{}/modify", GMAIL_API_BASE, segment(thread_id));
        self.client.post(&url, &body).await
    }

    /// Move a message to trash
    pub async fn trash_message(&self, message_id: &str) -> AppResult<Value> {
        info!("Trashing message: {}", message_id);

        let url = format!("{}/users/me/messages/{}/trash", GMAIL_API_BASE, segment(message_id));
        self.client.post(&url, &json!({})).await
    }

    /// Take a message out of trash
    pub async fn untrash_message(&self, message_id: &str) -> AppResult<Value> {
        info!("Untrashing message: {}", message_id);

        let url = format!("{}/users/me/messages/{}/untrash", GMAIL_API_BASE, segment(message_id));
        self.client.post(&url, &json!({})).await
    }
}

/// Resolve label names (or IDs) to label IDs.
///
/// A name matches a label whose ID equals it exactly, or whose display name
/// equals it ignoring ASCII case, so both `INBOX` and `inbox` work for system
/// labels and `Receipts` / `receipts` for user labels.
pub fn resolve_label_ids(labels: &[Value], names: &[String]) -> AppResult<Vec<String>> {
    names
        .iter()
        .map(|name| {
            labels
                .iter()
                .find(|label| {
                    let id = label.get("id").and_then(|v| v.as_str());
                    let label_name = label.get("name").and_then(|v| v.as_str());
                    id == Some(name.as_str())
                        || label_name.is_some_and(|n| n.eq_ignore_ascii_case(name))
                })
                .and_then(|label| label.get("id").and_then(|v| v.as_str()))
                .map(String::from)
                .ok_or_else(|| AppError::not_found(format!("label not found: {}", name)))
        })
        .collect()
}

/// Look up a header value by case-insensitive name in a message payload
pub fn message_header<'a>(message: &'a Value, name: &str) -> Option<&'a str> {
    message
        .pointer("/payload/headers")
        .and_then(|v| v.as_array())?
        .iter()
        .find(|h| {
            h.get("name")
                .and_then(|n| n.as_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
        .and_then(|h| h.get("value").and_then(|v| v.as_str()))
}

/// Decode the readable body of a message payload.
///
/// Prefers the first `text/plain` part anywhere in the MIME tree and falls
/// back to `text/html`.
pub fn extract_body(payload: &Value) -> Option<String> {
    find_part(payload, "text/plain")
        .or_else(|| find_part(payload, "text/html"))
        .and_then(|data| base64_url_decode(data))
}

fn find_part<'a>(part: &'a Value, mime_type: &str) -> Option<&'a str> {
    if part.get("mimeType").and_then(|v| v.as_str()) == Some(mime_type) {
        if let Some(data) = part.pointer("/body/data").and_then(|v| v.as_str()) {
            return Some(data);
        }
    }

    part.get("parts")
        .and_then(|v| v.as_array())?
        .iter()
        .find_map(|child| find_part(child, mime_type))
}

/// Build an RFC 2822 message
fn build_rfc2822(message: &OutgoingMessage) -> String {
    let mut message_parts = vec![format!("To: {}", message.to.join(", "))];
    if !message.cc.is_empty() {
        message_parts.push(format!("Cc: {}", message.cc.join(", ")));
    }
    if !message.bcc.is_empty() {
        message_parts.push(format!("Bcc: {}", message.bcc.join(", ")));
    }
    message_parts.push(format!("Subject: {}", message.subject));
    message_parts.push("MIME-Version: 1.0".to_string());
    message_parts.push("Content-Type: text/plain; charset=UTF-8".to_string());
    message_parts.push(String::new()); // Empty line separates headers from body
    message_parts.push(message.body.clone());

    message_parts.join("\r\n")
}

/// Base64url encode (no padding) per RFC 4648 §5
fn base64_url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Gmail sometimes pads body data and sometimes doesn't
fn base64_url_decode(data: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .or_else(|_| URL_SAFE.decode(data))
        .ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;

    fn labels() -> Vec<Value> {
        vec![
            json!({"id": "INBOX", "name": "INBOX", "type": "system"}),
            json!({"id": "UNREAD", "name": "UNREAD", "type": "system"}),
            json!({"id": "Label_12", "name": "Receipts", "type": "user"}),
        ]
    }

    #[test]
    fn test_resolve_label_ids() {
        let names = vec!["inbox".to_string(), "receipts".to_string(), "Label_12".to_string()];
        assert_eq!(
            resolve_label_ids(&labels(), &names).unwrap(),
            vec!["INBOX", "Label_12", "Label_12"]
        );
    }

    #[test]
    fn test_resolve_unknown_label() {
        let err = resolve_label_ids(&labels(), &["Travel".to_string()]).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "label not found: Travel");
    }

    #[test]
    fn test_message_header_is_case_insensitive() {
        let message = json!({
            "payload": {"headers": [
                {"name": "Subject", "value": "Quarterly numbers"},
                {"name": "From", "value": "ana@example.com"}
            ]}
        });
        assert_eq!(message_header(&message, "subject"), Some("Quarterly numbers"));
        assert_eq!(message_header(&message, "Date"), None);
    }

    #[test]
    fn test_extract_body_prefers_plain_text() {
        let payload = json!({
            "mimeType": "multipart/alternative",
            "parts": [
                {"mimeType": "text/html", "body": {"data": base64_url_encode(b"<p>hi</p>")}},
                {"mimeType": "text/plain", "body": {"data": base64_url_encode(b"hi there")}}
            ]
        });
        assert_eq!(extract_body(&payload).as_deref(), Some("hi there"));
    }

    #[test]
    fn test_extract_body_nested_and_padded() {
        let payload = json!({
            "mimeType": "multipart/mixed",
            "parts": [{
                "mimeType": "multipart/alternative",
                "parts": [{"mimeType": "text/html", "body": {"data": URL_SAFE.encode(b"<b>x</b>")}}]
            }]
        });
        assert_eq!(extract_body(&payload).as_deref(), Some("<b>x</b>"));
        assert_eq!(extract_body(&json!({"mimeType": "image/png"})), None);
    }

    #[test]
    fn test_build_rfc2822() {
        let message = OutgoingMessage {
            to: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            cc: vec!["c@example.com".to_string()],
            subject: "Hello".to_string(),
            body: "Body text".to_string(),
            ..OutgoingMessage::default()
        };
        let raw = build_rfc2822(&message);
        assert!(raw.starts_with("To: a@example.com, b@example.com\r\nCc: c@example.com\r\n"));
        assert!(!raw.contains("Bcc:"));
        assert!(raw.ends_with("\r\n\r\nBody text"));
    }

    #[test]
    fn test_base64_url_encode() {
        let encoded = base64_url_encode(b"Hello, World!??>");
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(base64_url_decode(&encoded).as_deref(), Some("Hello, World!??>"));
    }
}
