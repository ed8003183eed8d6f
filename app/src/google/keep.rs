//! Google Keep API v1 Client

use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::{GoogleClient, ListField};
use crate::common::{AppError, AppResult};

const KEEP_API_BASE: &str = "https://keep.googleapis.com/v1";
const NOTES: ListField = ListField::new("notes", "pageSize");

pub struct KeepApi {
    client: GoogleClient,
}

super::google_api_wrapper!(KeepApi);

/// Content of a new note: free text or a checklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteBody {
    Text(String),
    Checklist(Vec<String>),
}

impl KeepApi {
    pub async fn list_notes(&self, filter: Option<&str>, max_results: Option<usize>) -> AppResult<Vec<Value>> {
        info!("Listing Keep notes");

        let mut query_params = vec![];
        if let Some(filter) = filter {
            query_params.push(("filter", filter.to_string()));
        }

        let url = format!("{}/notes", KEEP_API_BASE);
        let notes = self
            .client
            .get_paginated(&url, &query_params, NOTES, max_results)
            .await?;

        debug!("Retrieved {} notes", notes.len());
        Ok(notes)
    }

    pub async fn get_note(&self, name: &str) -> AppResult<Value> {
        info!("Fetching note: {}", name);

        let url = format!("{}/{}", KEEP_API_BASE, note_name(name)?);
        self.client.get(&url, &[]).await
    }

    pub async fn create_note(&self, title: Option<&str>, body: &NoteBody) -> AppResult<Value> {
        info!("Creating Keep note");

        let mut note = json!({ "body": note_body(body) });
        if let Some(title) = title {
            note["title"] = json!(title);
        }

        let url = format!("{}/notes", KEEP_API_BASE);
        self.client.post(&url, &note).await
    }

    pub async fn delete_note(&self, name: &str) -> AppResult<()> {
        info!("Deleting note: {}", name);

        let url = format!("{}/{}", KEEP_API_BASE, note_name(name)?);
        self.client.delete(&url).await?;
        Ok(())
    }
}

/// Accept `notes/ID` or a bare `ID`
pub fn note_name(name: &str) -> AppResult<String> {
    let id = name.trim().trim_start_matches("notes/");
    if id.is_empty() || id.contains('/') {
        return Err(AppError::invalid_input(format!("invalid note name {:?}", name)));
    }
    Ok(format!("notes/{}", urlencoding::encode(id)))
}

fn note_body(body: &NoteBody) -> Value {
    match body {
        NoteBody::Text(text) => json!({ "text": { "text": text } }),
        NoteBody::Checklist(items) => json!({
            "list": {
                "listItems": items
                    .iter()
                    .map(|item| json!({ "text": { "text": item }, "checked": false }))
                    .collect::<Vec<_>>()
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_name() {
        assert_eq!(note_name("abc123").unwrap(), "notes/abc123");
        assert_eq!(note_name("notes/abc123").unwrap(), "notes/abc123");
        assert!(note_name("notes/").is_err());
        assert!(note_name("other/abc").is_err());
    }

    #[test]
    fn test_note_body() {
        assert_eq!(
            note_body(&NoteBody::Text("milk".to_string())),
            json!({"text": {"text": "milk"}})
        );
        let list = note_body(&NoteBody::Checklist(vec!["eggs".to_string(), "flour".to_string()]));
        assert_eq!(list["list"]["listItems"][1]["text"]["text"], "flour");
        assert_eq!(list["list"]["listItems"][0]["checked"], false);
    }
}
