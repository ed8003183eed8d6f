//! Google Drive API v3 Client
//!
//! File listing and search, folder creation, rename/move/trash, and sharing.

use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::{GoogleClient, ListField};
use super::common::{extract_array, segment};
use crate::common::AppResult;

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const FILES: ListField = ListField::new("files", "pageSize");

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fields requested for every file resource
const FILE_FIELDS: &str = "id,name,mimeType,modifiedTime,size,parents,webViewLink,trashed,owners(emailAddress)";

pub struct DriveApi {
    client: GoogleClient,
}

super::google_api_wrapper!(DriveApi);

/// A permission to grant on a file
#[derive(Debug, Clone)]
pub struct ShareRequest {
    pub role: String,
    pub kind: String,
    pub email: Option<String>,
    pub domain: Option<String>,
    pub notify: bool,
}

impl DriveApi {
    /// List files matching a Drive query (`q` syntax)
    pub async fn list_files(&self, query: &str, max_results: Option<usize>) -> AppResult<Vec<Value>> {
        info!("Listing Drive files");
        debug!("Drive query: {}", query);

        let query_params = vec![
            ("q", query.to_string()),
            ("fields", format!("nextPageToken,files({})", FILE_FIELDS)),
            ("supportsAllDrives", "true".to_string()),
            ("includeItemsFromAllDrives", "true".to_string()),
        ];

        let url = format!("{}/files", DRIVE_API_BASE);
        let files = self
            .client
            .get_paginated(&url, &query_params, FILES, max_results)
            .await?;

        debug!("Retrieved {} files", files.len());
        Ok(files)
    }

    /// Get file metadata
    pub async fn get_file(&self, file_id: &str) -> AppResult<Value> {
        info!("Fetching Drive file: {}", file_id);

        let query_params = vec![
            ("fields", FILE_FIELDS.to_string()),
            ("supportsAllDrives", "true".to_string()),
        ];
        self.client.get(&file_url(file_id), &query_params).await
    }

    /// Create a folder, optionally inside a parent folder
    pub async fn create_folder(&self, name: &str, parent: Option<&str>) -> AppResult<Value> {
        info!("Creating Drive folder: {}", name);

        let mut body = json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
        });
        if let Some(parent) = parent {
            body["parents"] = json!([parent]);
        }

        let url = format!("{}/files", DRIVE_API_BASE);
        let query_params = vec![
            ("fields", FILE_FIELDS.to_string()),
            ("supportsAllDrives", "true".to_string()),
        ];
        self.client.post_with_query(&url, &query_params, &body).await
    }

    /// Patch file metadata, optionally re-parenting it
    pub async fn update_file(
        &self,
        file_id: &str,
        metadata: &Value,
        add_parents: Option<&str>,
        remove_parents: Option<&str>,
    ) -> AppResult<Value> {
        info!("Updating Drive file: {}", file_id);

        let mut query_params = vec![
            ("fields", FILE_FIELDS.to_string()),
            ("supportsAllDrives", "true".to_string()),
        ];
        if let Some(add) = add_parents {
            query_params.push(("addParents", add.to_string()));
        }
        if let Some(remove) = remove_parents.filter(|r| !r.is_empty()) {
            query_params.push(("removeParents", remove.to_string()));
        }

        self.client.patch(&file_url(file_id), &query_params, metadata).await
    }

    /// Permanently delete a file (bypasses trash)
    pub async fn delete_file(&self, file_id: &str) -> AppResult<()> {
        info!("Permanently deleting Drive file: {}", file_id);

        let url = format!("{}?supportsAllDrives=true", file_url(file_id));
        self.client.delete(&url).await?;
        Ok(())
    }

    /// Grant a permission on a file
    pub async fn create_permission(&self, file_id: &str, share: &ShareRequest) -> AppResult<Value> {
        info!("Sharing Drive file {} as {} ({})", file_id, share.role, share.kind);

        let mut body = json!({
            "role": share.role,
            "type": share.kind,
        });
        if let Some(email) = &share.email {
            body["emailAddress"] = json!(email);
        }
        if let Some(domain) = &share.domain {
            body["domain"] = json!(domain);
        }

        let url = format!("{}/permissions", file_url(file_id));
        let mut query_params = vec![("supportsAllDrives", "true".to_string())];
        // Drive rejects sendNotificationEmail for anything but user/group grants
        if share.kind == "user" || share.kind == "group" {
            query_params.push(("sendNotificationEmail", share.notify.to_string()));
        }
        if share.role == "owner" {
            query_params.push(("transferOwnership", "true".to_string()));
        }

        self.client.post_with_query(&url, &query_params, &body).await
    }

    /// List permissions on a file
    pub async fn list_permissions(&self, file_id: &str) -> AppResult<Vec<Value>> {
        info!("Listing permissions for Drive file: {}", file_id);

        let url = format!("{}/permissions", file_url(file_id));
        let query_params = vec![
            ("fields", "permissions(id,type,role,emailAddress,domain,displayName)".to_string()),
            ("supportsAllDrives", "true".to_string()),
        ];
        let response = self.client.get(&url, &query_params).await?;
        Ok(extract_array(&response, "permissions"))
    }
}

fn file_url(file_id: &str) -> String {
    format!("{}/files/{}", DRIVE_API_BASE, segment(file_id))
}

/// Quote a value for use inside a Drive query string literal
pub fn quote_query_value(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_query_value() {
        assert_eq!(quote_query_value("report"), "'report'");
        assert_eq!(quote_query_value("Bob's notes"), r"'Bob\'s notes'");
        assert_eq!(quote_query_value(r"C:\tmp"), r"'C:\\tmp'");
    }

    #[test]
    fn test_file_url_encodes_id() {
        assert_eq!(
            file_url("abc 1"),
            "https://www.googleapis.com/drive/v3/files/abc%201"
        );
    }
}
