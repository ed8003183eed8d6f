//! Google Sheets API v4 Client
//!
//! Values read/write, spreadsheet metadata, and `batchUpdate` for the
//! structural editing commands. Range resolution lives in [`range`], request
//! construction in [`requests`].

pub mod range;
pub mod requests;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::GoogleClient;
use super::common::{extract_array, segment};
use crate::common::{AppError, AppResult};

pub use range::{resolve_grid_range, SheetLookup};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct SheetsApi {
    client: GoogleClient,
}

super::google_api_wrapper!(SheetsApi);

/// How written values are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInput {
    /// Parsed as if typed into the UI (formulas, dates, numbers)
    UserEntered,
    /// Stored verbatim
    Raw,
}

impl ValueInput {
    fn as_str(&self) -> &'static str {
        match self {
            ValueInput::UserEntered => "USER_ENTERED",
            ValueInput::Raw => "RAW",
        }
    }
}

impl SheetsApi {
    /// Fetch spreadsheet metadata, restricted to `fields` when given
    pub async fn get_spreadsheet(&self, spreadsheet_id: &str, fields: Option<&str>) -> AppResult<Value> {
        info!("Fetching spreadsheet: {}", spreadsheet_id);

        let mut query_params = vec![];
        if let Some(fields) = fields {
            query_params.push(("fields", fields.to_string()));
        }
        self.client
            .get(&spreadsheet_url(spreadsheet_id), &query_params)
            .await
    }

    /// Just the sheet properties (`sheetId`, `title`, `index`)
    pub async fn sheet_metadata(&self, spreadsheet_id: &str) -> AppResult<Value> {
        self.get_spreadsheet(spreadsheet_id, Some("sheets.properties(sheetId,title,index)"))
            .await
    }

    /// Read a range of values
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str, render: &str) -> AppResult<Value> {
        info!("Reading values {} from {}", range, spreadsheet_id);

        let url = format!("{}/values/{}", spreadsheet_url(spreadsheet_id), segment(range));
        self.client
            .get(&url, &[("valueRenderOption", render.to_string())])
            .await
    }

    /// Overwrite a range of values
    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &Value,
        input: ValueInput,
    ) -> AppResult<Value> {
        info!("Writing values to {} in {}", range, spreadsheet_id);

        let url = format!("{}/values/{}", spreadsheet_url(spreadsheet_id), segment(range));
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": values });
        self.client
            .put(&url, &[("valueInputOption", input.as_str().to_string())], &body)
            .await
    }

    /// Append rows after the table found in a range
    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &Value,
        input: ValueInput,
    ) -> AppResult<Value> {
        info!("Appending values to {} in {}", range, spreadsheet_id);

        let url = format!("{}/values/{}:append", spreadsheet_url(spreadsheet_id), segment(range));
        let body = json!({ "majorDimension": "ROWS", "values": values });
        let query_params = vec![
            ("valueInputOption", input.as_str().to_string()),
            ("insertDataOption", "INSERT_ROWS".to_string()),
        ];
        self.client.post_with_query(&url, &query_params, &body).await
    }

    /// Clear values (formatting is kept)
    pub async fn clear_values(&self, spreadsheet_id: &str, range: &str) -> AppResult<Value> {
        info!("Clearing values {} in {}", range, spreadsheet_id);

        let url = format!("{}/values/{}:clear", spreadsheet_url(spreadsheet_id), segment(range));
        self.client.post(&url, &json!({})).await
    }

    /// Create a spreadsheet with the given tab titles
    pub async fn create(&self, title: &str, sheet_titles: &[String]) -> AppResult<Value> {
        info!("Creating spreadsheet: {}", title);

        let mut body = json!({ "properties": { "title": title } });
        if !sheet_titles.is_empty() {
            body["sheets"] = sheet_titles
                .iter()
                .map(|t| json!({ "properties": { "title": t } }))
                .collect();
        }
        self.client.post(SHEETS_API_BASE, &body).await
    }

    /// Apply structural requests atomically
    pub async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<Value>) -> AppResult<Value> {
        info!("Applying {} request(s) to {}", requests.len(), spreadsheet_id);

        let url = format!("{}:batchUpdate", spreadsheet_url(spreadsheet_id));
        let body = json!({ "requests": requests });
        let response = self.client.post(&url, &body).await?;

        debug!("batchUpdate replies: {}", extract_array(&response, "replies").len());
        Ok(response)
    }
}

#[async_trait]
impl SheetLookup for SheetsApi {
    async fn sheet_id(&self, spreadsheet_id: &str, title: &str) -> AppResult<i64> {
        let meta = self.sheet_metadata(spreadsheet_id).await?;
        sheet_id_in(&meta, title).ok_or_else(|| AppError::sheet_not_found(title))
    }

    async fn first_sheet_id(&self, spreadsheet_id: &str) -> AppResult<i64> {
        let meta = self.sheet_metadata(spreadsheet_id).await?;
        first_sheet_id_in(&meta)
            .ok_or_else(|| AppError::not_found(format!("spreadsheet {} has no sheets", spreadsheet_id)))
    }
}

/// Sheet properties from spreadsheet metadata, in tab order
pub fn sheet_properties(meta: &Value) -> Vec<Value> {
    let mut sheets: Vec<Value> = extract_array(meta, "sheets")
        .into_iter()
        .filter_map(|s| s.get("properties").cloned())
        .collect();
    // A missing index is the first tab
    sheets.sort_by_key(|p| p.get("index").and_then(|v| v.as_i64()).unwrap_or(0));
    sheets
}

/// ID of the sheet titled exactly `title`
pub fn sheet_id_in(meta: &Value, title: &str) -> Option<i64> {
    sheet_properties(meta)
        .iter()
        .find(|p| p.get("title").and_then(|v| v.as_str()) == Some(title))
        .map(sheet_id_of)
}

/// ID of the leftmost tab
pub fn first_sheet_id_in(meta: &Value) -> Option<i64> {
    sheet_properties(meta).first().map(sheet_id_of)
}

/// Proto3 JSON drops zero values, so a missing `sheetId` is sheet 0
fn sheet_id_of(properties: &Value) -> i64 {
    properties.get("sheetId").and_then(|v| v.as_i64()).unwrap_or(0)
}

fn spreadsheet_url(spreadsheet_id: &str) -> String {
    format!("{}/{}", SHEETS_API_BASE, segment(spreadsheet_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> Value {
        json!({
            "sheets": [
                {"properties": {"sheetId": 42, "title": "Sheet2", "index": 2}},
                {"properties": {"sheetId": 7, "title": "Totals", "index": 1}},
                {"properties": {"title": "Sheet1"}}
            ]
        })
    }

    #[test]
    fn test_sheet_properties_in_tab_order() {
        let titles: Vec<String> = sheet_properties(&meta())
            .iter()
            .filter_map(|p| p["title"].as_str().map(String::from))
            .collect();
        assert_eq!(titles, vec!["Sheet1", "Totals", "Sheet2"]);
    }

    #[test]
    fn test_sheet_id_by_exact_title() {
        assert_eq!(sheet_id_in(&meta(), "Sheet2"), Some(42));
        assert_eq!(sheet_id_in(&meta(), "Totals"), Some(7));
        assert_eq!(sheet_id_in(&meta(), "Sheet1"), Some(0));
        assert_eq!(sheet_id_in(&meta(), "sheet2"), None);
        assert_eq!(sheet_id_in(&meta(), "Missing"), None);
    }

    #[test]
    fn test_first_sheet_follows_index_not_array_order() {
        assert_eq!(first_sheet_id_in(&meta()), Some(0));

        let unordered = json!({
            "sheets": [
                {"properties": {"sheetId": 9, "title": "Later", "index": 3}},
                {"properties": {"sheetId": 5, "title": "Front", "index": 1}}
            ]
        });
        assert_eq!(first_sheet_id_in(&unordered), Some(5));
    }

    #[test]
    fn test_no_sheets() {
        assert_eq!(first_sheet_id_in(&json!({"sheets": []})), None);
        assert_eq!(first_sheet_id_in(&json!({})), None);
        assert_eq!(sheet_id_in(&json!({"sheets": []}), "Sheet1"), None);
    }
}
