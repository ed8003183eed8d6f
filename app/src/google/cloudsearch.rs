//! Google Cloud Search API v1 Client
//!
//! Searches across the Workspace corpora indexed for the user's domain.
//! Results are offset-paged (`start`), not token-paged.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::GoogleClient;
use super::common::extract_array;
use crate::common::AppResult;

const CLOUD_SEARCH_URL: &str = "https://cloudsearch.googleapis.com/v1/query/search";

pub struct CloudSearchApi {
    client: GoogleClient,
}

super::google_api_wrapper!(CloudSearchApi);

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    /// Restrict to these sources, e.g. `google-gmail` or a datasource name
    pub sources: Vec<String>,
    pub page_size: u32,
    pub start: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(rename = "updateTime")]
    pub update_time: Option<String>,
}

impl SearchHit {
    pub fn from_result(result: &Value) -> Self {
        let text = |v: Option<&Value>| v.and_then(|v| v.as_str()).map(String::from);
        let metadata = result.get("metadata");

        Self {
            title: text(result.get("title")),
            url: text(result.get("url")),
            snippet: text(result.get("snippet").and_then(|s| s.get("snippet"))),
            source: text(metadata.and_then(|m| m.pointer("/source/name"))),
            mime_type: text(metadata.and_then(|m| m.get("mimeType"))),
            update_time: text(metadata.and_then(|m| m.get("updateTime"))),
        }
    }
}

impl SearchRequest {
    fn body(&self) -> Value {
        let mut body = json!({
            "query": self.query,
            "pageSize": self.page_size,
            "start": self.start,
        });
        if !self.sources.is_empty() {
            body["dataSourceRestrictions"] = self
                .sources
                .iter()
                .map(|s| json!({ "source": source_ref(s) }))
                .collect();
        }
        body
    }
}

/// `google-*` names are predefined sources; anything else is an indexed datasource
fn source_ref(source: &str) -> Value {
    match source.strip_prefix("google-") {
        Some(_) => json!({ "predefinedSource": source.to_ascii_uppercase().replace('-', "_") }),
        None => json!({ "name": source }),
    }
}

impl CloudSearchApi {
    /// Run one page of a search; returns the hits plus the raw paging fields
    pub async fn search(&self, request: &SearchRequest) -> AppResult<(Vec<SearchHit>, Value)> {
        info!("Cloud Search: {:?}", request.query);

        let response = self.client.post(CLOUD_SEARCH_URL, &request.body()).await?;
        let hits: Vec<SearchHit> = extract_array(&response, "results")
            .iter()
            .map(SearchHit::from_result)
            .collect();

        debug!("Retrieved {} search results", hits.len());
        let paging = json!({
            "hasMoreResults": response.get("hasMoreResults").cloned().unwrap_or(Value::Bool(false)),
            "resultCountEstimate": response.get("resultCountEstimate").cloned().unwrap_or(Value::Null),
        });
        Ok((hits, paging))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let request = SearchRequest {
            query: "quarterly report".to_string(),
            sources: vec!["google-drive".to_string(), "datasources/abc".to_string()],
            page_size: 10,
            start: 20,
        };
        let body = request.body();
        assert_eq!(body["pageSize"], 10);
        assert_eq!(body["start"], 20);
        assert_eq!(
            body["dataSourceRestrictions"][0]["source"]["predefinedSource"],
            "GOOGLE_DRIVE"
        );
        assert_eq!(body["dataSourceRestrictions"][1]["source"]["name"], "datasources/abc");
    }

    #[test]
    fn test_request_without_sources() {
        let body = SearchRequest { query: "x".to_string(), page_size: 5, ..Default::default() }.body();
        assert!(body.get("dataSourceRestrictions").is_none());
    }

    #[test]
    fn test_hit_from_result() {
        let result = json!({
            "title": "Q3 Plan",
            "url": "https://docs.google.com/d/1",
            "snippet": {"snippet": "the <b>plan</b>"},
            "metadata": {"source": {"name": "datasources/drive"}, "mimeType": "application/pdf"}
        });
        let hit = SearchHit::from_result(&result);
        assert_eq!(hit.title.as_deref(), Some("Q3 Plan"));
        assert_eq!(hit.snippet.as_deref(), Some("the <b>plan</b>"));
        assert_eq!(hit.source.as_deref(), Some("datasources/drive"));
        assert_eq!(hit.update_time, None);
    }
}
