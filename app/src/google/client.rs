//! Google API Authenticated HTTP Client
//!
//! Wraps reqwest with bearer-token injection, Google's error envelope, and
//! `nextPageToken` pagination for both GET and POST list endpoints.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::common::{extract_array, next_page_token};
use crate::common::{create_http_client, AppError, AppResult, ErrorCode};
use crate::config::Config;

/// Where a list endpoint puts its items and what it calls its page-size
/// parameter (`maxResults`, `pageSize`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListField {
    pub items: &'static str,
    pub page_size: &'static str,
}

impl ListField {
    pub const fn new(items: &'static str, page_size: &'static str) -> Self {
        Self { items, page_size }
    }
}

/// Google API HTTP client with OAuth token injection
#[derive(Clone)]
pub struct GoogleClient {
    client: Client,
    access_token: String,
    quota_project: Option<String>,
    page_size: usize,
}

impl GoogleClient {
    /// Create a new Google API client with an OAuth access token
    pub fn new(access_token: String, config: &Config) -> AppResult<Self> {
        let client = create_http_client(config.timeout_secs, config.connect_timeout_secs)?;

        Ok(Self {
            client,
            access_token,
            quota_project: config.quota_project.clone(),
            page_size: config.page_size.max(1),
        })
    }

    /// Make an authenticated GET request
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> AppResult<Value> {
        let builder = self.authorize(self.client.get(url).query(query));
        self.execute_request(builder).await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post(&self, url: &str, body: &Value) -> AppResult<Value> {
        self.post_with_query(url, &[], body).await
    }

    /// Make an authenticated POST request with query parameters and JSON body
    pub async fn post_with_query(
        &self,
        url: &str,
        query: &[(&str, String)],
        body: &Value,
    ) -> AppResult<Value> {
        let builder = self.authorize(self.client.post(url).query(query).json(body));
        self.execute_request(builder).await
    }

    /// Make an authenticated PUT request with JSON body
    pub async fn put(&self, url: &str, query: &[(&str, String)], body: &Value) -> AppResult<Value> {
        let builder = self.authorize(self.client.put(url).query(query).json(body));
        self.execute_request(builder).await
    }

    /// Make an authenticated PATCH request with JSON body
    pub async fn patch(&self, url: &str, query: &[(&str, String)], body: &Value) -> AppResult<Value> {
        let builder = self.authorize(self.client.patch(url).query(query).json(body));
        self.execute_request(builder).await
    }

    /// Make an authenticated DELETE request
    pub async fn delete(&self, url: &str) -> AppResult<Value> {
        let builder = self.authorize(self.client.delete(url));
        self.execute_request(builder).await
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.bearer_auth(&self.access_token);
        match &self.quota_project {
            Some(project) => builder.header("x-goog-user-project", project),
            None => builder,
        }
    }

    /// Execute a request and handle Google API response patterns
    async fn execute_request(&self, builder: RequestBuilder) -> AppResult<Value> {
        debug!("Executing Google API request");

        let response = builder.send().await?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate limited by Google API");
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::new(ErrorCode::Transport, format!("Failed to read response body: {}", e)))?;

        // Empty successful responses (e.g., DELETE)
        if status.is_success() && body.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        let parsed: Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) if status.is_success() => {
                return Err(AppError::new(
                    ErrorCode::Api,
                    format!("Failed to parse JSON response: {} (body: {})", e, body),
                ));
            }
            // Error pages from front-end proxies are not always JSON
            Err(_) => Value::Null,
        };

        if !status.is_success() {
            let err = error_from_response(&parsed, status);
            error!("Google API error: {}", err.message);
            return Err(err);
        }

        Ok(parsed)
    }

    /// Handle paginated GET requests with nextPageToken
    pub async fn get_paginated(
        &self,
        url: &str,
        base_query: &[(&str, String)],
        list: ListField,
        max_results: Option<usize>,
    ) -> AppResult<Vec<Value>> {
        let limit = max_results.unwrap_or(usize::MAX);
        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        while all_items.len() < limit {
            let mut query = base_query.to_vec();
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.clone()));
            }
            let remaining = limit - all_items.len();
            query.push((list.page_size, remaining.min(self.page_size).to_string()));

            let response = self.get(url, &query).await?;
            all_items.extend(extract_array(&response, list.items));

            match next_page_token(&response) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        all_items.truncate(limit);
        debug!("Paginated {} items from {}", all_items.len(), url);
        Ok(all_items)
    }

    /// Handle paginated POST requests where the page token travels in the body
    pub async fn post_paginated(
        &self,
        url: &str,
        body: &Value,
        list: ListField,
        max_results: Option<usize>,
    ) -> AppResult<Vec<Value>> {
        let limit = max_results.unwrap_or(usize::MAX);
        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        while all_items.len() < limit {
            let mut request = body.clone();
            if let Some(ref token) = page_token {
                request["pageToken"] = Value::String(token.clone());
            }
            let remaining = limit - all_items.len();
            request[list.page_size] = Value::from(remaining.min(self.page_size));

            let response = self.post(url, &request).await?;
            all_items.extend(extract_array(&response, list.items));

            match next_page_token(&response) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        all_items.truncate(limit);
        debug!("Paginated {} items from {}", all_items.len(), url);
        Ok(all_items)
    }
}

/// Build an error from a Google API error response
///
/// Google APIs return errors in this format:
/// `{"error": {"code": 400, "message": "Invalid request", "status": "INVALID_ARGUMENT"}}`
pub fn error_from_response(response: &Value, status: StatusCode) -> AppError {
    let code = ErrorCode::from_status(status);

    if let Some(error_obj) = response.get("error") {
        if let Some(message) = error_obj.get("message").and_then(|v| v.as_str()) {
            let http_code = error_obj
                .get("code")
                .and_then(|v| v.as_i64())
                .unwrap_or(i64::from(status.as_u16()));

            return AppError::new(code, format!("Google API error {}: {}", http_code, message))
                .with_data(error_obj.clone());
        }
    }

    AppError::new(code, format!("HTTP {} error", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_response() {
        let error_response = serde_json::json!({
            "error": {
                "code": 400,
                "message": "Invalid requests[0].mergeCells: No grid with id: 7",
                "status": "INVALID_ARGUMENT"
            }
        });

        let err = error_from_response(&error_response, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("400"));
        assert!(err.message.contains("No grid with id: 7"));
        assert_eq!(err.data.unwrap()["status"], "INVALID_ARGUMENT");
    }

    #[test]
    fn test_error_from_non_json_body() {
        let err = error_from_response(&Value::Null, StatusCode::NOT_FOUND);
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "HTTP 404 Not Found error");
    }

    #[test]
    fn test_client_carries_config() {
        let config = Config {
            quota_project: Some("billing-project".to_string()),
            page_size: 0,
            ..Config::default()
        };
        let client = GoogleClient::new("token".to_string(), &config).unwrap();
        assert_eq!(client.quota_project.as_deref(), Some("billing-project"));
        assert_eq!(client.page_size, 1);
    }
}
