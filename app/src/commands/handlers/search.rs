//! Cloud Search Handler

use serde_json::{json, Value};

use super::common::{optional_u32, require_string, string_array};
use crate::commands::schema::{CommandSpec, ParamSpec};
use crate::common::{AppError, AppResult};
use crate::context::AppContext;
use crate::google::cloudsearch::SearchRequest;
use crate::google::CloudSearchApi;

/// Cloud Search rejects larger pages
const MAX_PAGE_SIZE: u32 = 100;

pub const COMMANDS: &[CommandSpec] = &[CommandSpec {
    namespace: "search",
    action: "query",
    about: "Search across Workspace content indexed for your domain",
    params: &[
        ParamSpec::arg("text", "Search query"),
        ParamSpec::list("source", "Restrict to sources, e.g. google-drive or datasources/ID"),
        ParamSpec::number("page-size", "Results per page").default("10"),
        ParamSpec::number("start", "Offset of the first result").default("0"),
    ],
}];

/// Handle Cloud Search commands
pub async fn handle(ctx: &AppContext, action: &str, params: &Value) -> AppResult<Value> {
    match action {
        "query" => {
            let request = search_request(params)?;
            let search = CloudSearchApi::new(ctx.google().await?);
            let (hits, paging) = search.search(&request).await?;

            Ok(json!({
                "query": request.query,
                "start": request.start,
                "results": hits,
                "count": hits.len(),
                "hasMoreResults": paging.get("hasMoreResults"),
                "resultCountEstimate": paging.get("resultCountEstimate"),
            }))
        }
        _ => Err(AppError::not_found(format!("unknown command: search {}", action))),
    }
}

fn search_request(params: &Value) -> AppResult<SearchRequest> {
    let query = require_string(params, "text")?.trim();
    if query.is_empty() {
        return Err(AppError::invalid_input("search text is empty"));
    }

    let page_size = optional_u32(params, "page-size")?.unwrap_or(10);
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(AppError::invalid_input(format!(
            "--page-size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    Ok(SearchRequest {
        query: query.to_string(),
        sources: string_array(params, "source"),
        page_size,
        start: optional_u32(params, "start")?.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request() {
        let request = search_request(&json!({"text": " budget ", "source": ["google-drive"], "page-size": 25})).unwrap();
        assert_eq!(request.query, "budget");
        assert_eq!(request.page_size, 25);
        assert_eq!(request.start, 0);
        assert_eq!(request.sources, vec!["google-drive"]);
    }

    #[test]
    fn test_search_request_validation() {
        assert!(search_request(&json!({"text": "   "})).is_err());
        assert!(search_request(&json!({"text": "x", "page-size": 0})).is_err());
        assert!(search_request(&json!({"text": "x", "page-size": 500})).is_err());
    }
}
