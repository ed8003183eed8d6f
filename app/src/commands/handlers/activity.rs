//! Drive Activity Handler

use serde_json::Value;

use super::common::{list_response, optional_string, optional_usize};
use crate::commands::schema::{CommandSpec, ParamSpec};
use crate::common::{AppError, AppResult};
use crate::context::AppContext;
use crate::google::drive_activity::{ActivityScope, ActivitySummary};
use crate::google::DriveActivityApi;

pub const COMMANDS: &[CommandSpec] = &[CommandSpec {
    namespace: "activity",
    action: "query",
    about: "Recent activity on a file, a folder tree, or all of Drive",
    params: &[
        ParamSpec::text("item", "File or folder ID"),
        ParamSpec::text("folder", "Everything below this folder"),
        ParamSpec::text("filter", "Activity filter, e.g. \"detail.action_detail_case:EDIT\""),
        ParamSpec::number("max-results", "Maximum number of activities").default("25"),
    ],
}];

/// Handle Drive Activity commands
pub async fn handle(ctx: &AppContext, action: &str, params: &Value) -> AppResult<Value> {
    match action {
        "query" => {
            let scope = activity_scope(params)?;
            let activity = DriveActivityApi::new(ctx.google().await?);
            let activities = activity
                .query(&scope, optional_string(params, "filter"), optional_usize(params, "max-results"))
                .await?;

            let summaries = activities
                .iter()
                .map(|a| serde_json::to_value(ActivitySummary::from_activity(a)))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AppError::internal(e.to_string()))?;
            Ok(list_response("activities", summaries))
        }
        _ => Err(AppError::not_found(format!("unknown command: activity {}", action))),
    }
}

fn activity_scope(params: &Value) -> AppResult<ActivityScope> {
    match (optional_string(params, "item"), optional_string(params, "folder")) {
        (Some(_), Some(_)) => Err(AppError::invalid_input("--item and --folder are mutually exclusive")),
        (Some(item), None) => Ok(ActivityScope::Item(item.to_string())),
        (None, Some(folder)) => Ok(ActivityScope::Ancestor(folder.to_string())),
        (None, None) => Ok(ActivityScope::All),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_activity_scope() {
        assert_eq!(activity_scope(&json!({})).unwrap(), ActivityScope::All);
        assert_eq!(
            activity_scope(&json!({"folder": "f1"})).unwrap(),
            ActivityScope::Ancestor("f1".to_string())
        );
        assert!(activity_scope(&json!({"item": "a", "folder": "b"})).is_err());
    }
}
