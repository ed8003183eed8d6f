//! Handler Registry
//!
//! Namespace tables and routing from `namespace action` to the handler that
//! owns it.

pub mod activity;
pub mod calendar;
pub mod common;
pub mod drive;
pub mod forms;
pub mod gmail;
pub mod groups;
pub mod keep;
pub mod search;
pub mod sheets;

use serde_json::Value;
use tracing::{debug, warn};

use super::schema::Namespace;
use crate::common::{AppError, AppResult};
use crate::context::AppContext;

/// Every built-in namespace, in help order
pub const NAMESPACES: &[Namespace] = &[
    Namespace {
        name: "gmail",
        about: "Gmail messages, threads and labels",
        commands: gmail::COMMANDS,
    },
    Namespace {
        name: "drive",
        about: "Drive files, folders and sharing",
        commands: drive::COMMANDS,
    },
    Namespace {
        name: "activity",
        about: "Drive activity history",
        commands: activity::COMMANDS,
    },
    Namespace {
        name: "calendar",
        about: "Calendar events",
        commands: calendar::COMMANDS,
    },
    Namespace {
        name: "sheets",
        about: "Spreadsheet values, structure and formatting",
        commands: sheets::COMMANDS,
    },
    Namespace {
        name: "forms",
        about: "Forms and their responses",
        commands: forms::COMMANDS,
    },
    Namespace {
        name: "keep",
        about: "Keep notes",
        commands: keep::COMMANDS,
    },
    Namespace {
        name: "groups",
        about: "Google Groups via the Admin SDK Directory",
        commands: groups::COMMANDS,
    },
    Namespace {
        name: "search",
        about: "Cloud Search across Workspace",
        commands: search::COMMANDS,
    },
];

/// Route a command to its namespace handler
pub async fn dispatch(ctx: &AppContext, namespace: &str, action: &str, params: &Value) -> AppResult<Value> {
    if ctx.registry().get(namespace, action).is_none() {
        warn!("Unknown command: {} {}", namespace, action);
        return Err(AppError::not_found(format!("unknown command: {} {}", namespace, action)));
    }

    debug!("Dispatching {}.{} with {}", namespace, action, params);

    match namespace {
        "gmail" => gmail::handle(ctx, action, params).await,
        "drive" => drive::handle(ctx, action, params).await,
        "activity" => activity::handle(ctx, action, params).await,
        "calendar" => calendar::handle(ctx, action, params).await,
        "sheets" => sheets::handle(ctx, action, params).await,
        "forms" => forms::handle(ctx, action, params).await,
        "keep" => keep::handle(ctx, action, params).await,
        "groups" => groups::handle(ctx, action, params).await,
        "search" => search::handle(ctx, action, params).await,
        _ => Err(AppError::not_found(format!("unknown namespace: {}", namespace))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandRegistry;
    use crate::common::ErrorCode;
    use crate::config::Config;
    use serde_json::json;

    fn context() -> AppContext {
        AppContext::new(Config::default(), CommandRegistry::builtin().unwrap(), None)
    }

    #[tokio::test]
    async fn test_unknown_command_is_not_found() {
        let err = dispatch(&context(), "gmail", "explode", &json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "unknown command: gmail explode");

        let err = dispatch(&context(), "photos", "list", &json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_known_command_without_token_is_unauthenticated() {
        let err = dispatch(&context(), "gmail", "labels", &json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }

    #[test]
    fn test_every_namespace_is_routed() {
        let names: Vec<&str> = NAMESPACES.iter().map(|n| n.name).collect();
        assert_eq!(
            names,
            vec!["gmail", "drive", "activity", "calendar", "sheets", "forms", "keep", "groups", "search"]
        );
    }
}
