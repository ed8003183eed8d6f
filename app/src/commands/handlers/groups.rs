//! Google Groups Handler (Admin SDK Directory)

use serde_json::{json, Value};

use super::common::{
    done, list_response, optional_string, optional_usize, require_string, string_with_default,
};
use crate::commands::schema::{CommandSpec, ParamSpec};
use crate::common::{AppError, AppResult};
use crate::context::AppContext;
use crate::google::common::pick;
use crate::google::directory::{GroupScope, MemberRole};
use crate::google::DirectoryApi;

const GROUP: ParamSpec = ParamSpec::arg("group", "Group email or ID");
const MAX_RESULTS: ParamSpec = ParamSpec::number("max-results", "Maximum number of results");

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        namespace: "groups",
        action: "list",
        about: "List groups in the account, a domain, or of one member",
        params: &[
            ParamSpec::text("domain", "Only groups in this domain"),
            ParamSpec::text("customer", "Customer ID (default: my_customer)"),
            ParamSpec::text("user", "Only groups this user or group belongs to"),
            MAX_RESULTS,
        ],
    },
    CommandSpec {
        namespace: "groups",
        action: "get",
        about: "Show a group",
        params: &[GROUP],
    },
    CommandSpec {
        namespace: "groups",
        action: "members",
        about: "List a group's members",
        params: &[
            GROUP,
            ParamSpec::text("role", "Only members with this role: MEMBER, MANAGER or OWNER"),
            MAX_RESULTS,
        ],
    },
    CommandSpec {
        namespace: "groups",
        action: "add-member",
        about: "Add a member",
        params: &[
            GROUP,
            ParamSpec::arg("email", "Member email"),
            ParamSpec::text("role", "MEMBER, MANAGER or OWNER").default("MEMBER"),
        ],
    },
    CommandSpec {
        namespace: "groups",
        action: "remove-member",
        about: "Remove a member",
        params: &[GROUP, ParamSpec::arg("email", "Member email or ID")],
    },
];

/// Handle Directory group commands
pub async fn handle(ctx: &AppContext, action: &str, params: &Value) -> AppResult<Value> {
    match action {
        "list" => {
            let scope = group_scope(params)?;
            let directory = DirectoryApi::new(ctx.google().await?);
            let groups = directory
                .list_groups(&scope, optional_usize(params, "max-results"))
                .await?;
            Ok(list_response("groups", groups.iter().map(summarize_group).collect()))
        }
        "get" => {
            let directory = DirectoryApi::new(ctx.google().await?);
            let group = directory.get_group(require_string(params, "group")?).await?;
            Ok(summarize_group(&group))
        }
        "members" => {
            let group = require_string(params, "group")?;
            let role = optional_string(params, "role").map(MemberRole::parse).transpose()?;
            let directory = DirectoryApi::new(ctx.google().await?);
            let members = directory
                .list_members(group, role, optional_usize(params, "max-results"))
                .await?;
            let members = members
                .iter()
                .map(|m| {
                    json!({
                        "email": m.get("email"),
                        "role": m.get("role"),
                        "type": m.get("type"),
                        "status": m.get("status"),
                    })
                })
                .collect();
            Ok(list_response("members", members))
        }
        "add-member" => {
            let group = require_string(params, "group")?;
            let email = require_string(params, "email")?;
            let role = MemberRole::parse(string_with_default(params, "role", "MEMBER"))?;
            let directory = DirectoryApi::new(ctx.google().await?);
            let member = directory.add_member(group, email, role).await?;
            Ok(json!({ "group": group, "email": member.get("email"), "role": member.get("role") }))
        }
        "remove-member" => {
            let group = require_string(params, "group")?;
            let email = require_string(params, "email")?;
            let directory = DirectoryApi::new(ctx.google().await?);
            directory.remove_member(group, email).await?;
            Ok(done(json!({ "group": group, "removed": email })))
        }
        _ => Err(AppError::not_found(format!("unknown command: groups {}", action))),
    }
}

fn group_scope(params: &Value) -> AppResult<GroupScope> {
    let domain = optional_string(params, "domain");
    let customer = optional_string(params, "customer");
    let user = optional_string(params, "user");

    match (domain, customer, user) {
        (Some(_), Some(_), _) => Err(AppError::invalid_input("--domain and --customer are mutually exclusive")),
        (_, _, Some(user)) => Ok(GroupScope::Member(user.to_string())),
        (Some(domain), None, None) => Ok(GroupScope::Domain(domain.to_string())),
        (None, customer, None) => Ok(GroupScope::Customer(customer.unwrap_or("my_customer").to_string())),
    }
}

fn summarize_group(group: &Value) -> Value {
    pick(group, &["id", "email", "name", "description", "directMembersCount"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_scope() {
        assert_eq!(
            group_scope(&json!({})).unwrap(),
            GroupScope::Customer("my_customer".to_string())
        );
        assert_eq!(
            group_scope(&json!({"domain": "example.com"})).unwrap(),
            GroupScope::Domain("example.com".to_string())
        );
        assert_eq!(
            group_scope(&json!({"user": "a@example.com"})).unwrap(),
            GroupScope::Member("a@example.com".to_string())
        );
        assert!(group_scope(&json!({"domain": "example.com", "customer": "my_customer"})).is_err());
        assert_eq!(
            group_scope(&json!({"customer": "C0123"})).unwrap(),
            GroupScope::Customer("C0123".to_string())
        );
    }
}
