//! Admin SDK Directory API Client (groups and memberships)

use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::{GoogleClient, ListField};
use super::common::segment;
use crate::common::{AppError, AppResult};

const DIRECTORY_API_BASE: &str = "https://admin.googleapis.com/admin/directory/v1";
const GROUPS: ListField = ListField::new("groups", "maxResults");
const MEMBERS: ListField = ListField::new("members", "maxResults");

pub struct DirectoryApi {
    client: GoogleClient,
}

super::google_api_wrapper!(DirectoryApi);

/// Which groups to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupScope {
    /// Every group in a customer account (`my_customer` is the caller's)
    Customer(String),
    Domain(String),
    /// Groups a user or group belongs to
    Member(String),
}

/// Membership role within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    Member,
    Manager,
    Owner,
}

impl MemberRole {
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MEMBER" => Ok(MemberRole::Member),
            "MANAGER" => Ok(MemberRole::Manager),
            "OWNER" => Ok(MemberRole::Owner),
            other => Err(AppError::invalid_input(format!(
                "invalid role {:?} (expected member, manager or owner)",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Member => "MEMBER",
            MemberRole::Manager => "MANAGER",
            MemberRole::Owner => "OWNER",
        }
    }
}

impl GroupScope {
    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            GroupScope::Customer(id) => vec![("customer", id.clone())],
            GroupScope::Domain(domain) => vec![("domain", domain.clone())],
            GroupScope::Member(key) => vec![("userKey", key.clone())],
        }
    }
}

impl DirectoryApi {
    pub async fn list_groups(&self, scope: &GroupScope, max_results: Option<usize>) -> AppResult<Vec<Value>> {
        info!("Listing groups: {:?}", scope);

        let url = format!("{}/groups", DIRECTORY_API_BASE);
        let groups = self
            .client
            .get_paginated(&url, &scope.query(), GROUPS, max_results)
            .await?;

        debug!("Retrieved {} groups", groups.len());
        Ok(groups)
    }

    pub async fn get_group(&self, group_key: &str) -> AppResult<Value> {
        info!("Fetching group: {}", group_key);

        self.client.get(&group_url(group_key), &[]).await
    }

    pub async fn list_members(
        &self,
        group_key: &str,
        role: Option<MemberRole>,
        max_results: Option<usize>,
    ) -> AppResult<Vec<Value>> {
        info!("Listing members of {}", group_key);

        let mut query_params = vec![];
        if let Some(role) = role {
            query_params.push(("roles", role.as_str().to_string()));
        }

        let url = format!("{}/members", group_url(group_key));
        let members = self
            .client
            .get_paginated(&url, &query_params, MEMBERS, max_results)
            .await?;

        debug!("Retrieved {} members", members.len());
        Ok(members)
    }

    pub async fn add_member(&self, group_key: &str, email: &str, role: MemberRole) -> AppResult<Value> {
        info!("Adding {} to {} as {}", email, group_key, role.as_str());

        let url = format!("{}/members", group_url(group_key));
        let body = json!({ "email": email, "role": role.as_str() });
        self.client.post(&url, &body).await
    }

    pub async fn remove_member(&self, group_key: &str, member_key: &str) -> AppResult<()> {
        info!("Removing {} from {}", member_key, group_key);

        let url = format!("{}/members/{}", group_url(group_key), segment(member_key));
        self.client.delete(&url).await?;
        Ok(())
    }
}

fn group_url(group_key: &str) -> String {
    format!("{}/groups/{}", DIRECTORY_API_BASE, segment(group_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role() {
        assert_eq!(MemberRole::parse("owner").unwrap(), MemberRole::Owner);
        assert_eq!(MemberRole::parse("Manager").unwrap().as_str(), "MANAGER");
        assert!(MemberRole::parse("admin").is_err());
    }

    #[test]
    fn test_group_scope_query() {
        assert_eq!(
            GroupScope::Customer("my_customer".to_string()).query(),
            vec![("customer", "my_customer".to_string())]
        );
        assert_eq!(
            GroupScope::Member("a@example.com".to_string()).query(),
            vec![("userKey", "a@example.com".to_string())]
        );
    }

    #[test]
    fn test_group_url_escapes_key() {
        assert_eq!(
            group_url("team@example.com"),
            "https://admin.googleapis.com/admin/directory/v1/groups/team%40example.com"
        );
    }
}
