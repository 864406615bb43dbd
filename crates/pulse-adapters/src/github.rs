use crate::adapter::{apply_since, http_client, SourceAdapter};
use crate::timestamp::parse_timestamp;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{Event, PulseError, Result, Source};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

const GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

const PR_QUERY: &str = r#"
query($login:String!) {
  user(login:$login) {
    pullRequests(first:50, orderBy:{field:CREATED_AT, direction:DESC}) {
      nodes {
        title
        url
        state
        createdAt
        mergedAt
        repository {
          nameWithOwner
        }
      }
    }
  }
}
"#;

/// Pull requests authored by one user, via the GitHub GraphQL API.
pub struct GitHubAdapter {
    client: reqwest::Client,
    login: String,
    token: Option<String>,
}

impl GitHubAdapter {
    pub fn new(login: impl Into<String>, token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            login: login.into(),
            token,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    #[serde(rename = "pullRequests")]
    pull_requests: PullRequests,
}

#[derive(Debug, Deserialize)]
struct PullRequests {
    nodes: Vec<PrNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PrNode {
    title: String,
    url: String,
    state: String,
    #[serde(rename = "createdAt")]
    created_at: Option<String>,
    #[serde(rename = "mergedAt")]
    merged_at: Option<String>,
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    #[serde(rename = "nameWithOwner")]
    name_with_owner: String,
}

/// Map one PR node to an event. The merge date wins over the creation
/// date when both are present. Returns `None` for malformed nodes.
pub(crate) fn map_pull_request(node: PrNode) -> Option<Event> {
    let raw_date = node.merged_at.as_deref().or(node.created_at.as_deref())?;
    let timestamp = parse_timestamp(raw_date)?;
    let subtitle = node
        .repository
        .map(|r| r.name_with_owner)
        .unwrap_or_default();

    Some(Event {
        source: Source::Github,
        id: node.url.clone(),
        timestamp,
        title: node.title,
        subtitle,
        url: Some(node.url),
        meta: Some(node.state),
    })
}

#[async_trait]
impl SourceAdapter for GitHubAdapter {
    fn source(&self) -> Source {
        Source::Github
    }

    async fn fetch(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Event>> {
        let Some(token) = &self.token else {
            return Err(PulseError::adapter(self.source(), "no GitHub token configured"));
        };

        let body = json!({
            "query": PR_QUERY,
            "variables": { "login": self.login },
        });

        let response: GraphQlResponse = self
            .client
            .post(GRAPHQL_ENDPOINT)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.errors.is_empty() {
            return Err(PulseError::adapter(
                self.source(),
                format!("graphql errors: {}", serde_json::to_string(&response.errors)?),
            ));
        }

        let nodes = response
            .data
            .and_then(|d| d.user)
            .map(|u| u.pull_requests.nodes)
            .unwrap_or_default();

        let mut events = Vec::with_capacity(nodes.len());
        for node in nodes {
            let url = node.url.clone();
            match map_pull_request(node) {
                Some(event) => events.push(event),
                None => warn!(%url, "dropping pull request without a usable date"),
            }
        }

        Ok(apply_since(events, since))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(raw: &str) -> PrNode {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_merged_pr_uses_merge_date() {
        let event = map_pull_request(node(
            r#"{
                "title": "Add retry logic",
                "url": "https://github.com/org/repo/pull/7",
                "state": "MERGED",
                "createdAt": "2024-01-10T08:00:00Z",
                "mergedAt": "2024-01-15T09:00:00Z",
                "repository": {"nameWithOwner": "org/repo"}
            }"#,
        ))
        .unwrap();

        assert_eq!(event.source, Source::Github);
        assert_eq!(event.timestamp.to_rfc3339(), "2024-01-15T09:00:00+00:00");
        assert_eq!(event.subtitle, "org/repo");
        assert_eq!(event.meta.as_deref(), Some("MERGED"));
        assert_eq!(event.id, "https://github.com/org/repo/pull/7");
    }

    #[test]
    fn test_open_pr_falls_back_to_creation_date() {
        let event = map_pull_request(node(
            r#"{
                "title": "WIP",
                "url": "https://github.com/org/repo/pull/8",
                "state": "OPEN",
                "createdAt": "2024-02-01T08:00:00Z",
                "mergedAt": null,
                "repository": {"nameWithOwner": "org/repo"}
            }"#,
        ))
        .unwrap();
        assert_eq!(event.timestamp.to_rfc3339(), "2024-02-01T08:00:00+00:00");
    }

    #[test]
    fn test_pr_without_any_date_is_dropped() {
        let mapped = map_pull_request(node(
            r#"{
                "title": "ghost",
                "url": "https://github.com/org/repo/pull/9",
                "state": "CLOSED",
                "createdAt": null,
                "mergedAt": null,
                "repository": null
            }"#,
        ));
        assert!(mapped.is_none());
    }

    #[test]
    fn test_pr_without_repository_has_empty_subtitle() {
        let event = map_pull_request(node(
            r#"{
                "title": "orphan",
                "url": "https://github.com/org/repo/pull/10",
                "state": "MERGED",
                "createdAt": "2024-03-01T00:00:00Z",
                "mergedAt": null,
                "repository": null
            }"#,
        ))
        .unwrap();
        assert_eq!(event.subtitle, "");
    }
}
