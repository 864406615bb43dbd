use crate::adapter::{apply_since, http_client, SourceAdapter};
use crate::timestamp::parse_timestamp;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{Event, Result, Source};
use serde::Deserialize;
use tracing::warn;

/// Tickets reported by one user on a JIRA instance, via the REST search
/// endpoint and a caller-configured JQL query.
pub struct IssueTrackerAdapter {
    client: reqwest::Client,
    base_url: String,
    jql: String,
    max_results: u32,
}

impl IssueTrackerAdapter {
    pub fn new(base_url: impl Into<String>, jql: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            jql: jql.into(),
            max_results: 50,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Issue {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    summary: Option<String>,
    status: Option<IssueStatus>,
    created: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssueStatus {
    name: String,
}

/// Map one issue to an event. The project key (the part before the
/// dash, e.g. `KAFKA` in `KAFKA-123`) becomes the subtitle.
pub(crate) fn map_issue(issue: Issue, base_url: &str) -> Option<Event> {
    let timestamp = parse_timestamp(issue.fields.created.as_deref()?)?;
    let title = issue.fields.summary?;
    let project = issue.key.split_once('-').map(|(p, _)| p).unwrap_or_default();

    Some(Event {
        source: Source::IssueTracker,
        id: issue.key.clone(),
        timestamp,
        title,
        subtitle: project.to_string(),
        url: Some(format!("{}/browse/{}", base_url, issue.key)),
        meta: issue.fields.status.map(|s| s.name),
    })
}

#[async_trait]
impl SourceAdapter for IssueTrackerAdapter {
    fn source(&self) -> Source {
        Source::IssueTracker
    }

    async fn fetch(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Event>> {
        let url = format!("{}/rest/api/2/search", self.base_url);
        let max_results = self.max_results.to_string();
        let response: SearchResponse = self
            .client
            .get(&url)
            .query(&[("jql", self.jql.as_str()), ("maxResults", max_results.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut events = Vec::with_capacity(response.issues.len());
        for issue in response.issues {
            let key = issue.key.clone();
            match map_issue(issue, &self.base_url) {
                Some(event) => events.push(event),
                None => warn!(%key, "dropping issue without a summary or creation date"),
            }
        }

        Ok(apply_since(events, since))
    }
}
