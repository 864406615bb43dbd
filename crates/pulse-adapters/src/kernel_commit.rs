use crate::adapter::{apply_since, http_client, SourceAdapter};
use crate::timestamp::parse_timestamp;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{Event, PulseError, Result, Source};
use serde::Deserialize;
use tracing::warn;

const SEARCH_ENDPOINT: &str = "https://api.github.com/search/commits";

// Commit search still requires the preview media type on some
// deployments; GitHub ignores it where it is no longer needed.
const ACCEPT: &str = "application/vnd.github.cloak-preview";

const KERNEL_REPO: &str = "torvalds/linux";

/// Commits in torvalds/linux authored by one email, via the GitHub
/// commit-search API.
pub struct KernelCommitAdapter {
    client: reqwest::Client,
    author_email: String,
    token: Option<String>,
}

impl KernelCommitAdapter {
    pub fn new(author_email: impl Into<String>, token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            author_email: author_email.into(),
            token,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<CommitItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitItem {
    sha: String,
    html_url: Option<String>,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    date: Option<String>,
}

/// Map one search hit to an event. The first line of the commit message
/// becomes the title.
pub(crate) fn map_commit(item: CommitItem) -> Option<Event> {
    let raw_date = item.commit.author.as_ref()?.date.as_deref()?;
    let timestamp = parse_timestamp(raw_date)?;
    let title = item
        .commit
        .message
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    if title.is_empty() {
        return None;
    }

    Some(Event {
        source: Source::KernelCommit,
        id: item.sha,
        timestamp,
        title,
        subtitle: KERNEL_REPO.to_string(),
        url: item.html_url,
        meta: None,
    })
}

#[async_trait]
impl SourceAdapter for KernelCommitAdapter {
    fn source(&self) -> Source {
        Source::KernelCommit
    }

    async fn fetch(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Event>> {
        let Some(token) = &self.token else {
            return Err(PulseError::adapter(self.source(), "no GitHub token configured"));
        };

        let query = format!("repo:{} author-email:{}", KERNEL_REPO, self.author_email);
        let response: SearchResponse = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("q", query.as_str()),
                ("sort", "author-date"),
                ("order", "desc"),
                ("per_page", "100"),
            ])
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut events = Vec::with_capacity(response.items.len());
        for item in response.items {
            let sha = item.sha.clone();
            match map_commit(item) {
                Some(event) => events.push(event),
                None => warn!(%sha, "dropping commit without a usable date or title"),
            }
        }

        Ok(apply_since(events, since))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_maps_first_message_line_to_title() {
        let item: CommitItem = serde_json::from_str(
            r#"{
                "sha": "abc123",
                "html_url": "https://github.com/torvalds/linux/commit/abc123",
                "commit": {
                    "message": "net: fix refcount leak\n\nLong explanation here.",
                    "author": {"date": "2024-03-05T14:00:00Z"}
                }
            }"#,
        )
        .unwrap();

        let event = map_commit(item).unwrap();
        assert_eq!(event.source, Source::KernelCommit);
        assert_eq!(event.title, "net: fix refcount leak");
        assert_eq!(event.id, "abc123");
        assert_eq!(event.subtitle, "torvalds/linux");
    }

    #[test]
    fn test_commit_without_author_date_is_dropped() {
        let item: CommitItem = serde_json::from_str(
            r#"{"sha": "def", "html_url": null, "commit": {"message": "fix", "author": null}}"#,
        )
        .unwrap();
        assert!(map_commit(item).is_none());
    }

    #[test]
    fn test_commit_with_empty_message_is_dropped() {
        let item: CommitItem = serde_json::from_str(
            r#"{
                "sha": "ghi",
                "html_url": null,
                "commit": {"message": "", "author": {"date": "2024-03-05T14:00:00Z"}}
            }"#,
        )
        .unwrap();
        assert!(map_commit(item).is_none());
    }
}
