use crate::adapter::{apply_since, http_client, SourceAdapter};
use crate::timestamp::parse_timestamp;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{Event, Result, Source};
use serde::Deserialize;
use tracing::warn;

const ARTICLES_ENDPOINT: &str = "https://dev.to/api/articles";

/// Published articles for one dev.to user.
pub struct BlogAdapter {
    client: reqwest::Client,
    username: String,
}

impl BlogAdapter {
    pub fn new(username: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            username: username.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Article {
    id: u64,
    title: String,
    url: Option<String>,
    published_at: Option<String>,
    #[serde(default)]
    tag_list: Vec<String>,
}

pub(crate) fn map_article(article: Article) -> Option<Event> {
    let timestamp = parse_timestamp(article.published_at.as_deref()?)?;

    Some(Event {
        source: Source::Blog,
        id: article.id.to_string(),
        timestamp,
        title: article.title,
        subtitle: article.tag_list.join(", "),
        url: article.url,
        meta: None,
    })
}

#[async_trait]
impl SourceAdapter for BlogAdapter {
    fn source(&self) -> Source {
        Source::Blog
    }

    async fn fetch(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Event>> {
        let articles: Vec<Article> = self
            .client
            .get(ARTICLES_ENDPOINT)
            .query(&[("username", self.username.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut events = Vec::with_capacity(articles.len());
        for article in articles {
            let id = article.id;
            match map_article(article) {
                Some(event) => events.push(event),
                None => warn!(article = id, "dropping unpublished or undated article"),
            }
        }

        Ok(apply_since(events, since))
    }
}
