use crate::adapter::{apply_since, http_client, SourceAdapter};
use crate::timestamp::parse_timestamp;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{Event, PulseError, Result, Source};
use regex::Regex;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

const LORE_BASE: &str = "https://lore.kernel.org";

/// How far past an entry's anchor to look for its `<time>` element.
const DATE_WINDOW: usize = 400;

/// Patch submissions found by scraping the lore.kernel.org author
/// search. There is no JSON API for this; results are mined out of the
/// HTML listing pages.
pub struct KernelPatchAdapter {
    client: reqwest::Client,
    author_email: String,
    max_pages: usize,
    page_delay: Duration,
    subject_re: Regex,
    fallback_re: Regex,
    time_re: Regex,
}

impl KernelPatchAdapter {
    pub fn new(author_email: impl Into<String>, max_pages: usize) -> Result<Self> {
        let regex = |pattern| {
            Regex::new(pattern).map_err(|e| PulseError::adapter(Source::KernelPatch, e))
        };
        Ok(Self {
            client: http_client()?,
            author_email: author_email.into(),
            max_pages,
            page_delay: Duration::from_millis(800),
            subject_re: regex(r#"<a[^>]*class="snippet-subject"[^>]*href="([^"]+)"[^>]*>([^<]+)</a>"#)?,
            fallback_re: regex(r#"<a[^>]*href="(/r/[^"]+)"[^>]*>([^<]+)</a>"#)?,
            time_re: regex(r#"<time[^>]*datetime="([^"]+)""#)?,
        })
    }

    fn page_url(&self, page: usize) -> String {
        let query = format!("a:{}", self.author_email);
        format!("{}/all/?q={}&page={}", LORE_BASE, urlencoding::encode(&query), page)
    }

    /// GET with up to three tries and exponential backoff, mirroring how
    /// lore rate-limits scrapers. `None` means the page is unreachable.
    async fn get_page(&self, url: &str) -> Option<String> {
        let mut delay = Duration::from_secs(1);
        for _ in 0..3 {
            match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => return resp.text().await.ok(),
                Ok(resp) => debug!(%url, status = %resp.status(), "lore page fetch failed"),
                Err(e) => debug!(%url, error = %e, "lore page fetch failed"),
            }
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
        None
    }

    /// Extract events from one listing page. Entries already in `seen`
    /// are skipped; entries with no recoverable `<time datetime>` nearby
    /// are dropped rather than stamped with the current time.
    fn parse_page(&self, html: &str, seen: &mut HashSet<String>) -> Vec<Event> {
        let mut entries: Vec<(&str, &str)> = self
            .subject_re
            .captures_iter(html)
            .map(|c| {
                let (_, [href, subject]) = c.extract();
                (href, subject)
            })
            .collect();
        if entries.is_empty() {
            entries = self
                .fallback_re
                .captures_iter(html)
                .map(|c| {
                    let (_, [href, subject]) = c.extract();
                    (href, subject)
                })
                .collect();
        }

        let mut events = Vec::new();
        for (href, subject) in entries {
            let url = if href.starts_with('/') {
                format!("{}{}", LORE_BASE, href)
            } else {
                href.to_string()
            };
            if !seen.insert(url.clone()) {
                continue;
            }

            let timestamp = html
                .find(href)
                .and_then(|pos| {
                    // clamp the window end to a char boundary; lore pages
                    // carry accented names and non-ASCII subjects
                    let mut end = html.len().min(pos + DATE_WINDOW);
                    while !html.is_char_boundary(end) {
                        end -= 1;
                    }
                    self.time_re.captures(&html[pos..end])
                })
                .and_then(|c| parse_timestamp(&c[1]));
            let Some(timestamp) = timestamp else {
                warn!(%url, "dropping lore entry without a parseable date");
                continue;
            };

            let id = href.trim_end_matches('/').rsplit('/').next().unwrap_or(href);
            events.push(Event {
                source: Source::KernelPatch,
                id: id.to_string(),
                timestamp,
                title: subject.trim().to_string(),
                subtitle: String::new(),
                url: Some(url),
                meta: None,
            });
        }
        events
    }
}

#[async_trait]
impl SourceAdapter for KernelPatchAdapter {
    fn source(&self) -> Source {
        Source::KernelPatch
    }

    async fn fetch(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Event>> {
        let mut seen = HashSet::new();
        let mut events = Vec::new();

        for page in 0..self.max_pages {
            let url = self.page_url(page);
            let Some(html) = self.get_page(&url).await else {
                break;
            };

            let page_events = self.parse_page(&html, &mut seen);
            if page_events.is_empty() {
                break;
            }
            events.extend(page_events);

            tokio::time::sleep(self.page_delay).await;
        }

        Ok(apply_since(events, since))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> KernelPatchAdapter {
        KernelPatchAdapter::new("dev@example.com", 2).unwrap()
    }

    const PAGE: &str = r#"
        <pre>
        <a class="snippet-subject" href="/r/20240115-net-fix-v2-1@example.com/">
          [PATCH v2] net: fix refcount leak</a>
        <time datetime="2024-01-15T10:00:00Z">2024-01-15</time>
        <a class="snippet-subject" href="/r/20240220-mm-cleanup@example.com/">
          [PATCH] mm: cleanup</a>
        <time datetime="2024-02-20T08:30:00Z">2024-02-20</time>
        </pre>
    "#;

    #[test]
    fn test_parses_snippet_subject_entries() {
        let mut seen = HashSet::new();
        let events = adapter().parse_page(PAGE, &mut seen);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "[PATCH v2] net: fix refcount leak");
        assert_eq!(events[0].id, "20240115-net-fix-v2-1@example.com");
        assert_eq!(
            events[0].url.as_deref(),
            Some("https://lore.kernel.org/r/20240115-net-fix-v2-1@example.com/"),
        );
        assert_eq!(events[0].timestamp.to_rfc3339(), "2024-01-15T10:00:00+00:00");
    }

    #[test]
    fn test_falls_back_to_plain_result_anchors() {
        let html = r#"
            <a href="/r/msg-id@example.com/">[PATCH] fallback entry</a>
            <time datetime="2024-03-01T00:00:00Z">x</time>
        "#;
        let mut seen = HashSet::new();
        let events = adapter().parse_page(html, &mut seen);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "[PATCH] fallback entry");
    }

    #[test]
    fn test_entry_without_nearby_date_is_dropped() {
        let html = r#"<a class="snippet-subject" href="/r/no-date@example.com/">[PATCH] undated</a>"#;
        let mut seen = HashSet::new();
        assert!(adapter().parse_page(html, &mut seen).is_empty());
    }

    #[test]
    fn test_date_window_clamps_inside_multibyte_text() {
        // the window end lands mid-character in this padding; the entry
        // must be dropped, not panic
        let html = format!(
            r#"<a class="snippet-subject" href="/r/accent@example.com/">[PATCH] fix métadonnées</a>{}<time datetime="2024-05-01T00:00:00Z">x</time>"#,
            "é".repeat(400),
        );
        let mut seen = HashSet::new();
        assert!(adapter().parse_page(&html, &mut seen).is_empty());
    }

    #[test]
    fn test_accented_subject_with_date_in_window_is_parsed() {
        let html = format!(
            r#"<a class="snippet-subject" href="/r/cafe@example.com/">[PATCH] café driver</a>{}<time datetime="2024-05-01T00:00:00Z">x</time>"#,
            "é".repeat(100),
        );
        let mut seen = HashSet::new();
        let events = adapter().parse_page(&html, &mut seen);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "[PATCH] café driver");
    }

    #[test]
    fn test_seen_urls_are_skipped_across_pages() {
        let a = adapter();
        let mut seen = HashSet::new();
        let first = a.parse_page(PAGE, &mut seen);
        let second = a.parse_page(PAGE, &mut seen);
        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
    }

    #[test]
    fn test_page_url_encodes_author_query() {
        let url = adapter().page_url(0);
        assert_eq!(
            url,
            "https://lore.kernel.org/all/?q=a%3Adev%40example.com&page=0",
        );
    }
}
