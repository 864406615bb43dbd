use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{Event, Result, Source};

/// User agent sent on every upstream request.
pub const USER_AGENT: &str = concat!("pulse/", env!("CARGO_PKG_VERSION"));

/// A pluggable telemetry source.
///
/// Implementations fetch raw records from one external system and map
/// them to the common `Event` shape. Adapters are stateless across
/// invocations and perform no side effects beyond the network call;
/// malformed upstream records are dropped with a warning, never
/// propagated as errors.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which source this adapter feeds.
    fn source(&self) -> Source;

    /// Fetch events at or after `since`. `None` means full history.
    /// The returned order carries no meaning; the normalizer sorts.
    async fn fetch(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Event>>;
}

/// Client-side lower-bound filter for upstream APIs that have no
/// incremental query parameter.
pub fn apply_since(mut events: Vec<Event>, since: Option<DateTime<Utc>>) -> Vec<Event> {
    if let Some(since) = since {
        events.retain(|e| e.timestamp >= since);
    }
    events
}

pub(crate) fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}
