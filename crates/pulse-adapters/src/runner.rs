use crate::adapter::SourceAdapter;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use pulse_core::{aggregate, normalize, Classifier, Event, Source, SummaryDocument};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Options for one aggregation run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Lower bound for incremental fetch. `None` means full history.
    pub since: Option<DateTime<Utc>>,

    /// How many entries `top_repos` keeps.
    pub top_repo_limit: usize,

    /// Budget for each source's fetch. Timeout is treated like any
    /// other per-source failure.
    pub source_timeout: Duration,
}

/// Fetch all sources concurrently, then normalize and aggregate.
///
/// One task per adapter, joined at a barrier before the single-threaded
/// normalize/aggregate steps. A failing, timed-out, or panicking source
/// contributes zero events and the run continues; nothing here writes
/// output, so cancelling the returned future cannot corrupt a previous
/// summary document.
pub async fn run_with_adapters(
    adapters: Vec<Arc<dyn SourceAdapter>>,
    classifier: &dyn Classifier,
    opts: &RunOptions,
) -> SummaryDocument {
    let handles: Vec<(Source, tokio::task::JoinHandle<_>)> = adapters
        .into_iter()
        .map(|adapter| {
            let source = adapter.source();
            let since = opts.since;
            let timeout = opts.source_timeout;
            let handle =
                tokio::spawn(
                    async move { tokio::time::timeout(timeout, adapter.fetch(since)).await },
                );
            (source, handle)
        })
        .collect();

    let (sources, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
    let results = join_all(handles).await;

    let mut events: Vec<Event> = Vec::new();
    for (source, result) in sources.into_iter().zip(results) {
        match result {
            Ok(Ok(Ok(batch))) => {
                info!(%source, count = batch.len(), "source fetched");
                events.extend(batch);
            }
            Ok(Ok(Err(e))) => {
                warn!(%source, error = %e, "source failed; its section will be empty");
            }
            Ok(Err(_)) => {
                warn!(%source, "source timed out; its section will be empty");
            }
            Err(e) => {
                warn!(%source, error = %e, "source task panicked; its section will be empty");
            }
        }
    }

    let (deduped, timeline) = normalize(events);
    aggregate(&deduped, timeline, classifier, opts.top_repo_limit)
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            since: None,
            top_repo_limit: 10,
            source_timeout: Duration::from_secs(30),
        }
    }
}
