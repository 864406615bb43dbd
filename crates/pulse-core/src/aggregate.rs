use crate::summary::{RepoSummary, Stats, SummaryDocument, TimelineSeries};
use crate::types::{Event, Source};
use std::collections::BTreeMap;

/// A label with a weight to add to the `languages` breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labeled {
    pub label: String,
    pub weight: u64,
}

/// Caller-supplied classification. The aggregator only sums the weights
/// a classifier provides; it never classifies events itself.
pub trait Classifier: Send + Sync {
    fn classify(&self, event: &Event) -> Vec<Labeled>;
}

/// Classifier that labels nothing. Yields an empty `languages` map.
pub struct NoClassifier;

impl Classifier for NoClassifier {
    fn classify(&self, _event: &Event) -> Vec<Labeled> {
        Vec::new()
    }
}

/// Produce the summary document from a deduplicated event set.
///
/// Deterministic: the same input set yields byte-identical serialized
/// output. All sorts are stable, label maps are ordered, and nothing
/// here reads the clock.
pub fn aggregate(
    events: &[Event],
    timeline: TimelineSeries,
    classifier: &dyn Classifier,
    top_repo_limit: usize,
) -> SummaryDocument {
    let mut stats = Stats::default();
    for event in events {
        *stats.get_mut(event.source) += 1;
        stats.total_events += 1;
    }

    let mut languages: BTreeMap<String, u64> = BTreeMap::new();
    for event in events {
        for labeled in classifier.classify(event) {
            *languages.entry(labeled.label).or_insert(0) += labeled.weight;
        }
    }

    let mut feed = events.to_vec();
    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    SummaryDocument {
        stats,
        timeline,
        languages,
        top_repos: rank_repos(events, top_repo_limit),
        feed,
    }
}

/// Group GitHub events by repository, rank by count descending with an
/// alphabetical tie-break, truncate to `limit`.
fn rank_repos(events: &[Event], limit: usize) -> Vec<RepoSummary> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for event in events {
        if event.source == Source::Github && !event.subtitle.is_empty() {
            *counts.entry(event.subtitle.as_str()).or_insert(0) += 1;
        }
    }

    // BTreeMap iteration is already name-ascending; a stable sort on
    // count alone preserves that order among ties.
    let mut repos: Vec<RepoSummary> = counts
        .into_iter()
        .map(|(name, pr_count)| RepoSummary {
            name: name.to_string(),
            org: name.split_once('/').map(|(org, _)| org.to_string()).unwrap_or_default(),
            pr_count,
        })
        .collect();
    repos.sort_by(|a, b| b.pr_count.cmp(&a.pr_count));
    repos.truncate(limit);
    repos
}
