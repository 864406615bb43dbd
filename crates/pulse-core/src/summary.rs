use crate::types::{Event, Source};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-source event counts over the deduplicated set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub github: u64,
    #[serde(default)]
    pub kernel_commit: u64,
    #[serde(default)]
    pub kernel_patch: u64,
    #[serde(default)]
    pub issue_tracker: u64,
    #[serde(default)]
    pub blog: u64,
}

impl Stats {
    pub fn get(&self, source: Source) -> u64 {
        match source {
            Source::Github => self.github,
            Source::KernelCommit => self.kernel_commit,
            Source::KernelPatch => self.kernel_patch,
            Source::IssueTracker => self.issue_tracker,
            Source::Blog => self.blog,
        }
    }

    pub(crate) fn get_mut(&mut self, source: Source) -> &mut u64 {
        match source {
            Source::Github => &mut self.github,
            Source::KernelCommit => &mut self.kernel_commit,
            Source::KernelPatch => &mut self.kernel_patch,
            Source::IssueTracker => &mut self.issue_tracker,
            Source::Blog => &mut self.blog,
        }
    }
}

/// Monthly activity counts, one vector per source.
///
/// `months` holds `YYYY-MM` labels forming a contiguous ascending range
/// from the earliest to the latest event month; every per-source vector
/// has the same length, zero-filled where a source had no activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineSeries {
    #[serde(default)]
    pub months: Vec<String>,
    #[serde(default)]
    pub github: Vec<u64>,
    #[serde(default)]
    pub kernel_commit: Vec<u64>,
    #[serde(default)]
    pub kernel_patch: Vec<u64>,
    #[serde(default)]
    pub issue_tracker: Vec<u64>,
    #[serde(default)]
    pub blog: Vec<u64>,
}

impl TimelineSeries {
    pub fn series(&self, source: Source) -> &[u64] {
        match source {
            Source::Github => &self.github,
            Source::KernelCommit => &self.kernel_commit,
            Source::KernelPatch => &self.kernel_patch,
            Source::IssueTracker => &self.issue_tracker,
            Source::Blog => &self.blog,
        }
    }

    pub(crate) fn series_mut(&mut self, source: Source) -> &mut Vec<u64> {
        match source {
            Source::Github => &mut self.github,
            Source::KernelCommit => &mut self.kernel_commit,
            Source::KernelPatch => &mut self.kernel_patch,
            Source::IssueTracker => &mut self.issue_tracker,
            Source::Blog => &mut self.blog,
        }
    }
}

/// One ranked repository in `top_repos`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoSummary {
    /// Full repository name, e.g. `org/repo`.
    pub name: String,

    /// The `org` half of `org/repo`. Empty when the name has no slash.
    #[serde(default)]
    pub org: String,

    /// Number of GitHub events with this repository as their subtitle.
    pub pr_count: u64,
}

/// The persisted aggregate output. This document is the sole contract
/// between the aggregation core and the presentation layer.
///
/// The aggregator always emits every container present-but-empty, so
/// consumers never need `|| []` style guards. Deserialization still
/// defaults absent fields to empty so partial documents parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryDocument {
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub timeline: TimelineSeries,
    #[serde(default)]
    pub languages: BTreeMap<String, u64>,
    #[serde(default)]
    pub top_repos: Vec<RepoSummary>,
    #[serde(default)]
    pub feed: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_deserializes_with_empty_defaults() {
        let doc: SummaryDocument =
            serde_json::from_str(r#"{"stats":{"github":3,"total_events":3}}"#).unwrap();
        assert_eq!(doc.stats.github, 3);
        assert!(doc.timeline.months.is_empty());
        assert!(doc.languages.is_empty());
        assert!(doc.top_repos.is_empty());
        assert!(doc.feed.is_empty());
    }

    #[test]
    fn test_empty_document_serializes_containers_present() {
        let json = serde_json::to_value(SummaryDocument::default()).unwrap();
        assert!(json.get("stats").is_some());
        assert!(json.get("timeline").is_some());
        assert!(json.get("languages").is_some());
        assert!(json.get("top_repos").is_some());
        assert!(json.get("feed").is_some());
    }

    #[test]
    fn test_stats_accessor_covers_all_sources() {
        let mut stats = Stats::default();
        for (i, source) in Source::ALL.iter().enumerate() {
            *stats.get_mut(*source) = i as u64 + 1;
        }
        for (i, source) in Source::ALL.iter().enumerate() {
            assert_eq!(stats.get(*source), i as u64 + 1);
        }
    }
}
