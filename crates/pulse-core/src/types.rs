use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which external system an event was recorded in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Pull requests from the GitHub GraphQL API.
    Github,

    /// Commits in torvalds/linux found via the commit-search API.
    KernelCommit,

    /// Patch submissions found on lore.kernel.org.
    KernelPatch,

    /// Tickets from a JIRA instance.
    IssueTracker,

    /// Posts from a dev.to blog feed.
    Blog,
}

impl Source {
    /// All sources, in the order they appear in the summary document.
    pub const ALL: [Source; 5] = [
        Source::Github,
        Source::KernelCommit,
        Source::KernelPatch,
        Source::IssueTracker,
        Source::Blog,
    ];

    /// Stable snake_case name. Matches the serde representation and the
    /// keys used in the persisted document.
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Github => "github",
            Source::KernelCommit => "kernel_commit",
            Source::KernelPatch => "kernel_patch",
            Source::IssueTracker => "issue_tracker",
            Source::Blog => "blog",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(Source::Github),
            "kernel_commit" => Ok(Source::KernelCommit),
            "kernel_patch" => Ok(Source::KernelPatch),
            "issue_tracker" => Ok(Source::IssueTracker),
            "blog" => Ok(Source::Blog),
            other => Err(format!("unknown source '{}'", other)),
        }
    }
}

/// A single unit of recorded activity: a PR, a commit, a patch, a ticket,
/// or a post. Adapters produce these; nothing downstream mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Which adapter produced this event.
    pub source: Source,

    /// Unique within `source`. `(source, id)` is globally unique after
    /// deduplication.
    pub id: String,

    /// When the activity happened (UTC).
    pub timestamp: DateTime<Utc>,

    /// Human-readable title.
    pub title: String,

    /// Repository or project name. May be empty.
    #[serde(default)]
    pub subtitle: String,

    /// Link back to the upstream record.
    #[serde(default)]
    pub url: Option<String>,

    /// Status or annotation, e.g. a PR state or ticket status.
    #[serde(default)]
    pub meta: Option<String>,
}
