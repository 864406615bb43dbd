pub mod adapter;
pub mod blog;
pub mod github;
pub mod issue_tracker;
pub mod kernel_commit;
pub mod kernel_patch;
pub mod runner;
pub mod timestamp;

pub use adapter::{apply_since, SourceAdapter, USER_AGENT};
pub use blog::BlogAdapter;
pub use github::GitHubAdapter;
pub use issue_tracker::IssueTrackerAdapter;
pub use kernel_commit::KernelCommitAdapter;
pub use kernel_patch::KernelPatchAdapter;
pub use runner::{run_with_adapters, RunOptions};
pub use timestamp::parse_timestamp;
