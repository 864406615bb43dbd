use crate::classify::TableClassifier;
use crate::config::Config;
use anyhow::Context;
use pulse_adapters::{
    run_with_adapters, BlogAdapter, GitHubAdapter, IssueTrackerAdapter, KernelCommitAdapter,
    KernelPatchAdapter, RunOptions, SourceAdapter,
};
use pulse_core::{Classifier, NoClassifier, Source, SummaryDocument};
use std::sync::Arc;
use tracing::warn;

/// The single aggregation entry point: build the enabled adapters from
/// config, fetch them concurrently, and aggregate. A source that cannot
/// even be configured (missing login, email, JQL, ...) is skipped with a
/// warning and degrades to an empty section, like any other per-source
/// failure.
pub async fn run_aggregation(config: &Config) -> anyhow::Result<SummaryDocument> {
    let classifier: Box<dyn Classifier> = match &config.labels {
        Some(path) => Box::new(TableClassifier::from_file(path)?),
        None => Box::new(NoClassifier),
    };

    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
    for source in config.enabled_sources()? {
        match build_adapter(config, source) {
            Ok(adapter) => adapters.push(adapter),
            Err(e) => warn!(%source, error = %e, "source not configured; its section will be empty"),
        }
    }

    let opts = RunOptions {
        since: config.since,
        top_repo_limit: config.top_repo_limit,
        source_timeout: config.source_timeout(),
    };
    Ok(run_with_adapters(adapters, classifier.as_ref(), &opts).await)
}

fn build_adapter(config: &Config, source: Source) -> anyhow::Result<Arc<dyn SourceAdapter>> {
    let adapter: Arc<dyn SourceAdapter> = match source {
        Source::Github => {
            let login = config
                .github_login
                .clone()
                .context("--github-login is required for the github source")?;
            Arc::new(GitHubAdapter::new(login, config.github_token.clone())?)
        }
        Source::KernelCommit => {
            let email = config
                .kernel_email
                .clone()
                .context("--kernel-email is required for the kernel_commit source")?;
            Arc::new(KernelCommitAdapter::new(email, config.github_token.clone())?)
        }
        Source::KernelPatch => {
            let email = config
                .kernel_email
                .clone()
                .context("--kernel-email is required for the kernel_patch source")?;
            Arc::new(KernelPatchAdapter::new(email, config.lore_max_pages)?)
        }
        Source::IssueTracker => {
            let jql = config
                .jira_jql
                .clone()
                .context("--jira-jql is required for the issue_tracker source")?;
            Arc::new(IssueTrackerAdapter::new(config.jira_url.clone(), jql)?)
        }
        Source::Blog => {
            let username = config
                .blog_username
                .clone()
                .context("--blog-username is required for the blog source")?;
            Arc::new(BlogAdapter::new(username)?)
        }
    };
    Ok(adapter)
}
