use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use pulse_core::Source;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "pulse")]
#[command(version, about = "Aggregate engineering activity into a summary document")]
pub struct Config {
    /// Where to write the summary document
    #[arg(long, env = "PULSE_OUTPUT", default_value = "data/analytics.json")]
    pub output: PathBuf,

    /// Comma-separated source names to fetch
    #[arg(
        long,
        env = "PULSE_SOURCES",
        value_delimiter = ',',
        default_value = "github,kernel_commit,kernel_patch,issue_tracker,blog"
    )]
    pub sources: Vec<String>,

    /// Only include events at or after this RFC 3339 timestamp
    #[arg(long, env = "PULSE_SINCE")]
    pub since: Option<DateTime<Utc>>,

    /// How many repositories to keep in the top-repo ranking
    #[arg(long = "top-repos", env = "PULSE_TOP_REPOS", default_value = "10")]
    pub top_repo_limit: usize,

    /// Per-source fetch timeout in seconds
    #[arg(long, env = "PULSE_SOURCE_TIMEOUT", default_value = "30")]
    pub source_timeout: u64,

    /// GitHub login whose pull requests are fetched
    #[arg(long, env = "GITHUB_LOGIN")]
    pub github_login: Option<String>,

    /// GitHub API token (also used for kernel commit search)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Author email searched on git.kernel.org and lore.kernel.org
    #[arg(long, env = "KERNEL_EMAIL")]
    pub kernel_email: Option<String>,

    /// Page cap for the lore.kernel.org scrape
    #[arg(long, env = "PULSE_LORE_MAX_PAGES", default_value = "8")]
    pub lore_max_pages: usize,

    /// JIRA instance base URL
    #[arg(long, env = "PULSE_JIRA_URL", default_value = "https://issues.apache.org/jira")]
    pub jira_url: String,

    /// JQL query selecting the tracked tickets
    #[arg(long, env = "PULSE_JIRA_JQL")]
    pub jira_jql: Option<String>,

    /// dev.to username whose articles are fetched
    #[arg(long, env = "DEVTO_USER")]
    pub blog_username: Option<String>,

    /// JSON file mapping repository names to language labels
    #[arg(long, env = "PULSE_LABELS")]
    pub labels: Option<PathBuf>,
}

impl Config {
    /// Parse `--sources` into source values, in the canonical source
    /// order and without duplicates.
    pub fn enabled_sources(&self) -> anyhow::Result<Vec<Source>> {
        let mut requested = Vec::new();
        for name in &self.sources {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let source: Source = name
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("invalid --sources value")?;
            requested.push(source);
        }
        Ok(Source::ALL
            .into_iter()
            .filter(|s| requested.contains(s))
            .collect())
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("cannot create {}", parent.display()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["pulse"];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn test_default_sources_enable_everything() {
        let config = parse(&[]);
        assert_eq!(config.enabled_sources().unwrap(), Source::ALL.to_vec());
    }

    #[test]
    fn test_sources_are_deduped_and_canonically_ordered() {
        let config = parse(&["--sources", "blog,github,blog"]);
        assert_eq!(
            config.enabled_sources().unwrap(),
            vec![Source::Github, Source::Blog],
        );
    }

    #[test]
    fn test_unknown_source_is_an_error() {
        let config = parse(&["--sources", "github,jira"]);
        assert!(config.enabled_sources().is_err());
    }

    #[test]
    fn test_since_parses_rfc3339() {
        let config = parse(&["--since", "2024-01-01T00:00:00Z"]);
        assert!(config.since.is_some());
    }
}
