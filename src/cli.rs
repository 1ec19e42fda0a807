use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::{
    aggregate::{PageFilter, ReviewBuckets},
    github::{ApiConfig, DEFAULT_API_URL},
    query::PullRequestSource,
    types::Repo,
    window::DateWindow,
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

pub const DEFAULT_MAX_PAGES: usize = 1000;

/// What the leaderboard ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingMode {
    /// Merged pull requests per author.
    Merges,
    /// Review outcomes per reviewer.
    Reviews(ReviewBuckets),
}

/// Who applies the date window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FilterMode {
    /// Fetch every merged PR and filter by creation time locally.
    #[default]
    Client,
    /// Let the search API restrict PRs to the window.
    Server,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    #[default]
    Merges,
    Reviews,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum BucketsArg {
    /// Approvals, comments, changes requested
    #[default]
    Three,
    /// Approvals, comments (changes requested count as comments)
    Two,
}

#[derive(Parser, Debug)]
#[command(
    name = "pr-leaderboard",
    about = "Rank a GitHub repository's contributors by merged pull requests or review activity over a time window"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// GitHub organisation or user name (owner)
    #[arg(long, value_name = "OWNER")]
    org: String,

    /// GitHub repository name
    #[arg(long, value_name = "NAME")]
    repo: String,

    /// Start of the window, inclusive (YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD)
    #[arg(long, value_name = "TIMESTAMP")]
    start: String,

    /// End of the window, inclusive (YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD)
    #[arg(long, value_name = "TIMESTAMP")]
    end: String,

    /// What to rank contributors by
    #[arg(long, value_enum, default_value_t = ModeArg::Merges)]
    mode: ModeArg,

    /// Review outcome buckets (reviews mode only)
    #[arg(long, value_enum, default_value_t = BucketsArg::Three)]
    buckets: BucketsArg,

    /// Apply the date window locally or on the server
    #[arg(long, value_enum, default_value_t = FilterMode::Client)]
    filter: FilterMode,

    /// Give up if the server still reports more pages after this many
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES, value_name = "NUM")]
    max_pages: usize,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long, default_value = DEFAULT_API_URL, value_name = "URL")]
    api_url: String,
}

/// Everything one run needs. Built once from the command line and passed
/// down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub repo: Repo,
    pub window: DateWindow,
    pub filter: FilterMode,
    pub mode: CountingMode,
    pub max_pages: usize,
    pub api: ApiConfig,
}

impl RunConfig {
    pub fn source(&self) -> PullRequestSource {
        match self.filter {
            FilterMode::Client => PullRequestSource::Repository,
            FilterMode::Server => PullRequestSource::Search(self.window),
        }
    }

    pub fn page_filter(&self) -> PageFilter {
        match self.filter {
            FilterMode::Client => PageFilter::ClientSide(self.window),
            FilterMode::Server => PageFilter::ServerSide,
        }
    }
}

impl CliArgs {
    fn into_config(self) -> Result<RunConfig> {
        if self.max_pages == 0 {
            anyhow::bail!("--max-pages must be at least 1");
        }

        let window = DateWindow::parse(&self.start, &self.end)?;
        let api = ApiConfig::parse(&self.api_url)?;

        let mode = match self.mode {
            ModeArg::Merges => CountingMode::Merges,
            ModeArg::Reviews => CountingMode::Reviews(match self.buckets {
                BucketsArg::Three => ReviewBuckets::ThreeWay,
                BucketsArg::Two => ReviewBuckets::TwoWay,
            }),
        };

        Ok(RunConfig {
            repo: Repo::new(self.org, self.repo),
            window,
            filter: self.filter,
            mode,
            max_pages: self.max_pages,
            api,
        })
    }
}

/// Parses command-line arguments into a [`RunConfig`].
///
/// Clap errors (including `--help` and `--version`) are returned as
/// `clap::Error` inside the `anyhow::Error` so the caller can pick the exit
/// status.
pub fn parse_args<I, T>(args: I) -> Result<RunConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliArgs::try_parse_from(args)?.into_config()
}
