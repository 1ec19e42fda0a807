//! pr-leaderboard: contributor statistics for a GitHub repository.
//!
//! Walks the merged pull requests of a repository through the GraphQL API,
//! keeps those created inside a time window, and folds them into
//! per-contributor counters: merged PRs per author, or review outcomes per
//! reviewer. The result is ranked into a leaderboard.

pub mod aggregate;
pub mod cli;
pub mod error;
pub mod github;
pub mod graphql;
pub mod pagination;
pub mod query;
pub mod types;
pub mod window;

pub use aggregate::{
    Counter, MergeTally, PageFilter, ReviewBucket, ReviewBuckets, ReviewCounts, ReviewTally,
    Tallies, Tally, aggregate_page,
};
pub use cli::{CountingMode, FilterMode, RunConfig, parse_args};
pub use error::StatsError;
pub use github::{ApiConfig, GitHub};
pub use pagination::collect_stats;
pub use query::{PageQuery, PullRequestSource, Selection};
pub use types::{Forge, Login, Page, PageInfo, PullRequestNode, Repo};
pub use window::DateWindow;
