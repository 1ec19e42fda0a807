use std::fmt;

/// Terminal failures of a leaderboard run.
///
/// None of these are retried. They travel inside `anyhow::Error` and can be
/// recovered with `downcast_ref::<StatsError>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// Neither `GITHUB_TOKEN` nor `GH_TOKEN` is set.
    MissingToken,
    /// The response carried an `errors` payload, kept verbatim as JSON.
    GraphQl(String),
    /// `data.repository` came back null.
    RepositoryNotFound(String),
    /// The server reported another page but no cursor to reach it.
    MissingCursor { page: usize },
    /// The server still reported more pages after `limit` fetches.
    PageLimit { limit: usize },
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsError::MissingToken => {
                write!(f, "GITHUB_TOKEN environment variable is not set")
            }
            StatsError::GraphQl(payload) => write!(f, "GraphQL Error: {payload}"),
            StatsError::RepositoryNotFound(repo) => {
                write!(f, "Repository '{repo}' not found or not accessible")
            }
            StatsError::MissingCursor { page } => write!(
                f,
                "Page {page} reported a next page without an end cursor"
            ),
            StatsError::PageLimit { limit } => write!(
                f,
                "Server still reports more pages after {limit} pages; raise --max-pages to continue"
            ),
        }
    }
}

impl std::error::Error for StatsError {}
