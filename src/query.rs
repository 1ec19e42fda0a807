use serde_json::{Map, Value, json};

use crate::{types::Repo, window::DateWindow};

pub const PAGE_SIZE: u32 = 50;
pub const REVIEWS_PER_PULL_REQUEST: u32 = 100;

/// Where pull requests come from, which also decides who applies the date
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestSource {
    /// `repository.pullRequests(states: MERGED)`, newest first. Every merged
    /// PR is fetched and the window is applied client-side.
    Repository,
    /// `search(type: ISSUE)` with a `created:` qualifier, so the server only
    /// returns PRs inside the window.
    Search(DateWindow),
}

/// Which fields each pull request node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Authors,
    Reviews,
}

const AUTHOR_FIELDS: &str = "
        number
        createdAt
        author { login }";

const REVIEW_FIELDS: &str = "
        reviews(first: $reviewsPerPullRequest) {
          nodes {
            author { login }
            state
          }
        }";

const PAGE_INFO: &str = "
      pageInfo {
        hasNextPage
        endCursor
      }";

/// Request body for one page of merged pull requests.
///
/// The document text is fixed per (source, selection) pair. Owner, name,
/// search string and cursor are only ever sent as GraphQL variables.
#[derive(Debug, Clone)]
pub struct PageQuery<'a> {
    repo: &'a Repo,
    source: PullRequestSource,
    selection: Selection,
    cursor: Option<&'a str>,
}

impl<'a> PageQuery<'a> {
    pub fn new(repo: &'a Repo, source: PullRequestSource, selection: Selection) -> Self {
        Self {
            repo,
            source,
            selection,
            cursor: None,
        }
    }

    /// Continue after `cursor`; `None` requests the first page.
    pub fn after(mut self, cursor: Option<&'a str>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn repo(&self) -> &Repo {
        self.repo
    }

    pub fn source(&self) -> PullRequestSource {
        self.source
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor
    }

    /// Search string for the server-filtered source.
    pub fn search_string(&self) -> Option<String> {
        match self.source {
            PullRequestSource::Repository => None,
            PullRequestSource::Search(window) => Some(format!(
                "repo:{} is:pr is:merged {} sort:created-desc",
                self.repo,
                window.search_qualifier()
            )),
        }
    }

    pub fn document(&self) -> String {
        let fields = match self.selection {
            Selection::Authors => AUTHOR_FIELDS.to_string(),
            Selection::Reviews => format!("{AUTHOR_FIELDS}{REVIEW_FIELDS}"),
        };
        let reviews_var = match self.selection {
            Selection::Authors => "",
            Selection::Reviews => ", $reviewsPerPullRequest: Int!",
        };

        match self.source {
            PullRequestSource::Repository => format!(
                "query($owner: String!, $name: String!, $pageSize: Int!, $after: String{reviews_var}) {{
  repository(owner: $owner, name: $name) {{
    pullRequests(
      first: $pageSize
      after: $after
      states: MERGED
      orderBy: {{ field: CREATED_AT, direction: DESC }}
    ) {{
      nodes {{{fields}
      }}{PAGE_INFO}
    }}
  }}
}}"
            ),
            PullRequestSource::Search(_) => format!(
                "query($query: String!, $pageSize: Int!, $after: String{reviews_var}) {{
  search(query: $query, type: ISSUE, first: $pageSize, after: $after) {{
    nodes {{
      ... on PullRequest {{{fields}
      }}
    }}{PAGE_INFO}
  }}
}}"
            ),
        }
    }

    pub fn variables(&self) -> Value {
        let mut vars = Map::new();
        vars.insert("pageSize".into(), json!(PAGE_SIZE));

        match self.search_string() {
            None => {
                vars.insert("owner".into(), json!(self.repo.owner));
                vars.insert("name".into(), json!(self.repo.name));
            }
            Some(search) => {
                vars.insert("query".into(), json!(search));
            }
        }

        if self.selection == Selection::Reviews {
            vars.insert(
                "reviewsPerPullRequest".into(),
                json!(REVIEWS_PER_PULL_REQUEST),
            );
        }

        if let Some(cursor) = self.cursor {
            vars.insert("after".into(), json!(cursor));
        }

        Value::Object(vars)
    }

    /// The `{"query": ..., "variables": ...}` body POSTed to the endpoint.
    pub fn to_body(&self) -> Value {
        json!({
            "query": self.document(),
            "variables": self.variables(),
        })
    }
}
