use std::{borrow::Borrow, fmt};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{error::StatsError, query::PageQuery};

/// Source of pages of merged pull requests.
///
/// `GitHub` talks to the real GraphQL endpoint; tests substitute canned pages.
#[async_trait]
pub trait Forge {
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Page>;
}

/// Repository coordinates. Neither part is validated here: a bad owner or
/// name comes back from the server as a GraphQL error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    pub owner: String,
    pub name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A contributor login, guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Login(String);

impl Login {
    pub fn new(login: impl Into<String>) -> Option<Self> {
        let login = login.into();
        (!login.is_empty()).then_some(Self(login))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Login {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// GraphQL `Actor`. `login` is nullable on the wire for ghost accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    pub login: Option<String>,
}

/// Resolves an optional actor to a login, skipping deleted users and empty
/// logins.
pub fn actor_login(actor: Option<&Actor>) -> Option<Login> {
    actor.and_then(|a| a.login.clone()).and_then(Login::new)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestNode {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub author: Option<Actor>,
    /// Only selected when counting reviews.
    #[serde(default)]
    pub reviews: Option<ReviewConnection>,
}

impl PullRequestNode {
    pub fn author_login(&self) -> Option<Login> {
        actor_login(self.author.as_ref())
    }

    pub fn reviews(&self) -> &[ReviewNode] {
        self.reviews
            .as_ref()
            .map(|r| r.nodes.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewConnection {
    #[serde(deserialize_with = "deserialize_nullable_nodes")]
    pub nodes: Vec<ReviewNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewNode {
    pub author: Option<Actor>,
    pub state: String,
}

impl ReviewNode {
    pub fn reviewer_login(&self) -> Option<Login> {
        actor_login(self.author.as_ref())
    }

    pub fn review_state(&self) -> ReviewState {
        ReviewState::from_graphql(&self.state)
    }
}

/// `PullRequestReviewState` as reported by GitHub. Unknown values are kept
/// so the schema can grow without breaking classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    Other(String),
}

impl ReviewState {
    pub fn from_graphql(state: &str) -> Self {
        match state {
            "APPROVED" => ReviewState::Approved,
            "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
            "COMMENTED" => ReviewState::Commented,
            "DISMISSED" => ReviewState::Dismissed,
            "PENDING" => ReviewState::Pending,
            other => ReviewState::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Cursor for the page after this one, `None` once the connection is
    /// exhausted.
    pub fn next_cursor(&self, page: usize) -> Result<Option<String>, StatsError> {
        if !self.has_next_page {
            return Ok(None);
        }
        self.end_cursor
            .clone()
            .map(Some)
            .ok_or(StatsError::MissingCursor { page })
    }
}

/// One page of a pull request connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(deserialize_with = "deserialize_nullable_nodes")]
    pub nodes: Vec<PullRequestNode>,
    pub page_info: PageInfo,
}

// GraphQL list items are nullable; a null entry carries nothing to count.
fn deserialize_nullable_nodes<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    let nodes = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(nodes.unwrap_or_default().into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_rejects_empty() {
        assert!(Login::new("").is_none());
        assert_eq!(Login::new("alice").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_actor_login_skips_missing_author() {
        assert_eq!(actor_login(None), None);
        assert_eq!(actor_login(Some(&Actor { login: None })), None);
        assert_eq!(
            actor_login(Some(&Actor {
                login: Some("bob".into())
            })),
            Login::new("bob")
        );
    }

    #[test]
    fn test_review_state_from_graphql() {
        assert_eq!(ReviewState::from_graphql("APPROVED"), ReviewState::Approved);
        assert_eq!(
            ReviewState::from_graphql("CHANGES_REQUESTED"),
            ReviewState::ChangesRequested
        );
        assert_eq!(
            ReviewState::from_graphql("COMMENTED"),
            ReviewState::Commented
        );
        assert_eq!(
            ReviewState::from_graphql("SOMETHING_NEW"),
            ReviewState::Other("SOMETHING_NEW".into())
        );
    }

    #[test]
    fn test_page_deserializes_and_drops_null_nodes() {
        let page: Page = serde_json::from_value(serde_json::json!({
            "nodes": [
                null,
                {
                    "number": 7,
                    "createdAt": "2024-03-01T12:00:00Z",
                    "author": null,
                    "reviews": { "nodes": [null, { "author": { "login": "carol" }, "state": "APPROVED" }] }
                }
            ],
            "pageInfo": { "hasNextPage": true, "endCursor": "abc" }
        }))
        .unwrap();

        assert_eq!(page.nodes.len(), 1);
        assert_eq!(page.nodes[0].number, 7);
        assert!(page.nodes[0].author_login().is_none());
        assert_eq!(page.nodes[0].reviews().len(), 1);
        assert_eq!(page.page_info.next_cursor(1).unwrap(), Some("abc".into()));
    }

    #[test]
    fn test_next_cursor_requires_end_cursor() {
        let info = PageInfo {
            has_next_page: true,
            end_cursor: None,
        };
        assert_eq!(
            info.next_cursor(3),
            Err(StatsError::MissingCursor { page: 3 })
        );

        let last = PageInfo {
            has_next_page: false,
            end_cursor: Some("ignored".into()),
        };
        assert_eq!(last.next_cursor(4), Ok(None));
    }
}
