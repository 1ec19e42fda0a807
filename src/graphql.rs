use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::{error::StatsError, query::PullRequestSource, types::Page};

#[derive(Debug, Deserialize)]
struct RepositoryData {
    repository: Option<RepositoryPullRequests>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryPullRequests {
    pull_requests: Page,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: Page,
}

/// Fails with [`StatsError::GraphQl`] if the response has an `errors` key.
/// The payload is serialised back verbatim so the server's wording reaches
/// the user unchanged.
pub fn check_errors(body: &Value) -> Result<(), StatsError> {
    match body.get("errors") {
        Some(errors) => Err(StatsError::GraphQl(errors.to_string())),
        None => Ok(()),
    }
}

/// Extracts the pull request connection from a raw GraphQL response body.
pub fn decode_page(source: PullRequestSource, repo: &str, mut body: Value) -> Result<Page> {
    check_errors(&body)?;

    let data = body
        .get_mut("data")
        .map(Value::take)
        .filter(|data| !data.is_null())
        .context("GraphQL response has neither 'data' nor 'errors'")?;

    match source {
        PullRequestSource::Repository => {
            let data: RepositoryData = serde_json::from_value(data)
                .context("Failed to decode repository pull request page")?;
            data.repository
                .map(|r| r.pull_requests)
                .ok_or_else(|| StatsError::RepositoryNotFound(repo.to_string()).into())
        }
        PullRequestSource::Search(_) => {
            let data: SearchData = serde_json::from_value(data)
                .context("Failed to decode pull request search page")?;
            Ok(data.search)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::window::DateWindow;

    fn search_source() -> PullRequestSource {
        PullRequestSource::Search(
            DateWindow::parse("2024-01-01T00:00:00Z", "2024-12-31T23:59:59Z").unwrap(),
        )
    }

    #[test]
    fn test_decode_repository_page() {
        let body = json!({
            "data": {
                "repository": {
                    "pullRequests": {
                        "nodes": [
                            { "number": 1, "createdAt": "2024-01-02T00:00:00Z", "author": { "login": "alice" } },
                            { "number": 2, "createdAt": "2024-01-03T00:00:00Z", "author": null }
                        ],
                        "pageInfo": { "hasNextPage": true, "endCursor": "c1" }
                    }
                }
            }
        });

        let page = decode_page(PullRequestSource::Repository, "o/r", body).unwrap();
        assert_eq!(page.nodes.len(), 2);
        assert_eq!(page.nodes[0].author_login().unwrap().as_str(), "alice");
        assert!(page.nodes[1].author_login().is_none());
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("c1"));
    }

    #[test]
    fn test_decode_search_page() {
        let body = json!({
            "data": {
                "search": {
                    "nodes": [
                        {
                            "number": 9,
                            "createdAt": "2024-05-05T05:05:05+02:00",
                            "author": { "login": "bob" },
                            "reviews": { "nodes": [ { "author": { "login": "carol" }, "state": "COMMENTED" } ] }
                        }
                    ],
                    "pageInfo": { "hasNextPage": false, "endCursor": null }
                }
            }
        });

        let page = decode_page(search_source(), "o/r", body).unwrap();
        assert_eq!(page.nodes[0].number, 9);
        assert_eq!(page.nodes[0].reviews()[0].state, "COMMENTED");
        assert!(!page.page_info.has_next_page);
    }

    #[test]
    fn test_errors_payload_is_surfaced_verbatim() {
        let body = json!({
            "data": null,
            "errors": [
                { "type": "NOT_FOUND", "message": "Could not resolve to a Repository with the name 'o/r'." }
            ]
        });

        let err = decode_page(PullRequestSource::Repository, "o/r", body).unwrap_err();
        match err.downcast_ref::<StatsError>() {
            Some(StatsError::GraphQl(payload)) => {
                assert!(payload.contains("NOT_FOUND"));
                assert!(payload.contains("Could not resolve to a Repository"));
            }
            other => panic!("expected GraphQl error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("GraphQL Error: ["));
    }

    #[test]
    fn test_errors_win_over_partial_data() {
        let body = json!({
            "data": { "search": { "nodes": [], "pageInfo": { "hasNextPage": false, "endCursor": null } } },
            "errors": [ { "message": "partial failure" } ]
        });

        let err = decode_page(search_source(), "o/r", body).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StatsError>(),
            Some(StatsError::GraphQl(_))
        ));
    }

    #[test]
    fn test_null_repository() {
        let body = json!({ "data": { "repository": null } });

        let err = decode_page(PullRequestSource::Repository, "o/missing", body).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StatsError>(),
            Some(&StatsError::RepositoryNotFound("o/missing".into()))
        );
    }

    #[test]
    fn test_missing_data() {
        assert!(decode_page(PullRequestSource::Repository, "o/r", json!({})).is_err());
    }
}
