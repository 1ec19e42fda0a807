use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    error::StatsError,
    graphql::decode_page,
    query::PageQuery,
    types::{Forge, Page},
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Reads the bearer credential, preferring `GITHUB_TOKEN` over `GH_TOKEN`.
pub fn get_github_token() -> Result<String, StatsError> {
    token_from(|name| std::env::var(name).ok())
}

fn token_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String, StatsError> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .into_iter()
        .filter_map(lookup)
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
        .ok_or(StatsError::MissingToken)
}

/// Where the GraphQL endpoint lives. `/graphql` is appended by octocrab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl ApiConfig {
    pub fn parse(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid GitHub API URL: '{}'", base_url))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("GitHub API URL must be http(s), got: '{}'", base_url);
        }
        Ok(Self { base_url })
    }
}

/// The GitHub GraphQL API, reached through an authenticated octocrab client.
pub struct GitHub {
    client: Octocrab,
}

impl GitHub {
    /// Builds a client from the environment token. Fails before any
    /// network activity when no token is set.
    pub fn from_env(api: &ApiConfig) -> Result<Self> {
        let token = get_github_token()?;
        Self::with_token(token, api)
    }

    pub fn with_token(token: String, api: &ApiConfig) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token)
            .base_uri(api.base_url.as_str().trim_end_matches('/'))
            .with_context(|| format!("Invalid GitHub API URL: '{}'", api.base_url))?
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Page> {
        debug!(
            repo = %query.repo(),
            cursor = query.cursor().unwrap_or("<first>"),
            "Posting GraphQL page query"
        );

        let body: Value = self
            .client
            .graphql(&query.to_body())
            .await
            .with_context(|| format!("GraphQL request for {} failed", query.repo()))?;

        decode_page(query.source(), &query.repo().to_string(), body)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_github_token_preferred() {
        let token = token_from(env(&[("GITHUB_TOKEN", "ghp_a"), ("GH_TOKEN", "ghp_b")]));
        assert_eq!(token, Ok("ghp_a".to_string()));
    }

    #[test]
    fn test_gh_token_fallback() {
        assert_eq!(token_from(env(&[("GH_TOKEN", "ghp_b")])), Ok("ghp_b".into()));
        assert_eq!(
            token_from(env(&[("GITHUB_TOKEN", "  "), ("GH_TOKEN", "ghp_b")])),
            Ok("ghp_b".into())
        );
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(token_from(env(&[])), Err(StatsError::MissingToken));
    }

    #[test]
    fn test_api_url_parsing() {
        let api = ApiConfig::parse(DEFAULT_API_URL).unwrap();
        assert_eq!(api.base_url.host_str(), Some("api.github.com"));

        let enterprise = ApiConfig::parse("https://ghe.example.com/api").unwrap();
        assert_eq!(enterprise.base_url.path(), "/api");

        assert!(ApiConfig::parse("not a url").is_err());
        assert!(ApiConfig::parse("ftp://example.com").is_err());
    }
}
