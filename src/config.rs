//! Explicit configuration handed to the fetcher at construction time.

use std::{fmt::Display, str::FromStr, time::Duration};

use serde::Serialize;

use crate::error::{Error, Result};

/// The largest page size the REST API accepts.
pub const MAX_PER_PAGE: u8 = 100;

/// The default REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// The default web root, used to compose badge links.
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// A repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidRepository(String::from(s));
        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            owner: String::from(owner),
            name: String::from(name),
        })
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// How many runs a dashboard cycle asks for. Mirrors the page-count selector of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunLimit(u32);

impl RunLimit {
    /// The values the selector offers.
    pub const OPTIONS: [u32; 6] = [100, 200, 300, 500, 1000, 2000];

    /// Validates a selector value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRunLimit`] if `value` is not one of [`Self::OPTIONS`].
    pub fn new(value: u32) -> Result<Self> {
        if Self::OPTIONS.contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidRunLimit(value))
        }
    }

    /// The requested number of runs.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for RunLimit {
    fn default() -> Self {
        Self(500)
    }
}

/// Everything a [`GitHubClient`](crate::github::GitHubClient) needs.
#[derive(Clone)]
pub struct Config {
    /// Bearer token sent with every request.
    pub token: String,
    /// The repository whose workflows and runs are shown.
    pub repository: Repository,
    /// REST API root, without a trailing slash.
    pub api_url: String,
    /// Web root used for badge links, without a trailing slash.
    pub server_url: String,
    /// Records requested per page, between 1 and 100.
    pub per_page: u8,
    /// How many of the latest runs to fetch.
    pub run_limit: RunLimit,
    /// Per-request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .field("api_url", &self.api_url)
            .field("server_url", &self.server_url)
            .field("per_page", &self.per_page)
            .field("run_limit", &self.run_limit)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Creates a configuration against github.com with the default page size and run limit.
    pub fn new(token: String, repository: Repository) -> Self {
        Self {
            token,
            repository,
            api_url: String::from(DEFAULT_API_URL),
            server_url: String::from(DEFAULT_SERVER_URL),
            per_page: MAX_PER_PAGE,
            run_limit: RunLimit::default(),
            timeout: None,
        }
    }

    /// Points the client at another REST API root, e.g. a GitHub Enterprise host.
    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = String::from(api_url.trim_end_matches('/'));
        self
    }

    /// Changes the web root used for badge links.
    #[must_use]
    pub fn with_server_url(mut self, server_url: &str) -> Self {
        self.server_url = String::from(server_url.trim_end_matches('/'));
        self
    }

    /// Sets the page size, clamped to `1..=100`.
    #[must_use]
    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    #[must_use]
    pub fn with_run_limit(mut self, run_limit: RunLimit) -> Self {
        self.run_limit = run_limit;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(all(
    feature = "env_github_token",
    feature = "env_github_repository",
    feature = "env_max_runs"
))]
impl Config {
    /// Builds the configuration from the environment.
    ///
    /// See: [`crate::env`]
    ///
    /// # Errors
    ///
    /// Returns an error if `GITHUB_TOKEN` or `GITHUB_REPOSITORY` is missing, the repository is
    /// not `owner/name`, or `MAX_RUNS` is not one of [`RunLimit::OPTIONS`].
    pub fn from_env() -> anyhow::Result<Self> {
        use anyhow::{Context as _, anyhow};

        use crate::env::{
            GITHUB_API_URL, GITHUB_REPOSITORY, GITHUB_SERVER_URL, GITHUB_TOKEN, MAX_RUNS,
        };

        let token = GITHUB_TOKEN
            .clone()
            .context("GITHUB_TOKEN not set in environment")?;
        let repository = GITHUB_REPOSITORY
            .as_deref()
            .context("GITHUB_REPOSITORY not set in environment")?
            .parse::<Repository>()?;
        let run_limit = match &*MAX_RUNS {
            None => RunLimit::default(),
            Some(Ok(value)) => RunLimit::new(*value)?,
            Some(Err(err)) => return Err(anyhow!("invalid MAX_RUNS: {err}")),
        };

        Ok(Self::new(token, repository)
            .with_api_url(&GITHUB_API_URL)
            .with_server_url(&GITHUB_SERVER_URL)
            .with_run_limit(run_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_and_name() {
        let repo: Repository = "octo-org/hello-world".parse().unwrap();
        assert_eq!(repo.owner, "octo-org");
        assert_eq!(repo.name, "hello-world");
        assert_eq!(repo.to_string(), "octo-org/hello-world");
    }

    #[test]
    fn rejects_malformed_repositories() {
        for input in ["", "octo-org", "/hello", "octo/", "a/b/c"] {
            assert!(
                matches!(input.parse::<Repository>(), Err(Error::InvalidRepository(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn run_limit_only_accepts_selector_values() {
        assert_eq!(RunLimit::default().get(), 500);
        assert_eq!(RunLimit::new(2000).unwrap().get(), 2000);
        assert!(matches!(RunLimit::new(250), Err(Error::InvalidRunLimit(250))));
    }

    #[test]
    fn page_size_is_clamped() {
        let repo: Repository = "o/r".parse().unwrap();
        let config = Config::new(String::from("t"), repo);
        assert_eq!(config.clone().with_per_page(0).per_page, 1);
        assert_eq!(config.clone().with_per_page(250).per_page, 100);
        assert_eq!(config.with_per_page(30).per_page, 30);
    }

    #[test]
    fn urls_lose_trailing_slashes() {
        let repo: Repository = "o/r".parse().unwrap();
        let config = Config::new(String::from("t"), repo)
            .with_api_url("https://ghe.example.com/api/v3/")
            .with_server_url("https://ghe.example.com/");
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.server_url, "https://ghe.example.com");
        assert!(!format!("{config:?}").contains("\"t\""));
    }
}
