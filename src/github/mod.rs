//! Blocking access to the GitHub REST API.

mod link;
mod pages;

pub use link::*;
pub use pages::*;

use reqwest::{
    blocking::{Client, RequestBuilder},
    header,
};
use tracing::debug;

use crate::{
    config::{Config, Repository},
    error::{Error, Result},
};

/// The API version every request pins.
pub const API_VERSION: &str = "2022-11-28";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A GitHub REST API client bound to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    config: Config,
}

impl GitHubClient {
    /// Creates a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the underlying HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| Error::Transport {
            url: config.api_url.clone(),
            source,
        })?;

        Ok(Self { http, config })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The repository every request targets.
    pub fn repository(&self) -> &Repository {
        &self.config.repository
    }

    /// The URL of the first page of a repository-scoped list endpoint.
    pub fn first_page_url(&self, path: &str, per_page: u8) -> String {
        format!(
            "{}/repos/{}/{}?per_page={per_page}",
            self.config.api_url,
            self.config.repository,
            path.trim_matches('/'),
        )
    }

    /// Builds a GET request carrying the accept and authorization headers.
    pub fn request(&self, url: &str) -> RequestBuilder {
        debug!("building request for {url}…");
        self.http
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.config.token)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Walks a repository-scoped list endpoint page by page with the configured page size.
    ///
    /// Nothing is requested until the returned iterator is polled.
    pub fn pages(&self, path: &str) -> Pages<'_> {
        Pages::new(self, self.first_page_url(path, self.config.per_page))
    }
}
