//! Lazy traversal of paginated list endpoints.

use std::{
    collections::HashSet,
    iter::{FusedIterator, Take},
};

use reqwest::header;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{GitHubClient, NextLink, next_link};
use crate::error::{Error, Result};

/// One response of a paginated listing.
#[derive(Debug, Clone)]
pub struct Page {
    /// The URL this page was requested from.
    pub url: String,
    /// The decoded JSON body.
    pub body: Value,
    /// The URL of the next page, taken verbatim from the `Link` header.
    pub next: Option<String>,
}

/// A lazy, finite sequence of pages.
///
/// The sequence ends with [`None`] once a page carries no `next` relation. A failed request is
/// yielded once as [`Err`], after which the iterator is exhausted as well. Nothing is retried.
/// A `next` link back to a page already requested also ends the sequence.
#[derive(Debug)]
pub struct Pages<'a> {
    client: &'a GitHubClient,
    cursor: Option<String>,
    requested: HashSet<String>,
    requests: usize,
}

impl<'a> Pages<'a> {
    /// Starts a traversal at `url`.
    pub fn new(client: &'a GitHubClient, url: String) -> Self {
        Self {
            client,
            cursor: Some(url),
            requested: HashSet::new(),
            requests: 0,
        }
    }

    /// The number of requests issued so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Stops the traversal after enough pages to cover `desired` records.
    ///
    /// See: [`page_cap`]
    pub fn capped(self, desired: u32, per_page: u8) -> Take<Self> {
        self.take(page_cap(desired, per_page))
    }

    fn fetch(&mut self, url: String) -> Result<Page> {
        self.requests += 1;
        let index = self.requests;
        debug!("fetching page {index} from {url}…");

        let response = match self.client.request(&url).send() {
            Ok(response) => response,
            Err(source) => {
                error!("failed to fetch page {index} from {url}: {source}");
                return Err(Error::Transport { url, source });
            }
        };

        let status = response.status();
        let link = response
            .headers()
            .get(header::LINK)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| String::from("<failed to read response body>"));
            match status.canonical_reason() {
                Some(reason) => error!(
                    "failed to fetch page {index} from {url}: {} {reason}",
                    status.as_u16()
                ),
                None => error!("failed to fetch page {index} from {url}: {}", status.as_u16()),
            }
            return Err(Error::Status {
                url,
                status: status.as_u16(),
                message,
            });
        }

        let text = match response.text() {
            Ok(text) => text,
            Err(source) => {
                error!("failed to read page {index} from {url}: {source}");
                return Err(Error::Transport { url, source });
            }
        };
        let body = serde_json::from_str::<Value>(&text).map_err(|source| {
            error!("failed to parse page {index} from {url}: {source}");
            Error::Decode {
                what: String::from("page body"),
                url: url.clone(),
                source,
            }
        })?;

        let next = match link.as_deref().map(next_link) {
            None => {
                debug!("no link header at {url}, this was the only page");
                None
            }
            Some(NextLink::Next(next)) => Some(next),
            Some(NextLink::Last) => {
                debug!("no more pages after {url}");
                None
            }
            Some(NextLink::Malformed) => {
                warn!("unparseable link header at {url}, stopping pagination: {link:?}");
                None
            }
        };

        info!("fetched page {index} from {url}");
        Ok(Page { url, body, next })
    }
}

impl Iterator for Pages<'_> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        let url = self.cursor.take()?;
        self.requested.insert(url.clone());
        let page = self.fetch(url);
        if let Ok(Page {
            url,
            next: Some(next),
            ..
        }) = &page
        {
            if self.requested.contains(next) {
                warn!("next link at {url} points back to {next}, stopping pagination");
            } else {
                self.cursor = Some(next.clone());
            }
        }
        Some(page)
    }
}

impl FusedIterator for Pages<'_> {}

/// The number of pages needed for `desired` records at `per_page` records each, rounded up.
pub fn page_cap(desired: u32, per_page: u8) -> usize {
    let pages = desired.div_ceil(u32::from(per_page.max(1)));
    usize::try_from(pages).unwrap_or(usize::MAX)
}
