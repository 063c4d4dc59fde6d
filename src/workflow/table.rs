//! Concatenates paginated listings into one ordered collection of records.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use super::{Record, Run, Workflow};
use crate::{
    config::{Repository, RunLimit},
    error::{Error, Result},
    github::{GitHubClient, Page},
};

/// Extracts the list field of `R` from every page and concatenates the lists.
///
/// Page order and intra-page order are preserved. A record whose id was already seen is dropped
/// (the first occurrence wins), which can happen if the listing shifts while it is paged through.
///
/// # Errors
///
/// Returns the first error yielded by `pages`, or an error if a page lacks the list field or the
/// list does not decode into `R`.
pub fn collect_records<R, I>(pages: I) -> Result<Vec<R>>
where
    R: Record + DeserializeOwned,
    I: IntoIterator<Item = Result<Page>>,
{
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for page in pages {
        let mut page = page?;
        let list = page
            .body
            .get_mut(R::LIST_FIELD)
            .map(Value::take)
            .ok_or_else(|| Error::MissingField {
                field: String::from(R::LIST_FIELD),
                url: page.url.clone(),
            })?;
        let batch = serde_json::from_value::<Vec<R>>(list).map_err(|source| Error::Decode {
            what: String::from(R::LIST_FIELD),
            url: page.url.clone(),
            source,
        })?;

        info!("{} {} at {}", batch.len(), R::LIST_FIELD, page.url);
        for record in batch {
            if seen.insert(record.id()) {
                records.push(record);
            } else {
                warn!(
                    "dropping duplicate record {} in {} at {}",
                    record.id(),
                    R::LIST_FIELD,
                    page.url
                );
            }
        }
    }

    Ok(records)
}

/// Fetches every workflow of the configured repository.
///
/// # Errors
///
/// See: [`collect_records`]
pub fn fetch_workflows(client: &GitHubClient) -> Result<Vec<Workflow>> {
    let workflows = collect_records(client.pages("actions/workflows"))?;
    info!("fetched {} workflows of {}", workflows.len(), client.repository());
    Ok(workflows)
}

/// Fetches the most recent runs of the configured repository, stopping after enough pages to
/// cover `limit`.
///
/// # Errors
///
/// See: [`collect_records`]
pub fn fetch_runs(client: &GitHubClient, limit: RunLimit) -> Result<Vec<Run>> {
    let per_page = client.config().per_page;
    let runs = collect_records(client.pages("actions/runs").capped(limit.get(), per_page))?;
    info!(
        "fetched {} runs of {} (limit {})",
        runs.len(),
        client.repository(),
        limit.get()
    );
    Ok(runs)
}

/// Composes the status badge URL of a workflow from its file path.
///
/// The first path segment is stripped, so `.github/workflows/ci.yml` becomes
/// `{server_url}/{owner}/{name}/actions/workflows/ci.yml/badge.svg`. Returns [`None`] for a path
/// without any `/`.
pub fn badge_url(server_url: &str, repository: &Repository, path: &str) -> Option<String> {
    let (_, suffix) = path.split_once('/')?;
    Some(format!("{server_url}/{repository}/actions/{suffix}/badge.svg"))
}
