//! One fetch-and-render cycle of the Actions dashboard.

#![cfg(feature = "dashboard")]

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    chart::{self, Chart},
    config::{Repository, RunLimit},
    error::Result,
    github::GitHubClient,
    workflow::{
        format::{RunTable, WorkflowTable},
        table::{fetch_runs, fetch_workflows},
    },
};

/// Everything the presentation layer shows, built from one fetch.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub repository: Repository,
    pub fetched_at: DateTime<Utc>,
    pub run_limit: RunLimit,
    /// The overview: one row per workflow with its status badge.
    pub workflows: WorkflowTable,
    pub charts: Charts,
    pub runs: RunViews,
}

/// The charts of the details view, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct Charts {
    pub conclusion: Chart,
    pub event: Chart,
    pub branch: Chart,
    pub mean_duration: Chart,
    pub status_over_time: Chart,
}

impl Charts {
    pub fn new(runs: &RunTable) -> Self {
        Self {
            conclusion: chart::conclusion_pie(runs),
            event: chart::event_pie(runs),
            branch: chart::branch_pie(runs),
            mean_duration: chart::mean_duration_by_name(runs),
            status_over_time: chart::status_over_time(runs),
        }
    }
}

/// The run tables of the details view.
#[derive(Debug, Clone, Serialize)]
pub struct RunViews {
    pub failures: RunTable,
    pub in_progress: RunTable,
    pub all: RunTable,
}

impl RunViews {
    pub fn new(runs: RunTable) -> Self {
        Self {
            failures: runs.failures(),
            in_progress: runs.in_progress(),
            all: runs,
        }
    }
}

impl Dashboard {
    /// Fetches workflows and the latest runs and renders them.
    ///
    /// Every call starts from scratch; nothing is kept between calls.
    ///
    /// # Errors
    ///
    /// Returns the first transport, decoding or formatting error. The cycle is abandoned as a
    /// whole; there is no partial dashboard.
    pub fn refresh(client: &GitHubClient, run_limit: RunLimit) -> Result<Self> {
        let config = client.config();
        info!("refreshing dashboard of {}…", config.repository);

        let workflows = fetch_workflows(client)?;
        let workflows = WorkflowTable::format(&workflows, &config.server_url, &config.repository)?;
        debug!("formatted {} workflows", workflows.len());

        let runs = RunTable::format(&fetch_runs(client, run_limit)?)?;
        debug!("formatted {} runs", runs.len());

        let dashboard = Self {
            repository: config.repository.clone(),
            fetched_at: Utc::now(),
            run_limit,
            charts: Charts::new(&runs),
            runs: RunViews::new(runs),
            workflows,
        };
        info!(
            "refreshed dashboard of {}: {} workflows, {} runs",
            dashboard.repository,
            dashboard.workflows.len(),
            dashboard.runs.all.len()
        );
        Ok(dashboard)
    }
}
