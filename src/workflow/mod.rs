//! Data models of GitHub Actions workflows and runs.

#![cfg(feature = "workflow")]

use serde::{Deserialize, Serialize};

pub mod format;
pub mod table;

/// A record with an identity.
pub trait Record {
    /// The name of the list field holding these records in a page body.
    const LIST_FIELD: &'static str;

    /// The identity duplicates are detected by.
    fn id(&self) -> u64;
}

/// Represents a GitHub Actions workflow from GitHub REST API.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    pub state: String,
    /// The workflow file, relative to the repository root, e.g. `.github/workflows/ci.yml`.
    pub path: String,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
    pub badge_url: Option<String>,
}

impl Record for Workflow {
    const LIST_FIELD: &'static str = "workflows";

    fn id(&self) -> u64 {
        self.id
    }
}

/// Represents a GitHub Actions workflow run from GitHub REST API.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Run {
    pub id: u64,
    pub name: Option<String>,
    pub head_branch: Option<String>,
    pub run_number: u64,
    pub event: String,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub workflow_id: u64,
    pub run_started_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
    pub run_attempt: Option<u64>,
}

impl Record for Run {
    const LIST_FIELD: &'static str = "workflow_runs";

    fn id(&self) -> u64 {
        self.id
    }
}
