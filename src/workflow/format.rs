//! Type coercion, derived columns and fixed column projections of the raw tables.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

use super::{Run, Workflow, table::badge_url};
use crate::{
    config::Repository,
    error::{Error, Result},
};

/// The projected workflow columns, in display order.
pub const WORKFLOW_COLUMNS: [&str; 6] = [
    "badge_url",
    "name",
    "state",
    "created_at",
    "updated_at",
    "html_url",
];

/// The projected run columns, in display order.
pub const RUN_COLUMNS: [&str; 14] = [
    "name",
    "head_branch",
    "run_number",
    "event",
    "status",
    "conclusion",
    "run_started_at",
    "html_url",
    "created_at",
    "updated_at",
    "run_duration",
    "run_attempt",
    "conclusion_code",
    "run_url",
];

/// A workflow as displayed. Fields serialize in [`WORKFLOW_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowRow {
    pub badge_url: Option<String>,
    pub name: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub html_url: String,
}

/// The formatted workflow table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowTable {
    pub rows: Vec<WorkflowRow>,
}

impl WorkflowTable {
    /// Formats workflows and derives their badge links.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timestamp`] if a timestamp is not RFC 3339.
    pub fn format(
        workflows: &[Workflow],
        server_url: &str,
        repository: &Repository,
    ) -> Result<Self> {
        let rows = workflows
            .iter()
            .map(|workflow| {
                let id = workflow.id;
                Ok(WorkflowRow {
                    badge_url: badge_url(server_url, repository, &workflow.path),
                    name: workflow.name.clone(),
                    state: workflow.state.clone(),
                    created_at: parse_field("created_at", id, &workflow.created_at)?,
                    updated_at: parse_field("updated_at", id, &workflow.updated_at)?,
                    html_url: workflow.html_url.clone(),
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self { rows })
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &WORKFLOW_COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A run as displayed. Fields serialize in [`RUN_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRow {
    #[serde(skip)]
    pub id: u64,
    pub name: Option<String>,
    pub head_branch: Option<String>,
    pub run_number: u64,
    pub event: String,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    /// Unset while the run is queued.
    pub run_started_at: Option<DateTime<Utc>>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `updated_at - run_started_at`. Negative if the two clocks disagree, unset if the run has
    /// not started.
    #[serde(serialize_with = "serialize_seconds")]
    pub run_duration: Option<TimeDelta>,
    pub run_attempt: Option<u64>,
    /// Index of `conclusion` in [`RunTable::conclusions`], `-1` without a conclusion.
    pub conclusion_code: i32,
    pub run_url: String,
}

/// The string-valued run columns that charts group by.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    Name,
    HeadBranch,
    Event,
    Status,
    Conclusion,
}

impl CategoricalColumn {
    pub fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::HeadBranch => "head_branch",
            Self::Event => "event",
            Self::Status => "status",
            Self::Conclusion => "conclusion",
        }
    }

    pub fn get(self, row: &RunRow) -> Option<&str> {
        match self {
            Self::Name => row.name.as_deref(),
            Self::HeadBranch => row.head_branch.as_deref(),
            Self::Event => Some(row.event.as_str()),
            Self::Status => row.status.as_deref(),
            Self::Conclusion => row.conclusion.as_deref(),
        }
    }
}

/// The sorted distinct values of a categorical column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Categories(Vec<String>);

impl Categories {
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let distinct: BTreeSet<&str> = values.into_iter().flatten().collect();
        Self(distinct.into_iter().map(String::from).collect())
    }

    /// The code of `value`, `-1` for a missing or unknown value.
    pub fn code(&self, value: Option<&str>) -> i32 {
        value
            .and_then(|value| self.0.binary_search_by(|c| c.as_str().cmp(value)).ok())
            .and_then(|index| i32::try_from(index).ok())
            .unwrap_or(-1)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }
}

/// The formatted run table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunTable {
    pub rows: Vec<RunRow>,
    /// The categories `conclusion_code` indexes into.
    pub conclusions: Categories,
}

impl RunTable {
    /// Coerces timestamps, derives durations, conclusion codes and links.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timestamp`] if a timestamp is not RFC 3339. A null `run_started_at` is
    /// kept as a missing value along with the duration.
    pub fn format(runs: &[Run]) -> Result<Self> {
        let conclusions = Categories::from_values(runs.iter().map(|run| run.conclusion.as_deref()));

        let rows = runs
            .iter()
            .map(|run| {
                let run_started_at = run
                    .run_started_at
                    .as_deref()
                    .map(|value| parse_field("run_started_at", run.id, value))
                    .transpose()?;
                let updated_at = parse_field("updated_at", run.id, &run.updated_at)?;
                Ok(RunRow {
                    id: run.id,
                    name: run.name.clone(),
                    head_branch: run.head_branch.clone(),
                    run_number: run.run_number,
                    event: run.event.clone(),
                    status: run.status.clone(),
                    conclusion: run.conclusion.clone(),
                    run_started_at,
                    html_url: run.html_url.clone(),
                    created_at: parse_field("created_at", run.id, &run.created_at)?,
                    updated_at,
                    run_duration: run_started_at.map(|started| updated_at - started),
                    run_attempt: run.run_attempt,
                    conclusion_code: conclusions.code(run.conclusion.as_deref()),
                    run_url: html_link(&run.html_url, "GitHub url"),
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self { rows, conclusions })
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &RUN_COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The values of a categorical column, in row order.
    pub fn categorical(&self, column: CategoricalColumn) -> impl Iterator<Item = Option<&str>> {
        self.rows.iter().map(move |row| column.get(row))
    }

    /// A copy holding only the rows matching `predicate`. Conclusion codes stay as they are.
    #[must_use]
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&RunRow) -> bool,
    {
        Self {
            rows: self.rows.iter().filter(|row| predicate(row)).cloned().collect(),
            conclusions: self.conclusions.clone(),
        }
    }

    #[must_use]
    pub fn completed(&self) -> Self {
        self.filter(|row| row.status.as_deref() == Some("completed"))
    }

    /// Runs still queued or in progress.
    #[must_use]
    pub fn in_progress(&self) -> Self {
        self.filter(|row| row.status.as_deref() != Some("completed"))
    }

    #[must_use]
    pub fn failures(&self) -> Self {
        self.filter(|row| row.conclusion.as_deref() == Some("failure"))
    }
}

/// Duration in seconds, with millisecond precision.
pub fn seconds(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

fn serialize_seconds<S>(
    delta: &Option<TimeDelta>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match delta {
        Some(delta) => serializer.serialize_f64(seconds(*delta)),
        None => serializer.serialize_none(),
    }
}

fn parse_field(field: &'static str, id: u64, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|source| Error::Timestamp {
            field,
            id,
            value: String::from(value),
            source,
        })
}

/// An HTML anchor to `url`, attribute-escaped.
pub fn html_link(url: &str, label: &str) -> String {
    let mut href = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '&' => href.push_str("&amp;"),
            '"' => href.push_str("&quot;"),
            '<' => href.push_str("&lt;"),
            '>' => href.push_str("&gt;"),
            c => href.push(c),
        }
    }
    format!(r#"<a href="{href}">{label}</a>"#)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn run(id: u64, conclusion: Option<&str>, started: &str, updated: &str) -> Run {
        Run {
            id,
            name: Some(String::from("CI")),
            head_branch: Some(String::from("main")),
            run_number: id,
            event: String::from("push"),
            status: Some(String::from(if conclusion.is_some() { "completed" } else { "in_progress" })),
            conclusion: conclusion.map(String::from),
            workflow_id: 1,
            run_started_at: Some(String::from(started)),
            created_at: String::from(started),
            updated_at: String::from(updated),
            html_url: format!("https://github.com/o/r/actions/runs/{id}"),
            run_attempt: Some(1),
        }
    }

    #[test]
    fn derives_duration_from_timestamps() {
        let runs = [run(1, Some("success"), "2024-03-01T10:00:00Z", "2024-03-01T10:02:30Z")];
        let table = RunTable::format(&runs).unwrap();
        let duration = table.rows[0].run_duration.unwrap();
        assert_eq!(duration, TimeDelta::seconds(150));
        assert!((seconds(duration) - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_durations_are_kept() {
        let runs = [run(1, Some("success"), "2024-03-01T10:00:10Z", "2024-03-01T10:00:00Z")];
        let table = RunTable::format(&runs).unwrap();
        assert_eq!(table.rows[0].run_duration, Some(TimeDelta::seconds(-10)));
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let runs = [run(1, None, "2024-03-01T12:00:00+02:00", "2024-03-01T10:00:05Z")];
        let table = RunTable::format(&runs).unwrap();
        let started = table.rows[0].run_started_at.unwrap();
        assert_eq!(started.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert_eq!(table.rows[0].run_duration, Some(TimeDelta::seconds(5)));
    }

    #[test]
    fn conclusion_codes_follow_sorted_categories() {
        let at = "2024-03-01T10:00:00Z";
        let runs = [
            run(1, Some("success"), at, at),
            run(2, Some("failure"), at, at),
            run(3, None, at, at),
            run(4, Some("cancelled"), at, at),
            run(5, Some("success"), at, at),
        ];
        let table = RunTable::format(&runs).unwrap();

        assert_eq!(table.conclusions.labels(), ["cancelled", "failure", "success"]);
        let codes: Vec<_> = table.rows.iter().map(|row| row.conclusion_code).collect();
        assert_eq!(codes, vec![2, 1, -1, 0, 2]);
    }

    #[test]
    fn queued_runs_keep_their_row_without_a_duration() {
        let mut queued = run(7, None, "2024-03-01T10:00:00Z", "2024-03-01T10:00:00Z");
        queued.status = Some(String::from("queued"));
        queued.run_started_at = None;
        let done = run(8, Some("success"), "2024-03-01T10:00:00Z", "2024-03-01T10:00:20Z");

        let table = RunTable::format(&[queued, done]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].run_started_at, None);
        assert_eq!(table.rows[0].run_duration, None);
        assert_eq!(table.rows[1].run_duration, Some(TimeDelta::seconds(20)));

        let value = serde_json::to_value(&table.rows[0]).unwrap();
        assert!(value["run_started_at"].is_null());
        assert!(value["run_duration"].is_null());
    }

    #[test]
    fn unparseable_timestamps_are_errors() {
        let invalid = run(8, None, "yesterday", "2024-03-01T10:00:00Z");
        let Err(Error::Timestamp { field, id, value, .. }) = RunTable::format(&[invalid]) else {
            panic!("expected a timestamp error");
        };
        assert_eq!((field, id, value.as_str()), ("run_started_at", 8, "yesterday"));

        let mut invalid = run(9, None, "2024-03-01T10:00:00Z", "2024-03-01T10:00:00Z");
        invalid.updated_at = String::from("2024-03-01 10:00");
        assert!(matches!(
            RunTable::format(&[invalid]),
            Err(Error::Timestamp { field: "updated_at", id: 9, .. })
        ));
    }

    /// Byte offsets of `columns` as keys in `json`, which must be increasing.
    fn assert_key_order(json: &str, columns: &[&str]) {
        let offsets: Vec<usize> = columns
            .iter()
            .map(|column| {
                json.find(&format!("\"{column}\":"))
                    .unwrap_or_else(|| panic!("column {column} missing from {json}"))
            })
            .collect();
        assert!(
            offsets.is_sorted_by(|a, b| a < b),
            "columns out of order in {json}"
        );
    }

    #[test]
    fn rows_serialize_in_column_order() {
        let runs = [run(1, Some("success"), "2024-03-01T10:00:00Z", "2024-03-01T10:01:00Z")];
        let table = RunTable::format(&runs).unwrap();

        let json = serde_json::to_string(&table.rows[0]).unwrap();
        assert_key_order(&json, &RUN_COLUMNS);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_object().unwrap().len(), RUN_COLUMNS.len());
        assert_eq!(value["run_duration"], json!(60.0));
        assert_eq!(
            value["run_url"],
            json!(r#"<a href="https://github.com/o/r/actions/runs/1">GitHub url</a>"#)
        );
    }

    #[test]
    fn workflow_rows_serialize_in_column_order() {
        let row = WorkflowRow {
            badge_url: None,
            name: String::from("CI"),
            state: String::from("active"),
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            updated_at: "2024-02-01T00:00:00Z".parse().unwrap(),
            html_url: String::from("https://github.com/o/r/blob/main/.github/workflows/ci.yml"),
        };

        let json = serde_json::to_string(&row).unwrap();
        assert_key_order(&json, &WORKFLOW_COLUMNS);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_object().unwrap().len(), WORKFLOW_COLUMNS.len());
    }

    #[test]
    fn filters_leave_the_source_untouched() {
        let at = "2024-03-01T10:00:00Z";
        let runs = [
            run(1, Some("success"), at, at),
            run(2, Some("failure"), at, at),
            run(3, None, at, at),
        ];
        let table = RunTable::format(&runs).unwrap();

        assert_eq!(table.completed().len(), 2);
        assert_eq!(table.in_progress().rows[0].id, 3);
        assert_eq!(table.failures().rows[0].id, 2);
        assert_eq!(table.failures().rows[0].conclusion_code, 0);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn workflows_get_badges() {
        let repo: Repository = "o/r".parse().unwrap();
        let workflows = [Workflow {
            id: 1,
            name: String::from("CI"),
            state: String::from("active"),
            path: String::from(".github/workflows/ci.yml"),
            created_at: String::from("2024-01-01T00:00:00Z"),
            updated_at: String::from("2024-02-01T00:00:00Z"),
            html_url: String::from("https://github.com/o/r/blob/main/.github/workflows/ci.yml"),
            badge_url: None,
        }];

        let table = WorkflowTable::format(&workflows, "https://github.com", &repo).unwrap();
        assert_eq!(
            table.rows[0].badge_url.as_deref(),
            Some("https://github.com/o/r/actions/workflows/ci.yml/badge.svg")
        );
        assert_eq!(table.columns(), WORKFLOW_COLUMNS);
    }

    #[test]
    fn links_are_escaped() {
        assert_eq!(
            html_link("https://x/?a=1&b=\"2\"", "x"),
            r#"<a href="https://x/?a=1&amp;b=&quot;2&quot;">x</a>"#
        );
    }
}
