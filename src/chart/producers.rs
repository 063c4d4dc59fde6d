use std::collections::{BTreeMap, HashMap};

use super::{Bar, BarChart, Chart, Layout, PieChart, ScatterChart, ScatterPoint, Slice};
use crate::workflow::format::{CategoricalColumn, RunTable, seconds};

/// Mean run duration per workflow name in seconds, longest first.
///
/// Runs without a name or without a duration are left out. Equal means are ordered by name.
pub fn mean_duration_by_name(runs: &RunTable) -> Chart {
    let mut totals: BTreeMap<&str, (f64, u32)> = BTreeMap::new();
    for row in &runs.rows {
        let (Some(name), Some(duration)) = (row.name.as_deref(), row.run_duration) else {
            continue;
        };
        let (sum, count) = totals.entry(name).or_default();
        *sum += seconds(duration);
        *count += 1;
    }

    let mut bars: Vec<Bar> = totals
        .into_iter()
        .map(|(name, (sum, count))| Bar {
            label: String::from(name),
            value: sum / f64::from(count),
        })
        .collect();
    bars.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.label.cmp(&b.label)));

    Chart::Bar(BarChart {
        layout: Layout::new("Mean run duration per workflow in seconds"),
        x: "name",
        y: "mean_run_duration_sec",
        bars,
    })
}

/// Completed runs over time, one row per workflow, grouped by conclusion.
///
/// Runs that never started have no position on the time axis and are left out.
pub fn status_over_time(runs: &RunTable) -> Chart {
    let points = runs
        .rows
        .iter()
        .filter(|row| row.status.as_deref() == Some("completed"))
        .filter_map(|row| {
            Some(ScatterPoint {
                x: row.run_started_at?,
                y: row.name.clone().unwrap_or_default(),
                group: row.conclusion.clone(),
                hover: row.run_url.clone(),
            })
        })
        .collect();

    Chart::Scatter(ScatterChart {
        layout: Layout::new("Runs with status completed").height(700),
        x: "run_started_at",
        y: "name",
        group: "conclusion",
        hover: "run_url",
        points,
    })
}

/// Normalized value counts of a column.
///
/// Missing values are not counted. Slices are ordered by count, most frequent first, with ties in
/// order of first appearance. The proportions sum to one unless there are no values at all.
pub fn value_proportions(runs: &RunTable, column: CategoricalColumn) -> Vec<Slice> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for value in runs.categorical(column).flatten() {
        let count = counts.entry(value).or_insert_with(|| {
            order.push(value);
            0
        });
        *count += 1;
    }

    let total: u32 = counts.values().sum();
    // stable, so ties keep first-seen order
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order
        .into_iter()
        .map(|value| Slice {
            label: String::from(value),
            proportion: f64::from(counts[value]) / f64::from(total),
        })
        .collect()
}

/// A pie of the proportions of `column`.
pub fn proportion_pie(runs: &RunTable, column: CategoricalColumn, title: &str) -> Chart {
    Chart::Pie(PieChart {
        layout: Layout::new(title).width(500),
        names: column.name(),
        slices: value_proportions(runs, column),
    })
}

/// Share of each conclusion among the runs.
pub fn conclusion_pie(runs: &RunTable) -> Chart {
    proportion_pie(
        runs,
        CategoricalColumn::Conclusion,
        "Success rate of the selected runs",
    )
}

/// Share of each triggering event among the runs.
pub fn event_pie(runs: &RunTable) -> Chart {
    proportion_pie(runs, CategoricalColumn::Event, "Distribution by triggering event")
}

/// Share of each head branch among the runs.
pub fn branch_pie(runs: &RunTable) -> Chart {
    proportion_pie(runs, CategoricalColumn::HeadBranch, "Distribution by branch")
}
