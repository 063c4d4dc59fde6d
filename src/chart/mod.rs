//! Chart specifications handed to the presentation layer.
//!
//! Charts are plain data: a layout plus the points to draw. They serialize to tagged JSON, e.g.
//! `{"type": "pie", "title": "...", "slices": [...]}`, and rendering them is left to the host.

#![cfg(feature = "charts")]

mod producers;

pub use producers::*;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The default colour sequence.
pub const PALETTE: [&str; 6] = [
    "#3431DE", "#DB247D", "#1F9E31", "#FBB900", "#23C3F1", "#FF720C",
];

/// Title, size and colours of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub palette: &'static [&'static str],
}

impl Layout {
    pub fn new(title: &str) -> Self {
        Self {
            title: String::from(title),
            width: None,
            height: None,
            palette: &PALETTE,
        }
    }

    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }
}

/// A chart specification.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Chart {
    Bar(BarChart),
    Scatter(ScatterChart),
    Pie(PieChart),
}

impl Chart {
    /// The title and sizing shared by every chart kind.
    pub fn layout(&self) -> &Layout {
        match self {
            Self::Bar(chart) => &chart.layout,
            Self::Scatter(chart) => &chart.layout,
            Self::Pie(chart) => &chart.layout,
        }
    }

    /// The number of data points.
    pub fn len(&self) -> usize {
        match self {
            Self::Bar(chart) => chart.bars.len(),
            Self::Scatter(chart) => chart.points.len(),
            Self::Pie(chart) => chart.slices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One bar per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    #[serde(flatten)]
    pub layout: Layout,
    /// The column on the x axis.
    pub x: &'static str,
    /// The column on the y axis.
    pub y: &'static str,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Points on a time axis against a categorical axis, grouped by colour and symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    #[serde(flatten)]
    pub layout: Layout,
    pub x: &'static str,
    pub y: &'static str,
    /// The column both colour and symbol are keyed on.
    pub group: &'static str,
    /// The column shown on hover.
    pub hover: &'static str,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: DateTime<Utc>,
    pub y: String,
    pub group: Option<String>,
    pub hover: String,
}

/// Proportions of the distinct values of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    #[serde(flatten)]
    pub layout: Layout,
    /// The column the slices are named after.
    pub names: &'static str,
    pub slices: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    /// Share of the non-null values, in `0.0..=1.0`.
    pub proportion: f64,
}
