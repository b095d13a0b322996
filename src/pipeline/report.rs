//! Reconstruction output with processing statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{OutputUnit, Span};

/// Result of reconstructing a document: the ordered units and a report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessOutput {
    pub units: Vec<OutputUnit>,
    pub report: ProcessReport,
}

impl ProcessOutput {
    /// Create a new process output.
    pub fn new(units: Vec<OutputUnit>, report: ProcessReport) -> Self {
        Self { units, report }
    }

    /// Number of output units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Statistics collected during one assembly pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReport {
    /// Number of elements taken from the ordered stream
    pub elements_visited: usize,

    /// Number of output units emitted
    pub units_emitted: usize,

    /// Elements that failed to convert, counted by kind
    pub unprocessed: BTreeMap<String, usize>,

    /// Elements suppressed by an enclosing element's span
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedElement>,

    /// Whether the pass stopped at the configured element limit
    pub stopped_early: bool,
}

/// An element suppressed because a claimed span already covers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedElement {
    pub element_id: String,
    pub spans: Vec<Span>,
    /// The claimed span that covered it
    pub covered_by: Span,
}

impl ProcessReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an element of `kind` that failed to convert.
    pub fn add_unprocessed(&mut self, kind: &str) {
        *self.unprocessed.entry(kind.to_string()).or_insert(0) += 1;
    }

    /// Total number of failed elements.
    pub fn unprocessed_total(&self) -> usize {
        self.unprocessed.values().sum()
    }

    /// One-line summary of failed elements, e.g. "table: 2, word: 1".
    pub fn unprocessed_summary(&self) -> String {
        self.unprocessed
            .iter()
            .map(|(kind, count)| format!("{}: {}", kind, count))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: &ProcessReport) {
        self.elements_visited += other.elements_visited;
        self.units_emitted += other.units_emitted;
        for (kind, count) in &other.unprocessed {
            *self.unprocessed.entry(kind.clone()).or_insert(0) += count;
        }
        self.skipped.extend(other.skipped.iter().cloned());
        self.stopped_early |= other.stopped_early;
    }
}
