// src/measures.rs

//! Scalar measures derived from `DailyCodeChurn` records.
//!
//! Each aggregator answers three questions about a record: whether it
//! contributes anything, what a fresh measure seeded from it is worth, and
//! what an existing measure becomes once the record is folded in. Callers
//! check `has_value` first; a record without the relevant data contributes
//! zero (a new measure of 0, an existing measure left unchanged).

use crate::model::{DailyCodeChurn, DailyCodeChurnBugDatabase, Measure};
use serde::Serialize;

pub trait MeasureAggregator<T>: Send + Sync {
    fn has_value(&self, churn: &DailyCodeChurn) -> bool;
    fn value_for_new_measure(&self, churn: &DailyCodeChurn) -> T;
    fn value_for_existing_measure(&self, churn: &DailyCodeChurn, measure: &Measure<T>) -> T;
}

/// Describes a metric as emitted by a report writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub metric_key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub metric_type: &'static str,
    pub direction: i32,
    pub qualitative: bool,
    pub domain: &'static str,
}

impl Metric {
    pub const fn new(metric_key: &'static str, name: &'static str, description: &'static str) -> Self {
        Self {
            metric_key,
            name,
            description,
            metric_type: "INT",
            direction: 0,
            qualitative: false,
            domain: "Code churn",
        }
    }
}

pub struct LinesChangedMeasureAggregator;

impl MeasureAggregator<i64> for LinesChangedMeasureAggregator {
    fn has_value(&self, churn: &DailyCodeChurn) -> bool {
        churn.added != 0 || churn.deleted != 0
    }

    fn value_for_new_measure(&self, churn: &DailyCodeChurn) -> i64 {
        churn.total_lines_changed()
    }

    fn value_for_existing_measure(&self, churn: &DailyCodeChurn, measure: &Measure<i64>) -> i64 {
        measure.value + churn.total_lines_changed()
    }
}

pub struct LinesChangedWithFixesMeasureAggregator;

impl MeasureAggregator<i64> for LinesChangedWithFixesMeasureAggregator {
    fn has_value(&self, churn: &DailyCodeChurn) -> bool {
        churn.added_with_fixes != 0 || churn.deleted_with_fixes != 0
    }

    fn value_for_new_measure(&self, churn: &DailyCodeChurn) -> i64 {
        churn.total_lines_changed_with_fixes()
    }

    fn value_for_existing_measure(&self, churn: &DailyCodeChurn, measure: &Measure<i64>) -> i64 {
        measure.value + churn.total_lines_changed_with_fixes()
    }
}

pub struct NumberOfChangesMeasureAggregator;

impl MeasureAggregator<i64> for NumberOfChangesMeasureAggregator {
    fn has_value(&self, churn: &DailyCodeChurn) -> bool {
        churn.number_of_changes > 0
    }

    fn value_for_new_measure(&self, churn: &DailyCodeChurn) -> i64 {
        churn.number_of_changes
    }

    fn value_for_existing_measure(&self, churn: &DailyCodeChurn, measure: &Measure<i64>) -> i64 {
        measure.value + churn.number_of_changes
    }
}

pub struct NumberOfChangesWithFixesMeasureAggregator;

impl MeasureAggregator<i64> for NumberOfChangesWithFixesMeasureAggregator {
    fn has_value(&self, churn: &DailyCodeChurn) -> bool {
        churn.number_of_changes_with_fixes > 0
    }

    fn value_for_new_measure(&self, churn: &DailyCodeChurn) -> i64 {
        churn.number_of_changes_with_fixes
    }

    fn value_for_existing_measure(&self, churn: &DailyCodeChurn, measure: &Measure<i64>) -> i64 {
        measure.value + churn.number_of_changes_with_fixes
    }
}

fn lines_changed_in_fixes(bug_database: Option<&DailyCodeChurnBugDatabase>) -> i64 {
    bug_database.map_or(0, |b| b.added_in_fixes + b.deleted_in_fixes)
}

pub struct LinesChangedInFixesBugDatabaseMeasureAggregator;

impl MeasureAggregator<i64> for LinesChangedInFixesBugDatabaseMeasureAggregator {
    fn has_value(&self, churn: &DailyCodeChurn) -> bool {
        churn
            .bug_database
            .as_ref()
            .is_some_and(|b| b.added_in_fixes != 0 || b.deleted_in_fixes != 0)
    }

    fn value_for_new_measure(&self, churn: &DailyCodeChurn) -> i64 {
        lines_changed_in_fixes(churn.bug_database.as_ref())
    }

    fn value_for_existing_measure(&self, churn: &DailyCodeChurn, measure: &Measure<i64>) -> i64 {
        measure.value + lines_changed_in_fixes(churn.bug_database.as_ref())
    }
}

pub struct NumberOfChangesInFixesBugDatabaseMeasureAggregator;

impl MeasureAggregator<i64> for NumberOfChangesInFixesBugDatabaseMeasureAggregator {
    fn has_value(&self, churn: &DailyCodeChurn) -> bool {
        churn
            .bug_database
            .as_ref()
            .is_some_and(|b| b.number_of_changes_in_fixes > 0)
    }

    fn value_for_new_measure(&self, churn: &DailyCodeChurn) -> i64 {
        churn.bug_database.as_ref().map_or(0, |b| b.number_of_changes_in_fixes)
    }

    fn value_for_existing_measure(&self, churn: &DailyCodeChurn, measure: &Measure<i64>) -> i64 {
        measure.value + self.value_for_new_measure(churn)
    }
}

/// Distinct authors on a file-day. Folding keeps the busiest day, since
/// author names are not carried in the measure.
pub struct NumberOfAuthorsMeasureAggregator;

impl MeasureAggregator<i64> for NumberOfAuthorsMeasureAggregator {
    fn has_value(&self, churn: &DailyCodeChurn) -> bool {
        !churn.authors.is_empty()
    }

    fn value_for_new_measure(&self, churn: &DailyCodeChurn) -> i64 {
        churn.authors.len() as i64
    }

    fn value_for_existing_measure(&self, churn: &DailyCodeChurn, measure: &Measure<i64>) -> i64 {
        measure.value.max(churn.authors.len() as i64)
    }
}

/// A metric paired with the aggregator that computes it
pub struct RegistryEntry {
    pub metric: Metric,
    pub aggregator: &'static dyn MeasureAggregator<i64>,
}

pub static REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        metric: Metric::new("lines_changed", "Lines changed", "Lines added plus lines deleted"),
        aggregator: &LinesChangedMeasureAggregator,
    },
    RegistryEntry {
        metric: Metric::new(
            "lines_changed_with_fixes",
            "Lines changed in fixes",
            "Lines added plus lines deleted in changesets whose message marks a bug fix",
        ),
        aggregator: &LinesChangedWithFixesMeasureAggregator,
    },
    RegistryEntry {
        metric: Metric::new("number_of_changes", "Number of changes", "Number of changesets touching the file"),
        aggregator: &NumberOfChangesMeasureAggregator,
    },
    RegistryEntry {
        metric: Metric::new(
            "number_of_changes_with_fixes",
            "Number of changes in fixes",
            "Number of changesets touching the file whose message marks a bug fix",
        ),
        aggregator: &NumberOfChangesWithFixesMeasureAggregator,
    },
    RegistryEntry {
        metric: Metric::new(
            "lines_changed_in_fixes_bugdatabase",
            "Lines changed in fixes (bug database)",
            "Lines added plus lines deleted in changesets linked to a work item",
        ),
        aggregator: &LinesChangedInFixesBugDatabaseMeasureAggregator,
    },
    RegistryEntry {
        metric: Metric::new(
            "number_of_changes_in_fixes_bugdatabase",
            "Number of changes in fixes (bug database)",
            "Number of changesets linked to a work item touching the file",
        ),
        aggregator: &NumberOfChangesInFixesBugDatabaseMeasureAggregator,
    },
    RegistryEntry {
        metric: Metric::new("number_of_authors", "Number of authors", "Most distinct authors on a single day"),
        aggregator: &NumberOfAuthorsMeasureAggregator,
    },
];

/// Looks up a registered metric by key
pub fn find(metric_key: &str) -> Option<&'static RegistryEntry> {
    REGISTRY.iter().find(|e| e.metric.metric_key == metric_key)
}
