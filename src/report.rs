// src/report.rs

use crate::measures::{MeasureAggregator, Metric, RegistryEntry};
use crate::model::{ChurnOutput, Measure};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeasure {
    pub file_name: String,
    pub value: i64,
}

/// Every file's measure for one metric, sorted by file name
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricMeasures {
    pub metric: Metric,
    pub measures: Vec<FileMeasure>,
}

/// Computes each metric in `entries` over the whole churn output.
///
/// Metrics are independent of each other and aggregators hold no state, so
/// they are folded in parallel.
pub fn generate_measures(output: &ChurnOutput, entries: &[RegistryEntry]) -> Vec<MetricMeasures> {
    let bar = ProgressBar::new(entries.len() as u64);
    bar.set_message("Computing measures");

    let reports = entries
        .par_iter()
        .progress_with(bar.clone())
        .map(|entry| MetricMeasures {
            metric: entry.metric.clone(),
            measures: fold_measures(output, entry.aggregator),
        })
        .collect();

    bar.finish_with_message("Measures complete");
    reports
}

/// Folds every day's record for each file, oldest day first, into a single
/// measure per file. Files the aggregator never has a value for are left out.
pub fn fold_measures(output: &ChurnOutput, aggregator: &dyn MeasureAggregator<i64>) -> Vec<FileMeasure> {
    let mut measures: BTreeMap<&str, Measure<i64>> = BTreeMap::new();

    for files in output.values() {
        for (file_name, churn) in files {
            if !aggregator.has_value(churn) {
                continue;
            }
            match measures.get_mut(file_name.as_str()) {
                Some(measure) => {
                    let value = aggregator.value_for_existing_measure(churn, measure);
                    measure.value = value;
                }
                None => {
                    measures.insert(file_name, Measure::new(aggregator.value_for_new_measure(churn)));
                }
            }
        }
    }

    measures
        .into_iter()
        .map(|(file_name, measure)| FileMeasure {
            file_name: file_name.to_string(),
            value: measure.value,
        })
        .collect()
}
