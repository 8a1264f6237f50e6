// src/model.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Format used for `DailyCodeChurn::timestamp`
pub const DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// A single file touched by a changeset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FileChange {
    pub file_name: String,
    pub added: i64,
    pub deleted: i64,
    pub changed_before: i64,
    pub changed_after: i64,
}

/// One commit/revision as produced by a VCS log reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Changeset {
    pub id: String,
    /// Author time, already in whatever offset the reader decided on
    pub timestamp: NaiveDateTime,
    pub author: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file_changes: Vec<FileChange>,
    /// old path -> new path
    #[serde(default)]
    pub renames: BTreeMap<String, String>,
}

impl Changeset {
    /// The calendar day this changeset is bucketed under
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Per-author activity on a file-day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailyCodeChurnAuthor {
    pub author: String,
    pub number_of_changes: i64,
}

/// Counters attributed to changesets correlated with the bug database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DailyCodeChurnBugDatabase {
    pub added_in_fixes: i64,
    pub deleted_in_fixes: i64,
    pub changes_before_in_fixes: i64,
    pub changes_after_in_fixes: i64,
    pub number_of_changes_in_fixes: i64,
}

/// Accumulated churn for one file on one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DailyCodeChurn {
    pub timestamp: String,
    pub file_name: String,
    pub added: i64,
    pub deleted: i64,
    pub changes_before: i64,
    pub changes_after: i64,
    pub number_of_changes: i64,
    pub authors: Vec<DailyCodeChurnAuthor>,
    pub added_with_fixes: i64,
    pub deleted_with_fixes: i64,
    pub changes_before_with_fixes: i64,
    pub changes_after_with_fixes: i64,
    pub number_of_changes_with_fixes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bug_database: Option<DailyCodeChurnBugDatabase>,
}

impl DailyCodeChurn {
    pub fn total_lines_changed(&self) -> i64 {
        self.added + self.deleted
    }

    pub fn total_lines_changed_with_fixes(&self) -> i64 {
        self.added_with_fixes + self.deleted_with_fixes
    }
}

/// A bug tracker record correlated to a changeset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkItem {
    pub changeset_id: String,
    pub work_item_id: String,
    #[serde(default)]
    pub closed_date: Option<NaiveDateTime>,
}

/// A scalar produced by folding one or more `DailyCodeChurn` records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Measure<T> {
    pub value: T,
}

impl<T> Measure<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

/// Date -> resolved file path -> accumulated churn
pub type ChurnOutput = BTreeMap<NaiveDate, BTreeMap<String, DailyCodeChurn>>;

/// Changeset id -> work items referencing it
pub type WorkItemCache = HashMap<String, Vec<WorkItem>>;

/// Groups a flat list of work items by the changeset they reference
pub fn group_work_items(items: Vec<WorkItem>) -> WorkItemCache {
    let mut cache = WorkItemCache::new();
    for item in items {
        cache.entry(item.changeset_id.clone()).or_default().push(item);
    }
    cache
}
