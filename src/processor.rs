// src/processor.rs

use crate::bugs::BugClassifier;
use crate::model::*;
use crate::renames::RenameResolver;
use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

/// Folds changesets, in history order, into per-day per-file churn records.
#[derive(Debug, Default)]
pub struct ChangesetProcessor {
    output: ChurnOutput,
    renames: RenameResolver,
    work_items: WorkItemCache,
    bugs: BugClassifier,
    changesets_with_bugs: usize,
}

impl ChangesetProcessor {
    pub fn new(bugs: BugClassifier, work_items: WorkItemCache) -> Self {
        Self {
            output: ChurnOutput::new(),
            renames: RenameResolver::new(),
            work_items,
            bugs,
            changesets_with_bugs: 0,
        }
    }

    /// Accumulates one changeset. `None` is accepted and ignored.
    ///
    /// Processing is not idempotent: feeding the same changeset twice counts
    /// its contribution twice.
    pub fn process_changeset<'a>(&mut self, changeset: impl Into<Option<&'a Changeset>>) {
        let Some(changeset) = changeset.into() else {
            return;
        };

        self.renames
            .record_renames(changeset.renames.iter().map(|(old, new)| (old.as_str(), new.as_str())));

        let date = changeset.date();
        self.output.entry(date).or_default();

        let contains_bug = self.bugs.is_bug_fix(&changeset.message);
        if contains_bug {
            self.changesets_with_bugs += 1;
        }
        let in_bug_database = self.work_items.contains_key(&changeset.id);

        debug!(
            id = %changeset.id,
            %date,
            files = changeset.file_changes.len(),
            contains_bug,
            in_bug_database,
            "processing changeset"
        );

        for change in &changeset.file_changes {
            let file_name = self.renames.resolve(&change.file_name).to_string();
            let churn = find_or_create(&mut self.output, date, file_name);

            add_changes(churn, change);
            add_author(churn, &changeset.author);
            if contains_bug {
                add_changes_with_fixes(churn, change);
            }
            if in_bug_database {
                add_bug_database_changes(churn.bug_database.get_or_insert_with(Default::default), change);
            }
        }
    }

    pub fn output(&self) -> &ChurnOutput {
        &self.output
    }

    pub fn into_output(self) -> ChurnOutput {
        self.output
    }

    /// Number of changesets whose message was classified as a bug fix
    pub fn changesets_with_bugs(&self) -> usize {
        self.changesets_with_bugs
    }

    pub fn renames(&self) -> &RenameResolver {
        &self.renames
    }

    pub fn work_items(&self) -> &WorkItemCache {
        &self.work_items
    }
}

fn find_or_create(output: &mut ChurnOutput, date: NaiveDate, file_name: String) -> &mut DailyCodeChurn {
    let churn = output.entry(date).or_default().entry(file_name.clone()).or_default();
    churn.timestamp = date.and_time(NaiveTime::MIN).format(DATE_FORMAT).to_string();
    churn.file_name = file_name;
    churn
}

fn add_changes(churn: &mut DailyCodeChurn, change: &FileChange) {
    churn.added += change.added;
    churn.deleted += change.deleted;
    churn.changes_before += change.changed_before;
    churn.changes_after += change.changed_after;
    churn.number_of_changes += 1;
}

fn add_changes_with_fixes(churn: &mut DailyCodeChurn, change: &FileChange) {
    churn.added_with_fixes += change.added;
    churn.deleted_with_fixes += change.deleted;
    churn.changes_before_with_fixes += change.changed_before;
    churn.changes_after_with_fixes += change.changed_after;
    churn.number_of_changes_with_fixes += 1;
}

fn add_bug_database_changes(bug_database: &mut DailyCodeChurnBugDatabase, change: &FileChange) {
    bug_database.added_in_fixes += change.added;
    bug_database.deleted_in_fixes += change.deleted;
    bug_database.changes_before_in_fixes += change.changed_before;
    bug_database.changes_after_in_fixes += change.changed_after;
    bug_database.number_of_changes_in_fixes += 1;
}

fn add_author(churn: &mut DailyCodeChurn, author: &str) {
    let key = author.to_uppercase();
    match churn.authors.iter_mut().find(|a| a.author.to_uppercase() == key) {
        Some(existing) => existing.number_of_changes += 1,
        None => churn.authors.push(DailyCodeChurnAuthor {
            author: author.to_string(),
            number_of_changes: 1,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 10, d).unwrap()
    }

    fn changeset(id: &str, d: u32, author: &str, message: &str, files: &[(&str, i64, i64)]) -> Changeset {
        Changeset {
            id: id.to_string(),
            timestamp: day(d).and_hms_opt(15, 30, 0).unwrap(),
            author: author.to_string(),
            message: message.to_string(),
            file_changes: files
                .iter()
                .map(|&(name, added, deleted)| FileChange {
                    file_name: name.to_string(),
                    added,
                    deleted,
                    changed_before: added * 2,
                    changed_after: deleted * 2,
                })
                .collect(),
            renames: BTreeMap::new(),
        }
    }

    fn processor(patterns: Option<&str>) -> ChangesetProcessor {
        ChangesetProcessor::new(BugClassifier::new(patterns).unwrap(), WorkItemCache::new())
    }

    #[test]
    fn none_is_a_no_op() {
        let mut processor = processor(Some("fix"));
        processor.process_changeset(None::<&Changeset>);
        assert!(processor.output().is_empty());
        assert_eq!(processor.changesets_with_bugs(), 0);
    }

    #[test]
    fn empty_changeset_still_creates_the_date_bucket() {
        let mut processor = processor(Some("fix"));
        processor.process_changeset(&changeset("1", 2, "alice", "fix", &[]));

        assert_eq!(processor.output().len(), 1);
        assert!(processor.output()[&day(2)].is_empty());
        assert_eq!(processor.changesets_with_bugs(), 1);
    }

    #[test]
    fn record_fields_are_filled_in() {
        let mut processor = processor(None);
        processor.process_changeset(&changeset("1", 2, "alice", "", &[("a.rs", 4, 1)]));

        let churn = &processor.output()[&day(2)]["a.rs"];
        assert_eq!(churn.timestamp, "2018/10/02 00:00:00");
        assert_eq!(churn.file_name, "a.rs");
        assert_eq!(churn.added, 4);
        assert_eq!(churn.deleted, 1);
        assert_eq!(churn.changes_before, 8);
        assert_eq!(churn.changes_after, 2);
        assert_eq!(churn.number_of_changes, 1);
        assert_eq!(churn.number_of_changes_with_fixes, 0);
        assert!(churn.bug_database.is_none());
    }

    #[test]
    fn bug_fix_counts_once_per_changeset() {
        let mut processor = processor(Some("fix"));
        processor.process_changeset(&changeset("1", 2, "alice", "fix crash", &[("a.rs", 1, 1), ("b.rs", 2, 2)]));

        assert_eq!(processor.changesets_with_bugs(), 1);
        let files = &processor.output()[&day(2)];
        assert_eq!(files["a.rs"].number_of_changes_with_fixes, 1);
        assert_eq!(files["b.rs"].added_with_fixes, 2);
        assert_eq!(files["b.rs"].deleted_with_fixes, 2);
        assert_eq!(files["b.rs"].changes_before_with_fixes, 4);
        assert_eq!(files["b.rs"].changes_after_with_fixes, 4);
    }

    #[test]
    fn non_bug_changeset_leaves_fix_counters_alone() {
        let mut processor = processor(Some("fix"));
        processor.process_changeset(&changeset("1", 2, "alice", "add feature", &[("a.rs", 3, 0)]));

        assert_eq!(processor.changesets_with_bugs(), 0);
        let churn = &processor.output()[&day(2)]["a.rs"];
        assert_eq!(churn.added_with_fixes, 0);
        assert_eq!(churn.number_of_changes_with_fixes, 0);
    }

    #[test]
    fn authors_merge_case_insensitively() {
        let mut processor = processor(None);
        processor.process_changeset(&changeset("1", 2, "Bob", "", &[("a.rs", 1, 0)]));
        processor.process_changeset(&changeset("2", 2, "BOB", "", &[("a.rs", 1, 0)]));
        processor.process_changeset(&changeset("3", 2, "carol", "", &[("a.rs", 1, 0)]));

        let authors = &processor.output()[&day(2)]["a.rs"].authors;
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].author, "Bob");
        assert_eq!(authors[0].number_of_changes, 2);
        assert_eq!(authors[1].author, "carol");
        assert_eq!(authors[1].number_of_changes, 1);
    }

    #[test]
    fn renamed_files_accumulate_under_their_current_name() {
        let mut processor = processor(None);
        let mut rename = changeset("1", 1, "alice", "", &[]);
        rename.renames.insert("old.rs".to_string(), "new.rs".to_string());
        processor.process_changeset(&rename);
        processor.process_changeset(&changeset("2", 2, "alice", "", &[("old.rs", 5, 0)]));

        let files = &processor.output()[&day(2)];
        assert!(files.contains_key("new.rs"));
        assert!(!files.contains_key("old.rs"));
        assert_eq!(files["new.rs"].file_name, "new.rs");
    }

    #[test]
    fn files_swapping_names_keep_separate_records() {
        let mut processor = processor(None);
        let mut swap = changeset("1", 2, "alice", "", &[("a.rs", 1, 0), ("b.rs", 2, 0)]);
        swap.renames.insert("a.rs".to_string(), "b.rs".to_string());
        swap.renames.insert("b.rs".to_string(), "a.rs".to_string());
        processor.process_changeset(&swap);
        processor.process_changeset(&changeset("2", 2, "alice", "", &[("a.rs", 4, 0)]));

        let files = &processor.output()[&day(2)];
        assert_eq!(files.len(), 2);
        assert_eq!(files["a.rs"].added, 5);
        assert_eq!(files["b.rs"].added, 2);
        assert_eq!(processor.renames().cycles_detected(), 0);
    }

    #[test]
    fn work_items_populate_the_bug_database_record() {
        let work_items = group_work_items(vec![WorkItem {
            changeset_id: "1".to_string(),
            work_item_id: "BUG-1".to_string(),
            closed_date: None,
        }]);
        let mut processor = ChangesetProcessor::new(BugClassifier::default(), work_items);
        processor.process_changeset(&changeset("1", 2, "alice", "", &[("a.rs", 6, 1)]));
        processor.process_changeset(&changeset("2", 2, "alice", "", &[("a.rs", 3, 3)]));
        processor.process_changeset(&changeset("1", 2, "alice", "", &[("b.rs", 1, 0), ("a.rs", 1, 1)]));

        let files = &processor.output()[&day(2)];
        let bug_database = files["a.rs"].bug_database.as_ref().unwrap();
        assert_eq!(bug_database.added_in_fixes, 7);
        assert_eq!(bug_database.deleted_in_fixes, 2);
        assert_eq!(bug_database.changes_before_in_fixes, 14);
        assert_eq!(bug_database.changes_after_in_fixes, 4);
        assert_eq!(bug_database.number_of_changes_in_fixes, 2);
        assert_eq!(files["a.rs"].number_of_changes, 3);
        assert!(files["b.rs"].bug_database.is_some());
    }

    #[test]
    fn same_file_twice_in_one_changeset_accumulates_twice() {
        let mut processor = processor(None);
        processor.process_changeset(&changeset("1", 2, "alice", "", &[("a.rs", 1, 0), ("a.rs", 2, 0)]));

        let churn = &processor.output()[&day(2)]["a.rs"];
        assert_eq!(churn.added, 3);
        assert_eq!(churn.number_of_changes, 2);
        assert_eq!(churn.authors[0].number_of_changes, 2);
    }
}
