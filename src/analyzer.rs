// src/analyzer.rs

use crate::model::*;
use chrono::{DateTime, Duration, NaiveDateTime};
use git2::{Commit, Delta, Diff, DiffFindOptions, DiffOptions, Patch, Repository, Sort};
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Reads HEAD's history, oldest commit first, as a sequence of changesets.
pub fn read_history(repo_path: &Path) -> Result<Vec<Changeset>, git2::Error> {
    let repo = Repository::open(repo_path)?;
    info!("Reading history of repository at: {}", repo_path.display());

    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;
    let oids = revwalk.collect::<Result<Vec<_>, _>>()?;

    let bar = ProgressBar::new(oids.len() as u64);
    bar.set_message("Reading commits");

    let mut changesets = Vec::with_capacity(oids.len());
    for oid in oids {
        let commit = repo.find_commit(oid)?;
        if commit.parent_count() > 1 {
            debug!(%oid, "skipping merge commit");
        } else {
            changesets.push(read_commit(&repo, &commit)?);
        }
        bar.inc(1);
    }
    bar.finish_with_message("History read");

    Ok(changesets)
}

fn read_commit(repo: &Repository, commit: &Commit) -> Result<Changeset, git2::Error> {
    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };
    let current_tree = commit.tree()?;

    let mut diff_opts = DiffOptions::new();
    diff_opts.ignore_filemode(true);
    let mut diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&current_tree), Some(&mut diff_opts))?;
    diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

    let (file_changes, renames) = collect_changes(&diff)?;
    let author = commit.author();

    Ok(Changeset {
        id: commit.id().to_string(),
        timestamp: author_time(&author.when()),
        author: author.name().unwrap_or("Unknown").to_string(),
        message: commit.message().unwrap_or_default().to_string(),
        file_changes,
        renames,
    })
}

fn collect_changes(diff: &Diff) -> Result<(Vec<FileChange>, BTreeMap<String, String>), git2::Error> {
    let mut file_changes = Vec::new();
    let mut renames = BTreeMap::new();

    for (idx, delta) in diff.deltas().enumerate() {
        let old_path = delta.old_file().path().and_then(|p| p.to_str()).map(String::from);
        let new_path = delta.new_file().path().and_then(|p| p.to_str()).map(String::from);

        let file_name = match delta.status() {
            Delta::Deleted => old_path,
            Delta::Renamed => {
                if let (Some(old), Some(new)) = (&old_path, &new_path) {
                    renames.insert(old.clone(), new.clone());
                }
                new_path
            }
            _ => new_path.or(old_path),
        };
        let Some(file_name) = file_name else {
            continue;
        };

        // Binary files have no patch and count as a change with no lines
        let (added, deleted) = match Patch::from_diff(diff, idx)? {
            Some(patch) => {
                let (_, additions, deletions) = patch.line_stats()?;
                (additions as i64, deletions as i64)
            }
            None => (0, 0),
        };

        file_changes.push(FileChange {
            file_name,
            added,
            deleted,
            // git reports no changed-block counts
            changed_before: 0,
            changed_after: 0,
        });
    }

    Ok((file_changes, renames))
}

/// Author time as wall-clock time in the author's own offset
fn author_time(time: &git2::Time) -> NaiveDateTime {
    let utc = DateTime::from_timestamp(time.seconds(), 0).unwrap_or_default();
    utc.naive_utc() + Duration::minutes(i64::from(time.offset_minutes()))
}
