// src/renames.rs

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::warn;

/// Maps historical file paths to the path the file is known by today.
///
/// The map is kept flattened: every value is a terminal path that is not
/// itself a key, so `resolve` is a single lookup. A reverse index from each
/// terminal to the keys pointing at it lets a rename re-point only the
/// entries that terminated at the renamed path.
#[derive(Debug, Default, Clone)]
pub struct RenameResolver {
    current: HashMap<String, String>,
    referrers: HashMap<String, HashSet<String>>,
    cycles_detected: usize,
}

impl RenameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `old` was renamed to `new`.
    pub fn record_rename(&mut self, old: &str, new: &str) {
        self.record_renames([(old, new)]);
    }

    /// Records every rename of one changeset at once.
    ///
    /// The pairs are simultaneous, so their order does not matter: a path
    /// that is both renamed away and renamed onto (a swap or a rotation) is a
    /// live name afterwards and is not mapped anywhere.
    pub fn record_renames<'a, I>(&mut self, renames: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let batch: BTreeMap<&str, &str> = renames.into_iter().filter(|(old, new)| old != new).collect();
        if batch.is_empty() {
            return;
        }

        let mut plan = Vec::with_capacity(batch.len());
        let mut live = HashSet::new();
        for (&old, &new) in &batch {
            let target = self.resolve(new).to_string();
            let terminal = if batch.contains_key(new) || target == new {
                new.to_string()
            } else if target == old {
                // `new` used to be a name of `old`'s file; the newest name wins.
                warn!(old, new, "rename cycle detected, resolving to newest path");
                self.cycles_detected += 1;
                new.to_string()
            } else if batch.contains_key(target.as_str()) {
                // The file `new` leads to moves in this same changeset.
                new.to_string()
            } else {
                target
            };
            if terminal == new {
                live.insert(new);
            }
            plan.push((old, terminal));
        }

        // Take every referrer set before re-pointing so a swap does not
        // carry one file's history over to the other.
        let moved: Vec<_> = plan
            .iter()
            .map(|(old, terminal)| (terminal.clone(), self.referrers.remove(*old).unwrap_or_default()))
            .collect();
        for (terminal, keys) in moved {
            for key in keys {
                self.current.insert(key.clone(), terminal.clone());
                self.referrers.entry(terminal.clone()).or_default().insert(key);
            }
        }

        for (old, terminal) in plan {
            if !live.contains(old) {
                self.link(old, terminal);
            }
        }
        for path in live {
            self.unlink(path);
        }
    }

    fn link(&mut self, key: &str, terminal: String) {
        self.unlink(key);
        self.referrers.entry(terminal.clone()).or_default().insert(key.to_string());
        self.current.insert(key.to_string(), terminal);
    }

    fn unlink(&mut self, key: &str) {
        let Some(terminal) = self.current.remove(key) else {
            return;
        };
        if let Some(keys) = self.referrers.get_mut(&terminal) {
            keys.remove(key);
            if keys.is_empty() {
                self.referrers.remove(&terminal);
            }
        }
    }

    /// Returns the path `path` is known by today, or `path` itself if it was
    /// never renamed.
    pub fn resolve<'a>(&'a self, path: &'a str) -> &'a str {
        let mut resolved = path;
        let mut visited = HashSet::new();
        while let Some(next) = self.current.get(resolved) {
            if !visited.insert(resolved) || next == path {
                warn!(path, "rename chain loops back on itself");
                break;
            }
            resolved = next.as_str();
        }
        resolved
    }

    /// Number of renames that closed a cycle in the history
    pub fn cycles_detected(&self) -> usize {
        self.cycles_detected
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}
