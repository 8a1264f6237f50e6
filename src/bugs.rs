// src/bugs.rs

use regex::Regex;
use thiserror::Error;

/// Separator between patterns in a bug-pattern configuration string
pub const PATTERN_DELIMITER: char = ';';

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid bug pattern `{pattern}`: {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Decides whether a changeset message describes a bug fix.
#[derive(Debug, Clone, Default)]
pub struct BugClassifier {
    patterns: Vec<Regex>,
}

impl BugClassifier {
    /// Compiles every `;`-separated pattern up front. `None`, or a string with
    /// only empty segments, yields a classifier that never matches.
    pub fn new(patterns: Option<&str>) -> Result<Self, PatternError> {
        let patterns = patterns
            .into_iter()
            .flat_map(|p| p.split(PATTERN_DELIMITER))
            .filter(|p| !p.is_empty())
            .map(|p| {
                Regex::new(p).map_err(|source| PatternError::Invalid {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn is_bug_fix(&self, message: &str) -> bool {
        !message.is_empty() && self.patterns.iter().any(|r| r.is_match(message))
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
