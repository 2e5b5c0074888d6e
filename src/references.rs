//! Card reference extraction.
//!
//! Finds card numbers written as `<prefix><digits>` (default `#12`) in
//! commit messages, branch names and pull request / issue titles.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ReferenceRequirement;
use crate::error::ConfigError;

/// GitHub's auto-generated merge commit subject. The `#N` in it is the PR
/// number, not a card.
static MERGE_PULL_REQUEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Merge pull request #\d+ from").unwrap());

/// True if `message` is a GitHub merge commit for a pull request.
pub fn is_merge_commit(message: &str) -> bool {
    MERGE_PULL_REQUEST.is_match(message)
}

/// Extracts card ids for a configured prefix.
#[derive(Debug, Clone)]
pub struct CardReferenceExtractor {
    prefix: String,
    id_regex: Regex,
}

impl CardReferenceExtractor {
    /// Build an extractor for a literal prefix such as `#` or `TR-`.
    pub fn new(prefix: &str) -> Result<Self, ConfigError> {
        let pattern = format!(r"{}(\d+)", regex::escape(prefix));
        let id_regex = Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: prefix.to_string(),
            source,
        })?;
        Ok(Self {
            prefix: prefix.to_string(),
            id_regex,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// All distinct card ids in `text`, without the prefix.
    ///
    /// With `strip_pull_request_noise`, "Merge pull request #N from" is
    /// removed first so the PR number is not mistaken for a card.
    pub fn extract_ids(&self, text: &str, strip_pull_request_noise: bool) -> BTreeSet<String> {
        if text.is_empty() {
            return BTreeSet::new();
        }

        // Replace with a space so the text on either side cannot fuse into a new token.
        let cleaned = if strip_pull_request_noise {
            MERGE_PULL_REQUEST.replace_all(text, " ")
        } else {
            text.into()
        };

        self.id_regex
            .captures_iter(&cleaned)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Union of the ids in a title and an optional branch name.
    ///
    /// Returns `None` when `requirement` is not met: under
    /// `TitleAndBranch` every provided source must yield an id, under
    /// `TitleOrBranch` only the union must be non-empty. Callers treat
    /// `None` as a configuration error for the event.
    pub fn extract_all_ids(
        &self,
        message: &str,
        branch: Option<&str>,
        requirement: ReferenceRequirement,
    ) -> Option<BTreeSet<String>> {
        let from_message = self.extract_ids(message, false);
        let from_branch = branch.map(|b| self.extract_ids(b, false));

        match requirement {
            ReferenceRequirement::TitleAndBranch => {
                if from_message.is_empty() || from_branch.as_ref().is_some_and(BTreeSet::is_empty) {
                    return None;
                }
            }
            ReferenceRequirement::TitleOrBranch => {
                if from_message.is_empty() && from_branch.as_ref().is_none_or(BTreeSet::is_empty) {
                    return None;
                }
            }
        }

        let mut ids = from_message;
        ids.extend(from_branch.into_iter().flatten());
        Some(ids)
    }
}
