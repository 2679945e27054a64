use crate::errors::{SearchError, SearchResult};
use crate::metrics::SearchStats;

/// The outcome of one search.
///
/// Matches are kept in arrival order, which varies between runs. A search that
/// was cut short by a deadline or a fatal error still carries every match
/// collected before it stopped, alongside the error.
#[derive(Debug, Default)]
pub struct SearchOutput {
    /// Matching paths relative to the root, each with its leading separator
    pub matches: Vec<String>,
    /// The first error observed, if any
    pub error: Option<SearchError>,
    /// Counters gathered while searching
    pub stats: SearchStats,
}

impl SearchOutput {
    /// Creates an empty, successful output
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the search ran to completion
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the matches in lexical order
    pub fn sorted(&self) -> Vec<String> {
        let mut matches = self.matches.clone();
        matches.sort();
        matches
    }

    /// Drops the partial matches if the search failed
    pub fn into_result(self) -> SearchResult<Vec<String>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.matches),
        }
    }

    /// Splits into matches and error, keeping both
    pub fn into_parts(self) -> (Vec<String>, Option<SearchError>) {
        (self.matches, self.error)
    }
}
