use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default capacity of the path and result channels
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Default search deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// What a term is tested against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchTarget {
    /// The full file content
    #[default]
    Content,
    /// The file name only; the file is not read
    FileName,
}

/// One search invocation
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Directory the search is scoped to
    pub root: PathBuf,
    /// Terms to look for; a file matches if it contains any of them
    pub terms: Vec<String>,
    /// Allowed extensions without the leading dot; empty accepts all files
    pub extensions: Vec<String>,
    /// Time budget, measured from the start of the search
    pub deadline: Duration,
    pub target: MatchTarget,
    /// Upper bound on concurrent file reads; `None` reads every candidate at once
    pub max_workers: Option<NonZeroUsize>,
    /// Capacity of the path and result channels
    pub channel_capacity: usize,
}

impl SearchRequest {
    /// Creates a content search with default limits.
    ///
    /// Blank terms are discarded, the others are kept verbatim.
    pub fn new<I, S>(root: impl Into<PathBuf>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: normalize_root(&root.into()),
            terms: clean_terms(terms),
            extensions: Vec::new(),
            deadline: DEFAULT_TIMEOUT,
            target: MatchTarget::Content,
            max_workers: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Builds a request from a `/`-separated list of terms, as found in a
    /// request path after its prefix.
    pub fn from_segments(root: impl Into<PathBuf>, segments: &str) -> Self {
        Self::new(root, segments.split('/'))
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_target(mut self, target: MatchTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_max_workers(mut self, max_workers: Option<NonZeroUsize>) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

/// Drops terms that are empty or whitespace-only
pub fn clean_terms<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    terms
        .into_iter()
        .map(Into::into)
        .filter(|t| !t.trim().is_empty())
        .collect()
}

// Result paths are produced by stripping the root prefix once, so a trailing
// separator on the root would eat the leading separator of every result.
fn normalize_root(root: &Path) -> PathBuf {
    root.components().collect()
}
