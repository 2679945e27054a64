use std::num::NonZeroUsize;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::matcher::TermMatcher;
use super::request::MatchTarget;
use super::TaskOutcome;
use crate::errors::{SearchError, SearchResult};
use crate::metrics::SearchMetrics;

/// Reads candidate files and forwards the ones that match.
///
/// Cloning is cheap; every worker task gets its own clone.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    matcher: Arc<TermMatcher>,
    root: Arc<Path>,
    target: MatchTarget,
    limiter: Option<Arc<Semaphore>>,
    metrics: SearchMetrics,
}

impl FileProcessor {
    /// Creates a new FileProcessor reporting paths relative to `root`
    pub fn new(matcher: TermMatcher, root: &Path) -> Self {
        Self {
            matcher: Arc::new(matcher),
            root: root.into(),
            target: MatchTarget::Content,
            limiter: None,
            metrics: SearchMetrics::new(),
        }
    }

    pub fn with_target(mut self, target: MatchTarget) -> Self {
        self.target = target;
        self
    }

    /// Caps the number of files read at the same time
    pub fn with_max_workers(mut self, max_workers: Option<NonZeroUsize>) -> Self {
        self.limiter = max_workers.map(|n| Arc::new(Semaphore::new(n.get())));
        self
    }

    pub fn with_metrics(mut self, metrics: SearchMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Gets the metrics this processor reports into
    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    /// Strips the root prefix once. The leading separator stays, so a file
    /// directly under the root comes out as `/name`.
    ///
    /// The prefix is compared component by component, so a root that is not
    /// valid UTF-8 still strips. The remainder is converted lossily: bytes
    /// that are not UTF-8 come out as U+FFFD.
    pub fn relative_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rest) => format!("{}{}", MAIN_SEPARATOR, rest.to_string_lossy()),
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }

    /// Tests one file against the terms, reading it in full for content
    /// searches
    pub async fn is_match(&self, path: &Path) -> SearchResult<bool> {
        match self.target {
            MatchTarget::FileName => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default();
                Ok(self.matcher.matches_name(&name))
            }
            MatchTarget::Content => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| SearchError::file_read(path, e))?;
                self.metrics.record_read(bytes.len() as u64);
                Ok(self.matcher.matches_content(&bytes))
            }
        }
    }

    /// Processes one candidate and sends its relative path on `tx` if it
    /// matches.
    ///
    /// A read failure is returned as [`TaskOutcome::Failed`]; every wait on a
    /// permit or on a full channel gives up as soon as `cancel` fires.
    pub async fn process(
        &self,
        path: PathBuf,
        tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> TaskOutcome {
        if cancel.is_cancelled() {
            return TaskOutcome::Cancelled;
        }

        let _permit = match &self.limiter {
            Some(limiter) => tokio::select! {
                biased;
                _ = cancel.cancelled() => return TaskOutcome::Cancelled,
                permit = limiter.clone().acquire_owned() => match permit {
                    Ok(permit) => Some(permit),
                    Err(_) => return TaskOutcome::Cancelled,
                },
            },
            None => None,
        };

        trace!("Processing file: {}", path.display());
        let matched = match self.is_match(&path).await {
            Ok(matched) => matched,
            Err(e) => {
                warn!("{}", e);
                return TaskOutcome::Failed(e);
            }
        };
        if !matched {
            return TaskOutcome::Completed;
        }

        let output = self.relative_path(&path);
        debug!("Match: {}", output);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => TaskOutcome::Cancelled,
            res = tx.send(output) => match res {
                Ok(()) => {
                    self.metrics.record_match();
                    TaskOutcome::Completed
                }
                Err(_) => TaskOutcome::Cancelled,
            },
        }
    }
}
