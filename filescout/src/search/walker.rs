use ignore::{Walk, WalkBuilder};
use std::path::PathBuf;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::TaskOutcome;
use crate::errors::{SearchError, SearchResult};
use crate::filters::should_include_file;
use crate::metrics::SearchMetrics;

/// Discovers candidate files under a root directory
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    extensions: Vec<String>,
    metrics: SearchMetrics,
}

impl Walker {
    /// Creates a new Walker for the given root and extension filter
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
            metrics: SearchMetrics::new(),
        }
    }

    /// Reports counters into an existing SearchMetrics
    pub fn with_metrics(mut self, metrics: SearchMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the candidates in depth-first order.
    ///
    /// Directories are descended into but never yielded. Symlinks and other
    /// non-regular entries are skipped, as are files rejected by the name
    /// filters. The first traversal error is yielded once and ends the sequence.
    pub fn candidates(&self) -> Candidates {
        let walk = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .build();
        Candidates {
            walk,
            extensions: self.extensions.clone(),
            metrics: self.metrics.clone(),
            cancel: None,
            done: false,
        }
    }

    /// Like [`Walker::candidates`], but checks `cancel` before every entry,
    /// including the ones that are skipped. Once it fires the sequence yields
    /// [`SearchError::Cancelled`] and ends.
    pub fn candidates_until(&self, cancel: CancellationToken) -> Candidates {
        Candidates {
            cancel: Some(cancel),
            ..self.candidates()
        }
    }

    /// Sends every candidate on `tx`, stopping at the first traversal error or
    /// as soon as `cancel` fires.
    ///
    /// Runs on a blocking thread; `handle` drives the channel sends so that a
    /// full channel can be raced against cancellation. `tx` is dropped on
    /// return, which closes the path stream.
    pub fn run(
        self,
        tx: mpsc::Sender<PathBuf>,
        cancel: CancellationToken,
        handle: Handle,
    ) -> TaskOutcome {
        debug!("Walking {}", self.root.display());

        for candidate in self.candidates_until(cancel.clone()) {
            let path = match candidate {
                Ok(path) => path,
                Err(SearchError::Cancelled) => {
                    debug!("Walker cancelled");
                    return TaskOutcome::Cancelled;
                }
                Err(e) => return TaskOutcome::Failed(e),
            };

            trace!("Discovered {}", path.display());
            let sent = handle.block_on(async {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => false,
                    res = tx.send(path) => res.is_ok(),
                }
            });
            if !sent {
                debug!("Walker cancelled while sending");
                return TaskOutcome::Cancelled;
            }
            self.metrics.record_discovered();
        }

        debug!("Walk of {} complete", self.root.display());
        TaskOutcome::Completed
    }
}

/// Lazy candidate sequence produced by [`Walker::candidates`]
pub struct Candidates {
    walk: Walk,
    extensions: Vec<String>,
    metrics: SearchMetrics,
    cancel: Option<CancellationToken>,
    done: bool,
}

impl Iterator for Candidates {
    type Item = SearchResult<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                self.done = true;
                return Some(Err(SearchError::Cancelled));
            }

            let entry = match self.walk.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(SearchError::Traversal(e)));
                }
                None => {
                    self.done = true;
                    return None;
                }
            };

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                continue;
            }
            if !file_type.is_file() {
                trace!("Skipping non-regular entry {}", entry.path().display());
                self.metrics.record_skipped();
                continue;
            }
            if !should_include_file(entry.path(), &self.extensions) {
                trace!("Filtered out {}", entry.path().display());
                self.metrics.record_skipped();
                continue;
            }

            return Some(Ok(entry.into_path()));
        }
    }
}
