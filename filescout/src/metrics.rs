use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Tracks counters for a single search, shared by the walker and all workers
#[derive(Debug, Clone, Default)]
pub struct SearchMetrics {
    // Walker metrics
    files_discovered: Arc<AtomicU64>,
    entries_skipped: Arc<AtomicU64>,

    // Worker metrics
    files_read: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,
    matches_found: Arc<AtomicU64>,
}

/// Point-in-time copy of [`SearchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub files_discovered: u64,
    pub entries_skipped: u64,
    pub files_read: u64,
    pub bytes_read: u64,
    pub matches_found: u64,
    pub elapsed: Duration,
}

impl SearchMetrics {
    /// Creates a new SearchMetrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a path handed to the workers
    pub fn record_discovered(&self) {
        self.files_discovered.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a directory entry the walker did not emit
    pub fn record_skipped(&self) {
        self.entries_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a completed file read
    pub fn record_read(&self, bytes: u64) {
        let total = self.bytes_read.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.files_read.fetch_add(1, Ordering::Relaxed);
        debug!("Read {} bytes, total: {} bytes", bytes, total);
    }

    /// Records a match delivered to the coordinator
    pub fn record_match(&self) {
        self.matches_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets current statistics
    pub fn snapshot(&self, elapsed: Duration) -> SearchStats {
        SearchStats {
            files_discovered: self.files_discovered.load(Ordering::Relaxed),
            entries_skipped: self.entries_skipped.load(Ordering::Relaxed),
            files_read: self.files_read.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            matches_found: self.matches_found.load(Ordering::Relaxed),
            elapsed,
        }
    }

    /// Logs current statistics
    pub fn log_stats(&self, elapsed: Duration) {
        let stats = self.snapshot(elapsed);
        info!(
            "Search stats:\n\
             Files discovered: {}\n\
             Entries skipped: {}\n\
             Files read: {} ({} bytes)\n\
             Matches: {}\n\
             Elapsed: {:?}",
            stats.files_discovered,
            stats.entries_skipped,
            stats.files_read,
            stats.bytes_read,
            stats.matches_found,
            stats.elapsed,
        );
    }
}
