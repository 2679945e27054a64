//! The concurrent search pipeline.
//!
//! A search is one [`walker::Walker`] task feeding a bounded path channel, one
//! [`processor::FileProcessor`] task per candidate file feeding a bounded result
//! channel, and the coordinator in [`engine`] that spawns the workers, drains the
//! results and owns the cancellation token shared by every task.
//!
//! ```text
//! root ──▶ Walker ──paths──▶ FileProcessor × N ──matches──▶ coordinator ──▶ SearchOutput
//!              ▲                     ▲                            │
//!              └──────── CancellationToken (deadline, first error) ┘
//! ```
//!
//! Every task ends with a [`TaskOutcome`]. The first `Failed` outcome cancels
//! the token; tasks that stop because of it report `Cancelled`, which is never
//! escalated on its own.
use crate::errors::SearchError;

pub mod engine;
pub mod matcher;
pub mod processor;
pub mod request;
pub mod walker;

pub use engine::{search, search_with_cancel};
pub use matcher::{content_matches, name_matches, TermMatcher};
pub use processor::FileProcessor;
pub use request::{MatchTarget, SearchRequest};
pub use walker::Walker;

/// How a single pipeline task ended
#[derive(Debug)]
pub enum TaskOutcome {
    /// The task did all of its work
    Completed,
    /// The task stopped early because the search was cancelled
    Cancelled,
    /// The task hit an error that ends the whole search
    Failed(SearchError),
}
