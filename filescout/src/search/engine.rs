use std::path::PathBuf;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::matcher::TermMatcher;
use super::processor::FileProcessor;
use super::request::SearchRequest;
use super::walker::Walker;
use super::TaskOutcome;
use crate::errors::SearchError;
use crate::metrics::SearchMetrics;
use crate::results::SearchOutput;

/// Searches `request.root` for files matching any of the request's terms.
///
/// Returns once every task has finished. Matches arrive in no particular
/// order; sort them before comparing. When the deadline expires or a task
/// fails, the output carries the error together with the matches collected
/// so far.
pub async fn search(request: &SearchRequest) -> SearchOutput {
    search_with_cancel(request, &CancellationToken::new()).await
}

/// Like [`search`], but also stops when `parent` is cancelled.
pub async fn search_with_cancel(
    request: &SearchRequest,
    parent: &CancellationToken,
) -> SearchOutput {
    let walker = Walker::new(&request.root, request.extensions.clone());
    let handle = Handle::current();
    coordinate(request, parent, move |tx, cancel, metrics| {
        walker.with_metrics(metrics).run(tx, cancel, handle)
    })
    .await
}

/// Runs the pipeline with `discover` as the path producer.
///
/// `discover` runs on a blocking thread and must return once the token is
/// cancelled. Dropping its sender is what ends the path stream.
pub(crate) async fn coordinate<F>(
    request: &SearchRequest,
    parent: &CancellationToken,
    discover: F,
) -> SearchOutput
where
    F: FnOnce(mpsc::Sender<PathBuf>, CancellationToken, SearchMetrics) -> TaskOutcome
        + Send
        + 'static,
{
    let started = Instant::now();
    info!("Search root: {}", request.root.display());
    info!("Search terms: {:?}", request.terms);

    let metrics = SearchMetrics::new();
    let cancel = parent.child_token();
    let processor = FileProcessor::new(TermMatcher::new(request.terms.clone()), &request.root)
        .with_target(request.target)
        .with_max_workers(request.max_workers)
        .with_metrics(metrics.clone());

    let capacity = request.channel_capacity.max(1);
    let (path_tx, mut path_rx) = mpsc::channel::<PathBuf>(capacity);
    let (result_tx, mut result_rx) = mpsc::channel::<String>(capacity);

    let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();
    {
        let cancel = cancel.clone();
        let metrics = metrics.clone();
        tasks.spawn_blocking(move || discover(path_tx, cancel, metrics));
    }

    let deadline = tokio::time::sleep(request.deadline);
    tokio::pin!(deadline);

    let mut output = SearchOutput::new();
    let mut first_error: Option<SearchError> = None;
    let mut timed_out = false;
    let mut interrupted = false;
    let mut paths_open = true;

    while paths_open || !tasks.is_empty() {
        tokio::select! {
            biased;

            () = &mut deadline, if !cancel.is_cancelled() => {
                debug!("Deadline of {:?} reached, cancelling search", request.deadline);
                timed_out = true;
                cancel.cancel();
            }

            Some(found) = result_rx.recv() => output.matches.push(found),

            path = path_rx.recv(), if paths_open => match path {
                Some(path) if !cancel.is_cancelled() => {
                    let processor = processor.clone();
                    let tx = result_tx.clone();
                    let cancel = cancel.clone();
                    tasks.spawn(async move { processor.process(path, tx, cancel).await });
                }
                Some(_) => interrupted = true,
                None => paths_open = false,
            },

            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                let outcome = joined.unwrap_or_else(|e| {
                    TaskOutcome::Failed(SearchError::task_failed(e.to_string()))
                });
                match outcome {
                    TaskOutcome::Completed => {}
                    TaskOutcome::Cancelled => interrupted = true,
                    TaskOutcome::Failed(e) => {
                        if first_error.is_none() {
                            warn!("Search failed: {}", e);
                            first_error = Some(e);
                        } else {
                            debug!("Further error after cancellation: {}", e);
                        }
                        cancel.cancel();
                    }
                }
            }
        }
    }

    // Every worker has finished, so whatever is still buffered is final
    drop(result_tx);
    while let Ok(found) = result_rx.try_recv() {
        output.matches.push(found);
    }

    output.error = first_error.or_else(|| {
        if timed_out {
            Some(SearchError::Timeout(request.deadline))
        } else if interrupted && parent.is_cancelled() {
            Some(SearchError::Cancelled)
        } else {
            None
        }
    });

    let elapsed = started.elapsed();
    output.stats = metrics.snapshot(elapsed);
    metrics.log_stats(elapsed);
    match &output.error {
        None => info!("Search complete. Found {} matches", output.matches.len()),
        Some(e) => info!(
            "Search stopped ({}). Returning {} matches found so far",
            e,
            output.matches.len()
        ),
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::request::MatchTarget;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn request(root: &std::path::Path, terms: &[&str]) -> SearchRequest {
        SearchRequest::new(root, terms.iter().copied()).with_deadline(Duration::from_secs(10))
    }

    fn sep() -> char {
        std::path::MAIN_SEPARATOR
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_search_finds_matching_files() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), "hello world").unwrap();
        fs::write(dir.path().join("sub/b.md"), "say hello").unwrap();
        fs::write(dir.path().join("c.txt"), "nothing").unwrap();

        let output = search(&request(dir.path(), &["hello"])).await;

        assert!(output.is_complete(), "{:?}", output.error);
        assert_eq!(
            output.sorted(),
            vec![format!("{}a.txt", sep()), format!("{0}sub{0}b.md", sep())]
        );
        assert_eq!(output.stats.files_discovered, 3);
        assert_eq!(output.stats.files_read, 3);
        assert_eq!(output.stats.matches_found, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_empty_terms_match_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let output = search(&request(dir.path(), &["", "  "])).await;
        assert!(output.is_complete());
        assert!(output.matches.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_file_name_search() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("invoice-2024.txt"), "no terms inside").unwrap();
        fs::write(dir.path().join("notes.txt"), "2024").unwrap();

        let req = request(dir.path(), &["2024"]).with_target(MatchTarget::FileName);
        let output = search(&req).await;

        assert!(output.is_complete());
        assert_eq!(output.matches, vec![format!("{}invoice-2024.txt", sep())]);
        assert_eq!(output.stats.files_read, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_missing_root_reports_traversal_error() {
        let dir = tempdir().unwrap();
        let output = search(&request(&dir.path().join("missing"), &["x"])).await;

        assert!(matches!(output.error, Some(SearchError::Traversal(_))));
        assert!(output.matches.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_read_failure_is_fatal_and_keeps_partial_matches() {
        let dir = tempdir().unwrap();
        let found = dir.path().join("found.txt");
        let missing = dir.path().join("missing.txt");
        fs::write(&found, "needle").unwrap();

        let req = request(dir.path(), &["needle"]);
        let output = coordinate(&req, &CancellationToken::new(), move |tx, _, _| {
            tx.blocking_send(found).unwrap();
            // Give the first file time to be matched and collected
            std::thread::sleep(Duration::from_millis(200));
            tx.blocking_send(missing).unwrap();
            TaskOutcome::Completed
        })
        .await;

        match &output.error {
            Some(SearchError::FileRead { path, .. }) => assert!(path.ends_with("missing.txt")),
            other => panic!("expected a read failure, got {other:?}"),
        }
        assert_eq!(output.matches, vec![format!("{}found.txt", sep())]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failure_cancels_the_producer() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        let req = request(dir.path(), &["x"]);
        let started = Instant::now();
        let output = coordinate(&req, &CancellationToken::new(), move |tx, cancel, _| {
            tx.blocking_send(missing).unwrap();
            // Keep producing until the failure is noticed
            let handle = Handle::current();
            handle.block_on(async {
                tokio::select! {
                    _ = cancel.cancelled() => TaskOutcome::Cancelled,
                    _ = tokio::time::sleep(Duration::from_secs(30)) => TaskOutcome::Completed,
                }
            })
        })
        .await;

        assert!(matches!(output.error, Some(SearchError::FileRead { .. })));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_deadline_returns_timeout() {
        let dir = tempdir().unwrap();
        let req = request(dir.path(), &["x"]).with_deadline(Duration::from_millis(50));

        let output = coordinate(&req, &CancellationToken::new(), move |_tx, cancel, _| {
            let handle = Handle::current();
            handle.block_on(cancel.cancelled());
            TaskOutcome::Cancelled
        })
        .await;

        assert!(matches!(output.error, Some(SearchError::Timeout(d)) if d == req.deadline));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_parent_cancellation() {
        let dir = tempdir().unwrap();
        let req = request(dir.path(), &["x"]);
        let parent = CancellationToken::new();

        let trigger = parent.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let output = coordinate(&req, &parent, move |_tx, cancel, _| {
            let handle = Handle::current();
            handle.block_on(cancel.cancelled());
            TaskOutcome::Cancelled
        })
        .await;

        assert!(matches!(output.error, Some(SearchError::Cancelled)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_task_is_reported() {
        let dir = tempdir().unwrap();
        let req = request(dir.path(), &["x"]);

        let output = coordinate(&req, &CancellationToken::new(), |_tx, _cancel, _| {
            panic!("walker exploded")
        })
        .await;

        assert!(matches!(output.error, Some(SearchError::TaskFailed(_))));
    }
}
