//! Search providers backed by async functions on a tokio runtime.
//!
//! [`TokioSearchProvider`] adapts `async fn(String) -> Result<SearchResponse, E>`
//! to [`SearchProvider`]. Each search runs as a task on the given runtime and
//! races the request's cancellation token, so superseded searches stop early
//! instead of running to completion only to be discarded.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use typeahead_core::logging::targets;

use crate::fetch::{ResultSink, SearchProvider};
use crate::suggestion::SearchResponse;

/// Runs an async search function as a tokio task per query.
///
/// ```no_run
/// use typeahead::{SearchResponse, TokioSearchProvider};
///
/// # async fn lookup(query: String) -> Result<Vec<String>, std::io::Error> { Ok(vec![query]) }
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let provider = TokioSearchProvider::new(runtime.handle().clone(), |query: String| async move {
///     lookup(query).await.map(SearchResponse::from_values)
/// });
/// ```
pub struct TokioSearchProvider<F> {
    handle: Handle,
    search: Arc<F>,
}

impl<F> TokioSearchProvider<F> {
    /// Create a provider that spawns onto `handle`.
    pub fn new(handle: Handle, search: F) -> Self {
        Self {
            handle,
            search: Arc::new(search),
        }
    }

    /// Create a provider that spawns onto the runtime this is called from.
    ///
    /// Returns `None` outside a tokio runtime.
    pub fn on_current_runtime(search: F) -> Option<Self> {
        Handle::try_current()
            .ok()
            .map(|handle| Self::new(handle, search))
    }
}

impl<F, Fut, E> SearchProvider for TokioSearchProvider<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<SearchResponse, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    fn search(&mut self, query: &str, sink: ResultSink) {
        let future = (self.search)(query.to_owned());
        let cancellation = sink.cancellation_token().clone();

        self.handle.spawn(async move {
            tokio::select! {
                biased;

                _ = cancellation.cancelled() => {
                    tracing::trace!(target: targets::FETCH, token = sink.token().as_u64(), "search task cancelled");
                    drop(sink);
                }
                result = future => match result {
                    Ok(response) => sink.resolve(response),
                    Err(error) => {
                        tracing::debug!(target: targets::FETCH, query = sink.query(), %error, "search failed");
                        sink.reject();
                    }
                },
            }
        });
    }
}

impl<F> std::fmt::Debug for TokioSearchProvider<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioSearchProvider").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchCoordinator, FetchOutcome};
    use std::time::Duration;

    async fn wait_for_answer(coordinator: &mut FetchCoordinator) -> FetchOutcome {
        for _ in 0..100 {
            if let Some(result) = coordinator.drain() {
                return result.outcome;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no answer from search task");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_resolves_through_sink() {
        let mut coordinator = FetchCoordinator::new();
        let mut provider = TokioSearchProvider::on_current_runtime(|query: String| async move {
            Ok::<_, std::io::Error>(SearchResponse::from_values([format!("{query}ville")]))
        })
        .unwrap();

        provider.search("paris", coordinator.begin("paris"));

        match wait_for_answer(&mut coordinator).await {
            FetchOutcome::Resolved(response) => {
                assert_eq!(response.results.unwrap()[0].value, "parisville");
            }
            FetchOutcome::Rejected => panic!("expected results"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_error_rejects() {
        let mut coordinator = FetchCoordinator::new();
        let mut provider = TokioSearchProvider::on_current_runtime(|_query: String| async move {
            Err::<SearchResponse, _>("backend unavailable")
        })
        .unwrap();

        provider.search("paris", coordinator.begin("paris"));
        assert_eq!(wait_for_answer(&mut coordinator).await, FetchOutcome::Rejected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_superseded_search_is_cancelled() {
        let mut coordinator = FetchCoordinator::new();
        let mut provider = TokioSearchProvider::on_current_runtime(|query: String| async move {
            if query == "slow" {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok::<_, std::io::Error>(SearchResponse::from_values([query]))
        })
        .unwrap();

        let slow = coordinator.begin("slow");
        let slow_cancellation = slow.cancellation_token().clone();
        provider.search("slow", slow);
        provider.search("fast", coordinator.begin("fast"));
        assert!(slow_cancellation.is_cancelled());

        match wait_for_answer(&mut coordinator).await {
            FetchOutcome::Resolved(response) => {
                assert_eq!(response.results.unwrap()[0].value, "fast");
            }
            FetchOutcome::Rejected => panic!("expected the fast answer"),
        }
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_search_failure_logs_at_debug() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("typeahead::fetch=debug"))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let mut coordinator = FetchCoordinator::new();
            let mut provider = TokioSearchProvider::new(runtime.handle().clone(), |_query: String| async move {
                Err::<SearchResponse, _>("backend unavailable")
            });

            provider.search("paris", coordinator.begin("paris"));
            let outcome = runtime.block_on(wait_for_answer(&mut coordinator));
            assert_eq!(outcome, FetchOutcome::Rejected);
        });

        let logs = String::from_utf8_lossy(&capture.0.lock()).into_owned();
        assert!(logs.contains("search failed"), "{logs}");
        assert!(logs.contains("DEBUG"), "{logs}");
        assert!(!logs.contains("WARN"), "{logs}");
    }

    #[test]
    fn test_no_runtime() {
        let provider = TokioSearchProvider::on_current_runtime(|_query: String| async move {
            Ok::<_, std::io::Error>(SearchResponse::absent())
        });
        assert!(provider.is_none());
    }
}
