//! Result fetching with supersession.
//!
//! Every search attempt mints a fresh [`RequestToken`] and hands the search
//! provider a [`ResultSink`]. The sink is single-shot: resolving or rejecting
//! consumes it, and dropping it unanswered counts as a rejection. Answers are
//! queued on a channel and applied on the controller's thread by
//! [`FetchCoordinator::drain`], which only lets through the answer for the
//! most recently minted token. Answers for superseded or cancelled tokens
//! are dropped, no matter in which order they arrive.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use typeahead_core::CancellationToken;
use typeahead_core::logging::targets;

use crate::suggestion::SearchResponse;

/// Callback invoked after an answer is queued, so an event loop sleeping
/// until its next timer knows to call [`tick`](crate::AutocompleteController::tick).
pub type Wakeup = Arc<dyn Fn() + Send + Sync>;

/// Identifies one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Get the raw u64 value of this token.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// How a fetch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The provider answered.
    Resolved(SearchResponse),
    /// The provider failed, or dropped the sink without answering.
    Rejected,
}

/// An answer that is still current when applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub token: RequestToken,
    /// The query the request was issued for.
    pub query: String,
    pub outcome: FetchOutcome,
}

/// The provider's end of a fetch.
///
/// Resolve it with [`resolve`](Self::resolve) or fail it with
/// [`reject`](Self::reject). The sink may be moved to another thread and
/// answered later. Check [`is_cancelled`](Self::is_cancelled) to stop work
/// early once the controller is no longer interested.
pub struct ResultSink {
    token: RequestToken,
    query: String,
    sender: Option<Sender<FetchResult>>,
    cancellation: CancellationToken,
    wakeup: Option<Wakeup>,
}

impl ResultSink {
    /// The token of the request this sink answers.
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// The query being searched.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the controller has cancelled or superseded this request.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// The cancellation flag of this request.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Answer with a response.
    pub fn resolve(mut self, response: SearchResponse) {
        self.deliver(FetchOutcome::Resolved(response));
    }

    /// Report failure.
    pub fn reject(mut self) {
        self.deliver(FetchOutcome::Rejected);
    }

    fn deliver(&mut self, outcome: FetchOutcome) {
        let Some(sender) = self.sender.take() else {
            return;
        };
        let result = FetchResult {
            token: self.token,
            query: std::mem::take(&mut self.query),
            outcome,
        };
        // The controller may already be gone; its answers no longer matter.
        if sender.send(result).is_ok() {
            if let Some(wakeup) = &self.wakeup {
                wakeup();
            }
        }
    }
}

impl Drop for ResultSink {
    fn drop(&mut self) {
        if self.sender.is_some() {
            tracing::debug!(target: targets::FETCH, token = self.token.0, "result sink dropped without an answer");
            self.deliver(FetchOutcome::Rejected);
        }
    }
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSink")
            .field("token", &self.token)
            .field("query", &self.query)
            .field("answered", &self.sender.is_none())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Supplies suggestions for a query.
///
/// Implementations must eventually resolve or reject the sink, either
/// before returning or later from anywhere. Closures taking
/// `(&str, ResultSink)` implement this trait.
pub trait SearchProvider {
    /// Start a search for `query`, answering through `sink`.
    fn search(&mut self, query: &str, sink: ResultSink);
}

impl<F> SearchProvider for F
where
    F: FnMut(&str, ResultSink),
{
    fn search(&mut self, query: &str, sink: ResultSink) {
        self(query, sink)
    }
}

#[derive(Debug)]
struct InFlight {
    token: RequestToken,
    cancellation: CancellationToken,
}

/// Issues request tokens and filters answers down to the current one.
pub struct FetchCoordinator {
    next_token: u64,
    current: Option<InFlight>,
    sender: Sender<FetchResult>,
    receiver: Receiver<FetchResult>,
    wakeup: Option<Wakeup>,
}

impl FetchCoordinator {
    /// Create a coordinator with nothing in flight.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            next_token: 1,
            current: None,
            sender,
            receiver,
            wakeup: None,
        }
    }

    /// Invoke `wakeup` whenever an answer is queued.
    pub fn set_wakeup(&mut self, wakeup: Option<Wakeup>) {
        self.wakeup = wakeup;
    }

    /// Start a fetch for `query`, superseding (and cancelling) the previous one.
    pub fn begin(&mut self, query: &str) -> ResultSink {
        self.cancel();

        let token = RequestToken(self.next_token);
        self.next_token += 1;
        let cancellation = CancellationToken::new();
        self.current = Some(InFlight {
            token,
            cancellation: cancellation.clone(),
        });
        tracing::debug!(target: targets::FETCH, token = token.0, %query, "fetch issued");

        ResultSink {
            token,
            query: query.to_owned(),
            sender: Some(self.sender.clone()),
            cancellation,
            wakeup: self.wakeup.clone(),
        }
    }

    /// Cancel the in-flight fetch. Its answer, if it ever arrives, is dropped.
    ///
    /// Returns whether a fetch was in flight.
    pub fn cancel(&mut self) -> bool {
        match self.current.take() {
            Some(in_flight) => {
                in_flight.cancellation.cancel();
                tracing::debug!(target: targets::FETCH, token = in_flight.token.0, "fetch cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether `token` belongs to the fetch currently in flight.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current.as_ref().is_some_and(|in_flight| in_flight.token == token)
    }

    /// The token of the fetch in flight, if any.
    pub fn in_flight(&self) -> Option<RequestToken> {
        self.current.as_ref().map(|in_flight| in_flight.token)
    }

    /// Take every queued answer and return the one that is still current.
    ///
    /// At most one answer can be current, since accepting it ends the fetch.
    pub fn drain(&mut self) -> Option<FetchResult> {
        let mut accepted = None;
        for result in self.receiver.try_iter() {
            if self.is_current(result.token) {
                self.current = None;
                accepted = Some(result);
            } else {
                tracing::debug!(target: targets::FETCH, token = result.token.0, "dropping stale result");
            }
        }
        accepted
    }
}

impl std::fmt::Debug for FetchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCoordinator")
            .field("next_token", &self.next_token)
            .field("in_flight", &self.in_flight())
            .field("queued", &self.receiver.len())
            .finish()
    }
}

impl Default for FetchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_current_answer_is_accepted() {
        let mut fetch = FetchCoordinator::new();
        let sink = fetch.begin("par");
        let token = sink.token();
        sink.resolve(SearchResponse::from_values(["paris"]));

        let result = fetch.drain().unwrap();
        assert_eq!(result.token, token);
        assert_eq!(result.query, "par");
        assert!(matches!(result.outcome, FetchOutcome::Resolved(_)));
        assert_eq!(fetch.in_flight(), None);
    }

    #[test]
    fn test_superseded_answer_is_dropped_out_of_order() {
        let mut fetch = FetchCoordinator::new();
        let first = fetch.begin("a");
        let second = fetch.begin("ab");
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        let second_token = second.token();
        second.resolve(SearchResponse::from_values(["abc"]));
        first.resolve(SearchResponse::from_values(["a-stale"]));

        let result = fetch.drain().unwrap();
        assert_eq!(result.token, second_token);
        assert!(fetch.drain().is_none());
    }

    #[test]
    fn test_late_answer_after_accept_is_dropped() {
        let mut fetch = FetchCoordinator::new();
        let first = fetch.begin("a");
        first.reject();
        assert!(fetch.drain().is_some());

        let orphan = fetch.begin("b");
        fetch.cancel();
        orphan.resolve(SearchResponse::from_values(["b"]));
        assert!(fetch.drain().is_none());
    }

    #[test]
    fn test_dropped_sink_rejects() {
        let mut fetch = FetchCoordinator::new();
        drop(fetch.begin("x"));

        let result = fetch.drain().unwrap();
        assert_eq!(result.outcome, FetchOutcome::Rejected);
    }

    #[test]
    fn test_tokens_are_monotonic() {
        let mut fetch = FetchCoordinator::new();
        let a = fetch.begin("a").token();
        let b = fetch.begin("b").token();
        assert!(b > a);
        assert!(fetch.is_current(b));
        assert!(!fetch.is_current(a));
    }

    #[test]
    fn test_wakeup_runs_on_delivery() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let mut fetch = FetchCoordinator::new();
        let counter = wakes.clone();
        fetch.set_wakeup(Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        let sink = fetch.begin("q");
        std::thread::spawn(move || sink.resolve(SearchResponse::absent()))
            .join()
            .unwrap();

        assert_eq!(wakes.load(Ordering::SeqCst), 1);
        assert!(fetch.drain().is_some());
    }
}
