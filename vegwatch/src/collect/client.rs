//! Request lifecycle of the analysis service.
//!
//! [`AnalysisClient`] owns the single lifecycle slot. Each submission takes a
//! generation ticket when it enters `Submitting`; when its call resolves it may
//! only write the slot if no newer submission has started since. A superseded
//! response is dropped, so the last submission always wins.
//!
//! The observer is called while the slot is still locked, so observed
//! transitions arrive in the same order as the writes. An observer must not
//! call back into the client.

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::collect::request::AnalysisRequest;
use crate::collect::response::AnalysisResult;
use crate::collect::sentinel::sentinel_collect::AnalysisService;
use crate::error::RequestFailure;

/// What the result area should reflect at this instant
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestLifecycleState {
    #[default]
    Idle,
    Submitting,
    Succeeded(Arc<AnalysisResult>),
    Failed(RequestFailure),
}

impl RequestLifecycleState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, RequestLifecycleState::Submitting)
    }
}

/// How a single call to [`AnalysisClient::submit`] ended
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Succeeded(Arc<AnalysisResult>),
    Failed(RequestFailure),
    /// A newer submission started before this one resolved; its result was discarded
    Superseded,
}

/// Callback invoked after every accepted state transition
pub type TransitionObserver = Arc<dyn Fn(&RequestLifecycleState) + Send + Sync>;

struct Slot {
    generation: u64,
    state: RequestLifecycleState,
}

pub struct AnalysisClient<S> {
    service: S,
    slot: Mutex<Slot>,
    observer: Option<TransitionObserver>,
}

impl<S: AnalysisService> AnalysisClient<S> {
    pub fn new(service: S) -> Self {
        AnalysisClient {
            service,
            slot: Mutex::new(Slot {
                generation: 0,
                state: RequestLifecycleState::Idle,
            }),
            observer: None,
        }
    }

    /// Register the callback notified on every transition.
    ///
    /// Runs under the lifecycle lock: it must not await or call back into
    /// this client.
    pub fn set_observer(&mut self, observer: TransitionObserver) {
        self.observer = Some(observer);
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Snapshot of the current lifecycle state
    pub fn state(&self) -> RequestLifecycleState {
        self.slot.lock().state.clone()
    }

    /// Send one request and record its outcome.
    ///
    /// Enters `Submitting` before the call is made; concurrent submissions are
    /// not blocked, but only the latest one may write its terminal state.
    pub async fn submit(&self, request: AnalysisRequest) -> SubmissionOutcome {
        let ticket = self.begin();
        debug!("Submission #{} started", ticket);

        let outcome = self.service.analyze(&request).await;
        self.resolve(ticket, outcome)
    }

    fn begin(&self) -> u64 {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        slot.state = RequestLifecycleState::Submitting;
        self.notify(&slot.state);
        slot.generation
    }

    fn resolve(
        &self,
        ticket: u64,
        outcome: Result<AnalysisResult, RequestFailure>,
    ) -> SubmissionOutcome {
        let (state, result) = match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                (
                    RequestLifecycleState::Succeeded(Arc::clone(&result)),
                    SubmissionOutcome::Succeeded(result),
                )
            }
            Err(failure) => (
                RequestLifecycleState::Failed(failure.clone()),
                SubmissionOutcome::Failed(failure),
            ),
        };

        let mut slot = self.slot.lock();
        if slot.generation != ticket {
            debug!(
                "Submission #{} superseded by #{}, discarding its response",
                ticket, slot.generation
            );
            return SubmissionOutcome::Superseded;
        }

        match &result {
            SubmissionOutcome::Succeeded(_) => info!("Submission #{} succeeded", ticket),
            SubmissionOutcome::Failed(failure) => {
                warn!("Submission #{} failed: {}", ticket, failure)
            }
            SubmissionOutcome::Superseded => {}
        }

        slot.state = state;
        self.notify(&slot.state);
        result
    }

    fn notify(&self, state: &RequestLifecycleState) {
        if let Some(observer) = &self.observer {
            observer(state);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::collect::request::{IndexChoice, RequestBuilder};
    use crate::collect::response::VegetationPercentages;
    use crate::commons::date_range::DateRangeInput;
    use crate::geometric::area_of_interest::parse_polygon;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Service whose answers are released by the test, one channel per call
    pub(crate) struct ScriptedService {
        pending: Mutex<VecDeque<oneshot::Receiver<Result<AnalysisResult, RequestFailure>>>>,
        pub calls: Mutex<Vec<AnalysisRequest>>,
    }

    impl ScriptedService {
        pub(crate) fn new(
            count: usize,
        ) -> (Self, Vec<oneshot::Sender<Result<AnalysisResult, RequestFailure>>>) {
            let mut senders = Vec::new();
            let mut pending = VecDeque::new();
            for _ in 0..count {
                let (tx, rx) = oneshot::channel();
                senders.push(tx);
                pending.push_back(rx);
            }
            let service = ScriptedService {
                pending: Mutex::new(pending),
                calls: Mutex::new(Vec::new()),
            };
            (service, senders)
        }
    }

    #[async_trait]
    impl AnalysisService for ScriptedService {
        async fn analyze(
            &self,
            request: &AnalysisRequest,
        ) -> Result<AnalysisResult, RequestFailure> {
            self.calls.lock().push(request.clone());
            let rx = self
                .pending
                .lock()
                .pop_front()
                .expect("unexpected extra call");
            rx.await.expect("test dropped the response sender")
        }
    }

    pub(crate) fn result_with(no_vegetation: f64) -> AnalysisResult {
        AnalysisResult {
            image: vec![1, 2, 3],
            percentages: Some(VegetationPercentages {
                no_vegetation: Some(no_vegetation),
                moderate_vegetation: Some(0.5),
                dense_vegetation: Some(0.3),
            }),
        }
    }

    fn request() -> AnalysisRequest {
        RequestBuilder::build(
            parse_polygon("[[10.0,45.0],[10.1,45.0],[10.1,45.1]]").unwrap(),
            DateRangeInput::new("2024-06-01", "2024-06-30").validate().unwrap(),
            IndexChoice::Evi,
        )
    }

    #[tokio::test]
    async fn test_success_transitions() {
        let (service, mut senders) = ScriptedService::new(1);
        let client = AnalysisClient::new(service);
        assert_eq!(client.state(), RequestLifecycleState::Idle);

        let tx = senders.remove(0);
        let submit = client.submit(request());
        let release = async {
            tokio::task::yield_now().await;
            assert!(client.state().is_submitting());
            tx.send(Ok(result_with(0.2))).unwrap();
        };
        let (outcome, _) = tokio::join!(submit, release);

        assert_eq!(outcome, SubmissionOutcome::Succeeded(Arc::new(result_with(0.2))));
        assert_eq!(
            client.state(),
            RequestLifecycleState::Succeeded(Arc::new(result_with(0.2)))
        );
        assert_eq!(client.service().calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_transition() {
        let (service, mut senders) = ScriptedService::new(1);
        let client = AnalysisClient::new(service);
        let failure = RequestFailure::Status {
            status: 500,
            message: "boom".to_string(),
        };
        senders.remove(0).send(Err(failure.clone())).unwrap();

        let outcome = client.submit(request()).await;
        assert_eq!(outcome, SubmissionOutcome::Failed(failure.clone()));
        assert_eq!(client.state(), RequestLifecycleState::Failed(failure));
    }

    #[tokio::test]
    async fn test_last_submission_wins_when_first_resolves_first() {
        let (service, mut senders) = ScriptedService::new(2);
        let client = AnalysisClient::new(service);
        let tx_b = senders.pop().unwrap();
        let tx_a = senders.pop().unwrap();

        let driver = async {
            tokio::task::yield_now().await;
            // A resolves while B is still in flight
            tx_a.send(Ok(result_with(0.1))).unwrap();
            tokio::task::yield_now().await;
            assert!(client.state().is_submitting());
            tx_b.send(Ok(result_with(0.9))).unwrap();
        };
        let (a, b, _) = tokio::join!(client.submit(request()), client.submit(request()), driver);

        assert_eq!(a, SubmissionOutcome::Superseded);
        assert_eq!(b, SubmissionOutcome::Succeeded(Arc::new(result_with(0.9))));
        assert_eq!(
            client.state(),
            RequestLifecycleState::Succeeded(Arc::new(result_with(0.9)))
        );
    }

    #[tokio::test]
    async fn test_late_response_never_overwrites_newer() {
        let (service, mut senders) = ScriptedService::new(2);
        let client = AnalysisClient::new(service);
        let tx_b = senders.pop().unwrap();
        let tx_a = senders.pop().unwrap();

        let driver = async {
            tokio::task::yield_now().await;
            tx_b.send(Ok(result_with(0.9))).unwrap();
            tokio::task::yield_now().await;
            tx_a.send(Err(RequestFailure::Transport("late".to_string()))).unwrap();
        };
        let (a, b, _) = tokio::join!(client.submit(request()), client.submit(request()), driver);

        assert_eq!(a, SubmissionOutcome::Superseded);
        assert!(matches!(b, SubmissionOutcome::Succeeded(_)));
        assert_eq!(
            client.state(),
            RequestLifecycleState::Succeeded(Arc::new(result_with(0.9)))
        );
    }

    #[tokio::test]
    async fn test_observer_sees_every_accepted_transition() {
        let (service, mut senders) = ScriptedService::new(2);
        let mut client = AnalysisClient::new(service);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        client.set_observer(Arc::new(move |state: &RequestLifecycleState| {
            sink.lock().push(state.clone());
        }));

        let tx_b = senders.pop().unwrap();
        let tx_a = senders.pop().unwrap();
        let driver = async {
            tokio::task::yield_now().await;
            tx_a.send(Ok(result_with(0.1))).unwrap();
            tokio::task::yield_now().await;
            tx_b.send(Ok(result_with(0.9))).unwrap();
        };
        tokio::join!(client.submit(request()), client.submit(request()), driver);

        let seen = seen.lock();
        assert_eq!(
            *seen,
            vec![
                RequestLifecycleState::Submitting,
                RequestLifecycleState::Submitting,
                RequestLifecycleState::Succeeded(Arc::new(result_with(0.9))),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_observer_order_matches_state_across_threads() {
        let (service, mut senders) = ScriptedService::new(2);
        let mut client = AnalysisClient::new(service);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        client.set_observer(Arc::new(move |state: &RequestLifecycleState| {
            // Slow renderer: a newer submission starts while this one is drawn
            if matches!(state, RequestLifecycleState::Succeeded(_)) {
                std::thread::sleep(Duration::from_millis(300));
            }
            sink.lock().push(state.clone());
        }));
        let client = Arc::new(client);

        let tx_b = senders.pop().unwrap();
        let tx_a = senders.pop().unwrap();
        tx_a.send(Ok(result_with(0.1))).unwrap();

        let first = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.submit(request()).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.submit(request()).await }
        });
        tokio::time::sleep(Duration::from_millis(400)).await;

        let state = client.state();
        assert!(state.is_submitting());
        assert_eq!(seen.lock().last(), Some(&state));

        tx_b.send(Ok(result_with(0.9))).unwrap();
        first.await.unwrap();
        let outcome = second.await.unwrap();

        assert_eq!(outcome, SubmissionOutcome::Succeeded(Arc::new(result_with(0.9))));
        let state = client.state();
        assert_eq!(state, RequestLifecycleState::Succeeded(Arc::new(result_with(0.9))));
        assert_eq!(seen.lock().last(), Some(&state));
    }
}
