//! End-to-end workflow tests: the real update loop, command executor and
//! poller, driven against a scripted review service on paused tokio time.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use acr::action::Action;
use acr::app::{App, AppState, ReviewLoad};
use acr::clipboard::Clipboard;
use acr::command::CommandExecutor;
use acr::domain::service::ReviewService;
use acr::domain::types::{
    Issue, IssueText, ReviewResult, ReviewStatus, ServiceLimits, SessionId, StatusSnapshot,
    Submission,
};
use acr::error::ServiceError;
use acr::poller::RetryPolicy;
use acr::update;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyModifiers};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::Instant;

#[derive(Default)]
struct ScriptedService {
    /// Statuses returned in order; the last one repeats
    statuses: Mutex<VecDeque<Result<ReviewStatus, u16>>>,
    submit_error: Mutex<Option<String>>,
    review_failures: AtomicUsize,
    status_calls: AtomicUsize,
    review_calls: AtomicUsize,
    /// Status calls seen when the first review call arrived
    status_calls_at_review: Mutex<Option<usize>>,
    /// Calls that never answer while set
    stall_submit: AtomicBool,
    stall_status: AtomicBool,
    stall_review: AtomicBool,
}

impl ScriptedService {
    fn with_statuses(statuses: Vec<Result<ReviewStatus, u16>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            ..Self::default()
        }
    }

    fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn review_calls(&self) -> usize {
        self.review_calls.load(Ordering::SeqCst)
    }
}

async fn stall_while(flag: &AtomicBool) {
    if flag.load(Ordering::SeqCst) {
        std::future::pending::<()>().await;
    }
}

#[async_trait]
impl ReviewService for ScriptedService {
    async fn limits(&self) -> Result<ServiceLimits, ServiceError> {
        Ok(ServiceLimits::default())
    }

    async fn submit(&self, _submission: &Submission) -> Result<SessionId, ServiceError> {
        stall_while(&self.stall_submit).await;
        match self.submit_error.lock().unwrap().clone() {
            Some(message) => Err(ServiceError::Rejected {
                status: 400,
                message: Some(message),
            }),
            None => Ok(SessionId::new("s1")),
        }
    }

    async fn status(&self, _session: &SessionId) -> Result<StatusSnapshot, ServiceError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        stall_while(&self.stall_status).await;
        let next = {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.pop_front().unwrap()
            } else {
                statuses.front().cloned().unwrap()
            }
        };
        match next {
            Ok(status) => Ok(StatusSnapshot {
                status,
                download_url: Some("/download/s1".to_string()),
                error: None,
            }),
            Err(code) => Err(ServiceError::UnexpectedStatus {
                endpoint: "/status/s1".to_string(),
                status: code,
            }),
        }
    }

    async fn review(&self, _session: &SessionId) -> Result<ReviewResult, ServiceError> {
        self.review_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut seen = self.status_calls_at_review.lock().unwrap();
            if seen.is_none() {
                *seen = Some(self.status_calls());
            }
        }
        stall_while(&self.stall_review).await;

        if self
            .review_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ServiceError::UnexpectedStatus {
                endpoint: "/review/s1".to_string(),
                status: 502,
            });
        }

        Ok(ReviewResult {
            ai_log: vec![Issue {
                file: "main.py".to_string(),
                line: 1,
                issue: IssueText::Text("missing docstring".to_string()),
                suggestion: String::new(),
                current_code: String::new(),
                recommended_code: String::new(),
                patch: None,
            }],
            ..ReviewResult::default()
        })
    }

    async fn download(&self, _download_url: &str) -> Result<Vec<u8>, ServiceError> {
        Ok(b"PK".to_vec())
    }
}

struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy(&self, _text: &str) -> Result<(), String> {
        Ok(())
    }
}

struct Harness {
    app: App,
    executor: CommandExecutor,
    rx: UnboundedReceiver<Action>,
}

impl Harness {
    fn new(service: Arc<ScriptedService>, policy: RetryPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let executor = CommandExecutor::new(
            service,
            Arc::new(NoClipboard),
            tx,
            policy,
            PathBuf::from("."),
        );
        Self {
            app: App::new(),
            executor,
            rx,
        }
    }

    fn dispatch(&mut self, action: Action) {
        let commands = update::update(&mut self.app, action);
        self.executor.execute_all(commands);
    }

    fn press(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.dispatch(Action::Input { code, modifiers });
    }

    fn submit_code(&mut self, code: &str) {
        self.app.code.set_value(code);
        self.press(KeyCode::Char('s'), KeyModifiers::CONTROL);
    }

    /// Process actions as they arrive until `duration` of (paused) time passes
    async fn run_for(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            tokio::select! {
                Some(action) = self.rx.recv() => self.dispatch(action),
                _ = tokio::time::sleep_until(deadline) => break,
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_review_fetched_once_after_complete() {
    let service = Arc::new(ScriptedService::with_statuses(vec![
        Ok(ReviewStatus::Pending),
        Ok(ReviewStatus::Running),
        Ok(ReviewStatus::Complete),
    ]));
    let mut harness = Harness::new(service.clone(), RetryPolicy::default());

    harness.submit_code("print('hi')");
    harness.run_for(Duration::from_secs(20)).await;

    assert_eq!(service.status_calls(), 3);
    assert_eq!(service.review_calls(), 1);
    assert_eq!(*service.status_calls_at_review.lock().unwrap(), Some(3));
    assert_eq!(harness.app.state, AppState::Complete);
    assert_eq!(harness.app.summary().map(|s| s.total_issues), Some(1));
    assert!(harness.executor.poller().active_session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_tab_switch_stops_polling() {
    let service = Arc::new(ScriptedService::with_statuses(vec![Ok(ReviewStatus::Running)]));
    let mut harness = Harness::new(service.clone(), RetryPolicy::default());

    harness.submit_code("x = 1");
    harness.run_for(Duration::from_secs(5)).await;
    assert_eq!(harness.app.state, AppState::Polling);
    assert_eq!(service.status_calls(), 2);

    harness.press(KeyCode::F(3), KeyModifiers::NONE);
    let calls = service.status_calls();
    harness.run_for(Duration::from_secs(30)).await;

    assert_eq!(service.status_calls(), calls);
    assert_eq!(harness.app.state, AppState::Idle);
    assert_eq!(harness.app.session, None);
    assert!(harness.executor.poller().active_session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_transient_status_errors_are_retried() {
    let service = Arc::new(ScriptedService::with_statuses(vec![
        Err(503),
        Err(503),
        Ok(ReviewStatus::Complete),
    ]));
    let mut harness = Harness::new(service.clone(), RetryPolicy::default());

    harness.submit_code("x = 1");
    harness.run_for(Duration::from_secs(3)).await;
    assert_eq!(harness.app.state, AppState::Polling);
    assert!(harness.app.errors.is_empty());

    harness.run_for(Duration::from_secs(10)).await;
    assert_eq!(service.status_calls(), 3);
    assert_eq!(harness.app.state, AppState::Complete);
}

#[tokio::test(start_paused = true)]
async fn test_review_failure_is_retryable() {
    let service = Arc::new(ScriptedService::with_statuses(vec![Ok(ReviewStatus::Complete)]));
    service.review_failures.store(1, Ordering::SeqCst);
    let mut harness = Harness::new(service.clone(), RetryPolicy::default());

    harness.submit_code("x = 1");
    harness.run_for(Duration::from_secs(5)).await;
    assert!(matches!(harness.app.review, Some(ReviewLoad::Failed(_))));

    harness.press(KeyCode::Char('r'), KeyModifiers::NONE);
    harness.run_for(Duration::from_secs(1)).await;

    assert_eq!(service.review_calls(), 2);
    assert!(harness.app.loaded_review().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_submission_shows_service_message() {
    let service = Arc::new(ScriptedService::default());
    *service.submit_error.lock().unwrap() = Some("Invalid file type for pasted code.".to_string());
    let mut harness = Harness::new(service.clone(), RetryPolicy::default());

    harness.submit_code("x = 1");
    harness.run_for(Duration::from_secs(5)).await;

    assert_eq!(
        harness.app.errors,
        vec!["Invalid file type for pasted code.".to_string()]
    );
    assert_eq!(service.status_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_poll_timeout() {
    let service = Arc::new(ScriptedService::with_statuses(vec![Ok(ReviewStatus::Running)]));
    let policy = RetryPolicy::default().with_max_duration(Some(Duration::from_secs(5)));
    let mut harness = Harness::new(service.clone(), policy);

    harness.submit_code("x = 1");
    harness.run_for(Duration::from_secs(30)).await;

    assert_eq!(
        harness.app.state,
        AppState::Error("Review timed out after 5s".to_string())
    );
    assert_eq!(service.status_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_new_submission_restarts_polling() {
    let service = Arc::new(ScriptedService::with_statuses(vec![Ok(ReviewStatus::Running)]));
    let mut harness = Harness::new(service.clone(), RetryPolicy::default());

    harness.submit_code("x = 1");
    harness.run_for(Duration::from_secs(3)).await;
    harness.press(KeyCode::Esc, KeyModifiers::NONE);
    harness.submit_code("x = 2");
    harness.run_for(Duration::from_secs(3)).await;

    // One poll for each submission, never two tasks at once.
    assert_eq!(service.status_calls(), 2);
    assert_eq!(
        harness.executor.poller().active_session(),
        Some(&SessionId::new("s1"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_poll_timeout_while_status_hangs() {
    let service = Arc::new(ScriptedService::with_statuses(vec![Ok(ReviewStatus::Running)]));
    service.stall_status.store(true, Ordering::SeqCst);
    let policy = RetryPolicy::default().with_max_duration(Some(Duration::from_secs(5)));
    let mut harness = Harness::new(service.clone(), policy);

    harness.submit_code("x = 1");
    harness.run_for(Duration::from_secs(600)).await;

    assert_eq!(
        harness.app.state,
        AppState::Error("Review timed out after 5s".to_string())
    );
    assert_eq!(service.status_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_status_call_is_abandoned_and_retried() {
    let service = Arc::new(ScriptedService::with_statuses(vec![Ok(ReviewStatus::Complete)]));
    service.stall_status.store(true, Ordering::SeqCst);
    let policy = RetryPolicy::default().with_request_timeout(Duration::from_secs(3));
    let mut harness = Harness::new(service.clone(), policy);

    harness.submit_code("x = 1");
    harness.run_for(Duration::from_secs(20)).await;
    assert_eq!(harness.app.state, AppState::Polling);
    assert!(harness.app.errors.is_empty());
    assert!(service.status_calls() >= 2);

    // The service recovers and the next attempt goes through
    service.stall_status.store(false, Ordering::SeqCst);
    harness.run_for(Duration::from_secs(10)).await;
    assert_eq!(harness.app.state, AppState::Complete);
    assert_eq!(service.review_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_review_fetch_fails_and_can_be_retried() {
    let service = Arc::new(ScriptedService::with_statuses(vec![Ok(ReviewStatus::Complete)]));
    service.stall_review.store(true, Ordering::SeqCst);
    let policy = RetryPolicy::default().with_request_timeout(Duration::from_secs(3));
    let mut harness = Harness::new(service.clone(), policy);

    harness.submit_code("x = 1");
    harness.run_for(Duration::from_secs(3)).await;
    assert_eq!(harness.app.review, Some(ReviewLoad::Loading));

    harness.run_for(Duration::from_secs(60)).await;
    let Some(ReviewLoad::Failed(message)) = &harness.app.review else {
        panic!("expected a failed review load, got {:?}", harness.app.review);
    };
    assert!(message.contains("timed out"), "{message}");
    assert_eq!(service.review_calls(), 1);

    service.stall_review.store(false, Ordering::SeqCst);
    harness.press(KeyCode::Char('r'), KeyModifiers::NONE);
    harness.run_for(Duration::from_secs(1)).await;

    assert_eq!(service.review_calls(), 2);
    assert!(harness.app.loaded_review().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_hanging_submission_leaves_submitting() {
    let service = Arc::new(ScriptedService::default());
    service.stall_submit.store(true, Ordering::SeqCst);
    let policy = RetryPolicy::default().with_request_timeout(Duration::from_secs(3));
    let mut harness = Harness::new(service.clone(), policy);

    harness.submit_code("x = 1");
    harness.run_for(Duration::from_secs(1)).await;
    assert_eq!(harness.app.state, AppState::Submitting);

    harness.run_for(Duration::from_secs(60)).await;
    let AppState::Error(message) = &harness.app.state else {
        panic!("expected an error state, got {:?}", harness.app.state);
    };
    assert!(message.contains("timed out"), "{message}");
    assert_eq!(service.status_calls(), 0);
    assert!(harness.executor.poller().active_session().is_none());
}

