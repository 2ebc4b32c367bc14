//! Repeating status poll for the active review session.
//!
//! At most one poll task exists per [`Poller`]. Starting a new poll aborts the
//! previous one first, so a stale session is never polled alongside a fresh one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::domain::service::ReviewService;
use crate::domain::types::SessionId;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How transient poll failures are handled: retried on every tick, forever
/// unless `max_duration` is set, at a fixed interval with no backoff.
///
/// `request_timeout` bounds every single call to the review service. A status
/// call that exceeds it counts as a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_duration: Option<Duration>,
    pub request_timeout: Duration,
}

impl RetryPolicy {
    pub fn with_max_duration(mut self, max_duration: Option<Duration>) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_duration: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

pub struct Poller {
    policy: RetryPolicy,
    handle: Option<(SessionId, JoinHandle<()>)>,
}

impl Poller {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            handle: None,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Session currently being polled, if the task is still alive
    pub fn active_session(&self) -> Option<&SessionId> {
        self.handle
            .as_ref()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(session, _)| session)
    }

    pub fn start(
        &mut self,
        session: SessionId,
        service: Arc<dyn ReviewService>,
        tx: UnboundedSender<Action>,
    ) {
        self.cancel();

        info!(session = %session, interval_ms = self.policy.interval.as_millis() as u64, "starting status poll");
        let handle = tokio::spawn(poll_status(session.clone(), self.policy, service, tx));
        self.handle = Some((session, handle));
    }

    pub fn cancel(&mut self) {
        if let Some((session, handle)) = self.handle.take() {
            if !handle.is_finished() {
                debug!(session = %session, "cancelling status poll");
            }
            handle.abort();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Await `fut` unless `deadline` passes first
async fn before<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(at) => tokio::time::timeout_at(at, fut).await.ok(),
        None => Some(fut.await),
    }
}

async fn poll_status(
    session: SessionId,
    policy: RetryPolicy,
    service: Arc<dyn ReviewService>,
    tx: UnboundedSender<Action>,
) {
    let started = Instant::now();
    let deadline = policy.max_duration.map(|max| started + max);
    let mut ticker = tokio::time::interval_at(started + policy.interval, policy.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Both the wait and the request race the overall deadline, so a
        // stalled request cannot outlive it.
        let attempt = async {
            ticker.tick().await;
            tokio::time::timeout(policy.request_timeout, service.status(&session)).await
        };

        let Some(result) = before(deadline, attempt).await else {
            let after = policy.max_duration.unwrap_or_default();
            warn!(session = %session, after_secs = after.as_secs(), "status poll timed out");
            let _ = tx.send(Action::PollTimedOut { session, after });
            return;
        };

        match result {
            Ok(Ok(snapshot)) => {
                let terminal = snapshot.status.is_terminal();
                if tx
                    .send(Action::StatusPolled {
                        session: session.clone(),
                        snapshot,
                    })
                    .is_err()
                    || terminal
                {
                    return;
                }
            }
            // Transient: the next tick retries.
            Ok(Err(err)) => warn!(session = %session, error = %err, "status poll failed"),
            Err(_) => warn!(
                session = %session,
                timeout_secs = policy.request_timeout.as_secs(),
                "status poll request timed out"
            ),
        }
    }
}
