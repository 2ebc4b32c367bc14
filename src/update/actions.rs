use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::action::CopyTarget;
use crate::app::{App, AppState, ReviewLoad};
use crate::command::Command;
use crate::domain::types::{ReviewResult, ReviewStatus, ServiceLimits, SessionId, StatusSnapshot};

/// Results addressed to anything but the live session are dropped
fn is_current(app: &App, session: &SessionId) -> bool {
    app.session.as_ref() == Some(session)
}

pub fn handle_limits_loaded(app: &mut App, limits: ServiceLimits) -> Vec<Command> {
    app.limits = limits;
    Vec::new()
}

pub fn handle_submitted(app: &mut App, epoch: u64, result: Result<SessionId, String>) -> Vec<Command> {
    if epoch != app.epoch || app.state != AppState::Submitting {
        debug!(epoch, current = app.epoch, "discarding stale submission result");
        return Vec::new();
    }

    match result {
        Ok(session) => {
            info!(session = %session, "submission accepted");
            app.session = Some(session.clone());
            app.state = AppState::Polling;
            vec![Command::StartPolling { session }]
        }
        Err(err) => {
            app.fail(err);
            Vec::new()
        }
    }
}

pub fn handle_status_polled(
    app: &mut App,
    session: SessionId,
    snapshot: StatusSnapshot,
) -> Vec<Command> {
    if !is_current(app, &session) || app.state != AppState::Polling {
        debug!(session = %session, "discarding stale status");
        return Vec::new();
    }

    let status = snapshot.status.clone();
    let error = snapshot.error.clone();
    app.status = Some(snapshot);

    match status {
        ReviewStatus::Complete => {
            info!(session = %session, "review complete");
            app.state = AppState::Complete;
            app.review = Some(ReviewLoad::Loading);
            vec![Command::StopPolling, Command::FetchReview { session }]
        }
        ReviewStatus::NotFound => {
            warn!(session = %session, "session not found");
            app.state = AppState::NotFound;
            vec![Command::StopPolling]
        }
        ReviewStatus::Error => {
            let message = error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "Review failed".to_string());
            warn!(session = %session, error = %message, "review failed");
            app.fail(message);
            vec![Command::StopPolling]
        }
        _ => Vec::new(),
    }
}

pub fn handle_poll_timed_out(app: &mut App, session: SessionId, after: Duration) -> Vec<Command> {
    if !is_current(app, &session) || app.state != AppState::Polling {
        return Vec::new();
    }

    app.fail(format!("Review timed out after {}s", after.as_secs()));
    vec![Command::StopPolling]
}

pub fn handle_review_loaded(
    app: &mut App,
    session: SessionId,
    result: Result<ReviewResult, String>,
) -> Vec<Command> {
    if !is_current(app, &session) || app.state != AppState::Complete {
        debug!(session = %session, "discarding stale review");
        return Vec::new();
    }

    app.review = Some(match result {
        Ok(review) => {
            info!(session = %session, issues = review.ai_log.len(), "review loaded");
            ReviewLoad::Loaded(review)
        }
        Err(err) => ReviewLoad::Failed(err),
    });
    app.selected_issue = 0;
    app.expanded.clear();
    Vec::new()
}

pub fn handle_copied(
    app: &mut App,
    session: SessionId,
    target: CopyTarget,
    result: Result<(), String>,
) -> Vec<Command> {
    if !is_current(app, &session) || app.loaded_review().is_none() {
        debug!(session = %session, "discarding stale copy result");
        return Vec::new();
    }

    match result {
        Ok(()) => app.show_copied(target, Instant::now()),
        Err(err) => {
            warn!(error = %err, "clipboard copy failed");
            app.notice = Some(err);
        }
    }
    Vec::new()
}

pub fn handle_downloaded(
    app: &mut App,
    session: SessionId,
    result: Result<PathBuf, String>,
) -> Vec<Command> {
    if !is_current(app, &session) {
        return Vec::new();
    }

    app.notice = Some(match result {
        Ok(path) => format!("Saved review archive to {}", path.display()),
        Err(err) => err,
    });
    Vec::new()
}
