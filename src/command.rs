use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::action::{Action, CopyTarget};
use crate::clipboard::Clipboard;
use crate::domain::service::{self, ReviewService};
use crate::domain::types::{ServiceLimits, SessionId, Submission};
use crate::error::ServiceError;
use crate::poller::{Poller, RetryPolicy};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadLimits,
    Submit { epoch: u64, submission: Submission },
    StartPolling { session: SessionId },
    StopPolling,
    FetchReview { session: SessionId },
    CopyToClipboard {
        session: SessionId,
        target: CopyTarget,
        text: String,
    },
    Download { session: SessionId, url: String },
}

/// Runs [`Command`]s. Network work is spawned and reports back on `tx`, so the
/// UI loop never waits on the review service.
pub struct CommandExecutor {
    service: Arc<dyn ReviewService>,
    clipboard: Arc<dyn Clipboard>,
    tx: UnboundedSender<Action>,
    poller: Poller,
    request_timeout: Duration,
    download_dir: PathBuf,
}

impl CommandExecutor {
    pub fn new(
        service: Arc<dyn ReviewService>,
        clipboard: Arc<dyn Clipboard>,
        tx: UnboundedSender<Action>,
        policy: RetryPolicy,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            service,
            clipboard,
            tx,
            poller: Poller::new(policy),
            request_timeout: policy.request_timeout,
            download_dir,
        }
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn execute_all(&mut self, commands: Vec<Command>) {
        for command in commands {
            self.execute(command);
        }
    }

    pub fn execute(&mut self, command: Command) {
        debug!(?command, "executing command");

        match command {
            Command::LoadLimits => {
                let service = self.service.clone();
                let tx = self.tx.clone();
                let limit = self.request_timeout;
                tokio::spawn(async move {
                    let limits = tokio::time::timeout(limit, service::load_limits(service.as_ref()))
                        .await
                        .unwrap_or_else(|_| {
                            warn!("service limits request timed out, using defaults");
                            ServiceLimits::default()
                        });
                    let _ = tx.send(Action::LimitsLoaded(limits));
                });
            }
            Command::Submit { epoch, submission } => {
                let service = self.service.clone();
                let tx = self.tx.clone();
                let limit = self.request_timeout;
                tokio::spawn(async move {
                    let result = bounded("submission", limit, service.submit(&submission))
                        .await
                        .map_err(|e| e.user_message("Submission failed"));
                    let _ = tx.send(Action::Submitted { epoch, result });
                });
            }
            Command::StartPolling { session } => {
                self.poller
                    .start(session, self.service.clone(), self.tx.clone());
            }
            Command::StopPolling => self.poller.cancel(),
            Command::FetchReview { session } => {
                let service = self.service.clone();
                let tx = self.tx.clone();
                let limit = self.request_timeout;
                tokio::spawn(async move {
                    let result = bounded("review", limit, service.review(&session))
                        .await
                        .map_err(|e| {
                            warn!(session = %session, error = %e, "review fetch failed");
                            e.user_message("Could not load review results")
                        });
                    let _ = tx.send(Action::ReviewLoaded { session, result });
                });
            }
            Command::CopyToClipboard {
                session,
                target,
                text,
            } => {
                let clipboard = self.clipboard.clone();
                let tx = self.tx.clone();
                tokio::task::spawn_blocking(move || {
                    let result = clipboard.copy(&text);
                    let _ = tx.send(Action::Copied {
                        session,
                        target,
                        result,
                    });
                });
            }
            Command::Download { session, url } => {
                let service = self.service.clone();
                let tx = self.tx.clone();
                let path = self.download_dir.join(session.archive_file_name());
                let limit = self.request_timeout;
                tokio::spawn(async move {
                    let result = save_archive(service.as_ref(), &url, path, limit).await;
                    let _ = tx.send(Action::Downloaded { session, result });
                });
            }
        }
    }
}

/// Run a service call, giving up after `limit`
async fn bounded<T>(
    operation: &'static str,
    limit: Duration,
    call: impl Future<Output = Result<T, ServiceError>>,
) -> Result<T, ServiceError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(ServiceError::TimedOut {
            operation,
            after: limit,
        }))
}

async fn save_archive(
    service: &dyn ReviewService,
    url: &str,
    path: PathBuf,
    limit: Duration,
) -> Result<PathBuf, String> {
    let bytes = bounded("download", limit, service.download(url))
        .await
        .map_err(|e| e.user_message("Download failed"))?;

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| format!("Failed to save {}: {}", path.display(), e))?;

    info!(path = %path.display(), size = bytes.len(), "saved review archive");
    Ok(path)
}
