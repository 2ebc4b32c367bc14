use std::path::PathBuf;
use std::time::Duration;

use crate::poller::{RetryPolicy, DEFAULT_REQUEST_TIMEOUT};

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = DEFAULT_REQUEST_TIMEOUT.as_secs();

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the review service
    pub api_base: String,
    pub retry_policy: RetryPolicy,
    /// Where downloaded review archives are saved
    pub download_dir: PathBuf,
    pub log_file: PathBuf,
}

impl AppConfig {
    pub fn new(
        api_base: String,
        poll_timeout_secs: Option<u64>,
        request_timeout_secs: u64,
        download_dir: PathBuf,
        log_file: PathBuf,
    ) -> Self {
        Self {
            api_base,
            retry_policy: RetryPolicy::default()
                .with_max_duration(poll_timeout_secs.map(Duration::from_secs))
                .with_request_timeout(Duration::from_secs(request_timeout_secs.max(1))),
            download_dir,
            log_file,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_API_BASE.to_string(),
            None,
            DEFAULT_REQUEST_TIMEOUT_SECS,
            PathBuf::from("."),
            PathBuf::from("acr.log"),
        )
    }
}
