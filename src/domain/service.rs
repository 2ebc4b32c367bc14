use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use super::types::{ReviewResult, ServiceLimits, SessionId, StatusSnapshot, Submission};
use crate::error::ServiceError;

/// The remote review backend
#[async_trait]
pub trait ReviewService: Send + Sync {
    async fn limits(&self) -> Result<ServiceLimits, ServiceError>;
    async fn submit(&self, submission: &Submission) -> Result<SessionId, ServiceError>;
    async fn status(&self, session: &SessionId) -> Result<StatusSnapshot, ServiceError>;
    async fn review(&self, session: &SessionId) -> Result<ReviewResult, ServiceError>;
    async fn download(&self, download_url: &str) -> Result<Vec<u8>, ServiceError>;
}

/// Load upload limits once at startup, falling back to the defaults when the
/// service can't be asked
pub async fn load_limits(service: &dyn ReviewService) -> ServiceLimits {
    match service.limits().await {
        Ok(limits) => {
            info!(
                max_zip_size_mb = limits.max_zip_size_mb,
                max_zip_size_bytes = limits.max_zip_size_bytes,
                "loaded service limits"
            );
            limits
        }
        Err(err) => {
            warn!(error = %err, "could not load service limits, using defaults");
            ServiceLimits::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigResponse {
    max_zip_size_mb: Option<u64>,
    max_zip_size_bytes: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SubmitResponse {
    session_id: Option<String>,
    error: Option<String>,
}

/// [`ReviewService`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpReviewService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReviewService {
    /// Every request, including reading the body, is bounded by `request_timeout`
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ServiceError> {
        let parsed = Url::parse(base_url).map_err(|source| ServiceError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ServiceError::InvalidBaseUrl {
                url: base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(request_timeout)
            .build()
            .map_err(|source| ServiceError::Client { source })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{route}/{session}` with the session id percent-encoded as a
    /// single path segment
    fn session_endpoint(&self, route: &str, session: &SessionId) -> String {
        let mut url = match Url::parse(&self.base_url) {
            Ok(url) => url,
            Err(_) => return self.endpoint(&format!("/{}/{}", route, session)),
        };
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(route).push(session.as_str());
        }
        url.to_string()
    }

    /// Resolve a path (or an absolute download URL) against the base URL
    fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn get(&self, endpoint: &str) -> Result<reqwest::Response, ServiceError> {
        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T, ServiceError> {
        let response = self.get(endpoint).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| ServiceError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn build_form(&self, submission: &Submission) -> Result<Form, ServiceError> {
        let form = match submission {
            Submission::Paste { code, filename } => Form::new()
                .text("code", code.clone())
                .text("filename", filename.clone()),
            Submission::Zip { path, .. } => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| ServiceError::Io {
                        path: path.clone(),
                        source,
                    })?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload.zip".to_string());
                Form::new().part("zip", Part::bytes(bytes).file_name(file_name))
            }
            Submission::Github { url } => Form::new().text("github_url", url.to_string()),
        };
        Ok(form)
    }
}

#[async_trait]
impl ReviewService for HttpReviewService {
    async fn limits(&self) -> Result<ServiceLimits, ServiceError> {
        let config: ConfigResponse = self.get_json(&self.endpoint("/config")).await?;
        Ok(ServiceLimits::from_reported(
            config.max_zip_size_mb,
            config.max_zip_size_bytes,
        ))
    }

    async fn submit(&self, submission: &Submission) -> Result<SessionId, ServiceError> {
        let endpoint = self.endpoint("/submit");
        let form = self.build_form(submission).await?;

        info!(kind = submission.kind(), "submitting for review");

        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !status.is_success() {
            let parsed: SubmitResponse = serde_json::from_slice(&body).unwrap_or_default();
            warn!(status = status.as_u16(), error = ?parsed.error, "submission rejected");
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                message: parsed.error,
            });
        }

        let parsed: SubmitResponse =
            serde_json::from_slice(&body).map_err(|source| ServiceError::Decode {
                endpoint: endpoint.clone(),
                source,
            })?;

        let raw = parsed.session_id.ok_or(ServiceError::MissingField {
            endpoint,
            field: "session_id",
        })?;
        let session = SessionId::parse(&raw)
            .ok_or(ServiceError::InvalidSessionId { session_id: raw })?;

        info!(session = %session, "submission accepted");
        Ok(session)
    }

    async fn status(&self, session: &SessionId) -> Result<StatusSnapshot, ServiceError> {
        let snapshot: StatusSnapshot = self
            .get_json(&self.session_endpoint("status", session))
            .await?;
        debug!(session = %session, status = %snapshot.status, "polled status");
        Ok(snapshot)
    }

    async fn review(&self, session: &SessionId) -> Result<ReviewResult, ServiceError> {
        let review: ReviewResult = self
            .get_json(&self.session_endpoint("review", session))
            .await?;
        info!(session = %session, issues = review.ai_log.len(), "fetched review");
        Ok(review)
    }

    async fn download(&self, download_url: &str) -> Result<Vec<u8>, ServiceError> {
        let endpoint = self.endpoint(download_url);
        let response = self.get(&endpoint).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        Ok(bytes.to_vec())
    }
}
