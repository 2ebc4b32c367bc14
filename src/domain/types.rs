use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_MAX_ZIP_SIZE_MB: u64 = 5;

/// The three ways code can be handed to the review service, one per tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    PasteCode,
    UploadZip,
    GithubRepo,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::PasteCode, Tab::UploadZip, Tab::GithubRepo];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::PasteCode => "Paste Code",
            Tab::UploadZip => "Upload ZIP",
            Tab::GithubRepo => "GitHub Repo",
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::PasteCode => Tab::UploadZip,
            Tab::UploadZip => Tab::GithubRepo,
            Tab::GithubRepo => Tab::PasteCode,
        }
    }
}

/// What the user chose in the ZIP tab, after looking at the path on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZipSelection {
    None,
    NotAFile(PathBuf),
    File { path: PathBuf, size_bytes: u64 },
}

impl ZipSelection {
    /// Inspect a user-typed path. An empty path means nothing was chosen.
    pub fn inspect(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return ZipSelection::None;
        }

        let path = PathBuf::from(raw);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => ZipSelection::File {
                path,
                size_bytes: meta.len(),
            },
            _ => ZipSelection::NotAFile(path),
        }
    }
}

/// Raw form input for the active tab, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionInput {
    Paste { code: String, filename: String },
    ZipUpload(ZipSelection),
    GithubRepo { url: String },
}

/// A validated submission, ready to be serialized into the multipart payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Paste { code: String, filename: String },
    Zip { path: PathBuf, size_bytes: u64 },
    Github { url: Url },
}

impl Submission {
    pub fn kind(&self) -> &'static str {
        match self {
            Submission::Paste { .. } => "paste",
            Submission::Zip { .. } => "zip",
            Submission::Github { .. } => "github",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Accept a server-issued id only if it is a plain token
    /// (ASCII letters, digits, `-` and `_`)
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= 128
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(raw.to_string()))
    }

    /// File name for this session's downloaded archive. Anything outside the
    /// token alphabet becomes `_`, so the name never leaves its directory.
    pub fn archive_file_name(&self) -> String {
        let stem: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("review-{}.zip", stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upload limits advertised by the service's `/config` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    pub max_zip_size_mb: u64,
    pub max_zip_size_bytes: u64,
}

impl ServiceLimits {
    /// Build limits from a possibly partial response. Zero or missing values
    /// fall back to the defaults field by field.
    pub fn from_reported(mb: Option<u64>, bytes: Option<u64>) -> Self {
        let defaults = Self::default();
        Self {
            max_zip_size_mb: mb.filter(|v| *v > 0).unwrap_or(defaults.max_zip_size_mb),
            max_zip_size_bytes: bytes
                .filter(|v| *v > 0)
                .unwrap_or(defaults.max_zip_size_bytes),
        }
    }
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            max_zip_size_mb: DEFAULT_MAX_ZIP_SIZE_MB,
            max_zip_size_bytes: DEFAULT_MAX_ZIP_SIZE_MB * 1024 * 1024,
        }
    }
}

/// Status of a review job as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReviewStatus {
    Pending,
    Running,
    Processing,
    Complete,
    NotFound,
    Error,
    Other(String),
}

impl ReviewStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Running => "running",
            ReviewStatus::Processing => "processing",
            ReviewStatus::Complete => "complete",
            ReviewStatus::NotFound => "not found",
            ReviewStatus::Error => "error",
            ReviewStatus::Other(s) => s,
        }
    }

    /// No further polling happens once a terminal status is seen
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReviewStatus::Complete | ReviewStatus::NotFound | ReviewStatus::Error
        )
    }
}

impl From<String> for ReviewStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => ReviewStatus::Pending,
            "running" => ReviewStatus::Running,
            "processing" => ReviewStatus::Processing,
            "complete" => ReviewStatus::Complete,
            "not found" => ReviewStatus::NotFound,
            "error" => ReviewStatus::Error,
            _ => ReviewStatus::Other(value),
        }
    }
}

impl From<ReviewStatus> for String {
    fn from(value: ReviewStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: ReviewStatus,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusSnapshot {
    pub fn new(status: ReviewStatus) -> Self {
        Self {
            status,
            download_url: None,
            error: None,
        }
    }
}

/// The issue text of an AI log entry: either plain text or the linter
/// finding object it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueText {
    Text(String),
    Structured(serde_json::Value),
}

impl IssueText {
    pub fn message(&self) -> String {
        match self {
            IssueText::Text(text) => text.clone(),
            IssueText::Structured(value) => ["message", "error", "info"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()))
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
        }
    }
}

impl Default for IssueText {
    fn default() -> Self {
        IssueText::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub file: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub issue: IssueText,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub current_code: String,
    #[serde(default)]
    pub recommended_code: String,
    #[serde(default)]
    pub patch: Option<String>,
}

/// One entry of a file's linter output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinterIssue {
    Error {
        error: String,
    },
    Info {
        info: String,
    },
    Finding {
        #[serde(default)]
        line: Option<u32>,
        #[serde(default)]
        col: Option<u32>,
        message: String,
    },
    Other(serde_json::Value),
}

impl LinterIssue {
    pub fn is_finding(&self) -> bool {
        matches!(self, LinterIssue::Finding { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReviewResult {
    #[serde(default)]
    pub ai_log: Vec<Issue>,
    #[serde(default)]
    pub linter_results: BTreeMap<String, Vec<LinterIssue>>,
    #[serde(default)]
    pub pr_comments: Option<String>,
    #[serde(default)]
    pub patch: Option<String>,
    #[serde(default)]
    pub code_quality_score: Option<f64>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ReviewResult {
    /// The unified patch, if the service produced a non-empty one
    pub fn unified_patch(&self) -> Option<&str> {
        non_empty(self.patch.as_deref())
    }

    pub fn pr_comments(&self) -> Option<&str> {
        non_empty(self.pr_comments.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
