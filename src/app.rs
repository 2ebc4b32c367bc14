use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use crate::action::CopyTarget;
use crate::domain::language;
use crate::domain::summary::ReviewSummary;
use crate::domain::types::{
    Issue, ReviewResult, ServiceLimits, SessionId, StatusSnapshot, SubmissionInput, Tab,
    ZipSelection,
};

pub const DEFAULT_FILENAME: &str = "main.py";

/// How long the "Copied!" confirmation stays visible
pub const COPY_CONFIRMATION: Duration = Duration::from_millis(1200);

/// Submission workflow state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Editing the form
    Idle,
    /// Waiting for the service to accept the submission
    Submitting,
    /// Waiting for the review to finish
    Polling,
    /// Review finished; results are loading or loaded
    Complete,
    /// The service no longer knows the session
    NotFound,
    /// Validation, submission or review failure; the form stays editable
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Filename,
    Code,
    ZipPath,
    GithubUrl,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Filename => "Filename",
            FormField::Code => "Code",
            FormField::ZipPath => "ZIP File",
            FormField::GithubUrl => "GitHub Repository URL",
        }
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, FormField::Code)
    }
}

fn fields_for(tab: Tab) -> &'static [FormField] {
    match tab {
        Tab::PasteCode => &[FormField::Filename, FormField::Code],
        Tab::UploadZip => &[FormField::ZipPath],
        Tab::GithubRepo => &[FormField::GithubUrl],
    }
}

/// A single editable text value with a cursor (byte offset, always on a char boundary)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.value.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.value.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Start of the current line
    pub fn home(&mut self) {
        self.cursor = self.value[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
    }

    /// End of the current line
    pub fn end(&mut self) {
        self.cursor = self.value[self.cursor..]
            .find('\n')
            .map_or(self.value.len(), |i| self.cursor + i);
    }
}

/// Progress of the one-time `/review` fetch
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewLoad {
    Loading,
    Loaded(ReviewResult),
    Failed(String),
}

/// Transient confirmation after a successful copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flash {
    pub target: CopyTarget,
    pub expires_at: Instant,
}

/// The main application
pub struct App {
    pub state: AppState,
    pub tab: Tab,
    /// Focused form field
    pub focus: FormField,
    pub filename: TextInput,
    pub code: TextInput,
    pub zip_path: TextInput,
    /// What `zip_path` pointed at when it was last edited
    pub zip_selection: ZipSelection,
    pub github_url: TextInput,
    /// Messages shown above the submit hint
    pub errors: Vec<String>,
    pub limits: ServiceLimits,
    /// Bumped on every reset so in-flight submissions can be recognised as stale
    pub epoch: u64,
    pub session: Option<SessionId>,
    pub status: Option<StatusSnapshot>,
    pub review: Option<ReviewLoad>,
    /// Issue rows currently expanded
    pub expanded: HashSet<usize>,
    pub selected_issue: usize,
    pub scroll_offset: u16,
    /// Rows available to the main content, set by the event loop before each draw
    pub viewport_height: u16,
    pub flash: Option<Flash>,
    /// One-line feedback for downloads and failed copies
    pub notice: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            state: AppState::Idle,
            tab: Tab::PasteCode,
            focus: FormField::Code,
            filename: TextInput::new(DEFAULT_FILENAME),
            code: TextInput::default(),
            zip_path: TextInput::default(),
            zip_selection: ZipSelection::None,
            github_url: TextInput::default(),
            errors: Vec::new(),
            limits: ServiceLimits::default(),
            epoch: 0,
            session: None,
            status: None,
            review: None,
            expanded: HashSet::new(),
            selected_issue: 0,
            scroll_offset: 0,
            viewport_height: 0,
            flash: None,
            notice: None,
            should_quit: false,
        }
    }

    /// Whether the form accepts edits and submissions
    pub fn is_form_active(&self) -> bool {
        matches!(self.state, AppState::Idle | AppState::Error(_))
    }

    /// Switch tabs. Always abandons the current session.
    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.focus = *fields_for(tab).last().unwrap_or(&FormField::Code);
        self.reset_session();
    }

    /// Forget the active session and everything derived from it
    pub fn reset_session(&mut self) {
        self.epoch += 1;
        self.state = AppState::Idle;
        self.errors.clear();
        self.session = None;
        self.status = None;
        self.review = None;
        self.expanded.clear();
        self.selected_issue = 0;
        self.scroll_offset = 0;
        self.flash = None;
        self.notice = None;
    }

    /// Record a failure in the error list and enter the error state
    pub fn fail(&mut self, message: String) {
        self.errors = vec![message.clone()];
        self.state = AppState::Error(message);
    }

    pub fn fields(&self) -> &'static [FormField] {
        fields_for(self.tab)
    }

    pub fn next_field(&mut self) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(pos + 1) % fields.len()];
    }

    pub fn input(&self, field: FormField) -> &TextInput {
        match field {
            FormField::Filename => &self.filename,
            FormField::Code => &self.code,
            FormField::ZipPath => &self.zip_path,
            FormField::GithubUrl => &self.github_url,
        }
    }

    pub fn focused_input_mut(&mut self) -> &mut TextInput {
        match self.focus {
            FormField::Filename => &mut self.filename,
            FormField::Code => &mut self.code,
            FormField::ZipPath => &mut self.zip_path,
            FormField::GithubUrl => &mut self.github_url,
        }
    }

    /// Look at the ZIP path on disk again. Called after edits so rendering
    /// never touches the filesystem.
    pub fn refresh_zip_selection(&mut self) {
        self.zip_selection = ZipSelection::inspect(self.zip_path.value());
    }

    /// Snapshot the active tab's form as a submission input.
    /// The ZIP path is inspected fresh, since the file may have changed.
    pub fn current_input(&self) -> SubmissionInput {
        match self.tab {
            Tab::PasteCode => SubmissionInput::Paste {
                code: self.code.value().to_string(),
                filename: self.filename.value().to_string(),
            },
            Tab::UploadZip => SubmissionInput::ZipUpload(ZipSelection::inspect(self.zip_path.value())),
            Tab::GithubRepo => SubmissionInput::GithubRepo {
                url: self.github_url.value().to_string(),
            },
        }
    }

    /// Editor language hint for the pasted code
    pub fn language_hint(&self) -> Option<&'static str> {
        language::detect(self.filename.value())
    }

    pub fn loaded_review(&self) -> Option<&ReviewResult> {
        match &self.review {
            Some(ReviewLoad::Loaded(review)) => Some(review),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<ReviewSummary> {
        self.loaded_review().map(ReviewSummary::from_review)
    }

    pub fn issue(&self, idx: usize) -> Option<&Issue> {
        self.loaded_review().and_then(|r| r.ai_log.get(idx))
    }

    pub fn select_next_issue(&mut self) {
        let count = self.loaded_review().map_or(0, |r| r.ai_log.len());
        if self.selected_issue < count.saturating_sub(1) {
            self.selected_issue += 1;
        }
    }

    pub fn select_prev_issue(&mut self) {
        self.selected_issue = self.selected_issue.saturating_sub(1);
    }

    /// Toggle collapsed/expanded for the selected issue
    pub fn toggle_expanded(&mut self) {
        if self.issue(self.selected_issue).is_none() {
            return;
        }
        let idx = self.selected_issue;
        if !self.expanded.remove(&idx) {
            self.expanded.insert(idx);
        }
    }

    pub fn is_expanded(&self, idx: usize) -> bool {
        self.expanded.contains(&idx)
    }

    pub fn show_copied(&mut self, target: CopyTarget, now: Instant) {
        self.flash = Some(Flash {
            target,
            expires_at: now + COPY_CONFIRMATION,
        });
    }

    pub fn is_copied(&self, target: CopyTarget) -> bool {
        self.flash.is_some_and(|f| f.target == target)
    }

    pub fn expire_flash(&mut self, now: Instant) {
        if self.flash.is_some_and(|f| now >= f.expires_at) {
            self.flash = None;
        }
    }

    /// Status text for the status panel
    pub fn status_label(&self) -> &str {
        self.status
            .as_ref()
            .map_or("Checking...", |s| s.status.as_str())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
