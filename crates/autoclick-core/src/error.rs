//! Structured errors surfaced to the shell

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Configuration directory missing and could not be created
    DirectoryError,
    /// Open/read/write/delete failure on a config file
    IoError,
    /// A recorded sequence could not be parsed
    FormatError,
    InvalidMode,
    HookFailed,
    InjectionFailed,
    /// The shell could not show a dialog
    HostFailed,
    NotImplemented,
    Unknown,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            context: None,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn directory(dir: &Path, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::DirectoryError,
            format!("Cannot create config directory {}: {}", dir.display(), reason),
        )
        .with_context(serde_json::json!({ "dir": dir.display().to_string() }))
    }

    pub fn io(action: &str, path: &Path, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::IoError,
            format!("{} {} failed: {}", action, path.display(), reason),
        )
        .with_context(serde_json::json!({ "path": path.display().to_string() }))
    }

    pub fn format(line_no: usize, line: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::FormatError,
            format!("Malformed config at line {}: {} ({})", line_no, line, reason),
        )
        .with_suggestions(vec!["Re-record the configuration in gather mode".to_string()])
        .with_context(serde_json::json!({ "line": line_no, "text": line }))
    }

    pub fn empty_config() -> Self {
        Self::new(ErrorCode::FormatError, "Config has no recorded positions")
            .with_suggestions(vec!["Record clicks in gather mode first".to_string()])
    }

    pub fn invalid_mode(mode: &str) -> Self {
        Self::new(ErrorCode::InvalidMode, format!("Unknown mode: {}", mode))
            .with_suggestions(vec!["Use \"gather\" or \"exec\"".to_string()])
    }

    pub fn hook_failed(reason: impl fmt::Display) -> Self {
        Self::new(ErrorCode::HookFailed, format!("Input hook failed: {}", reason))
    }

    pub fn injection_failed(action: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InjectionFailed,
            format!("{} failed: {}", action, reason),
        )
    }

    pub fn host_failed(reason: impl fmt::Display) -> Self {
        Self::new(ErrorCode::HostFailed, format!("Host dialog failed: {}", reason))
    }

    pub fn not_implemented(what: &str) -> Self {
        Self::new(ErrorCode::NotImplemented, format!("{} is not available in this build", what))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Self::new(ErrorCode::Unknown, e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorCode::IoError, e.to_string())
    }
}
