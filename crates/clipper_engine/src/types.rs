use std::fmt;

use serde::{Deserialize, Serialize};

/// Engine-level failure with the kind the caller can branch on and the
/// underlying message for display and logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClipError {
    pub kind: ClipFailureKind,
    pub message: String,
}

impl ClipError {
    pub(crate) fn new(kind: ClipFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipFailureKind {
    InvalidBaseUrl,
    Timeout,
    Network,
    BackendStatus(u16),
}

impl fmt::Display for ClipFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipFailureKind::InvalidBaseUrl => write!(f, "invalid base url"),
            ClipFailureKind::Timeout => write!(f, "timeout"),
            ClipFailureKind::Network => write!(f, "network error"),
            ClipFailureKind::BackendStatus(code) => write!(f, "backend status {code}"),
        }
    }
}

/// How the backend should treat the captured page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    #[default]
    Raw,
    AiRewrite,
}

/// Capture options forwarded with every submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    pub mode: CaptureMode,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub save_path: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Raw,
            model: "gpt-3.5-turbo".to_string(),
            api_key: String::new(),
            base_url: String::new(),
            save_path: String::new(),
        }
    }
}

/// Wire form of one clip submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipRequest {
    pub url: String,
    pub mode: CaptureMode,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub save_path: String,
}

impl ClipRequest {
    pub fn new(url: impl Into<String>, settings: &CaptureSettings) -> Self {
        Self {
            url: url.into(),
            mode: settings.mode,
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            save_path: settings.save_path.clone(),
        }
    }
}

/// What the submit endpoint said about the new clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend finished synchronously; nothing to poll.
    Completed,
    /// The backend queued the work under this task id.
    Queued { task_id: String },
}

/// Task status as reported by the backend. Statuses this build does not
/// know about deserialize as `Unknown` instead of failing the poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Queued,
    Processing,
    Saved,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskSnapshot {
    pub status: TaskState,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Where a polled task finally landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalStatus {
    Saved { warning: Option<String> },
    Error { message: String },
    TimedOut,
}

/// The answer a whole dispatch run resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Saved { warning: Option<String> },
    Failed { reason: String },
}
