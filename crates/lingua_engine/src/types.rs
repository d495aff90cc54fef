use std::fmt;

use lingua_core::{GenerateParams, Job, ProgressView};
use serde::{Deserialize, Serialize};

/// Opaque server-assigned task identifier.
pub type TaskId = String;

/// Transport-level failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection or protocol-level transport error.
    Network,
    /// Non-2xx response where a success body was required.
    HttpStatus(u16),
    /// Response body did not match the expected shape.
    Protocol,
    /// The service answered with an error payload (file uploads).
    Rejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Protocol => write!(f, "malformed response"),
            FailureKind::Rejected => write!(f, "rejected by service"),
        }
    }
}

/// Error returned by [`crate::TranslationService`] calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Body for `POST /translate_async`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartRequest {
    pub text: String,
    /// `None` requests server-side language detection.
    pub source: Option<String>,
    pub target: String,
    pub generate: GenerateParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    pub task_id: TaskId,
}

/// Body of `GET /progress/{task_id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressReport {
    pub progress: f64,
    /// Absent until the server has split the input; tolerated forever.
    #[serde(default)]
    pub total_sentences: Option<u32>,
}

/// Body of `GET /result/{task_id}`. The status is kept as a raw string so
/// unknown values degrade to "still pending" rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultReport {
    pub status: String,
    #[serde(default)]
    pub result: Option<String>,
}

impl ResultReport {
    pub fn is_done(&self) -> bool {
        self.status == "done"
    }
}

/// Body of `POST /translate_file_async`: either a task id or an error.
#[derive(Debug, Clone, Deserialize)]
pub struct FileStartResponse {
    #[serde(default)]
    pub task_id: Option<TaskId>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Server-rendered export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Word,
    Pdf,
}

impl ExportFormat {
    pub(crate) fn endpoint(self) -> &'static str {
        match self {
            ExportFormat::Word => "/export/word",
            ExportFormat::Pdf => "/export/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Word => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Events emitted by the lifecycle driver, drained by the embedding
/// surface via `try_recv`.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// A task id was obtained and polling began.
    Started { task_id: TaskId },
    /// Periodic progress while running.
    Progress { percent: f64, view: ProgressView },
    /// The task finished; the job is echoed back for history recording.
    Completed {
        job: Job,
        result: String,
        cost_secs: f64,
    },
    /// The current task was cancelled (superseded, explicit cancel, or
    /// input cleared while running). Progress display should reset.
    Cancelled,
    /// Empty input: any current task was cancelled and the displayed
    /// result should clear. Not an error.
    Cleared,
    /// Transport or protocol failure; the lifecycle returned to idle and
    /// will not retry on its own.
    Failed { error: ServiceError },
    /// A document export finished; bytes are ready to be written.
    Exported { file_name: String, bytes: Vec<u8> },
    /// A document export failed.
    ExportFailed { error: ServiceError },
}
