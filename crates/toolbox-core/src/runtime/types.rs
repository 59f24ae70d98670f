use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// Unique identifier for a conversion task.
///
/// Ids are allocated monotonically by the task store and never reused, so a
/// result that arrives after its task was removed cannot be applied to a
/// different task that shifted into the same list position.
pub type TaskId = u64;

/// Lifecycle state of a single [`ConversionTask`].
///
/// Within one run a task only moves forward:
/// `Pending → Processing → {Completed | Error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted and waiting for the next run.
    Pending,
    /// Dispatched to a worker; a reply has not been applied yet.
    Processing,
    /// Encoded and handed to the download sink.
    Completed,
    /// Decoding, encoding, transport or delivery failed.
    Error { message: String },
}

impl TaskStatus {
    /// Returns `true` for `Completed` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error { .. })
    }

    /// Short lowercase label, e.g. for status badges.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Error { .. } => "error",
        }
    }

    /// The failure message; present only for `Error`.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            TaskStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` respects the forward-only order.
    pub fn can_transition_to(&self, next: &TaskStatus) -> bool {
        match (self, next) {
            (TaskStatus::Pending, TaskStatus::Processing) => true,
            (TaskStatus::Processing, TaskStatus::Completed) => true,
            (TaskStatus::Processing, TaskStatus::Error { .. }) => true,
            // Tasks that never reached a worker (e.g. admission denied) may
            // fail straight from pending.
            (TaskStatus::Pending, TaskStatus::Error { .. }) => true,
            _ => false,
        }
    }
}

/// The user-supplied image a task was created from.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub mime: String,
    /// Raw file contents. `Bytes` so handing them to a worker never copies.
    pub bytes: Bytes,
}

/// One image slated for WebP re-encoding.
#[derive(Debug, Clone)]
pub struct ConversionTask {
    pub id: TaskId,
    pub source: SourceFile,
    /// `data:<mime>;base64,<payload>` rendering of the source, derived once.
    pub preview: Arc<str>,
    pub status: TaskStatus,
}

/// Errors produced by the conversion runtime.
///
/// None of these abort a run; the queue manager turns each into the failing
/// task's error message.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// The worker replied with a decode or encode failure.
    #[error("{message}")]
    EncodeFailed { message: String },

    /// The worker's ingress queue already holds a request.
    #[error("worker {worker} is busy")]
    WorkerBusy { worker: usize },

    /// The worker stopped before replying (channel closed or reply dropped).
    #[error("worker {worker} shut down before replying")]
    WorkerShutdown { worker: usize },

    /// The worker panicked while handling the request.
    #[error("worker {worker} crashed: {message}")]
    WorkerPanicked { worker: usize, message: String },

    /// The requested worker index is outside the pool.
    #[error("no worker {worker} in a pool of {size}")]
    NoSuchWorker { worker: usize, size: usize },

    /// All dispatch permits for the current run are held.
    #[error("worker pool busy (capacity {capacity})")]
    PoolBusy { capacity: usize },

    /// The encoded file could not be delivered.
    #[error("failed to save {file_name}: {message}")]
    DownloadFailed { file_name: String, message: String },
}
