use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::warn;

use crate::runtime::types::{ConversionTask, SourceFile, TaskId, TaskStatus};

/// Result of a status update attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The task was removed; the update was dropped.
    Missing,
    /// The update would move the task backwards; it was dropped.
    Rejected,
}

/// Ordered, thread-safe list of conversion tasks.
///
/// Insertion order is display order. Status changes go through
/// [`TaskStore::transition`], which enforces the forward-only lifecycle.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    inner: Arc<RwLock<Vec<ConversionTask>>>,
    next_id: Arc<AtomicU64>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `Pending` task and return its id.
    pub async fn push(&self, source: SourceFile, preview: Arc<str>) -> TaskId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.write().await.push(ConversionTask {
            id,
            source,
            preview,
            status: TaskStatus::Pending,
        });
        id
    }

    /// Remove the task at display position `index`.
    pub async fn remove_at(&self, index: usize) -> Option<ConversionTask> {
        let mut guard = self.inner.write().await;
        (index < guard.len()).then(|| guard.remove(index))
    }

    /// Drop every task matching `pred`; returns how many were removed.
    pub async fn remove_where(&self, pred: impl Fn(&ConversionTask) -> bool) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|t| !pred(t));
        before - guard.len()
    }

    pub async fn snapshot(&self) -> Vec<ConversionTask> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn get(&self, id: TaskId) -> Option<ConversionTask> {
        self.inner.read().await.iter().find(|t| t.id == id).cloned()
    }

    pub async fn status(&self, id: TaskId) -> Option<TaskStatus> {
        self.inner
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.status.clone())
    }

    pub async fn contains(&self, id: TaskId) -> bool {
        self.inner.read().await.iter().any(|t| t.id == id)
    }

    /// Ids of all `Pending` tasks, in display order.
    pub async fn pending_ids(&self) -> Vec<TaskId> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .map(|t| t.id)
            .collect()
    }

    /// Move task `id` to `next` if the lifecycle allows it.
    pub async fn transition(&self, id: TaskId, next: TaskStatus) -> Transition {
        let mut guard = self.inner.write().await;
        let Some(task) = guard.iter_mut().find(|t| t.id == id) else {
            return Transition::Missing;
        };
        if !task.status.can_transition_to(&next) {
            warn!(
                task_id = id,
                from = task.status.label(),
                to = next.label(),
                "rejected backwards status change"
            );
            return Transition::Rejected;
        }
        task.status = next;
        Transition::Applied
    }
}
