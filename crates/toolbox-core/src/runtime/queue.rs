//! The task queue manager.
//!
//! Owns the task list and drives conversion runs. A run:
//!
//! 1. builds a worker pool sized to the configured thread count,
//! 2. snapshots the ids of all `pending` tasks,
//! 3. walks them in consecutive chunks no wider than the pool, sending task
//!    *i* of a chunk to worker *i*,
//! 4. waits for every task of a chunk to resolve before the next chunk,
//! 5. shuts the pool down.
//!
//! A failing task never stops the run. Nothing times out: a worker that
//! never replies holds its chunk open indefinitely.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::runtime::backend::admission::AdmissionControl;
use crate::runtime::backend::pool::{PoolFactory, WebpPoolFactory, WorkerPool};
use crate::runtime::config::{ConversionConfig, Quality};
use crate::runtime::ingest::{IncomingFile, data_uri, webp_file_name};
use crate::runtime::sink::DownloadSink;
use crate::runtime::storage::{TaskStore, Transition};
use crate::runtime::types::{ConversionTask, RuntimeError, SourceFile, TaskId, TaskStatus};

/// Capacity of the event broadcast; slow subscribers past this lag and skip.
const EVENT_CAPACITY: usize = 1024;

/// Notifications about the task list, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Added { task_id: TaskId, name: String },
    Removed { task_id: TaskId },
    StatusChanged { task_id: TaskId, status: TaskStatus },
    RunStarted { pending: usize, thread_count: usize },
    ChunkStarted { index: usize, size: usize },
    ChunkFinished { index: usize },
    RunFinished { report: RunReport },
}

/// Summary of one finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Number of tasks dispatched in each chunk, in order.
    pub chunks: Vec<usize>,
    /// Files delivered, including tasks removed while their save was running.
    pub completed: usize,
    pub failed: usize,
    /// Tasks removed before dispatch, or whose encode result arrived after
    /// removal. None of these produced a download.
    pub skipped: usize,
}

impl RunReport {
    pub fn dispatched(&self) -> usize {
        self.chunks.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Finished(RunReport),
    /// Another run was active; this call did nothing.
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Completed,
    Failed,
    Skipped,
}

/// Clears the run flag on every exit path, including a dropped run future.
struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

struct Inner {
    store: TaskStore,
    config: RwLock<ConversionConfig>,
    factory: Arc<dyn PoolFactory>,
    sink: Arc<dyn DownloadSink>,
    running: AtomicBool,
    events: broadcast::Sender<TaskEvent>,
}

/// Handle to the task list; clones share the same queue.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("running", &self.is_running())
            .finish()
    }
}

impl TaskQueue {
    pub fn new(
        config: ConversionConfig,
        factory: impl PoolFactory + 'static,
        sink: impl DownloadSink + 'static,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                store: TaskStore::new(),
                config: RwLock::new(config),
                factory: Arc::new(factory),
                sink: Arc::new(sink),
                running: AtomicBool::new(false),
                events,
            }),
        }
    }

    /// Queue backed by real WebP workers.
    pub fn with_webp_workers(config: ConversionConfig, sink: impl DownloadSink + 'static) -> Self {
        Self::new(config, WebpPoolFactory, sink)
    }

    /// Subscribe to task events. Only events after this call are delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: TaskEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    pub async fn config(&self) -> ConversionConfig {
        *self.inner.config.read().await
    }

    /// Replace the settings; takes effect at the next run.
    pub async fn set_config(&self, config: ConversionConfig) {
        *self.inner.config.write().await = config;
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    pub async fn tasks(&self) -> Vec<ConversionTask> {
        self.inner.store.snapshot().await
    }

    pub async fn len(&self) -> usize {
        self.inner.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // ── Ingestion ─────────────────────────────────────────────────────────────

    /// Queue every convertible file as a `pending` task.
    ///
    /// Files that are not images, or already WebP, are skipped silently.
    /// Previews are rendered on the blocking pool; tasks are appended in the
    /// order the files were given. Returns the new task ids.
    pub async fn add_files(&self, files: impl IntoIterator<Item = IncomingFile>) -> Vec<TaskId> {
        let accepted: Vec<IncomingFile> = files
            .into_iter()
            .filter(|file| {
                let keep = file.is_convertible();
                if !keep {
                    debug!(name = %file.name, mime = %file.mime, "skipping unsupported file");
                }
                keep
            })
            .collect();

        let rendered = join_all(accepted.into_iter().map(|file| async move {
            let mime = file.mime.clone();
            let bytes = file.bytes.clone();
            let preview = tokio::task::spawn_blocking(move || data_uri(&mime, &bytes)).await;
            (file, preview)
        }))
        .await;

        let mut ids = Vec::with_capacity(rendered.len());
        for (file, preview) in rendered {
            let preview = match preview {
                Ok(p) => p,
                Err(e) => {
                    warn!(name = %file.name, error = %e, "preview rendering failed; file skipped");
                    continue;
                }
            };
            let name = file.name.clone();
            let source = SourceFile {
                name: file.name,
                mime: file.mime,
                bytes: file.bytes,
            };
            let task_id = self.inner.store.push(source, Arc::from(preview)).await;
            debug!(task_id, name = %name, "task added");
            self.emit(TaskEvent::Added { task_id, name });
            ids.push(task_id);
        }
        ids
    }

    /// Remove the task at display position `index`.
    ///
    /// Allowed mid-run: a task removed before dispatch is not converted, and
    /// an encode result arriving for a removed task is discarded without a
    /// download. Removing a task whose file is already being saved does not
    /// cancel the save; the run still counts it as completed.
    pub async fn remove_task(&self, index: usize) -> Option<ConversionTask> {
        let removed = self.inner.store.remove_at(index).await?;
        debug!(task_id = removed.id, "task removed");
        self.emit(TaskEvent::Removed {
            task_id: removed.id,
        });
        Some(removed)
    }

    /// Drop all completed tasks; returns how many were removed.
    pub async fn clear_finished(&self) -> usize {
        self.inner
            .store
            .remove_where(|t| t.status == TaskStatus::Completed)
            .await
    }

    // ── Conversion ────────────────────────────────────────────────────────────

    /// Convert every `pending` task.
    ///
    /// Returns [`RunOutcome::AlreadyRunning`] without side effects when a run
    /// is in progress.
    pub async fn run_conversion(&self) -> RunOutcome {
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("conversion already running; ignoring request");
            return RunOutcome::AlreadyRunning;
        }
        let _guard = RunGuard {
            running: &self.inner.running,
        };

        let config = self.config().await;
        let width = config.thread_count.get();
        let mut pool = self.inner.factory.build(config.thread_count);
        let admission = AdmissionControl::new(pool.size());

        let pending = self.inner.store.pending_ids().await;
        info!(
            pending = pending.len(),
            thread_count = width,
            quality = config.quality.get(),
            "conversion run started"
        );
        self.emit(TaskEvent::RunStarted {
            pending: pending.len(),
            thread_count: width,
        });

        let mut report = RunReport::default();
        for chunk in pending.chunks(width) {
            // Tasks removed since the snapshot are dropped here.
            let mut batch = Vec::with_capacity(chunk.len());
            for &task_id in chunk {
                if self.inner.store.status(task_id).await == Some(TaskStatus::Pending) {
                    batch.push(task_id);
                } else {
                    report.skipped += 1;
                }
            }
            if batch.is_empty() {
                continue;
            }

            let index = report.chunks.len();
            debug!(
                chunk = index,
                size = batch.len(),
                capacity = admission.capacity(),
                "dispatching chunk"
            );
            self.emit(TaskEvent::ChunkStarted {
                index,
                size: batch.len(),
            });

            let outcomes = join_all(batch.iter().enumerate().map(|(worker, &task_id)| {
                self.convert_one(pool.as_ref(), &admission, worker, task_id, config.quality)
            }))
            .await;

            for outcome in outcomes {
                match outcome {
                    TaskOutcome::Completed => report.completed += 1,
                    TaskOutcome::Failed => report.failed += 1,
                    TaskOutcome::Skipped => report.skipped += 1,
                }
            }
            report.chunks.push(batch.len());
            self.emit(TaskEvent::ChunkFinished { index });
        }

        pool.shutdown().await;
        info!(
            chunks = report.chunks.len(),
            completed = report.completed,
            failed = report.failed,
            skipped = report.skipped,
            "conversion run finished"
        );
        self.emit(TaskEvent::RunFinished {
            report: report.clone(),
        });
        RunOutcome::Finished(report)
    }

    /// Drive one task through `processing` to a terminal state.
    async fn convert_one(
        &self,
        pool: &dyn WorkerPool,
        admission: &AdmissionControl,
        worker: usize,
        task_id: TaskId,
        quality: Quality,
    ) -> TaskOutcome {
        let Some(task) = self.inner.store.get(task_id).await else {
            return TaskOutcome::Skipped;
        };

        let _permit = match admission.try_acquire() {
            Ok(p) => p,
            Err(e) => return self.fail(task_id, e.to_string()).await,
        };

        if !self.set_status(task_id, TaskStatus::Processing).await {
            return TaskOutcome::Skipped;
        }
        debug!(
            task_id,
            worker,
            in_flight = admission.in_flight(),
            name = %task.source.name,
            "dispatching to worker"
        );

        let blob = match pool.encode(worker, task.source.bytes.clone(), quality).await {
            Ok(blob) => blob,
            Err(e) => return self.fail(task_id, e.to_string()).await,
        };

        // Delivery is committed once the result is seen for a live task.
        if !self.inner.store.contains(task_id).await {
            debug!(task_id, "result for removed task discarded");
            return TaskOutcome::Skipped;
        }

        let file_name = webp_file_name(&task.source.name);
        match self.inner.sink.save(&file_name, blob).await {
            Ok(location) => {
                if !self.set_status(task_id, TaskStatus::Completed).await {
                    debug!(task_id, "task removed while its file was being saved");
                }
                info!(task_id, file = %location, "converted");
                TaskOutcome::Completed
            }
            Err(e) => {
                let err = RuntimeError::DownloadFailed {
                    file_name,
                    message: e.to_string(),
                };
                self.fail(task_id, err.to_string()).await
            }
        }
    }

    async fn fail(&self, task_id: TaskId, message: String) -> TaskOutcome {
        warn!(task_id, error = %message, "conversion failed");
        if self
            .set_status(task_id, TaskStatus::Error { message })
            .await
        {
            TaskOutcome::Failed
        } else {
            TaskOutcome::Skipped
        }
    }

    /// Apply a status change and announce it; `false` if it was dropped.
    async fn set_status(&self, task_id: TaskId, status: TaskStatus) -> bool {
        match self.inner.store.transition(task_id, status.clone()).await {
            Transition::Applied => {
                self.emit(TaskEvent::StatusChanged { task_id, status });
                true
            }
            Transition::Missing | Transition::Rejected => false,
        }
    }
}
