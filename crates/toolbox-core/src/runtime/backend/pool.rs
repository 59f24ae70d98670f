//! Worker pool abstraction and the WebP-backed implementation.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::runtime::backend::protocol::{EncodeReply, EncodeRequest};
use crate::runtime::backend::worker::spawn_worker;
use crate::runtime::config::{Quality, ThreadCount};
use crate::runtime::types::RuntimeError;

/// A fixed-size set of isolated encode workers.
///
/// Callers address workers by index and must keep at most one request
/// outstanding per worker. Implementations turn every transport problem
/// (closed queue, dropped reply, crash) into a [`RuntimeError`] so nothing
/// escapes the call site.
#[async_trait]
pub trait WorkerPool: Send + Sync {
    fn size(&self) -> usize;

    /// Send one encode request to `worker` and wait for its reply.
    async fn encode(
        &self,
        worker: usize,
        image_data: Bytes,
        quality: Quality,
    ) -> Result<Bytes, RuntimeError>;

    /// Stop every worker and wait for them to exit.
    async fn shutdown(&mut self);
}

/// Builds a fresh [`WorkerPool`] for each run.
pub trait PoolFactory: Send + Sync {
    fn build(&self, size: ThreadCount) -> Box<dyn WorkerPool>;
}

// ── WebP pool ─────────────────────────────────────────────────────────────────

struct WorkerHandle {
    ingress_tx: mpsc::Sender<EncodeRequest>,
    join: JoinHandle<()>,
}

/// Pool of [`spawn_worker`] tasks.
///
/// Dropping the pool without calling [`WorkerPool::shutdown`] aborts the
/// workers, so an abandoned run never leaks them.
pub struct WebpWorkerPool {
    workers: Vec<WorkerHandle>,
}

impl WebpWorkerPool {
    /// Spawn `size` workers. Must be called inside a Tokio runtime.
    pub fn spawn(size: ThreadCount) -> Self {
        let workers = (0..size.get())
            .map(|index| {
                let (ingress_tx, join) = spawn_worker(index);
                WorkerHandle { ingress_tx, join }
            })
            .collect();
        debug!(size = size.get(), "worker pool started");
        Self { workers }
    }
}

#[async_trait]
impl WorkerPool for WebpWorkerPool {
    fn size(&self) -> usize {
        self.workers.len()
    }

    async fn encode(
        &self,
        worker: usize,
        image_data: Bytes,
        quality: Quality,
    ) -> Result<Bytes, RuntimeError> {
        let handle = self.workers.get(worker).ok_or(RuntimeError::NoSuchWorker {
            worker,
            size: self.workers.len(),
        })?;

        let (reply_tx, reply_rx) = oneshot::channel();
        let req = EncodeRequest {
            image_data,
            quality,
            reply_tx,
        };

        handle.ingress_tx.try_send(req).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => RuntimeError::WorkerBusy { worker },
            mpsc::error::TrySendError::Closed(_) => RuntimeError::WorkerShutdown { worker },
        })?;

        match reply_rx
            .await
            .map_err(|_| RuntimeError::WorkerShutdown { worker })?
        {
            EncodeReply::Success { blob } => Ok(blob),
            EncodeReply::Failure { error } => Err(RuntimeError::EncodeFailed { message: error }),
            EncodeReply::Crashed { message } => {
                Err(RuntimeError::WorkerPanicked { worker, message })
            }
        }
    }

    async fn shutdown(&mut self) {
        let workers = std::mem::take(&mut self.workers);
        let size = workers.len();
        for (index, WorkerHandle { ingress_tx, join }) in workers.into_iter().enumerate() {
            // Closing the queue ends the worker loop.
            drop(ingress_tx);
            if let Err(e) = join.await {
                debug!(worker = index, error = %e, "worker exited abnormally");
            }
        }
        debug!(size, "worker pool stopped");
    }
}

impl Drop for WebpWorkerPool {
    fn drop(&mut self) {
        for handle in &self.workers {
            handle.join.abort();
        }
    }
}

/// Factory producing [`WebpWorkerPool`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebpPoolFactory;

impl PoolFactory for WebpPoolFactory {
    fn build(&self, size: ThreadCount) -> Box<dyn WorkerPool> {
        Box::new(WebpWorkerPool::spawn(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_worker_index_is_rejected() {
        let pool = WebpWorkerPool::spawn(ThreadCount::new(2).unwrap());
        let err = pool
            .encode(5, Bytes::from_static(b"x"), Quality::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::NoSuchWorker { worker: 5, size: 2 }));
    }

    #[tokio::test]
    async fn decode_failure_comes_back_as_encode_failed() {
        let pool = WebpWorkerPool::spawn(ThreadCount::new(1).unwrap());
        let err = pool
            .encode(0, Bytes::from_static(b"garbage"), Quality::default())
            .await
            .unwrap_err();
        match err {
            RuntimeError::EncodeFailed { message } => assert!(message.contains("decode")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn shutdown_empties_the_pool() {
        let mut pool = WebpWorkerPool::spawn(ThreadCount::new(3).unwrap());
        assert_eq!(pool.size(), 3);
        pool.shutdown().await;
        assert_eq!(pool.size(), 0);
        let err = pool
            .encode(0, Bytes::from_static(b"x"), Quality::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::NoSuchWorker { .. }));
    }
}
