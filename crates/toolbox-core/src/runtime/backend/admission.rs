use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::runtime::types::RuntimeError;

/// RAII guard that releases a dispatch slot when dropped.
///
/// Held from the moment a task is marked `processing` until its reply has
/// been applied.
pub struct Permit {
    #[allow(dead_code)]
    permit: OwnedSemaphorePermit,
}

impl std::fmt::Debug for Permit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Permit").finish()
    }
}

/// Bounds the number of in-flight encode requests of one run.
///
/// Created with the pool size at the start of a run. Chunking already keeps
/// dispatches within that bound; acquiring a permit makes a violation fail
/// the task with [`RuntimeError::PoolBusy`] instead of queueing a second
/// request behind a busy worker.
#[derive(Debug, Clone)]
pub struct AdmissionControl {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionControl {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Try to take a slot without waiting.
    pub fn try_acquire(&self) -> Result<Permit, RuntimeError> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .map(|permit| Permit { permit })
            .map_err(|_| RuntimeError::PoolBusy {
                capacity: self.capacity,
            })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently held.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}
