//! # Cola de Despacho
//! src/jobs/queue.rs
//!
//! Cola FIFO thread-safe y acotada que entrega cada job enviado a
//! exactamente un worker.

use crate::error::JobError;
use crate::jobs::job::JobId;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Trabajo listo para que un worker lo ejecute
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub id: JobId,
    pub digits: i64,
    pub cancel: CancellationToken,
}

struct QueueState {
    items: VecDeque<Dispatch>,
    closed: bool,
}

/// Cola FIFO acotada
#[derive(Clone)]
pub struct JobQueue {
    state: Arc<Mutex<QueueState>>,
    condvar: Arc<Condvar>,
    max_capacity: usize,
}

impl JobQueue {
    /// Crea una nueva cola con capacidad máxima
    pub fn new(max_capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            })),
            condvar: Arc::new(Condvar::new()),
            max_capacity,
        }
    }

    /// Encola un trabajo
    ///
    /// Falla con `QueueFull` si la cola está llena o cerrada
    pub fn enqueue(&self, dispatch: Dispatch) -> Result<(), JobError> {
        let mut state = self.lock();

        if state.closed || state.items.len() >= self.max_capacity {
            return Err(JobError::QueueFull {
                capacity: self.max_capacity,
            });
        }

        state.items.push_back(dispatch);
        self.condvar.notify_one();
        Ok(())
    }

    /// Desencola el siguiente trabajo
    ///
    /// Bloquea hasta que haya uno disponible. Retorna `None` cuando la
    /// cola está cerrada y vacía.
    pub fn dequeue(&self) -> Option<Dispatch> {
        let mut state = self.lock();

        loop {
            if let Some(dispatch) = state.items.pop_front() {
                return Some(dispatch);
            }
            if state.closed {
                return None;
            }
            state = self.condvar.wait(state).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Intenta desencolar sin bloquear
    pub fn try_dequeue(&self) -> Option<Dispatch> {
        self.lock().items.pop_front()
    }

    /// Cierra la cola y despierta a todos los workers
    pub fn close(&self) {
        self.lock().closed = true;
        self.condvar.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
