//! Inbound message pipeline.
//!
//! Parsed queries are handed from the transport thread to a single named
//! worker through a crossbeam channel. The worker processes them strictly in
//! arrival order, across all connections.
//!
//! # Thread Protocol
//!
//! ```text
//! Transport thread                    Worker thread
//! ────────────────                    ─────────────
//! Query(q)     ──────────────────▶    handler.handle(q)
//! Sync(ack)    ──────────────────▶    ack
//!              ◀──────────────────    ()
//! Shutdown     ──────────────────▶    stop
//! ```
//!
//! `Shutdown` is queued behind every earlier message, so the worker drains
//! the queue before it exits.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use logging::{PIPELINE_TARGET, trace_pipeline};
use protocol::SecurityQuery;
use thiserror::Error;

use crate::config::DEFAULT_WORKER_NAME;

/// Consumer of queries drained by the pipeline worker.
pub trait QueryHandler: Send + Sync + 'static {
    fn handle(&self, query: SecurityQuery);
}

impl<F> QueryHandler for F
where
    F: Fn(SecurityQuery) + Send + Sync + 'static,
{
    fn handle(&self, query: SecurityQuery) {
        self(query);
    }
}

/// Configuration for the pipeline worker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PipelineConfig {
    /// Name of the worker thread.
    pub worker_name: String,
    /// Bounded channel capacity; `None` means unbounded.
    pub queue_capacity: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_name: DEFAULT_WORKER_NAME.to_owned(),
            queue_capacity: None,
        }
    }
}

/// Why a query could not be queued.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum PostError {
    #[error("pipeline queue is full")]
    Full,
    #[error("pipeline is shut down")]
    Stopped,
}

enum PipelineMessage {
    Query(Box<SecurityQuery>),
    Sync(Sender<()>),
    Shutdown,
}

/// Single-consumer queue feeding a [`QueryHandler`] on a dedicated thread.
pub struct MessagePipeline {
    sender: Mutex<Option<Sender<PipelineMessage>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
}

impl std::fmt::Debug for MessagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePipeline")
            .field("worker_id", &self.worker_id)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MessagePipeline {
    /// Spawns the worker thread.
    ///
    /// # Errors
    ///
    /// Returns the error reported by the OS when the thread cannot be created.
    pub fn spawn<H: QueryHandler>(config: &PipelineConfig, handler: Arc<H>) -> io::Result<Self> {
        let (sender, receiver) = match config.queue_capacity {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };

        let worker = thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || worker_main(&receiver, handler.as_ref()))?;
        let worker_id = worker.thread().id();
        trace_pipeline!(worker = %config.worker_name, capacity = ?config.queue_capacity, "pipeline started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            worker_id,
        })
    }

    /// Queues `query` for the worker without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Full`] when the bounded queue has no room and
    /// [`PostError::Stopped`] once the pipeline has shut down. The query is
    /// dropped in both cases.
    pub fn try_post(&self, query: SecurityQuery) -> Result<(), PostError> {
        let sender = lock(&self.sender);
        let Some(sender) = sender.as_ref() else {
            tracing::warn!(target: PIPELINE_TARGET, "pipeline is shut down, dropping query");
            return Err(PostError::Stopped);
        };

        match sender.try_send(PipelineMessage::Query(Box::new(query))) {
            Ok(()) => {
                trace_pipeline!(queued = sender.len(), "query posted");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    target: PIPELINE_TARGET,
                    capacity = ?sender.capacity(),
                    "pipeline queue is full, dropping query"
                );
                Err(PostError::Full)
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!(target: PIPELINE_TARGET, "pipeline worker is gone, dropping query");
                Err(PostError::Stopped)
            }
        }
    }

    /// Like [`MessagePipeline::try_post`], reporting only whether the query
    /// was queued.
    pub fn post_message(&self, query: SecurityQuery) -> bool {
        self.try_post(query).is_ok()
    }

    /// Blocks until every query posted before this call has been handled.
    ///
    /// Returns `false` if the pipeline is shut down, or when called from the
    /// worker thread itself, where waiting would never finish.
    pub fn sync(&self) -> bool {
        if thread::current().id() == self.worker_id {
            tracing::warn!(target: PIPELINE_TARGET, "sync requested from the pipeline worker");
            return false;
        }

        let Some(sender) = lock(&self.sender).clone() else {
            return false;
        };
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if sender.send(PipelineMessage::Sync(ack_tx)).is_err() {
            return false;
        }
        drop(sender);
        ack_rx.recv().is_ok()
    }

    /// Reports whether the pipeline still accepts queries.
    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.sender).is_some()
    }

    /// Stops accepting queries, drains the queue and joins the worker.
    ///
    /// Calling this more than once is harmless. When invoked from the worker
    /// thread the worker is told to stop but is not joined.
    pub fn shutdown(&self) {
        let Some(sender) = lock(&self.sender).take() else {
            return;
        };
        if sender.send(PipelineMessage::Shutdown).is_err() {
            tracing::debug!(target: PIPELINE_TARGET, "pipeline worker already stopped");
        }
        drop(sender);

        if thread::current().id() == self.worker_id {
            return;
        }
        if let Some(worker) = lock(&self.worker).take()
            && worker.join().is_err()
        {
            tracing::error!(target: PIPELINE_TARGET, "pipeline worker panicked");
        }
        trace_pipeline!("pipeline stopped");
    }
}

impl Drop for MessagePipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_main<H: QueryHandler + ?Sized>(receiver: &Receiver<PipelineMessage>, handler: &H) {
    while let Ok(message) = receiver.recv() {
        match message {
            PipelineMessage::Query(query) => handler.handle(*query),
            PipelineMessage::Sync(ack) => {
                // The waiter may have given up; nothing to do then.
                let _ = ack.send(());
            }
            PipelineMessage::Shutdown => break,
        }
    }
}
