use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;

use crate::foundation::error::{VertikalError, VertikalResult};
use crate::pipeline::batch::{Batch, BatchReport, Progress};
use crate::pipeline::io::MediaIo;

/// A batch running on its own thread.
///
/// Progress arrives over a channel after every job; [`BatchWorker::cancel`] stops the batch
/// before the next job starts. The job in flight always runs to completion.
pub struct BatchWorker {
    handle: JoinHandle<VertikalResult<BatchReport>>,
    progress: mpsc::Receiver<Progress>,
    cancel: Arc<AtomicBool>,
}

impl BatchWorker {
    /// Start `batch` on a background thread.
    pub fn spawn(batch: Batch, io: Arc<dyn MediaIo>) -> VertikalResult<Self> {
        let (tx, progress) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = std::thread::Builder::new()
            .name("vertikal-batch".to_string())
            .spawn(move || {
                batch.run(io.as_ref(), &flag, |p| {
                    // The receiver may be gone; the batch still finishes.
                    let _ = tx.send(p);
                })
            })
            .map_err(|e| VertikalError::media(format!("failed to spawn batch thread: {e}")))?;
        Ok(Self {
            handle,
            progress,
            cancel,
        })
    }

    /// Progress notifications, one per finished job.
    pub fn progress(&self) -> &mpsc::Receiver<Progress> {
        &self.progress
    }

    /// Ask the batch to stop before its next job.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Return `true` once the batch thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the batch and return its report.
    pub fn join(self) -> VertikalResult<BatchReport> {
        self.handle
            .join()
            .map_err(|_| VertikalError::media("batch thread panicked"))?
    }
}
