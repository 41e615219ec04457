use std::sync::mpsc;
use std::time::{Duration, Instant};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Serialized completion context.
///
/// Background workers post closures through a [`CallbackSender`]; whichever thread owns the
/// queue runs them, one at a time and in arrival order, when it calls [`run_pending`] or
/// [`run_until`].
///
/// [`run_pending`]: CallbackQueue::run_pending
/// [`run_until`]: CallbackQueue::run_until
pub struct CallbackQueue {
    tx: mpsc::Sender<Job>,
    rx: mpsc::Receiver<Job>,
}

/// Cloneable handle used to post work onto a [`CallbackQueue`].
#[derive(Clone)]
pub struct CallbackSender {
    tx: mpsc::Sender<Job>,
}

impl std::fmt::Debug for CallbackQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackQueue").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for CallbackSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSender").finish_non_exhaustive()
    }
}

impl Default for CallbackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> CallbackSender {
        CallbackSender {
            tx: self.tx.clone(),
        }
    }

    /// Run everything already queued without blocking. Returns how many callbacks ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Block until `count` callbacks have run or `timeout` elapses. Returns how many ran.
    pub fn run_until(&self, count: usize, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut ran = 0;
        while ran < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(job) => {
                    job();
                    ran += 1;
                }
                Err(_) => break,
            }
        }
        ran
    }
}

impl CallbackSender {
    /// Queue `job`. Dropped silently if the queue itself has been dropped.
    pub fn dispatch(&self, job: impl FnOnce() + Send + 'static) {
        if self.tx.send(Box::new(job)).is_err() {
            tracing::debug!("callback queue closed; completion dropped");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/remote/queue.rs"]
mod tests;
