use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

/// A one-shot outcome that the first of several racing producers decides.
///
/// Every later attempt is a no-op.
#[derive(Debug)]
pub struct SettleOnce<T> {
    settled: AtomicBool,
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> SettleOnce<T> {
    pub fn new() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        let settle = Self {
            settled: AtomicBool::new(false),
            sender: Mutex::new(Some(tx)),
        };
        (settle, rx)
    }

    /// Deliver `value` if nothing settled yet. Returns whether this call won.
    pub fn settle(&self, value: T) -> bool {
        if self.settled.swap(true, Ordering::AcqRel) {
            return false;
        }

        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(tx) = sender {
            // Receiver may have given up; the outcome is still decided.
            let _ = tx.send(value);
        }
        true
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }
}
