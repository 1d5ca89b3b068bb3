//! Write-once result slot for a pending request

use tokio::sync::oneshot;

/// Producer half of a one-shot outcome. The first `resolve` wins; later
/// calls are ignored and return `false`.
#[derive(Debug)]
pub struct Completion<T> {
    tx: Option<oneshot::Sender<T>>,
}

/// Create a completion slot and the receiver that observes its outcome.
pub fn completion<T>() -> (Completion<T>, oneshot::Receiver<T>) {
    let (tx, rx) = oneshot::channel();
    (Completion { tx: Some(tx) }, rx)
}

impl<T> Completion<T> {
    pub fn resolve(&mut self, value: T) -> bool {
        match self.tx.take() {
            Some(tx) => {
                // The receiver may already be gone; the slot is still spent
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.tx.is_none()
    }
}
