use tokio::sync::watch;

/// One-shot ready gate.
///
/// Managers open the gate at the end of `initialize`; every other public
/// operation waits on it before touching storage, so callers racing ahead of
/// initialization block instead of observing a half-reconciled table.
pub struct ReadyGate {
    tx: watch::Sender<bool>,
}

impl ReadyGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Opens the gate, releasing all current and future waiters. Idempotent.
    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// Waits until the gate is open. Returns immediately if it already is.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn wait_returns_once_opened() {
        let gate = Arc::new(ReadyGate::new());
        assert!(!gate.is_open());

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.wait().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        gate.open();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter released")
            .unwrap();
        assert!(gate.is_open());
    }

    #[tokio::test]
    async fn wait_on_open_gate_is_immediate() {
        let gate = ReadyGate::new();
        gate.open();
        gate.open();
        gate.wait().await;
    }
}
