use std::time::Duration;

use rama::telemetry::tracing;
use tokio::{sync::watch, task::JoinHandle};

/// One-shot broadcast stop signal, observed cooperatively by workers.
///
/// Once fired it stays fired. Firing never interrupts in-flight work,
/// it is up to the observer to check it in between units of work.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

/// Fires the linked [`CancelSignal`]s, at the latest when dropped.
#[derive(Debug)]
pub struct CancelTrigger {
    tx: watch::Sender<bool>,
}

/// Create a new linked [`CancelTrigger`] and [`CancelSignal`] pair.
pub fn cancel_signal() -> (CancelTrigger, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelTrigger { tx }, CancelSignal { rx })
}

impl CancelTrigger {
    pub fn fire(self) {
        drop(self)
    }
}

impl Drop for CancelTrigger {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

impl CancelSignal {
    /// Returns `true` once the signal has fired.
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal has fired.
    pub async fn fired(&mut self) {
        // an error means the trigger is gone, which implies it fired
        let _ = self.rx.wait_for(|fired| *fired).await;
    }
}

/// Spawn a timer task firing the returned [`CancelSignal`] after `duration`,
/// or earlier in case `interrupt` resolves first.
///
/// Aborting the returned handle fires the signal as well.
pub fn spawn_deadline<F>(duration: Duration, interrupt: F) -> (CancelSignal, JoinHandle<()>)
where
    F: Future<Output: Send + 'static> + Send + 'static,
{
    let (trigger, signal) = cancel_signal();

    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {
                tracing::debug!(?duration, "run deadline reached: fire cancel signal");
            }
            _ = interrupt => {
                tracing::info!("run interrupted before deadline: fire cancel signal");
            }
        }
        trigger.fire();
    });

    (signal, handle)
}
