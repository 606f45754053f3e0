//! Fixed-rate tick driver.

use crate::engine::DialEngine;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Background task calling [`DialEngine::tick`] on a fixed period.
///
/// Late ticks are skipped rather than bunched up. Dropping the driver without
/// calling [`stop`](Self::stop) also ends the task.
#[derive(Debug)]
pub struct TickDriver {
    shutdown: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TickDriver {
    /// Spawn the driver on the current tokio runtime.
    pub fn spawn(engine: Arc<DialEngine>, period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(period_ms = period.as_millis(), "Tick driver started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let tokens = engine.tick();
                        if !tokens.is_empty() {
                            tracing::trace!(count = tokens.len(), "Tokens emitted");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!("Tick driver stopped");
        });

        Self {
            shutdown,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Stop the driver and wait for the task to finish. A second call is a no-op.
    pub async fn stop(&self) {
        if self.shutdown.send(true).is_err() {
            tracing::debug!("Tick driver task already gone");
        }
        let handle = self.handle.lock().take();
        if let Some(handle) = handle
            && let Err(err) = handle.await
        {
            tracing::warn!(error = %err, "Tick driver task ended abnormally");
        }
    }

    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
