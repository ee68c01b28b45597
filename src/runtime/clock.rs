//! Periodic clock driving a machine's timers.

use super::machine::{lock, Core};
use std::sync::{Mutex, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Handle to a running clock task. Dropping it stops the task.
pub(crate) struct Clock {
    cancel: CancellationToken,
}

impl Clock {
    /// Spawn a task that ticks the machine every `period`.
    ///
    /// The task holds only a weak reference, so it never keeps a dropped
    /// machine alive; it exits on cancellation or once the machine is gone.
    pub(crate) fn start(handle: &Handle, core: Weak<Mutex<Core>>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let Some(shared) = core.upgrade() else { break };
                        let mut machine = lock(&shared);
                        if let Err(e) = machine.tick() {
                            tracing::error!(error = %e, "Clock tick failed");
                        }
                    }
                }
            }
            tracing::debug!("Clock task exited");
        });

        Self { cancel }
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
