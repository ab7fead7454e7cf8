//! # Reconnect Monitor
//!
//! While a handle is `Ended`, nothing gated reaches the store, so nothing
//! would notice the transport coming back. The monitor pings on an interval
//! until a reply moves the handle back to `Ready`.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use super::handle::{CacheConnection, RedisHandle};
use crate::ops;

/// Background task probing an ended handle
pub struct ReconnectMonitor {
    stop_tx: watch::Sender<()>,
    task: JoinHandle<()>,
}

impl ReconnectMonitor {
    /// Spawn the monitor onto the current tokio runtime.
    ///
    /// The task exits on [`stop`](Self::stop) or once the handle is closed.
    pub fn spawn<C: CacheConnection>(handle: RedisHandle<C>, every: Duration) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(());

        let task = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop_rx.changed() => break,
                }

                if handle.lifecycle().is_closed() {
                    break;
                }
                if handle.is_ready() {
                    continue;
                }

                // A stalled ping must not hold up `stop`
                tokio::select! {
                    result = ops::ping(&handle) => match result {
                        Ok(_) => tracing::info!("Redis connection restored"),
                        Err(e) => tracing::debug!(error = %e, "Reconnect probe failed"),
                    },
                    _ = stop_rx.changed() => break,
                }
            }
        });

        Self { stop_tx, task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the task and wait for it to finish
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ConnectionState;
    use crate::mock::MockConnection;

    #[tokio::test(start_paused = true)]
    async fn test_probe_restores_ended_handle() {
        let mock = MockConnection::new();
        let handle = RedisHandle::new(mock.clone(), ConnectionState::Ended);
        let monitor = ReconnectMonitor::spawn(handle.clone(), Duration::from_secs(1));

        mock.set_offline(true);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!handle.is_ready());

        mock.set_offline(false);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(handle.is_ready());

        monitor.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_handle_is_not_probed() {
        let mock = MockConnection::new();
        let handle = RedisHandle::new(mock.clone(), ConnectionState::Ready);
        let monitor = ReconnectMonitor::spawn(handle, Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(5)).await;
        monitor.stop().await;

        assert!(mock.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_stalled_ping() {
        let mock = MockConnection::new();
        mock.hang_ping();
        let handle = RedisHandle::new(mock.clone(), ConnectionState::Ended);
        let monitor = ReconnectMonitor::spawn(handle, Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(mock.commands().len(), 0); // PING is still pending

        let stopped = tokio::time::timeout(Duration::from_secs(2), monitor.stop()).await;
        assert!(stopped.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_when_handle_closed() {
        let handle = RedisHandle::new(MockConnection::new(), ConnectionState::Ready);
        let monitor = ReconnectMonitor::spawn(handle.clone(), Duration::from_millis(100));

        handle.close();
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(monitor.is_finished());
    }
}
