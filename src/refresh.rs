//! Background refresh ticks for the movers board
//!
//! The movers board goes stale quickly, so a background task emits a tick on
//! a fixed interval over a tokio channel; the main loop turns each tick into
//! a cache-fronted reload. The interval is a client-side polling cadence,
//! deliberately separate from the cache's own TTL.

use std::time::Duration;
use tokio::sync::mpsc;

/// Messages sent from the background refresh task to the main app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshMessage {
    /// Time to reload the movers board
    MoversTick,
}

/// Configuration for the refresh cadence
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between movers board reloads
    pub movers_interval: Duration,
    /// Whether auto-refresh is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            movers_interval: Duration::from_secs(60),
            enabled: true,
        }
    }
}

/// Handle for controlling the background refresh task
pub struct RefreshHandle {
    /// Channel for receiving refresh messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    /// Flag to signal shutdown
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns the background tick task and returns its handle
    ///
    /// The first tick fires one interval after spawn, not immediately; the
    /// initial load happens in the foreground before the event loop starts.
    pub fn spawn(config: RefreshConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(8);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(config.movers_interval);
                // Skip the first tick (immediate)
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            if msg_tx.send(RefreshMessage::MoversTick).await.is_err() {
                                break;
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Shuts down the background refresh task
    #[allow(dead_code)]
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Checks for a pending refresh message without blocking
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_config_default() {
        let config = RefreshConfig::default();
        assert_eq!(config.movers_interval, Duration::from_secs(60));
        assert!(config.enabled);
    }

    #[tokio::test]
    async fn test_spawn_disabled_emits_nothing() {
        let config = RefreshConfig {
            enabled: false,
            ..Default::default()
        };

        let mut handle = RefreshHandle::spawn(config);
        assert!(try_recv(&mut handle).is_none());
    }

    #[tokio::test]
    async fn test_spawn_ticks_after_interval() {
        let config = RefreshConfig {
            movers_interval: Duration::from_millis(20),
            enabled: true,
        };

        let mut handle = RefreshHandle::spawn(config);

        let message = tokio::time::timeout(Duration::from_secs(1), handle.receiver.recv())
            .await
            .expect("tick should arrive well within a second");
        assert_eq!(message, Some(RefreshMessage::MoversTick));
    }

    #[tokio::test]
    async fn test_shutdown_stops_ticks() {
        let config = RefreshConfig {
            movers_interval: Duration::from_millis(10),
            enabled: true,
        };

        let handle = RefreshHandle::spawn(config);
        handle.shutdown().await;
        // Nothing to assert beyond "this returns"; the task exits on the
        // shutdown signal rather than ticking forever.
    }
}
