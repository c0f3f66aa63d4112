//! Graceful shutdown coordinator

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

/// Shutdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShuttingDown,
}

/// Coordinates shutdown between the HTTP server and background tasks
pub struct ShutdownCoordinator {
    state: Arc<RwLock<ShutdownState>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            state: Arc::new(RwLock::new(ShutdownState::Running)),
            shutdown_tx,
        }
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiate shutdown, waking every subscriber
    pub async fn trigger(&self) {
        let mut state = self.state.write().await;
        if *state != ShutdownState::Running {
            warn!("Shutdown already in progress");
            return;
        }
        *state = ShutdownState::ShuttingDown;
        drop(state);

        info!("Initiating graceful shutdown");
        // Send fails only when no subscriber exists, which is fine
        let _ = self.shutdown_tx.send(());
    }

    /// Check if shutdown is in progress
    pub async fn is_shutting_down(&self) -> bool {
        *self.state.read().await == ShutdownState::ShuttingDown
    }

    /// Wait for the shutdown signal
    pub async fn wait_for_shutdown(&self) {
        // Subscribe before checking state so a trigger between the
        // two cannot be missed
        let mut rx = self.subscribe();
        if self.is_shutting_down().await {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_wakes_subscriber() {
        let coordinator = Arc::new(ShutdownCoordinator::new());

        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.wait_for_shutdown().await })
        };

        coordinator.trigger().await;
        waiter.await.unwrap();
        assert!(coordinator.is_shutting_down().await);
    }

    #[tokio::test]
    async fn test_wait_after_trigger_returns_immediately() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.trigger().await;
        coordinator.wait_for_shutdown().await;
    }

    #[tokio::test]
    async fn test_double_trigger_is_harmless() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.trigger().await;
        coordinator.trigger().await;
        assert!(coordinator.is_shutting_down().await);
    }
}
