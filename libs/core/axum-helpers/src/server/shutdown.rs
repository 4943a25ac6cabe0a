use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::broadcast;

/// Coordinates graceful shutdown across multiple tasks.
///
/// The coordinator owns a broadcast channel. Background tasks subscribe to it
/// and stop their work when a shutdown notification arrives, either from an
/// OS signal or from an explicit [`ShutdownCoordinator::shutdown`] call.
/// Clones share the same channel and flag.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    tx: broadcast::Sender<()>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    /// Creates a new coordinator and the first subscriber handle.
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        let (tx, rx) = broadcast::channel(1);
        (
            Self {
                tx,
                shutdown_initiated: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// Returns a new receiver that is notified when shutdown begins.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Whether shutdown has already been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Initiates shutdown. Subsequent calls are no-ops.
    pub fn shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            tracing::info!("Shutdown initiated");
            let _ = self.tx.send(());
        }
    }

    /// Waits for SIGINT or SIGTERM, then initiates shutdown.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C signal");
            }
            _ = terminate => {
                tracing::info!("Received terminate signal");
            }
        }

        self.shutdown();
    }
}

/// Completes when SIGINT or SIGTERM is received.
///
/// Suitable for `axum::serve(..).with_graceful_shutdown(shutdown_signal())`
/// when no coordinated cleanup is needed.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down");
        }
    }
}

/// Completes when either an OS signal arrives or shutdown is broadcast from
/// another holder of the coordinator.
pub(crate) async fn coordinated_shutdown(coordinator: ShutdownCoordinator) {
    if coordinator.is_shutting_down() {
        return;
    }
    let mut rx = coordinator.subscribe();

    tokio::select! {
        _ = coordinator.wait_for_signal() => {}
        _ = rx.recv() => {
            tracing::info!("Shutdown notification received");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_sets_flag_and_notifies_subscribers() {
        let (coordinator, mut rx) = ShutdownCoordinator::new();
        assert!(!coordinator.is_shutting_down());

        coordinator.shutdown();

        assert!(coordinator.is_shutting_down());
        rx.recv().await.expect("subscriber should be notified");
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let (coordinator, _rx) = ShutdownCoordinator::new();

        coordinator.shutdown();
        coordinator.shutdown();

        assert!(coordinator.is_shutting_down());
    }

    #[tokio::test]
    async fn test_clones_share_shutdown_state() {
        let (coordinator, _rx) = ShutdownCoordinator::new();
        let clone = coordinator.clone();
        let mut rx = clone.subscribe();

        coordinator.shutdown();

        assert!(clone.is_shutting_down());
        rx.recv().await.expect("clone subscriber should be notified");
    }

    #[tokio::test]
    async fn test_coordinated_shutdown_returns_on_broadcast() {
        let (coordinator, _rx) = ShutdownCoordinator::new();
        let waiting = tokio::spawn(coordinated_shutdown(coordinator.clone()));

        tokio::task::yield_now().await;
        coordinator.shutdown();

        tokio::time::timeout(std::time::Duration::from_secs(1), waiting)
            .await
            .expect("coordinated_shutdown should complete after broadcast")
            .unwrap();
    }
}
