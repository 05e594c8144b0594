//! Channel type definitions for inter-task communication

use std::future::Future;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::errors::{PusherError, Result};

/// Sender side of the shutdown signal
pub type ShutdownSender = watch::Sender<bool>;

/// Receiver side of the shutdown signal
pub type ShutdownReceiver = watch::Receiver<bool>;

/// Create a shutdown channel; sending `true` asks every holder to stop
pub fn create_shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    watch::channel(false)
}

/// Resolve once shutdown has been requested or the sender is gone
pub async fn wait_for_shutdown(mut receiver: ShutdownReceiver) {
    while !*receiver.borrow() {
        if receiver.changed().await.is_err() {
            break;
        }
    }
}

/// Run until `signal` fires or the `service` task ends on its own
///
/// Either way shutdown is broadcast, then the service's own result is
/// returned once it has finished.
pub async fn supervise<S>(
    signal: S,
    mut service: JoinHandle<std::io::Result<()>>,
    shutdown: &ShutdownSender,
) -> Result<()>
where
    S: Future<Output = std::io::Result<()>>,
{
    let stopped_early = tokio::select! {
        received = signal => {
            if let Err(e) = received {
                shutdown.send(true).ok();
                return Err(PusherError::Internal(format!("signal handler: {}", e)));
            }
            info!("Received shutdown signal, cleaning up...");
            None
        }
        finished = &mut service => {
            error!("Service stopped unexpectedly, shutting down");
            Some(finished)
        }
    };
    shutdown.send(true).ok();

    let finished = match stopped_early {
        Some(finished) => finished,
        None => service.await,
    };
    finished
        .map_err(|e| PusherError::Internal(format!("service task: {}", e)))?
        .map_err(|e| PusherError::Internal(format!("service: {}", e)))
}
