//! Signal handling for graceful shutdown

use anyhow::Result;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Setup signal handlers for graceful shutdown
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    #[cfg(unix)]
    let sigterm = {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;

        let flag = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGTERM, flag.clone())?;
        flag
    };

    tokio::spawn(async move {
        #[cfg(unix)]
        let terminated = async {
            use std::sync::atomic::Ordering;

            // Poll for signal
            while !sigterm.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        };
        #[cfg(not(unix))]
        let terminated = std::future::pending::<()>();

        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Ctrl+C signal received"),
                Err(e) => {
                    error!("Failed to listen for Ctrl+C signal: {}", e);
                    return;
                }
            },
            _ = terminated => info!("SIGTERM signal received"),
        }

        let _ = shutdown_tx.send(());
    });

    Ok(shutdown_rx)
}

/// Wait for a background task to wind down, giving up after `limit`
pub async fn graceful_shutdown(
    name: &str,
    handle: tokio::task::JoinHandle<()>,
    limit: Duration,
) -> Result<()> {
    info!("Starting graceful shutdown...");

    match timeout(limit, handle).await {
        Ok(Ok(())) => {
            info!("{} stopped gracefully", name);
        }
        Ok(Err(e)) => {
            error!("{} task failed: {}", name, e);
        }
        Err(_) => {
            warn!("{} did not stop within timeout, forcing shutdown", name);
        }
    }

    info!("Graceful shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_ok, block_on};

    #[test]
    fn test_graceful_shutdown_of_finished_task() {
        block_on(async {
            let handle = tokio::spawn(async {});
            assert_ok!(graceful_shutdown("idle", handle, Duration::from_secs(1)).await);
        });
    }

    #[test]
    fn test_graceful_shutdown_of_panicked_task() {
        block_on(async {
            let handle = tokio::spawn(async { panic!("loop crashed") });
            assert_ok!(graceful_shutdown("crashed", handle, Duration::from_secs(1)).await);
        });
    }

    #[tokio::test]
    async fn test_graceful_shutdown_waits_for_task() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
        });
        assert!(graceful_shutdown("test", handle, Duration::from_secs(1)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_graceful_shutdown_times_out() {
        let handle = tokio::spawn(std::future::pending::<()>());
        assert!(graceful_shutdown("stuck", handle, Duration::from_millis(50)).await.is_ok());
    }
}
