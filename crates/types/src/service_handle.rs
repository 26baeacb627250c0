use reth_tasks::shutdown::Signal;
use tokio::task::JoinHandle;

/// Owner's handle to a spawned service loop: the task plus the signal that
/// asks it to drain and exit.
#[derive(Debug)]
pub struct TokioServiceHandle {
    pub name: String,
    pub handle: JoinHandle<()>,
    pub shutdown_signal: Signal,
}

impl TokioServiceHandle {
    pub async fn stop_and_join(self) {
        self.shutdown_signal.fire();

        match self.handle.await {
            Ok(()) => tracing::debug!(service = %self.name, "service shut down"),
            Err(e) => tracing::error!(service = %self.name, "service panicked: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn spawn_waiting_service(name: &str, stopped: Arc<AtomicBool>) -> TokioServiceHandle {
        let (shutdown_signal, shutdown) = reth_tasks::shutdown::signal();
        let handle = tokio::spawn(async move {
            shutdown.await;
            stopped.store(true, Ordering::SeqCst);
        });
        TokioServiceHandle {
            name: name.to_string(),
            handle,
            shutdown_signal,
        }
    }

    #[tokio::test]
    async fn test_stop_and_join_fires_signal() {
        let stopped = Arc::new(AtomicBool::new(false));
        let handle = spawn_waiting_service("waiting", stopped.clone());

        handle.stop_and_join().await;

        assert!(stopped.load(Ordering::SeqCst));
    }
}
