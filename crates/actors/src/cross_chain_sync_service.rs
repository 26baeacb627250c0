use crate::cross_chain_service::{CrossChainService, InitialSyncStatus, LibUpdateOutcome};
use reth_tasks::shutdown::Shutdown;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn, Instrument as _};
use xchain_types::{
    BlockHash, BlockHeight, ChainStateReaderFactory, CrossChainConfig,
    IrreversibleBlockStateProvider, TokioServiceHandle, Traced,
};

#[derive(Debug)]
pub enum CrossChainServiceMessage {
    /// The node finished catching up. Bootstrapping is retried in the
    /// background until the cache is seeded; `response` receives the result
    /// of the first attempt.
    FinishInitialSync {
        response: Option<oneshot::Sender<eyre::Result<InitialSyncStatus>>>,
    },
    /// A block became irreversible.
    LibUpdated {
        block_hash: BlockHash,
        block_height: BlockHeight,
        response: Option<oneshot::Sender<eyre::Result<LibUpdateOutcome>>>,
    },
}

pub type CrossChainServiceSender = UnboundedSender<Traced<CrossChainServiceMessage>>;

/// Drives a [`CrossChainService`] from node events.
///
/// Messages are handled one at a time in arrival order, so LIB updates are
/// applied in the order finality reported them. Query paths use the shared
/// `CrossChainService` directly and never go through this loop.
#[derive(Debug)]
pub struct CrossChainSyncService<P, F> {
    msg_rx: UnboundedReceiver<Traced<CrossChainServiceMessage>>,
    shutdown: Shutdown,
    cross_chain_service: Arc<CrossChainService<P, F>>,
    retry_interval: Duration,
    bootstrap_requested: bool,
}

impl<P, F> CrossChainSyncService<P, F>
where
    P: IrreversibleBlockStateProvider + 'static,
    F: ChainStateReaderFactory + 'static,
{
    #[tracing::instrument(level = "trace", skip_all, name = "spawn_service_cross_chain_sync")]
    pub fn spawn_service(
        cross_chain_service: Arc<CrossChainService<P, F>>,
        rx: UnboundedReceiver<Traced<CrossChainServiceMessage>>,
        config: &CrossChainConfig,
        runtime_handle: tokio::runtime::Handle,
    ) -> TokioServiceHandle {
        info!("Spawning cross-chain sync service");

        let (shutdown_tx, shutdown_rx) = reth_tasks::shutdown::signal();
        let service = Self {
            msg_rx: rx,
            shutdown: shutdown_rx,
            cross_chain_service,
            retry_interval: config.initial_sync_retry_interval(),
            bootstrap_requested: false,
        };

        let handle = runtime_handle.spawn(service.start().in_current_span());

        TokioServiceHandle {
            name: "cross_chain_sync_service".to_string(),
            handle,
            shutdown_signal: shutdown_tx,
        }
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn start(mut self) {
        info!("Starting cross-chain sync service");

        let mut retry = tokio::time::interval(self.retry_interval);
        retry.set_missed_tick_behavior(MissedTickBehavior::Delay);
        retry.tick().await; // Skip first immediate tick

        loop {
            tokio::select! {
                biased;

                _ = &mut self.shutdown => {
                    info!("Shutdown signal received for cross-chain sync service");
                    break;
                }
                msg = self.msg_rx.recv() => {
                    match msg {
                        Some(traced) => {
                            let (msg, span) = traced.into_parts();
                            self.handle_message(msg).instrument(span).await;
                        }
                        None => {
                            warn!("Message channel closed unexpectedly");
                            break;
                        }
                    }
                }
                _ = retry.tick(), if self.bootstrap_pending() => {
                    // the attempt logs its own outcome
                    let _ = self.try_finish_initial_sync().await;
                }
            }
        }

        debug!(custom.amount_of_messages = ?self.msg_rx.len(), "processing last in-bound messages before shutdown");
        while let Ok(traced) = self.msg_rx.try_recv() {
            let (msg, span) = traced.into_parts();
            self.handle_message(msg).instrument(span).await;
        }

        info!("shutting down cross-chain sync service gracefully");
    }

    fn bootstrap_pending(&self) -> bool {
        self.bootstrap_requested && !self.cross_chain_service.sync_state().is_cache_seeded()
    }

    async fn handle_message(&mut self, msg: CrossChainServiceMessage) {
        match msg {
            CrossChainServiceMessage::FinishInitialSync { response } => {
                self.bootstrap_requested = true;
                let result = self.try_finish_initial_sync().await;
                if let Some(sender) = response {
                    if let Err(e) = sender.send(result) {
                        warn!(custom.error = ?e, "Unable to send a response for FinishInitialSync");
                    }
                }
            }
            CrossChainServiceMessage::LibUpdated {
                block_hash,
                block_height,
                response,
            } => {
                let result = self
                    .cross_chain_service
                    .update_with_lib(block_hash, block_height)
                    .await
                    .map_err(eyre::Report::new);
                if let Err(e) = &result {
                    warn!(block.height = block_height, "Failed to apply LIB update: {e}");
                }
                if let Some(sender) = response {
                    if let Err(e) = sender.send(result) {
                        warn!(custom.error = ?e, "Unable to send a response for LibUpdated");
                    }
                }
            }
        }
    }

    /// One bootstrap attempt. Retryable failures keep the retry ticker armed;
    /// anything else stops it until the next `FinishInitialSync` request.
    async fn try_finish_initial_sync(&mut self) -> eyre::Result<InitialSyncStatus> {
        let result = self.cross_chain_service.finish_initial_sync().await;
        match &result {
            Ok(InitialSyncStatus::Pending) => {
                debug!(retry_in = ?self.retry_interval, "Cross-chain bootstrap pending");
            }
            Ok(InitialSyncStatus::Completed { .. }) => {}
            Err(e) if e.is_retryable() => {
                warn!(retry_in = ?self.retry_interval, "Cross-chain bootstrap failed: {e}");
            }
            Err(e) => {
                error!("Cross-chain bootstrap failed, not retrying: {e}");
                self.bootstrap_requested = false;
            }
        }
        result.map_err(eyre::Report::new)
    }
}
