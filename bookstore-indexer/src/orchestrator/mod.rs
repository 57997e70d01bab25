//! Orchestrator module for the search synchronization pipeline.
//!
//! Coordinates the event channel, processor, and loader components.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, instrument};

use crate::errors::SyncError;
use crate::events::{SyncEvent, SyncHandle};
use crate::loader::SearchLoader;
use crate::processor::{BookProcessor, ProcessedEvent};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the event channel buffer.
    pub channel_buffer_size: usize,
    /// Most events drained from the channel into one processing batch.
    pub max_batch_events: usize,
    /// Interval between progress log lines.
    pub progress_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
            max_batch_events: 100,
            progress_interval: Duration::from_secs(10),
        }
    }
}

/// Orchestrator that keeps the search index in step with the catalog.
///
/// The orchestrator:
/// - Receives committed change events from `SyncHandle`s
/// - Resolves them into documents and hands them to the loader
/// - Handles shutdown signals
/// - Logs progress
///
/// Failures while processing a batch are logged and the batch is dropped;
/// they never reach the code that published the events.
pub struct Orchestrator {
    receiver: mpsc::Receiver<SyncEvent>,
    processor: BookProcessor,
    loader: SearchLoader,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    /// Total number of events processed since startup.
    total_events_processed: Arc<AtomicU64>,
    /// Total number of documents indexed since startup.
    total_documents_indexed: Arc<AtomicU64>,
    /// Total number of batches that failed.
    total_failed_batches: Arc<AtomicU64>,
}

impl Orchestrator {
    /// Create a new orchestrator and the handle used to feed it.
    pub fn new(processor: BookProcessor, loader: SearchLoader) -> (Self, SyncHandle) {
        Self::with_config(processor, loader, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        processor: BookProcessor,
        loader: SearchLoader,
        config: OrchestratorConfig,
    ) -> (Self, SyncHandle) {
        let (handle, receiver) = SyncHandle::channel(config.channel_buffer_size);
        let (shutdown_tx, _) = broadcast::channel(1);

        let orchestrator = Self {
            receiver,
            processor,
            loader,
            config,
            shutdown_tx,
            total_events_processed: Arc::new(AtomicU64::new(0)),
            total_documents_indexed: Arc::new(AtomicU64::new(0)),
            total_failed_batches: Arc::new(AtomicU64::new(0)),
        };
        (orchestrator, handle)
    }

    /// Run the orchestrator.
    ///
    /// Blocks until a shutdown signal is received or every `SyncHandle` has
    /// been dropped and the channel is drained.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<(), SyncError> {
        info!("Starting search sync orchestrator");

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let total_events = Arc::clone(&self.total_events_processed);
        let total_docs = Arc::clone(&self.total_documents_indexed);
        let mut progress_timer = interval(self.config.progress_interval);
        progress_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut prev_events: u64 = 0;
        let mut prev_docs: u64 = 0;
        let mut prev_time = std::time::Instant::now();

        loop {
            tokio::select! {
                event = self.receiver.recv() => {
                    match event {
                        Some(event) => {
                            let mut events = vec![event];
                            while events.len() < self.config.max_batch_events {
                                match self.receiver.try_recv() {
                                    Ok(event) => events.push(event),
                                    Err(_) => break,
                                }
                            }

                            debug!(event_count = events.len(), "Received sync events");
                            if let Err(e) = self.process_events(events).await {
                                self.total_failed_batches.fetch_add(1, Ordering::Relaxed);
                                error!(error = %e, "Failed to sync batch to search index");
                            }
                        }
                        None => {
                            info!("All sync handles dropped");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown request");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    let _ = self.shutdown_tx.send(());
                    break;
                }
                _ = progress_timer.tick() => {
                    let events = total_events.load(Ordering::Relaxed);
                    let docs = total_docs.load(Ordering::Relaxed);

                    let now = std::time::Instant::now();
                    let elapsed_secs = now.duration_since(prev_time).as_secs_f64();

                    let events_per_sec = if elapsed_secs > 0.0 {
                        (events.saturating_sub(prev_events) as f64) / elapsed_secs
                    } else {
                        0.0
                    };

                    let docs_per_sec = if elapsed_secs > 0.0 {
                        (docs.saturating_sub(prev_docs) as f64) / elapsed_secs
                    } else {
                        0.0
                    };

                    if events != prev_events {
                        info!(
                            events_processed = events,
                            documents_indexed = docs,
                            events_per_sec = format!("{:.2}", events_per_sec),
                            documents_per_sec = format!("{:.2}", docs_per_sec),
                            "Sync progress"
                        );
                    }

                    prev_events = events;
                    prev_docs = docs;
                    prev_time = now;
                }
            }
        }

        if let Err(e) = self.loader.flush().await {
            error!(error = %e, "Failed to flush pending documents on shutdown");
        }

        info!(
            total_events_processed = self.total_events_processed.load(Ordering::Relaxed),
            total_documents_indexed = self.total_documents_indexed.load(Ordering::Relaxed),
            total_failed_batches = self.total_failed_batches.load(Ordering::Relaxed),
            "Orchestrator shutdown complete"
        );
        Ok(())
    }

    /// Process a batch of events through the pipeline and flush it.
    async fn process_events(&mut self, events: Vec<SyncEvent>) -> Result<(), SyncError> {
        let event_count = events.len();
        self.total_events_processed
            .fetch_add(event_count as u64, Ordering::Relaxed);

        let processed = self.processor.process_batch(events).await?;

        if processed.is_empty() {
            debug!("No documents to sync after processing");
            return Ok(());
        }

        let index_count = processed
            .iter()
            .filter(|e| matches!(e, ProcessedEvent::Index(_)))
            .count();

        self.loader.load(processed).await?;
        self.loader.flush().await?;

        self.total_documents_indexed
            .fetch_add(index_count as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Sender that stops `run` when a unit is sent on it.
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Events processed since startup.
    pub fn events_processed(&self) -> u64 {
        self.total_events_processed.load(Ordering::Relaxed)
    }

    /// Documents indexed since startup.
    pub fn documents_indexed(&self) -> u64 {
        self.total_documents_indexed.load(Ordering::Relaxed)
    }

    /// Batches that failed since startup.
    pub fn failed_batches(&self) -> u64 {
        self.total_failed_batches.load(Ordering::Relaxed)
    }
}
