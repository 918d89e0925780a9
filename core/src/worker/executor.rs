//! Worker execution loop

use crate::config::RunContext;
use crate::error::BenchResult;
use crate::metrics::RequestRecord;
use crate::traits::{Recorder, Sampler, SearchClient};

use super::stats::WorkerStats;

use chrono::Local;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Worker issues requests in a loop: build -> issue -> record -> sleep
///
/// Workers are long-lived tokio tasks managed by the Engine. They share
/// the run context, client, sampler and recorder via Arc and own their
/// random number generator.
pub struct Worker {
    /// Unique worker identifier
    id: usize,

    /// Read-only run context (hosts, index, type)
    context: Arc<RunContext>,

    /// Search client (shared across workers via Arc)
    client: Arc<dyn SearchClient>,

    /// Sampler (shared across workers via Arc)
    sampler: Arc<dyn Sampler>,

    /// Result log (shared across workers via Arc)
    recorder: Arc<dyn Recorder>,

    /// Pause between attempts
    tick_interval: Duration,

    /// Per-worker generator for condition, value and host selection
    rng: StdRng,
}

impl Worker {
    /// Create a new worker
    ///
    /// Use `WorkerBuilder` for a more ergonomic construction.
    pub fn new(
        id: usize,
        context: Arc<RunContext>,
        client: Arc<dyn SearchClient>,
        sampler: Arc<dyn Sampler>,
        recorder: Arc<dyn Recorder>,
        tick_interval: Duration,
        rng: StdRng,
    ) -> Self {
        Self {
            id,
            context,
            client,
            sampler,
            recorder,
            tick_interval,
            rng,
        }
    }

    /// Run the worker loop until the shutdown signal fires
    ///
    /// Every attempt started is completed and recorded before the signal is
    /// looked at again.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> BenchResult<WorkerStats> {
        let mut stats = WorkerStats::new();
        stats.start();

        tracing::debug!(worker_id = self.id, "Worker started");

        loop {
            if shutdown_requested(&mut shutdown) {
                tracing::debug!(worker_id = self.id, "Worker received shutdown signal");
                break;
            }

            let record = self.attempt().await;
            stats.observe(&record);

            if let Err(e) = self.recorder.record(&record) {
                stats.record_failure();
                tracing::warn!(
                    worker_id = self.id,
                    error = %e,
                    "Failed to write result record"
                );
            }

            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::debug!(worker_id = self.id, "Worker received shutdown signal");
                    break;
                }

                _ = tokio::time::sleep(self.tick_interval) => {}
            }
        }

        stats.stop();
        tracing::debug!(
            worker_id = self.id,
            attempts = stats.attempts,
            errors = stats.errors,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Worker finished"
        );

        Ok(stats)
    }

    /// Make one attempt and describe its outcome
    ///
    /// Never fails: every failure mode ends up in the returned record.
    async fn attempt(&mut self) -> RequestRecord {
        let request = match self.sampler.sample(&mut self.rng) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(worker_id = self.id, error = %e, "Failed to build request");
                return RequestRecord {
                    condition_id: e.condition_id(),
                    error: Some(e.to_string()),
                    ..Default::default()
                };
            }
        };

        let mut record = RequestRecord::for_condition(request.condition_id);

        let url = match self.context.config.hosts.choose(&mut self.rng) {
            Some(host) => self.context.config.search_url(host),
            None => {
                record.error = Some("no hosts configured".to_string());
                return record;
            }
        };

        tracing::trace!(worker_id = self.id, %url, condition_id = ?request.condition_id, "Sending request");

        record.started_at = Some(Local::now());
        let outcome = self.client.search(&url, request.body).await;
        record.ended_at = Some(Local::now());

        match outcome {
            Ok(response) => {
                record.status_code = Some(response.status_code);
                if response.is_ok() {
                    match response.total_hits() {
                        Ok(hits) => record.hits = hits,
                        Err(e) => {
                            record.error = Some(format!("failed to parse response body: {e}"));
                        }
                    }
                }
            }
            Err(e) => {
                tracing::debug!(worker_id = self.id, %url, error = %e, "Request failed");
                record.status_code = e.status_code();
                record.error = Some(e.to_string());
            }
        }

        record
    }

    /// Get the worker ID
    pub fn id(&self) -> usize {
        self.id
    }
}

/// Non-blocking check of the shutdown channel
///
/// A closed or lagged channel counts as shutdown.
fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("client", &self.client.name())
            .field("sampler", &self.sampler.name())
            .field("tick_interval", &self.tick_interval)
            .finish()
    }
}
