//! Engine execution logic

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::config::RunContext;
use crate::error::{BenchError, BenchResult};
use crate::traits::{Recorder, Sampler, SearchClient};
use crate::worker::{WorkerBuilder, WorkerStats};

use super::aggregator::aggregate_worker_stats;

/// Lifecycle state of an Engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Built, not started
    Idle,
    /// Workers are issuing requests
    Running,
    /// Shutdown broadcast, waiting for in-flight attempts
    Draining,
    /// Every worker has finished
    Stopped,
}

/// Engine manages the load run lifecycle
///
/// Responsible for spawning workers, coordinating shutdown,
/// and collecting results.
pub struct Engine {
    /// Read-only run context
    pub(crate) context: Arc<RunContext>,

    /// Search client (shared across workers)
    pub(crate) client: Arc<dyn SearchClient>,

    /// Sampler (shared across workers)
    pub(crate) sampler: Arc<dyn Sampler>,

    /// Result log (shared across workers)
    pub(crate) recorder: Arc<dyn Recorder>,

    /// Pause between attempts of one worker
    pub(crate) tick_interval: Duration,

    /// Base seed for worker RNGs
    pub(crate) seed: Option<u64>,

    /// Shutdown signal sender
    pub(crate) shutdown_tx: broadcast::Sender<()>,

    /// Lifecycle state
    pub(crate) state_tx: watch::Sender<EngineState>,
}

impl Engine {
    /// Create a new engine
    ///
    /// Use `EngineBuilder` for a more ergonomic construction.
    pub fn new(
        context: Arc<RunContext>,
        client: Arc<dyn SearchClient>,
        sampler: Arc<dyn Sampler>,
        recorder: Arc<dyn Recorder>,
        tick_interval: Duration,
        seed: Option<u64>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (state_tx, _) = watch::channel(EngineState::Idle);

        Self {
            context,
            client,
            sampler,
            recorder,
            tick_interval,
            seed,
            shutdown_tx,
            state_tx,
        }
    }

    /// Get a shutdown signal receiver
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Trigger shutdown of all workers
    ///
    /// Moves a running engine to `Draining`. Attempts already in flight are
    /// allowed to finish.
    pub fn shutdown(&self) {
        self.state_tx.send_if_modified(|state| {
            if *state == EngineState::Running {
                *state = EngineState::Draining;
                true
            } else {
                false
            }
        });
        let _ = self.shutdown_tx.send(());
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        *self.state_tx.borrow()
    }

    /// Watch lifecycle state changes
    pub fn subscribe_state(&self) -> watch::Receiver<EngineState> {
        self.state_tx.subscribe()
    }

    /// Get the run context
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Run until `shutdown` is called
    pub async fn run(&self) -> BenchResult<Vec<WorkerStats>> {
        self.run_until(std::future::pending()).await
    }

    /// Run for a fixed duration, then drain
    pub async fn run_for(&self, duration: Duration) -> BenchResult<Vec<WorkerStats>> {
        self.run_until(async move {
            tokio::time::sleep(duration).await;
            tracing::info!("Run duration elapsed, initiating shutdown...");
        })
        .await
    }

    /// Run for a fixed duration with Ctrl+C handling
    ///
    /// Ctrl+C starts the drain early; in-flight requests still complete.
    pub async fn run_with_signal_handling(
        &self,
        duration: Duration,
    ) -> BenchResult<Vec<WorkerStats>> {
        self.run_until(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {
                    tracing::info!("Run duration elapsed, initiating shutdown...");
                }
                result = tokio::signal::ctrl_c() => match result {
                    Ok(()) => tracing::info!("Received Ctrl+C, initiating graceful shutdown..."),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                        tokio::time::sleep(duration).await;
                    }
                },
            }
        })
        .await
    }

    /// Spawn workers, wait for `stop` or an external shutdown, then drain
    async fn run_until<F>(&self, stop: F) -> BenchResult<Vec<WorkerStats>>
    where
        F: Future<Output = ()>,
    {
        if self.state() != EngineState::Idle {
            return Err(BenchError::orchestration("engine has already been run"));
        }

        let start = Instant::now();
        let mut external_shutdown = self.shutdown_tx.subscribe();

        tracing::info!(
            threads = self.context.config.threads,
            hosts = self.context.config.hosts.len(),
            conditions = self.context.conditions.len(),
            substitution_keys = self.context.substitutions.len(),
            tick_ms = self.tick_interval.as_millis() as u64,
            "Starting load run"
        );

        let handles = self.spawn_workers()?;
        self.state_tx.send_replace(EngineState::Running);

        tokio::select! {
            _ = stop => {}
            _ = external_shutdown.recv() => {}
        }

        self.shutdown();
        tracing::info!(workers = handles.len(), "Draining workers");

        let results = self.join_workers(handles).await;
        self.state_tx.send_replace(EngineState::Stopped);
        let results = results?;

        let aggregated = aggregate_worker_stats(&results);
        tracing::info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            attempts = aggregated.total_attempts,
            errors = aggregated.total_errors,
            non_200 = aggregated.total_unsuccessful_status,
            records_written = self.recorder.records_written(),
            rps = aggregated.requests_per_second,
            "Load run completed"
        );

        Ok(results)
    }

    /// Spawn exactly `Threads` worker tasks
    ///
    /// Each worker subscribes to the shutdown channel before this returns, so
    /// no signal sent afterwards can be missed.
    fn spawn_workers(&self) -> BenchResult<Vec<JoinHandle<BenchResult<WorkerStats>>>> {
        let threads = self.context.config.threads;
        let mut handles = Vec::with_capacity(threads);

        for worker_id in 0..threads {
            let worker = WorkerBuilder::new(worker_id)
                .context(Arc::clone(&self.context))
                .client(Arc::clone(&self.client))
                .sampler(Arc::clone(&self.sampler))
                .recorder(Arc::clone(&self.recorder))
                .tick_interval(self.tick_interval)
                .seed(self.seed.map(|s| s.wrapping_add(worker_id as u64)))
                .build()?;
            let shutdown_rx = self.shutdown_tx.subscribe();

            handles.push(tokio::spawn(worker.run(shutdown_rx)));
        }

        Ok(handles)
    }

    /// Wait for every worker, collecting stats from those that finished cleanly
    async fn join_workers(
        &self,
        handles: Vec<JoinHandle<BenchResult<WorkerStats>>>,
    ) -> BenchResult<Vec<WorkerStats>> {
        let mut results = Vec::with_capacity(handles.len());
        let mut worker_failures = 0;
        for (idx, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(stats)) => {
                    tracing::debug!(
                        worker_id = idx,
                        attempts = stats.attempts,
                        errors = stats.errors,
                        "Worker completed"
                    );
                    results.push(stats);
                }
                Ok(Err(e)) => {
                    worker_failures += 1;
                    tracing::error!(worker_id = idx, error = %e, "Worker returned error");
                }
                Err(e) => {
                    worker_failures += 1;
                    tracing::error!(worker_id = idx, error = %e, "Worker task panicked");
                }
            }
        }

        if results.is_empty() && worker_failures > 0 {
            return Err(BenchError::orchestration(format!(
                "All {} workers failed to complete",
                worker_failures
            )));
        }

        Ok(results)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.context.config)
            .field("client", &self.client.name())
            .field("sampler", &self.sampler.name())
            .field("tick_interval", &self.tick_interval)
            .field("state", &self.state())
            .finish()
    }
}
