//! Builder pattern for Engine construction

use std::sync::Arc;
use std::time::Duration;

use crate::config::RunContext;
use crate::error::{BenchError, BenchResult};
use crate::traits::{Recorder, Sampler, SearchClient};
use crate::worker::DEFAULT_TICK_INTERVAL;

use super::executor::Engine;

/// Builder for creating an Engine with proper configuration
///
/// # Example
///
/// ```ignore
/// let engine = EngineBuilder::new()
///     .context(context)
///     .client(client)
///     .sampler(sampler)
///     .recorder(recorder)
///     .seed(Some(7))
///     .build()?;
/// ```
pub struct EngineBuilder {
    context: Option<Arc<RunContext>>,
    client: Option<Arc<dyn SearchClient>>,
    sampler: Option<Arc<dyn Sampler>>,
    recorder: Option<Arc<dyn Recorder>>,
    tick_interval: Duration,
    seed: Option<u64>,
}

impl EngineBuilder {
    /// Create a new engine builder
    pub fn new() -> Self {
        Self {
            context: None,
            client: None,
            sampler: None,
            recorder: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
            seed: None,
        }
    }

    /// Set the run context
    pub fn context(mut self, context: Arc<RunContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Set the search client
    pub fn client(mut self, client: Arc<dyn SearchClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the sampler
    pub fn sampler(mut self, sampler: Arc<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Set the recorder
    pub fn recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Set the pause between two attempts of a worker
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Base seed for worker RNGs; worker `i` uses `seed + i`
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Build the engine
    ///
    /// # Errors
    ///
    /// Returns an error if a component is not set, or if configuration
    /// validation fails.
    pub fn build(self) -> BenchResult<Engine> {
        let context = self
            .context
            .ok_or_else(|| BenchError::missing_config("context"))?;
        let client = self
            .client
            .ok_or_else(|| BenchError::missing_config("client"))?;
        let sampler = self
            .sampler
            .ok_or_else(|| BenchError::missing_config("sampler"))?;
        let recorder = self
            .recorder
            .ok_or_else(|| BenchError::missing_config("recorder"))?;

        context.config.validate()?;

        if self.tick_interval.is_zero() {
            return Err(BenchError::config("tick interval must be non-zero"));
        }

        Ok(Engine::new(
            context,
            client,
            sampler,
            recorder,
            self.tick_interval,
            self.seed,
        ))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
