//! Builder pattern for Worker construction

use crate::config::RunContext;
use crate::error::{BenchError, BenchResult};
use crate::traits::{Recorder, Sampler, SearchClient};

use super::executor::Worker;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

/// Pause between two attempts of the same worker
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .context(context)
///     .client(client)
///     .sampler(sampler)
///     .recorder(recorder)
///     .seed(Some(42))
///     .build()?;
/// ```
pub struct WorkerBuilder {
    id: usize,
    context: Option<Arc<RunContext>>,
    client: Option<Arc<dyn SearchClient>>,
    sampler: Option<Arc<dyn Sampler>>,
    recorder: Option<Arc<dyn Recorder>>,
    tick_interval: Duration,
    seed: Option<u64>,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            context: None,
            client: None,
            sampler: None,
            recorder: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
            seed: None,
        }
    }

    /// Set the shared run context
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

    /// Set the pause between attempts
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Seed the worker's RNG; `None` seeds from OS entropy
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if any required field is missing.
    pub fn build(self) -> BenchResult<Worker> {
        let context = self.context.ok_or(BenchError::missing_config("context"))?;
        let client = self.client.ok_or(BenchError::missing_config("client"))?;
        let sampler = self.sampler.ok_or(BenchError::missing_config("sampler"))?;
        let recorder = self
            .recorder
            .ok_or(BenchError::missing_config("recorder"))?;

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Worker::new(
            self.id,
            context,
            client,
            sampler,
            recorder,
            self.tick_interval,
            rng,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_missing_context() {
        let result = WorkerBuilder::new(0).build();

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.message.contains("context"));
    }

    #[test]
    fn test_default_tick_interval() {
        assert_eq!(DEFAULT_TICK_INTERVAL, Duration::from_secs(1));
    }
}
