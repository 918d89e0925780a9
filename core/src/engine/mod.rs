//! Engine for load run lifecycle management
//!
//! The Engine coordinates a complete load run:
//! - Spawning exactly `Threads` workers, each with its own RNG
//! - Running them for the configured duration
//! - Broadcasting shutdown and waiting for every in-flight attempt to be
//!   recorded before reporting `Stopped`
//!
//! Lifecycle: `Idle -> Running -> Draining -> Stopped`.
//!
//! # Example
//!
//! ```ignore
//! use esperf_core::EngineBuilder;
//!
//! let engine = EngineBuilder::new()
//!     .context(context)
//!     .client(client)
//!     .sampler(sampler)
//!     .recorder(recorder)
//!     .build()?;
//!
//! let stats = engine.run_with_signal_handling(duration).await?;
//! ```

mod aggregator;
mod builder;
mod executor;

pub use aggregator::{aggregate_worker_stats, AggregatedStats};
pub use builder::EngineBuilder;
pub use executor::{Engine, EngineState};
