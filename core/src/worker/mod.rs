//! Worker module for issuing search requests
//!
//! The Worker is the core execution unit in esperf, responsible for the
//! simple but critical loop: **build -> issue -> record -> sleep -> repeat**.
//!
//! Each Worker is a long-lived tokio task that:
//!
//! 1. Checks the shutdown signal (non-blocking)
//! 2. Builds the next request from a Sampler, using its own RNG
//! 3. POSTs it to a randomly chosen host via a SearchClient, timing it
//! 4. Hands the resulting record to the Recorder
//! 5. Sleeps one tick, waking early on shutdown
//!
//! An attempt that has started is always completed and recorded; shutdown is
//! only observed between attempts.
//!
//! # Example
//!
//! ```ignore
//! use esperf_core::worker::WorkerBuilder;
//!
//! let worker = WorkerBuilder::new(0)
//!     .context(context)
//!     .client(client)
//!     .sampler(sampler)
//!     .recorder(recorder)
//!     .build()?;
//!
//! let stats = worker.run(shutdown_rx).await?;
//! println!("Attempts: {}", stats.attempts);
//! ```

mod builder;
mod executor;
mod stats;

pub use builder::{WorkerBuilder, DEFAULT_TICK_INTERVAL};
pub use executor::Worker;
pub use stats::WorkerStats;
