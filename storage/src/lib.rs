//! Result log recorders for esperf
//!
//! This crate provides implementations of the `Recorder` trait:
//!
//! - [`CsvRecorder`]: append-only CSV log, one row per attempt

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod csv_recorder;

pub use csv_recorder::CsvRecorder;
