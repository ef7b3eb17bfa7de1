//! Finger counting and air-drawn shape recognition.
//!
//! This crate turns per-frame hand landmarks (as produced by a hand tracking model) into finger
//! counts, records strokes drawn in the air with the index finger, and classifies finished strokes
//! as simple shapes. Results can be checked against the expected answer of a task.
//!
//! The entry point for applications is [`scheduler::Scheduler`], which samples frames on a
//! background thread and publishes [`session::Event`]s. [`session::Session`] can also be driven
//! directly, for example to replay recorded frames.
//!
//! # Coordinates
//!
//! Landmarks use normalized image coordinates: X points to the right, Y points *down*, and both
//! are in range 0.0 to 1.0. Stroke points are mapped onto a [`stroke::Surface`] and may be in
//! pixels. Shape classification is independent of the coordinate scale.
//!
//! # Environment Variables
//!
//! * `AIRSKETCH_SAMPLE_INTERVAL_MS`: Overrides the default sampling interval (in milliseconds) of
//!   new [`scheduler::Sampler`]s. Values below 100 are raised to 100.
//! * `RUST_LOG`: Overrides the log levels set by [`init_logger!`] (see [env_logger]).
//!
//! [env_logger]: https://docs.rs/env_logger

use log::LevelFilter;

pub mod geometry;
pub mod gesture;
pub mod landmark;
pub mod scheduler;
pub mod session;
pub mod shape;
pub mod stroke;
pub mod synth;
pub mod task;
pub mod timer;

#[cfg(test)]
mod test;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and airsketch will log at *debug* level, unless overridden by `RUST_LOG`.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
