//! Phase controller
//!
//! Owns the canonical signal phase, runs the randomized toggling activity
//! on a background thread, and lets consumers block until green.
//!
//! # Architecture
//!
//! - [`PhaseController`]: phase cell, handoff queue, toggler lifecycle
//! - [`CycleClock`]: randomized cycle durations
//! - [`StopSignal`]: cancellation the toggler sleeps on

pub mod cancel;
pub mod cycle;
pub mod engine;

pub use cancel::StopSignal;
pub use cycle::CycleClock;
pub use engine::PhaseController;
