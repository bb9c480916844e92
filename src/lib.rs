//! `signalbox` - blocking handoff queue and two-phase signal controller
//!
//! This library provides a condition-variable backed handoff queue and a
//! traffic-signal style [`PhaseController`] that toggles between red and
//! green on a background thread at randomized intervals.

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod observability;
pub mod phase;
pub mod queue;

pub use config::{CycleDraw, SignalConfig};
pub use controller::PhaseController;
pub use error::{ConfigError, SignalError};
pub use phase::Phase;
pub use queue::{DeliveryPolicy, HandoffQueue};
