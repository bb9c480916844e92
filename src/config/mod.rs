//! Configuration handling
//!
//! Typed schema for the signal controller plus a YAML file loader.

pub mod loader;
pub mod schema;

pub use loader::load;
pub use schema::{CycleConfig, CycleDraw, SignalConfig};
