//! Core numerics for airsoft safety tables.
//!
//! Covers the quadratic-drag decay model, the per-cell muzzle velocity solver,
//! energy recovery and table comparison, and drag-coefficient estimation from
//! chronograph series. Nothing in this crate touches the file system.

pub mod estimation;
pub mod math;
pub mod physics;
pub mod prelude;
pub mod presets;
pub mod tables;
pub mod telemetry;

pub use prelude::{AirProperties, DragConstant, SafetyError, SafetyResult};
