//! # Pylon Bridge Library
//!
//! Aggregate Pylontech battery stack telemetry and publish derived metrics.
//!
//! This library provides the battery stack model (unit classification, stack
//! normality, DC power and estimated AC power) together with the plumbing that
//! reads structured snapshots and publishes the derived values.

pub mod config;
pub mod error;
pub mod battery;
pub mod source;
pub mod telemetry;
pub mod monitor;
