//! # Battery Module
//!
//! Data model for a Pylontech battery stack and the values derived from it.
//!
//! This module handles:
//! - Operating-mode and health labels of each unit
//! - Per-unit normality classification
//! - Stack-level normality aggregation over present units
//! - DC power and inverter-corrected AC power estimates
//!
//! Everything here is pure computation over already-populated values.

pub mod state;
pub mod unit;
pub mod stack;
pub mod efficiency;

/// Maximum number of units one stack can report
pub const MAX_BATTERIES: usize = 16;
