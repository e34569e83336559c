//! # Telemetry Module
//!
//! Turns a populated battery stack into publishable messages.
//!
//! This module handles:
//! - Mapping stack and per-unit values onto topics under a configurable root
//! - Formatting payloads as plain text
//! - Handing messages to a publisher (JSON lines by default)
//!
//! Broker connections are not handled here; a broker client only needs to
//! implement [`publisher::Publisher`].

pub mod message;
pub mod publisher;
