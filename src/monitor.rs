//! # Monitor
//!
//! One read, derive and publish pass over the battery stack.

use tracing::{debug, warn};

use crate::battery::stack::BatteryStack;
use crate::config::PublishConfig;
use crate::error::Result;
use crate::source::StackSource;
use crate::telemetry::message::build_messages;
use crate::telemetry::publisher::Publisher;

/// Drives a [`StackSource`] and a [`Publisher`] one cycle at a time.
///
/// Each cycle works on a freshly read stack, so a publish never observes a
/// half-populated one.
pub struct Monitor<S: StackSource, P: Publisher> {
    source: S,
    publisher: P,
    config: PublishConfig,
    cycles: u64,
}

impl<S: StackSource, P: Publisher> std::fmt::Debug for Monitor<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("topic_root", &self.config.topic_root)
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}

impl<S: StackSource, P: Publisher> Monitor<S, P> {
    pub fn new(source: S, publisher: P, config: PublishConfig) -> Self {
        Self {
            source,
            publisher,
            config,
            cycles: 0,
        }
    }

    /// Number of cycles that completed successfully
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run a single cycle
    ///
    /// # Returns
    ///
    /// * `Result<usize>` - Number of messages published
    ///
    /// # Errors
    ///
    /// Returns error if the stack cannot be read or a message cannot be
    /// published. Nothing is published when reading fails.
    pub async fn run_cycle(&mut self) -> Result<usize> {
        let stack = self.source.read_stack()?;
        check_contracts(&stack);

        debug!(
            "Stack: {} W DC, {} W AC est., in {:.2} W, out {:.2} W, normal={}",
            stack.power_dc(),
            stack.est_power_ac(),
            stack.power_in(),
            stack.power_out(),
            stack.is_normal()
        );

        let messages = build_messages(&stack, &self.config);
        for message in &messages {
            self.publisher.publish(message).await?;
        }
        self.publisher.flush().await?;

        self.cycles += 1;
        debug!("Published {} messages (cycle {})", messages.len(), self.cycles);
        Ok(messages.len())
    }
}

/// Log populator contract violations without rejecting the stack
fn check_contracts(stack: &BatteryStack) {
    let present = stack.present_count();

    if !stack.has_consistent_count() {
        warn!(
            "battery_count is {} but {} slots are present",
            stack.battery_count, present
        );
    }

    if present == 0 {
        warn!("No units present, stack normality is vacuous");
    }
}
