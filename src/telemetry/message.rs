//! # Telemetry Messages
//!
//! Maps the stack's raw and derived values onto a topic tree.
//!
//! Stack topics sit directly under the configured root (`<root>soc`,
//! `<root>powerDC`, ...). With per-battery publishing enabled every present
//! unit adds a `<root>battery_<slot>/...` subtree.

use crate::battery::stack::BatteryStack;
use crate::battery::unit::BatteryUnit;
use crate::config::PublishConfig;

/// One topic/payload pair ready to hand to a [`Publisher`](super::publisher::Publisher)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryMessage {
    pub topic: String,
    pub payload: String,
}

impl TelemetryMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Reals are published with two decimals
fn format_watts(value: f64) -> String {
    format!("{:.2}", value)
}

/// Build every message for one publish cycle.
///
/// # Examples
///
/// ```
/// use pylon_bridge::battery::stack::BatteryStack;
/// use pylon_bridge::config::PublishConfig;
/// use pylon_bridge::telemetry::message::build_messages;
///
/// let stack = BatteryStack { current_dc: -5000, avg_voltage: 50000, ..BatteryStack::default() };
/// let messages = build_messages(&stack, &PublishConfig::default());
///
/// let power = messages.iter().find(|m| m.topic.ends_with("/powerDC")).unwrap();
/// assert_eq!(power.payload, "-250");
/// ```
pub fn build_messages(stack: &BatteryStack, config: &PublishConfig) -> Vec<TelemetryMessage> {
    let root = config.topic_root.as_str();

    let mut messages = vec![
        TelemetryMessage::new(format!("{}soc", root), stack.soc.to_string()),
        TelemetryMessage::new(format!("{}temp", root), stack.temp.to_string()),
        TelemetryMessage::new(format!("{}currentDC", root), stack.current_dc.to_string()),
        TelemetryMessage::new(format!("{}avgVoltage", root), stack.avg_voltage.to_string()),
        TelemetryMessage::new(format!("{}baseState", root), stack.base_state.to_string()),
        TelemetryMessage::new(format!("{}batteryCount", root), stack.battery_count.to_string()),
        TelemetryMessage::new(format!("{}isNormal", root), stack.is_normal().to_string()),
        TelemetryMessage::new(format!("{}powerDC", root), stack.power_dc().to_string()),
        TelemetryMessage::new(format!("{}powerIN", root), format_watts(stack.power_in())),
        TelemetryMessage::new(format!("{}powerOUT", root), format_watts(stack.power_out())),
        TelemetryMessage::new(format!("{}estPowerAC", root), stack.est_power_ac().to_string()),
    ];

    if config.per_battery {
        for (slot, unit) in stack.present_units() {
            messages.extend(unit_messages(root, slot, unit));
        }
    }

    messages
}

fn unit_messages(root: &str, slot: usize, unit: &BatteryUnit) -> Vec<TelemetryMessage> {
    let prefix = format!("{}battery_{}/", root, slot);

    [
        ("soc", unit.soc.to_string()),
        ("voltage", unit.voltage.to_string()),
        ("current", unit.current.to_string()),
        ("temp", unit.temperature.to_string()),
        ("cellTempLow", unit.cell_temp_low.to_string()),
        ("cellTempHigh", unit.cell_temp_high.to_string()),
        ("cellVoltLow", unit.cell_volt_low.to_string()),
        ("cellVoltHigh", unit.cell_volt_high.to_string()),
        ("baseState", unit.base_state.to_string()),
        ("isNormal", unit.is_normal().to_string()),
        ("time", unit.time.clone()),
    ]
    .into_iter()
    .map(|(name, payload)| TelemetryMessage::new(format!("{}{}", prefix, name), payload))
    .collect()
}
