//! # Battery Unit
//!
//! Telemetry of a single battery module as reported by the console.

use serde::Deserialize;

use super::state::{BaseState, HealthState};

/// One battery unit's measured fields and per-category states.
///
/// Records are overwritten every refresh cycle by whatever populates the
/// stack; nothing here mutates them. A record with `is_present == false`
/// carries no meaningful measurement and is ignored by stack aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatteryUnit {
    /// Unit reported data (console did not say "Absent")
    pub is_present: bool,

    /// State of charge in percent (0-100, not enforced)
    pub soc: i32,

    /// Terminal voltage in mV
    pub voltage: i64,

    /// Current in mA (negative while discharging)
    pub current: i64,

    /// Primary temperature sensor in milli-degrees Celsius
    pub temperature: i64,

    /// Lowest cell temperature in milli-degrees Celsius
    pub cell_temp_low: i64,

    /// Highest cell temperature in milli-degrees Celsius
    pub cell_temp_high: i64,

    /// Lowest cell voltage in mV
    pub cell_volt_low: i64,

    /// Highest cell voltage in mV
    pub cell_volt_high: i64,

    /// Operating mode
    pub base_state: BaseState,

    pub voltage_state: HealthState,
    pub current_state: HealthState,
    pub temp_state: HealthState,

    /// Balanced-voltage state
    pub balance_voltage_state: HealthState,

    /// Balanced-temperature state
    pub balance_temp_state: HealthState,

    /// Console timestamp, passed through untouched
    pub time: String,
}

impl BatteryUnit {
    /// Create a present unit in the given mode with every health state `Normal`.
    ///
    /// Measurements start at zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use pylon_bridge::battery::state::BaseState;
    /// use pylon_bridge::battery::unit::BatteryUnit;
    ///
    /// let unit = BatteryUnit::healthy(BaseState::Idle);
    /// assert!(unit.is_present);
    /// assert!(unit.is_normal());
    /// ```
    pub fn healthy(base_state: BaseState) -> Self {
        Self {
            is_present: true,
            base_state,
            voltage_state: HealthState::Normal,
            current_state: HealthState::Normal,
            temp_state: HealthState::Normal,
            balance_voltage_state: HealthState::Normal,
            balance_temp_state: HealthState::Normal,
            ..Self::default()
        }
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.base_state, BaseState::Charge)
    }

    pub fn is_discharging(&self) -> bool {
        matches!(self.base_state, BaseState::Dischg)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.base_state, BaseState::Idle)
    }

    pub fn is_balancing(&self) -> bool {
        matches!(self.base_state, BaseState::Balance)
    }

    /// Health states in console order: voltage, current, temperature,
    /// balanced voltage, balanced temperature.
    pub fn health_states(&self) -> [&HealthState; 5] {
        [
            &self.voltage_state,
            &self.current_state,
            &self.temp_state,
            &self.balance_voltage_state,
            &self.balance_temp_state,
        ]
    }

    /// Whether the unit is in a recognised mode with all five health states `Normal`.
    ///
    /// An unrecognised mode (for example an alarm label) is never normal,
    /// whatever the health states say.
    pub fn is_normal(&self) -> bool {
        if !self.base_state.is_operational() {
            return false;
        }

        self.health_states().iter().all(|state| state.is_normal())
    }
}
