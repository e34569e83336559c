//! # Battery Stack
//!
//! Stack-level summary fields plus a fixed array of unit slots, with the
//! normality check and power figures derived from them.
//!
//! Every query recomputes from the current field values; nothing is cached
//! and nothing is mutated.

use serde::Deserialize;

use super::efficiency::estimate_ac_power;
use super::state::BaseState;
use super::unit::BatteryUnit;
use super::MAX_BATTERIES;
use crate::error::{PylonError, Result};

/// A whole installation: summary telemetry plus one slot per unit.
///
/// `battery_count` is expected to equal the number of present slots. That is
/// a contract on whoever fills the stack and is not enforced here; see
/// [`BatteryStack::has_consistent_count`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatteryStack {
    /// Number of present units
    pub battery_count: usize,

    /// Stack state of charge in percent
    pub soc: i32,

    /// Representative temperature in milli-degrees Celsius
    pub temp: i64,

    /// Net stack current in mA (negative while discharging)
    pub current_dc: i64,

    /// Representative stack voltage in mV
    pub avg_voltage: i64,

    /// Stack operating mode, may carry an alarm label
    pub base_state: BaseState,

    /// Unit slots, unused slots are absent
    pub batts: [BatteryUnit; MAX_BATTERIES],
}

impl BatteryStack {
    /// Iterate over present units together with their slot index
    pub fn present_units(&self) -> impl Iterator<Item = (usize, &BatteryUnit)> {
        self.batts
            .iter()
            .enumerate()
            .filter(|(_, unit)| unit.is_present)
    }

    /// Number of slots that actually hold a present unit
    pub fn present_count(&self) -> usize {
        self.present_units().count()
    }

    /// Whether `battery_count` agrees with the present slots
    pub fn has_consistent_count(&self) -> bool {
        self.battery_count == self.present_count()
    }

    /// True when no present unit is abnormal.
    ///
    /// Absent slots are skipped. A stack with no present units is therefore
    /// normal: there is nothing to contradict it. Callers that need to treat
    /// an empty stack differently should check [`present_count`](Self::present_count).
    pub fn is_normal(&self) -> bool {
        self.batts
            .iter()
            .all(|unit| !unit.is_present || unit.is_normal())
    }

    /// Untruncated DC power in watts
    fn power_dc_exact(&self) -> f64 {
        (self.current_dc as f64 / 1000.0) * (self.avg_voltage as f64 / 1000.0)
    }

    /// DC power in whole watts, truncated toward zero.
    ///
    /// Negative while discharging.
    ///
    /// # Examples
    ///
    /// ```
    /// use pylon_bridge::battery::stack::BatteryStack;
    ///
    /// let stack = BatteryStack {
    ///     current_dc: -5000,
    ///     avg_voltage: 50000,
    ///     ..BatteryStack::default()
    /// };
    /// assert_eq!(stack.power_dc(), -250);
    /// ```
    pub fn power_dc(&self) -> i64 {
        self.power_dc_exact() as i64
    }

    /// Charging power in watts, `0.0` unless `current_dc > 0`
    pub fn power_in(&self) -> f64 {
        if self.current_dc > 0 {
            self.power_dc_exact()
        } else {
            0.0
        }
    }

    /// Discharging power in watts as a non-negative value, `0.0` unless `current_dc < 0`
    pub fn power_out(&self) -> f64 {
        if self.current_dc < 0 {
            -self.power_dc_exact()
        } else {
            0.0
        }
    }

    /// Estimated AC-side power in whole watts.
    ///
    /// Applies the inverter efficiency table to [`power_dc`](Self::power_dc).
    pub fn est_power_ac(&self) -> i64 {
        estimate_ac_power(self.power_dc())
    }
}

/// Summary fields derived from the units when the populator does not supply them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackSummary {
    pub battery_count: usize,
    pub soc: i32,
    pub temp: i64,
    pub current_dc: i64,
    pub avg_voltage: i64,
}

impl StackSummary {
    /// Aggregate present units: count, mean SOC, mean temperature, mean
    /// voltage and summed current. Means use integer division.
    ///
    /// Sums are taken in `i128` and results saturate at the `i64` range, so
    /// out-of-range unit fields never overflow. With no present units every
    /// field is zero.
    pub fn from_units<'a, I>(units: I) -> Self
    where
        I: IntoIterator<Item = &'a BatteryUnit>,
    {
        let mut count: i128 = 0;
        let mut soc: i128 = 0;
        let mut temp: i128 = 0;
        let mut voltage: i128 = 0;
        let mut current: i128 = 0;

        for unit in units.into_iter().filter(|unit| unit.is_present) {
            count += 1;
            soc += i128::from(unit.soc);
            temp += i128::from(unit.temperature);
            voltage += i128::from(unit.voltage);
            current += i128::from(unit.current);
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            battery_count: count as usize,
            soc: (soc / count) as i32,
            temp: saturate(temp / count),
            current_dc: saturate(current),
            avg_voltage: saturate(voltage / count),
        }
    }
}

fn saturate(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Structured telemetry for one refresh cycle, as written by the populator.
///
/// Units are listed in slot order. Summary fields that are left out are
/// derived from the present units with [`StackSummary::from_units`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackSnapshot {
    #[serde(default)]
    pub battery_count: Option<usize>,

    #[serde(default)]
    pub soc: Option<i32>,

    #[serde(default)]
    pub temp: Option<i64>,

    #[serde(default)]
    pub current_dc: Option<i64>,

    #[serde(default)]
    pub avg_voltage: Option<i64>,

    #[serde(default)]
    pub base_state: BaseState,

    #[serde(default)]
    pub units: Vec<BatteryUnit>,
}

impl TryFrom<StackSnapshot> for BatteryStack {
    type Error = PylonError;

    /// # Errors
    ///
    /// Returns [`PylonError::Capacity`] if the snapshot lists more than
    /// [`MAX_BATTERIES`] units.
    fn try_from(snapshot: StackSnapshot) -> Result<Self> {
        if snapshot.units.len() > MAX_BATTERIES {
            return Err(PylonError::Capacity {
                count: snapshot.units.len(),
                max: MAX_BATTERIES,
            });
        }

        let needs_summary = snapshot.battery_count.is_none()
            || snapshot.soc.is_none()
            || snapshot.temp.is_none()
            || snapshot.current_dc.is_none()
            || snapshot.avg_voltage.is_none();

        let summary = if needs_summary {
            StackSummary::from_units(&snapshot.units)
        } else {
            StackSummary::default()
        };

        let mut stack = BatteryStack {
            battery_count: snapshot.battery_count.unwrap_or(summary.battery_count),
            soc: snapshot.soc.unwrap_or(summary.soc),
            temp: snapshot.temp.unwrap_or(summary.temp),
            current_dc: snapshot.current_dc.unwrap_or(summary.current_dc),
            avg_voltage: snapshot.avg_voltage.unwrap_or(summary.avg_voltage),
            base_state: snapshot.base_state,
            ..BatteryStack::default()
        };

        for (slot, unit) in snapshot.units.into_iter().enumerate() {
            stack.batts[slot] = unit;
        }

        Ok(stack)
    }
}
