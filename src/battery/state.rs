//! # Battery State Labels
//!
//! Operating-mode and health labels reported by the battery console.
//!
//! Labels are matched exactly and case-sensitively. Anything that is not one
//! of the known spellings becomes the `Other` variant, keeping the received
//! text so it can still be published verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label for the charging mode
pub const LABEL_CHARGE: &str = "Charge";

/// Label for the discharging mode
pub const LABEL_DISCHARGE: &str = "Dischg";

/// Label for the idle mode
pub const LABEL_IDLE: &str = "Idle";

/// Label for the cell balancing mode
pub const LABEL_BALANCE: &str = "Balance";

/// The only healthy value of a secondary state field
pub const LABEL_NORMAL: &str = "Normal";

/// Primary operating mode of a unit or of the whole stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BaseState {
    /// `Charge`
    Charge,
    /// `Dischg`
    Dischg,
    /// `Idle`
    Idle,
    /// `Balance`
    Balance,
    /// Any other label, e.g. an alarm such as `Alarm!`
    Other(String),
}

impl BaseState {
    /// Parse a console label. Never fails; unknown labels map to `Other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pylon_bridge::battery::state::BaseState;
    ///
    /// assert_eq!(BaseState::from_label("Dischg"), BaseState::Dischg);
    /// assert_eq!(BaseState::from_label("dischg"), BaseState::Other("dischg".to_string()));
    /// ```
    pub fn from_label(label: &str) -> Self {
        match label {
            LABEL_CHARGE => BaseState::Charge,
            LABEL_DISCHARGE => BaseState::Dischg,
            LABEL_IDLE => BaseState::Idle,
            LABEL_BALANCE => BaseState::Balance,
            other => BaseState::Other(other.to_string()),
        }
    }

    /// The label as reported by the console
    pub fn as_label(&self) -> &str {
        match self {
            BaseState::Charge => LABEL_CHARGE,
            BaseState::Dischg => LABEL_DISCHARGE,
            BaseState::Idle => LABEL_IDLE,
            BaseState::Balance => LABEL_BALANCE,
            BaseState::Other(label) => label,
        }
    }

    /// True for the four recognised operating modes
    pub fn is_operational(&self) -> bool {
        !matches!(self, BaseState::Other(_))
    }
}

impl Default for BaseState {
    fn default() -> Self {
        BaseState::Other(String::new())
    }
}

impl From<String> for BaseState {
    fn from(label: String) -> Self {
        match label.as_str() {
            LABEL_CHARGE | LABEL_DISCHARGE | LABEL_IDLE | LABEL_BALANCE => {
                BaseState::from_label(&label)
            }
            _ => BaseState::Other(label),
        }
    }
}

impl From<&str> for BaseState {
    fn from(label: &str) -> Self {
        BaseState::from_label(label)
    }
}

impl From<BaseState> for String {
    fn from(state: BaseState) -> Self {
        match state {
            BaseState::Other(label) => label,
            known => known.as_label().to_string(),
        }
    }
}

impl fmt::Display for BaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Health of one secondary category (voltage, current, temperature, balance).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HealthState {
    /// `Normal`
    Normal,
    /// Any warning or fault label
    Other(String),
}

impl HealthState {
    /// Parse a console label. Only the exact text `Normal` is healthy.
    pub fn from_label(label: &str) -> Self {
        if label == LABEL_NORMAL {
            HealthState::Normal
        } else {
            HealthState::Other(label.to_string())
        }
    }

    /// The label as reported by the console
    pub fn as_label(&self) -> &str {
        match self {
            HealthState::Normal => LABEL_NORMAL,
            HealthState::Other(label) => label,
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, HealthState::Normal)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        HealthState::Other(String::new())
    }
}

impl From<String> for HealthState {
    fn from(label: String) -> Self {
        if label == LABEL_NORMAL {
            HealthState::Normal
        } else {
            HealthState::Other(label)
        }
    }
}

impl From<&str> for HealthState {
    fn from(label: &str) -> Self {
        HealthState::from_label(label)
    }
}

impl From<HealthState> for String {
    fn from(state: HealthState) -> Self {
        match state {
            HealthState::Normal => LABEL_NORMAL.to_string(),
            HealthState::Other(label) => label,
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
