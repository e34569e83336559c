//! # Inverter Efficiency Model
//!
//! Estimates AC-side power from DC power at the battery terminals.
//!
//! The multipliers are a calibration of the target inverter. Discharging
//! loses power on the way to the AC side (factor below 1.0), charging draws
//! extra from the AC side (factor above 1.0), and light loads carry a
//! proportionally larger overhead.
//!
//! | DC power (W)        | Factor |
//! |---------------------|--------|
//! | `< -1000`           | 0.94   |
//! | `-1000 ..= -601`    | 0.90   |
//! | `-600 ..= -1`       | 0.87   |
//! | `0`                 | -      |
//! | `1 ..= 600`         | 1.13   |
//! | `601 ..= 1000`      | 1.10   |
//! | `> 1000`            | 1.06   |
//!
//! ## Usage
//!
//! ```
//! use pylon_bridge::battery::efficiency::estimate_ac_power;
//!
//! assert_eq!(estimate_ac_power(0), 0);
//! assert_eq!(estimate_ac_power(-5000), -4700);
//! ```

/// Magnitude above which a load counts as heavy (W)
pub const HEAVY_LOAD_THRESHOLD_W: i64 = 1000;

/// Magnitude above which a load counts as moderate (W)
pub const MODERATE_LOAD_THRESHOLD_W: i64 = 600;

pub const HEAVY_DISCHARGE_FACTOR: f64 = 0.94;
pub const MODERATE_DISCHARGE_FACTOR: f64 = 0.90;
pub const LIGHT_DISCHARGE_FACTOR: f64 = 0.87;

pub const HEAVY_CHARGE_FACTOR: f64 = 1.06;
pub const MODERATE_CHARGE_FACTOR: f64 = 1.10;
pub const LIGHT_CHARGE_FACTOR: f64 = 1.13;

/// Efficiency factor for a DC power level, `None` at exactly zero.
///
/// Band edges are strict: `-1000` W is moderate discharge, `-1001` W is heavy.
pub fn efficiency_factor(power_dc_w: i64) -> Option<f64> {
    if power_dc_w == 0 {
        return None;
    }

    let factor = if power_dc_w < 0 {
        if power_dc_w < -HEAVY_LOAD_THRESHOLD_W {
            HEAVY_DISCHARGE_FACTOR
        } else if power_dc_w < -MODERATE_LOAD_THRESHOLD_W {
            MODERATE_DISCHARGE_FACTOR
        } else {
            LIGHT_DISCHARGE_FACTOR
        }
    } else if power_dc_w > HEAVY_LOAD_THRESHOLD_W {
        HEAVY_CHARGE_FACTOR
    } else if power_dc_w > MODERATE_LOAD_THRESHOLD_W {
        MODERATE_CHARGE_FACTOR
    } else {
        LIGHT_CHARGE_FACTOR
    };

    Some(factor)
}

/// Estimated AC power in whole watts, truncated toward zero.
pub fn estimate_ac_power(power_dc_w: i64) -> i64 {
    match efficiency_factor(power_dc_w) {
        Some(factor) => (power_dc_w as f64 * factor) as i64,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_power() {
        assert_eq!(efficiency_factor(0), None);
        assert_eq!(estimate_ac_power(0), 0);
    }

    #[test]
    fn test_discharge_band_edges() {
        assert_eq!(efficiency_factor(-1001), Some(0.94));
        assert_eq!(efficiency_factor(-1000), Some(0.90));
        assert_eq!(efficiency_factor(-601), Some(0.90));
        assert_eq!(efficiency_factor(-600), Some(0.87));
        assert_eq!(efficiency_factor(-1), Some(0.87));
    }

    #[test]
    fn test_charge_band_edges() {
        assert_eq!(efficiency_factor(1), Some(1.13));
        assert_eq!(efficiency_factor(600), Some(1.13));
        assert_eq!(efficiency_factor(601), Some(1.10));
        assert_eq!(efficiency_factor(1000), Some(1.10));
        assert_eq!(efficiency_factor(1001), Some(1.06));
    }

    #[test]
    fn test_estimates_at_band_edges() {
        assert_eq!(estimate_ac_power(-1001), -940); // -940.94
        assert_eq!(estimate_ac_power(-1000), (-1000.0_f64 * 0.90) as i64);
        assert_eq!(estimate_ac_power(-601), -540); // -540.9
        assert_eq!(estimate_ac_power(-600), (-600.0_f64 * 0.87) as i64);
        assert_eq!(estimate_ac_power(600), (600.0_f64 * 1.13) as i64);
        assert_eq!(estimate_ac_power(601), 661); // 661.1
        assert_eq!(estimate_ac_power(1000), (1000.0_f64 * 1.10) as i64);
        assert_eq!(estimate_ac_power(1001), 1061); // 1061.06
    }

    #[test]
    fn test_estimate_truncates_toward_zero() {
        // -57 * 0.87 = -49.59
        assert_eq!(estimate_ac_power(-57), -49);
        // 57 * 1.13 = 64.41
        assert_eq!(estimate_ac_power(57), 64);
        // -1 * 0.87 = -0.87
        assert_eq!(estimate_ac_power(-1), 0);
    }

    #[test]
    fn test_sign_is_preserved() {
        for power in [-5000, -800, -100, 100, 800, 5000] {
            let ac = estimate_ac_power(power);
            assert_eq!(ac.signum(), power.signum(), "Sign flipped for {} W", power);
        }
    }

    #[test]
    fn test_discharge_loses_and_charge_gains() {
        for power in [-5000_i64, -800, -300] {
            assert!(estimate_ac_power(power).abs() < power.abs());
        }
        for power in [300_i64, 800, 5000] {
            assert!(estimate_ac_power(power) > power);
        }
    }
}
