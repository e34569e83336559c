//! # Snapshot Source Module
//!
//! Supplies a freshly populated [`BatteryStack`] each refresh cycle.
//!
//! Decoding the console protocol happens elsewhere; sources here receive
//! values that are already structured.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::battery::stack::{BatteryStack, StackSnapshot};
use crate::error::Result;

/// Anything that can hand out the current state of the stack
#[cfg_attr(test, mockall::automock)]
pub trait StackSource: Send {
    /// Read the current stack
    fn read_stack(&mut self) -> Result<BatteryStack>;
}

/// Reads a JSON [`StackSnapshot`] from a file on every call.
///
/// The external reader is expected to rewrite the file once per cycle.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StackSource for JsonFileSource {
    /// # Errors
    ///
    /// Returns error if:
    /// - The file cannot be read
    /// - The JSON is malformed
    /// - The snapshot lists more units than the stack can hold
    fn read_stack(&mut self) -> Result<BatteryStack> {
        let contents = fs::read_to_string(&self.path)?;
        let snapshot: StackSnapshot = serde_json::from_str(&contents)?;
        let stack = BatteryStack::try_from(snapshot)?;

        debug!(
            "Loaded stack snapshot from {} ({} units present)",
            self.path.display(),
            stack.present_count()
        );
        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::MAX_BATTERIES;
    use crate::error::PylonError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_snapshot(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_read_stack_from_file() {
        let temp_file = write_snapshot(
            r#"{
                "current_dc": -1200,
                "avg_voltage": 48000,
                "base_state": "Dischg",
                "units": [
                    { "is_present": true, "base_state": "Dischg",
                      "voltage_state": "Normal", "current_state": "Normal",
                      "temp_state": "Normal", "balance_voltage_state": "Normal",
                      "balance_temp_state": "Normal" }
                ]
            }"#,
        );

        let mut source = JsonFileSource::new(temp_file.path());
        let stack = source.read_stack().unwrap();

        assert_eq!(stack.battery_count, 1);
        assert_eq!(stack.power_dc(), -57);
        assert!(stack.is_normal());
    }

    #[test]
    fn test_file_is_reread_each_call() {
        let temp_file = write_snapshot(r#"{ "current_dc": 1000, "avg_voltage": 50000 }"#);
        let mut source = JsonFileSource::new(temp_file.path());
        assert_eq!(source.read_stack().unwrap().power_dc(), 50);

        std::fs::write(temp_file.path(), r#"{ "current_dc": 2000, "avg_voltage": 50000 }"#).unwrap();
        assert_eq!(source.read_stack().unwrap().power_dc(), 100);
    }

    #[test]
    fn test_missing_file() {
        let mut source = JsonFileSource::new("/nonexistent/stack.json");
        assert!(matches!(source.read_stack(), Err(PylonError::Io(_))));
    }

    #[test]
    fn test_malformed_json() {
        let temp_file = write_snapshot("{ \"units\": [ ");
        let mut source = JsonFileSource::new(temp_file.path());
        assert!(matches!(source.read_stack(), Err(PylonError::Snapshot(_))));
    }

    #[test]
    fn test_too_many_units() {
        let units = vec!["{}"; MAX_BATTERIES + 1].join(",");
        let temp_file = write_snapshot(&format!("{{ \"units\": [{}] }}", units));
        let mut source = JsonFileSource::new(temp_file.path());
        assert!(matches!(source.read_stack(), Err(PylonError::Capacity { .. })));
    }

    #[test]
    fn test_shipped_example_snapshot() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/stack.example.json");
        let stack = JsonFileSource::new(path).read_stack().unwrap();

        assert_eq!(stack.battery_count, 2);
        assert_eq!(stack.current_dc, -2830);
        assert_eq!(stack.avg_voltage, 49600);
        assert_eq!(stack.soc, 77);
        assert!(stack.is_normal());
        assert!(stack.power_out() > 0.0);
        assert_eq!(stack.power_in(), 0.0);
    }

    #[test]
    fn test_path_accessor() {
        let source = JsonFileSource::new("/tmp/stack.json");
        assert_eq!(source.path(), Path::new("/tmp/stack.json"));
    }
}
