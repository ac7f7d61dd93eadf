//! Errors raised while resolving initialization settings.

use thiserror::Error;

use crate::parse::ParseError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InitError>;

/// Error raised by the resolvers, the settings accessors and device selection
#[derive(Debug, Error)]
pub enum InitError {
    /// A value that should be an integer has no numeric prefix
    #[error("invalid integer '{value}' for {source_name}")]
    InvalidInteger {
        /// Flag or environment variable that carried the value
        source_name: String,
        /// The offending value
        value: String,
    },

    /// A comma-separated integer list is malformed
    #[error("invalid integer list '{value}' for {source_name}")]
    InvalidIntegerList {
        /// Flag or environment variable that carried the value
        source_name: String,
        /// The offending value
        value: String,
    },

    /// A boolean value is not one of 1/true/yes or 0/false/no
    #[error("invalid boolean '{value}' for {source_name} (expected one of 1, true, yes, 0, false, no)")]
    InvalidBoolean {
        /// Flag or environment variable that carried the value
        source_name: String,
        /// The offending value
        value: String,
    },

    /// An integer option was given without `=<value>`
    #[error("missing value for {option}, expected {option}=<int>")]
    MissingValue {
        /// The bare option
        option: String,
    },

    /// A getter was called on a field that holds no value
    #[error("setting '{field}' is not set")]
    Unset {
        /// Name of the field
        field: &'static str,
    },

    /// The requested device id is not among the visible devices
    #[error("device id {device_id} is not one of the visible devices {visible:?}")]
    DeviceNotVisible {
        /// Requested device
        device_id: i32,
        /// Devices the process may use
        visible: Vec<i32>,
    },

    /// Device selection was attempted with an empty device list
    #[error("no visible devices to select from")]
    NoVisibleDevices,

    /// Writing the help text failed
    #[error("failed to write help text: {0}")]
    Io(#[from] std::io::Error),
}

impl InitError {
    /// Attach the flag or variable name to a value-level parse failure
    pub(crate) fn from_parse(err: ParseError, source_name: &str, value: &str) -> Self {
        let source_name = source_name.to_string();
        let value = value.to_string();
        match err {
            ParseError::Integer => Self::InvalidInteger { source_name, value },
            ParseError::IntegerList => Self::InvalidIntegerList { source_name, value },
            ParseError::Boolean => Self::InvalidBoolean { source_name, value },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_source() {
        let err = InitError::InvalidInteger {
            source_name: "KOKKOS_NUM_THREADS".to_string(),
            value: "ABC".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("KOKKOS_NUM_THREADS"));
        assert!(msg.contains("ABC"));

        let err = InitError::MissingValue {
            option: "--kokkos-device-id".to_string(),
        };
        assert!(err.to_string().contains("--kokkos-device-id=<int>"));
    }

    #[test]
    fn test_from_parse_keeps_kind() {
        let err = InitError::from_parse(ParseError::Boolean, "KOKKOS_TUNE_INTERNALS", "on");
        assert!(matches!(err, InitError::InvalidBoolean { .. }));
        let err = InitError::from_parse(ParseError::IntegerList, "KOKKOS_VISIBLE_DEVICES", "1,");
        assert!(matches!(err, InitError::InvalidIntegerList { .. }));
    }
}
