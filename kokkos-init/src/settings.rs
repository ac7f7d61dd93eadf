//! Initialization settings record
//!
//! Every field is either unset or holds exactly one value. The resolvers
//! fill the record in precedence order; once resolution is done consumers
//! only read it through the `has_*`/`get_*` accessors.

use std::fmt;

use crate::error::{InitError, Result};

/// Resolved startup parameters for the runtime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializationSettings {
    num_threads: Option<i32>,
    device_id: Option<i32>,
    num_devices: Option<i32>,
    skip_device: Option<i32>,
    disable_warnings: Option<bool>,
    tune_internals: Option<bool>,
    visible_devices: Option<Vec<i32>>,
}

/// Generates the presence check, getter, setter and builder for a `Copy` field
macro_rules! copy_field {
    ($field:ident: $ty:ty, $has:ident, $get:ident, $set:ident, $with:ident) => {
        #[doc = concat!("Check whether `", stringify!($field), "` holds a value")]
        pub fn $has(&self) -> bool {
            self.$field.is_some()
        }

        #[doc = concat!("Get `", stringify!($field), "`, failing if it is unset")]
        pub fn $get(&self) -> Result<$ty> {
            self.$field.ok_or(InitError::Unset {
                field: stringify!($field),
            })
        }

        #[doc = concat!("Set `", stringify!($field), "`, replacing any previous value")]
        pub fn $set(&mut self, value: $ty) -> &mut Self {
            self.$field = Some(value);
            self
        }

        #[doc = concat!("Builder form of `", stringify!($set), "`")]
        pub fn $with(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

impl InitializationSettings {
    /// Create an empty record with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    copy_field!(num_threads: i32, has_num_threads, get_num_threads, set_num_threads, with_num_threads);
    copy_field!(device_id: i32, has_device_id, get_device_id, set_device_id, with_device_id);
    copy_field!(num_devices: i32, has_num_devices, get_num_devices, set_num_devices, with_num_devices);
    copy_field!(skip_device: i32, has_skip_device, get_skip_device, set_skip_device, with_skip_device);
    copy_field!(
        disable_warnings: bool,
        has_disable_warnings,
        get_disable_warnings,
        set_disable_warnings,
        with_disable_warnings
    );
    copy_field!(
        tune_internals: bool,
        has_tune_internals,
        get_tune_internals,
        set_tune_internals,
        with_tune_internals
    );

    /// Check whether an explicit visible-device list was given
    pub fn has_visible_devices(&self) -> bool {
        self.visible_devices.is_some()
    }

    /// Get the explicit visible-device list, failing if it is unset
    pub fn get_visible_devices(&self) -> Result<&[i32]> {
        self.visible_devices
            .as_deref()
            .ok_or(InitError::Unset {
                field: "visible_devices",
            })
    }

    /// Set the explicit visible-device list
    pub fn set_visible_devices(&mut self, devices: Vec<i32>) -> &mut Self {
        self.visible_devices = Some(devices);
        self
    }

    /// Builder form of `set_visible_devices`
    pub fn with_visible_devices(mut self, devices: Vec<i32>) -> Self {
        self.visible_devices = Some(devices);
        self
    }

    /// Number of threads to run with, defaulting to the logical core count
    pub fn num_threads_or_default(&self) -> i32 {
        self.num_threads
            .unwrap_or_else(|| i32::try_from(num_cpus::get()).unwrap_or(i32::MAX))
    }

    /// Whether warnings should be suppressed (unset means no)
    pub fn warnings_disabled(&self) -> bool {
        self.disable_warnings.unwrap_or(false)
    }
}

impl fmt::Display for InitializationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show<T: fmt::Debug>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map_or_else(|| "unset".to_string(), |v| format!("{v:?}"))
        }

        writeln!(f, "num_threads: {}", show(&self.num_threads))?;
        writeln!(f, "device_id: {}", show(&self.device_id))?;
        writeln!(f, "num_devices: {}", show(&self.num_devices))?;
        writeln!(f, "skip_device: {}", show(&self.skip_device))?;
        writeln!(f, "disable_warnings: {}", show(&self.disable_warnings))?;
        writeln!(f, "tune_internals: {}", show(&self.tune_internals))?;
        write!(f, "visible_devices: {}", show(&self.visible_devices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_settings_are_unset() {
        let settings = InitializationSettings::new();
        assert!(!settings.has_num_threads());
        assert!(!settings.has_device_id());
        assert!(!settings.has_num_devices());
        assert!(!settings.has_skip_device());
        assert!(!settings.has_disable_warnings());
        assert!(!settings.has_tune_internals());
        assert!(!settings.has_visible_devices());
    }

    #[test]
    fn test_getter_on_unset_field_fails() {
        let settings = InitializationSettings::new();
        match settings.get_device_id() {
            Err(InitError::Unset { field }) => assert_eq!(field, "device_id"),
            other => panic!("expected Unset error, got {other:?}"),
        }
        assert!(matches!(
            settings.get_visible_devices(),
            Err(InitError::Unset {
                field: "visible_devices"
            })
        ));
    }

    #[test]
    fn test_set_overwrites() {
        let mut settings = InitializationSettings::new();
        settings.set_num_threads(1).set_num_threads(2);
        assert_eq!(settings.get_num_threads().unwrap(), 2);

        settings.set_tune_internals(true);
        settings.set_tune_internals(false);
        assert!(settings.has_tune_internals());
        assert!(!settings.get_tune_internals().unwrap());
    }

    #[test]
    fn test_builder() {
        let settings = InitializationSettings::new()
            .with_num_devices(4)
            .with_skip_device(1)
            .with_visible_devices(vec![2, 1]);
        assert_eq!(settings.get_num_devices().unwrap(), 4);
        assert_eq!(settings.get_skip_device().unwrap(), 1);
        assert_eq!(settings.get_visible_devices().unwrap(), &[2, 1]);
    }

    #[test]
    fn test_defaults() {
        let settings = InitializationSettings::new();
        assert!(settings.num_threads_or_default() >= 1);
        assert!(!settings.warnings_disabled());

        let settings = settings.with_num_threads(3).with_disable_warnings(true);
        assert_eq!(settings.num_threads_or_default(), 3);
        assert!(settings.warnings_disabled());
    }

    #[test]
    fn test_display() {
        let settings = InitializationSettings::new().with_device_id(2);
        let text = settings.to_string();
        assert!(text.contains("device_id: 2"));
        assert!(text.contains("num_threads: unset"));
        assert_eq!(text.lines().count(), 7);
    }
}
