//! Visible device computation
//!
//! Turns the resolved settings and the hardware device count into the
//! ordered list of device indices the runtime may use.

use crate::error::{InitError, Result};
use crate::settings::InitializationSettings;

/// Compute the devices visible to this process.
///
/// An explicit `visible_devices` list is returned as is and overrides
/// `num_devices` and `skip_device`. Otherwise the range `0..num_devices`
/// (or `0..hw_count` when `num_devices` is unset) is used, minus
/// `skip_device` if given. Explicit indices are not checked against
/// `hw_count`.
pub fn get_visible_devices(settings: &InitializationSettings, hw_count: i32) -> Vec<i32> {
    let devices = match settings.get_visible_devices() {
        Ok(explicit) => explicit.to_vec(),
        Err(_) => {
            let count = settings.get_num_devices().unwrap_or(hw_count);
            let skip = settings.get_skip_device().ok();
            (0..count).filter(|&dev| Some(dev) != skip).collect()
        }
    };
    tracing::info!("Visible devices: {:?}", devices);
    devices
}

/// Pick the device the runtime binds to.
///
/// `device_id` wins when set and must be one of `visible`; otherwise the
/// first visible device is used.
pub fn select_device(settings: &InitializationSettings, visible: &[i32]) -> Result<i32> {
    match settings.get_device_id() {
        Ok(device_id) if visible.contains(&device_id) => Ok(device_id),
        Ok(device_id) => Err(InitError::DeviceNotVisible {
            device_id,
            visible: visible.to_vec(),
        }),
        Err(_) => visible.first().copied().ok_or(InitError::NoVisibleDevices),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_list_wins() {
        let settings = InitializationSettings::new()
            .with_visible_devices(vec![2, 1])
            .with_num_devices(8)
            .with_skip_device(1);
        assert_eq!(get_visible_devices(&settings, 6), vec![2, 1]);

        let settings = InitializationSettings::new()
            .with_visible_devices(vec![2, 1])
            .with_num_devices(8);
        assert_eq!(get_visible_devices(&settings, 6), vec![2, 1]);

        let settings = InitializationSettings::new()
            .with_visible_devices(vec![2, 1])
            .with_skip_device(1);
        assert_eq!(get_visible_devices(&settings, 6), vec![2, 1]);

        let settings = InitializationSettings::new().with_visible_devices(vec![1, 3, 4]);
        assert_eq!(get_visible_devices(&settings, 6), vec![1, 3, 4]);
    }

    #[test]
    fn test_num_devices_limits_range() {
        let settings = InitializationSettings::new().with_num_devices(3);
        assert_eq!(get_visible_devices(&settings, 6), vec![0, 1, 2]);
    }

    #[test]
    fn test_skip_device() {
        let settings = InitializationSettings::new()
            .with_num_devices(4)
            .with_skip_device(1);
        assert_eq!(get_visible_devices(&settings, 6), vec![0, 2, 3]);

        // Out of range skip index removes nothing
        let settings = InitializationSettings::new().with_skip_device(9);
        assert_eq!(get_visible_devices(&settings, 3), vec![0, 1, 2]);
    }

    #[test]
    fn test_defaults_to_hardware_count() {
        let settings = InitializationSettings::new();
        assert_eq!(get_visible_devices(&settings, 4), vec![0, 1, 2, 3]);
        assert!(get_visible_devices(&settings, 0).is_empty());
    }

    #[test]
    fn test_explicit_list_not_bounds_checked() {
        let settings = InitializationSettings::new().with_visible_devices(vec![7, 0]);
        assert_eq!(get_visible_devices(&settings, 2), vec![7, 0]);
    }

    #[test]
    fn test_select_device() {
        let settings = InitializationSettings::new();
        assert_eq!(select_device(&settings, &[2, 1]).unwrap(), 2);
        assert!(matches!(
            select_device(&settings, &[]),
            Err(InitError::NoVisibleDevices)
        ));

        let settings = settings.with_device_id(1);
        assert_eq!(select_device(&settings, &[2, 1]).unwrap(), 1);
        assert!(matches!(
            select_device(&settings, &[0, 2]),
            Err(InitError::DeviceNotVisible { device_id: 1, .. })
        ));
    }
}
