//! Environment variable resolution
//!
//! Fills the settings fields that the command line left unset. The
//! environment is only ever read, through an [`EnvSource`], so tests can
//! substitute a plain map for the process environment.

use std::collections::{BTreeMap, HashMap};

use crate::error::{InitError, Result};
use crate::parse::{self, ParseError};
use crate::settings::InitializationSettings;

/// Number of host threads
pub const KOKKOS_NUM_THREADS: &str = "KOKKOS_NUM_THREADS";
/// Device to bind to
pub const KOKKOS_DEVICE_ID: &str = "KOKKOS_DEVICE_ID";
/// Number of devices to consider
pub const KOKKOS_NUM_DEVICES: &str = "KOKKOS_NUM_DEVICES";
/// Device index excluded from the default range
pub const KOKKOS_SKIP_DEVICE: &str = "KOKKOS_SKIP_DEVICE";
/// Boolean, suppresses warnings
pub const KOKKOS_DISABLE_WARNINGS: &str = "KOKKOS_DISABLE_WARNINGS";
/// Boolean, enables autotuning of internals
pub const KOKKOS_TUNE_INTERNALS: &str = "KOKKOS_TUNE_INTERNALS";
/// Explicit comma-separated device list
pub const KOKKOS_VISIBLE_DEVICES: &str = "KOKKOS_VISIBLE_DEVICES";

/// All variables consulted, in resolution order
pub const RECOGNIZED_VARIABLES: [&str; 7] = [
    KOKKOS_NUM_THREADS,
    KOKKOS_DEVICE_ID,
    KOKKOS_NUM_DEVICES,
    KOKKOS_SKIP_DEVICE,
    KOKKOS_DISABLE_WARNINGS,
    KOKKOS_TUNE_INTERNALS,
    KOKKOS_VISIBLE_DEVICES,
];

/// Read-only key/value lookup standing in for the process environment
pub trait EnvSource {
    /// Value of `name`, or `None` when it is not defined
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        // Non-unicode values are kept so that they fail parsing instead of
        // looking absent
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Read and parse `name`; `Ok(None)` when the variable is absent
fn read<E, T, P>(env: &E, name: &str, parser: P) -> Result<Option<T>>
where
    E: EnvSource + ?Sized,
    P: FnOnce(&str) -> std::result::Result<T, ParseError>,
{
    match env.var(name) {
        None => Ok(None),
        Some(value) => parser(value.as_str())
            .map(Some)
            .map_err(|e| InitError::from_parse(e, name, &value)),
    }
}

/// Apply `value` through `set` unless `is_set` reports the field is taken
fn apply<T, H, S>(
    settings: &mut InitializationSettings,
    name: &str,
    value: Option<T>,
    is_set: H,
    set: S,
) where
    H: Fn(&InitializationSettings) -> bool,
    S: FnOnce(&mut InitializationSettings, T),
{
    let Some(value) = value else {
        return;
    };
    if is_set(settings) {
        tracing::debug!(
            "Ignoring environment variable {} since the command line takes precedence",
            name
        );
    } else {
        tracing::debug!("Applying environment variable {}", name);
        set(settings, value);
    }
}

/// Resolve the recognized variables from the process environment
pub fn parse_environment_variables(settings: &mut InitializationSettings) -> Result<()> {
    parse_environment_variables_from(settings, &ProcessEnv)
}

/// Resolve the recognized variables from `env` into the still-unset fields
/// of `settings`.
///
/// Absent variables are skipped. A present but malformed variable is an
/// error even when its field was already set on the command line.
pub fn parse_environment_variables_from<E>(
    settings: &mut InitializationSettings,
    env: &E,
) -> Result<()>
where
    E: EnvSource + ?Sized,
{
    let num_threads = read(env, KOKKOS_NUM_THREADS, parse::parse_int)?;
    apply(
        settings,
        KOKKOS_NUM_THREADS,
        num_threads,
        InitializationSettings::has_num_threads,
        |s, v| {
            s.set_num_threads(v);
        },
    );

    let device_id = read(env, KOKKOS_DEVICE_ID, parse::parse_int)?;
    apply(
        settings,
        KOKKOS_DEVICE_ID,
        device_id,
        InitializationSettings::has_device_id,
        |s, v| {
            s.set_device_id(v);
        },
    );

    let num_devices = read(env, KOKKOS_NUM_DEVICES, parse::parse_int)?;
    apply(
        settings,
        KOKKOS_NUM_DEVICES,
        num_devices,
        InitializationSettings::has_num_devices,
        |s, v| {
            s.set_num_devices(v);
        },
    );

    let skip_device = read(env, KOKKOS_SKIP_DEVICE, parse::parse_int)?;
    apply(
        settings,
        KOKKOS_SKIP_DEVICE,
        skip_device,
        InitializationSettings::has_skip_device,
        |s, v| {
            s.set_skip_device(v);
        },
    );

    let disable_warnings = read(env, KOKKOS_DISABLE_WARNINGS, parse::parse_bool)?;
    apply(
        settings,
        KOKKOS_DISABLE_WARNINGS,
        disable_warnings,
        InitializationSettings::has_disable_warnings,
        |s, v| {
            s.set_disable_warnings(v);
        },
    );

    let tune_internals = read(env, KOKKOS_TUNE_INTERNALS, parse::parse_bool)?;
    apply(
        settings,
        KOKKOS_TUNE_INTERNALS,
        tune_internals,
        InitializationSettings::has_tune_internals,
        |s, v| {
            s.set_tune_internals(v);
        },
    );

    let visible_devices = read(env, KOKKOS_VISIBLE_DEVICES, parse::parse_int_list)?;
    apply(
        settings,
        KOKKOS_VISIBLE_DEVICES,
        visible_devices,
        InitializationSettings::has_visible_devices,
        |s, v| {
            s.set_visible_devices(v);
        },
    );

    Ok(())
}
