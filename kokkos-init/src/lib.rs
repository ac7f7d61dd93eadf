//! Kokkos Init - startup settings resolution for the parallel runtime
//!
//! Settings come from three layers, highest precedence first: command-line
//! arguments, environment variables, compiled-in defaults. The resolved
//! record also drives which accelerator devices the process may use.

/// Errors shared by every resolution stage
pub mod error;

/// Integer, boolean and list value parsing
pub mod parse;

/// The settings record
pub mod settings;

/// Command-line resolution and help text
pub mod args;

/// Environment variable resolution
pub mod env;

/// Visible device computation and device selection
pub mod device;

pub use args::{parse_command_line_arguments, parse_command_line_arguments_with_output};
pub use device::{get_visible_devices, select_device};
pub use env::{parse_environment_variables, parse_environment_variables_from, EnvSource, ProcessEnv};
pub use error::InitError;
pub use settings::InitializationSettings;

use anyhow::{Context, Result};

/// Outcome of a full resolution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The merged settings
    pub settings: InitializationSettings,
    /// Arguments that were not consumed, in their original order
    pub remaining_args: Vec<String>,
}

/// Resolve `args` then `env` into a fresh settings record.
///
/// `args` must not include the program name.
pub fn resolve<I, S, E>(args: I, env: &E) -> Result<Resolved>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    E: EnvSource + ?Sized,
{
    let mut settings = InitializationSettings::new();
    let remaining_args = parse_command_line_arguments(args, &mut settings)
        .context("Failed to parse command line arguments")?;
    parse_environment_variables_from(&mut settings, env)
        .context("Failed to parse environment variables")?;

    Ok(Resolved {
        settings,
        remaining_args,
    })
}

/// Resolve the current process's arguments and environment.
///
/// This is a convenience function for binaries that have nothing else to
/// do with their arguments before the runtime starts.
pub fn resolve_from_process() -> Result<Resolved> {
    resolve(std::env::args().skip(1), &ProcessEnv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_command_line_beats_environment() {
        let vars = env(&[("KOKKOS_DEVICE_ID", "7"), ("KOKKOS_NUM_THREADS", "12")]);
        let resolved = resolve(["--kokkos-device-id=2", "-v"], &vars).unwrap();
        assert_eq!(resolved.settings.get_device_id().unwrap(), 2);
        assert_eq!(resolved.settings.get_num_threads().unwrap(), 12);
        assert_eq!(resolved.remaining_args, vec!["-v"]);
    }

    #[test]
    fn test_full_pipeline_to_devices() {
        let vars = env(&[("KOKKOS_NUM_DEVICES", "8"), ("KOKKOS_SKIP_DEVICE", "0")]);
        let resolved = resolve(["--kokkos-num-devices=4"], &vars).unwrap();
        let settings = &resolved.settings;
        assert_eq!(settings.get_num_devices().unwrap(), 4);
        assert_eq!(settings.get_skip_device().unwrap(), 0);

        let visible = get_visible_devices(settings, 6);
        assert_eq!(visible, vec![1, 2, 3]);
        assert_eq!(select_device(settings, &visible).unwrap(), 1);
    }

    #[test]
    fn test_environment_error_has_context() {
        let vars = env(&[("KOKKOS_DISABLE_WARNINGS", "sometimes")]);
        let err = resolve(Vec::<String>::new(), &vars).unwrap_err();
        assert!(err.to_string().contains("environment variables"));
        assert!(matches!(
            err.downcast_ref::<InitError>(),
            Some(InitError::InvalidBoolean { .. })
        ));
    }

    #[test]
    fn test_argument_error_has_context() {
        let err = resolve(["--kokkos-num-threads=x"], &env(&[])).unwrap_err();
        assert!(err.to_string().contains("command line"));
    }
}
