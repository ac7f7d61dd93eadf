//! Command-line argument resolution
//!
//! Scans the argument list left to right, consumes every `--kokkos-*`
//! option it recognizes and hands back the rest untouched. The last
//! occurrence of an option wins.

use std::io::{self, Write};

use crate::error::{InitError, Result};
use crate::parse::{self, ParseError};
use crate::settings::InitializationSettings;

/// `--kokkos-num-threads=<int>`
pub const NUM_THREADS: &str = "--kokkos-num-threads";
/// `--kokkos-device-id=<int>`
pub const DEVICE_ID: &str = "--kokkos-device-id";
/// `--kokkos-num-devices=<int>[,<int>]`
pub const NUM_DEVICES: &str = "--kokkos-num-devices";
/// `--kokkos-disable-warnings[=<bool>]`
pub const DISABLE_WARNINGS: &str = "--kokkos-disable-warnings";
/// `--kokkos-tune-internals[=<bool>]`
pub const TUNE_INTERNALS: &str = "--kokkos-tune-internals";
/// `--kokkos-help`
pub const KOKKOS_HELP: &str = "--kokkos-help";
/// `--help`
pub const HELP: &str = "--help";

/// Prefix shared by every option this module owns
const KOKKOS_PREFIX: &str = "--kokkos-";

/// Text printed for `--help` and `--kokkos-help`
pub const HELP_TEXT: &str = "\
--------------------------------------------------------------------------------
-------------Kokkos command line arguments--------------------------------------
--------------------------------------------------------------------------------
This program is using Kokkos.  You can use the following command line flags to
control its behavior:

Kokkos Core Options:
  --kokkos-help                  : print this message
  --kokkos-disable-warnings      : disable kokkos warning messages
  --kokkos-tune-internals        : allow Kokkos to autotune policies and declare
                                   tuning features through the tuning system. If
                                   left off, Kokkos uses heuristics
  --kokkos-num-threads=INT       : specify total number of threads to use for
                                   parallel regions on the host
  --kokkos-device-id=INT         : specify device id to be used by Kokkos
  --kokkos-num-devices=INT[,INT] : used when running MPI jobs. Specify number of
                                   devices per node to be used. Process to device
                                   mapping happens by obtaining the local MPI rank
                                   and assigning devices round-robin. The optional
                                   second argument allows for an existing device
                                   to be ignored. This is most useful on
                                   workstations with multiple GPUs of which one
                                   is used to drive screen output

Environment variables KOKKOS_NUM_THREADS, KOKKOS_DEVICE_ID, KOKKOS_NUM_DEVICES,
KOKKOS_SKIP_DEVICE, KOKKOS_VISIBLE_DEVICES, KOKKOS_DISABLE_WARNINGS and
KOKKOS_TUNE_INTERNALS are consulted for any option not given on the command
line.
--------------------------------------------------------------------------------
";

/// What a single token turned out to be
#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    /// `--name` with no value
    Bare,
    /// `--name=value`
    Value(&'a str),
}

/// Match `arg` against `name`, accepting `name` alone or `name=value`
fn match_option<'a>(arg: &'a str, name: &str) -> Option<Token<'a>> {
    let rest = arg.strip_prefix(name)?;
    if rest.is_empty() {
        Some(Token::Bare)
    } else {
        rest.strip_prefix('=').map(Token::Value)
    }
}

fn int_value(token: Token<'_>, option: &str) -> Result<i32> {
    match token {
        Token::Bare => Err(InitError::MissingValue {
            option: option.to_string(),
        }),
        Token::Value(value) => {
            parse::parse_int(value).map_err(|e| InitError::from_parse(e, option, value))
        }
    }
}

fn bool_value(token: Token<'_>, option: &str) -> Result<bool> {
    match token {
        Token::Bare => Ok(true),
        Token::Value(value) => {
            parse::parse_bool(value).map_err(|e| InitError::from_parse(e, option, value))
        }
    }
}

/// Split `N[,S]` into the device count and the optional skipped device
fn num_devices_value(token: Token<'_>) -> Result<(i32, Option<i32>)> {
    let value = match token {
        Token::Bare => {
            return Err(InitError::MissingValue {
                option: NUM_DEVICES.to_string(),
            })
        }
        Token::Value(value) => value,
    };

    // Each segment keeps integer prefix rules; a bad segment fails the list
    let int = |s: &str| {
        parse::parse_int(s)
            .map_err(|_| InitError::from_parse(ParseError::IntegerList, NUM_DEVICES, value))
    };
    let segments: Vec<&str> = value.split(',').collect();
    match *segments.as_slice() {
        [count] => Ok((int(count)?, None)),
        [count, skip] => Ok((int(count)?, Some(int(skip)?))),
        _ => Err(InitError::from_parse(ParseError::IntegerList, NUM_DEVICES, value)),
    }
}

/// Try to consume `arg` as one of our options.
///
/// Returns `Ok(true)` when the token was recognized and must be removed.
fn apply_argument(
    arg: &str,
    settings: &mut InitializationSettings,
    help_requested: &mut bool,
) -> Result<bool> {
    if let Some(token) = match_option(arg, NUM_THREADS) {
        settings.set_num_threads(int_value(token, NUM_THREADS)?);
    } else if let Some(token) = match_option(arg, DEVICE_ID) {
        settings.set_device_id(int_value(token, DEVICE_ID)?);
    } else if let Some(token) = match_option(arg, NUM_DEVICES) {
        let (count, skip) = num_devices_value(token)?;
        settings.set_num_devices(count);
        // A later `N` without `,S` keeps an earlier skip index
        if let Some(skip) = skip {
            settings.set_skip_device(skip);
        }
    } else if let Some(token) = match_option(arg, DISABLE_WARNINGS) {
        settings.set_disable_warnings(bool_value(token, DISABLE_WARNINGS)?);
    } else if let Some(token) = match_option(arg, TUNE_INTERNALS) {
        settings.set_tune_internals(bool_value(token, TUNE_INTERNALS)?);
    } else if arg == KOKKOS_HELP || arg == HELP {
        *help_requested = true;
    } else {
        return Ok(false);
    }

    tracing::debug!("Consumed command line argument '{}'", arg);
    Ok(true)
}

/// Resolve command-line options into `settings`, printing help to stdout.
///
/// Returns the arguments that were not consumed, in their original order.
/// The program name must not be part of `args`. Scanning stops at the
/// first malformed value; help requested by an earlier token is still
/// printed before the error is returned.
pub fn parse_command_line_arguments<I, S>(
    args: I,
    settings: &mut InitializationSettings,
) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    parse_command_line_arguments_with_output(args, settings, &mut out)
}

/// Same as [`parse_command_line_arguments`], writing help text to `out`
pub fn parse_command_line_arguments_with_output<I, S, W>(
    args: I,
    settings: &mut InitializationSettings,
    out: &mut W,
) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    W: Write + ?Sized,
{
    let mut remaining = Vec::new();
    let mut unknown_kokkos_args = Vec::new();
    let mut help_requested = false;

    let mut failure = None;

    for arg in args {
        let arg: String = arg.into();
        match apply_argument(&arg, settings, &mut help_requested) {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
        if arg.starts_with(KOKKOS_PREFIX) {
            unknown_kokkos_args.push(arg.clone());
        }
        remaining.push(arg);
    }

    // Help requested before a bad value is still printed
    if help_requested {
        out.write_all(HELP_TEXT.as_bytes())?;
        out.flush()?;
    }
    if let Some(e) = failure {
        return Err(e);
    }

    if !settings.warnings_disabled() {
        for arg in &unknown_kokkos_args {
            tracing::warn!(
                "Unrecognized command line argument '{}' left in place (see --kokkos-help)",
                arg
            );
        }
    }

    Ok(remaining)
}
