//! Value parsing shared by the command-line and environment resolvers
//!
//! Integers follow `strtol` semantics: the longest valid numeric prefix is
//! taken and trailing garbage is ignored, so `"1ABC"` parses as `1`.
//! Lists are stricter and reject any segment that is not a whole integer.

use thiserror::Error;

/// Kind of value that failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No numeric prefix, or the prefix does not fit in an `i32`
    #[error("expected an integer")]
    Integer,
    /// Empty list, empty segment or malformed segment
    #[error("expected a comma-separated list of integers")]
    IntegerList,
    /// Not one of the accepted boolean spellings
    #[error("expected one of 1, true, yes, 0, false, no")]
    Boolean,
}

const TRUE_SPELLINGS: [&str; 3] = ["1", "true", "yes"];
const FALSE_SPELLINGS: [&str; 3] = ["0", "false", "no"];

/// Parse the longest integer prefix of `s`.
///
/// Leading ASCII whitespace and a single `+` or `-` sign are accepted before
/// the digits. Anything after the last digit is ignored.
pub fn parse_int(s: &str) -> Result<i32, ParseError> {
    let trimmed = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let bytes = trimmed.as_bytes();

    let sign_len = match bytes.first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    };
    let digit_count = bytes[sign_len..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digit_count == 0 {
        return Err(ParseError::Integer);
    }

    // Out of range prefixes are rejected, not clamped
    trimmed[..sign_len + digit_count]
        .parse::<i32>()
        .map_err(|_| ParseError::Integer)
}

/// Parse a boolean, case-insensitively
pub fn parse_bool(s: &str) -> Result<bool, ParseError> {
    if TRUE_SPELLINGS.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        Ok(true)
    } else if FALSE_SPELLINGS.iter().any(|f| s.eq_ignore_ascii_case(f)) {
        Ok(false)
    } else {
        Err(ParseError::Boolean)
    }
}

/// Parse a comma-separated list such as `"2,1"` into `[2, 1]`
pub fn parse_int_list(s: &str) -> Result<Vec<i32>, ParseError> {
    s.split(',')
        .map(|segment| {
            segment
                .trim()
                .parse::<i32>()
                .map_err(|_| ParseError::IntegerList)
        })
        .collect()
}
