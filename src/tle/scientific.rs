//! # TLE truncated-exponent fields
//!
//! The second derivative of the mean motion and the B* drag term are written in a compact
//! scientific notation with an **implicit leading `0.`** and **no exponent marker**:
//!
//! ```text
//!  12345-3   →   0.12345e-3
//! -11606-4   →  -0.11606e-4
//!  00000-0   →   0.0
//! ```
//!
//! Layout of the 8-column field: an optional sign (blank meaning `+`), the mantissa digits,
//! then a one-character exponent sign and one exponent digit.
//!
//! [`decode_scientific`] is the only decoder of this format in the crate.
use std::sync::LazyLock;

use regex::Regex;

use super::fixed_width::ParseTleError;

/// Spellings of an all-zero field that decode to exactly `0.0`.
pub const ZERO_SENTINELS: [&str; 7] = [
    "00000-0", "00000+0", "-00000-0", "+00000-0", "-00000+0", "+00000+0", "0",
];

static SCIENTIFIC_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)([0-9]+)([+-][0-9])$").expect("valid scientific field pattern")
});

/// Decode a TLE truncated-exponent field.
///
/// The field may keep its surrounding blanks (a blank sign column is common). Zero sentinels
/// short-circuit to `0.0`; every other field must match `[sign]digits(+|-)digit`.
///
/// Arguments
/// -----------------
/// * `field` – The raw field, e.g. `" 12345-3"` or `"-11606-4"`.
///
/// Return
/// ----------
/// * `sign * 0.<digits> * 10^exponent`, or [`ParseTleError::InvalidScientific`] carrying the
///   offending text.
///
/// Example
/// -----------------
/// ```rust
/// use tle_dataset::tle::scientific::decode_scientific;
///
/// let v = decode_scientific(" 12345-3").unwrap();
/// assert!((v - 0.12345e-3).abs() < 1e-12);
/// assert_eq!(decode_scientific(" 00000-0").unwrap(), 0.0);
/// ```
pub fn decode_scientific(field: &str) -> Result<f64, ParseTleError> {
    let trimmed = field.trim();

    if ZERO_SENTINELS.contains(&trimmed) {
        return Ok(0.0);
    }

    let caps = SCIENTIFIC_FIELD
        .captures(trimmed)
        .ok_or_else(|| ParseTleError::InvalidScientific(field.to_string()))?;

    let mantissa = &caps[2];
    if mantissa.bytes().all(|b| b == b'0') {
        // avoid handing out -0.0
        return Ok(0.0);
    }

    let sign = if &caps[1] == "-" { "-" } else { "" };
    let exponent = &caps[3];

    // Going through the decimal text keeps the value correctly rounded.
    format!("{sign}0.{mantissa}e{exponent}")
        .parse::<f64>()
        .map_err(|_| ParseTleError::InvalidScientific(field.to_string()))
}
