//! # Fixed-width TLE decoder
//!
//! Decodes the two **NORAD Two-Line Element** lines into a [`SatelliteRecord`].
//!
//! ## Column Layout
//! -----------------
//! Columns are 0-indexed and half-open, as used for string slicing.
//!
//! | Field                  | Line | Columns   | Decoding                         |
//! |------------------------|------|-----------|----------------------------------|
//! | catalog number         | 1    | `2..7`    | text, trimmed                    |
//! | security class         | 1    | `7..8`    | char                             |
//! | international desig.   | 1    | `9..17`   | text, trimmed                    |
//! | epoch year             | 1    | `18..20`  | integer                          |
//! | epoch day              | 1    | `20..33`  | plain decimal, `[1, 367)`        |
//! | ndot / 2               | 1    | `33..44`  | plain decimal                    |
//! | nddot / 6              | 1    | `44..52`  | [`decode_scientific`]            |
//! | B* drag term           | 1    | `53..61`  | [`decode_scientific`]            |
//! | inclination            | 2    | `8..16`   | plain decimal (deg)              |
//! | RAAN                   | 2    | `17..25`  | plain decimal (deg)              |
//! | eccentricity           | 2    | `26..33`  | 7 digits, implicit leading `0.`  |
//! | argument of perigee    | 2    | `34..42`  | plain decimal (deg)              |
//! | mean anomaly           | 2    | `43..51`  | plain decimal (deg)              |
//! | mean motion            | 2    | `52..63`  | plain decimal (rev/day)          |
//! | revolution number      | 2    | `63..68`  | integer                          |
//!
//! ## Error Handling
//! -----------------
//! Every field is decoded before the record is assembled: the first failing field is
//! reported through [`ParseTleError`] and no record is produced.
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::scientific::decode_scientific;
use super::{OrbitalElements, SatelliteRecord, TleMetadata};
use crate::constants::{TLE_LINE1_MIN_LEN, TLE_LINE2_MIN_LEN};

// line 1
const CATALOG_NUMBER: Range<usize> = 2..7;
const SECURITY_CLASS: usize = 7;
const INTL_DESIGNATOR: Range<usize> = 9..17;
const EPOCH_YEAR: Range<usize> = 18..20;
const EPOCH_DAY: Range<usize> = 20..33;
const FIRST_DERIVATIVE: Range<usize> = 33..44;
const SECOND_DERIVATIVE: Range<usize> = 44..52;
const DRAG_TERM: Range<usize> = 53..61;

// line 2
const INCLINATION: Range<usize> = 8..16;
const RAAN: Range<usize> = 17..25;
const ECCENTRICITY: Range<usize> = 26..33;
const ARG_OF_PERIGEE: Range<usize> = 34..42;
const MEAN_ANOMALY: Range<usize> = 43..51;
const MEAN_MOTION: Range<usize> = 52..63;
const REVOLUTION_NUMBER: Range<usize> = 63..68;

/// Valid epoch day range, `[1, 367)` (day 366 of a leap year included).
const EPOCH_DAY_RANGE: Range<f64> = 1.0..367.0;

static PLAIN_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)$").expect("valid plain decimal pattern")
});

/// Field-level TLE decoding errors.
///
/// Variants
/// -----------------
/// * `TooShortLine` – The line does not reach the last column the decoder reads.
/// * `NotAscii` – The line holds non-ASCII text, columns would not be byte offsets.
/// * `WrongLineNumber` – Column 0 does not hold the expected line number (`1` or `2`).
/// * `InvalidField` – A plain numeric or text field failed to decode; carries the field name
///   and the offending slice.
/// * `InvalidScientific` – A truncated-exponent field failed to decode; carries the raw field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseTleError {
    #[error("TLE line {line} is too short: {len} columns, expected at least {expected}")]
    TooShortLine {
        line: u8,
        len: usize,
        expected: usize,
    },
    #[error("TLE line {0} contains non-ASCII characters")]
    NotAscii(u8),
    #[error("TLE line {line} starts with {found:?}")]
    WrongLineNumber { line: u8, found: char },
    #[error("Invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("Invalid scientific notation field: {0:?}")]
    InvalidScientific(String),
}

fn check_line(line: &str, number: u8, min_len: usize) -> Result<(), ParseTleError> {
    if !line.is_ascii() {
        return Err(ParseTleError::NotAscii(number));
    }
    if line.len() < min_len {
        return Err(ParseTleError::TooShortLine {
            line: number,
            len: line.len(),
            expected: min_len,
        });
    }
    let expected = char::from(b'0' + number);
    match line.chars().next() {
        Some(c) if c == expected => Ok(()),
        found => Err(ParseTleError::WrongLineNumber {
            line: number,
            found: found.unwrap_or(' '),
        }),
    }
}

fn parse_field<T: FromStr>(
    line: &str,
    range: Range<usize>,
    field: &'static str,
) -> Result<T, ParseTleError> {
    let raw = line[range].trim();
    raw.parse::<T>().map_err(|_| ParseTleError::InvalidField {
        field,
        value: raw.to_string(),
    })
}

/// Decode a plain decimal field (`-.00002182`, `51.6416`).
///
/// Exponent notation and named values (`NaN`, `inf`) are not TLE syntax and are rejected.
pub(crate) fn decode_decimal(raw: &str, field: &'static str) -> Result<f64, ParseTleError> {
    let raw = raw.trim();
    let invalid = || ParseTleError::InvalidField {
        field,
        value: raw.to_string(),
    };
    if !PLAIN_DECIMAL.is_match(raw) {
        return Err(invalid());
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(invalid)
}

/// Reject epoch days outside `[1, 367)`.
pub(crate) fn check_epoch_day(day: f64) -> Result<f64, ParseTleError> {
    if EPOCH_DAY_RANGE.contains(&day) {
        Ok(day)
    } else {
        Err(ParseTleError::InvalidField {
            field: "epoch day",
            value: day.to_string(),
        })
    }
}

fn parse_decimal(line: &str, range: Range<usize>, field: &'static str) -> Result<f64, ParseTleError> {
    decode_decimal(&line[range], field)
}

fn parse_text(line: &str, range: Range<usize>, field: &'static str) -> Result<String, ParseTleError> {
    let raw = line[range].trim();
    if raw.is_empty() {
        return Err(ParseTleError::InvalidField {
            field,
            value: raw.to_string(),
        });
    }
    Ok(raw.to_string())
}

fn parse_eccentricity(line: &str) -> Result<f64, ParseTleError> {
    let raw = line[ECCENTRICITY].trim();
    let invalid = || ParseTleError::InvalidField {
        field: "eccentricity",
        value: raw.to_string(),
    };
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    format!("0.{raw}").parse::<f64>().map_err(|_| invalid())
}

/// Decode a TLE from its two element lines.
///
/// Arguments
/// -----------------
/// * `name` – Object name to attach to the record (empty for corpus blocks).
/// * `line1` – First TLE line (`1 NNNNNC ...`), at least 61 columns.
/// * `line2` – Second TLE line (`2 NNNNN ...`), at least 68 columns.
///
/// Return
/// ----------
/// * A complete [`SatelliteRecord`], or the first [`ParseTleError`] met. The checksum column
///   is not verified.
///
/// See also
/// ------------
/// * [`decode_scientific`] – Truncated-exponent fields of line 1.
/// * [`SatelliteRecord::from_tle_lines`] – Unnamed shortcut.
pub fn decode_tle(name: &str, line1: &str, line2: &str) -> Result<SatelliteRecord, ParseTleError> {
    check_line(line1, 1, TLE_LINE1_MIN_LEN)?;
    check_line(line2, 2, TLE_LINE2_MIN_LEN)?;

    let metadata = TleMetadata {
        catalog_number: parse_text(line1, CATALOG_NUMBER, "catalog number")?,
        security_class: line1.as_bytes()[SECURITY_CLASS] as char,
        international_designator: line1[INTL_DESIGNATOR].trim().to_string(),
        epoch_year: parse_field(line1, EPOCH_YEAR, "epoch year")?,
        epoch_day: check_epoch_day(parse_decimal(line1, EPOCH_DAY, "epoch day")?)?,
        mean_motion_first_derivative: parse_decimal(line1, FIRST_DERIVATIVE, "first derivative")?,
        mean_motion_second_derivative: decode_scientific(&line1[SECOND_DERIVATIVE])?,
        drag_term: decode_scientific(&line1[DRAG_TERM])?,
    };

    let elements = OrbitalElements {
        inclination: parse_decimal(line2, INCLINATION, "inclination")?,
        raan: parse_decimal(line2, RAAN, "RAAN")?,
        eccentricity: parse_eccentricity(line2)?,
        argument_of_perigee: parse_decimal(line2, ARG_OF_PERIGEE, "argument of perigee")?,
        mean_anomaly: parse_decimal(line2, MEAN_ANOMALY, "mean anomaly")?,
        mean_motion: parse_decimal(line2, MEAN_MOTION, "mean motion")?,
        revolution_number: parse_field(line2, REVOLUTION_NUMBER, "revolution number")?,
    };

    Ok(SatelliteRecord {
        name: name.trim().to_string(),
        metadata,
        elements,
    })
}

#[cfg(test)]
mod fixed_width_test {
    use super::*;
    use approx::assert_relative_eq;

    const ISS_L1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_L2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn test_decode_iss() {
        let rec = decode_tle("ISS (ZARYA)", ISS_L1, ISS_L2).unwrap();

        assert_eq!(rec.name, "ISS (ZARYA)");
        assert_eq!(rec.metadata.catalog_number, "25544");
        assert_eq!(rec.metadata.security_class, 'U');
        assert_eq!(rec.metadata.international_designator, "98067A");
        assert_eq!(rec.metadata.epoch_year, 8);
        assert_eq!(rec.metadata.epoch_day, 264.51782528);
        assert_eq!(rec.metadata.mean_motion_first_derivative, -0.00002182);
        assert_eq!(rec.metadata.mean_motion_second_derivative, 0.0);
        assert_relative_eq!(rec.metadata.drag_term, -0.11606e-4, epsilon = 1e-15);

        assert_eq!(rec.elements.inclination, 51.6416);
        assert_eq!(rec.elements.raan, 247.4627);
        assert_eq!(rec.elements.eccentricity, 0.0006703);
        assert_eq!(rec.elements.argument_of_perigee, 130.536);
        assert_eq!(rec.elements.mean_anomaly, 325.0288);
        assert_eq!(rec.elements.mean_motion, 15.72125391);
        assert_eq!(rec.elements.revolution_number, 56353);
    }

    #[test]
    fn test_short_line() {
        let res = decode_tle("", "1 25544U", ISS_L2);
        assert_eq!(
            res,
            Err(ParseTleError::TooShortLine {
                line: 1,
                len: 8,
                expected: TLE_LINE1_MIN_LEN
            })
        );
    }

    #[test]
    fn test_swapped_lines() {
        let res = decode_tle("", ISS_L2, ISS_L1);
        assert_eq!(
            res,
            Err(ParseTleError::WrongLineNumber {
                line: 1,
                found: '2'
            })
        );
    }

    #[test]
    fn test_non_ascii() {
        let bad = ISS_L1.replacen('U', "É", 1);
        assert_eq!(decode_tle("", &bad, ISS_L2), Err(ParseTleError::NotAscii(1)));
    }

    #[test]
    fn test_bad_inclination_rejects_record() {
        let bad = ISS_L2.replacen("51.6416", "51.6x16", 1);
        assert_eq!(
            decode_tle("", ISS_L1, &bad),
            Err(ParseTleError::InvalidField {
                field: "inclination",
                value: "51.6x16".into()
            })
        );
    }

    #[test]
    fn test_bad_eccentricity() {
        let bad = ISS_L2.replacen("0006703", "00-6703", 1);
        assert!(matches!(
            decode_tle("", ISS_L1, &bad),
            Err(ParseTleError::InvalidField {
                field: "eccentricity",
                ..
            })
        ));
    }

    #[test]
    fn test_bad_drag_term() {
        let bad = ISS_L1.replacen("-11606-4", "-11A06-4", 1);
        assert_eq!(
            decode_tle("", &bad, ISS_L2),
            Err(ParseTleError::InvalidScientific("-11A06-4".into()))
        );
    }

    #[test]
    fn test_non_decimal_spellings_rejected() {
        for bad in ["  5.1e1 ", "     NaN", "     inf", "-Infinit"] {
            let line2 = ISS_L2.replacen(" 51.6416", bad, 1);
            assert_eq!(
                decode_tle("", ISS_L1, &line2),
                Err(ParseTleError::InvalidField {
                    field: "inclination",
                    value: bad.trim().into()
                }),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_non_finite_epoch_day() {
        let line1 = ISS_L1.replacen("08264.51782528", "08NaN         ", 1);
        assert_eq!(
            decode_tle("", &line1, ISS_L2),
            Err(ParseTleError::InvalidField {
                field: "epoch day",
                value: "NaN".into()
            })
        );
    }

    #[test]
    fn test_epoch_day_out_of_range() {
        let line1 = ISS_L1.replacen("08264.51782528", "08000.51782528", 1);
        assert!(matches!(
            decode_tle("", &line1, ISS_L2),
            Err(ParseTleError::InvalidField {
                field: "epoch day",
                ..
            })
        ));
    }

    #[test]
    fn test_decimal_spellings() {
        assert_eq!(decode_decimal(" -.00002182", "x").unwrap(), -0.00002182);
        assert_eq!(decode_decimal("15.", "x").unwrap(), 15.0);
        assert_eq!(decode_decimal("+7", "x").unwrap(), 7.0);
        assert!(decode_decimal("", "x").is_err());
        assert!(decode_decimal(".", "x").is_err());
        assert!(decode_decimal("1.2.3", "x").is_err());
    }

    #[test]
    fn test_trailing_columns_optional() {
        // checksum and element set number are not read
        let rec = decode_tle("", &ISS_L1[..61], &ISS_L2[..68]).unwrap();
        assert_eq!(rec.elements.revolution_number, 56353);
    }
}
