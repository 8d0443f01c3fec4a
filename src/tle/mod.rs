//! # Two-Line Element records
//!
//! Typed representation of a decoded **NORAD Two-Line Element set** and the routines that move
//! it between text forms.
//!
//! Modules
//! -----------------
//! * [`fixed_width`](crate::tle::fixed_width) – Fixed-column decoder for the two TLE lines.
//! * [`scientific`](crate::tle::scientific) – Decoder for the truncated-exponent numeric fields
//!   (`-11606-4` → `-0.11606e-4`).
//! * [`csv_format`](crate::tle::csv_format) – One-row CSV serialization and its re-parse.
//! * [`raw_record`](crate::tle::raw_record) – Provider JSON records and compressed CSV artifacts.
//!
//! Data Model
//! -----------------
//! A [`SatelliteRecord`] is split like the TLE itself:
//! * [`TleMetadata`] – everything on line 1 (identity, epoch, drag terms),
//! * [`OrbitalElements`] – everything on line 2 (the mean elements and revolution count).
//!
//! A record is either fully decoded or rejected: no constructor hands out a partially
//! populated value.
//!
//! Units & Time Scales
//! -----------------
//! * Angles are kept in **degrees**, as written in the TLE.
//! * Mean motion is **revolutions per day**; its derivatives keep the TLE units.
//! * The epoch is **UTC**. [`SatelliteRecord::epoch`] resolves the two-digit year with the
//!   NORAD pivot (`< 57` → 20xx) and adds the fractional day of year.
use std::fmt;

use hifitime::{Epoch, Unit};

use crate::constants::{Degree, RevPerDay, UnixSeconds, EPOCH_YEAR_PIVOT};

pub mod csv_format;
pub mod fixed_width;
pub mod raw_record;
pub mod scientific;

/// Line-1 content of a TLE.
#[derive(Debug, Clone, PartialEq)]
pub struct TleMetadata {
    /// Satellite catalog number (kept as text, Alpha-5 designations are not numeric).
    pub catalog_number: String,
    pub security_class: char,
    /// International designator (launch year, launch number, piece), trimmed.
    pub international_designator: String,
    /// Two-digit epoch year as written in the TLE.
    pub epoch_year: u8,
    /// Fractional day of year, `1.0` being January 1st at 00:00 UTC.
    pub epoch_day: f64,
    /// First derivative of the mean motion divided by two (rev/day²).
    pub mean_motion_first_derivative: f64,
    /// Second derivative of the mean motion divided by six (rev/day³).
    pub mean_motion_second_derivative: f64,
    /// B* drag term (1/earth radii).
    pub drag_term: f64,
}

/// Line-2 content of a TLE.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalElements {
    pub inclination: Degree,
    pub raan: Degree,
    pub eccentricity: f64,
    pub argument_of_perigee: Degree,
    pub mean_anomaly: Degree,
    pub mean_motion: RevPerDay,
    pub revolution_number: u32,
}

/// A fully decoded TLE, optionally named.
///
/// Records decoded from corpus blocks carry an empty name: the corpus stores the two element
/// lines only. Records coming from the data provider carry its `OBJECT_NAME`.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteRecord {
    pub name: String,
    pub metadata: TleMetadata,
    pub elements: OrbitalElements,
}

impl SatelliteRecord {
    /// Decode an unnamed record from the two TLE lines.
    ///
    /// See [`fixed_width::decode_tle`] for the column contract.
    pub fn from_tle_lines(line1: &str, line2: &str) -> Result<Self, fixed_width::ParseTleError> {
        fixed_width::decode_tle("", line1, line2)
    }

    /// Decode a named record (three-line form).
    pub fn from_named_tle(
        name: &str,
        line1: &str,
        line2: &str,
    ) -> Result<Self, fixed_width::ParseTleError> {
        fixed_width::decode_tle(name, line1, line2)
    }

    /// Four-digit epoch year, resolved with the NORAD pivot.
    pub fn full_epoch_year(&self) -> i32 {
        let yy = self.metadata.epoch_year;
        if yy < EPOCH_YEAR_PIVOT {
            2000 + yy as i32
        } else {
            1900 + yy as i32
        }
    }

    /// Epoch at which the elements are valid (UTC).
    pub fn epoch(&self) -> Epoch {
        let new_year = Epoch::from_gregorian_utc_at_midnight(self.full_epoch_year(), 1, 1);
        new_year + Unit::Day * (self.metadata.epoch_day - 1.0)
    }

    /// Epoch expressed as Unix seconds, the time base of the corpus state samples.
    pub fn epoch_unix_seconds(&self) -> UnixSeconds {
        self.epoch().to_unix_seconds()
    }
}

impl fmt::Display for SatelliteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metadata;
        let e = &self.elements;
        let name = if self.name.is_empty() {
            "<unnamed>"
        } else {
            self.name.as_str()
        };
        if f.alternate() {
            writeln!(f, "{name} [{}{}] {}", m.catalog_number, m.security_class, m.international_designator)?;
            writeln!(f, "  epoch            = {:02}{:012.8}", m.epoch_year, m.epoch_day)?;
            writeln!(f, "  ndot/2, nddot/6  = {:e}, {:e}", m.mean_motion_first_derivative, m.mean_motion_second_derivative)?;
            writeln!(f, "  B*               = {:e}", m.drag_term)?;
            writeln!(f, "  i, Ω, ω, M (deg) = {:.4}, {:.4}, {:.4}, {:.4}", e.inclination, e.raan, e.argument_of_perigee, e.mean_anomaly)?;
            writeln!(f, "  e                = {:.7}", e.eccentricity)?;
            write!(f, "  n (rev/day), rev = {:.8}, {}", e.mean_motion, e.revolution_number)
        } else {
            write!(
                f,
                "{name} ({}) epoch={:02}{:012.8} e={:.7} i={:.4}° n={:.8} rev/day",
                m.catalog_number, m.epoch_year, m.epoch_day, e.eccentricity, e.inclination, e.mean_motion
            )
        }
    }
}
