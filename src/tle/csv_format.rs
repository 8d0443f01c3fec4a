//! # CSV rows for decoded TLEs
//!
//! One [`SatelliteRecord`] ↔ one CSV row, in the fixed column order of [`CSV_HEADER`]:
//! the name (always quoted), the line-1 metadata, then the line-2 elements.
//!
//! Floats are written with Rust's shortest round-trip representation, so
//! [`SatelliteRecord::from_csv_record`] reads back the exact values that were formatted.
use std::io::{Read, Write};
use std::str::FromStr;

use csv::StringRecord;

use super::fixed_width::{check_epoch_day, decode_decimal, ParseTleError};
use super::{OrbitalElements, SatelliteRecord, TleMetadata};
use crate::tle_errors::TleError;

/// Column names, in row order.
pub const CSV_COLUMNS: [&str; 16] = [
    "name",
    "satelliteCatalogNumber",
    "securityClass",
    "internationalDesignator",
    "year",
    "day",
    "firstTimeDerivative",
    "secondTimeDerivative",
    "drag",
    "inclination",
    "RAAN",
    "eccentricity",
    "perigee",
    "meanAnomaly",
    "meanMotion",
    "revolutionNumber",
];

/// Header row of every CSV artifact.
pub const CSV_HEADER: &str = "name,satelliteCatalogNumber,securityClass,internationalDesignator,year,day,firstTimeDerivative,secondTimeDerivative,drag,inclination,RAAN,eccentricity,perigee,meanAnomaly,meanMotion,revolutionNumber";

impl SatelliteRecord {
    /// Format the record as one CSV row (no trailing newline).
    ///
    /// The name is quoted with embedded quotes doubled; every other field is written bare.
    pub fn to_csv_row(&self) -> String {
        let m = &self.metadata;
        let e = &self.elements;
        format!(
            "\"{}\",{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.name.replace('"', "\"\""),
            m.catalog_number,
            m.security_class,
            m.international_designator,
            m.epoch_year,
            m.epoch_day,
            m.mean_motion_first_derivative,
            m.mean_motion_second_derivative,
            m.drag_term,
            e.inclination,
            e.raan,
            e.eccentricity,
            e.argument_of_perigee,
            e.mean_anomaly,
            e.mean_motion,
            e.revolution_number,
        )
    }

    /// Rebuild a record from a CSV row produced by [`SatelliteRecord::to_csv_row`].
    ///
    /// Return
    /// ----------
    /// * The record, [`TleError::Format`] if the row does not hold exactly 16 fields, or
    ///   [`TleError::Parse`] naming the first column that failed to decode.
    pub fn from_csv_record(row: &StringRecord) -> Result<Self, TleError> {
        if row.len() != CSV_COLUMNS.len() {
            return Err(TleError::Format(format!(
                "CSV row has {} fields, expected {}",
                row.len(),
                CSV_COLUMNS.len()
            )));
        }

        let security_class = {
            let raw = &row[2];
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(ParseTleError::InvalidField {
                        field: CSV_COLUMNS[2],
                        value: raw.to_string(),
                    }
                    .into())
                }
            }
        };

        Ok(SatelliteRecord {
            name: row[0].to_string(),
            metadata: TleMetadata {
                catalog_number: row[1].to_string(),
                security_class,
                international_designator: row[3].to_string(),
                epoch_year: column(row, 4)?,
                epoch_day: check_epoch_day(decimal_column(row, 5)?)?,
                mean_motion_first_derivative: decimal_column(row, 6)?,
                mean_motion_second_derivative: decimal_column(row, 7)?,
                drag_term: decimal_column(row, 8)?,
            },
            elements: OrbitalElements {
                inclination: decimal_column(row, 9)?,
                raan: decimal_column(row, 10)?,
                eccentricity: decimal_column(row, 11)?,
                argument_of_perigee: decimal_column(row, 12)?,
                mean_anomaly: decimal_column(row, 13)?,
                mean_motion: decimal_column(row, 14)?,
                revolution_number: column(row, 15)?,
            },
        })
    }
}

fn column<T: FromStr>(row: &StringRecord, idx: usize) -> Result<T, ParseTleError> {
    let raw = row[idx].trim();
    raw.parse::<T>().map_err(|_| ParseTleError::InvalidField {
        field: CSV_COLUMNS[idx],
        value: raw.to_string(),
    })
}

fn decimal_column(row: &StringRecord, idx: usize) -> Result<f64, ParseTleError> {
    decode_decimal(&row[idx], CSV_COLUMNS[idx])
}

/// Write the header and one row per record.
pub fn write_records<'a, W, I>(mut writer: W, records: I) -> std::io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a SatelliteRecord>,
{
    writeln!(writer, "{CSV_HEADER}")?;
    let mut n = 0;
    for rec in records {
        writeln!(writer, "{}", rec.to_csv_row())?;
        n += 1;
    }
    writer.flush()?;
    Ok(n)
}

/// Read every record of a CSV text whose first row is the header.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<SatelliteRecord>, TleError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    rdr.records()
        .map(|row| SatelliteRecord::from_csv_record(&row?))
        .collect()
}
