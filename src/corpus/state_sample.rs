//! Decoding of the `t,x,y,z,vx,vy,vz` state sample lines that follow each TLE in a corpus block.
//!
//! Every field must be a finite number and the timestamp must lie within
//! [`MAX_ABS_UNIX_SECONDS`] of the Unix epoch.
use std::str::FromStr;

use hifitime::Epoch;
use nalgebra::Vector3;
use thiserror::Error;

use crate::constants::{KmPerSec, UnixSeconds, MAX_ABS_UNIX_SECONDS, STATE_FIELD_COUNT};

/// Errors raised while decoding one state sample line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseStateError {
    #[error("expected 7 comma-separated fields, found {0}")]
    FieldCount(usize),
    #[error("field {column} is not a number: {value:?}")]
    InvalidNumber { column: usize, value: String },
    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(f64),
}

/// Position and velocity of a satellite at an instant.
///
/// Decoded from a corpus line `epoch_unix_seconds,x,y,z,vx,vy,vz` with positions in **km**
/// and velocities in **km/s**.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSample {
    /// Absolute time of the sample (UTC).
    pub timestamp: Epoch,
    /// Position (km).
    pub position: Vector3<f64>,
    /// Velocity (km/s).
    pub velocity: Vector3<f64>,
}

impl StateSample {
    /// Timestamp as Unix seconds.
    pub fn unix_seconds(&self) -> UnixSeconds {
        self.timestamp.to_unix_seconds()
    }

    /// Norm of the velocity vector (km/s).
    pub fn speed(&self) -> KmPerSec {
        self.velocity.norm()
    }
}

impl FromStr for StateSample {
    type Err = ParseStateError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut values = [0.0_f64; STATE_FIELD_COUNT];
        let mut count = 0;

        for (column, raw) in line.split(',').enumerate() {
            count += 1;
            if column >= STATE_FIELD_COUNT {
                continue;
            }
            let raw = raw.trim();
            values[column] = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ParseStateError::InvalidNumber {
                    column,
                    value: raw.to_string(),
                })?;
        }

        if count != STATE_FIELD_COUNT {
            return Err(ParseStateError::FieldCount(count));
        }

        let [t, x, y, z, vx, vy, vz] = values;
        if t.abs() > MAX_ABS_UNIX_SECONDS {
            return Err(ParseStateError::TimestampOutOfRange(t));
        }
        Ok(StateSample {
            timestamp: Epoch::from_unix_seconds(t),
            position: Vector3::new(x, y, z),
            velocity: Vector3::new(vx, vy, vz),
        })
    }
}
