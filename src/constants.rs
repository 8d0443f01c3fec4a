//! # Constants and type definitions
//!
//! This module centralizes the **format constants**, **default tuning values**, and **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Corpus block layout (TLE lines, state sample fields, default block size)
//! - Dataset defaults (batch size, worker count, shuffle seed)
//! - Unit conversions used when computing elapsed time
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Corpus layout
// -------------------------------------------------------------------------------------------------

/// Number of text lines holding one TLE inside a corpus block
pub const TLE_LINE_COUNT: usize = 2;

/// Default corpus block size: 2 TLE lines followed by 5001 state samples
pub const DEFAULT_BLOCK_SIZE: usize = 5003;

/// Smallest block size accepted by the segmenter (one TLE and one sample)
pub const MIN_BLOCK_SIZE: usize = TLE_LINE_COUNT + 1;

/// Number of comma-separated fields on a state sample line
pub const STATE_FIELD_COUNT: usize = 7;

/// Largest accepted state sample timestamp magnitude, in Unix seconds (about 3000 years)
pub const MAX_ABS_UNIX_SECONDS: f64 = 1e11;

/// Minimum length of the first TLE line (up to the end of the drag term)
pub const TLE_LINE1_MIN_LEN: usize = 61;

/// Minimum length of the second TLE line (up to the end of the revolution number)
pub const TLE_LINE2_MIN_LEN: usize = 68;

/// Two-digit epoch years below this pivot belong to the 21st century (NORAD convention)
pub const EPOCH_YEAR_PIVOT: u8 = 57;

// -------------------------------------------------------------------------------------------------
// Dataset defaults
// -------------------------------------------------------------------------------------------------

/// Default number of corpus files per batch
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// Default worker count of the parallel materialization pool
pub const DEFAULT_WORKERS: usize = 5;

/// Default seed of the batch-order shuffle
pub const DEFAULT_SHUFFLE_SEED: u64 = 42;

/// Default zstd compression level for CSV artifacts
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Number of seconds in a minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Speed in kilometers per second
pub type KmPerSec = f64;
/// Mean motion in revolutions per day
pub type RevPerDay = f64;
/// Elapsed time in minutes
pub type Minutes = f64;
/// Seconds since 1970-01-01T00:00:00 UTC
pub type UnixSeconds = f64;
