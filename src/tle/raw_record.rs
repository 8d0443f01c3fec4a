//! # Provider records and CSV artifacts
//!
//! Bridge between the data provider and the storage collaborator:
//!
//! * [`RawTleRecord`] – one JSON object as served by the provider. Only `OBJECT_NAME`,
//!   `TLE_LINE1` and `TLE_LINE2` are read; every other key is ignored.
//! * [`CsvArtifactWriter`] – turns batches of raw records into **zstd-compressed CSV files**
//!   (`TLE_LEO_<n>.csv.zst`) and hands back the path of each finished artifact.
//!
//! Fetching, retrying and uploading are not done here: the writer only produces files that
//! are complete when its method returns.
//!
//! ## Lifecycle
//! -----------------
//! A [`CsvArtifactWriter`] is built once per output directory and passed by `&mut` to the
//! ingestion loop. Numbering resumes after the highest `TLE_LEO_<n>` already in the directory,
//! and an existing file is never overwritten.
use std::fs::{self, File};
use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use serde::Deserialize;

use super::csv_format::write_records;
use super::SatelliteRecord;
use crate::constants::DEFAULT_COMPRESSION_LEVEL;
use crate::tle_errors::TleError;

/// One TLE as delivered by the provider API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTleRecord {
    #[serde(rename = "OBJECT_NAME")]
    pub object_name: String,
    #[serde(rename = "TLE_LINE1")]
    pub line1: String,
    #[serde(rename = "TLE_LINE2")]
    pub line2: String,
}

impl RawTleRecord {
    /// Parse a provider response (a JSON array of objects).
    pub fn from_json_array(payload: &str) -> Result<Vec<RawTleRecord>, TleError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Decode the two lines into a record named after `OBJECT_NAME`.
    pub fn decode(&self) -> Result<SatelliteRecord, TleError> {
        Ok(SatelliteRecord::from_named_tle(
            &self.object_name,
            self.line1.trim_end(),
            self.line2.trim_end(),
        )?)
    }
}

/// Writer of numbered, compressed CSV artifacts.
#[derive(Debug)]
pub struct CsvArtifactWriter {
    output_dir: Utf8PathBuf,
    compression_level: i32,
    next_number: usize,
    artifact_count: usize,
}

impl CsvArtifactWriter {
    /// Create the writer, creating `output_dir` if needed.
    ///
    /// The first artifact gets the number following the highest `TLE_LEO_<n>.csv.zst` found in
    /// `output_dir`, or 0 if there is none.
    pub fn new(output_dir: impl AsRef<Utf8Path>) -> Result<Self, TleError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        if !output_dir.exists() {
            fs::create_dir_all(&output_dir)?;
            info!("Created artifact directory {output_dir}");
        }

        let mut next_number = 0;
        for entry in output_dir.read_dir_utf8()? {
            if let Some(n) = artifact_number(entry?.file_name()) {
                next_number = next_number.max(n + 1);
            }
        }
        if next_number > 0 {
            info!("{output_dir} already holds artifacts, numbering resumes at {next_number}");
        }

        Ok(Self {
            output_dir,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            next_number,
            artifact_count: 0,
        })
    }

    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Number of artifacts written by this writer.
    pub fn artifact_count(&self) -> usize {
        self.artifact_count
    }

    /// Number the next artifact will carry.
    pub fn next_number(&self) -> usize {
        self.next_number
    }

    /// Decode `records` and write them as the next artifact.
    ///
    /// Every record is decoded before the file is created, so a malformed TLE leaves no
    /// artifact behind and does not consume an artifact number.
    ///
    /// Return
    /// ----------
    /// * Path of the finished `TLE_LEO_<n>.csv.zst` file.
    /// * [`TleError::Io`] with kind `AlreadyExists` if that file appeared since the writer
    ///   was built; nothing is overwritten.
    pub fn write_batch(&mut self, records: &[RawTleRecord]) -> Result<Utf8PathBuf, TleError> {
        let decoded = records
            .iter()
            .map(RawTleRecord::decode)
            .collect::<Result<Vec<_>, _>>()?;

        let path = self
            .output_dir
            .join(format!("{ARTIFACT_PREFIX}{}{ARTIFACT_SUFFIX}", self.next_number));

        let file = BufWriter::new(File::create_new(&path)?);
        let mut encoder = zstd::Encoder::new(file, self.compression_level)?;
        let rows = write_records(&mut encoder, &decoded)?;
        encoder.finish()?.flush()?;

        let size = fs::metadata(&path)?.len();
        info!("Data written to {path} | {rows} records | {size} bytes after compression");

        self.next_number += 1;
        self.artifact_count += 1;
        Ok(path)
    }
}

const ARTIFACT_PREFIX: &str = "TLE_LEO_";
const ARTIFACT_SUFFIX: &str = ".csv.zst";

/// `n` for a file named `TLE_LEO_<n>.csv.zst`.
fn artifact_number(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(ARTIFACT_PREFIX)?
        .strip_suffix(ARTIFACT_SUFFIX)?
        .parse()
        .ok()
}

#[cfg(test)]
mod raw_record_test {
    use super::*;
    use crate::tle::csv_format::read_records;
    use crate::tle::fixed_width::ParseTleError;

    const PAYLOAD: &str = r#"[
        {"OBJECT_NAME": "ISS (ZARYA)", "NORAD_CAT_ID": "25544",
         "TLE_LINE1": "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927",
         "TLE_LINE2": "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537"}
    ]"#;

    #[test]
    fn test_parse_payload() {
        let raw = RawTleRecord::from_json_array(PAYLOAD).unwrap();
        assert_eq!(raw.len(), 1);
        let rec = raw[0].decode().unwrap();
        assert_eq!(rec.name, "ISS (ZARYA)");
        assert_eq!(rec.metadata.catalog_number, "25544");
    }

    #[test]
    fn test_missing_key() {
        let err = RawTleRecord::from_json_array(r#"[{"OBJECT_NAME": "X"}]"#).unwrap_err();
        assert!(matches!(err, TleError::RawRecord(_)));
    }

    #[test]
    fn test_write_batch() {
        let dir = tempfile::tempdir().unwrap();
        let out = Utf8PathBuf::from_path_buf(dir.path().join("data")).unwrap();
        let mut writer = CsvArtifactWriter::new(&out).unwrap();

        let raw = RawTleRecord::from_json_array(PAYLOAD).unwrap();
        let first = writer.write_batch(&raw).unwrap();
        let second = writer.write_batch(&raw).unwrap();

        assert_eq!(first.file_name(), Some("TLE_LEO_0.csv.zst"));
        assert_eq!(second.file_name(), Some("TLE_LEO_1.csv.zst"));
        assert_eq!(writer.artifact_count(), 2);

        let bytes = zstd::decode_all(File::open(&first).unwrap()).unwrap();
        let back = read_records(bytes.as_slice()).unwrap();
        assert_eq!(back, vec![raw[0].decode().unwrap()]);
    }

    #[test]
    fn test_bad_record_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let out = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let mut writer = CsvArtifactWriter::new(&out).unwrap();

        let mut raw = RawTleRecord::from_json_array(PAYLOAD).unwrap();
        raw[0].line2 = "2 25544".into();

        let err = writer.write_batch(&raw).unwrap_err();
        assert!(matches!(
            err,
            TleError::Parse(ParseTleError::TooShortLine { line: 2, .. })
        ));
        assert_eq!(writer.artifact_count(), 0);
        assert!(!out.join("TLE_LEO_0.csv.zst").exists());
    }

    #[test]
    fn test_existing_artifacts_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let out = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let raw = RawTleRecord::from_json_array(PAYLOAD).unwrap();

        let first = CsvArtifactWriter::new(&out).unwrap().write_batch(&raw).unwrap();
        let before = fs::read(&first).unwrap();
        fs::write(out.join("TLE_LEO_notes.csv.zst"), b"x").unwrap();

        let mut rerun = CsvArtifactWriter::new(&out).unwrap();
        assert_eq!(rerun.next_number(), 1);
        let second = rerun.write_batch(&raw).unwrap();

        assert_eq!(second.file_name(), Some("TLE_LEO_1.csv.zst"));
        assert_eq!(rerun.artifact_count(), 1);
        assert_eq!(fs::read(&first).unwrap(), before);
    }

    #[test]
    fn test_file_appearing_later_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let out = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let mut writer = CsvArtifactWriter::new(&out).unwrap();
        fs::write(out.join("TLE_LEO_0.csv.zst"), b"keep").unwrap();

        let raw = RawTleRecord::from_json_array(PAYLOAD).unwrap();
        assert!(matches!(
            writer.write_batch(&raw),
            Err(TleError::Io(e)) if e.kind() == std::io::ErrorKind::AlreadyExists
        ));
        assert_eq!(fs::read(out.join("TLE_LEO_0.csv.zst")).unwrap(), b"keep");
        assert_eq!(writer.artifact_count(), 0);
    }

    #[test]
    fn test_artifact_number() {
        assert_eq!(artifact_number("TLE_LEO_12.csv.zst"), Some(12));
        assert_eq!(artifact_number("TLE_LEO_.csv.zst"), None);
        assert_eq!(artifact_number("TLE_LEO_3.csv"), None);
    }
}
