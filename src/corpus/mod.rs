//! # Compressed trajectory corpus
//!
//! Reading side of the training corpus: zstd-compressed text files made of fixed-size blocks,
//! each block pairing one TLE with the state samples propagated from it.
//!
//! Modules
//! -----------------
//! * [`line_reader`](crate::corpus::line_reader) – [`CompressedLineReader`], a streaming line
//!   iterator over a decompressed file.
//! * [`state_sample`](crate::corpus::state_sample) – [`StateSample`], one
//!   `t,x,y,z,vx,vy,vz` line.
//! * [`block_segmenter`](crate::corpus::block_segmenter) – [`BlockSegmenter`], cutting line
//!   streams into [`TrainingStep`]s.
//!
//! Readers
//! -----------------
//! File access goes through the [`CorpusReader`] trait, so the dataset layer can be driven by
//! another storage format (or an instrumented reader in tests) without touching the
//! segmentation code. [`ZstdCorpusReader`] is the production implementation.
use std::fs::File;
use std::io::{BufRead, BufReader};

use camino::Utf8Path;

use crate::tle_errors::TleError;

pub mod block_segmenter;
pub mod line_reader;
pub mod state_sample;

pub use block_segmenter::{BlockSegmenter, SampleSelection, TrainingStep};
pub use line_reader::CompressedLineReader;
pub use state_sample::StateSample;

/// Access to the text content of corpus files.
///
/// Implementations must be shareable across the materialization workers.
pub trait CorpusReader: Send + Sync {
    /// Open `path` as a buffered text stream.
    fn open(&self, path: &Utf8Path) -> Result<Box<dyn BufRead + Send>, TleError>;

    /// Stream the lines of `path`, without terminators.
    fn stream_lines(&self, path: &Utf8Path) -> Result<CompressedLineReader, TleError> {
        Ok(CompressedLineReader::from_reader(
            path.as_str(),
            self.open(path)?,
        ))
    }
}

/// Reader of zstd-compressed corpus files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZstdCorpusReader;

impl CorpusReader for ZstdCorpusReader {
    fn open(&self, path: &Utf8Path) -> Result<Box<dyn BufRead + Send>, TleError> {
        let file = File::open(path)?;
        let decoder = zstd::Decoder::new(file)?;
        Ok(Box::new(BufReader::new(decoder)))
    }
}

#[cfg(test)]
mod corpus_reader_test {
    use super::*;
    use camino::Utf8PathBuf;
    use std::io::Write;

    #[test]
    fn test_zstd_reader_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("c.zst")).unwrap();
        let data = zstd::encode_all(&b"a\nb\n"[..], 3).unwrap();
        File::create(&path).unwrap().write_all(&data).unwrap();

        let lines: Vec<String> = ZstdCorpusReader
            .stream_lines(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_file_is_io() {
        let res = ZstdCorpusReader.stream_lines(Utf8Path::new("/nonexistent/corpus.zst"));
        assert!(matches!(res, Err(TleError::Io(_))));
    }
}
