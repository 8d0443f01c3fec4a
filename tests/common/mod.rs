#![allow(dead_code)]

use std::fs::File;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_relative_eq;
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use tle_dataset::corpus::{CorpusReader, StateSample, ZstdCorpusReader};
use tle_dataset::TleError;

pub const ISS_L1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
pub const ISS_L2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

/// One corpus block: the ISS TLE followed by `n_samples` samples one minute apart.
pub fn block_lines(n_samples: usize, start: f64) -> Vec<String> {
    let mut lines = vec![ISS_L1.to_string(), ISS_L2.to_string()];
    for i in 0..n_samples {
        let t = start + 60.0 * i as f64;
        lines.push(format!("{t},{},-{},0.5,7.1,0.2,-0.3", 6700.0 + i as f64, i));
    }
    lines
}

pub fn write_zst_lines(path: &Utf8Path, lines: &[String]) {
    let mut text = lines.join("\n");
    text.push('\n');
    let data = zstd::encode_all(text.as_bytes(), 3).unwrap();
    File::create(path).unwrap().write_all(&data).unwrap();
}

/// Temporary folder with `n_files` corpus files `file_000.zst`, ... of `blocks` blocks each.
///
/// The first sample of block `b` in file `f` is stamped `f * 1e6 + b * 1e4`.
pub fn corpus_dir(n_files: usize, blocks: usize, block_size: usize) -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    for f in 0..n_files {
        let lines: Vec<String> = (0..blocks)
            .flat_map(|b| block_lines(block_size - 2, f as f64 * 1e6 + b as f64 * 1e4))
            .collect();
        write_zst_lines(&root.join(format!("file_{f:03}.zst")), &lines);
    }
    (dir, root)
}

pub fn assert_sample_close(actual: &StateSample, expected: &StateSample, epsilon: f64) {
    assert_relative_eq!(
        actual.unix_seconds(),
        expected.unix_seconds(),
        epsilon = epsilon
    );
    assert_relative_eq!(actual.position, expected.position, epsilon = epsilon);
    assert_relative_eq!(actual.velocity, expected.velocity, epsilon = epsilon);
}

/// zstd reader counting the files it opens.
#[derive(Clone, Default)]
pub struct CountingReader {
    pub opened: Arc<AtomicUsize>,
}

impl CountingReader {
    pub fn count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl CorpusReader for CountingReader {
    fn open(&self, path: &Utf8Path) -> Result<Box<dyn BufRead + Send>, TleError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        ZstdCorpusReader.open(path)
    }
}
