//! # Streaming line reader over compressed corpus files
//!
//! [`CompressedLineReader`] yields the lines of a zstd-framed UTF-8 file one at a time. Only
//! the decoder window and the current line are held in memory, never the whole decompressed
//! text.
//!
//! ## Error Handling
//! -----------------
//! * Opening the file fails with [`TleError::Io`].
//! * A failure reported by the operating system while reading yields one [`TleError::Io`]
//!   item.
//! * A corrupt frame or a line that is not valid UTF-8 yields one [`TleError::Decode`] item.
//!
//! The iterator is exhausted after its first error.
use std::io::{self, BufRead};

use camino::Utf8Path;
use log::warn;

use super::{CorpusReader, ZstdCorpusReader};
use crate::tle_errors::TleError;

/// Iterator over the lines of a (decompressed) text stream.
///
/// Line terminators (`\n` or `\r\n`) are stripped.
pub struct CompressedLineReader {
    source: String,
    reader: Box<dyn BufRead + Send>,
    buf: String,
    line_no: usize,
    done: bool,
}

impl CompressedLineReader {
    /// Open a zstd-compressed file.
    pub fn open(path: &Utf8Path) -> Result<Self, TleError> {
        ZstdCorpusReader.stream_lines(path)
    }

    /// Wrap an already opened stream; `source` names it in error messages.
    pub fn from_reader(source: &str, reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            source: source.to_string(),
            reader,
            buf: String::new(),
            line_no: 0,
            done: false,
        }
    }

    /// Number of lines produced so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl Iterator for CompressedLineReader {
    type Item = Result<String, TleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.line_no += 1;
                if self.buf.ends_with('\n') {
                    self.buf.pop();
                    if self.buf.ends_with('\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(std::mem::take(&mut self.buf)))
            }
            Err(e) => {
                self.done = true;
                Some(Err(self.read_error(e)))
            }
        }
    }
}

impl CompressedLineReader {
    /// Errors carrying an OS code come from the storage; anything else (zstd reports corrupt
    /// frames as `ErrorKind::Other`, bad UTF-8 as `InvalidData`) is a content problem.
    fn read_error(&self, e: io::Error) -> TleError {
        if e.raw_os_error().is_some() {
            warn!("{}: read failed after line {}: {e}", self.source, self.line_no);
            TleError::Io(e)
        } else {
            TleError::Decode {
                path: self.source.clone(),
                reason: format!("after line {}: {e}", self.line_no),
            }
        }
    }
}
