//! # Lazy batched dataset
//!
//! [`LazyBatchedDataset`] serves the batches of a corpus folder one at a time, decoding a
//! batch only when it is asked for and keeping at most one batch in memory. Iteration is
//! either cyclic or one-pass, see [`IterationMode`].
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use super::materialize::{BatchSource, CorpusBatchSource};
use super::params::{DatasetParams, IterationMode};
use super::partition::DatasetIndex;
use crate::corpus::{CorpusReader, TrainingStep, ZstdCorpusReader};
use crate::tle_errors::TleError;

#[derive(Debug)]
struct LoadedBatch {
    position: usize,
    steps: Vec<TrainingStep>,
}

/// Batch-indexed view over a corpus folder that decodes one batch at a time.
///
/// At most one batch is resident: asking for the cached batch again returns it without
/// touching the disk, asking for any other batch evicts it first. Sequential consumers use
/// [`LazyBatchedDataset::next_batch`]; random access goes through
/// [`LazyBatchedDataset::get`], where negative indices count from the end.
///
/// A dataset is meant to be driven by one consumer (`&mut self`); the parallelism lives
/// inside a single materialization.
///
/// Example
/// -----------------
/// ```rust,no_run
/// use tle_dataset::dataset::{DatasetParams, LazyBatchedDataset};
///
/// let params = DatasetParams::builder().batch_size(4).build()?;
/// let mut dataset = LazyBatchedDataset::new("data/corpus", &params)?;
///
/// for _ in 0..dataset.len() {
///     if let Some(batch) = dataset.next_batch() {
///         println!("{} training steps", batch?.len());
///     }
/// }
/// # Ok::<(), tle_dataset::tle_errors::TleError>(())
/// ```
#[derive(Debug)]
pub struct LazyBatchedDataset<S = CorpusBatchSource<ZstdCorpusReader>> {
    source: S,
    loaded: Option<LoadedBatch>,
    cursor: usize,
    iteration: IterationMode,
}

impl LazyBatchedDataset {
    /// Index `folder` and read its zstd corpus files.
    pub fn new(folder: impl AsRef<Utf8Path>, params: &DatasetParams) -> Result<Self, TleError> {
        Ok(Self::from_source(
            CorpusBatchSource::new(folder, params)?,
            params.iteration,
        ))
    }
}

impl<R: CorpusReader> LazyBatchedDataset<CorpusBatchSource<R>> {
    /// Index `folder` and read its files through `reader`.
    pub fn with_reader(
        folder: impl AsRef<Utf8Path>,
        params: &DatasetParams,
        reader: R,
    ) -> Result<Self, TleError> {
        Ok(Self::from_source(
            CorpusBatchSource::with_reader(folder, params, reader)?,
            params.iteration,
        ))
    }
}

impl<S: BatchSource> LazyBatchedDataset<S> {
    pub fn from_source(source: S, iteration: IterationMode) -> Self {
        Self {
            source,
            loaded: None,
            cursor: 0,
            iteration,
        }
    }

    /// Number of batches.
    pub fn len(&self) -> usize {
        self.index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index().is_empty()
    }

    pub fn index(&self) -> &DatasetIndex {
        self.source.partition()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Position the next call to [`next_batch`](Self::next_batch) will serve.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Position of the resident batch, if any.
    pub fn cached_position(&self) -> Option<usize> {
        self.loaded.as_ref().map(|b| b.position)
    }

    /// Steps of batch `index`.
    ///
    /// Arguments
    /// -----------------
    /// * `index` – Batch index; negative values count from the end (`-1` is the last batch).
    ///
    /// Return
    /// ----------
    /// * The steps of the batch, borrowed from the cache.
    /// * [`TleError::IndexOutOfRange`] if `|index| >= len()`, or the materialization error.
    ///   After a failed materialization nothing is cached.
    pub fn get(&mut self, index: isize) -> Result<&[TrainingStep], TleError> {
        let position = self.index().resolve(index)?;
        self.ensure_loaded(position)?;
        Ok(self.cached_steps())
    }

    /// Serve the batch under the cursor and advance it.
    ///
    /// In [`IterationMode::Cyclic`] the cursor wraps to 0 after the last batch and this never
    /// returns `None`. In [`IterationMode::OnePass`] it returns `None` once every batch has
    /// been served. A failed materialization does not move the cursor.
    pub fn next_batch(&mut self) -> Option<Result<&[TrainingStep], TleError>> {
        let len = self.len();
        if self.cursor >= len {
            match self.iteration {
                IterationMode::OnePass => return None,
                IterationMode::Cyclic => self.cursor = 0,
            }
        }

        let position = self.cursor;
        if let Err(e) = self.ensure_loaded(position) {
            return Some(Err(e));
        }

        self.cursor = position + 1;
        if self.iteration == IterationMode::Cyclic {
            self.cursor %= len;
        }
        Some(Ok(self.cached_steps()))
    }

    /// Move the cursor back to batch 0. The cache is kept.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Full paths of the files of batch `index` (negative indices allowed).
    pub fn batch_files(&self, index: isize) -> Result<Vec<Utf8PathBuf>, TleError> {
        let position = self.index().resolve(index)?;
        self.index()
            .batch_paths(position)
            .ok_or(TleError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    fn ensure_loaded(&mut self, position: usize) -> Result<(), TleError> {
        if self.cached_position() == Some(position) {
            debug!("batch {position}: cache hit");
            return Ok(());
        }

        // evict before decoding, only one batch is ever resident
        self.loaded = None;
        let steps = self.source.materialize(position)?;
        self.loaded = Some(LoadedBatch { position, steps });
        Ok(())
    }

    fn cached_steps(&self) -> &[TrainingStep] {
        self.loaded
            .as_ref()
            .map(|b| b.steps.as_slice())
            .unwrap_or_default()
    }
}
