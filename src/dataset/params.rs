//! Dataset configuration: [`DatasetParams`], its validating [`DatasetParamsBuilder`] and the
//! cursor [`IterationMode`].
use std::fmt;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_BLOCK_SIZE, DEFAULT_SHUFFLE_SEED, DEFAULT_WORKERS, MIN_BLOCK_SIZE,
};
use crate::corpus::SampleSelection;
use crate::tle_errors::TleError;

/// Behaviour of [`LazyBatchedDataset::next_batch`](crate::dataset::LazyBatchedDataset::next_batch)
/// once the last batch has been served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterationMode {
    /// Wrap around to batch 0, forever.
    #[default]
    Cyclic,
    /// Stop after the last batch until the cursor is rewound.
    OnePass,
}

/// Configuration of a [`LazyBatchedDataset`](crate::dataset::LazyBatchedDataset).
///
/// Fields
/// -----------------
/// * `batch_size` – number of corpus files per batch (the last batch may be shorter).
/// * `shuffle` – shuffle the batch order once, at construction.
/// * `seed` – seed of the batch-order shuffle; the same seed and folder give the same order.
/// * `parallel` – decode the files of a batch on a worker pool instead of the calling thread.
/// * `workers` – size of the worker pool, ignored when `parallel` is off.
/// * `block_size` – lines per corpus block (2 TLE lines + samples).
/// * `selection` – which samples of a block are kept.
/// * `iteration` – cyclic or one-pass cursor iteration.
///
/// Defaults
/// -----------------
/// * `batch_size`: 8
/// * `shuffle`: true, `seed`: 42
/// * `parallel`: true, `workers`: 5
/// * `block_size`: 5003
/// * `selection`: [`SampleSelection::Exhaustive`]
/// * `iteration`: [`IterationMode::Cyclic`]
///
/// Build a validated value with [`DatasetParams::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetParams {
    pub batch_size: usize,
    pub shuffle: bool,
    pub seed: u64,
    pub parallel: bool,
    pub workers: usize,
    pub block_size: usize,
    pub selection: SampleSelection,
    pub iteration: IterationMode,
}

impl DatasetParams {
    pub fn builder() -> DatasetParamsBuilder {
        DatasetParamsBuilder::new()
    }
}

impl Default for DatasetParams {
    fn default() -> Self {
        DatasetParams {
            batch_size: DEFAULT_BATCH_SIZE,
            shuffle: true,
            seed: DEFAULT_SHUFFLE_SEED,
            parallel: true,
            workers: DEFAULT_WORKERS,
            block_size: DEFAULT_BLOCK_SIZE,
            selection: SampleSelection::Exhaustive,
            iteration: IterationMode::Cyclic,
        }
    }
}

/// Fluent builder for [`DatasetParams`].
#[derive(Debug, Clone)]
pub struct DatasetParamsBuilder {
    params: DatasetParams,
}

impl Default for DatasetParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: DatasetParams::default(),
        }
    }

    pub fn batch_size(mut self, v: usize) -> Self {
        self.params.batch_size = v;
        self
    }
    pub fn shuffle(mut self, v: bool) -> Self {
        self.params.shuffle = v;
        self
    }
    pub fn seed(mut self, v: u64) -> Self {
        self.params.seed = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.params.parallel = v;
        self
    }
    pub fn workers(mut self, v: usize) -> Self {
        self.params.workers = v;
        self
    }
    pub fn block_size(mut self, v: usize) -> Self {
        self.params.block_size = v;
        self
    }
    pub fn selection(mut self, v: SampleSelection) -> Self {
        self.params.selection = v;
        self
    }
    pub fn iteration(mut self, v: IterationMode) -> Self {
        self.params.iteration = v;
        self
    }

    /// Validate and return the parameters.
    ///
    /// Return
    /// ----------
    /// * [`TleError::InvalidDatasetParameter`] naming the first rejected field.
    pub fn build(self) -> Result<DatasetParams, TleError> {
        let p = &self.params;

        if p.batch_size == 0 {
            return Err(TleError::InvalidDatasetParameter(
                "batch_size must be at least 1".into(),
            ));
        }
        if p.parallel && p.workers == 0 {
            return Err(TleError::InvalidDatasetParameter(
                "workers must be at least 1 when parallel materialization is on".into(),
            ));
        }
        if p.block_size < MIN_BLOCK_SIZE {
            return Err(TleError::InvalidDatasetParameter(format!(
                "block_size must be at least {MIN_BLOCK_SIZE}, got {}",
                p.block_size
            )));
        }
        if let SampleSelection::RandomSubsample { count: 0, .. } = p.selection {
            return Err(TleError::InvalidDatasetParameter(
                "random subsample count must be at least 1".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for DatasetParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selection = match self.selection {
            SampleSelection::Exhaustive => "exhaustive".to_string(),
            SampleSelection::RandomSubsample { count, seed } => {
                format!("random({count}, seed={seed})")
            }
        };

        if f.alternate() {
            writeln!(f, "Dataset Parameters")?;
            writeln!(f, "------------------")?;
            writeln!(f, "  batch_size = {:<10}# files per batch", self.batch_size)?;
            writeln!(
                f,
                "  shuffle    = {:<10}# seed {}",
                self.shuffle, self.seed
            )?;
            writeln!(
                f,
                "  parallel   = {:<10}# {} workers",
                self.parallel, self.workers
            )?;
            writeln!(f, "  block_size = {:<10}# lines per block", self.block_size)?;
            writeln!(f, "  selection  = {selection}")?;
            writeln!(f, "  iteration  = {:?}", self.iteration)
        } else {
            write!(
                f,
                "DatasetParams(batch_size={}, shuffle={}, seed={}, parallel={}, workers={}, block_size={}, selection={selection}, iteration={:?})",
                self.batch_size,
                self.shuffle,
                self.seed,
                self.parallel,
                self.workers,
                self.block_size,
                self.iteration,
            )
        }
    }
}
