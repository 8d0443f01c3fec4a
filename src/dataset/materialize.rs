//! # Batch materialization
//!
//! Turning a batch of corpus file names into the [`TrainingStep`]s they hold.
//!
//! * [`Materializer`] – how the files of one batch are decoded: in order on the calling
//!   thread, or on a fixed-size worker pool built once per dataset. Both strategies return
//!   the steps of file 0, then file 1, and so on, whatever order the workers finish in.
//! * [`BatchSource`] – what a lazy dataset needs from its storage: the batch layout and a way
//!   to materialize one batch.
//! * [`CorpusBatchSource`] – the production source: a [`DatasetIndex`] over a folder, a
//!   [`CorpusReader`] and a [`BlockSegmenter`].
//!
//! A materialization either returns every step of the batch or the first error met; no
//! partial batch is ever handed out.
#[cfg(feature = "progress")]
use std::sync::Mutex;
#[cfg(feature = "progress")]
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use rayon::prelude::*;
use rayon::ThreadPool;

use super::params::DatasetParams;
use super::partition::DatasetIndex;
#[cfg(feature = "progress")]
use super::progress_bar::{batch_progress, DecodeTimer};
use crate::corpus::{BlockSegmenter, CorpusReader, TrainingStep, ZstdCorpusReader};
use crate::tle_errors::TleError;

/// Decoding strategy for the files of a batch.
#[derive(Debug)]
pub enum Materializer {
    Sequential,
    Parallel(ThreadPool),
}

impl Materializer {
    /// Worker pool of `workers` threads.
    ///
    /// Return
    /// ----------
    /// * [`TleError::InvalidDatasetParameter`] if `workers` is 0, [`TleError::ThreadPool`] if
    ///   the threads cannot be spawned.
    pub fn parallel(workers: usize) -> Result<Self, TleError> {
        if workers == 0 {
            return Err(TleError::InvalidDatasetParameter(
                "parallel materialization needs at least 1 worker".into(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tle-materialize-{i}"))
            .build()?;
        Ok(Materializer::Parallel(pool))
    }

    pub fn from_params(params: &DatasetParams) -> Result<Self, TleError> {
        if params.parallel {
            Self::parallel(params.workers)
        } else {
            Ok(Materializer::Sequential)
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, Materializer::Parallel(_))
    }

    /// Decode every file of batch `batch` and concatenate the steps in file order.
    pub fn run<F>(
        &self,
        batch: usize,
        files: &[Utf8PathBuf],
        decode: F,
    ) -> Result<Vec<TrainingStep>, TleError>
    where
        F: Fn(&Utf8Path) -> Result<Vec<TrainingStep>, TleError> + Sync,
    {
        #[cfg(feature = "progress")]
        let (pb, timer) = (
            batch_progress(batch, files.len()),
            Mutex::new(DecodeTimer::new(0.2)),
        );
        #[cfg(feature = "progress")]
        let decode = |path: &Utf8Path| {
            let start = Instant::now();
            let res = decode(path);
            let elapsed = start.elapsed();
            if let Ok(mut timer) = timer.lock() {
                timer.record(elapsed);
                pb.set_message(timer.summary());
            }
            pb.inc(1);
            res
        };

        let per_file: Result<Vec<Vec<TrainingStep>>, TleError> = match self {
            Materializer::Sequential => files.iter().map(|p| decode(p.as_path())).collect(),
            Materializer::Parallel(pool) => {
                pool.install(|| files.par_iter().map(|p| decode(p.as_path())).collect())
            }
        };

        #[cfg(feature = "progress")]
        pb.finish_and_clear();

        let steps: Vec<TrainingStep> = per_file?.into_iter().flatten().collect();
        debug!(
            "batch {batch}: {} files, {} steps materialized",
            files.len(),
            steps.len()
        );
        Ok(steps)
    }
}

/// Storage behind a lazy dataset.
pub trait BatchSource {
    /// Batch layout, fixed for the lifetime of the source.
    fn partition(&self) -> &DatasetIndex;

    /// Decode every step of batch `position` (`position < partition().len()`).
    fn materialize(&self, position: usize) -> Result<Vec<TrainingStep>, TleError>;
}

/// Batches of corpus files read through a [`CorpusReader`].
#[derive(Debug)]
pub struct CorpusBatchSource<R = ZstdCorpusReader> {
    index: DatasetIndex,
    reader: R,
    segmenter: BlockSegmenter,
    materializer: Materializer,
}

impl CorpusBatchSource<ZstdCorpusReader> {
    /// Index `folder` and prepare zstd materialization with `params`.
    pub fn new(folder: impl AsRef<Utf8Path>, params: &DatasetParams) -> Result<Self, TleError> {
        Self::with_reader(folder, params, ZstdCorpusReader)
    }
}

impl<R: CorpusReader> CorpusBatchSource<R> {
    /// Index `folder` and read its files with `reader`.
    ///
    /// The folder is listed and the worker pool is built here, once.
    ///
    /// Return
    /// ----------
    /// * [`TleError::Io`] / [`TleError::EmptyCorpus`] from the folder listing,
    ///   [`TleError::InvalidDatasetParameter`] for a bad segmentation setup, or
    ///   [`TleError::ThreadPool`] if the workers cannot be spawned.
    pub fn with_reader(
        folder: impl AsRef<Utf8Path>,
        params: &DatasetParams,
        reader: R,
    ) -> Result<Self, TleError> {
        let index = DatasetIndex::from_folder(
            folder,
            params.batch_size,
            params.shuffle.then_some(params.seed),
        )?;
        let segmenter = BlockSegmenter::new(params.block_size, params.selection)?;
        let materializer = Materializer::from_params(params)?;

        info!(
            "Dataset {}: {} batches, {}",
            index.folder(),
            index.len(),
            if materializer.is_parallel() {
                format!("{} workers", params.workers)
            } else {
                "sequential".to_string()
            }
        );

        Ok(Self {
            index,
            reader,
            segmenter,
            materializer,
        })
    }

    pub fn segmenter(&self) -> &BlockSegmenter {
        &self.segmenter
    }

    /// Decode one corpus file.
    pub fn load_file(&self, path: &Utf8Path) -> Result<Vec<TrainingStep>, TleError> {
        let lines = self.reader.stream_lines(path)?;
        self.segmenter.segment(path.as_str(), lines)
    }
}

impl<R: CorpusReader> BatchSource for CorpusBatchSource<R> {
    fn partition(&self) -> &DatasetIndex {
        &self.index
    }

    fn materialize(&self, position: usize) -> Result<Vec<TrainingStep>, TleError> {
        let files = self
            .index
            .batch_paths(position)
            .ok_or(TleError::IndexOutOfRange {
                index: position as isize,
                len: self.index.len(),
            })?;
        self.materializer
            .run(position, &files, |path: &Utf8Path| self.load_file(path))
    }
}
