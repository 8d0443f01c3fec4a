//! # Lazy batched training dataset
//!
//! Batch-indexed access to a folder of compressed corpus files, decoding one batch of files
//! at a time into [`TrainingStep`](crate::corpus::TrainingStep)s.
//!
//! ## Overview
//! -----------------
//! * [`DatasetParams`] / [`DatasetParamsBuilder`] – validated configuration (batch size,
//!   shuffle seed, worker count, block layout, sample selection, iteration mode).
//! * [`DatasetIndex`] – the folder listing cut into batches, shuffled once at construction.
//! * [`Materializer`] – sequential or worker-pool decoding of the files of one batch.
//! * [`BatchSource`] / [`CorpusBatchSource`] – the storage seam between the lazy dataset and
//!   the corpus reader.
//! * [`LazyBatchedDataset`] – random access with negative indices, cyclic or one-pass cursor
//!   iteration, and a single-slot cache.
//!
//! ## Determinism
//! -----------------
//! With the same folder content and the same [`DatasetParams`]:
//! * the batch order is the same (the shuffle is seeded),
//! * every batch yields the same steps in the same order, sequential or parallel,
//! * random sample selection picks the same samples.
//!
//! ## Progress UI (feature: `progress`)
//! -----------------
//! When compiled with the `progress` feature, each materialization renders a progress bar
//! (via `indicatif`) with the last and average per-file decoding time.
pub mod lazy;
pub mod materialize;
pub mod params;
pub mod partition;
#[cfg(feature = "progress")]
pub(crate) mod progress_bar;

pub use lazy::LazyBatchedDataset;
pub use materialize::{BatchSource, CorpusBatchSource, Materializer};
pub use params::{DatasetParams, DatasetParamsBuilder, IterationMode};
pub use partition::DatasetIndex;
