//! # Block segmentation of corpus line streams
//!
//! A corpus file is a sequence of fixed-size **blocks**. Each block holds one TLE on its
//! first two lines, followed by the state samples propagated from it:
//!
//! ```text
//! 1 NNNNNC ...                      <- TLE line 1
//! 2 NNNNN  ...                      <- TLE line 2
//! t,x,y,z,vx,vy,vz                  <- block_size - 2 state samples
//! ...
//! ```
//!
//! [`BlockSegmenter`] cuts a line stream into such blocks and turns each one into a
//! [`TrainingStep`]. Trailing lines that do not fill a whole block are dropped.
//!
//! Sample Selection
//! -----------------
//! * [`SampleSelection::Exhaustive`] keeps every sample of the block.
//! * [`SampleSelection::RandomSubsample`] keeps `count` samples drawn without replacement,
//!   still in time order. The draw is seeded from `(seed, block index)`, so the same file
//!   always yields the same steps.
//!
//! Every sample line is validated in both modes, selected or not.
use itertools::Itertools;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::state_sample::StateSample;
use crate::constants::{Minutes, MIN_BLOCK_SIZE, SECONDS_PER_MINUTE, TLE_LINE_COUNT};
use crate::tle::SatelliteRecord;
use crate::tle_errors::TleError;

/// How state samples are picked inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleSelection {
    #[default]
    Exhaustive,
    RandomSubsample { count: usize, seed: u64 },
}

/// One decoded block: a TLE and the samples propagated from it.
///
/// `elapsed_minutes[i]` is the time between the TLE epoch and `samples[i]`, in minutes; it is
/// negative for samples taken before the epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingStep {
    pub record: SatelliteRecord,
    pub samples: Box<[StateSample]>,
    pub elapsed_minutes: Box<[Minutes]>,
}

impl TrainingStep {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Splits line streams into [`TrainingStep`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSegmenter {
    block_size: usize,
    selection: SampleSelection,
}

impl BlockSegmenter {
    /// Build a segmenter.
    ///
    /// Return
    /// ----------
    /// * [`TleError::InvalidDatasetParameter`] if `block_size` cannot hold a TLE and one sample,
    ///   or if a random subsample asks for zero samples.
    pub fn new(block_size: usize, selection: SampleSelection) -> Result<Self, TleError> {
        if block_size < MIN_BLOCK_SIZE {
            return Err(TleError::InvalidDatasetParameter(format!(
                "block_size must be at least {MIN_BLOCK_SIZE}, got {block_size}"
            )));
        }
        if let SampleSelection::RandomSubsample { count: 0, .. } = selection {
            return Err(TleError::InvalidDatasetParameter(
                "random subsample count must be at least 1".into(),
            ));
        }
        Ok(Self {
            block_size,
            selection,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn selection(&self) -> SampleSelection {
        self.selection
    }

    /// Number of state samples in a full block.
    pub fn samples_per_block(&self) -> usize {
        self.block_size - TLE_LINE_COUNT
    }

    /// Segment a line stream.
    ///
    /// Arguments
    /// -----------------
    /// * `source` – Name of the stream, used in error messages and logs.
    /// * `lines` – Lines without terminators; the first error met is returned as is.
    ///
    /// Return
    /// ----------
    /// * One [`TrainingStep`] per complete block, in stream order. Fails on the first block
    ///   whose TLE or samples do not decode.
    pub fn segment<I>(&self, source: &str, lines: I) -> Result<Vec<TrainingStep>, TleError>
    where
        I: IntoIterator<Item = Result<String, TleError>>,
    {
        let mut steps = Vec::new();
        let blocks = lines.into_iter().chunks(self.block_size);

        for (block_index, chunk) in (&blocks).into_iter().enumerate() {
            let block: Vec<String> = chunk.collect::<Result<_, _>>()?;
            if block.len() < self.block_size {
                debug!(
                    "{source}: dropping {} trailing lines, a block needs {}",
                    block.len(),
                    self.block_size
                );
                break;
            }
            steps.push(self.decode_block(source, block_index, &block)?);
        }

        debug!("{source}: {} blocks segmented", steps.len());
        Ok(steps)
    }

    /// Segment lines already held in memory.
    pub fn segment_lines<S: AsRef<str>>(
        &self,
        source: &str,
        lines: &[S],
    ) -> Result<Vec<TrainingStep>, TleError> {
        self.segment(source, lines.iter().map(|l| Ok(l.as_ref().to_string())))
    }

    fn decode_block(
        &self,
        source: &str,
        block_index: usize,
        block: &[String],
    ) -> Result<TrainingStep, TleError> {
        let first_line = block_index * self.block_size + 1;

        let record = SatelliteRecord::from_tle_lines(&block[0], &block[1]).inspect_err(|e| {
            warn!("{source}:{first_line}: TLE rejected: {e}");
        })?;

        let samples = block[TLE_LINE_COUNT..]
            .iter()
            .enumerate()
            .map(|(i, line)| {
                line.parse::<StateSample>().map_err(|e| {
                    TleError::format_at(source, first_line + TLE_LINE_COUNT + i, e)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let samples = self.select(samples, block_index);
        let epoch = record.epoch_unix_seconds();
        let elapsed_minutes = samples
            .iter()
            .map(|s| (s.unix_seconds() - epoch) / SECONDS_PER_MINUTE)
            .collect();

        Ok(TrainingStep {
            record,
            samples: samples.into_boxed_slice(),
            elapsed_minutes,
        })
    }

    fn select(&self, samples: Vec<StateSample>, block_index: usize) -> Vec<StateSample> {
        match self.selection {
            SampleSelection::Exhaustive => samples,
            SampleSelection::RandomSubsample { count, .. } if count >= samples.len() => samples,
            SampleSelection::RandomSubsample { count, seed } => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(block_index as u64));
                let mut picked = rand::seq::index::sample(&mut rng, samples.len(), count).into_vec();
                picked.sort_unstable();

                let mut samples: Vec<Option<StateSample>> = samples.into_iter().map(Some).collect();
                picked
                    .into_iter()
                    .filter_map(|i| samples[i].take())
                    .collect()
            }
        }
    }
}

impl Default for BlockSegmenter {
    fn default() -> Self {
        Self {
            block_size: crate::constants::DEFAULT_BLOCK_SIZE,
            selection: SampleSelection::Exhaustive,
        }
    }
}
