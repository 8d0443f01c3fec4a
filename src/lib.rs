pub mod constants;
pub mod corpus;
pub mod dataset;
pub mod tle;
pub mod tle_errors;

pub use corpus::{SampleSelection, StateSample, TrainingStep};
pub use dataset::{DatasetParams, IterationMode, LazyBatchedDataset};
pub use tle::SatelliteRecord;
pub use tle_errors::TleError;
