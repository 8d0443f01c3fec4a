//! # Corpus folder listing and batch partition
//!
//! A [`DatasetIndex`] is built once per dataset: the folder is listed, its file names are
//! sorted, cut into consecutive batches of `batch_size` names, and the batch order is
//! optionally shuffled with a seeded generator. The index never changes afterwards.
//!
//! Only regular files directly inside the folder are listed; sub-directories are skipped.
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::tle_errors::TleError;

/// Sorted names of the regular files in `folder`.
///
/// Return
/// ----------
/// * [`TleError::Io`] if the folder cannot be listed (missing, not a directory, or holding a
///   non UTF-8 name).
pub fn list_corpus_files(folder: &Utf8Path) -> Result<Vec<String>, TleError> {
    let mut names = Vec::new();
    for entry in folder.read_dir_utf8()? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string());
        }
    }
    names.sort_unstable();
    Ok(names)
}

/// Cut `items` into consecutive groups of `size`; the last group holds the remainder.
pub fn partition<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items.chunks(size.max(1)).map(<[T]>::to_vec).collect()
}

/// Immutable batch layout of a corpus folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetIndex {
    folder: Utf8PathBuf,
    batches: Vec<Vec<String>>,
}

impl DatasetIndex {
    /// List `folder` and partition its files.
    ///
    /// Arguments
    /// -----------------
    /// * `folder` – Directory holding the corpus files.
    /// * `batch_size` – Files per batch, at least 1.
    /// * `shuffle_seed` – When set, the batch order is shuffled with this seed.
    ///
    /// Return
    /// ----------
    /// * [`TleError::Io`] if the folder cannot be listed, [`TleError::EmptyCorpus`] if it holds
    ///   no regular file.
    pub fn from_folder(
        folder: impl AsRef<Utf8Path>,
        batch_size: usize,
        shuffle_seed: Option<u64>,
    ) -> Result<Self, TleError> {
        let folder = folder.as_ref();
        let files = list_corpus_files(folder)?;
        Self::from_files(folder, files, batch_size, shuffle_seed)
    }

    /// Partition an explicit file list, names relative to `folder`.
    pub fn from_files(
        folder: impl AsRef<Utf8Path>,
        files: Vec<String>,
        batch_size: usize,
        shuffle_seed: Option<u64>,
    ) -> Result<Self, TleError> {
        let folder = folder.as_ref().to_path_buf();
        if files.is_empty() {
            return Err(TleError::EmptyCorpus(folder.to_string()));
        }
        if batch_size == 0 {
            return Err(TleError::InvalidDatasetParameter(
                "batch_size must be at least 1".into(),
            ));
        }

        let mut batches = partition(&files, batch_size);
        if let Some(seed) = shuffle_seed {
            batches.shuffle(&mut StdRng::seed_from_u64(seed));
        }

        debug!(
            "{folder}: {} files in {} batches of up to {batch_size}",
            files.len(),
            batches.len()
        );
        Ok(Self { folder, batches })
    }

    pub fn folder(&self) -> &Utf8Path {
        &self.folder
    }

    /// Number of batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Always false: an index holds at least one batch.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Map a possibly negative index to a batch position.
    ///
    /// `-1` is the last batch; any `|index| >= len` is rejected.
    pub fn resolve(&self, index: isize) -> Result<usize, TleError> {
        let len = self.len();
        if index.unsigned_abs() >= len {
            return Err(TleError::IndexOutOfRange { index, len });
        }
        Ok(index.rem_euclid(len as isize) as usize)
    }

    /// File names of batch `position`.
    pub fn batch(&self, position: usize) -> Option<&[String]> {
        self.batches.get(position).map(Vec::as_slice)
    }

    /// Full paths of the files of batch `position`, in batch order.
    pub fn batch_paths(&self, position: usize) -> Option<Vec<Utf8PathBuf>> {
        self.batch(position)
            .map(|names| names.iter().map(|n| self.folder.join(n)).collect())
    }

    pub fn batches(&self) -> &[Vec<String>] {
        &self.batches
    }
}
