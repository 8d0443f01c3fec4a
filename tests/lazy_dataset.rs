mod common;

use std::fs;

use approx::assert_relative_eq;
use common::{block_lines, corpus_dir, write_zst_lines, CountingReader};
use tle_dataset::corpus::SampleSelection;
use tle_dataset::dataset::{DatasetParams, IterationMode, LazyBatchedDataset};
use tle_dataset::TleError;

const BLOCK_SIZE: usize = 12;

fn params(batch_size: usize, parallel: bool) -> DatasetParams {
    DatasetParams::builder()
        .batch_size(batch_size)
        .shuffle(false)
        .parallel(parallel)
        .workers(3)
        .block_size(BLOCK_SIZE)
        .build()
        .unwrap()
}

#[test]
fn test_seven_files_three_batches() {
    let (_dir, root) = corpus_dir(7, 2, BLOCK_SIZE);
    let mut ds = LazyBatchedDataset::new(&root, &params(3, false)).unwrap();

    assert_eq!(ds.len(), 3);
    let sizes: Vec<usize> = ds.index().batches().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 1]);

    let last = ds.get(-1).unwrap();
    assert_eq!(last.len(), 2);
    assert!(last.iter().all(|s| s.len() == BLOCK_SIZE - 2));
    assert_relative_eq!(last[0].samples[0].unix_seconds(), 6e6, epsilon = 1e-6);
    assert_relative_eq!(last[1].samples[0].unix_seconds(), 6e6 + 1e4, epsilon = 1e-6);
}

#[test]
fn test_batch_files_follow_sorted_listing() {
    let (_dir, root) = corpus_dir(4, 1, BLOCK_SIZE);
    let ds = LazyBatchedDataset::new(&root, &params(3, false)).unwrap();

    let names: Vec<String> = ds
        .batch_files(0)
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["file_000.zst", "file_001.zst", "file_002.zst"]);
}

#[test]
fn test_sequential_and_parallel_agree() {
    let (_dir, root) = corpus_dir(6, 3, BLOCK_SIZE);
    let mut seq = LazyBatchedDataset::new(&root, &params(4, false)).unwrap();
    let mut par = LazyBatchedDataset::new(&root, &params(4, true)).unwrap();

    for i in 0..seq.len() as isize {
        let a = seq.get(i).unwrap().to_vec();
        let b = par.get(i).unwrap();
        assert_eq!(a.as_slice(), b);
    }
}

#[test]
fn test_shuffle_is_reproducible() {
    let (_dir, root) = corpus_dir(10, 1, BLOCK_SIZE);
    let p = DatasetParams::builder()
        .batch_size(1)
        .seed(11)
        .block_size(BLOCK_SIZE)
        .build()
        .unwrap();

    let a = LazyBatchedDataset::new(&root, &p).unwrap();
    let b = LazyBatchedDataset::new(&root, &p).unwrap();
    assert_eq!(a.index(), b.index());
}

#[test]
fn test_cache_avoids_reopening_files() {
    let (_dir, root) = corpus_dir(5, 1, BLOCK_SIZE);
    let reader = CountingReader::default();
    let mut ds = LazyBatchedDataset::with_reader(&root, &params(2, true), reader.clone()).unwrap();

    ds.get(0).unwrap();
    assert_eq!(reader.count(), 2);
    ds.get(0).unwrap();
    ds.get(-3).unwrap();
    assert_eq!(reader.count(), 2);

    ds.get(2).unwrap();
    assert_eq!(reader.count(), 3);
    ds.get(0).unwrap();
    assert_eq!(reader.count(), 5);
}

#[test]
fn test_cyclic_iteration_wraps() {
    let (_dir, root) = corpus_dir(3, 1, BLOCK_SIZE);
    let mut ds = LazyBatchedDataset::new(&root, &params(2, false)).unwrap();

    let mut served = Vec::new();
    for _ in 0..5 {
        let batch = ds.next_batch().unwrap().unwrap();
        served.push(batch.len());
    }
    assert_eq!(served, vec![2, 1, 2, 1, 2]);
}

#[test]
fn test_one_pass_iteration() {
    let (_dir, root) = corpus_dir(3, 1, BLOCK_SIZE);
    let p = DatasetParams::builder()
        .batch_size(2)
        .shuffle(false)
        .block_size(BLOCK_SIZE)
        .iteration(IterationMode::OnePass)
        .build()
        .unwrap();
    let mut ds = LazyBatchedDataset::new(&root, &p).unwrap();

    let mut count = 0;
    while let Some(batch) = ds.next_batch() {
        batch.unwrap();
        count += 1;
    }
    assert_eq!(count, 2);

    ds.rewind();
    assert!(ds.next_batch().is_some());
}

#[test]
fn test_empty_and_missing_folders() {
    let dir = tempfile::tempdir().unwrap();
    let root = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    assert!(matches!(
        LazyBatchedDataset::new(&root, &params(2, false)),
        Err(TleError::EmptyCorpus(_))
    ));
    assert!(matches!(
        LazyBatchedDataset::new(root.join("nope"), &params(2, false)),
        Err(TleError::Io(_))
    ));
}

#[test]
fn test_zero_workers_from_struct_literal() {
    let (_dir, root) = corpus_dir(2, 1, BLOCK_SIZE);
    let params = DatasetParams {
        workers: 0,
        ..params(2, true)
    };
    assert!(matches!(
        LazyBatchedDataset::new(&root, &params),
        Err(TleError::InvalidDatasetParameter(_))
    ));
}

#[test]
fn test_index_out_of_range() {
    let (_dir, root) = corpus_dir(7, 1, BLOCK_SIZE);
    let mut ds = LazyBatchedDataset::new(&root, &params(3, false)).unwrap();

    assert_eq!(
        ds.get(3).unwrap_err(),
        TleError::IndexOutOfRange { index: 3, len: 3 }
    );
    assert_eq!(
        ds.get(-4).unwrap_err(),
        TleError::IndexOutOfRange { index: -4, len: 3 }
    );
}

#[test]
fn test_malformed_file_fails_whole_batch() {
    let (_dir, root) = corpus_dir(2, 1, BLOCK_SIZE);
    let mut lines = block_lines(BLOCK_SIZE - 2, 0.0);
    lines[5] = "1,2,3".into();
    write_zst_lines(&root.join("file_001.zst"), &lines);

    for parallel in [false, true] {
        let mut ds = LazyBatchedDataset::new(&root, &params(2, parallel)).unwrap();
        let err = ds.get(0).unwrap_err();
        assert!(matches!(err, TleError::Format(msg) if msg.contains("file_001.zst:6")));
        assert_eq!(ds.cached_position(), None);
    }
}

#[test]
fn test_corrupt_file_is_decode_error() {
    let (_dir, root) = corpus_dir(1, 1, BLOCK_SIZE);
    fs::write(root.join("file_000.zst"), b"garbage").unwrap();

    let mut ds = LazyBatchedDataset::new(&root, &params(1, false)).unwrap();
    assert!(matches!(ds.get(0), Err(TleError::Decode { .. })));
}

#[test]
fn test_random_subsample_dataset() {
    let (_dir, root) = corpus_dir(2, 2, BLOCK_SIZE);
    let p = DatasetParams::builder()
        .batch_size(2)
        .shuffle(false)
        .parallel(false)
        .block_size(BLOCK_SIZE)
        .selection(SampleSelection::RandomSubsample { count: 3, seed: 5 })
        .build()
        .unwrap();

    let mut ds = LazyBatchedDataset::new(&root, &p).unwrap();
    let first = ds.get(0).unwrap().to_vec();
    assert_eq!(first.len(), 4);
    assert!(first.iter().all(|s| s.len() == 3 && s.elapsed_minutes.len() == 3));

    let mut again = LazyBatchedDataset::new(&root, &p).unwrap();
    assert_eq!(again.get(0).unwrap(), first.as_slice());
}
