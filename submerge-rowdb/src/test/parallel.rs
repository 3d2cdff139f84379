use crate::{ParallelBuildConfig, RowIndex, Variant};
use test_log::test;

fn odd_filter(row0: i64, row1: i64, out: &mut [i32]) -> i64 {
    let mut n = 0;
    for row in row0..row1 {
        if row % 2 == 1 {
            out[n as usize] = row as i32;
            n += 1;
        }
    }
    n
}

fn odd_filter_wide(row0: i64, row1: i64, out: &mut [i64]) -> i64 {
    let mut n = 0;
    for row in row0..row1 {
        if row % 2 == 1 {
            out[n as usize] = row;
            n += 1;
        }
    }
    n
}

#[test]
fn odd_predicate_over_200000_rows() {
    let r = RowIndex::build_from_filter(200_000, &odd_filter, None).unwrap();
    assert_eq!(r.variant(), Variant::Arr32);
    assert_eq!(r.len(), 100_000);
    assert_eq!(r.min(), 1);
    assert_eq!(r.max(), 199_999);

    let values: Vec<i64> = r.iter().collect();
    assert!(values.windows(2).all(|w| w[0] < w[1]));
    assert!(values.iter().all(|&v| v % 2 == 1));
}

#[test]
fn small_chunk_size_forces_many_chunks_but_order_is_preserved() {
    let config = ParallelBuildConfig {
        chunk_rows: 37,
        threads: Some(4),
    };
    let r = RowIndex::build_from_filter(10_000, &odd_filter, Some(&config)).unwrap();
    let values: Vec<i64> = r.iter().collect();
    assert_eq!(values.len(), 5_000);
    assert!(values.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn empty_filter_result_is_empty_index() {
    let r = RowIndex::build_from_filter(1_000, &|_row0, _row1, _out: &mut [i32]| 0, None).unwrap();
    assert!(r.is_empty());
}

#[test]
fn zero_rows_is_empty_without_spawning_workers() {
    let r = RowIndex::build_from_filter(0, &odd_filter, None).unwrap();
    assert!(r.is_empty());
}

#[test]
fn nrows_beyond_32_bit_range_is_rejected_by_narrow_builder() {
    let err = RowIndex::build_from_filter((i32::MAX as i64) + 1, &odd_filter, None);
    assert!(err.is_err());
}

#[test]
fn wide_builder_matches_narrow_builder_on_the_same_predicate() {
    let config = ParallelBuildConfig {
        chunk_rows: 4096,
        threads: Some(3),
    };
    let narrow = RowIndex::build_from_filter(50_000, &odd_filter, Some(&config)).unwrap();
    let wide = RowIndex::build_from_filter_wide(50_000, &odd_filter_wide, Some(&config)).unwrap();
    assert_eq!(narrow.iter().collect::<Vec<i64>>(), wide.iter().collect::<Vec<i64>>());
}

#[test]
fn wide_builder_compactifies_small_results() {
    let r = RowIndex::build_from_filter_wide(1_000, &odd_filter_wide, None).unwrap();
    assert_eq!(r.variant(), Variant::Arr32);
    assert_eq!(r.len(), 500);
}
