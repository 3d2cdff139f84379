use crate::test::collect;
use crate::{ByteBoolColumn, RowIndex, Variant};
use test_log::test;

#[test]
fn slice_ascending() {
    let r = RowIndex::from_slice(10, 5, 2).unwrap();
    assert_eq!(r.variant(), Variant::Slice);
    assert_eq!(collect(&r), vec![10, 12, 14, 16, 18]);
    assert_eq!(r.min(), 10);
    assert_eq!(r.max(), 18);
}

#[test]
fn slice_descending() {
    let r = RowIndex::from_slice(10, 5, -2).unwrap();
    assert_eq!(collect(&r), vec![10, 8, 6, 4, 2]);
    assert_eq!(r.min(), 2);
    assert_eq!(r.max(), 10);
}

#[test]
fn slice_repeated_row() {
    let r = RowIndex::from_slice(7, 4, 0).unwrap();
    assert_eq!(collect(&r), vec![7, 7, 7, 7]);
    assert_eq!(r.min(), 7);
    assert_eq!(r.max(), 7);
}

#[test]
fn slice_rejects_negative_start() {
    assert!(RowIndex::from_slice(-1, 3, 1).is_err());
}

#[test]
fn slice_rejects_negative_count() {
    assert!(RowIndex::from_slice(0, -1, 1).is_err());
}

#[test]
fn slice_rejects_negative_endpoint() {
    // start=2, count=5, step=-1 -> endpoint 2 + (-1)*4 = -2
    assert!(RowIndex::from_slice(2, 5, -1).is_err());
}

#[test]
fn slice_rejects_overflowing_endpoint() {
    assert!(RowIndex::from_slice(i64::MAX - 1, 10, 1).is_err());
}

#[test]
fn slice_empty() {
    let r = RowIndex::from_slice(5, 0, 1).unwrap();
    assert_eq!(r.len(), 0);
    assert_eq!(r.min(), 0);
    assert_eq!(r.max(), 0);
}

#[test]
fn slices_concatenated_in_order() {
    let r = RowIndex::from_slices(&[0, 100], &[3, 2], &[1, 5]).unwrap();
    assert_eq!(collect(&r), vec![0, 1, 2, 100, 105]);
    assert_eq!(r.min(), 0);
    assert_eq!(r.max(), 105);
}

#[test]
fn slices_skips_empty_triples() {
    let r = RowIndex::from_slices(&[0, 50, 10], &[3, 0, 2], &[1, 1, 1]).unwrap();
    assert_eq!(collect(&r), vec![0, 1, 2, 10, 11]);
}

#[test]
fn slices_rejects_any_invalid_triple() {
    assert!(RowIndex::from_slices(&[0, -1], &[3, 2], &[1, 1]).is_err());
}

#[test]
fn slices_all_empty_yields_empty_slice() {
    let r = RowIndex::from_slices(&[1, 2], &[0, 0], &[1, 1]).unwrap();
    assert_eq!(r.variant(), Variant::Slice);
    assert_eq!(r.len(), 0);
}

#[test]
fn slices_widens_to_arr64_when_values_exceed_32_bit() {
    let big = (i32::MAX as i64) + 10;
    let r = RowIndex::from_slices(&[big], &[2], &[1]).unwrap();
    assert_eq!(r.variant(), Variant::Arr64);
    assert_eq!(collect(&r), vec![big, big + 1]);
}

#[test]
fn from_i32_array_computes_min_max() {
    let r = RowIndex::from_i32_array(vec![5, 1, 9, 3]);
    assert_eq!(r.variant(), Variant::Arr32);
    assert_eq!(r.min(), 1);
    assert_eq!(r.max(), 9);
    assert_eq!(collect(&r), vec![5, 1, 9, 3]);
}

#[test]
fn from_i64_array_never_narrows() {
    let r = RowIndex::from_i64_array(vec![1, 2, 3]);
    assert_eq!(r.variant(), Variant::Arr64);
}

#[test]
fn from_i32_array_empty() {
    let r = RowIndex::from_i32_array(Vec::new());
    assert_eq!(r.len(), 0);
    assert_eq!(r.min(), 0);
    assert_eq!(r.max(), 0);
}

#[test]
fn bool_column_all_false_is_empty() {
    let col = ByteBoolColumn::new(vec![0, 0, 0]);
    let r = RowIndex::from_bool_column(&col, 3).unwrap();
    assert_eq!(r.len(), 0);
}

#[test]
fn bool_column_rejects_bad_byte() {
    let col = ByteBoolColumn::new(vec![0, 2, 1]);
    assert!(RowIndex::from_bool_column(&col, 3).is_err());
}

#[test]
fn bool_column_rejects_nrows_past_column_length() {
    let col = ByteBoolColumn::new(vec![1, 1]);
    assert!(RowIndex::from_bool_column(&col, 5).is_err());
}

#[test]
fn bool_column_with_outer_index_emits_positions_not_source_rows() {
    // Outer view visits rows 20, 21, 22, 23 (a slice); of those rows
    // 21 and 23 pass the predicate. The result should be positions
    // 1 and 3 within the outer view, not rows 21/23 themselves.
    let outer = RowIndex::from_slice(20, 4, 1).unwrap();
    let mut bytes = vec![0_u8; 24];
    bytes[21] = 1;
    bytes[23] = 1;
    let col = ByteBoolColumn::new(bytes);
    let r = RowIndex::from_bool_column_with_index(&col, &outer).unwrap();
    assert_eq!(collect(&r), vec![1, 3]);
}
