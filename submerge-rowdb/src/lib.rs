// A RowIndex is a mapping from destination row positions to source row
// positions. Every derived column in a table is the pair (source data,
// row index): views, filters, slices, reorderings and one side of a
// join are all just different RowIndexes over the same underlying
// columns. Three storage variants trade off memory for generality:
//
//   - Slice:  start + step, row count implied by the index's length.
//             No buffer at all; used for untouched tables and plain
//             contiguous/strided views.
//   - Arr32:  an owned Vec<i32> of source rows, for when the mapping
//             isn't arithmetic but every row number fits in 32 bits.
//   - Arr64:  an owned Vec<i64>, for when it doesn't.
//
// `merge` composes two RowIndexes end to end (A->B and B->C into
// A->C) via a small dispatch table over variants, choosing the
// narrowest output variant the observed values allow. `compactify`
// narrows a freshly built Arr64 down to Arr32 in place when its
// length and max value permit. `build_from_filter`/`build_from_filter_wide`
// turn a chunk-at-a-time predicate into a RowIndex using a thread
// pool with an ordered offset-commit step, so the output stays in
// ascending row order even though chunks can finish in any order.

mod boolcol;
mod ctor;
mod merge;
mod parallel;
mod variant;


pub use boolcol::{BooleanColumn, ByteBoolColumn, ColumnTypeTag};
pub use parallel::{ChunkFilter, ParallelBuildConfig, WideChunkFilter};
pub use variant::{CompactifyOutcome, RowIndexIter, Variant};

use submerge_base::{err, Result};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowIndex {
    length: i64,
    min: i64,
    max: i64,
    payload: Payload,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Payload {
    Slice { start: i64, step: i64 },
    Arr32(Vec<i32>),
    Arr64(Vec<i64>),
}

impl RowIndex {
    pub(crate) fn new_slice(length: i64, min: i64, max: i64, start: i64, step: i64) -> Self {
        RowIndex {
            length,
            min,
            max,
            payload: Payload::Slice { start, step },
        }
    }

    pub(crate) fn new_arr32(length: i64, min: i64, max: i64, buf: Vec<i32>) -> Self {
        debug_assert_eq!(buf.len() as i64, length);
        RowIndex {
            length,
            min,
            max,
            payload: Payload::Arr32(buf),
        }
    }

    pub(crate) fn new_arr64(length: i64, min: i64, max: i64, buf: Vec<i64>) -> Self {
        debug_assert_eq!(buf.len() as i64, length);
        RowIndex {
            length,
            min,
            max,
            payload: Payload::Arr64(buf),
        }
    }

    // Canonical result of composing with an empty B->C side.
    pub fn empty() -> Self {
        RowIndex::new_slice(0, 0, 0, 0, 1)
    }

    pub fn variant(&self) -> Variant {
        match &self.payload {
            Payload::Slice { .. } => Variant::Slice,
            Payload::Arr32(_) => Variant::Arr32,
            Payload::Arr64(_) => Variant::Arr64,
        }
    }

    pub fn len(&self) -> i64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    // 0 when empty.
    pub fn min(&self) -> i64 {
        self.min
    }

    // 0 when empty.
    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn slice_parts(&self) -> Option<(i64, i64)> {
        match &self.payload {
            Payload::Slice { start, step } => Some((*start, *step)),
            _ => None,
        }
    }

    pub fn iter(&self) -> RowIndexIter<'_> {
        RowIndexIter::new(self)
    }

    // Dispatches on variant once rather than per element.
    pub fn visit(&self, mut f: impl FnMut(i64, i64)) {
        match &self.payload {
            Payload::Slice { start, step } => {
                for i in 0..self.length {
                    f(i, start + step * i);
                }
            }
            Payload::Arr32(buf) => {
                for (i, v) in buf.iter().enumerate() {
                    f(i as i64, *v as i64);
                }
            }
            Payload::Arr64(buf) => {
                for (i, v) in buf.iter().enumerate() {
                    f(i as i64, *v);
                }
            }
        }
    }

    // No-op for Slice and Arr32, and for an Arr64 whose values don't fit.
    pub fn compactify(self) -> CompactifyOutcome {
        variant::compactify(self)
    }

    pub fn from_slice(start: i64, count: i64, step: i64) -> Result<Self> {
        ctor::from_slice(start, count, step)
    }

    pub fn from_slices(starts: &[i64], counts: &[i64], steps: &[i64]) -> Result<Self> {
        ctor::from_slices(starts, counts, steps)
    }

    pub fn from_i32_array(buf: Vec<i32>) -> Self {
        ctor::from_i32_array(buf)
    }

    pub fn from_i64_array(buf: Vec<i64>) -> Self {
        ctor::from_i64_array(buf)
    }

    pub fn from_bool_column(col: &dyn BooleanColumn, nrows: i64) -> Result<Self> {
        ctor::from_bool_column(col, nrows)
    }

    pub fn from_bool_column_with_index(col: &dyn BooleanColumn, outer: &RowIndex) -> Result<Self> {
        ctor::from_bool_column_with_index(col, outer)
    }

    // a_to_b absent means identity.
    pub fn merge(a_to_b: Option<&RowIndex>, b_to_c: &RowIndex) -> RowIndex {
        merge::merge(a_to_b, b_to_c)
    }

    pub fn build_from_filter(
        nrows: i64,
        filter: &(impl ChunkFilter + ?Sized),
        config: Option<&ParallelBuildConfig>,
    ) -> Result<Self> {
        let default = ParallelBuildConfig::default();
        parallel::build_from_filter(nrows, filter, config.unwrap_or(&default))
    }

    pub fn build_from_filter_wide(
        nrows: i64,
        filter: &(impl WideChunkFilter + ?Sized),
        config: Option<&ParallelBuildConfig>,
    ) -> Result<Self> {
        let default = ParallelBuildConfig::default();
        parallel::build_from_filter_wide(nrows, filter, config.unwrap_or(&default))
    }
}

// Trips in development builds if a constructor's own bookkeeping is wrong.
pub(crate) fn assert_header_consistent(length: i64, min: i64, max: i64) {
    debug_assert!(length >= 0);
    debug_assert!(min >= 0);
    debug_assert!(length == 0 || min <= max);
}

pub(crate) fn invalid_arg(msg: impl Into<std::borrow::Cow<'static, str>>) -> submerge_base::Error {
    let msg = msg.into();
    debug!(target: "submerge_rowdb", "rejecting construction: {}", msg);
    err(msg)
}
