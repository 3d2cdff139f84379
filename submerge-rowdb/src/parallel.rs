use crate::variant::compactify;
use crate::{assert_header_consistent, invalid_arg, RowIndex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use submerge_base::Result;

const DEFAULT_CHUNK_ROWS: i64 = 65_536;

// The crate's entire configuration surface: no file, CLI, or environment
// to read, just these two numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelBuildConfig {
    // Rows per chunk. Defaults to 65536.
    pub chunk_rows: i64,
    // None asks the host for its available parallelism.
    pub threads: Option<usize>,
}

impl Default for ParallelBuildConfig {
    fn default() -> Self {
        ParallelBuildConfig {
            chunk_rows: DEFAULT_CHUNK_ROWS,
            threads: None,
        }
    }
}

// Given [row0, row1) and a scratch buffer of that length, write the
// selected row numbers in ascending order and report how many were written.
pub trait ChunkFilter: Sync {
    fn filter_chunk(&self, row0: i64, row1: i64, out: &mut [i32]) -> i64;
}

impl<F> ChunkFilter for F
where
    F: Fn(i64, i64, &mut [i32]) -> i64 + Sync,
{
    fn filter_chunk(&self, row0: i64, row1: i64, out: &mut [i32]) -> i64 {
        self(row0, row1, out)
    }
}

// Same contract, widened to i64 rows and output slots, for nrows beyond
// the 32-bit builder's range.
pub trait WideChunkFilter: Sync {
    fn filter_chunk(&self, row0: i64, row1: i64, out: &mut [i64]) -> i64;
}

impl<F> WideChunkFilter for F
where
    F: Fn(i64, i64, &mut [i64]) -> i64 + Sync,
{
    fn filter_chunk(&self, row0: i64, row1: i64, out: &mut [i64]) -> i64 {
        self(row0, row1, out)
    }
}

fn worker_count(threads: Option<usize>, n_chunks: usize) -> usize {
    threads
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
        .max(1)
        .min(n_chunks.max(1))
}

// split_at_mut lets the borrow checker prove the regions never alias,
// rather than us asserting it by hand.
fn disjoint_regions<'a, T>(out: &'a mut [T], counts: &[i64]) -> Vec<&'a mut [T]> {
    let mut rest = out;
    let mut regions = Vec::with_capacity(counts.len());
    for &count in counts {
        let (head, tail) = rest.split_at_mut(count as usize);
        regions.push(head);
        rest = tail;
    }
    regions
}

pub(crate) fn build_from_filter(
    nrows: i64,
    filter: &(impl ChunkFilter + ?Sized),
    config: &ParallelBuildConfig,
) -> Result<RowIndex> {
    if nrows < 0 {
        return Err(invalid_arg("nrows must be non-negative"));
    }
    if nrows > i32::MAX as i64 {
        return Err(invalid_arg(
            "nrows exceeds the 32-bit filter builder's range; use build_from_filter_wide",
        ));
    }
    if nrows == 0 {
        return Ok(RowIndex::new_arr32(0, 0, 0, Vec::new()));
    }

    let chunk_rows = if config.chunk_rows > 0 {
        config.chunk_rows
    } else {
        DEFAULT_CHUNK_ROWS
    };
    let n_chunks = ((nrows + chunk_rows - 1) / chunk_rows) as usize;
    let threads = worker_count(config.threads, n_chunks);

    // Parallel phase: each worker claims the next unfiltered chunk and
    // evaluates the predicate into a private scratch buffer. Chunks can
    // finish in any order; their (index, count, scratch) triples are
    // collected below and re-sorted by index before anything is copied.
    let next_chunk = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, i64, Vec<i32>)>();
    std::thread::scope(|scope| {
        for _ in 0..threads {
            let tx = tx.clone();
            let next_chunk = &next_chunk;
            scope.spawn(move || loop {
                let idx = next_chunk.fetch_add(1, Ordering::Relaxed);
                if idx >= n_chunks {
                    break;
                }
                let row0 = idx as i64 * chunk_rows;
                let row1 = (row0 + chunk_rows).min(nrows);
                let mut scratch = vec![0_i32; (row1 - row0) as usize];
                let count = filter.filter_chunk(row0, row1, &mut scratch);
                debug_assert!(count >= 0 && count <= scratch.len() as i64);
                tx.send((idx, count, scratch)).expect("rowdb: filter result receiver dropped");
            });
        }
        drop(tx);
    });

    let mut chunks: Vec<Option<(i64, Vec<i32>)>> = (0..n_chunks).map(|_| None).collect();
    for (idx, count, scratch) in rx {
        chunks[idx] = Some((count, scratch));
    }
    let chunks: Vec<(i64, Vec<i32>)> = chunks
        .into_iter()
        .map(|c| c.expect("rowdb: a chunk never reported a result"))
        .collect();

    // Ordered-commit step: the spec's "short ordered critical section"
    // collapses to this single prefix sum, since every chunk's count is
    // already known by the time we get here.
    let counts: Vec<i64> = chunks.iter().map(|(count, _)| *count).collect();
    let out_length: i64 = counts.iter().sum();

    if out_length == 0 {
        return Ok(RowIndex::new_arr32(0, 0, 0, Vec::new()));
    }

    let mut out = vec![0_i32; out_length as usize];
    {
        let regions = disjoint_regions(&mut out, &counts);
        std::thread::scope(|scope| {
            for (region, (count, scratch)) in regions.into_iter().zip(chunks.iter()) {
                scope.spawn(move || {
                    region.copy_from_slice(&scratch[..*count as usize]);
                });
            }
        });
    }

    let min = out[0] as i64;
    let max = out[(out_length - 1) as usize] as i64;
    assert_header_consistent(out_length, min, max);
    Ok(RowIndex::new_arr32(out_length, min, max, out))
}

pub(crate) fn build_from_filter_wide(
    nrows: i64,
    filter: &(impl WideChunkFilter + ?Sized),
    config: &ParallelBuildConfig,
) -> Result<RowIndex> {
    if nrows < 0 {
        return Err(invalid_arg("nrows must be non-negative"));
    }
    if nrows == 0 {
        return Ok(RowIndex::new_arr32(0, 0, 0, Vec::new()));
    }

    let chunk_rows = if config.chunk_rows > 0 {
        config.chunk_rows
    } else {
        DEFAULT_CHUNK_ROWS
    };
    let n_chunks = ((nrows + chunk_rows - 1) / chunk_rows) as usize;
    let threads = worker_count(config.threads, n_chunks);

    let next_chunk = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, i64, Vec<i64>)>();
    std::thread::scope(|scope| {
        for _ in 0..threads {
            let tx = tx.clone();
            let next_chunk = &next_chunk;
            scope.spawn(move || loop {
                let idx = next_chunk.fetch_add(1, Ordering::Relaxed);
                if idx >= n_chunks {
                    break;
                }
                let row0 = idx as i64 * chunk_rows;
                let row1 = (row0 + chunk_rows).min(nrows);
                let mut scratch = vec![0_i64; (row1 - row0) as usize];
                let count = filter.filter_chunk(row0, row1, &mut scratch);
                debug_assert!(count >= 0 && count <= scratch.len() as i64);
                tx.send((idx, count, scratch)).expect("rowdb: filter result receiver dropped");
            });
        }
        drop(tx);
    });

    let mut chunks: Vec<Option<(i64, Vec<i64>)>> = (0..n_chunks).map(|_| None).collect();
    for (idx, count, scratch) in rx {
        chunks[idx] = Some((count, scratch));
    }
    let chunks: Vec<(i64, Vec<i64>)> = chunks
        .into_iter()
        .map(|c| c.expect("rowdb: a chunk never reported a result"))
        .collect();

    let counts: Vec<i64> = chunks.iter().map(|(count, _)| *count).collect();
    let out_length: i64 = counts.iter().sum();

    if out_length == 0 {
        return Ok(RowIndex::new_arr32(0, 0, 0, Vec::new()));
    }

    let mut out = vec![0_i64; out_length as usize];
    {
        let regions = disjoint_regions(&mut out, &counts);
        std::thread::scope(|scope| {
            for (region, (count, scratch)) in regions.into_iter().zip(chunks.iter()) {
                scope.spawn(move || {
                    region.copy_from_slice(&scratch[..*count as usize]);
                });
            }
        });
    }

    let min = out[0];
    let max = out[(out_length - 1) as usize];
    assert_header_consistent(out_length, min, max);
    Ok(compactify(RowIndex::new_arr64(out_length, min, max, out)).into_inner())
}
