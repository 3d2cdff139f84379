use crate::variant::compactify;
use crate::{assert_header_consistent, Payload, RowIndex};

// For the "same row repeated n times" case, where only one lookup is
// needed. pos is assumed in bounds.
fn value_at(a_to_b: &RowIndex, pos: i64) -> i64 {
    match &a_to_b.payload {
        Payload::Slice { start, step } => start + step * pos,
        Payload::Arr32(buf) => buf[pos as usize] as i64,
        Payload::Arr64(buf) => buf[pos as usize],
    }
}

// Tracks min/max in the same pass rather than an analytic shortcut after.
fn gather(n: i64, mut source_row: impl FnMut(i64) -> i64) -> (Vec<i64>, i64, i64) {
    let mut buf = Vec::with_capacity(n as usize);
    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for i in 0..n {
        let v = source_row(i);
        min = min.min(v);
        max = max.max(v);
        buf.push(v);
    }
    (buf, min, max)
}

fn narrow(buf: Vec<i64>) -> Vec<i32> {
    buf.into_iter().map(|v| v as i32).collect()
}

pub(crate) fn merge(a_to_b: Option<&RowIndex>, b_to_c: &RowIndex) -> RowIndex {
    let n = b_to_c.length;
    if n == 0 {
        return RowIndex::empty();
    }
    let Some(a_to_b) = a_to_b else {
        return b_to_c.clone();
    };

    match &b_to_c.payload {
        Payload::Slice { start: start_bc, step: step_bc } => {
            if *step_bc == 0 {
                let row = value_at(a_to_b, *start_bc);
                assert_header_consistent(n, row, row);
                return RowIndex::new_slice(n, row, row, row, 0);
            }
            match &a_to_b.payload {
                Payload::Slice { start: start_ab, step: step_ab } => {
                    let new_start = start_ab + step_ab * start_bc;
                    let new_step = step_ab * step_bc;
                    let last = new_start + new_step * (n - 1);
                    let (min, max) = if new_step >= 0 {
                        (new_start, last)
                    } else {
                        (last, new_start)
                    };
                    assert_header_consistent(n, min, max);
                    RowIndex::new_slice(n, min, max, new_start, new_step)
                }
                Payload::Arr32(buf_ab) => {
                    let (buf, min, max) =
                        gather(n, |i| buf_ab[(start_bc + step_bc * i) as usize] as i64);
                    assert_header_consistent(n, min, max);
                    RowIndex::new_arr32(n, min, max, narrow(buf))
                }
                Payload::Arr64(buf_ab) => {
                    let (buf, min, max) =
                        gather(n, |i| buf_ab[(start_bc + step_bc * i) as usize]);
                    assert_header_consistent(n, min, max);
                    compactify(RowIndex::new_arr64(n, min, max, buf)).into_inner()
                }
            }
        }

        Payload::Arr32(buf_bc) => match &a_to_b.payload {
            Payload::Slice { start: start_ab, step: step_ab } => {
                let (buf, min, max) = gather(n, |i| start_ab + step_ab * (buf_bc[i as usize] as i64));
                assert_header_consistent(n, min, max);
                compactify(RowIndex::new_arr64(n, min, max, buf)).into_inner()
            }
            Payload::Arr32(buf_ab) => {
                let (buf, min, max) = gather(n, |i| buf_ab[buf_bc[i as usize] as usize] as i64);
                assert_header_consistent(n, min, max);
                RowIndex::new_arr32(n, min, max, narrow(buf))
            }
            Payload::Arr64(buf_ab) => {
                let (buf, min, max) = gather(n, |i| buf_ab[buf_bc[i as usize] as usize]);
                assert_header_consistent(n, min, max);
                compactify(RowIndex::new_arr64(n, min, max, buf)).into_inner()
            }
        },

        Payload::Arr64(buf_bc) => match &a_to_b.payload {
            Payload::Slice { start: start_ab, step: step_ab } => {
                let (buf, min, max) = gather(n, |i| start_ab + step_ab * buf_bc[i as usize]);
                assert_header_consistent(n, min, max);
                compactify(RowIndex::new_arr64(n, min, max, buf)).into_inner()
            }
            Payload::Arr32(buf_ab) => {
                let (buf, min, max) = gather(n, |i| buf_ab[buf_bc[i as usize] as usize] as i64);
                assert_header_consistent(n, min, max);
                compactify(RowIndex::new_arr64(n, min, max, buf)).into_inner()
            }
            Payload::Arr64(buf_ab) => {
                let (buf, min, max) = gather(n, |i| buf_ab[buf_bc[i as usize] as usize]);
                assert_header_consistent(n, min, max);
                compactify(RowIndex::new_arr64(n, min, max, buf)).into_inner()
            }
        },
    }
}
