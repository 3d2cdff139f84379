use crate::{assert_header_consistent, invalid_arg, BooleanColumn, ColumnTypeTag, RowIndex};
use submerge_base::Result;

// Endpoints of start, start+step, ..., start+step*(count-1). Returns
// (min, max, last).
fn slice_endpoints(start: i64, count: i64, step: i64) -> Result<(i64, i64, i64)> {
    if start < 0 {
        return Err(invalid_arg("slice start must be non-negative"));
    }
    if count < 0 {
        return Err(invalid_arg("slice count must be non-negative"));
    }
    if count <= 1 {
        return Ok((start, start, start));
    }
    let span = step
        .checked_mul(count - 1)
        .ok_or_else(|| invalid_arg("slice endpoint overflows i64"))?;
    let last = start
        .checked_add(span)
        .ok_or_else(|| invalid_arg("slice endpoint overflows i64"))?;
    if last < 0 {
        return Err(invalid_arg("slice endpoint is negative"));
    }
    let (min, max) = if step >= 0 { (start, last) } else { (last, start) };
    Ok((min, max, last))
}

pub(crate) fn from_slice(start: i64, count: i64, step: i64) -> Result<RowIndex> {
    let (min, max, _last) = slice_endpoints(start, count, step)?;
    let min = if count == 0 { 0 } else { min };
    let max = if count == 0 { 0 } else { max };
    assert_header_consistent(count, min, max);
    Ok(RowIndex::new_slice(count, min, max, start, step))
}

pub(crate) fn from_slices(starts: &[i64], counts: &[i64], steps: &[i64]) -> Result<RowIndex> {
    if starts.len() != counts.len() || counts.len() != steps.len() {
        return Err(invalid_arg("starts/counts/steps must have equal length"));
    }

    let mut total_len: i64 = 0;
    let mut global_min = i64::MAX;
    let mut global_max = 0_i64;
    let mut any = false;
    for ((&start, &count), &step) in starts.iter().zip(counts.iter()).zip(steps.iter()) {
        if count == 0 {
            continue;
        }
        let (min, max, _last) = slice_endpoints(start, count, step)?;
        total_len = total_len
            .checked_add(count)
            .ok_or_else(|| invalid_arg("total slice-list length overflows i64"))?;
        global_min = global_min.min(min);
        global_max = global_max.max(max);
        any = true;
    }
    if !any {
        return Ok(RowIndex::empty());
    }

    if total_len <= i32::MAX as i64 && global_max <= i32::MAX as i64 {
        let mut buf: Vec<i32> = Vec::with_capacity(total_len as usize);
        for ((&start, &count), &step) in starts.iter().zip(counts.iter()).zip(steps.iter()) {
            for i in 0..count {
                buf.push((start + step * i) as i32);
            }
        }
        assert_header_consistent(total_len, global_min, global_max);
        Ok(RowIndex::new_arr32(total_len, global_min, global_max, buf))
    } else {
        let mut buf: Vec<i64> = Vec::with_capacity(total_len as usize);
        for ((&start, &count), &step) in starts.iter().zip(counts.iter()).zip(steps.iter()) {
            for i in 0..count {
                buf.push(start + step * i);
            }
        }
        assert_header_consistent(total_len, global_min, global_max);
        Ok(RowIndex::new_arr64(total_len, global_min, global_max, buf))
    }
}

pub(crate) fn from_i32_array(buf: Vec<i32>) -> RowIndex {
    let length = buf.len() as i64;
    let (min, max) = min_max_i32(&buf);
    assert_header_consistent(length, min, max);
    RowIndex::new_arr32(length, min, max, buf)
}

pub(crate) fn from_i64_array(buf: Vec<i64>) -> RowIndex {
    let length = buf.len() as i64;
    let (min, max) = min_max_i64(&buf);
    assert_header_consistent(length, min, max);
    RowIndex::new_arr64(length, min, max, buf)
}

fn min_max_i32(buf: &[i32]) -> (i64, i64) {
    if buf.is_empty() {
        return (0, 0);
    }
    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for &v in buf {
        let v = v as i64;
        min = min.min(v);
        max = max.max(v);
    }
    (min, max)
}

fn min_max_i64(buf: &[i64]) -> (i64, i64) {
    if buf.is_empty() {
        return (0, 0);
    }
    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for &v in buf {
        min = min.min(v);
        max = max.max(v);
    }
    (min, max)
}

fn check_bool_column(col: &dyn BooleanColumn, nrows: i64) -> Result<()> {
    if col.type_tag() != ColumnTypeTag::Bool {
        return Err(invalid_arg("column is not boolean-typed"));
    }
    if nrows < 0 {
        return Err(invalid_arg("nrows must be non-negative"));
    }
    if nrows > col.nrows() {
        return Err(invalid_arg("nrows exceeds the column's own row count"));
    }
    Ok(())
}

pub(crate) fn from_bool_column(col: &dyn BooleanColumn, nrows: i64) -> Result<RowIndex> {
    check_bool_column(col, nrows)?;

    let mut nout: i64 = 0;
    let mut maxrow: i64 = 0;
    for row in 0..nrows {
        match col.byte_at(row) {
            0 => {}
            1 => {
                nout += 1;
                maxrow = row;
            }
            _ => return Err(invalid_arg("boolean column byte is neither 0 nor 1")),
        }
    }

    if nout == 0 {
        return Ok(RowIndex::new_arr32(0, 0, 0, Vec::new()));
    }

    if nout <= i32::MAX as i64 && maxrow <= i32::MAX as i64 {
        let mut buf: Vec<i32> = Vec::with_capacity(nout as usize);
        for row in 0..=maxrow {
            if col.byte_at(row) == 1 {
                buf.push(row as i32);
            }
        }
        let min = buf[0] as i64;
        assert_header_consistent(nout, min, maxrow);
        Ok(RowIndex::new_arr32(nout, min, maxrow, buf))
    } else {
        let mut buf: Vec<i64> = Vec::with_capacity(nout as usize);
        for row in 0..=maxrow {
            if col.byte_at(row) == 1 {
                buf.push(row);
            }
        }
        let min = buf[0];
        assert_header_consistent(nout, min, maxrow);
        Ok(RowIndex::new_arr64(nout, min, maxrow, buf))
    }
}

pub(crate) fn from_bool_column_with_index(
    col: &dyn BooleanColumn,
    outer: &RowIndex,
) -> Result<RowIndex> {
    if col.type_tag() != ColumnTypeTag::Bool {
        return Err(invalid_arg("column is not boolean-typed"));
    }

    let mut nout: i64 = 0;
    let mut maxi: i64 = 0;
    for (i, j) in (0i64..).zip(outer.iter()) {
        match col.byte_at(j) {
            0 => {}
            1 => {
                nout += 1;
                maxi = i;
            }
            _ => return Err(invalid_arg("boolean column byte is neither 0 nor 1")),
        }
    }

    if nout == 0 {
        return Ok(RowIndex::new_arr32(0, 0, 0, Vec::new()));
    }

    if nout <= i32::MAX as i64 && maxi <= i32::MAX as i64 {
        let mut buf: Vec<i32> = Vec::with_capacity(nout as usize);
        for (i, j) in (0i64..).zip(outer.iter()) {
            if col.byte_at(j) == 1 {
                buf.push(i as i32);
            }
            if i == maxi {
                break;
            }
        }
        let min = buf[0] as i64;
        assert_header_consistent(nout, min, maxi);
        Ok(RowIndex::new_arr32(nout, min, maxi, buf))
    } else {
        let mut buf: Vec<i64> = Vec::with_capacity(nout as usize);
        for (i, j) in (0i64..).zip(outer.iter()) {
            if col.byte_at(j) == 1 {
                buf.push(i);
            }
            if i == maxi {
                break;
            }
        }
        let min = buf[0];
        assert_header_consistent(nout, min, maxi);
        Ok(RowIndex::new_arr64(nout, min, maxi, buf))
    }
}
