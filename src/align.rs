//! Temporal alignment of two timestamped event streams.
//!
//! [`pair_sequences`] finds a greedy one-to-one pairing between two strictly
//! increasing timestamp arrays under a maximum temporal distance.
//! [`align_sequences`] then merge-sorts both streams into an `[N, 2]` value
//! matrix: paired events share a row, unpaired events occupy a row with the
//! fill value in the other column, ties go to stream 1.
use anyhow::{bail, Result};
use ndarray::Array2;

/// Find an index pairing between two timestamp sequences satisfying the
/// maximum distance criterion.
///
/// Both inputs must be strictly increasing. Returns parallel index vectors
/// `(idxs1, idxs2)`; pair k is `(t1[idxs1[k]], t2[idxs2[k]])` with
/// `|t1 - t2| <= max_dist`.
pub fn pair_sequences(
    times1: &[i64],
    times2: &[i64],
    max_dist: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if max_dist == 0 {
        bail!("max_dist must be positive");
    }

    // WLOG the first sequence is the smaller one.
    let reverse_args = times2.len() < times1.len();
    let (ts1, ts2) = if reverse_args {
        (times2, times1)
    } else {
        (times1, times2)
    };
    let (n1, n2) = (ts1.len(), ts2.len());

    let mut idxs1 = Vec::new();
    let mut idxs2 = Vec::new();

    let mut i1 = 0usize;
    let mut i2 = 0usize;

    while i1 < n1 && i2 < n2 {
        let mut best_dist = ts1[i1].abs_diff(ts2[i2]);
        let mut best_i2 = i2;

        // Scan forward through every candidate at or before t1[i1].
        while i2 < n2 && ts2[i2] <= ts1[i1] {
            let dist = ts1[i1].abs_diff(ts2[i2]);
            if dist < best_dist {
                best_dist = dist;
                best_i2 = i2;
            }
            i2 += 1;
        }

        if best_dist <= max_dist {
            idxs1.push(i1);
            idxs2.push(best_i2);
        }

        i1 += 1;
        i2 = best_i2 + 1;
    }

    if reverse_args {
        Ok((idxs2, idxs1))
    } else {
        Ok((idxs1, idxs2))
    }
}

/// Align two sequences in time, filling in missing data as needed.
///
/// `vals1`/`vals2` are parallel to `times1`/`times2`. The result is an
/// `[N, 2]` matrix whose rows are, in merged timestamp order, either a pair
/// `(v1, v2)` within `max_dist`, or `(v1, fill_value)` / `(fill_value, v2)`
/// for unpaired events. Row count = pairs + unpaired from both streams.
pub fn align_sequences(
    times1: &[i64],
    times2: &[i64],
    vals1: &[i64],
    vals2: &[i64],
    max_dist: u64,
    fill_value: i64,
) -> Result<Array2<i64>> {
    if times1.len() != vals1.len() || times2.len() != vals2.len() {
        bail!("times and values must have the same length");
    }

    let (idxs1, idxs2) = pair_sequences(times1, times2, max_dist)?;
    debug_assert_eq!(idxs1.len(), idxs2.len());

    let mut vals: Vec<i64> = Vec::new();
    let mut i1 = 0usize;
    let mut i2 = 0usize;
    for (&j1, &j2) in idxs1.iter().zip(idxs2.iter()) {
        merge_into(&mut vals, times1, times2, vals1, vals2, i1, i2, j1, j2, fill_value);
        vals.push(vals1[j1]);
        vals.push(vals2[j2]);
        i1 = j1 + 1;
        i2 = j2 + 1;
    }
    merge_into(
        &mut vals, times1, times2, vals1, vals2, i1, i2,
        times1.len(), times2.len(), fill_value,
    );

    let n = vals.len() / 2;
    Ok(Array2::from_shape_vec((n, 2), vals).expect("aligned output is [N, 2]"))
}

/// Merge-sort the unpaired spans `[i1, j1)` x `[i2, j2)` into `vals` as
/// `(v, fill)` / `(fill, v)` rows, ties to stream 1.
#[allow(clippy::too_many_arguments)]
fn merge_into(
    vals: &mut Vec<i64>,
    times1: &[i64],
    times2: &[i64],
    vals1: &[i64],
    vals2: &[i64],
    mut i1: usize,
    mut i2: usize,
    j1: usize,
    j2: usize,
    fill_value: i64,
) {
    while i1 < j1 && i2 < j2 {
        if times1[i1] <= times2[i2] {
            vals.push(vals1[i1]);
            vals.push(fill_value);
            i1 += 1;
        } else {
            vals.push(fill_value);
            vals.push(vals2[i2]);
            i2 += 1;
        }
    }
    while i1 < j1 {
        vals.push(vals1[i1]);
        vals.push(fill_value);
        i1 += 1;
    }
    while i2 < j2 {
        vals.push(fill_value);
        vals.push(vals2[i2]);
        i2 += 1;
    }
}
