use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spikekit::{align_sequences, pair_sequences};

const FILL: i64 = -1;

/// Strictly increasing timestamps with pseudo-random gaps.
fn make_times(rng: &mut StdRng, n: usize, max_gap: i64) -> Vec<i64> {
    let mut t = 0_i64;
    (0..n)
        .map(|_| {
            t += rng.gen_range(1..=max_gap);
            t
        })
        .collect()
}

#[test]
fn merged_timestamps_stay_sorted() {
    let mut rng = StdRng::seed_from_u64(11);
    for trial in 0..20 {
        let n1 = rng.gen_range(0..40);
        let n2 = rng.gen_range(1..40);
        let t1 = make_times(&mut rng, n1, 12);
        let t2 = make_times(&mut rng, n2, 12);
        // Values carry the timestamps so the output row order is checkable.
        let out = align_sequences(&t1, &t2, &t1, &t2, 5, FILL).unwrap();

        let mut merged = Vec::new();
        for row in out.rows() {
            // A paired row contributes one time point; unpaired rows one each.
            if row[0] != FILL {
                merged.push(row[0]);
            } else {
                merged.push(row[1]);
            }
        }
        assert!(
            merged.windows(2).all(|w| w[0] <= w[1]),
            "unsorted merge in trial {trial}: {merged:?}"
        );

        let non_fill = out.iter().filter(|&&v| v != FILL).count();
        assert_eq!(non_fill, n1 + n2, "lost events in trial {trial}");
    }
}

#[test]
fn paired_rows_respect_max_dist() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..20 {
        let n1 = rng.gen_range(1..50);
        let t1 = make_times(&mut rng, n1, 9);
        let n2 = rng.gen_range(1..50);
        let t2 = make_times(&mut rng, n2, 9);
        let max_dist = rng.gen_range(1..6u64);
        let (i1, i2) = pair_sequences(&t1, &t2, max_dist).unwrap();
        assert_eq!(i1.len(), i2.len());
        for (&a, &b) in i1.iter().zip(i2.iter()) {
            assert!(t1[a].abs_diff(t2[b]) <= max_dist);
        }
        // Pairings consume each stream monotonically.
        assert!(i1.windows(2).all(|w| w[0] < w[1]));
        assert!(i2.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn alignment_scenario() {
    let t1 = [0_i64, 10, 20];
    let v1 = [1_i64, 2, 3];
    let t2 = [1_i64, 100, 200];
    let v2 = [7_i64, 8, 9];
    let out = align_sequences(&t1, &t2, &v1, &v2, 2, FILL).unwrap();
    let rows: Vec<(i64, i64)> = out.rows().into_iter().map(|r| (r[0], r[1])).collect();
    assert_eq!(rows, vec![(1, 7), (2, -1), (3, -1), (-1, 8), (-1, 9)]);
}
