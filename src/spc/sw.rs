//! Swendsen–Wang Monte Carlo sweeps for the Potts model.
//!
//! One sweep: draw bonds between equal-spin neighbors, partition the bond
//! graph into clusters ordered largest-first, then redraw one uniform spin
//! per cluster. After burn-in, per-edge co-cluster counts accumulate; the
//! reported partition thresholds those correlations.
use rand::Rng;

/// Per-edge freezing probability at temperature `t`: `1 − exp(−J/T)`.
/// At `t == 0` every interacting bond freezes.
pub(crate) fn deletion_probabilities(t: f64, j: &[Vec<f64>], p: &mut [Vec<f64>]) {
    for (p_row, j_row) in p.iter_mut().zip(j.iter()) {
        for (pv, &jv) in p_row.iter_mut().zip(j_row.iter()) {
            *pv = 1.0 - (-jv / t).exp();
        }
    }
}

/// Draw the bond configuration for the current spins.
///
/// A bond between unequal spins is always deleted; a satisfied bond freezes
/// with probability `p`. Each undirected edge is drawn once (ascending
/// partner order) and mirrored to the partner's slot.
pub(crate) fn set_bond<R: Rng>(
    p: &[Vec<f64>],
    spin: &[u32],
    bond: &mut [Vec<bool>],
    nbr: &[Vec<u32>],
    inv: &[Vec<u32>],
    rng: &mut R,
) {
    for i in 0..nbr.len() {
        for k in 0..nbr[i].len() {
            let pt = nbr[i][k] as usize;
            if pt <= i {
                continue;
            }
            let frozen = spin[i] == spin[pt] && rng.gen::<f64>() < p[i][k];
            bond[i][k] = frozen;
            bond[pt][inv[i][k] as usize] = frozen;
        }
    }
}

/// Partition points into connected components of the frozen-bond graph.
///
/// `block[i]` receives the cluster id of point i, with clusters numbered by
/// decreasing size (ties keep discovery order); `cluster_size` is filled per
/// cluster id. Returns the number of clusters.
pub(crate) fn coarsening(
    bond: &[Vec<bool>],
    nbr: &[Vec<u32>],
    block: &mut [u32],
    cluster_size: &mut Vec<u32>,
) -> usize {
    const UNSET: u32 = u32::MAX;
    let n = block.len();
    let mut comp = vec![UNSET; n];
    let mut sizes: Vec<u32> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for seed in 0..n {
        if comp[seed] != UNSET {
            continue;
        }
        let id = sizes.len() as u32;
        let mut size = 0u32;
        comp[seed] = id;
        stack.push(seed);
        while let Some(v) = stack.pop() {
            size += 1;
            for (k, &pt) in nbr[v].iter().enumerate() {
                let pt = pt as usize;
                if bond[v][k] && comp[pt] == UNSET {
                    comp[pt] = id;
                    stack.push(pt);
                }
            }
        }
        sizes.push(size);
    }

    // Rank clusters largest-first; stable sort keeps discovery order on ties.
    let nc = sizes.len();
    let mut order: Vec<usize> = (0..nc).collect();
    order.sort_by_key(|&c| std::cmp::Reverse(sizes[c]));
    let mut rank = vec![0u32; nc];
    for (r, &c) in order.iter().enumerate() {
        rank[c] = r as u32;
    }

    cluster_size.clear();
    cluster_size.extend(order.iter().map(|&c| sizes[c]));
    for (b, &c) in block.iter_mut().zip(comp.iter()) {
        *b = rank[c as usize];
    }
    nc
}

/// Redraw one uniform spin in `[0, q)` per cluster and broadcast to members.
pub(crate) fn new_spin_config<R: Rng>(
    spin: &mut [u32],
    block: &[u32],
    nc: usize,
    q: u32,
    rng: &mut R,
) {
    let cluster_spin: Vec<u32> = (0..nc).map(|_| rng.gen_range(0..q)).collect();
    for (s, &b) in spin.iter_mut().zip(block.iter()) {
        *s = cluster_spin[b as usize];
    }
}

/// Accumulate per-slot co-cluster counts for one measurement sweep.
pub(crate) fn global_correlation(corr: &mut [Vec<u32>], nbr: &[Vec<u32>], block: &[u32]) {
    for i in 0..nbr.len() {
        for (k, &pt) in nbr[i].iter().enumerate() {
            if block[i] == block[pt as usize] {
                corr[i][k] += 1;
            }
        }
    }
}

/// Derive the reported partition from the accumulated correlations.
///
/// Two neighbors stay in one cluster iff their co-cluster ratio over the
/// `n_sweeps` measurement sweeps exceeds `threshold`; the resulting
/// components are ordered by size. Reuses `bond` as scratch.
#[allow(clippy::too_many_arguments)]
pub(crate) fn directed_growth(
    n_sweeps: usize,
    threshold: f64,
    corr: &[Vec<u32>],
    nbr: &[Vec<u32>],
    inv: &[Vec<u32>],
    bond: &mut [Vec<bool>],
    block: &mut [u32],
    cluster_size: &mut Vec<u32>,
) -> usize {
    let bar = threshold * n_sweeps as f64;
    for i in 0..nbr.len() {
        for k in 0..nbr[i].len() {
            let pt = nbr[i][k] as usize;
            if pt <= i {
                continue;
            }
            let linked = corr[i][k] as f64 > bar;
            bond[i][k] = linked;
            bond[pt][inv[i][k] as usize] = linked;
        }
    }
    coarsening(bond, nbr, block, cluster_size)
}
