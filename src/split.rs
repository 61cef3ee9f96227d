//! Block-local label splitting with linkage surgery.
//!
//! A split cuts one unit (a connected component of the linkage) at a time
//! index: positions at or after the index are rewritten to a fresh label
//! drawn from the block's label range, and edges of the component that
//! straddle the index are rewired to the fresh label (or deleted when the
//! block has no label to spare). The fresh label always leaves the linkage
//! disconnected; re-linking is the caller's decision.
use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};

use crate::linkage::Linkage;

/// Split the component of `label` at absolute position `index` within a
/// single block.
///
/// * `block_labels` – labels of the block, rewritten in place.
/// * `block_start`/`block_end` – absolute index range of the block; also the
///   label range fresh labels are drawn from.
/// * `index` – absolute split position; positions `>= index` are rewritten.
/// * `preserved_indices` – absolute positions exempt from rewriting.
///
/// Returns the old-label → new-label map (empty when the block had no free
/// label; edge surgery still runs and deletes straddling edges in that case).
pub fn split_block_1d(
    block_labels: &mut [i64],
    block_start: i64,
    block_end: i64,
    index: i64,
    label: i64,
    linkage: &mut Linkage,
    preserved_indices: &HashSet<i64>,
) -> Result<HashMap<i64, i64>> {
    let block_index = index - block_start;
    let block_size = block_end - block_start;
    if block_size <= 0 {
        bail!("Block is empty");
    }
    if block_index < 0 || block_index as usize >= block_labels.len() {
        bail!("Index out of bounds");
    }

    let cc = linkage.find_connected_component(label);
    let next_label = find_next_label(block_labels, 0, block_size as usize, block_start, block_end);

    let mut label_map = HashMap::new();
    if let Some(nlb) = next_label {
        // Rewrite the component at and after the split index.
        for i in block_index as usize..block_labels.len() {
            let lb = block_labels[i];
            if cc.contains(&lb) && !preserved_indices.contains(&(i as i64 + block_start)) {
                label_map.insert(lb, nlb);
                block_labels[i] = nlb;
            }
        }
        linkage.unlink_nodes(&HashSet::from([nlb]));
    }

    // Rewire or delete component edges that straddle the split index.
    for r in 0..linkage.nrows() {
        let (lo, hi) = (linkage.indptr[r] as usize, linkage.indptr[r + 1] as usize);
        if lo + 2 != hi {
            continue; // not a two-incidence row
        }
        let (mut j_u, mut j_v) = (lo, lo + 1);
        if !(linkage.data[j_u] && linkage.data[j_v]) {
            continue; // edge already removed
        }
        let (mut u, mut v) = (linkage.indices[j_u], linkage.indices[j_v]);
        if !(cc.contains(&u) && cc.contains(&v)) {
            continue;
        }
        if v < u {
            std::mem::swap(&mut u, &mut v);
            std::mem::swap(&mut j_u, &mut j_v);
        }
        if u < index && v >= index {
            match next_label {
                Some(nlb) => linkage.indices[j_u] = nlb,
                None => {
                    linkage.data[j_u] = false;
                    linkage.data[j_v] = false;
                }
            }
        }
    }

    Ok(label_map)
}

/// Split the component of `label` across a range of blocks, relabeling the
/// absolute positions listed in `indices`.
///
/// Each block allocates its own fresh labels, memoized per old label within
/// the call, and every newly created label is unlinked from the linkage.
/// Does not add any links for the new labels.
pub fn split_blocks_2d(
    labels: &mut [i64],
    blocks_start: i64,
    blocks_end: i64,
    block_size: i64,
    indices: &HashSet<i64>,
    label: i64,
    linkage: &mut Linkage,
) -> Result<HashMap<i64, i64>> {
    let n = labels.len();
    if block_size <= 0 {
        bail!("Block size must be positive");
    }
    let n_blocks = (blocks_end - blocks_start) / block_size;
    if n_blocks <= 0 {
        bail!("No blocks to split");
    }
    if ((n_blocks * block_size) as usize) < n {
        bail!("Number of labels does not match number of blocks");
    }

    let cc = linkage.find_connected_component(label);
    let mut new_labels: HashSet<i64> = HashSet::new();
    let mut label_map: HashMap<i64, i64> = HashMap::new();
    // Per-old-label memo; None records an exhausted block.
    let mut cached: HashMap<i64, Option<i64>> = HashMap::new();

    for b in 0..n_blocks {
        let j1 = (b * block_size) as usize;
        let j2 = n.min(((b + 1) * block_size) as usize);
        let block_start = blocks_start + j1 as i64;
        let block_end = blocks_start + j2 as i64;
        for j in j1..j2 {
            let lb = labels[j];
            let lb_index = j as i64 + blocks_start;
            if !(cc.contains(&lb) && indices.contains(&lb_index)) {
                continue;
            }
            let new_lb = match cached.get(&lb) {
                Some(&memo) => memo,
                None => {
                    let found = find_next_label(labels, j1, j2, block_start, block_end);
                    cached.insert(lb, found);
                    if let Some(nlb) = found {
                        new_labels.insert(nlb);
                        label_map.insert(lb, nlb);
                    }
                    found
                }
            };
            if let Some(nlb) = new_lb {
                labels[j] = nlb;
            }
        }
    }

    linkage.unlink_nodes(&new_labels);
    Ok(label_map)
}

/// The smallest integer in `[block_start, block_end)` not used by
/// `labels[index_start..index_end]`, if any.
pub fn find_next_label(
    labels: &[i64],
    index_start: usize,
    index_end: usize,
    block_start: i64,
    block_end: i64,
) -> Option<i64> {
    let used: HashSet<i64> = labels[index_start..index_end].iter().copied().collect();
    (block_start..block_end).find(|lb| !used.contains(lb))
}

/// Pointwise label substitution.
pub fn relabel(labels: &mut [i64], label_map: &HashMap<i64, i64>) {
    for lb in labels.iter_mut() {
        if let Some(&new_lb) = label_map.get(lb) {
            *lb = new_lb;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_label_skips_used() {
        let labels = [0_i64, 1, 3];
        assert_eq!(find_next_label(&labels, 0, 3, 0, 4), Some(2));
        assert_eq!(find_next_label(&labels, 0, 2, 0, 4), Some(2));
        assert_eq!(find_next_label(&labels, 0, 1, 0, 4), Some(1));
    }

    #[test]
    fn next_label_exhausted() {
        let labels = [0_i64, 1];
        assert_eq!(find_next_label(&labels, 0, 2, 0, 2), None);
    }

    #[test]
    fn relabel_substitutes_pointwise() {
        let mut labels = [0_i64, 1, 2, 1];
        relabel(&mut labels, &HashMap::from([(1, 9)]));
        assert_eq!(labels, [0, 9, 2, 9]);
    }

    #[test]
    fn split_rewrites_right_of_index() {
        // One block [0, 4): labels 0,0,0,1. Component of 0 is just {0}.
        let mut labels = vec![0_i64, 0, 0, 1];
        let mut linkage = Linkage::new(vec![], vec![], vec![0], (0, 0)).unwrap();
        let map = split_block_1d(
            &mut labels, 0, 4, 2, 0, &mut linkage, &HashSet::new(),
        )
        .unwrap();
        // Fresh label 2 (0 and 1 are used); only positions >= 2 rewritten.
        assert_eq!(labels, vec![0, 0, 2, 1]);
        assert_eq!(map, HashMap::from([(0, 2)]));
    }

    #[test]
    fn split_preserves_exempt_positions() {
        let mut labels = vec![0_i64, 0, 0, 0];
        let mut linkage = Linkage::new(vec![], vec![], vec![0], (0, 0)).unwrap();
        split_block_1d(
            &mut labels, 0, 4, 1, 0, &mut linkage, &HashSet::from([2]),
        )
        .unwrap();
        assert_eq!(labels, vec![0, 1, 0, 1]);
    }

    #[test]
    fn split_rewires_straddling_edge() {
        // Edge {0, 10} straddles a split at index 8 in block [0, 8).
        let mut labels = vec![0_i64, 0, 0, 0, 0, 0, 0, 0];
        let mut linkage =
            Linkage::new(vec![true, true], vec![0, 10], vec![0, 2], (1, 11)).unwrap();
        let map = split_block_1d(
            &mut labels, 0, 8, 4, 0, &mut linkage, &HashSet::new(),
        )
        .unwrap();
        // Positions 4.. take fresh label 1; the edge endpoint 0 is rewired to 1.
        assert_eq!(labels, vec![0, 0, 0, 0, 1, 1, 1, 1]);
        assert_eq!(map, HashMap::from([(0, 1)]));
        assert_eq!(linkage.indices, vec![1, 10]);
        assert!(linkage.data.iter().all(|&d| d));
    }

    #[test]
    fn split_2d_allocates_per_block() {
        // Two blocks of 4; component {0}; relabel positions 1 and 5.
        let mut labels = vec![0_i64, 0, 2, 3, 0, 0, 6, 7];
        let mut linkage = Linkage::new(vec![], vec![], vec![0], (0, 0)).unwrap();
        let map = split_blocks_2d(
            &mut labels, 0, 8, 4, &HashSet::from([1, 5]), 0, &mut linkage,
        )
        .unwrap();
        // Block 0 allocates 1; block 1 re-uses the memoized mapping 0 -> 1.
        assert_eq!(labels, vec![0, 1, 2, 3, 0, 1, 6, 7]);
        assert_eq!(map, HashMap::from([(0, 1)]));
    }
}
