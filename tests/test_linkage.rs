use std::collections::HashSet;

use spikekit::{apply_venn_mask, relabel, split_block_1d, Linkage, Venn};

fn from_edges(edges: &[(i64, i64)], n_vertices: usize) -> Linkage {
    let mut data = Vec::new();
    let mut indices = Vec::new();
    let mut indptr = vec![0_i64];
    for &(u, v) in edges {
        data.extend_from_slice(&[true, true]);
        indices.extend_from_slice(&[u, v]);
        indptr.push(indices.len() as i64);
    }
    Linkage::new(data, indices, indptr, (edges.len(), n_vertices)).unwrap()
}

/// Labels 0..12 with three components: {0,1,2,3}, {4,5,6} (triangle), {10,11}.
fn three_components() -> Linkage {
    from_edges(&[(0, 1), (1, 2), (2, 3), (4, 5), (5, 6), (4, 6), (10, 11)], 12)
}

#[test]
fn relabel_by_cc_is_idempotent() {
    let l = three_components();
    for label in [0_i64, 3, 5, 6, 10, 11, 77] {
        let once = l.relabel_by_cc(label);
        assert_eq!(l.relabel_by_cc(once), once, "not idempotent for {label}");
    }
}

#[test]
fn link_labels_maps_to_component_minimum() {
    let l = three_components();
    let linked = l.link_labels(&[3, 6, 11, 0, 99, 6]);
    assert_eq!(linked, vec![0, 4, 10, 0, 99, 4]);
}

#[test]
fn unlink_isolates_every_member_edge() {
    let mut l = three_components();
    l.unlink_nodes(&HashSet::from([5]));
    // 5 touched edges 4-5 and 5-6; the triangle's third edge 4-6 survives.
    assert_eq!(l.find_connected_component(5), HashSet::from([5]));
    assert_eq!(l.find_connected_component(4), HashSet::from([4, 6]));
    // Other components untouched.
    assert_eq!(l.find_connected_component(1), HashSet::from([0, 1, 2, 3]));
}

#[test]
fn filter_by_cc_selects_component_rows() {
    let l = three_components();
    let labels = [0_i64, 4, 1, 10, 3, 6];
    let data = [100_i64, 200, 300, 400, 500, 600];
    let kept = l.filter_by_cc(2, &labels, &data).unwrap();
    assert_eq!(kept, vec![100, 300, 500]);
}

#[test]
fn split_does_not_merge() {
    // Block [0, 8) holds the chained component {0,1,2,3} over positions 0..8.
    let mut l = from_edges(&[(0, 1), (1, 2), (2, 3)], 8);
    let mut labels = vec![0_i64, 0, 1, 1, 2, 2, 3, 3];
    let map = split_block_1d(&mut labels, 0, 8, 4, 1, &mut l, &HashSet::new()).unwrap();
    assert!(!map.is_empty());
    let new_labels: HashSet<i64> = map.values().copied().collect();

    // No component label left of the split may equal a rewritten right label.
    let left: HashSet<i64> = labels[..4].iter().copied().collect();
    for nlb in &new_labels {
        assert!(!left.contains(nlb), "split merged label {nlb} across the cut");
    }
    // The fresh labels are disconnected in the linkage.
    for &nlb in &new_labels {
        assert_eq!(l.find_connected_component(nlb), HashSet::from([nlb]));
    }
}

#[test]
fn split_rewires_straddling_edges_to_new_label() {
    let mut l = from_edges(&[(0, 1), (1, 2), (2, 3)], 8);
    let mut labels = vec![0_i64, 0, 1, 1, 2, 2, 3, 3];
    let map = split_block_1d(&mut labels, 0, 8, 2, 0, &mut l, &HashSet::new()).unwrap();

    // First free label in [0, 8) is 4; every position >= 2 is in the component.
    assert_eq!(&labels[..2], &[0, 0]);
    assert!(labels[2..].iter().all(|&lb| lb == 4));
    assert_eq!(map.get(&1), Some(&4));

    // Edge 1-2 straddled the cut (1 < 2 <= 2) and was rewired to 4-2;
    // 0's component no longer reaches the right side of the split.
    let cc0 = l.find_connected_component(0);
    assert_eq!(cc0, HashSet::from([0, 1]));
    let cc4 = l.find_connected_component(4);
    assert_eq!(cc4, HashSet::from([4, 2, 3]));
}

#[test]
fn exhausted_block_deletes_straddling_edges() {
    // All labels 0..4 used: no fresh label available, so the straddling
    // edge is deleted instead of rewired.
    let mut l = from_edges(&[(0, 1), (1, 2), (2, 3)], 4);
    let mut labels = vec![0_i64, 1, 2, 3];
    let map = split_block_1d(&mut labels, 0, 4, 2, 0, &mut l, &HashSet::new()).unwrap();
    assert!(map.is_empty());
    assert_eq!(labels, vec![0, 1, 2, 3]); // nothing rewritten
    // Edge 1-2 straddled (1 < 2 <= 2) and is gone; 0-1 and 2-3 survive.
    assert_eq!(l.find_connected_component(0), HashSet::from([0, 1]));
    assert_eq!(l.find_connected_component(2), HashSet::from([2, 3]));
}

#[test]
fn venn_mask_scenario() {
    let venn: Venn = vec![(HashSet::from([1, 2]), true), (HashSet::from([3]), false)];
    let mask = apply_venn_mask(&venn, &[1, 3, 2, 4]);
    assert_eq!(mask, vec![true, false, true, false]);
}

#[test]
fn relabel_applies_split_map() {
    let mut l = from_edges(&[(0, 1), (1, 2), (2, 3)], 4);
    let mut labels = vec![0_i64, 1, 2, 2];
    let map = split_block_1d(&mut labels, 0, 4, 2, 0, &mut l, &HashSet::new()).unwrap();
    assert_eq!(map.get(&2), Some(&3));

    // The same map can be replayed onto another array holding old labels.
    let mut other = vec![2_i64, 0, 2];
    relabel(&mut other, &map);
    assert_eq!(other, vec![3, 0, 3]);
}
