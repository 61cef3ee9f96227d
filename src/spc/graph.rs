//! Neighbor-graph construction for super-paramagnetic clustering.
//!
//! The interaction graph is the mutual K-nearest-neighbor graph of the
//! distance matrix, optionally unioned with its minimum spanning tree so the
//! graph stays connected. Neighbor lists are kept sorted ascending and an
//! inverse index records, for each directed slot `(i, k)`, where `i` sits in
//! the partner's list.
use ndarray::ArrayView2;

/// Mutual-KNN neighbor lists, optionally fused with the MST.
///
/// A pair `(i, j)` becomes an edge iff each point appears among the other's
/// `k` nearest (mutuality is evaluated on the unmodified candidate lists),
/// or the pair is an MST edge. Rows come out sorted ascending.
pub(crate) fn mutual_knn(dists: ArrayView2<f64>, k: usize, mstree: bool) -> Vec<Vec<u32>> {
    let n = dists.nrows();

    // K nearest candidates per point, self excluded.
    let mut mnv: Vec<Vec<u32>> = Vec::with_capacity(n);
    for i in 0..n {
        let mut order: Vec<u32> = (0..n as u32).filter(|&j| j as usize != i).collect();
        order.sort_by(|&a, &b| {
            let (da, db) = (dists[[i, a as usize]], dists[[i, b as usize]]);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b))
        });
        order.truncate(k);
        mnv.push(order);
    }

    let mst_edges = if mstree { mstree_prim(dists) } else { Vec::new() };

    let mut nbr: Vec<Vec<u32>> = Vec::with_capacity(n);
    let mut occ = vec![false; n];
    for i in 0..n {
        occ.iter_mut().for_each(|o| *o = false);
        for &cand in &mnv[i] {
            if mnv[cand as usize].contains(&(i as u32)) {
                occ[cand as usize] = true;
            }
        }
        for &(u, v) in &mst_edges {
            if u as usize == i {
                occ[v as usize] = true;
            } else if v as usize == i {
                occ[u as usize] = true;
            }
        }
        nbr.push(
            (0..n as u32).filter(|&j| occ[j as usize]).collect(),
        );
    }
    nbr
}

/// Minimum spanning tree by Prim's algorithm, O(N²) on the distance matrix.
///
/// Grows from vertex N-1, tracking for every unvisited vertex the cheapest
/// connection into the tree.
pub(crate) fn mstree_prim(dists: ArrayView2<f64>) -> Vec<(u32, u32)> {
    let n = dists.nrows();
    if n < 2 {
        return Vec::new();
    }

    let mut v: Vec<usize> = (0..n - 1).collect(); // unvisited vertices
    let mut l = vec![f64::INFINITY; n - 1]; // cheapest distance into the tree
    let mut label = vec![0usize; n - 1]; // tree endpoint of that distance
    let mut edges = Vec::with_capacity(n - 1);

    let mut u = n - 1;
    for i in 0..n - 1 {
        let mut ml = f64::INFINITY;
        let mut mi = 0usize;
        for j in 0..n - i - 1 {
            let d = dists[[u, v[j]]];
            if d <= l[j] {
                l[j] = d;
                label[j] = u;
            }
            if l[j] <= ml {
                ml = l[j];
                mi = j;
            }
        }
        edges.push((label[mi] as u32, v[mi] as u32));
        u = v[mi];
        let last = n - i - 2;
        v[mi] = v[last];
        l[mi] = l[last];
        label[mi] = label[last];
    }
    edges
}

/// Inverse index: `inv[i][k]` is the slot of `i` in `nbr[nbr[i][k]]`.
pub(crate) fn invert_edges(nbr: &[Vec<u32>]) -> Vec<Vec<u32>> {
    nbr.iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .map(|&p| {
                    nbr[p as usize]
                        .iter()
                        .position(|&q| q as usize == i)
                        .expect("neighbor lists are symmetric") as u32
                })
                .collect()
        })
        .collect()
}

/// Per-slot edge weights plus the graph-wide averages that scale the
/// Potts interactions.
pub(crate) struct EdgeStats {
    /// Per-slot values: distances on construction, interactions `J` after
    /// [`distances_to_interactions`].
    pub j: Vec<Vec<f64>>,
    /// Number of undirected edges.
    pub n_edges: usize,
    /// Average edge distance ⟨d⟩.
    pub mean_dist: f64,
    /// Average connectivity ⟨nn⟩ = 2E/N.
    pub mean_connectivity: f64,
}

/// Collect per-edge distances and the graph averages, summing in index order.
pub(crate) fn edge_distances(nbr: &[Vec<u32>], dists: ArrayView2<f64>) -> EdgeStats {
    let n = nbr.len();
    let mut total = 0.0_f64;
    let mut count = 0usize;
    let j: Vec<Vec<f64>> = nbr
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .map(|&p| {
                    let d = dists[[i, p as usize]];
                    if d < f64::INFINITY {
                        total += d;
                        count += 1;
                    }
                    d
                })
                .collect()
        })
        .collect();

    let n_edges = count / 2;
    EdgeStats {
        j,
        n_edges,
        mean_dist: total / (2.0 * n_edges as f64),
        mean_connectivity: 2.0 * n_edges as f64 / n as f64,
    }
}

/// Replace per-slot distances with Potts interaction strengths:
/// `J = exp(−(d·d′) / (2⟨d⟩²)) / ⟨nn⟩`, assigned symmetrically to both
/// directed slots of each edge.
pub(crate) fn distances_to_interactions(
    stats: &mut EdgeStats,
    nbr: &[Vec<u32>],
    inv: &[Vec<u32>],
) {
    let chd2 = stats.mean_dist * stats.mean_dist;
    for i in 0..nbr.len() {
        // Upper partners sit at the tail of the sorted row.
        for k in (0..nbr[i].len()).rev() {
            let p = nbr[i][k] as usize;
            if p <= i {
                break;
            }
            let kp = inv[i][k] as usize;
            let dd = (stats.j[i][k] * stats.j[p][kp]) / chd2;
            let val = (-dd / 2.0).exp() / stats.mean_connectivity;
            stats.j[i][k] = val;
            stats.j[p][kp] = val;
        }
    }
}
