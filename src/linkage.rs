//! Label-linkage graph: sparse edge-vertex incidence over cluster labels.
//!
//! Block-wise clustering assigns labels independently per block; the linkage
//! records which labels refer to the same underlying unit. It is a CSR
//! edge-vertex incidence matrix: row r is edge r, and the row's column
//! indices are the vertex labels incident to that edge. The boolean `data`
//! flag marks each incidence live; a real edge has exactly two live
//! incidences, and liveness is only ever flipped for a whole row at once.
//!
//! ```text
//! data    [ true  true  false false ]     edge 0 = {5, 7}   (live)
//! indices [   5     7     7     9   ]     edge 1 = {7, 9}   (removed)
//! indptr  [ 0, 2, 4 ]                     shape = (2 edges, 2 vertices)
//! ```
//!
//! Consumers treat the linkage as a union-find-like structure through
//! connected-component queries; the component minimum is the canonical label.
use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet, VecDeque};

/// Sparse edge-vertex incidence matrix in CSR form.
///
/// Vertex identity is the `i64` label itself; labels need not be contiguous.
/// All mutation is row-local and flips both incidences of an edge together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linkage {
    /// Liveness flag per incidence.
    pub data: Vec<bool>,
    /// Vertex label per incidence.
    pub indices: Vec<i64>,
    /// Row offsets, length `rows + 1`, nondecreasing, starting at 0.
    pub indptr: Vec<i64>,
    /// `(edge rows, vertex count)`.
    pub shape: (usize, usize),
}

impl Linkage {
    /// Wrap the four CSR buffers, validating the format.
    pub fn new(
        data: Vec<bool>,
        indices: Vec<i64>,
        indptr: Vec<i64>,
        shape: (usize, usize),
    ) -> Result<Self> {
        if data.len() != indices.len() {
            bail!("data and indices must have the same length");
        }
        if indptr.len() != shape.0 + 1 {
            bail!("indptr length must be rows + 1");
        }
        if indptr.first() != Some(&0) {
            bail!("indptr must start at 0");
        }
        if *indptr.last().unwrap() as usize != data.len() {
            bail!("indptr must end at nnz");
        }
        if indptr.windows(2).any(|w| w[1] < w[0]) {
            bail!("indptr must be nondecreasing");
        }
        Ok(Self { data, indices, indptr, shape })
    }

    /// Number of edge rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.shape.0
    }

    /// Incidence range of row `r`.
    #[inline]
    fn row_range(&self, r: usize) -> std::ops::Range<usize> {
        self.indptr[r] as usize..self.indptr[r + 1] as usize
    }

    /// Map each vertex to the rows holding a live incidence of it.
    /// Built per query so that component traversal is linear in nnz.
    fn live_rows_by_vertex(&self) -> HashMap<i64, Vec<usize>> {
        let mut map: HashMap<i64, Vec<usize>> = HashMap::new();
        for r in 0..self.nrows() {
            for k in self.row_range(r) {
                if self.data[k] {
                    map.entry(self.indices[k]).or_default().push(r);
                }
            }
        }
        map
    }

    /// The connected component containing `node`, via BFS over live edges.
    ///
    /// Every vertex sharing a row (edge) with a live incidence of `node` is a
    /// neighbor. A node with no live incidences is its own component.
    pub fn find_connected_component(&self, node: i64) -> HashSet<i64> {
        let rows_of = self.live_rows_by_vertex();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(node);
        while let Some(v) = queue.pop_front() {
            if !seen.insert(v) {
                continue;
            }
            let Some(rows) = rows_of.get(&v) else { continue };
            for &r in rows {
                for k in self.row_range(r) {
                    if self.data[k] && self.indices[k] != v {
                        queue.push_back(self.indices[k]);
                    }
                }
            }
        }
        seen
    }

    /// The numeric minimum of the component containing `label`.
    pub fn relabel_by_cc(&self, label: i64) -> i64 {
        self.find_connected_component(label)
            .into_iter()
            .min()
            .unwrap_or(label)
    }

    /// Map every input label to its component minimum.
    ///
    /// Components are walked once per distinct label encountered; results are
    /// memoized across the whole batch.
    pub fn link_labels(&self, unlinked: &[i64]) -> Vec<i64> {
        let mut label_map: HashMap<i64, i64> = HashMap::new();
        let mut linked = Vec::with_capacity(unlinked.len());
        for &label in unlinked {
            if let Some(&min_label) = label_map.get(&label) {
                linked.push(min_label);
            } else {
                let cc = self.find_connected_component(label);
                let min_label = cc.iter().copied().min().unwrap_or(label);
                for v in cc {
                    label_map.insert(v, min_label);
                }
                linked.push(min_label);
            }
        }
        linked
    }

    /// Keep `data[i]` for every position whose `labels[i]` lies in the
    /// component of `node`.
    pub fn filter_by_cc(&self, node: i64, labels: &[i64], data: &[i64]) -> Result<Vec<i64>> {
        if labels.len() != data.len() {
            bail!("labels and data must have the same length");
        }
        let cc = self.find_connected_component(node);
        Ok(labels
            .iter()
            .zip(data.iter())
            .filter(|(lb, _)| cc.contains(lb))
            .map(|(_, &v)| v)
            .collect())
    }

    /// Remove every edge incident to any vertex in `nodes`.
    ///
    /// A row with at least one live incidence to `nodes` has all of its
    /// incidences flipped to not-live, removing the edge wholesale.
    pub fn unlink_nodes(&mut self, nodes: &HashSet<i64>) {
        for r in 0..self.nrows() {
            let range = self.row_range(r);
            let needs_unlinking = range
                .clone()
                .any(|k| self.data[k] && nodes.contains(&self.indices[k]));
            if needs_unlinking {
                for k in range {
                    self.data[k] = false;
                }
            }
        }
    }
}
