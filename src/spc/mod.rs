//! Super-paramagnetic clustering (SPC).
//!
//! Potts-model clustering after Blatt, Wiseman & Domany: each point carries a
//! spin in `[0, Q)`; neighboring points interact with a strength that decays
//! with their distance; Swendsen–Wang sweeps sample the spin configuration
//! across a ladder of temperatures. At low temperature everything freezes
//! into one cluster, at high temperature everything melts; the cluster
//! structure in between is the signal.
//!
//! ```no_run
//! use ndarray::Array2;
//! use spikekit::spc::{super_paramagnetic_clustering, SpcParams};
//!
//! let dists: Array2<f64> = Array2::zeros((200, 200)); // pairwise distances
//! let params = SpcParams { seed: Some(7), ..SpcParams::default() };
//! let (temps, labels) = super_paramagnetic_clustering(dists.view(), &params).unwrap();
//! // labels is [temps.len(), 200]: one cluster assignment row per temperature.
//! ```
pub(crate) mod graph;
pub(crate) mod sw;

use anyhow::{bail, Result};
use ndarray::{Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of Potts spin states.
const Q: u32 = 20;
/// Fraction of sweeps whose statistics are kept; the rest are burn-in.
const SW_FRACT: f64 = 0.8;
/// Correlation-ratio threshold for the reported partition.
const TH_N: f64 = 0.5;

/// SPC run parameters.
///
/// Construct with struct-update syntax off [`SpcParams::default()`]:
///
/// ```
/// use spikekit::SpcParams;
///
/// let params = SpcParams {
///     t_max: 0.1,
///     seed: Some(42),
///     ..SpcParams::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct SpcParams {
    /// Lowest temperature of the ladder.
    pub t_min: f32,
    /// Highest temperature (inclusive).
    pub t_max: f32,
    /// Temperature increment. Must be positive.
    pub t_step: f32,
    /// Total Monte Carlo cycles per temperature (burn-in included).
    pub cycles: usize,
    /// Neighbor count for the mutual-KNN graph. Must be below the point count.
    pub knn: usize,
    /// Fuse the minimum spanning tree into the neighbor graph, keeping it
    /// connected even where mutual-KNN leaves islands.
    pub mst: bool,
    /// Seed for the run's own generator; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SpcParams {
    /// Spike-train defaults: T ∈ [0, 0.25] in steps of 0.01, 500 cycles,
    /// K = 11 with the MST fused in.
    fn default() -> Self {
        Self {
            t_min: 0.0,
            t_max: 0.25,
            t_step: 0.01,
            cycles: 500,
            knn: 11,
            mst: true,
            seed: None,
        }
    }
}

/// Run SPC over a pairwise distance matrix.
///
/// * `dists` – symmetric nonnegative distances, shape `[N, N]`.
///
/// Returns `(temps, assignments)`: one temperature per ladder step and the
/// matching `[temps.len(), N]` cluster-id matrix, clusters numbered by
/// decreasing size within each row. Deterministic given `params.seed`.
pub fn super_paramagnetic_clustering(
    dists: ArrayView2<f64>,
    params: &SpcParams,
) -> Result<(Array1<f32>, Array2<u32>)> {
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    super_paramagnetic_clustering_with_rng(dists, params, &mut rng)
}

/// [`super_paramagnetic_clustering`] with a caller-owned generator.
///
/// Lets callers serialize several runs through one RNG stream or supply a
/// counter-based generator; `params.seed` is ignored.
pub fn super_paramagnetic_clustering_with_rng<R: Rng>(
    dists: ArrayView2<f64>,
    params: &SpcParams,
    rng: &mut R,
) -> Result<(Array1<f32>, Array2<u32>)> {
    let n = dists.nrows();
    if dists.ncols() != n {
        bail!("distance matrix must be square");
    }
    if dists.iter().any(|&d| d < 0.0) {
        bail!("distances must be nonnegative");
    }
    if params.knn == 0 || params.knn >= n {
        bail!("Number of nearest neighbors can be at most the number of samples");
    }
    if params.t_min > params.t_max {
        bail!("Tmin must be less than or equal to Tmax");
    }
    if !(params.t_step > 0.0) {
        bail!("t_step must be positive");
    }
    if params.cycles == 0 {
        bail!("cycles must be positive");
    }

    // Interaction graph
    let nbr = graph::mutual_knn(dists, params.knn, params.mst);
    let inv = graph::invert_edges(&nbr);
    let mut stats = graph::edge_distances(&nbr, dists);
    if stats.n_edges == 0 {
        bail!("no edges");
    }
    graph::distances_to_interactions(&mut stats, &nbr, &inv);

    // Workspace, shaped like the neighbor lists, reused across temperatures.
    let mut p: Vec<Vec<f64>> = nbr.iter().map(|r| vec![0.0; r.len()]).collect();
    let mut bond: Vec<Vec<bool>> = nbr.iter().map(|r| vec![false; r.len()]).collect();
    let mut corr: Vec<Vec<u32>> = nbr.iter().map(|r| vec![0; r.len()]).collect();
    let mut block = vec![0u32; n];
    let mut cluster_size: Vec<u32> = Vec::with_capacity(n);
    let mut spin: Vec<u32> = (0..n).map(|_| rng.gen_range(0..Q)).collect();

    let n_burn = (params.cycles as f64 * (1.0 - SW_FRACT)).round() as usize;
    let n_meas = params.cycles - n_burn.min(params.cycles) + 1;

    let mut temps: Vec<f32> = Vec::new();
    let mut clusters: Vec<u32> = Vec::new();

    let mut t = params.t_min;
    while t <= params.t_max {
        for row in corr.iter_mut() {
            row.iter_mut().for_each(|v| *v = 0);
        }
        sw::deletion_probabilities(t as f64, &stats.j, &mut p);

        for _ in 0..n_burn {
            sw::set_bond(&p, &spin, &mut bond, &nbr, &inv, rng);
            let nc = sw::coarsening(&bond, &nbr, &mut block, &mut cluster_size);
            sw::new_spin_config(&mut spin, &block, nc, Q, rng);
        }

        for _ in 0..n_meas {
            sw::set_bond(&p, &spin, &mut bond, &nbr, &inv, rng);
            let nc = sw::coarsening(&bond, &nbr, &mut block, &mut cluster_size);
            sw::new_spin_config(&mut spin, &block, nc, Q, rng);
            sw::global_correlation(&mut corr, &nbr, &block);
        }

        sw::directed_growth(
            n_meas, TH_N, &corr, &nbr, &inv, &mut bond, &mut block, &mut cluster_size,
        );

        clusters.extend_from_slice(&block);
        temps.push(t);
        t += params.t_step;
    }

    let n_t = temps.len();
    Ok((
        Array1::from_vec(temps),
        Array2::from_shape_vec((n_t, n), clusters).expect("assignments are [T, N]"),
    ))
}
