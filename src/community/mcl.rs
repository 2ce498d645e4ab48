//! Markov Clustering (MCL).
//!
//! Finds clusters by simulating random walks on a weighted graph and
//! sharpening the walk probabilities until the transition matrix settles
//! into a block structure.
//!
//! ## The Algorithm (van Dongen 2000)
//!
//! Starting from a non-negative square matrix `M`:
//!
//! 1. **Normalize**: scale each column to sum to 1 (column-stochastic).
//! 2. **Expand**: `M ← Mᵖ`. Walks of length p spread probability mass
//!    along dense regions.
//! 3. **Inflate**: `M[i][j] ← M[i][j]^q`, then renormalize columns. Strong
//!    transitions get stronger and weak ones fade. This is the step that
//!    breaks symmetry and drives convergence.
//! 4. **Prune**: zero entries below a threshold and renormalize, bounding
//!    density and numeric drift.
//! 5. Repeat 2–4 until the matrix stops changing or the iteration cap hits.
//!
//! ## Reading Clusters
//!
//! In the converged matrix, an **attractor** is a node `i` with
//! `M[i][i] ≠ 0`. Its cluster is every `j` with `M[i][j] ≠ 0`. Several
//! attractors can share one cluster, so identical index sets collapse.
//! Clusters are not guaranteed to partition the nodes: a node can appear in
//! zero, one, or several of them.
//!
//! ## Parameters
//!
//! | Parameter | Default | Effect |
//! |-----------|---------|--------|
//! | expansion p | 2 | Longer walks merge more |
//! | inflation q | 2.0 | Higher splits into finer clusters |
//! | iterations | 10 | Hard cap; hitting it is not an error |
//! | prune threshold | 1e-4 | 0 disables pruning |
//!
//! ## References
//!
//! - van Dongen (2000). "Graph Clustering by Flow Simulation." PhD thesis,
//!   University of Utrecht.

use std::collections::BTreeSet;

use ndarray::{Array2, Axis};
use tracing::{debug, trace};

use super::traits::GraphClustering;
use crate::error::{Error, Result};
use crate::graph::SimilarityGraph;

/// Markov Clustering configuration and runner.
#[derive(Debug, Clone)]
pub struct MarkovClustering {
    /// Matrix power applied in the expansion step.
    expansion: u32,
    /// Element-wise power applied in the inflation step.
    inflation: f64,
    /// Maximum expand/inflate/prune rounds.
    max_iter: usize,
    /// Entries below this are zeroed after inflation.
    prune_threshold: f64,
    /// Relative tolerance of the convergence check.
    rtol: f64,
    /// Absolute tolerance of the convergence check.
    atol: f64,
}

/// Converged matrix and the clusters read from it.
#[derive(Debug, Clone)]
pub struct MclOutput {
    /// Distinct clusters, each a sorted list of node indices, in sorted order.
    pub clusters: Vec<Vec<usize>>,
    /// Final transition matrix. Its values are probabilities, not similarities.
    pub matrix: Array2<f64>,
    /// Rounds actually performed.
    pub iterations: usize,
    /// True if the loop stopped on convergence rather than on the cap.
    pub converged: bool,
}

impl MarkovClustering {
    /// Create a runner with default parameters.
    pub fn new() -> Self {
        Self {
            expansion: 2,
            inflation: 2.0,
            max_iter: 10,
            prune_threshold: 1e-4,
            rtol: 1e-5,
            atol: 1e-8,
        }
    }

    /// Set the expansion power.
    pub fn with_expansion(mut self, power: u32) -> Self {
        self.expansion = power;
        self
    }

    /// Set the inflation power.
    pub fn with_inflation(mut self, power: f64) -> Self {
        self.inflation = power;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the prune threshold. 0 disables pruning.
    pub fn with_prune_threshold(mut self, threshold: f64) -> Self {
        self.prune_threshold = threshold;
        self
    }

    /// Set the convergence tolerances.
    pub fn with_tolerance(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    /// Iteration cap.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    fn validate(&self) -> Result<()> {
        if self.expansion == 0 {
            return Err(Error::InvalidParameter {
                name: "expansion",
                message: "must be at least 1",
            });
        }
        if !(self.inflation.is_finite() && self.inflation > 0.0) {
            return Err(Error::InvalidParameter {
                name: "inflation",
                message: "must be finite and positive",
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if !(self.prune_threshold.is_finite() && self.prune_threshold >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "prune_threshold",
                message: "must be finite and non-negative",
            });
        }
        if !(self.rtol >= 0.0 && self.atol >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                message: "must be non-negative",
            });
        }
        Ok(())
    }

    /// Iterate a square non-negative matrix to its steady state and extract clusters.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] for a 0×0 matrix
    /// - [`Error::InvalidShape`] for a non-square matrix
    /// - [`Error::InvalidParameter`] for bad settings or negative/non-finite entries
    pub fn fit(&self, matrix: &Array2<f64>) -> Result<MclOutput> {
        self.validate()?;
        let (r, c) = matrix.dim();
        if r != c {
            return Err(Error::shape("square matrix", format!("{r} x {c}")));
        }
        if r == 0 {
            return Err(Error::EmptyCollection);
        }
        if matrix.iter().any(|&x| !(x.is_finite() && x >= 0.0)) {
            return Err(Error::InvalidParameter {
                name: "matrix",
                message: "entries must be finite and non-negative",
            });
        }

        let mut m = matrix.clone();
        normalize(&mut m);

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iter {
            iterations += 1;
            let previous = m.clone();

            m = expand(&m, self.expansion);
            inflate(&mut m, self.inflation);
            if self.prune_threshold > 0.0 {
                let pruned = prune(&mut m, self.prune_threshold);
                if pruned > 0 {
                    normalize(&mut m);
                }
                trace!(iteration = iterations, pruned, "mcl round");
            }

            if is_converged(&previous, &m, self.rtol, self.atol) {
                converged = true;
                break;
            }
        }

        let clusters = get_clusters(&m);
        debug!(
            nodes = r,
            iterations,
            converged,
            clusters = clusters.len(),
            "markov clustering finished"
        );

        Ok(MclOutput {
            clusters,
            matrix: m,
            iterations,
            converged,
        })
    }
}

impl MarkovClustering {
    /// [`fit`](Self::fit) on the full similarity matrix behind `graph`.
    pub fn fit_graph(&self, graph: &SimilarityGraph) -> Result<MclOutput> {
        self.fit(graph.dense())
    }
}

impl Default for MarkovClustering {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphClustering for MarkovClustering {
    fn clusters(&self, graph: &SimilarityGraph) -> Result<Vec<Vec<usize>>> {
        Ok(self.fit_graph(graph)?.clusters)
    }
}

/// Scale every column to sum to 1. All-zero columns stay zero.
pub fn normalize(m: &mut Array2<f64>) {
    for mut col in m.axis_iter_mut(Axis(1)) {
        let sum: f64 = col.sum();
        if sum > 0.0 {
            col.mapv_inplace(|x| x / sum);
        }
    }
}

/// `m` raised to an integer matrix power (`power >= 1`).
pub fn expand(m: &Array2<f64>, power: u32) -> Array2<f64> {
    let mut out = m.clone();
    for _ in 1..power {
        out = out.dot(m);
    }
    out
}

/// Element-wise power followed by column renormalization.
pub fn inflate(m: &mut Array2<f64>, power: f64) {
    m.mapv_inplace(|x| x.powf(power));
    normalize(m);
}

/// Zero every entry below `threshold`. Returns how many nonzero entries were cleared.
pub fn prune(m: &mut Array2<f64>, threshold: f64) -> usize {
    let mut pruned = 0;
    m.mapv_inplace(|x| {
        if x != 0.0 && x < threshold {
            pruned += 1;
            0.0
        } else {
            x
        }
    });
    pruned
}

/// Element-wise `|a - b| <= atol + rtol * |b|`.
pub fn is_converged(a: &Array2<f64>, b: &Array2<f64>, rtol: f64, atol: f64) -> bool {
    a.dim() == b.dim()
        && a
            .iter()
            .zip(b.iter())
            .all(|(&x, &y)| (x - y).abs() <= atol + rtol * y.abs())
}

/// Distinct clusters of a converged matrix, one per attractor.
///
/// Output is sorted, so it does not depend on attractor order.
pub fn get_clusters(m: &Array2<f64>) -> Vec<Vec<usize>> {
    let n = m.nrows().min(m.ncols());
    let mut clusters = BTreeSet::new();
    for i in (0..n).filter(|&i| m[[i, i]] != 0.0) {
        let members: Vec<usize> = m
            .row(i)
            .iter()
            .enumerate()
            .filter(|(_, &x)| x != 0.0)
            .map(|(j, _)| j)
            .collect();
        let _ = clusters.insert(members);
    }
    clusters.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn column_sums(m: &Array2<f64>) -> Vec<f64> {
        m.axis_iter(Axis(1)).map(|c| c.sum()).collect()
    }

    #[test]
    fn test_normalize_columns() {
        let mut m = array![[1.0, 0.0, 2.0], [3.0, 0.0, 2.0]];
        normalize(&mut m);
        assert_eq!(column_sums(&m)[0], 1.0);
        assert_eq!(column_sums(&m)[1], 0.0);
        assert_eq!(m[[0, 0]], 0.25);
        assert_eq!(m[[1, 2]], 0.5);
    }

    #[test]
    fn test_expand_is_matrix_power() {
        let m = array![[0.5, 0.5], [0.5, 0.5]];
        assert_eq!(expand(&m, 1), m);
        assert_eq!(expand(&m, 3), m);

        let p = array![[0.0, 1.0], [1.0, 0.0]];
        assert_eq!(expand(&p, 2), Array2::<f64>::eye(2));
    }

    #[test]
    fn test_inflate_sharpens() {
        let mut m = array![[0.75, 0.5], [0.25, 0.5]];
        inflate(&mut m, 2.0);
        assert!((m[[0, 0]] - 0.9).abs() < 1e-12);
        assert!((m[[1, 0]] - 0.1).abs() < 1e-12);
        assert!((m[[0, 1]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_prune_counts() {
        let mut m = array![[0.5, 0.00001], [0.0, 0.99999]];
        assert_eq!(prune(&mut m, 1e-4), 1);
        assert_eq!(m[[0, 1]], 0.0);
    }

    #[test]
    fn test_two_blocks() {
        let sim = array![
            [1.0, 1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 1.0],
            [0.0, 0.0, 1.0, 1.0],
        ];
        let out = MarkovClustering::new().fit(&sim).unwrap();
        assert_eq!(out.clusters, vec![vec![0, 1], vec![2, 3]]);
        assert!(out.converged);
        assert_eq!(out.iterations, 1);
    }

    #[test]
    fn test_weakly_linked_blocks_split() {
        let sim = array![
            [1.0, 0.9, 0.8, 0.05, 0.0, 0.0],
            [0.9, 1.0, 0.9, 0.0, 0.0, 0.0],
            [0.8, 0.9, 1.0, 0.0, 0.0, 0.05],
            [0.05, 0.0, 0.0, 1.0, 0.9, 0.8],
            [0.0, 0.0, 0.0, 0.9, 1.0, 0.9],
            [0.0, 0.0, 0.05, 0.8, 0.9, 1.0],
        ];
        let out = MarkovClustering::new().with_max_iter(50).fit(&sim).unwrap();
        for cluster in &out.clusters {
            let left = cluster.iter().all(|&i| i < 3);
            let right = cluster.iter().all(|&i| i >= 3);
            assert!(left || right, "cluster {cluster:?} crosses blocks");
        }
        assert!(!out.clusters.is_empty());
    }

    #[test]
    fn test_single_node() {
        let out = MarkovClustering::new().fit(&array![[1.0]]).unwrap();
        assert_eq!(out.clusters, vec![vec![0]]);
    }

    #[test]
    fn test_isolated_zero_column_survives() {
        let sim = array![[1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
        let out = MarkovClustering::new().fit(&sim).unwrap();
        assert_eq!(column_sums(&out.matrix)[2], 0.0);
        // node 2 has no attractor and lands in no cluster
        assert_eq!(out.clusters, vec![vec![0, 1]]);
    }

    #[test]
    fn test_iteration_cap_is_not_an_error() {
        let sim = array![[1.0, 0.6, 0.1], [0.6, 1.0, 0.6], [0.1, 0.6, 1.0]];
        let out = MarkovClustering::new()
            .with_max_iter(1)
            .with_prune_threshold(0.0)
            .fit(&sim)
            .unwrap();
        assert_eq!(out.iterations, 1);
    }

    #[test]
    fn test_invalid_inputs() {
        let mcl = MarkovClustering::new();
        assert!(matches!(
            mcl.fit(&Array2::zeros((2, 3))),
            Err(Error::InvalidShape { .. })
        ));
        assert_eq!(
            mcl.fit(&Array2::zeros((0, 0))).unwrap_err(),
            Error::EmptyCollection
        );
        assert!(mcl.fit(&array![[1.0, -0.5], [-0.5, 1.0]]).is_err());
        assert!(MarkovClustering::new()
            .with_max_iter(0)
            .fit(&array![[1.0]])
            .is_err());
        assert!(MarkovClustering::new()
            .with_expansion(0)
            .fit(&array![[1.0]])
            .is_err());
    }

    #[test]
    fn test_get_clusters_dedups_and_sorts() {
        let m = array![
            [0.5, 0.5, 0.0],
            [0.5, 0.5, 0.0],
            [0.0, 0.0, 1.0],
        ];
        assert_eq!(get_clusters(&m), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_graph_clustering_accepts_adjacency() {
        use crate::graph::{build, Representation};

        let sim = array![
            [1.0, 0.7, 0.0, 0.0],
            [0.7, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.7],
            [0.0, 0.0, 0.7, 1.0],
        ];
        let mcl = MarkovClustering::new();
        let dense = mcl.clusters(&build(&sim, Representation::Matrix).unwrap()).unwrap();
        let sparse = mcl
            .clusters(&build(&sim, Representation::AdjacencyList).unwrap())
            .unwrap();
        assert_eq!(dense, sparse);
    }

    #[test]
    fn test_adjacency_with_identical_documents() {
        use crate::graph::{build, Representation};

        let sim = array![[1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let mcl = MarkovClustering::new();
        let dense = mcl.clusters(&build(&sim, Representation::Matrix).unwrap()).unwrap();
        let sparse = mcl
            .clusters(&build(&sim, Representation::AdjacencyList).unwrap())
            .unwrap();
        assert_eq!(dense, vec![vec![0, 1], vec![2]]);
        assert_eq!(sparse, dense);
    }

    #[test]
    fn test_output_matrix_stays_column_stochastic() {
        let sim = array![
            [1.0, 0.9, 0.00002, 0.0],
            [0.9, 1.0, 0.0, 0.3],
            [0.00002, 0.0, 1.0, 0.8],
            [0.0, 0.3, 0.8, 1.0],
        ];
        let out = MarkovClustering::new()
            .with_prune_threshold(1e-3)
            .fit(&sim)
            .unwrap();
        for sum in column_sums(&out.matrix) {
            assert!(sum == 0.0 || (sum - 1.0).abs() < 1e-9, "column sum {sum}");
        }
    }
}
