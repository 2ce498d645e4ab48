//! Similarity matrix to graph adapters.
//!
//! A similarity matrix already is a dense weighted adjacency matrix:
//! `matrix[i][j]` is the edge weight between documents `i` and `j`, and 0
//! means no edge. [`Representation::Matrix`] hands it over unchanged.
//! [`Representation::AdjacencyList`] produces a `petgraph` undirected graph
//! for algorithms that walk neighbors.
//!
//! ```rust
//! use ndarray::array;
//! use topicflow::graph::{build, Representation};
//!
//! let sim = array![[1.0, 0.4, 0.0], [0.4, 1.0, 0.2], [0.0, 0.2, 1.0]];
//! let graph = build(&sim, Representation::AdjacencyList).unwrap();
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.weight(0, 1), 0.4);
//! assert_eq!(graph.weight(0, 2), 0.0);
//! ```

use core::fmt;
use core::str::FromStr;

use ndarray::Array2;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::error::{Error, Result};

/// Graph representation produced by [`build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Representation {
    /// The dense similarity matrix itself.
    #[default]
    Matrix,
    /// Undirected weighted adjacency list.
    AdjacencyList,
}

impl FromStr for Representation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matrix" => Ok(Representation::Matrix),
            "adjacency-list" | "adjacency_list" | "dict" => Ok(Representation::AdjacencyList),
            _ => Err(Error::UnsupportedRepresentation(s.to_owned())),
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::Matrix => f.write_str("matrix"),
            Representation::AdjacencyList => f.write_str("adjacency-list"),
        }
    }
}

/// A document similarity graph in one of the supported representations.
#[derive(Debug, Clone)]
pub enum SimilarityGraph {
    /// Dense weighted adjacency matrix.
    Matrix(Array2<f64>),
    /// Undirected weighted adjacency list.
    AdjacencyList {
        /// Node weights are document indices; edge weights are similarities.
        graph: UnGraph<usize, f64>,
        /// The matrix the list was built from. Unit-weight pairs exist only here.
        dense: Array2<f64>,
    },
}

impl SimilarityGraph {
    /// Number of documents.
    pub fn node_count(&self) -> usize {
        match self {
            SimilarityGraph::Matrix(m) => m.nrows(),
            SimilarityGraph::AdjacencyList { graph, .. } => graph.node_count(),
        }
    }

    /// Edge weight between documents `i` and `j` (0 if absent).
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        match self {
            SimilarityGraph::Matrix(m) => m.get((i, j)).copied().unwrap_or(0.0),
            SimilarityGraph::AdjacencyList { graph, .. } => graph
                .find_edge(NodeIndex::new(i), NodeIndex::new(j))
                .and_then(|e| graph.edge_weight(e))
                .copied()
                .unwrap_or(0.0),
        }
    }

    /// The full similarity matrix, whichever representation holds it.
    ///
    /// Clustering reads this, so both representations cluster identically.
    pub fn dense(&self) -> &Array2<f64> {
        match self {
            SimilarityGraph::Matrix(m) | SimilarityGraph::AdjacencyList { dense: m, .. } => m,
        }
    }

    /// Owned copy of [`dense`](Self::dense).
    pub fn to_matrix(&self) -> Array2<f64> {
        self.dense().clone()
    }
}

/// Build a graph from a square similarity matrix.
///
/// The adjacency list holds one undirected edge per off-diagonal pair whose
/// weight is neither 0 nor exactly 1. Self-loops never appear. The source
/// matrix is kept beside it, so unit-weight pairs stay visible to clustering.
///
/// # Errors
///
/// [`Error::InvalidShape`] if `matrix` is not square.
pub fn build(matrix: &Array2<f64>, representation: Representation) -> Result<SimilarityGraph> {
    let (r, c) = matrix.dim();
    if r != c {
        return Err(Error::shape("square matrix", format!("{r} x {c}")));
    }

    match representation {
        Representation::Matrix => Ok(SimilarityGraph::Matrix(matrix.clone())),
        Representation::AdjacencyList => {
            let mut graph = UnGraph::<usize, f64>::with_capacity(r, r);
            let nodes: Vec<_> = (0..r).map(|i| graph.add_node(i)).collect();
            for i in 0..r {
                for j in i + 1..r {
                    let w = matrix[[i, j]];
                    if w != 0.0 && w != 1.0 {
                        let _ = graph.add_edge(nodes[i], nodes[j], w);
                    }
                }
            }
            Ok(SimilarityGraph::AdjacencyList {
                graph,
                dense: matrix.clone(),
            })
        }
    }
}

/// Build a graph from a representation name such as `"matrix"` or
/// `"adjacency-list"`.
///
/// # Errors
///
/// [`Error::UnsupportedRepresentation`] for unknown names.
pub fn build_named(matrix: &Array2<f64>, representation: &str) -> Result<SimilarityGraph> {
    build(matrix, representation.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use petgraph::visit::EdgeRef;

    #[test]
    fn test_matrix_representation_is_identity() {
        let sim = array![[1.0, 0.3], [0.3, 1.0]];
        match build(&sim, Representation::Matrix).unwrap() {
            SimilarityGraph::Matrix(m) => assert_eq!(m, sim),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_adjacency_skips_zero_unit_and_diagonal() {
        let sim = array![
            [1.0, 0.5, 0.0, 1.0],
            [0.5, 1.0, 0.2, 0.0],
            [0.0, 0.2, 1.0, 0.0],
            [1.0, 0.0, 0.0, 1.0],
        ];
        let graph = build(&sim, Representation::AdjacencyList).unwrap();
        let SimilarityGraph::AdjacencyList { graph: g, .. } = &graph else {
            panic!("expected adjacency list");
        };

        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 2);
        for edge in g.edge_references() {
            assert_ne!(edge.source(), edge.target());
        }
        // undirected: both directions resolve
        assert_eq!(graph.weight(1, 2), 0.2);
        assert_eq!(graph.weight(2, 1), 0.2);
        assert_eq!(graph.weight(0, 3), 0.0);
    }

    #[test]
    fn test_adjacency_to_matrix_restores_weights() {
        let sim = array![[1.0, 0.5, 0.0], [0.5, 1.0, 0.2], [0.0, 0.2, 1.0]];
        let graph = build(&sim, Representation::AdjacencyList).unwrap();
        assert_eq!(graph.to_matrix(), sim);
    }

    #[test]
    fn test_adjacency_keeps_unit_weights_in_dense_view() {
        // documents 0 and 1 are identical
        let sim = array![[1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let graph = build(&sim, Representation::AdjacencyList).unwrap();
        assert_eq!(graph.weight(0, 1), 0.0);
        assert_eq!(graph.dense(), &sim);
        assert_eq!(graph.to_matrix(), sim);
    }

    #[test]
    fn test_named_representations() {
        let sim = array![[1.0]];
        assert!(build_named(&sim, "matrix").is_ok());
        assert!(build_named(&sim, "Adjacency-List").is_ok());
        assert!(build_named(&sim, "dict").is_ok());
        assert_eq!(
            build_named(&sim, "edge-list").unwrap_err(),
            Error::UnsupportedRepresentation("edge-list".into())
        );
    }

    #[test]
    fn test_non_square_is_invalid_shape() {
        let m = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            build(&m, Representation::Matrix),
            Err(Error::InvalidShape { .. })
        ));
    }
}
