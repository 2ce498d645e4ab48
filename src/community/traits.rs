//! Graph clustering traits.

use crate::error::Result;
use crate::graph::SimilarityGraph;

/// Trait for algorithms that group the nodes of a similarity graph.
pub trait GraphClustering {
    /// Detect clusters in a graph.
    ///
    /// Returns distinct clusters of node indices. Clusters may overlap and
    /// need not cover every node.
    fn clusters(&self, graph: &SimilarityGraph) -> Result<Vec<Vec<usize>>>;
}
