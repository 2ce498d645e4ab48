//! Graph clustering of document similarity graphs.
//!
//! Given a weighted similarity graph, find groups of documents that are
//! densely connected to each other and sparsely connected to the rest.
//!
//! ## Markov Clustering
//!
//! MCL ([van Dongen 2000](https://micans.org/mcl/)) treats the graph as a
//! Markov chain. Random walks started inside a dense region tend to stay
//! there, so repeatedly taking walk steps (**expansion**) and exaggerating
//! the strongest transitions (**inflation**) splits the chain into nearly
//! independent blocks:
//!
//! ```text
//! normalize → [expand → inflate → prune → compare]* → attractors → clusters
//! ```
//!
//! MCL needs no cluster count up front. Granularity is governed by the
//! inflation power: higher values yield more, smaller clusters.
//!
//! ## Usage
//!
//! ```rust
//! use ndarray::array;
//! use topicflow::community::MarkovClustering;
//!
//! let sim = array![
//!     [1.0, 1.0, 0.0],
//!     [1.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0],
//! ];
//! let out = MarkovClustering::new().fit(&sim).unwrap();
//! assert_eq!(out.clusters, vec![vec![0, 1], vec![2]]);
//! ```

pub mod mcl;
mod traits;

pub use mcl::{MarkovClustering, MclOutput};
pub use traits::GraphClustering;
