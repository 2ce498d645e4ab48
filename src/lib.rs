//! # topicflow
//!
//! Emergent topic detection for batches of short documents (tweets, headlines).
//!
//! Documents are compared with a **soft cosine** similarity that knows which
//! vocabulary terms mean similar things, grouped with **Markov Clustering**
//! on the resulting similarity graph, and ranked by a score that balances
//! cluster cohesion against cluster size.
//!
//! Tokenization, vectorization, and the lexical database are supplied by the
//! caller: the crate consumes a [`DocumentTermMatrix`] and a [`LexicalOracle`].
//!
//! ```rust
//! use topicflow::{DocumentTermMatrix, StaticLexicon, TopicDetector, Vocabulary};
//!
//! let vocab = Vocabulary::new(["rain", "storm", "cat", "kitten"]).unwrap();
//! let matrix = DocumentTermMatrix::from_rows(
//!     &[
//!         vec![1.0, 1.0, 0.0, 0.0],
//!         vec![1.0, 1.0, 0.0, 0.0],
//!         vec![0.0, 0.0, 1.0, 1.0],
//!         vec![0.0, 0.0, 1.0, 1.0],
//!     ],
//!     vocab,
//! )
//! .unwrap();
//! let tokens = vec![
//!     vec!["rain", "storm"],
//!     vec!["storm", "rain"],
//!     vec!["cat", "kitten"],
//!     vec!["kitten", "cat"],
//! ];
//!
//! let mut detector = TopicDetector::new(StaticLexicon::new());
//! let topics = detector.detect(&matrix, &tokens).unwrap();
//! assert_eq!(topics.len(), 2);
//! ```

#![forbid(unsafe_code)]

pub mod community;
/// Error types used across `topicflow`.
pub mod error;
pub mod graph;
pub mod lexicon;
pub mod matrix;
pub mod scoring;
pub mod similarity;
pub mod topics;

pub use community::{GraphClustering, MarkovClustering, MclOutput};
pub use error::{Error, Result};
pub use graph::{Representation, SimilarityGraph};
pub use lexicon::{LexicalOracle, PartOfSpeech, Sense, StaticLexicon, TermSimilarity};
pub use matrix::{DocumentTermMatrix, DocumentVectors, Orientation, Vocabulary};
pub use scoring::{max_score, top_k, ClusterScore, ClusterScorer};
pub use similarity::{
    pairwise_scores, Cosine, MaybeSync, Similarity, SoftCosine, SoftSimilarity,
};
pub use topics::{top_terms, DetectorConfig, Kernel, ScoringSpace, Topic, TopicDetector};
