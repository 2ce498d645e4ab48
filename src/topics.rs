//! End-to-end topic detection over one document batch.
//!
//! ```text
//! document-term matrix
//!     → soft cosine similarity matrix   (similarity::soft)
//!     → similarity graph                (graph)
//!     → Markov clustering               (community::mcl)
//!     → scored, filtered, ranked topics (scoring)
//! ```
//!
//! The scorer always sees document vectors (or rows of the original
//! similarity matrix), never the converged MCL matrix: the latter holds
//! transition probabilities, not similarities.
//!
//! All caches live inside one [`TopicDetector`] and are cleared at the start
//! of every [`TopicDetector::detect`] call, so runs stay independent.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::community::MarkovClustering;
use crate::error::{Error, Result};
use crate::graph::{self, Representation};
use crate::lexicon::LexicalOracle;
use crate::matrix::{DocumentTermMatrix, DocumentVectors, Orientation};
use crate::scoring::{ClusterScore, ClusterScorer, DEFAULT_ACCEPTANCE_THRESHOLD};
use crate::similarity::{Cosine, SoftSimilarity, DEFAULT_FEATURE_THRESHOLD};

/// Similarity measure used when scoring clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Kernel {
    /// Soft cosine over the feature-score matrix.
    #[default]
    Soft,
    /// Plain cosine.
    Cosine,
}

/// Vectors the scorer compares against cluster centroids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ScoringSpace {
    /// Document-term vectors.
    #[default]
    Documents,
    /// Rows of the original similarity matrix. Requires [`Kernel::Cosine`].
    SimilarityRows,
}

/// Every tunable of a detection run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    /// Term similarities at or below this are dropped from the feature scores.
    pub feature_threshold: f64,
    /// MCL expansion power.
    pub expansion: u32,
    /// MCL inflation power.
    pub inflation: f64,
    /// MCL iteration cap.
    pub iterations: usize,
    /// MCL prune threshold; 0 disables pruning.
    pub prune_threshold: f64,
    /// Relative tolerance of the MCL convergence check.
    pub rtol: f64,
    /// Absolute tolerance of the MCL convergence check.
    pub atol: f64,
    /// Minimum score of a reported topic.
    pub acceptance_threshold: f64,
    /// Maximum number of top terms per topic.
    pub top_terms: usize,
    /// Similarity used for cluster relatedness.
    pub kernel: Kernel,
    /// Vectors used for cluster relatedness.
    pub scoring_space: ScoringSpace,
    /// Graph representation handed to the clustering engine.
    pub representation: Representation,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            feature_threshold: DEFAULT_FEATURE_THRESHOLD,
            expansion: 2,
            inflation: 2.0,
            iterations: 10,
            prune_threshold: 1e-4,
            rtol: 1e-5,
            atol: 1e-8,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            top_terms: 10,
            kernel: Kernel::Soft,
            scoring_space: ScoringSpace::Documents,
            representation: Representation::Matrix,
        }
    }
}

impl DetectorConfig {
    /// MCL runner with these settings.
    pub fn markov(&self) -> MarkovClustering {
        MarkovClustering::new()
            .with_expansion(self.expansion)
            .with_inflation(self.inflation)
            .with_max_iter(self.iterations)
            .with_prune_threshold(self.prune_threshold)
            .with_tolerance(self.rtol, self.atol)
    }

    /// Cluster scorer with these settings.
    pub fn scorer(&self) -> ClusterScorer {
        ClusterScorer::new().with_threshold(self.acceptance_threshold)
    }
}

/// One detected topic.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Topic {
    /// Member document indices, ascending.
    pub members: Vec<usize>,
    /// Ranking score.
    pub score: f64,
    /// Mean member-to-centroid similarity.
    pub relatedness: f64,
    /// Share of total cluster membership.
    pub event_size: f64,
    /// Most frequent tokens across members with their counts.
    pub top_terms: Vec<(String, usize)>,
}

/// Runs similarity, clustering, and scoring for one batch.
#[derive(Debug)]
pub struct TopicDetector<O> {
    config: DetectorConfig,
    engine: SoftSimilarity<O>,
}

impl<O: LexicalOracle> TopicDetector<O> {
    /// Detector with default configuration.
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, DetectorConfig::default())
    }

    /// Detector with explicit configuration.
    pub fn with_config(oracle: O, config: DetectorConfig) -> Self {
        let engine = SoftSimilarity::new(oracle).with_threshold(config.feature_threshold);
        Self { config, engine }
    }

    /// Active configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Similarity engine and the caches of the latest run.
    pub fn engine(&self) -> &SoftSimilarity<O> {
        &self.engine
    }

    /// Detect topics, ranked by descending score.
    ///
    /// `tokens[i]` is the token list of document `i`, used only for top terms.
    ///
    /// Term, sense, and feature-score caches are cleared first; nothing
    /// carries over from a previous call.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] for an empty batch
    /// - [`Error::InvalidShape`] if `tokens` and the matrix disagree on document count
    /// - [`Error::InvalidParameter`] for invalid settings
    pub fn detect<S: AsRef<str>>(
        &mut self,
        collection: &DocumentTermMatrix,
        tokens: &[Vec<S>],
    ) -> Result<Vec<Topic>> {
        if collection.is_empty() {
            return Err(Error::EmptyCollection);
        }
        if tokens.len() != collection.n_documents() {
            return Err(Error::shape(
                format!("{} token lists", collection.n_documents()),
                format!("{} token lists", tokens.len()),
            ));
        }
        if self.config.scoring_space == ScoringSpace::SimilarityRows
            && self.config.kernel == Kernel::Soft
        {
            return Err(Error::InvalidParameter {
                name: "scoring_space",
                message: "similarity rows can only be scored with the cosine kernel",
            });
        }

        self.engine.clear_caches();
        let kernel = self.engine.kernel(collection.vocabulary())?;
        let similarity = self.engine.similarity_matrix(collection)?;

        let graph = graph::build(&similarity, self.config.representation)?;
        let clustering = self.config.markov().fit_graph(&graph)?;

        let scorer = self.config.scorer();
        let clusters = &clustering.clusters;
        let scores: Vec<ClusterScore> = match (self.config.scoring_space, self.config.kernel) {
            (ScoringSpace::Documents, Kernel::Soft) => {
                scorer.score(&kernel, collection.vectors(), clusters)?
            }
            (ScoringSpace::Documents, Kernel::Cosine) => {
                scorer.score(&Cosine, collection.vectors(), clusters)?
            }
            (ScoringSpace::SimilarityRows, _) => {
                let rows = DocumentVectors::new(similarity.view(), Orientation::DocumentsAsRows);
                scorer.score(&Cosine, rows, clusters)?
            }
        };

        let mut topics: Vec<Topic> = scores
            .into_iter()
            .map(|s| {
                let members = clusters[s.cluster].clone();
                let top_terms = top_terms(tokens, &members, self.config.top_terms);
                Topic {
                    members,
                    score: s.score,
                    relatedness: s.relatedness,
                    event_size: s.event_size,
                    top_terms,
                }
            })
            .collect();
        topics.sort_by(|a, b| b.score.total_cmp(&a.score));

        if let Some(best) = topics.first() {
            debug!(members = ?best.members, score = best.score, "top topic");
        }
        info!(
            documents = collection.n_documents(),
            clusters = clusters.len(),
            topics = topics.len(),
            mcl_iterations = clustering.iterations,
            converged = clustering.converged,
            "topic detection finished"
        );
        Ok(topics)
    }
}

/// Most frequent tokens across the member documents, with counts.
///
/// Ties break alphabetically. Out-of-range members are skipped.
pub fn top_terms<S: AsRef<str>>(
    tokens: &[Vec<S>],
    members: &[usize],
    n: usize,
) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for doc in members.iter().filter_map(|&i| tokens.get(i)) {
        for token in doc {
            *counts.entry(token.as_ref()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(t, c)| (t.to_owned(), c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::StaticLexicon;
    use crate::matrix::Vocabulary;

    fn tokens(docs: &[&[&str]]) -> Vec<Vec<String>> {
        docs.iter()
            .map(|d| d.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_top_terms_counts_and_ties() {
        let toks = tokens(&[&["sun", "sky", "sun"], &["sky", "blue"], &["dog"]]);
        let top = top_terms(&toks, &[0, 1], 2);
        assert_eq!(top, vec![("sky".to_string(), 2), ("sun".to_string(), 2)]);
        assert_eq!(top_terms(&toks, &[2, 99], 5), vec![("dog".to_string(), 1)]);
    }

    #[test]
    fn test_token_count_mismatch() {
        let m = DocumentTermMatrix::from_rows(
            &[vec![1.0], vec![1.0]],
            Vocabulary::new(["sun"]).unwrap(),
        )
        .unwrap();
        let mut detector = TopicDetector::new(StaticLexicon::new());
        let err = detector.detect(&m, &tokens(&[&["sun"]])).unwrap_err();
        assert!(matches!(err, Error::InvalidShape { .. }));
    }

    #[test]
    fn test_soft_kernel_cannot_score_similarity_rows() {
        let m = DocumentTermMatrix::from_rows(&[vec![1.0]], Vocabulary::new(["sun"]).unwrap())
            .unwrap();
        let config = DetectorConfig {
            scoring_space: ScoringSpace::SimilarityRows,
            ..Default::default()
        };
        let mut detector = TopicDetector::with_config(StaticLexicon::new(), config);
        assert!(matches!(
            detector.detect(&m, &tokens(&[&["sun"]])),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_similarity_rows_with_cosine() {
        let m = DocumentTermMatrix::from_rows(
            &[
                vec![1.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.0, 1.0],
            ],
            Vocabulary::new(["rain", "cat"]).unwrap(),
        )
        .unwrap();
        let config = DetectorConfig {
            kernel: Kernel::Cosine,
            scoring_space: ScoringSpace::SimilarityRows,
            ..Default::default()
        };
        let mut detector = TopicDetector::with_config(StaticLexicon::new(), config);
        let toks = tokens(&[&["rain"], &["rain"], &["cat"], &["cat"]]);
        let topics = detector.detect(&m, &toks).unwrap();
        assert_eq!(topics.len(), 2);
        for t in &topics {
            assert!((t.relatedness - 1.0).abs() < 1e-9);
            assert!((t.event_size - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_caches_do_not_carry_over_between_runs() {
        use crate::lexicon::PartOfSpeech;

        let lexicon = StaticLexicon::new()
            .with_sense("animal.n.01", PartOfSpeech::Noun, None)
            .with_sense("cat.n.01", PartOfSpeech::Noun, Some("animal.n.01"))
            .with_sense("dog.n.01", PartOfSpeech::Noun, Some("animal.n.01"))
            .with_lemma("cat", &["cat.n.01"])
            .with_lemma("dog", &["dog.n.01"]);
        let m = DocumentTermMatrix::from_rows(
            &[vec![1.0, 0.0], vec![0.0, 1.0]],
            Vocabulary::new(["cat", "dog"]).unwrap(),
        )
        .unwrap();
        let toks = tokens(&[&["cat"], &["dog"]]);
        let mut detector = TopicDetector::new(lexicon);

        let first = detector.detect(&m, &toks).unwrap();
        let lookups = detector.engine().terms().sense_lookups();
        assert_eq!(lookups, 2);

        let second = detector.detect(&m, &toks).unwrap();
        assert_eq!(detector.engine().terms().sense_lookups(), lookups);
        assert_eq!(first, second);
    }

    #[test]
    fn test_config_builds_engines() {
        let config = DetectorConfig {
            iterations: 3,
            acceptance_threshold: 0.2,
            ..Default::default()
        };
        assert_eq!(config.markov().max_iter(), 3);
        assert_eq!(config.scorer().threshold(), 0.2);
    }
}
