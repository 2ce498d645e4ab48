//! Cluster scoring and ranking.
//!
//! Ranks clusters as candidate emerging topics, following Manaskasemsak et
//! al. (2016), "Graph Clustering-Based Emerging Event Detection From Twitter
//! Data Stream".
//!
//! # Measures
//!
//! | Measure | Formula | Meaning |
//! |---------|---------|---------|
//! | [`relatedness`] | mean_i sim(centroid, d_i) | How tightly members agree |
//! | [`event_size`] | \|C\| / Σ\|C_k\| | Share of total cluster membership |
//! | [`f_measure`] | 2·r·e / (r + e) | Harmonic blend of the two |
//!
//! The harmonic blend punishes clusters that are strong in only one
//! dimension: a huge incoherent cluster and a tiny perfect one both score low.
//!
//! Clusters may overlap, so Σ\|C_k\| can exceed the document count. This is
//! accepted as is.
//!
//! # Example
//!
//! ```rust
//! use topicflow::scoring::{f_measure, max_score, top_k};
//!
//! assert_eq!(f_measure(0.0, 0.0), 0.0);
//! assert!((f_measure(1.0, 0.5) - 2.0 / 3.0).abs() < 1e-12);
//!
//! let scores = [0.2, 0.9, 0.4, 0.9];
//! assert_eq!(max_score(&scores), vec![1, 3]);
//! assert_eq!(top_k(&scores, 2), vec![(1, 0.9), (3, 0.9)]);
//! ```

use ndarray::Array1;
use tracing::debug;

use crate::error::{Error, Result};
use crate::matrix::DocumentVectors;
use crate::similarity::{check_dim, Similarity};

/// Default minimum score for a cluster to be reported.
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.03;

/// Score breakdown of one cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterScore {
    /// Position of the cluster in the scored list.
    pub cluster: usize,
    /// Mean member-to-centroid similarity.
    pub relatedness: f64,
    /// Relative share of total cluster membership.
    pub event_size: f64,
    /// Combined ranking score.
    pub score: f64,
}

/// Scores clusters and drops those below an acceptance threshold.
#[derive(Debug, Clone)]
pub struct ClusterScorer {
    threshold: f64,
}

impl ClusterScorer {
    /// Create a scorer with the default acceptance threshold.
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }

    /// Set the acceptance threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Acceptance threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score every cluster without filtering.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] if `documents` is empty
    /// - [`Error::InvalidShape`] if a member index is out of range, or the
    ///   document length differs from [`Similarity::dim`]
    pub fn score_all<S>(
        &self,
        similarity: &S,
        documents: DocumentVectors<'_>,
        clusters: &[Vec<usize>],
    ) -> Result<Vec<ClusterScore>>
    where
        S: Similarity + ?Sized,
    {
        if documents.is_empty() {
            return Err(Error::EmptyCollection);
        }
        check_dim(similarity, documents)?;
        let n = documents.len();
        if let Some(&bad) = clusters.iter().flatten().find(|&&i| i >= n) {
            return Err(Error::shape(
                format!("member index below {n}"),
                format!("index {bad}"),
            ));
        }

        let total: usize = clusters.iter().map(Vec::len).sum();
        Ok(clusters
            .iter()
            .enumerate()
            .map(|(cluster, members)| {
                let relatedness = relatedness(similarity, documents, members);
                let event_size = event_size(members.len(), total);
                ClusterScore {
                    cluster,
                    relatedness,
                    event_size,
                    score: f_measure(relatedness, event_size),
                }
            })
            .collect())
    }

    /// Score every cluster and keep those at or above the threshold.
    pub fn score<S>(
        &self,
        similarity: &S,
        documents: DocumentVectors<'_>,
        clusters: &[Vec<usize>],
    ) -> Result<Vec<ClusterScore>>
    where
        S: Similarity + ?Sized,
    {
        if !(self.threshold.is_finite() && self.threshold >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "acceptance_threshold",
                message: "must be finite and non-negative",
            });
        }
        let all = self.score_all(similarity, documents, clusters)?;
        let before = all.len();
        let kept: Vec<ClusterScore> = all
            .into_iter()
            .filter(|s| s.score >= self.threshold)
            .collect();
        debug!(
            clusters = before,
            kept = kept.len(),
            threshold = self.threshold,
            "clusters scored"
        );
        Ok(kept)
    }
}

impl Default for ClusterScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Element-wise mean of the member vectors. Zeros for an empty cluster.
pub fn centroid(documents: DocumentVectors<'_>, members: &[usize]) -> Array1<f64> {
    let mut sum = Array1::zeros(documents.dim());
    if members.is_empty() {
        return sum;
    }
    for &i in members {
        sum += &documents.document(i);
    }
    sum / members.len() as f64
}

/// Mean similarity of each member to the cluster centroid. 0 for an empty cluster.
pub fn relatedness<S>(similarity: &S, documents: DocumentVectors<'_>, members: &[usize]) -> f64
where
    S: Similarity + ?Sized,
{
    if members.is_empty() {
        return 0.0;
    }
    let c = centroid(documents, members);
    let total: f64 = members
        .iter()
        .map(|&i| similarity.similarity(c.view(), documents.document(i)))
        .sum();
    total / members.len() as f64
}

/// `size / total`, or 0 when `total` is 0.
pub fn event_size(size: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        size as f64 / total as f64
    }
}

/// `2·r·e / (r + e)`, or 0 when both are 0.
pub fn f_measure(relatedness: f64, event_size: f64) -> f64 {
    let sum = relatedness + event_size;
    if sum <= 0.0 {
        return 0.0;
    }
    2.0 * relatedness * event_size / sum
}

/// Indices of every score equal to the maximum. Empty for empty input.
pub fn max_score(scores: &[f64]) -> Vec<usize> {
    let Some(best) = scores.iter().copied().max_by(f64::total_cmp) else {
        return Vec::new();
    };
    scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s == best)
        .map(|(i, _)| i)
        .collect()
}

/// The `k` highest `(index, score)` pairs, descending. Ties keep index order.
pub fn top_k(scores: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}
