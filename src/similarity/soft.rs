//! Soft cosine similarity over a semantic feature-score matrix.
//!
//! # Feature Scores
//!
//! For a vocabulary of size V the engine builds a V×V matrix:
//!
//! ```text
//! S[i][j] = 1                      if term_i == term_j
//!         = score(term_i, term_j)  if that score > threshold
//!         = 0                      otherwise
//! ```
//!
//! `S` depends only on the vocabulary and the term cache, so it is built once
//! per vocabulary and shared by every document comparison.
//!
//! # Cost
//!
//! Building `S` is O(V²) term scores; each document pair then costs O(V²)
//! for the bilinear forms. For N documents the pair cache cuts evaluations
//! from N² to N(N-1)/2.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use ndarray::{Array2, ArrayView1};
use tracing::debug;

use super::{pairwise_scores, Similarity};
use crate::error::{Error, Result};
use crate::lexicon::{LexicalOracle, TermSimilarity};
use crate::matrix::{DocumentTermMatrix, Vocabulary};

/// Default minimum term similarity kept in the feature-score matrix.
pub const DEFAULT_FEATURE_THRESHOLD: f64 = 0.5;

/// Memo of document-pair scores keyed by unordered index pair.
#[derive(Debug, Clone, Default)]
pub struct PairCache {
    scores: HashMap<(usize, usize), f64>,
    evaluations: usize,
}

impl PairCache {
    fn key(i: usize, j: usize) -> (usize, usize) {
        if i <= j {
            (i, j)
        } else {
            (j, i)
        }
    }

    /// Cached score of `{i, j}`, computing it with `f` on first access.
    pub fn get_or_compute(&mut self, i: usize, j: usize, f: impl FnOnce() -> f64) -> f64 {
        match self.scores.entry(Self::key(i, j)) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                self.evaluations += 1;
                *e.insert(f())
            }
        }
    }

    /// Record an externally computed score for `{i, j}`.
    pub fn insert(&mut self, i: usize, j: usize, score: f64) {
        if let Entry::Vacant(e) = self.scores.entry(Self::key(i, j)) {
            self.evaluations += 1;
            let _ = e.insert(score);
        }
    }

    /// Cached score of `{i, j}`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.scores.get(&Self::key(i, j)).copied()
    }

    /// Number of evaluations performed.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Number of cached pairs.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Soft cosine kernel for one vocabulary.
///
/// Cheap to clone: the feature-score matrix is shared.
#[derive(Debug, Clone)]
pub struct SoftCosine {
    scores: Arc<Array2<f64>>,
}

impl SoftCosine {
    /// Kernel over a precomputed feature-score matrix.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidShape`] if `scores` is not square.
    pub fn from_scores(scores: Array2<f64>) -> Result<Self> {
        let (r, c) = scores.dim();
        if r != c {
            return Err(Error::shape("square feature scores", format!("{r} x {c}")));
        }
        Ok(Self {
            scores: Arc::new(scores),
        })
    }

    /// The V×V feature-score matrix.
    pub fn feature_scores(&self) -> &Array2<f64> {
        &self.scores
    }

    /// Vocabulary size this kernel expects.
    pub fn n_terms(&self) -> usize {
        self.scores.nrows()
    }

    fn bilinear(&self, a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
        a.dot(&self.scores.dot(b))
    }
}

impl Similarity for SoftCosine {
    /// Panics if a length differs from [`Similarity::dim`]. The pairwise
    /// builder and the scorer check lengths first.
    fn similarity(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        debug_assert_eq!(a.len(), self.n_terms());
        debug_assert_eq!(b.len(), self.n_terms());
        let denom_a = self.bilinear(&a, &a).sqrt();
        let denom_b = self.bilinear(&b, &b).sqrt();
        // NaN (negative self-product) fails the comparison too
        if !(denom_a > 0.0 && denom_b > 0.0) {
            return 0.0;
        }
        (self.bilinear(&a, &b) / (denom_a * denom_b)).clamp(0.0, 1.0)
    }

    fn dim(&self) -> Option<usize> {
        Some(self.n_terms())
    }
}

/// Soft similarity engine: owns the term caches and memoizes the
/// feature-score matrix of the last vocabulary it saw.
#[derive(Debug)]
pub struct SoftSimilarity<O> {
    terms: TermSimilarity<O>,
    threshold: f64,
    memo: Option<(Vec<String>, SoftCosine)>,
}

impl<O: LexicalOracle> SoftSimilarity<O> {
    /// Engine over a fresh term cache.
    pub fn new(oracle: O) -> Self {
        Self::with_terms(TermSimilarity::new(oracle))
    }

    /// Engine over an existing term cache.
    pub fn with_terms(terms: TermSimilarity<O>) -> Self {
        Self {
            terms,
            threshold: DEFAULT_FEATURE_THRESHOLD,
            memo: None,
        }
    }

    /// Set the feature-score threshold. Term scores at or below it become 0.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self.memo = None;
        self
    }

    /// Feature-score threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The term cache.
    pub fn terms(&self) -> &TermSimilarity<O> {
        &self.terms
    }

    /// Drop the term caches and the memoized feature scores.
    pub fn clear_caches(&mut self) {
        self.terms.clear();
        self.memo = None;
    }

    /// Soft cosine kernel for `vocabulary`, reusing the memoized feature
    /// scores when the vocabulary is unchanged.
    pub fn kernel(&mut self, vocabulary: &Vocabulary) -> Result<SoftCosine> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidParameter {
                name: "feature_threshold",
                message: "must be in [0, 1]",
            });
        }
        if let Some((terms, kernel)) = &self.memo {
            if terms.as_slice() == vocabulary.as_slice() {
                return Ok(kernel.clone());
            }
        }

        let kernel = SoftCosine::from_scores(self.feature_scores(vocabulary))?;
        self.memo = Some((vocabulary.as_slice().to_vec(), kernel.clone()));
        Ok(kernel)
    }

    fn feature_scores(&mut self, vocabulary: &Vocabulary) -> Array2<f64> {
        let v = vocabulary.len();
        let terms = vocabulary.as_slice();
        let mut scores = Array2::zeros((v, v));
        let mut kept = 0usize;
        for i in 0..v {
            scores[[i, i]] = 1.0;
            for j in i + 1..v {
                let s = self.terms.score(&terms[i], &terms[j]);
                if s > self.threshold {
                    scores[[i, j]] = s;
                    scores[[j, i]] = s;
                    kept += 1;
                }
            }
        }
        debug!(
            terms = v,
            related_pairs = kept,
            cached_pairs = self.terms.cached_pairs(),
            "feature scores built"
        );
        scores
    }

    /// Soft cosine similarity of two document vectors over `vocabulary`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidShape`] if a vector length differs from the vocabulary size.
    pub fn similarity(
        &mut self,
        a: ArrayView1<'_, f64>,
        b: ArrayView1<'_, f64>,
        vocabulary: &Vocabulary,
    ) -> Result<f64> {
        for len in [a.len(), b.len()] {
            if len != vocabulary.len() {
                return Err(Error::shape(
                    format!("vectors of length {}", vocabulary.len()),
                    format!("length {len}"),
                ));
            }
        }
        Ok(self.kernel(vocabulary)?.similarity(a, b))
    }

    /// Symmetric N×N soft cosine matrix of a collection, unit diagonal.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the collection has no documents.
    pub fn similarity_matrix(&mut self, collection: &DocumentTermMatrix) -> Result<Array2<f64>> {
        if collection.is_empty() {
            return Err(Error::EmptyCollection);
        }
        let kernel = self.kernel(collection.vocabulary())?;
        let scores = pairwise_scores(&kernel, collection.vectors())?;
        debug!(
            documents = collection.n_documents(),
            evaluations = scores.evaluations,
            "similarity matrix built"
        );
        Ok(scores.matrix)
    }
}
