//! Document similarity measures.
//!
//! ## Cosine vs Soft Cosine
//!
//! Plain cosine treats every vocabulary term as orthogonal to every other:
//! a tweet about "dogs" and one about "puppies" share nothing.
//!
//! ```text
//! cos(a, b) = a·b / (‖a‖ ‖b‖)
//! ```
//!
//! **Soft cosine** routes the inner product through a feature-similarity
//! matrix `S`, where `S[i][j]` is the semantic similarity of terms `i` and `j`:
//!
//! ```text
//! soft(a, b) = aᵀSb / (√(aᵀSa) × √(bᵀSb))
//! ```
//!
//! With `S = I` the two measures coincide.
//!
//! Both implement [`Similarity`], so the cluster scorer accepts either.

pub mod soft;

use ndarray::{Array2, ArrayView1};

use crate::error::{Error, Result};
use crate::matrix::DocumentVectors;

pub use soft::{PairCache, SoftCosine, SoftSimilarity, DEFAULT_FEATURE_THRESHOLD};

/// A symmetric similarity between two equal-length vectors, in [0, 1].
pub trait Similarity {
    /// Similarity of `a` and `b`.
    fn similarity(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64;

    /// Vector length this measure requires, if it is fixed.
    fn dim(&self) -> Option<usize> {
        None
    }
}

impl<S: Similarity + ?Sized> Similarity for &S {
    fn similarity(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        (**self).similarity(a, b)
    }

    fn dim(&self) -> Option<usize> {
        (**self).dim()
    }
}

/// `Sync` when the `parallel` feature is on, no bound otherwise.
#[cfg(feature = "parallel")]
pub trait MaybeSync: Sync {}
#[cfg(feature = "parallel")]
impl<T: Sync + ?Sized> MaybeSync for T {}

/// `Sync` when the `parallel` feature is on, no bound otherwise.
#[cfg(not(feature = "parallel"))]
pub trait MaybeSync {}
#[cfg(not(feature = "parallel"))]
impl<T: ?Sized> MaybeSync for T {}

/// Reject documents whose length differs from what `similarity` requires.
pub(crate) fn check_dim<S>(similarity: &S, documents: DocumentVectors<'_>) -> Result<()>
where
    S: Similarity + ?Sized,
{
    match similarity.dim() {
        Some(d) if d != documents.dim() => Err(Error::shape(
            format!("documents of length {d}"),
            format!("length {}", documents.dim()),
        )),
        _ => Ok(()),
    }
}

/// Plain cosine similarity. Zero vectors score 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl Similarity for Cosine {
    fn similarity(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        let na = a.dot(&a).sqrt();
        let nb = b.dot(&b).sqrt();
        if na == 0.0 || nb == 0.0 {
            return 0.0;
        }
        (a.dot(&b) / (na * nb)).clamp(0.0, 1.0)
    }
}

/// Pairwise similarity matrix and how many pairs were actually evaluated.
#[derive(Debug, Clone)]
pub struct PairwiseScores {
    /// Symmetric N×N scores with a unit diagonal.
    pub matrix: Array2<f64>,
    /// Number of similarity evaluations performed.
    pub evaluations: usize,
}

/// Build the N×N similarity matrix of a document collection.
///
/// The diagonal is set to 1 without evaluation. Each unordered off-diagonal
/// pair is evaluated once through a [`PairCache`] and written to both cells.
///
/// # Errors
///
/// - [`Error::EmptyCollection`] if there are no documents
/// - [`Error::InvalidShape`] if the document length differs from [`Similarity::dim`]
pub fn pairwise_scores<S>(similarity: &S, documents: DocumentVectors<'_>) -> Result<PairwiseScores>
where
    S: Similarity + MaybeSync + ?Sized,
{
    let n = documents.len();
    if n == 0 {
        return Err(Error::EmptyCollection);
    }
    check_dim(similarity, documents)?;

    let mut cache = PairCache::default();

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        let scores: Vec<f64> = pairs
            .par_iter()
            .map(|&(i, j)| similarity.similarity(documents.document(i), documents.document(j)))
            .collect();
        for ((i, j), s) in pairs.into_iter().zip(scores) {
            cache.insert(i, j, s);
        }
    }

    let mut matrix = Array2::zeros((n, n));
    for i in 0..n {
        matrix[[i, i]] = 1.0;
        for j in 0..n {
            if i == j {
                continue;
            }
            matrix[[i, j]] = cache.get_or_compute(i, j, || {
                similarity.similarity(documents.document(i), documents.document(j))
            });
        }
    }

    Ok(PairwiseScores {
        matrix,
        evaluations: cache.evaluations(),
    })
}
