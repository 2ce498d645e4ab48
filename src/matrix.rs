//! Document-term matrices and their feature vocabulary.
//!
//! The similarity and scoring stages never index the raw weight array
//! directly. They go through [`DocumentVectors::document`], which hides
//! whether documents are stored as rows or as columns.
//!
//! ```text
//!              term 0  term 1  term 2
//! document 0 [  0.7     0.0     0.3  ]
//! document 1 [  0.0     1.0     0.0  ]
//! ```

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Error, Result};

/// Which axis of the weight array holds documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// One document per row, one term per column.
    #[default]
    DocumentsAsRows,
    /// One document per column, one term per row.
    DocumentsAsColumns,
}

impl Orientation {
    fn document_axis(self) -> Axis {
        match self {
            Orientation::DocumentsAsRows => Axis(0),
            Orientation::DocumentsAsColumns => Axis(1),
        }
    }

    fn term_axis(self) -> Axis {
        match self {
            Orientation::DocumentsAsRows => Axis(1),
            Orientation::DocumentsAsColumns => Axis(0),
        }
    }
}

/// Ordered feature vocabulary, one term per matrix feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from terms in feature order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if a term appears twice, since
    /// term-to-index lookup would then be ambiguous.
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(terms.len());
        for (i, term) in terms.iter().enumerate() {
            if index.insert(term.clone(), i).is_some() {
                return Err(Error::InvalidParameter {
                    name: "vocabulary",
                    message: "terms must be unique",
                });
            }
        }
        Ok(Self { terms, index })
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Term at feature index `i`.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.terms.get(i).map(String::as_str)
    }

    /// Feature index of `term`.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Terms in feature order.
    pub fn as_slice(&self) -> &[String] {
        &self.terms
    }

    /// Iterate over terms in feature order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

/// Read-only view of document vectors with an explicit orientation.
#[derive(Debug, Clone, Copy)]
pub struct DocumentVectors<'a> {
    weights: ArrayView2<'a, f64>,
    orientation: Orientation,
}

impl<'a> DocumentVectors<'a> {
    /// Wrap an array view.
    pub fn new(weights: ArrayView2<'a, f64>, orientation: Orientation) -> Self {
        Self {
            weights,
            orientation,
        }
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.weights.len_of(self.orientation.document_axis())
    }

    /// True if there are no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of every document vector.
    pub fn dim(&self) -> usize {
        self.weights.len_of(self.orientation.term_axis())
    }

    /// Vector for document `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn document(&self, i: usize) -> ArrayView1<'a, f64> {
        self.weights.index_axis_move(self.orientation.document_axis(), i)
    }
}

/// Document-term weight matrix paired with its vocabulary.
///
/// Document indices are stable identifiers for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct DocumentTermMatrix {
    weights: Array2<f64>,
    vocabulary: Vocabulary,
    orientation: Orientation,
}

impl DocumentTermMatrix {
    /// Wrap a weight array with documents as rows.
    pub fn new(weights: Array2<f64>, vocabulary: Vocabulary) -> Result<Self> {
        Self::with_orientation(weights, vocabulary, Orientation::DocumentsAsRows)
    }

    /// Wrap a weight array with an explicit orientation.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidShape`] if the term axis length differs from the vocabulary size.
    pub fn with_orientation(
        weights: Array2<f64>,
        vocabulary: Vocabulary,
        orientation: Orientation,
    ) -> Result<Self> {
        let n_terms = weights.len_of(orientation.term_axis());
        if n_terms != vocabulary.len() {
            return Err(Error::shape(
                format!("{} terms", vocabulary.len()),
                format!("{n_terms} terms"),
            ));
        }
        Ok(Self {
            weights,
            vocabulary,
            orientation,
        })
    }

    /// Build from dense rows, one per document.
    pub fn from_rows(rows: &[Vec<f64>], vocabulary: Vocabulary) -> Result<Self> {
        let d = vocabulary.len();
        let mut flat = Vec::with_capacity(rows.len() * d);
        for row in rows {
            if row.len() != d {
                return Err(Error::shape(
                    format!("rows of length {d}"),
                    format!("row of length {}", row.len()),
                ));
            }
            flat.extend_from_slice(row);
        }
        let weights = Array2::from_shape_vec((rows.len(), d), flat)
            .map_err(|e| Error::shape(format!("{} x {d}", rows.len()), e.to_string()))?;
        Self::new(weights, vocabulary)
    }

    /// Build from sparse `(document, term, weight)` entries.
    ///
    /// Repeated coordinates accumulate.
    pub fn from_triplets<I>(n_documents: usize, vocabulary: Vocabulary, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut weights = Array2::zeros((n_documents, vocabulary.len()));
        for (doc, term, w) in entries {
            if doc >= n_documents || term >= vocabulary.len() {
                return Err(Error::shape(
                    format!("index within {n_documents} x {}", vocabulary.len()),
                    format!("({doc}, {term})"),
                ));
            }
            weights[[doc, term]] += w;
        }
        Self::new(weights, vocabulary)
    }

    /// Number of documents.
    pub fn n_documents(&self) -> usize {
        self.vectors().len()
    }

    /// Number of vocabulary terms.
    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }

    /// True if the collection has no documents.
    pub fn is_empty(&self) -> bool {
        self.n_documents() == 0
    }

    /// Feature vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Storage orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Orientation-aware view of the document vectors.
    pub fn vectors(&self) -> DocumentVectors<'_> {
        DocumentVectors::new(self.weights.view(), self.orientation)
    }

    /// Vector for document `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.n_documents()`.
    pub fn document(&self, i: usize) -> ArrayView1<'_, f64> {
        self.vectors().document(i)
    }
}
