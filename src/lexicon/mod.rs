//! Lexical oracle boundary and term-level semantic similarity.
//!
//! The soft cosine engine needs to know how related two vocabulary terms
//! are. That knowledge lives in an external lexical database (a WordNet-like
//! taxonomy of word senses). This module defines the narrow interface the
//! core consumes, [`LexicalOracle`], and a memoizing layer over it,
//! [`TermSimilarity`].
//!
//! ## Sense Resolution
//!
//! A term maps to zero or more senses. For a term pair, the sense pair with
//! the shortest taxonomy path wins:
//!
//! ```text
//! best = argmax_{s_a, s_b} 1 / (path_distance(s_a, s_b) + 1)
//! ```
//!
//! Relatedness is only meaningful between nouns and verbs, so a winning
//! adjective or adverb sense is swapped for its first derivationally related
//! noun. The final score is the oracle's Wu-Palmer relatedness:
//!
//! ```text
//! wup(a, b) = 2 × depth(lcs(a, b)) / (depth(a) + depth(b))
//! ```
//!
//! Every "no signal" outcome (unknown term, no noun form, undefined score)
//! degrades to a score of 0. None of them are errors.
//!
//! ## Usage
//!
//! ```rust
//! use topicflow::lexicon::{PartOfSpeech, StaticLexicon, TermSimilarity};
//!
//! let lexicon = StaticLexicon::new()
//!     .with_sense("entity.n.01", PartOfSpeech::Noun, None)
//!     .with_sense("animal.n.01", PartOfSpeech::Noun, Some("entity.n.01"))
//!     .with_sense("dog.n.01", PartOfSpeech::Noun, Some("animal.n.01"))
//!     .with_sense("cat.n.01", PartOfSpeech::Noun, Some("animal.n.01"))
//!     .with_lemma("dog", &["dog.n.01"])
//!     .with_lemma("cat", &["cat.n.01"]);
//!
//! let mut terms = TermSimilarity::new(lexicon);
//! assert_eq!(terms.score("dog", "dog"), 1.0);
//! assert!((terms.score("dog", "cat") - 2.0 / 3.0).abs() < 1e-12);
//! assert_eq!(terms.score("#dog", "cat"), 0.0);
//! ```

mod cache;
mod static_lexicon;

use core::fmt;

pub use cache::{is_lexical, TermSimilarity};
pub use static_lexicon::StaticLexicon;

/// Opaque identifier of a word sense (e.g. `"dog.n.01"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sense(String);

impl Sense {
    /// Create a sense identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Sense {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Part-of-speech tag of a sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    /// Noun.
    Noun,
    /// Verb.
    Verb,
    /// Adjective.
    Adjective,
    /// Satellite adjective.
    AdjectiveSatellite,
    /// Adverb.
    Adverb,
}

impl PartOfSpeech {
    /// Nouns and verbs carry taxonomy structure usable for relatedness.
    pub fn is_noun_or_verb(self) -> bool {
        matches!(self, PartOfSpeech::Noun | PartOfSpeech::Verb)
    }
}

/// Lookup service answering lexical questions about terms and senses.
///
/// `None` means "undefined" and is never an error.
pub trait LexicalOracle {
    /// Candidate senses of `term`, most common first. Empty if unknown.
    fn synsets_for(&self, term: &str) -> Vec<Sense>;

    /// Taxonomy path length between two senses.
    fn path_distance(&self, a: &Sense, b: &Sense) -> Option<f64>;

    /// Semantic relatedness in [0, 1].
    fn relatedness(&self, a: &Sense, b: &Sense) -> Option<f64>;

    /// Derivationally related noun senses of `sense`.
    fn related_noun_forms(&self, sense: &Sense) -> Vec<Sense>;

    /// Part of speech of `sense`, if the sense is known.
    fn part_of_speech(&self, sense: &Sense) -> Option<PartOfSpeech>;
}

impl<O: LexicalOracle + ?Sized> LexicalOracle for &O {
    fn synsets_for(&self, term: &str) -> Vec<Sense> {
        (**self).synsets_for(term)
    }

    fn path_distance(&self, a: &Sense, b: &Sense) -> Option<f64> {
        (**self).path_distance(a, b)
    }

    fn relatedness(&self, a: &Sense, b: &Sense) -> Option<f64> {
        (**self).relatedness(a, b)
    }

    fn related_noun_forms(&self, sense: &Sense) -> Vec<Sense> {
        (**self).related_noun_forms(sense)
    }

    fn part_of_speech(&self, sense: &Sense) -> Option<PartOfSpeech> {
        (**self).part_of_speech(sense)
    }
}
