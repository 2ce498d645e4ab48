//! Memoized term-pair similarity over a lexical oracle.

use std::collections::HashMap;

use tracing::trace;

use super::{LexicalOracle, Sense};

/// Term-to-term semantic similarity with pair and sense caches.
///
/// Both caches live exactly as long as this value. Nothing is invalidated:
/// terms and their senses are assumed fixed for one processing run.
#[derive(Debug)]
pub struct TermSimilarity<O> {
    oracle: O,
    /// Canonically ordered term pair -> score.
    pairs: HashMap<(String, String), f64>,
    /// Term -> candidate senses. Empty means the oracle knows no sense.
    senses: HashMap<String, Vec<Sense>>,
    sense_lookups: usize,
}

impl<O: LexicalOracle> TermSimilarity<O> {
    /// Wrap an oracle with empty caches.
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            pairs: HashMap::new(),
            senses: HashMap::new(),
            sense_lookups: 0,
        }
    }

    /// Similarity of two terms in [0, 1].
    ///
    /// Identical terms score 1 and hashtags or non-alphabetic terms score 0,
    /// both without touching the oracle.
    pub fn score(&mut self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        if !is_lexical(a) || !is_lexical(b) {
            return 0.0;
        }

        let key = if a <= b {
            (a.to_owned(), b.to_owned())
        } else {
            (b.to_owned(), a.to_owned())
        };
        if let Some(&cached) = self.pairs.get(&key) {
            return cached;
        }

        let score = self.compute(a, b);
        trace!(a, b, score, "term pair scored");
        let _ = self.pairs.insert(key, score);
        score
    }

    /// True if the oracle knows at least one sense of `term`.
    pub fn has_sense(&mut self, term: &str) -> bool {
        self.ensure_senses(term);
        self.senses.get(term).is_some_and(|s| !s.is_empty())
    }

    /// Number of cached term pairs.
    pub fn cached_pairs(&self) -> usize {
        self.pairs.len()
    }

    /// Number of `synsets_for` calls made against the oracle.
    pub fn sense_lookups(&self) -> usize {
        self.sense_lookups
    }

    /// The wrapped oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Forget every cached pair and sense and reset the lookup counter.
    pub fn clear(&mut self) {
        self.pairs.clear();
        self.senses.clear();
        self.sense_lookups = 0;
    }

    fn ensure_senses(&mut self, term: &str) {
        if !self.senses.contains_key(term) {
            self.sense_lookups += 1;
            let found = self.oracle.synsets_for(term);
            let _ = self.senses.insert(term.to_owned(), found);
        }
    }

    fn compute(&mut self, a: &str, b: &str) -> f64 {
        self.ensure_senses(a);
        self.ensure_senses(b);
        let (Some(senses_a), Some(senses_b)) = (self.senses.get(a), self.senses.get(b)) else {
            return 0.0;
        };
        if senses_a.is_empty() || senses_b.is_empty() {
            return 0.0;
        }

        let Some((best_a, best_b)) = closest_pair(&self.oracle, senses_a, senses_b) else {
            return 0.0;
        };
        let (Some(sa), Some(sb)) = (
            comparable_form(&self.oracle, best_a),
            comparable_form(&self.oracle, best_b),
        ) else {
            return 0.0;
        };

        self.oracle
            .relatedness(&sa, &sb)
            .filter(|s| s.is_finite())
            .map_or(0.0, |s| s.clamp(0.0, 1.0))
    }
}

/// Sense pair with the shortest path. Falls back to the first senses when no
/// pair has a defined distance.
fn closest_pair<'a, O: LexicalOracle>(
    oracle: &O,
    senses_a: &'a [Sense],
    senses_b: &'a [Sense],
) -> Option<(&'a Sense, &'a Sense)> {
    let mut best: Option<(f64, &Sense, &Sense)> = None;
    for sa in senses_a {
        for sb in senses_b {
            let Some(d) = oracle.path_distance(sa, sb) else {
                continue;
            };
            let closeness = 1.0 / (d + 1.0);
            if best.map_or(true, |(c, _, _)| closeness > c) {
                best = Some((closeness, sa, sb));
            }
        }
    }
    match best {
        Some((_, sa, sb)) => Some((sa, sb)),
        None => Some((senses_a.first()?, senses_b.first()?)),
    }
}

/// Nouns and verbs pass through; anything else becomes its first related noun.
fn comparable_form<O: LexicalOracle>(oracle: &O, sense: &Sense) -> Option<Sense> {
    match oracle.part_of_speech(sense) {
        Some(pos) if pos.is_noun_or_verb() => Some(sense.clone()),
        _ => oracle.related_noun_forms(sense).into_iter().next(),
    }
}

/// True if `term` can have a lexical sense: alphabetic characters only, with
/// at most one internal hyphen, and no hashtag marker.
pub fn is_lexical(term: &str) -> bool {
    let alphabetic = |s: &str| !s.is_empty() && s.chars().all(char::is_alphabetic);
    match term.split_once('-') {
        None => alphabetic(term),
        Some((head, tail)) => alphabetic(head) && alphabetic(tail),
    }
}
