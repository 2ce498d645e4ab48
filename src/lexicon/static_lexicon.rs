//! In-memory lexical taxonomy.

use std::collections::HashMap;

use super::{LexicalOracle, PartOfSpeech, Sense};

#[derive(Debug, Clone)]
struct Entry {
    pos: PartOfSpeech,
    parent: Option<Sense>,
}

/// A small hypernym taxonomy held in memory.
///
/// Each sense has at most one parent, so the taxonomy is a forest. Depth is
/// counted from 1 at a root. Two senses without a common ancestor have no
/// defined path distance or relatedness.
#[derive(Debug, Clone, Default)]
pub struct StaticLexicon {
    senses: HashMap<Sense, Entry>,
    lemmas: HashMap<String, Vec<Sense>>,
    /// Sense -> derivationally related forms, in insertion order.
    related: HashMap<Sense, Vec<Sense>>,
}

impl StaticLexicon {
    /// Create an empty lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sense with its part of speech and optional hypernym.
    pub fn with_sense(mut self, sense: &str, pos: PartOfSpeech, parent: Option<&str>) -> Self {
        let _ = self.senses.insert(
            Sense::from(sense),
            Entry {
                pos,
                parent: parent.map(Sense::from),
            },
        );
        self
    }

    /// Map a term to its senses, most common first.
    pub fn with_lemma(mut self, term: &str, senses: &[&str]) -> Self {
        self.lemmas
            .entry(term.to_lowercase())
            .or_default()
            .extend(senses.iter().copied().map(Sense::from));
        self
    }

    /// Record a derivationally related noun form of `sense`.
    ///
    /// Either sense may be registered before or after this call. Forms that
    /// are not registered as nouns are ignored at lookup time.
    pub fn with_related_noun(mut self, sense: &str, noun: &str) -> Self {
        self.related
            .entry(Sense::from(sense))
            .or_default()
            .push(Sense::from(noun));
        self
    }

    /// Number of registered senses.
    pub fn n_senses(&self) -> usize {
        self.senses.len()
    }

    /// `sense` followed by its hypernyms up to the root.
    fn ancestors<'a>(&'a self, sense: &'a Sense) -> Vec<&'a Sense> {
        let mut chain = Vec::new();
        let mut current = self.senses.contains_key(sense).then_some(sense);
        // A malformed parent cycle cannot walk further than every sense once.
        while let Some(s) = current {
            if chain.len() > self.senses.len() {
                break;
            }
            chain.push(s);
            current = self.senses.get(s).and_then(|e| e.parent.as_ref());
        }
        chain
    }

    /// Lowest common ancestor with the hop counts from `a` and `b`, plus both chains.
    fn lowest_common_ancestor(&self, a: &Sense, b: &Sense) -> Option<Lca> {
        let chain_a = self.ancestors(a);
        let chain_b = self.ancestors(b);
        chain_a.iter().enumerate().find_map(|(hops_a, s)| {
            chain_b.iter().position(|t| t == s).map(|hops_b| Lca {
                hops_a,
                hops_b,
                depth_lcs: chain_a.len() - hops_a,
                depth_a: chain_a.len(),
                depth_b: chain_b.len(),
            })
        })
    }
}

struct Lca {
    hops_a: usize,
    hops_b: usize,
    depth_lcs: usize,
    depth_a: usize,
    depth_b: usize,
}

impl LexicalOracle for StaticLexicon {
    fn synsets_for(&self, term: &str) -> Vec<Sense> {
        self.lemmas
            .get(&term.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    fn path_distance(&self, a: &Sense, b: &Sense) -> Option<f64> {
        self.lowest_common_ancestor(a, b)
            .map(|lca| (lca.hops_a + lca.hops_b) as f64)
    }

    fn relatedness(&self, a: &Sense, b: &Sense) -> Option<f64> {
        self.lowest_common_ancestor(a, b)
            .map(|lca| 2.0 * lca.depth_lcs as f64 / (lca.depth_a + lca.depth_b) as f64)
    }

    fn related_noun_forms(&self, sense: &Sense) -> Vec<Sense> {
        self.related
            .get(sense)
            .map(|forms| {
                forms
                    .iter()
                    .filter(|n| self.part_of_speech(n) == Some(PartOfSpeech::Noun))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn part_of_speech(&self, sense: &Sense) -> Option<PartOfSpeech> {
        self.senses.get(sense).map(|e| e.pos)
    }
}
