//! Data model: `Element`, `Group`, `Sequence`, `Corpus`.
//!
//! An element is an opaque symbol; equality is the only operation the
//! evaluator ever needs from it, so a plain `String` suffices (see
//! `core::data::Data` in the reference implementation, which makes the same
//! choice for its own atom type).

use std::collections::BTreeSet;

pub type Element = String;

/// An unordered set of elements at a single time step. `BTreeSet` rather than
/// `HashSet` so that iteration order (and therefore any printed output) is
/// deterministic.
pub type Group = BTreeSet<Element>;

/// An ordered, finite list of groups, indexed from 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    groups: Vec<Group>,
}

impl Sequence {
    pub fn new(groups: Vec<Group>) -> Self {
        Sequence { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// All distinct elements appearing anywhere in this sequence.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.groups.iter().flat_map(|g| g.iter())
    }
}

/// An ordered list of sequences, indexed from 0 (line number in the source
/// corpus file).
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    sequences: Vec<Sequence>,
}

impl Corpus {
    pub fn new(sequences: Vec<Sequence>) -> Self {
        Corpus { sequences }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn sequence(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// The distinct elements appearing anywhere in the corpus, used as the
    /// base universe for variable domains (spec.md §4.5).
    pub fn alphabet(&self) -> BTreeSet<Element> {
        self.sequences
            .iter()
            .flat_map(|seq| seq.elements().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(elems: &[&str]) -> Group {
        elems.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn alphabet_collects_distinct_elements() {
        let corpus = Corpus::new(vec![
            Sequence::new(vec![group(&["A"])]),
            Sequence::new(vec![group(&["A", "B"]), group(&["C"])]),
        ]);

        let alphabet = corpus.alphabet();
        assert_eq!(alphabet.len(), 3);
        assert!(alphabet.contains("A"));
        assert!(alphabet.contains("B"));
        assert!(alphabet.contains("C"));
    }

    #[test]
    fn empty_sequence_has_zero_length() {
        let seq = Sequence::new(vec![]);
        assert_eq!(seq.len(), 0);
        assert!(seq.is_empty());
    }
}
