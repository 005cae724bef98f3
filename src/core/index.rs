//! Element Index (spec.md §3, §4 component 3): per-sequence precomputed
//! positions of each element, plus the derived insertion (`in_groups`) and
//! removal (`out_groups`) event sets.
//!
//! Built once per sequence and retained across all pattern evaluations
//! against that sequence, per spec.md §5's "retaining them across patterns
//! avoids O(patterns x sequences) recomputation".

use std::collections::{BTreeMap, BTreeSet};

use crate::core::sequence::{Element, Sequence};

#[derive(Debug, Clone, Default)]
pub struct ElementIndex {
    groups_of: BTreeMap<Element, Vec<usize>>,
    in_groups: BTreeMap<Element, Vec<usize>>,
    out_groups: BTreeMap<Element, Vec<usize>>,
    len: usize,
}

impl ElementIndex {
    pub fn build(sequence: &Sequence) -> Self {
        let mut groups_of: BTreeMap<Element, Vec<usize>> = BTreeMap::new();

        for (i, group) in sequence.groups().iter().enumerate() {
            for elem in group {
                groups_of.entry(elem.clone()).or_default().push(i);
            }
        }

        let mut in_groups: BTreeMap<Element, Vec<usize>> = BTreeMap::new();
        let mut out_groups: BTreeMap<Element, Vec<usize>> = BTreeMap::new();

        for (elem, positions) in &groups_of {
            let (ins, outs) = runs(positions, sequence.len());
            in_groups.insert(elem.clone(), ins);
            out_groups.insert(elem.clone(), outs);
        }

        ElementIndex {
            groups_of,
            in_groups,
            out_groups,
            len: sequence.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn groups_of(&self, elem: &str) -> &[usize] {
        self.groups_of
            .get(elem)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn first(&self, elem: &str) -> Option<usize> {
        self.groups_of(elem).first().copied()
    }

    pub fn last(&self, elem: &str) -> Option<usize> {
        self.groups_of(elem).last().copied()
    }

    pub fn in_groups(&self, elem: &str) -> &[usize] {
        self.in_groups.get(elem).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn out_groups(&self, elem: &str) -> &[usize] {
        self.out_groups
            .get(elem)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every element this index has any record of.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.groups_of.keys()
    }
}

/// Splits a sorted list of occupied positions into maximal contiguous runs,
/// and from those derives the insertion positions (run starts) and removal
/// positions (first group after a run ends, if one exists).
fn runs(positions: &[usize], seq_len: usize) -> (Vec<usize>, Vec<usize>) {
    let mut ins = Vec::new();
    let mut outs = Vec::new();

    let mut i = 0;
    while i < positions.len() {
        let start = positions[i];
        ins.push(start);

        let mut end = start;
        while i + 1 < positions.len() && positions[i + 1] == end + 1 {
            i += 1;
            end = positions[i];
        }

        if end + 1 < seq_len {
            outs.push(end + 1);
        }

        i += 1;
    }

    (ins, outs)
}

/// Maximal contiguous runs of group indices containing `elem`, used as slice
/// seeds for the common `[X ...]` shape (spec.md §4.4).
pub fn runs_of(index: &ElementIndex, elem: &str) -> Vec<(usize, usize)> {
    let positions = index.groups_of(elem);
    let mut result = Vec::new();

    let mut i = 0;
    while i < positions.len() {
        let start = positions[i];
        let mut end = start;
        while i + 1 < positions.len() && positions[i + 1] == end + 1 {
            i += 1;
            end = positions[i];
        }
        result.push((start, end));
        i += 1;
    }

    result
}

pub fn window_set(lo: usize, hi: usize) -> BTreeSet<usize> {
    (lo..=hi).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::parse_sequence_line;

    #[test]
    fn in_groups_is_subset_of_groups_of_and_contains_minimum() {
        let seq = parse_sequence_line("A -1 A -1 B -1 A -2", 0).unwrap();
        let index = ElementIndex::build(&seq);

        let g = index.groups_of("A");
        let ins = index.in_groups("A");
        assert!(ins.iter().all(|i| g.contains(i)));
        assert_eq!(ins[0], *g.iter().min().unwrap());
    }

    #[test]
    fn gap_produces_an_out_group() {
        // A present at 0,1 then absent at 2 then present again at 3 (the
        // last group, so that final run has no removal event of its own).
        let seq = parse_sequence_line("A -1 A -1 B -1 A -2", 0).unwrap();
        let index = ElementIndex::build(&seq);

        assert_eq!(index.out_groups("A"), &[2]);
    }

    #[test]
    fn no_out_group_when_last_occurrence_is_final_group() {
        let seq = parse_sequence_line("A -1 B -2", 0).unwrap();
        let index = ElementIndex::build(&seq);

        // A occupies only group 0; group 1 (the last) doesn't contain A, so
        // the removal event at position 1 is reported...
        assert_eq!(index.out_groups("A"), &[1]);

        // ...but B occupies the final group, so there is no removal event.
        assert_eq!(index.out_groups("B"), &[] as &[usize]);
    }

    #[test]
    fn runs_of_collects_maximal_contiguous_ranges() {
        let seq = parse_sequence_line("A -1 A -1 B -1 A -2", 0).unwrap();
        let index = ElementIndex::build(&seq);

        assert_eq!(runs_of(&index, "A"), vec![(0, 1), (3, 3)]);
    }
}
