//! Sequence input format (spec.md §6): one sequence per line, groups
//! separated by the literal token `-1`, the sequence terminated by the
//! literal token `-2`. Element identifiers are any non-empty, non-numeric
//! token.
//!
//! Grounded on the reference implementation's `core::spec::ParseError`:
//! a small `Display`/`std::error::Error` enum with per-line position info,
//! rather than a generic parser-combinator failure.

use std::{error, fmt};

use crate::core::sequence::{Corpus, Element, Group, Sequence};

const GROUP_SEPARATOR: &str = "-1";
const SEQUENCE_TERMINATOR: &str = "-2";

/// Input Error: malformed sequence input (spec.md §7 `InputError`).
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The line did not end with `-2`.
    MissingTerminator { line: usize },
    /// A `-2` (or other stray content) appeared before the end of the line.
    StrayTerminator { line: usize, position: usize },
    /// A token was numeric, and therefore not a valid element identifier.
    NumericElement {
        line: usize,
        position: usize,
        token: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingTerminator { line } => {
                write!(f, "line {}: missing sequence terminator '-2'", line)
            }
            Error::StrayTerminator { line, position } => write!(
                f,
                "line {}: stray '-2' at token {} (sequences have exactly one terminator, at the end)",
                line, position
            ),
            Error::NumericElement {
                line,
                position,
                token,
            } => write!(
                f,
                "line {}: token {} ('{}') is numeric and cannot be an element identifier",
                line, position, token
            ),
        }
    }
}

impl error::Error for Error {}

fn is_numeric_token(token: &str) -> bool {
    token.parse::<i64>().is_ok()
}

/// Parses a single corpus line into a `Sequence`.
///
/// Groups are delimited by `-1`; the group count is always
/// `count(-1) + 1`, so a bare `-2` line parses as a single empty group
/// rather than a zero-group sequence (see DESIGN.md for this Open Question
/// resolution).
pub fn parse_sequence_line(line: &str, line_number: usize) -> Result<Sequence, Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.last() {
        Some(&SEQUENCE_TERMINATOR) => {}
        _ => return Err(Error::MissingTerminator { line: line_number }),
    }

    let body = &tokens[..tokens.len() - 1];

    let mut groups: Vec<Group> = Vec::new();
    let mut current: Group = Group::new();

    for (position, token) in body.iter().enumerate() {
        match *token {
            GROUP_SEPARATOR => {
                groups.push(std::mem::take(&mut current));
            }
            SEQUENCE_TERMINATOR => {
                return Err(Error::StrayTerminator {
                    line: line_number,
                    position,
                })
            }
            elem if is_numeric_token(elem) => {
                return Err(Error::NumericElement {
                    line: line_number,
                    position,
                    token: elem.to_string(),
                })
            }
            elem => {
                current.insert(elem.to_string());
            }
        }
    }
    groups.push(current);

    Ok(Sequence::new(groups))
}

/// Parses a whole corpus file's contents into a `Corpus`. Blank lines are
/// skipped rather than treated as empty sequences, matching the reference
/// implementation's tolerance of trailing newlines in spec/input files.
pub fn parse_corpus(text: &str) -> Result<Corpus, Error> {
    let mut sequences: Vec<Sequence> = Vec::new();
    let mut line_number = 0usize;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let sequence = parse_sequence_line(line, line_number)?;
        sequences.push(sequence);
        line_number += 1;
    }

    Ok(Corpus::new(sequences))
}

pub fn elements_of(sequence: &Sequence) -> impl Iterator<Item = &Element> {
    sequence.elements()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_group_sequence() {
        let seq = parse_sequence_line("A B -2", 0).unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.group(0).unwrap().len(), 2);
    }

    #[test]
    fn multi_group_sequence() {
        let seq = parse_sequence_line("A -1 B C -2", 0).unwrap();
        assert_eq!(seq.len(), 2);
        assert!(seq.group(0).unwrap().contains("A"));
        assert!(seq.group(1).unwrap().contains("B"));
        assert!(seq.group(1).unwrap().contains("C"));
    }

    #[test]
    fn bare_terminator_is_one_empty_group() {
        let seq = parse_sequence_line("-2", 0).unwrap();
        assert_eq!(seq.len(), 1);
        assert!(seq.group(0).unwrap().is_empty());
    }

    #[test]
    fn empty_groups_are_legal() {
        let seq = parse_sequence_line("A -1 -1 B -2", 0).unwrap();
        assert_eq!(seq.len(), 3);
        assert!(seq.group(1).unwrap().is_empty());
    }

    #[test]
    fn missing_terminator_is_an_error() {
        let err = parse_sequence_line("A B", 3).unwrap_err();
        assert_eq!(err, Error::MissingTerminator { line: 3 });
    }

    #[test]
    fn numeric_token_is_an_error() {
        let err = parse_sequence_line("A 42 -2", 1).unwrap_err();
        assert_eq!(
            err,
            Error::NumericElement {
                line: 1,
                position: 1,
                token: "42".to_string()
            }
        );
    }

    #[test]
    fn stray_terminator_is_an_error() {
        let err = parse_sequence_line("A -2 B -2", 2).unwrap_err();
        assert_eq!(
            err,
            Error::StrayTerminator {
                line: 2,
                position: 1
            }
        );
    }

    #[test]
    fn reference_corpus_matches_spec_examples() {
        let text = "A -2\nB -2\nA B -2\nA -1 B C -2\nB -1 A B -1 A -1 C -2\n";
        let corpus = parse_corpus(text).unwrap();
        assert_eq!(corpus.len(), 5);
        assert_eq!(corpus.sequence(3).unwrap().len(), 2);
        assert_eq!(corpus.sequence(4).unwrap().len(), 4);
    }
}
