//! Selection sub-operation (spec.md §6): given a corpus and a list of
//! sequence indices, render each requested sequence prefixed by its index
//! and a delimiter. Grounded on the reference implementation's
//! straightforward `cli::logger::info`-style stdout reporting, since this
//! operation has no counterpart in the reference's own CLI beyond "print a
//! line".

use crate::core::sequence::Corpus;

const DEFAULT_DELIMITER: &str = ":";

/// Renders `indices` (in the order given) as `"{index}{delimiter} {line}"`,
/// where `{line}` re-serializes the sequence in the §6 input format
/// (`-1`-separated groups, `-2` terminator). Indices past the end of the
/// corpus are rendered with an empty line, mirroring spec.md's silence on
/// out-of-range selection rather than failing the whole operation.
pub fn render(corpus: &Corpus, indices: &[usize], delimiter: Option<&str>) -> String {
    let delimiter = delimiter.unwrap_or(DEFAULT_DELIMITER);
    let mut out = String::new();

    for &index in indices {
        out.push_str(&index.to_string());
        out.push_str(delimiter);
        out.push(' ');

        match corpus.sequence(index) {
            Some(sequence) => out.push_str(&render_sequence(sequence)),
            None => {}
        }

        out.push('\n');
    }

    out
}

fn render_sequence(sequence: &crate::core::sequence::Sequence) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (i, group) in sequence.groups().iter().enumerate() {
        if i > 0 {
            parts.push("-1".to_string());
        }
        parts.extend(group.iter().cloned());
    }
    parts.push("-2".to_string());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::parse_corpus;

    #[test]
    fn renders_selected_lines_with_index_prefix() {
        let corpus = parse_corpus("A -2\nB -1 C -2\n").unwrap();
        let out = render(&corpus, &[1, 0], None);
        assert_eq!(out, "1: B -1 C -2\n0: A -2\n");
    }

    #[test]
    fn out_of_range_index_renders_an_empty_line() {
        let corpus = parse_corpus("A -2\n").unwrap();
        let out = render(&corpus, &[5], None);
        assert_eq!(out, "5: \n");
    }

    #[test]
    fn custom_delimiter_is_honored() {
        let corpus = parse_corpus("A -2\n").unwrap();
        let out = render(&corpus, &[0], Some("|"));
        assert_eq!(out, "0| A -2\n");
    }
}
