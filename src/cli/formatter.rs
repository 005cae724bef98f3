//! Report rendering (SPEC_FULL §3 "Structured + human report output"):
//! either a colored, human-readable report (default) or a plain
//! line-oriented report suited for piping, mirroring the reference
//! implementation's split between `FormatMetrics` (machine countable
//! numbers) and its colored terminal printing in `cli::mod::print_final_status`.

use colored::Colorize;

use crate::cli::driver::{PairReport, PatternReport, Report};

/// Renders `report` as a colored, human-readable block per pattern plus a
/// block per ordered pattern pair, following spec.md §6's output contract.
pub fn render_human(report: &Report) -> String {
    let mut out = String::new();

    for (i, pattern) in report.patterns.iter().enumerate() {
        out.push_str(&format!("{} {}\n", format!("[{}]", i).bold(), pattern.text.cyan()));
        render_pattern_human(&mut out, pattern, report.corpus_len);
        out.push('\n');
    }

    if report.pairs.is_empty() {
        return out;
    }

    out.push_str(&"association rules".bold().to_string());
    out.push('\n');
    for pair in &report.pairs {
        render_pair_human(&mut out, report, pair);
    }

    out
}

fn render_pattern_human(out: &mut String, pattern: &PatternReport, corpus_len: usize) {
    if let Some(parse_error) = &pattern.parse_error {
        out.push_str(&format!("  {}: {}\n", "parse error".bright_red(), parse_error));
        return;
    }
    if let Some(domain_error) = &pattern.domain_error {
        out.push_str(&format!("  {}: {}\n", "domain error".bright_red(), domain_error));
        return;
    }

    out.push_str(&format!(
        "  support: {} ({}/{})\n",
        pattern.support,
        pattern.matches.len(),
        corpus_len
    ));
    out.push_str(&format!("  matches: {}\n", format_indices(&pattern.matches)));

    for binding in &pattern.bindings {
        let binding_str = binding
            .binding
            .iter()
            .map(|(name, elem)| format!("{}={}", name, elem))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "    [{}] -> {}\n",
            binding_str.yellow(),
            format_indices(&binding.matches)
        ));
    }
}

fn render_pair_human(out: &mut String, report: &Report, pair: &PairReport) {
    let left = &report.patterns[pair.i].text;
    let right = &report.patterns[pair.j].text;

    out.push_str(&format!(
        "  {} => {}: joint={} ",
        left.cyan(),
        right.cyan(),
        pair.joint_support
    ));

    match pair.confidence {
        Some(conf) => out.push_str(&format!("conf={} ", conf)),
        None => out.push_str("conf=undefined "),
    }

    match pair.lift {
        Some(lift) => out.push_str(&format!("lift={}\n", lift)),
        None => out.push_str("lift=undefined\n"),
    }
}

/// Renders `report` as plain, pipe-friendly lines: one `support` line and
/// one `matches` line per pattern, then one line per ordered pair.
pub fn render_plain(report: &Report) -> String {
    let mut out = String::new();

    for (i, pattern) in report.patterns.iter().enumerate() {
        if let Some(parse_error) = &pattern.parse_error {
            out.push_str(&format!("{}\tparse_error\t{}\n", i, parse_error));
            continue;
        }
        if let Some(domain_error) = &pattern.domain_error {
            out.push_str(&format!("{}\tdomain_error\t{}\n", i, domain_error));
            continue;
        }

        out.push_str(&format!(
            "{}\tsupport\t{}\t{}\n",
            i,
            pattern.support.as_f64(),
            format_indices(&pattern.matches)
        ));

        for binding in &pattern.bindings {
            let binding_str = binding
                .binding
                .iter()
                .map(|(name, elem)| format!("{}={}", name, elem))
                .collect::<Vec<_>>()
                .join(",");
            out.push_str(&format!(
                "{}\tbinding\t{}\t{}\n",
                i,
                binding_str,
                format_indices(&binding.matches)
            ));
        }
    }

    for pair in &report.pairs {
        out.push_str(&format!(
            "{}\t{}\tjoint\t{}\t{}\t{}\n",
            pair.i,
            pair.j,
            pair.joint_support.as_f64(),
            pair.confidence.map(|c| c.as_f64().to_string()).unwrap_or_else(|| "undefined".to_string()),
            pair.lift.map(|l| l.as_f64().to_string()).unwrap_or_else(|| "undefined".to_string()),
        ));
    }

    out
}

fn format_indices(indices: &std::collections::BTreeSet<usize>) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::driver;
    use crate::core::input::parse_corpus;

    fn reference_corpus() -> crate::core::sequence::Corpus {
        parse_corpus("A -2\nB -2\nA B -2\nA -1 B C -2\nB -1 A B -1 A -1 C -2\n").unwrap()
    }

    #[test]
    fn plain_render_includes_support_and_matches() {
        let corpus = reference_corpus();
        let report = driver::run(&corpus, &["A B".to_string()], &[], 1).unwrap();
        let plain = render_plain(&report);
        assert!(plain.contains("support\t0.6"));
        assert!(plain.contains("2,3,4"));
    }

    #[test]
    fn plain_render_reports_undefined_confidence() {
        let corpus = reference_corpus();
        let report = driver::run(&corpus, &["Z".to_string(), "A".to_string()], &[], 1).unwrap();
        let plain = render_plain(&report);
        assert!(plain.contains("undefined"));
    }

    #[test]
    fn human_render_flags_domain_errors() {
        let corpus = reference_corpus();
        let report = driver::run(&corpus, &["x".to_string()], &["x:Z".to_string()], 1).unwrap();
        let human = render_human(&report);
        assert!(human.contains("domain error"));
    }

    #[test]
    fn human_render_flags_parse_errors_without_blocking_other_patterns() {
        let corpus = reference_corpus();
        let report = driver::run(&corpus, &["(A".to_string(), "A".to_string()], &[], 1).unwrap();
        let human = render_human(&report);
        assert!(human.contains("parse error"));
        assert!(human.contains("support"));
    }
}
