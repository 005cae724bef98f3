//! Driver (spec.md §4 component 7): glues the lexer/parser, element index,
//! evaluator, variable enumerator, and statistics aggregator together,
//! accepting parsed input (a corpus, pattern strings, variable
//! declarations) and producing the report data described in spec.md §6.
//!
//! Per spec.md §5, evaluation is pure and the aggregator's reduction is
//! commutative, so the (pattern x binding) loop may be dispatched across
//! `core::util::thread_pool::ThreadPool` workers with no ordering
//! guarantees between them; `run` takes a thread count and parallelizes at
//! the binding level when it is greater than one.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::core::eval;
use crate::core::index::ElementIndex;
use crate::core::parse::{self, Expr};
use crate::core::sequence::Corpus;
use crate::core::stats::{self, Fraction};
use crate::core::util::thread_pool::ThreadPool;
use crate::core::variable::{self, Binding, DomainError, Variable};
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct BindingReport {
    pub binding: Binding,
    pub matches: BTreeSet<usize>,
}

#[derive(Debug, Clone)]
pub struct PatternReport {
    pub text: String,
    pub support: Fraction,
    pub matches: BTreeSet<usize>,
    pub bindings: Vec<BindingReport>,
    pub domain_error: Option<DomainError>,
    pub parse_error: Option<parse::Error>,
}

#[derive(Debug, Clone)]
pub struct PairReport {
    pub i: usize,
    pub j: usize,
    pub joint_support: Fraction,
    pub confidence: Option<Fraction>,
    pub lift: Option<Fraction>,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub corpus_len: usize,
    pub patterns: Vec<PatternReport>,
    pub pairs: Vec<PairReport>,
}

/// Runs every pattern in `pattern_texts` against `corpus`, using
/// `var_decls` as the pool of variables patterns may reference, and
/// returns the full report (spec.md §6's "output contract"). `threads`
/// controls how many worker threads evaluate bindings in parallel; `1`
/// (or `0`) runs everything on the calling thread.
pub fn run(
    corpus: &Corpus,
    pattern_texts: &[String],
    var_decls: &[String],
    threads: usize,
) -> Result<Report, Error> {
    let indices: Arc<Vec<ElementIndex>> =
        Arc::new(corpus.sequences().iter().map(ElementIndex::build).collect());

    let vars: Vec<Variable> = var_decls
        .iter()
        .map(|decl| variable::parse_declaration(decl).map_err(Error::from))
        .collect::<Result<_, _>>()?;

    let mut patterns = Vec::with_capacity(pattern_texts.len());

    for text in pattern_texts {
        // spec.md §7: "Parse errors halt processing of that pattern; other
        // patterns in the same invocation proceed independently" — so a bad
        // pattern is carried on its own `PatternReport` rather than aborting
        // the whole run via `?`, the same way a `DomainError` already is.
        let expr = match parse::parse(text) {
            Err(parse_error) => {
                patterns.push(PatternReport {
                    text: text.clone(),
                    support: Fraction::new(0, 1),
                    matches: BTreeSet::new(),
                    bindings: Vec::new(),
                    domain_error: None,
                    parse_error: Some(parse_error),
                });
                continue;
            }
            Ok(expr) => expr,
        };

        let free = variable::free_variables_in(&expr, &vars);
        let used: Vec<Variable> = vars.iter().filter(|v| free.contains(&v.name)).cloned().collect();

        let report = if used.is_empty() {
            let matches = eval_sequential(&expr, &indices);
            PatternReport {
                text: text.clone(),
                support: Fraction::new(0, 1),
                matches,
                bindings: Vec::new(),
                domain_error: None,
                parse_error: None,
            }
        } else {
            match variable::enumerate_bindings(&used, corpus) {
                Err(domain_error) => PatternReport {
                    text: text.clone(),
                    support: Fraction::new(0, 1),
                    matches: BTreeSet::new(),
                    bindings: Vec::new(),
                    domain_error: Some(domain_error),
                    parse_error: None,
                },
                Ok(bindings) => {
                    let binding_results = eval_bindings(&expr, bindings, &indices, threads);
                    let mut aggregate = BTreeSet::new();
                    let mut reports = Vec::with_capacity(binding_results.len());
                    for (binding, matches) in binding_results {
                        aggregate.extend(matches.iter().copied());
                        reports.push(BindingReport { binding, matches });
                    }
                    PatternReport {
                        text: text.clone(),
                        support: Fraction::new(0, 1),
                        matches: aggregate,
                        bindings: reports,
                        domain_error: None,
                        parse_error: None,
                    }
                }
            }
        };

        patterns.push(report);
    }

    let mut aggregator = stats::Aggregator::new(corpus.len());
    for pattern in &patterns {
        aggregator.push(stats::PatternResult {
            text: pattern.text.clone(),
            matches: pattern.matches.clone(),
        });
    }

    for (i, pattern) in patterns.iter_mut().enumerate() {
        pattern.support = aggregator.support(i);
    }

    let mut pairs = Vec::new();
    for i in 0..patterns.len() {
        for j in 0..patterns.len() {
            if i == j {
                continue;
            }
            pairs.push(PairReport {
                i,
                j,
                joint_support: aggregator.joint_support(i, j),
                confidence: aggregator.confidence(i, j),
                lift: aggregator.lift(i, j),
            });
        }
    }

    Ok(Report {
        corpus_len: corpus.len(),
        patterns,
        pairs,
    })
}

fn eval_sequential(expr: &Expr, indices: &[ElementIndex]) -> BTreeSet<usize> {
    (0..indices.len()).filter(|&i| eval::matches(expr, &indices[i])).collect()
}

/// Evaluates `expr` (after substituting each binding) against the whole
/// corpus, one binding per thread-pool job when `threads > 1`.
fn eval_bindings(
    expr: &Expr,
    bindings: Vec<Binding>,
    indices: &Arc<Vec<ElementIndex>>,
    threads: usize,
) -> Vec<(Binding, BTreeSet<usize>)> {
    if threads <= 1 || bindings.len() <= 1 {
        return bindings
            .into_iter()
            .map(|binding| {
                let substituted = variable::substitute(expr, &binding);
                let matches = eval_sequential(&substituted, indices);
                (binding, matches)
            })
            .collect();
    }

    let expr_arc = Arc::new(expr.clone());
    let total = bindings.len();
    let results: Arc<Mutex<Vec<Option<(Binding, BTreeSet<usize>)>>>> =
        Arc::new(Mutex::new((0..total).map(|_| None).collect()));

    let pool: ThreadPool<(usize, Binding)> = ThreadPool::spawn(threads, total.max(1), {
        let indices = indices.clone();
        let expr_arc = expr_arc.clone();
        let results = results.clone();
        move |(job_id, binding): (usize, Binding)| {
            let substituted = variable::substitute(&expr_arc, &binding);
            let matches = eval_sequential(&substituted, &indices);
            results.lock().unwrap()[job_id] = Some((binding, matches));
        }
    });

    for (job_id, binding) in bindings.into_iter().enumerate() {
        pool.enqueue((job_id, binding)).expect("thread pool queue closed unexpectedly");
    }
    pool.terminate_and_join();

    results
        .lock()
        .unwrap()
        .drain(..)
        .map(|slot| slot.expect("every enqueued binding job reports back before pool termination"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::parse_corpus;

    fn reference_corpus() -> Corpus {
        parse_corpus("A -2\nB -2\nA B -2\nA -1 B C -2\nB -1 A B -1 A -1 C -2\n").unwrap()
    }

    #[test]
    fn s1_plain_and_pattern() {
        let corpus = reference_corpus();
        let report = run(&corpus, &["A B".to_string()], &[], 1).unwrap();
        assert_eq!(report.patterns[0].support.as_f64(), 0.6);
        assert_eq!(
            report.patterns[0].matches,
            [2usize, 3, 4].into_iter().collect()
        );
    }

    #[test]
    fn s4_slice_out_pattern() {
        let corpus = reference_corpus();
        let report = run(&corpus, &["[A OutB]".to_string()], &[], 1).unwrap();
        assert_eq!(report.patterns[0].support.as_f64(), 0.2);
        assert_eq!(report.patterns[0].matches, [4usize].into_iter().collect());
    }

    #[test]
    fn s7_variable_pattern_excludes_equal_bindings() {
        let corpus = reference_corpus();
        let report = run(
            &corpus,
            &["x & y".to_string()],
            &["x".to_string(), "y".to_string()],
            1,
        )
        .unwrap();

        let pattern = &report.patterns[0];
        assert_eq!(pattern.support.as_f64(), 0.6);
        assert_eq!(pattern.matches, [2usize, 3, 4].into_iter().collect());

        let binding_matches = |x: &str, y: &str| {
            pattern
                .bindings
                .iter()
                .find(|b| b.binding == vec![("x".to_string(), x.to_string()), ("y".to_string(), y.to_string())])
                .map(|b| b.matches.clone())
        };
        assert_eq!(binding_matches("B", "A"), Some([2usize, 4].into_iter().collect()));
        assert_eq!(binding_matches("B", "C"), Some([3usize].into_iter().collect()));
        assert!(pattern.bindings.iter().all(|b| b.binding[0].1 != b.binding[1].1));
    }

    #[test]
    fn s8_association_rules_between_two_patterns() {
        let corpus = reference_corpus();
        let report = run(&corpus, &["[A]".to_string(), "[A B]".to_string()], &[], 1).unwrap();

        assert_eq!(report.patterns[0].support.as_f64(), 0.8);
        assert_eq!(report.patterns[1].support.as_f64(), 0.4);

        let forward = report.pairs.iter().find(|p| p.i == 0 && p.j == 1).unwrap();
        assert_eq!(forward.joint_support.as_f64(), 0.4);
        assert_eq!(forward.confidence.unwrap().as_f64(), 0.5);
        assert_eq!(forward.lift.unwrap().as_f64(), 1.25);

        let backward = report.pairs.iter().find(|p| p.i == 1 && p.j == 0).unwrap();
        assert_eq!(backward.confidence.unwrap().as_f64(), 1.0);
        assert_eq!(backward.lift.unwrap().as_f64(), 1.25);
    }

    #[test]
    fn domain_error_reports_zero_support_instead_of_failing_the_run() {
        let corpus = reference_corpus();
        let report = run(&corpus, &["x".to_string()], &["x:Z".to_string()], 1).unwrap();
        assert!(report.patterns[0].domain_error.is_some());
        assert_eq!(report.patterns[0].support.as_f64(), 0.0);
    }

    #[test]
    fn parse_error_in_one_pattern_does_not_block_the_others() {
        let corpus = reference_corpus();
        let report = run(&corpus, &["(A".to_string(), "A".to_string()], &[], 1).unwrap();

        assert!(report.patterns[0].parse_error.is_some());
        assert!(report.patterns[1].parse_error.is_none());
        assert_eq!(report.patterns[1].support.as_f64(), 0.8);
        assert_eq!(
            report.patterns[1].matches,
            [0usize, 2, 3, 4].into_iter().collect()
        );
    }

    #[test]
    fn parallel_binding_evaluation_matches_sequential() {
        let corpus = reference_corpus();
        let sequential = run(
            &corpus,
            &["x & y".to_string()],
            &["x".to_string(), "y".to_string()],
            1,
        )
        .unwrap();
        let parallel = run(
            &corpus,
            &["x & y".to_string()],
            &["x".to_string(), "y".to_string()],
            4,
        )
        .unwrap();

        assert_eq!(sequential.patterns[0].matches, parallel.patterns[0].matches);
        assert_eq!(
            sequential.patterns[0].bindings.len(),
            parallel.patterns[0].bindings.len()
        );
    }
}
