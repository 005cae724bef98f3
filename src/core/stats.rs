//! Statistics Aggregator (spec.md §4.6): per-pattern support and, for pairs
//! of patterns, joint support, confidence, and lift. Numeric results are
//! exact rational fractions (spec.md: "Numeric results are rational
//! fractions that may be rendered as decimals by the driver").
//!
//! The aggregator itself holds the only mutable state in the crate
//! (spec.md §5); it is filled in by folding independent per-pattern results,
//! a commutative reduction, so no locking is required even when the outer
//! (pattern x binding x sequence) loop is parallelized by
//! `util::thread_pool`.

use std::collections::BTreeSet;
use std::fmt;

/// An exact, always-reduced rational number used for support/confidence/lift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub numerator: u64,
    pub denominator: u64,
}

impl Fraction {
    pub fn new(numerator: u64, denominator: u64) -> Self {
        assert!(denominator > 0, "fraction with zero denominator");
        let g = gcd(numerator, denominator);
        Fraction {
            numerator: numerator / g,
            denominator: denominator / g,
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    fn div(&self, other: &Fraction) -> Option<Fraction> {
        if other.numerator == 0 {
            None
        } else {
            Some(Fraction::new(
                self.numerator * other.denominator,
                self.denominator * other.numerator,
            ))
        }
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.4}", self.as_f64())
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if a == 0 {
        b.max(1)
    } else if b == 0 {
        a.max(1)
    } else {
        let (mut a, mut b) = (a, b);
        while b != 0 {
            let t = b;
            b = a % b;
            a = t;
        }
        a
    }
}

/// One pattern's result: its text and the set of sequence indices it
/// matches (already unioned across variable bindings, per spec.md §4.5).
#[derive(Debug, Clone)]
pub struct PatternResult {
    pub text: String,
    pub matches: BTreeSet<usize>,
}

pub struct Aggregator {
    corpus_len: usize,
    results: Vec<PatternResult>,
}

impl Aggregator {
    pub fn new(corpus_len: usize) -> Self {
        Aggregator {
            corpus_len,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: PatternResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[PatternResult] {
        &self.results
    }

    pub fn support(&self, i: usize) -> Fraction {
        fraction_of(self.results[i].matches.len(), self.corpus_len)
    }

    pub fn joint_support(&self, i: usize, j: usize) -> Fraction {
        let joint = self.results[i]
            .matches
            .intersection(&self.results[j].matches)
            .count();
        fraction_of(joint, self.corpus_len)
    }

    /// `Conf(Pi => Pj) = Supp(Pi & Pj) / Supp(Pi)`; `None` if `Supp(Pi) == 0`.
    pub fn confidence(&self, i: usize, j: usize) -> Option<Fraction> {
        self.joint_support(i, j).div(&self.support(i))
    }

    /// `Lift = Conf(Pi => Pj) / Supp(Pj)`; `None` if either side is
    /// undefined.
    pub fn lift(&self, i: usize, j: usize) -> Option<Fraction> {
        self.confidence(i, j)?.div(&self.support(j))
    }
}

fn fraction_of(count: usize, total: usize) -> Fraction {
    if total == 0 {
        Fraction::new(0, 1)
    } else {
        Fraction::new(count as u64, total as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(indices: &[usize]) -> BTreeSet<usize> {
        indices.iter().copied().collect()
    }

    #[test]
    fn support_is_bounded_in_zero_one() {
        let mut agg = Aggregator::new(5);
        agg.push(PatternResult {
            text: "A".to_string(),
            matches: matches(&[0, 1, 2]),
        });
        let s = agg.support(0);
        assert!(s.as_f64() >= 0.0 && s.as_f64() <= 1.0);
        assert_eq!(s.as_f64(), 0.6);
    }

    #[test]
    fn spec_s8_association_rules() {
        // [A] over {0,2,3,4}; [A B] over {2,4}; corpus size 5.
        let mut agg = Aggregator::new(5);
        agg.push(PatternResult {
            text: "[A]".to_string(),
            matches: matches(&[0, 2, 3, 4]),
        });
        agg.push(PatternResult {
            text: "[A B]".to_string(),
            matches: matches(&[2, 4]),
        });

        assert_eq!(agg.support(0).as_f64(), 0.8);
        assert_eq!(agg.support(1).as_f64(), 0.4);
        assert_eq!(agg.joint_support(0, 1).as_f64(), 0.4);
        assert_eq!(agg.confidence(0, 1).unwrap().as_f64(), 0.5);
        assert_eq!(agg.confidence(1, 0).unwrap().as_f64(), 1.0);
        assert_eq!(agg.lift(0, 1).unwrap().as_f64(), 1.25);
        assert_eq!(agg.lift(1, 0).unwrap().as_f64(), 1.25);
    }

    #[test]
    fn confidence_is_undefined_for_zero_support() {
        let mut agg = Aggregator::new(5);
        agg.push(PatternResult {
            text: "Z".to_string(),
            matches: BTreeSet::new(),
        });
        agg.push(PatternResult {
            text: "A".to_string(),
            matches: matches(&[0]),
        });
        assert!(agg.confidence(0, 1).is_none());
    }

    #[test]
    fn joint_support_never_exceeds_component_supports() {
        let mut agg = Aggregator::new(5);
        agg.push(PatternResult {
            text: "A".to_string(),
            matches: matches(&[0, 1, 2]),
        });
        agg.push(PatternResult {
            text: "B".to_string(),
            matches: matches(&[1, 2, 3]),
        });
        let joint = agg.joint_support(0, 1).as_f64();
        assert!(joint <= agg.support(0).as_f64());
        assert!(joint <= agg.support(1).as_f64());
    }
}
