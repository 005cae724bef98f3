//! Evaluator (spec.md §4.3): maps an expression tree plus a host sequence
//! (and an active window) to a match set of group indices, following the
//! semantics table in spec.md §3.
//!
//! A pure function of its inputs, as spec.md §5 requires: no mutable state,
//! no suspension points, freely shareable across threads (the CLI driver's
//! `util::thread_pool` relies on exactly this).

use std::collections::BTreeSet;

use crate::core::index::{window_set, ElementIndex};
use crate::core::parse::Expr;
use crate::core::slice;

pub type MatchSet = BTreeSet<usize>;

/// The active evaluation window: `[lo, hi]` inclusive, rebinding what
/// `First`/`Last` consider the edges. Starts as `[0, length - 1]` for a
/// whole-sequence evaluation and narrows inside a `Slice`.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub index: &'a ElementIndex,
    pub lo: usize,
    pub hi: usize,
}

impl<'a> Context<'a> {
    pub fn whole(index: &'a ElementIndex) -> Option<Self> {
        if index.is_empty() {
            None
        } else {
            Some(Context {
                index,
                lo: 0,
                hi: index.len() - 1,
            })
        }
    }

    pub fn windowed(index: &'a ElementIndex, lo: usize, hi: usize) -> Self {
        Context { index, lo, hi }
    }

    fn clamp(&self, positions: &[usize]) -> MatchSet {
        positions
            .iter()
            .copied()
            .filter(|p| *p >= self.lo && *p <= self.hi)
            .collect()
    }
}

/// Evaluates `expr` against `ctx`, returning the match set described in
/// spec.md §3's expression-tree semantics table.
pub fn eval(expr: &Expr, ctx: &Context) -> MatchSet {
    match expr {
        Expr::Elem(e) => ctx.clamp(ctx.index.groups_of(e)),
        Expr::InElem(e) => ctx.clamp(ctx.index.in_groups(e)),
        Expr::OutElem(e) => ctx.clamp(ctx.index.out_groups(e)),

        Expr::First(r) => {
            let inner = eval(r, ctx);
            if inner.contains(&ctx.lo) {
                std::iter::once(ctx.lo).collect()
            } else {
                MatchSet::new()
            }
        }
        Expr::Last(r) => {
            let inner = eval(r, ctx);
            if inner.contains(&ctx.hi) {
                std::iter::once(ctx.hi).collect()
            } else {
                MatchSet::new()
            }
        }
        Expr::Not(r) => {
            if eval(r, ctx).is_empty() {
                window_set(ctx.lo, ctx.hi)
            } else {
                MatchSet::new()
            }
        }

        Expr::And(children) => {
            let evaluated: Vec<MatchSet> = children.iter().map(|c| eval(c, ctx)).collect();
            if evaluated.iter().any(|s| s.is_empty()) {
                MatchSet::new()
            } else {
                evaluated.into_iter().fold(MatchSet::new(), |mut acc, s| {
                    acc.extend(s);
                    acc
                })
            }
        }
        Expr::Or(children) => children.iter().fold(MatchSet::new(), |mut acc, c| {
            acc.extend(eval(c, ctx));
            acc
        }),
        Expr::Intersect(children) => {
            let mut iter = children.iter();
            let first = match iter.next() {
                Some(c) => eval(c, ctx),
                None => return MatchSet::new(),
            };
            iter.fold(first, |acc, c| {
                let next = eval(c, ctx);
                acc.intersection(&next).copied().collect()
            })
        }

        Expr::Seq(left, right) => seq(left, right, ctx, false),
        Expr::LooseSeq(left, right) => seq(left, right, ctx, true),

        Expr::Slice(inner, open_left, open_right) => {
            slice::eval_slice(inner, *open_left, *open_right, ctx)
        }
    }
}

/// `Seq`/`LooseSeq` (spec.md §4.3): witnesses are every pair `(i, j)` with
/// `i` from the left side and `j` from the right side satisfying the
/// ordering (`i < j` for strict, `i <= j` for loose); the match set is the
/// union of all such witnesses. Quadratic in the (small, sequence-length
/// bounded) size of the two match sets — spec.md's Non-goals exclude
/// optimizing for huge corpora, so the straightforward, obviously-correct
/// form is preferred over the min/max short-circuit spec.md §4.3 sketches
/// as an optimization.
fn seq(left: &Expr, right: &Expr, ctx: &Context, loose: bool) -> MatchSet {
    let s1 = eval(left, ctx);
    if s1.is_empty() {
        return MatchSet::new();
    }
    let s2 = eval(right, ctx);
    if s2.is_empty() {
        return MatchSet::new();
    }

    let mut result = MatchSet::new();
    for &i in &s1 {
        for &j in &s2 {
            let ordered = if loose { i <= j } else { i < j };
            if ordered {
                result.insert(i);
                result.insert(j);
            }
        }
    }
    result
}

/// Whether `expr` matches `index`'s whole sequence: non-empty iff the
/// evaluator, given the full `[0, length - 1]` window, produces any match.
/// Always false for a zero-length sequence.
pub fn matches(expr: &Expr, index: &ElementIndex) -> bool {
    match Context::whole(index) {
        None => false,
        Some(ctx) => !eval(expr, &ctx).is_empty(),
    }
}
