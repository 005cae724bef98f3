//! Slice evaluation (spec.md §4.4): contiguous sub-sequence windows with
//! open or closed boundaries.
//!
//! spec.md §9 flags the slice-seed rule for compound expressions as
//! under-specified in the original prose and fixes it explicitly; this
//! module implements that fixed algorithm:
//!
//! 1. Find candidate windows. For the common `[X ...]` shape (the slice
//!    body's leftmost subrule is a bare element `X`), candidates are the
//!    maximal contiguous runs of `X` (`core::index::runs_of`). Otherwise,
//!    every contiguous window within the active context is a candidate.
//! 2. Re-evaluate the slice body inside each candidate window (rebinding
//!    `First`/`Last`); keep the window iff that evaluation is non-empty.
//! 3. For every bare `Elem(E)` subrule reachable inside the slice body
//!    (without crossing into a nested `Slice`), apply the requested
//!    boundary: `open_left` rejects the window if `E` occupies position
//!    `a`; `open_right` rejects it if `E` occupies position `b`.
//! 4. The slice's match set is the union of every accepted window's group
//!    indices.

use crate::core::eval::{eval, Context, MatchSet};
use crate::core::parse::Expr;

/// The leftmost bare-element subrule of `expr`, descending through `And`,
/// `Intersect`, `Seq`, and `LooseSeq` (the constructs that have an
/// unambiguous "first" operand). Returns `None` for anything else (e.g. an
/// `Or` at the head), which triggers the general-window fallback.
fn leftmost_elem(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Elem(e) => Some(e.as_str()),
        Expr::And(children) | Expr::Intersect(children) => {
            children.first().and_then(leftmost_elem)
        }
        Expr::Seq(left, _) | Expr::LooseSeq(left, _) => leftmost_elem(left),
        _ => None,
    }
}

/// Collects every bare `Elem(E)` reachable from `expr` without crossing
/// into a nested `Slice` node. These are the subrules boundary constraints
/// apply to (spec.md §4.4 step 3).
fn collect_elems<'a>(expr: &'a Expr, out: &mut Vec<&'a str>) {
    match expr {
        Expr::Elem(e) => out.push(e.as_str()),
        Expr::InElem(_) | Expr::OutElem(_) => {}
        Expr::First(r) | Expr::Last(r) | Expr::Not(r) => collect_elems(r, out),
        Expr::And(children) | Expr::Or(children) | Expr::Intersect(children) => {
            for c in children {
                collect_elems(c, out);
            }
        }
        Expr::Seq(l, r) | Expr::LooseSeq(l, r) => {
            collect_elems(l, out);
            collect_elems(r, out);
        }
        Expr::Slice(..) => {}
    }
}

fn candidate_windows(inner: &Expr, ctx: &Context) -> Vec<(usize, usize)> {
    match leftmost_elem(inner) {
        Some(head) => crate::core::index::runs_of(ctx.index, head)
            .into_iter()
            .filter_map(|(s, e)| {
                let a = s.max(ctx.lo);
                let b = e.min(ctx.hi);
                if a <= b {
                    Some((a, b))
                } else {
                    None
                }
            })
            .collect(),
        None => {
            let mut windows = Vec::new();
            for a in ctx.lo..=ctx.hi {
                for b in a..=ctx.hi {
                    windows.push((a, b));
                }
            }
            windows
        }
    }
}

pub fn eval_slice(inner: &Expr, open_left: bool, open_right: bool, ctx: &Context) -> MatchSet {
    let mut elems = Vec::new();
    collect_elems(inner, &mut elems);

    let mut result = MatchSet::new();

    for (a, b) in candidate_windows(inner, ctx) {
        let window_ctx = Context::windowed(ctx.index, a, b);
        if eval(inner, &window_ctx).is_empty() {
            continue;
        }

        if open_left && elems.iter().any(|e| ctx.index.groups_of(e).contains(&a)) {
            continue;
        }
        if open_right && elems.iter().any(|e| ctx.index.groups_of(e).contains(&b)) {
            continue;
        }

        result.extend(a..=b);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::ElementIndex;
    use crate::core::input::parse_sequence_line;
    use crate::core::parse::parse;

    fn index_for(line: &str) -> ElementIndex {
        ElementIndex::build(&parse_sequence_line(line, 0).unwrap())
    }

    #[test]
    fn closed_slice_of_bare_element_matches_its_runs() {
        // A occupies groups 1 and 2 only.
        let index = index_for("B -1 A -1 A -1 C -2");
        let ctx = Context::whole(&index).unwrap();
        let expr = parse("[A]").unwrap();
        let Expr::Slice(inner, ol, or) = &expr else { panic!() };
        let result = eval_slice(inner, *ol, *or, &ctx);
        assert_eq!(result, [1usize, 2].into_iter().collect());
    }

    #[test]
    fn open_left_excludes_runs_touching_the_window_start() {
        // A run from 0..=2; an open-left slice on a bare element can never
        // match there since the element itself occupies the run's start.
        let index = index_for("A -1 A -1 A -1 B -2");
        let ctx = Context::whole(&index).unwrap();
        let expr = parse("{A]").unwrap();
        let Expr::Slice(inner, ol, or) = &expr else { panic!() };
        let result = eval_slice(inner, *ol, *or, &ctx);
        assert!(result.is_empty());
    }

    #[test]
    fn compound_head_falls_back_to_general_window_search() {
        // [(A|B) C]: leftmost subrule is an Or, so every contiguous window
        // is a candidate rather than just the runs of one element.
        let index = index_for("A -1 C -1 B -2");
        let ctx = Context::whole(&index).unwrap();
        let expr = parse("[(A|B) C]").unwrap();
        let Expr::Slice(inner, ol, or) = &expr else { panic!() };
        let result = eval_slice(inner, *ol, *or, &ctx);
        // Window [0,1] satisfies (A|B) at 0 and C at 1.
        assert!(result.contains(&0));
        assert!(result.contains(&1));
    }
}
