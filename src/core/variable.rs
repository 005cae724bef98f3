//! Variable Enumerator (spec.md §4.5): variable declarations, domain
//! universes, injective bindings, and tree substitution.

use std::collections::BTreeSet;
use std::{error, fmt};

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::parse::Expr;
use crate::core::sequence::Corpus;

lazy_static! {
    /// `NAME`, `NAME~A,B,C`, or `NAME:A,B,C` (spec.md §6).
    static ref DECL_PATTERN: Regex =
        Regex::new(r"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?:(?P<sep>[~:])(?P<list>.*))?$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    Any,
    Exclude(BTreeSet<String>),
    Include(BTreeSet<String>),
}

impl Domain {
    fn allows(&self, elem: &str) -> bool {
        match self {
            Domain::Any => true,
            Domain::Exclude(set) => !set.contains(elem),
            Domain::Include(set) => set.contains(elem),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub domain: Domain,
}

/// A declaration string did not match `NAME`, `NAME~A,B,C`, or `NAME:A,B,C`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclError {
    pub text: String,
}

impl fmt::Display for DeclError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid variable declaration '{}' (expected NAME, NAME~A,B,C, or NAME:A,B,C)",
            self.text
        )
    }
}

impl error::Error for DeclError {}

pub fn parse_declaration(text: &str) -> Result<Variable, DeclError> {
    let caps = DECL_PATTERN
        .captures(text)
        .ok_or_else(|| DeclError { text: text.to_string() })?;

    let name = caps["name"].to_string();
    let domain = match caps.name("sep").map(|m| m.as_str()) {
        None => Domain::Any,
        Some("~") => Domain::Exclude(split_list(&caps["list"])),
        Some(":") => Domain::Include(split_list(&caps["list"])),
        Some(_) => unreachable!(),
    };

    Ok(Variable { name, domain })
}

fn split_list(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A variable's domain resolved to the empty set at enumeration time
/// (spec.md §7 `DomainError`). Not fatal: the caller reports it and treats
/// the pattern as support 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    pub variable: String,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "variable '{}' has an empty domain", self.variable)
    }
}

impl error::Error for DomainError {}

/// The universe of elements a variable may bind to: the corpus alphabet
/// filtered by its domain rule (spec.md §4.5).
pub fn universe(var: &Variable, corpus: &Corpus) -> BTreeSet<String> {
    corpus
        .alphabet()
        .into_iter()
        .filter(|e| var.domain.allows(e))
        .collect()
}

pub type Binding = Vec<(String, String)>;

/// Enumerates every injective binding of `vars` to their respective
/// universes (no two variables bound to the same element). Returns a
/// `DomainError` for the first variable whose universe is empty; the caller
/// decides how to treat that (spec.md: support 0 for the whole pattern).
pub fn enumerate_bindings(
    vars: &[Variable],
    corpus: &Corpus,
) -> Result<Vec<Binding>, DomainError> {
    let universes: Vec<BTreeSet<String>> = vars
        .iter()
        .map(|v| universe(v, corpus))
        .collect::<Vec<_>>();

    for (var, u) in vars.iter().zip(&universes) {
        if u.is_empty() {
            return Err(DomainError { variable: var.name.clone() });
        }
    }

    let mut results = Vec::new();
    let mut current: Binding = Vec::new();
    backtrack(vars, &universes, 0, &mut current, &mut results);
    Ok(results)
}

fn backtrack(
    vars: &[Variable],
    universes: &[BTreeSet<String>],
    depth: usize,
    current: &mut Binding,
    results: &mut Vec<Binding>,
) {
    if depth == vars.len() {
        results.push(current.clone());
        return;
    }

    for candidate in &universes[depth] {
        if current.iter().any(|(_, e)| e == candidate) {
            continue;
        }
        current.push((vars[depth].name.clone(), candidate.clone()));
        backtrack(vars, universes, depth + 1, current, results);
        current.pop();
    }
}

/// Substitutes every free occurrence of a bound variable name with its
/// element, producing a fresh tree (spec.md §9: "produce a fresh tree
/// rather than mutating"). Rewrites `InElem`/`OutElem` whose identifier
/// matches the variable name too.
pub fn substitute(expr: &Expr, binding: &Binding) -> Expr {
    let lookup = |name: &str| binding.iter().find(|(v, _)| v == name).map(|(_, e)| e.clone());

    match expr {
        Expr::Elem(name) => Expr::Elem(lookup(name).unwrap_or_else(|| name.clone())),
        Expr::InElem(name) => Expr::InElem(lookup(name).unwrap_or_else(|| name.clone())),
        Expr::OutElem(name) => Expr::OutElem(lookup(name).unwrap_or_else(|| name.clone())),
        Expr::First(r) => Expr::First(Box::new(substitute(r, binding))),
        Expr::Last(r) => Expr::Last(Box::new(substitute(r, binding))),
        Expr::Not(r) => Expr::Not(Box::new(substitute(r, binding))),
        Expr::And(children) => Expr::And(children.iter().map(|c| substitute(c, binding)).collect()),
        Expr::Or(children) => Expr::Or(children.iter().map(|c| substitute(c, binding)).collect()),
        Expr::Intersect(children) => {
            Expr::Intersect(children.iter().map(|c| substitute(c, binding)).collect())
        }
        Expr::Seq(l, r) => Expr::Seq(Box::new(substitute(l, binding)), Box::new(substitute(r, binding))),
        Expr::LooseSeq(l, r) => {
            Expr::LooseSeq(Box::new(substitute(l, binding)), Box::new(substitute(r, binding)))
        }
        Expr::Slice(inner, ol, or) => {
            Expr::Slice(Box::new(substitute(inner, binding)), *ol, *or)
        }
    }
}

/// The free variable names referenced anywhere in `expr` (as bare `Elem`,
/// `InElem`, or `OutElem` identifiers) that are also declared in `vars`.
pub fn free_variables_in(expr: &Expr, vars: &[Variable]) -> BTreeSet<String> {
    let declared: BTreeSet<&str> = vars.iter().map(|v| v.name.as_str()).collect();
    let mut found = BTreeSet::new();
    collect_names(expr, &mut found);
    found.retain(|name| declared.contains(name.as_str()));
    found
}

fn collect_names(expr: &Expr, out: &mut BTreeSet<String>) {
    match expr {
        Expr::Elem(name) | Expr::InElem(name) | Expr::OutElem(name) => {
            out.insert(name.clone());
        }
        Expr::First(r) | Expr::Last(r) | Expr::Not(r) => collect_names(r, out),
        Expr::And(children) | Expr::Or(children) | Expr::Intersect(children) => {
            for c in children {
                collect_names(c, out);
            }
        }
        Expr::Seq(l, r) | Expr::LooseSeq(l, r) => {
            collect_names(l, out);
            collect_names(r, out);
        }
        Expr::Slice(inner, ..) => collect_names(inner, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_domain() {
        let v = parse_declaration("x").unwrap();
        assert_eq!(v.name, "x");
        assert_eq!(v.domain, Domain::Any);
    }

    #[test]
    fn parses_exclude_domain() {
        let v = parse_declaration("x~A,B").unwrap();
        assert_eq!(
            v.domain,
            Domain::Exclude(["A".to_string(), "B".to_string()].into_iter().collect())
        );
    }

    #[test]
    fn parses_include_domain() {
        let v = parse_declaration("x:A,B").unwrap();
        assert_eq!(
            v.domain,
            Domain::Include(["A".to_string(), "B".to_string()].into_iter().collect())
        );
    }

    #[test]
    fn rejects_malformed_declaration() {
        assert!(parse_declaration("1x").is_err());
    }

    #[test]
    fn bindings_are_injective() {
        let corpus = crate::core::input::parse_corpus("A -1 B -1 C -2\n").unwrap();
        let vars = vec![
            Variable { name: "x".to_string(), domain: Domain::Any },
            Variable { name: "y".to_string(), domain: Domain::Any },
        ];
        let bindings = enumerate_bindings(&vars, &corpus).unwrap();
        assert_eq!(bindings.len(), 6); // 3 * 2 permutations
        for binding in &bindings {
            assert_ne!(binding[0].1, binding[1].1);
        }
    }

    #[test]
    fn empty_domain_is_a_domain_error() {
        let corpus = crate::core::input::parse_corpus("A -2\n").unwrap();
        let vars = vec![Variable {
            name: "x".to_string(),
            domain: Domain::Include(BTreeSet::new()),
        }];
        assert!(enumerate_bindings(&vars, &corpus).is_err());
    }

    #[test]
    fn substitution_rewrites_in_and_out() {
        let expr = crate::core::parse::parse("Inx").unwrap();
        let binding: Binding = vec![("x".to_string(), "A".to_string())];
        assert_eq!(substitute(&expr, &binding), crate::core::parse::parse("InA").unwrap());
    }
}
