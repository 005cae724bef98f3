//! `patterncounter`: counts occurrences of DSL patterns over sequences of
//! itemsets (spec.md §1). The `core` module is the engine (lexer, parser,
//! element index, evaluator, variable enumerator, statistics aggregator);
//! `cli` is the surrounding driver, reusing the core's pure evaluation
//! functions from worker threads via `core::util::thread_pool`.

#[macro_use]
extern crate lazy_static;

pub mod cli;
pub mod core;
pub mod error;

pub use crate::error::Error;
