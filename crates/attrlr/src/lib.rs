//! An LR(1) parser generator with attribute-grammar evaluation.
//!
//! A grammar is declared with [`Grammar::define`](grammar::Grammar::define),
//! compiled into a [`ParseTable`](table::ParseTable), driven over a token
//! stream by the engine in [`runtime`], and the resulting trace is evaluated
//! into a semantic value by the functions in [`eval`].

pub mod attribute;
pub mod derivation;
pub mod eval;
pub mod first_sets;
pub mod grammar;
pub mod lr1;
pub mod table;
pub mod types;
pub mod util;
pub mod witness;

pub use attrlr_runtime as runtime;
