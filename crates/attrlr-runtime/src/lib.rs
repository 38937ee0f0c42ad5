//! Runtime implementation for the `attrlr` parser generator.
//!
//! This crate knows nothing about grammars. It drives any table that
//! implements [`ParserDef`](definition::ParserDef) over a slice of
//! [`Token`](token::Token)s.

pub mod definition;
pub mod parser;
pub mod token;
