//! Shared fixtures for the integration tests and benchmarks.

pub mod ast;
pub mod grammars;
pub mod input;
