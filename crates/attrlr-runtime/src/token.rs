//! Input tokens.

use std::fmt;

/// A token produced by an external lexer.
///
/// `class` is the terminal symbol the token is an instance of. Tokens are
/// immutable once created; the parser only reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T> {
    lexeme: String,
    class: T,
    row: usize,
    col: usize,
}

impl<T: Copy> Token<T> {
    pub fn new(lexeme: impl Into<String>, class: T, row: usize, col: usize) -> Self {
        Self {
            lexeme: lexeme.into(),
            class,
            row,
            col,
        }
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn class(&self) -> T {
        self.class
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

impl<T: fmt::Debug> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} `{}' ({}:{})",
            self.class, self.lexeme, self.row, self.col
        )
    }
}
