//! The implementation of the shift-reduce parser engine.

use crate::{
    definition::{ParseAction, ParserDef},
    token::Token,
};
use std::fmt;

/// One step recorded in the operation trace.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Shift,
    Reduce,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift => f.write_str("SHIFT"),
            Self::Reduce => f.write_str("REDUCE"),
        }
    }
}

/// The result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput<R> {
    /// The matched productions, in reduction order.
    pub reductions: Vec<R>,
    /// Every shift and reduce performed before the input was accepted.
    pub operations: Vec<Operation>,
}

/// The parser driven based on the compiled parse table.
///
/// A `Parser` holds no per-parse state, so a single instance may serve any
/// number of `parse` calls, including concurrent ones when the definition is
/// shared through `&T` or `Arc<T>`.
#[derive(Debug)]
pub struct Parser<TDef>
where
    TDef: ParserDef,
{
    definition: TDef,
}

impl<TDef> Parser<TDef>
where
    TDef: ParserDef,
{
    /// Create an instance of `Parser` using the specified parse table.
    pub fn new(definition: TDef) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &TDef {
        &self.definition
    }

    /// Run the automaton over `tokens` until it accepts or rejects the input.
    ///
    /// The last token is expected to be of the end-of-input class. The first
    /// lookup without a table entry aborts the whole parse.
    pub fn parse(
        &self,
        tokens: &[Token<TDef::Terminal>],
    ) -> Result<ParseOutput<TDef::Reduce>, ParseError> {
        let span = tracing::trace_span!("parse", tokens = tokens.len());
        let _entered = span.enter();

        let mut run = ParseRun {
            definition: &self.definition,
            state: RunState::Running,
            state_stack: vec![self.definition.initial_state()],
            cursor: 0,
            reductions: vec![],
            operations: vec![],
        };

        loop {
            match run.state {
                RunState::Running => {
                    if let Err(err) = run.step(tokens) {
                        run.state = RunState::Error;
                        return Err(err);
                    }
                }
                RunState::Accepted => {
                    return Ok(ParseOutput {
                        reductions: run.reductions,
                        operations: run.operations,
                    });
                }
                RunState::Error => unreachable!("errored runs return immediately"),
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum RunState {
    Running,
    Accepted,
    Error,
}

/// The transient state of a single `parse` call.
struct ParseRun<'p, TDef>
where
    TDef: ParserDef,
{
    definition: &'p TDef,
    state: RunState,
    state_stack: Vec<TDef::State>,
    cursor: usize,
    reductions: Vec<TDef::Reduce>,
    operations: Vec<Operation>,
}

impl<TDef> ParseRun<'_, TDef>
where
    TDef: ParserDef,
{
    fn step(&mut self, tokens: &[Token<TDef::Terminal>]) -> Result<(), ParseError> {
        let current = self
            .state_stack
            .last()
            .copied()
            .ok_or(ParseError::EmptyStateStack)?;
        let lookahead = tokens
            .get(self.cursor)
            .ok_or(ParseError::UnexpectedEndOfTokens)?;

        tracing::trace!(
            "stack = {:?}, lookahead = {:?}",
            self.state_stack,
            lookahead.class()
        );

        match self.definition.action(current, lookahead.class()) {
            Some(ParseAction::Shift(next)) => {
                tracing::trace!("shift({:?})", next);
                self.operations.push(Operation::Shift);
                self.state_stack.push(next);
                self.cursor += 1;
            }

            Some(ParseAction::Reduce(reduce, lhs, n)) => {
                tracing::trace!("reduce to {:?} ({} symbols)", lhs, n);
                if n >= self.state_stack.len() {
                    return Err(ParseError::EmptyStateStack);
                }
                self.state_stack.truncate(self.state_stack.len() - n);
                let top = self
                    .state_stack
                    .last()
                    .copied()
                    .ok_or(ParseError::EmptyStateStack)?;
                let next = self
                    .definition
                    .goto(top, lhs)
                    .ok_or(ParseError::MissingGoto)?;
                self.state_stack.push(next);
                self.reductions.push(reduce);
                self.operations.push(Operation::Reduce);
            }

            Some(ParseAction::Accept) => {
                tracing::trace!("accept");
                self.state = RunState::Accepted;
            }

            None => {
                return Err(ParseError::Syntax {
                    lexeme: lookahead.lexeme().to_owned(),
                    row: lookahead.row(),
                    col: lookahead.col(),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error near token `{lexeme}' at line {row}, column {col}")]
    Syntax {
        lexeme: String,
        row: usize,
        col: usize,
    },

    #[error("the token stream ended before the input was accepted")]
    UnexpectedEndOfTokens,

    #[error("no goto entry for the reduced nonterminal")]
    MissingGoto,

    #[error("empty state stack")]
    EmptyStateStack,
}

#[cfg(test)]
mod tests {
    use super::*;

    // A hand-written table for `S -> ( S ) | a`.
    //
    // 0: S' -> . S        S -> . ( S )      S -> . a
    // 1: S -> ( . S )     S -> . ( S )      S -> . a
    // 2: S -> a .
    // 3: S' -> S .
    // 4: S -> ( S . )
    // 5: S -> ( S ) .
    #[derive(Debug)]
    struct Brackets;

    #[derive(Debug, Copy, Clone, PartialEq)]
    enum T {
        LParen,
        RParen,
        A,
        Eof,
    }

    const PAREN: u8 = 1;
    const ATOM: u8 = 2;

    impl ParserDef for Brackets {
        type State = u8;
        type Terminal = T;
        type Nonterminal = ();
        type Reduce = u8;

        fn initial_state(&self) -> u8 {
            0
        }

        fn action(&self, current: u8, lookahead: T) -> Option<ParseAction<u8, (), u8>> {
            use ParseAction::*;
            match (current, lookahead) {
                (0 | 1, T::LParen) => Some(Shift(1)),
                (0 | 1, T::A) => Some(Shift(2)),
                (2, T::RParen | T::Eof) => Some(Reduce(ATOM, (), 1)),
                (3, T::Eof) => Some(Accept),
                (4, T::RParen) => Some(Shift(5)),
                (5, T::RParen | T::Eof) => Some(Reduce(PAREN, (), 3)),
                _ => None,
            }
        }

        fn goto(&self, current: u8, _: ()) -> Option<u8> {
            match current {
                0 => Some(3),
                1 => Some(4),
                _ => None,
            }
        }
    }

    fn tokens(classes: &[T]) -> Vec<Token<T>> {
        classes
            .iter()
            .enumerate()
            .map(|(i, class)| {
                let lexeme = match class {
                    T::LParen => "(",
                    T::RParen => ")",
                    T::A => "a",
                    T::Eof => "$",
                };
                Token::new(lexeme, *class, 1, 2 * i + 1)
            })
            .collect()
    }

    #[test]
    fn accepts_nested_brackets() {
        let parser = Parser::new(Brackets);
        let output = parser
            .parse(&tokens(&[T::LParen, T::A, T::RParen, T::Eof]))
            .unwrap();
        assert_eq!(output.reductions, [ATOM, PAREN]);
        assert_eq!(
            output.operations,
            [
                Operation::Shift,
                Operation::Shift,
                Operation::Reduce,
                Operation::Shift,
                Operation::Reduce,
            ]
        );
    }

    #[test]
    fn reports_offending_token() {
        let parser = Parser::new(Brackets);
        let err = parser
            .parse(&tokens(&[T::LParen, T::A, T::Eof]))
            .unwrap_err();
        match err {
            ParseError::Syntax { lexeme, row, col } => {
                assert_eq!(lexeme, "$");
                assert_eq!((row, col), (1, 5));
            }
            err => panic!("unexpected error: {}", err),
        }
    }

    #[test]
    fn missing_end_of_input() {
        let parser = Parser::new(Brackets);
        let err = parser.parse(&tokens(&[T::LParen, T::A])).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEndOfTokens));
    }

    #[test]
    fn shared_definition() {
        let parser = Parser::new(std::sync::Arc::new(Brackets));
        let input = tokens(&[T::A, T::Eof]);
        let first = parser.parse(&input).unwrap();
        let second = parser.parse(&input).unwrap();
        assert_eq!(first, second);
    }
}
