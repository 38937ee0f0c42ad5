//! Attribute evaluation over the output of the parser.

use crate::{
    attribute::AttrArgs,
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID},
};
use attrlr_runtime::{parser::Operation, token::Token};

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("the production {production:?} has inherited attributes")]
    NotSAttributed { production: ProductionID },

    #[error("the production {production:?} is not part of the grammar")]
    UnknownProduction { production: ProductionID },

    #[error("the derivation ended before the input was covered")]
    DerivationExhausted,

    #[error("expected a production of {expected:?}, found {found:?}")]
    DerivationMismatch {
        expected: NonterminalID,
        found: ProductionID,
    },

    #[error("the token `{lexeme}' at line {row}, column {col} is not a {expected:?}")]
    TokenMismatch {
        expected: TerminalID,
        lexeme: String,
        row: usize,
        col: usize,
    },

    #[error("the token stream ended before the end of input")]
    TokensExhausted,

    #[error("unconsumed tokens remain before the end of input")]
    TrailingTokens,

    #[error("the reduction trace ended before the operation trace")]
    ReductionsExhausted,

    #[error("{len} reductions remain after the operation trace")]
    TrailingReductions { len: usize },

    #[error("the value stack holds {len} values")]
    ValueStack { len: usize },

    #[error("the reduction trace does not form a single tree ({len} roots)")]
    UnbalancedReductions { len: usize },
}

/// Evaluate an L-attributed grammar over a leftmost derivation.
///
/// Terminals take the lexeme of the next token as their synthesized value.
/// Before descending into a nonterminal, the inherited rule of its position
/// is evaluated and passed down as the inherited value of the child's head.
pub fn evaluate_top_down<V>(
    g: &Grammar<V>,
    left_parse: &[ProductionID],
    tokens: &[Token<TerminalID>],
) -> Result<Option<V>, EvalError>
where
    V: From<String> + Clone,
{
    let (&first, rest) = match left_parse.split_first() {
        Some(split) if !tokens.is_empty() => split,
        _ => return Ok(None),
    };

    let mut evaluator = TopDown {
        grammar: g,
        derivation: rest.iter(),
        tokens: tokens.iter(),
    };
    let value = evaluator.evaluate(first, None)?;

    match evaluator.tokens.next() {
        Some(token) if token.class() == TerminalID::EOF => Ok(value),
        Some(..) => Err(EvalError::TrailingTokens),
        None => Err(EvalError::TokensExhausted),
    }
}

struct TopDown<'a, V> {
    grammar: &'a Grammar<V>,
    derivation: std::slice::Iter<'a, ProductionID>,
    tokens: std::slice::Iter<'a, Token<TerminalID>>,
}

impl<V> TopDown<'_, V>
where
    V: From<String> + Clone,
{
    fn evaluate(
        &mut self,
        production: ProductionID,
        inherited_value: Option<V>,
    ) -> Result<Option<V>, EvalError> {
        let production = self
            .grammar
            .production(production)
            .ok_or(EvalError::UnknownProduction { production })?;
        let attributes = production.attributes();

        let len = production.body().len() + 1;
        let mut inherited: Vec<Option<V>> = vec![None; len];
        let mut synthesized: Vec<Option<V>> = vec![None; len];
        inherited[0] = inherited_value;

        for (i, symbol) in production.body().iter().enumerate().map(|(i, s)| (i + 1, s)) {
            match *symbol {
                SymbolID::T(expected) => {
                    let token = self.tokens.next().ok_or(EvalError::TokensExhausted)?;
                    if token.class() != expected {
                        return Err(EvalError::TokenMismatch {
                            expected,
                            lexeme: token.lexeme().to_owned(),
                            row: token.row(),
                            col: token.col(),
                        });
                    }
                    synthesized[i] = Some(V::from(token.lexeme().to_owned()));
                }
                SymbolID::N(expected) => {
                    let next = *self
                        .derivation
                        .next()
                        .ok_or(EvalError::DerivationExhausted)?;
                    match self.grammar.production(next) {
                        Some(p) if p.head() == expected => (),
                        _ => {
                            return Err(EvalError::DerivationMismatch {
                                expected,
                                found: next,
                            })
                        }
                    }

                    if let Some(rule) = attributes.get(i) {
                        let value = rule(&mut AttrArgs::new(&mut inherited, &mut synthesized));
                        inherited[i] = Some(value);
                    }
                    synthesized[i] = self.evaluate(next, inherited[i].clone())?;
                }
            }
        }

        Ok(attributes
            .head()
            .map(|rule| rule(&mut AttrArgs::new(&mut inherited, &mut synthesized))))
    }
}

/// Evaluate an S-attributed grammar over the traces of a bottom-up parse.
///
/// Every shift pushes the lexeme of the token, and every reduction replaces
/// the values of the body with the result of the head rule. A production
/// without a head rule yields no value.
pub fn evaluate_bottom_up<V>(
    g: &Grammar<V>,
    reductions: &[ProductionID],
    operations: &[Operation],
    tokens: &[Token<TerminalID>],
) -> Result<Option<V>, EvalError>
where
    V: From<String>,
{
    if reductions.is_empty() || operations.is_empty() || tokens.is_empty() {
        return Ok(None);
    }

    for &id in reductions {
        let production = g
            .production(id)
            .ok_or(EvalError::UnknownProduction { production: id })?;
        if !production.attributes().is_s_attributed() {
            return Err(EvalError::NotSAttributed { production: id });
        }
    }

    let mut reductions = reductions.iter();
    let mut tokens = tokens.iter();
    let mut stack: Vec<Option<V>> = vec![];

    for operation in operations {
        match operation {
            Operation::Shift => {
                let token = tokens.next().ok_or(EvalError::TokensExhausted)?;
                stack.push(Some(V::from(token.lexeme().to_owned())));
            }
            Operation::Reduce => {
                let &id = reductions.next().ok_or(EvalError::ReductionsExhausted)?;
                let production = g
                    .production(id)
                    .ok_or(EvalError::UnknownProduction { production: id })?;
                let n = production.body().len();
                if stack.len() < n {
                    return Err(EvalError::ValueStack { len: stack.len() });
                }

                let mut synthesized: Vec<Option<V>> = Some(None)
                    .into_iter()
                    .chain(stack.drain(stack.len() - n..))
                    .collect();
                let mut inherited: Vec<Option<V>> = (0..=n).map(|_| None).collect();

                let value = production
                    .attributes()
                    .head()
                    .map(|rule| rule(&mut AttrArgs::new(&mut inherited, &mut synthesized)));
                tracing::trace!("reduce {}", production.display(g));
                stack.push(value);
            }
        }
    }

    if !reductions.as_slice().is_empty() {
        return Err(EvalError::TrailingReductions {
            len: reductions.len(),
        });
    }
    if stack.len() != 1 {
        return Err(EvalError::ValueStack { len: stack.len() });
    }
    match tokens.next() {
        Some(token) if token.class() == TerminalID::EOF => Ok(stack.pop().flatten()),
        Some(..) => Err(EvalError::TrailingTokens),
        None => Err(EvalError::TokensExhausted),
    }
}
