//! An arithmetic calculator built on an attribute grammar.

pub mod lexer;
pub mod syntax;

use crate::syntax::{BinOp, Expr, Value};
use attrlr::{
    attribute::{AttrArgs, Attributes},
    derivation::left_parse,
    eval::{evaluate_bottom_up, evaluate_top_down},
    grammar::{Grammar, GrammarDef, GrammarError, SymbolID::*},
    runtime::parser::Parser,
    table::ParseTable,
};

fn take(args: &mut AttrArgs<'_, Value>, index: usize) -> Expr {
    args.take_synthesized(index)
        .map_or(Expr::Error, Value::into_expr)
}

fn binary(op: BinOp) -> Attributes<Value> {
    Attributes::synthesized(move |args| {
        Value::Expr(Expr::binary(op, take(args, 1), take(args, 3)))
    })
}

fn pass(index: usize) -> Attributes<Value> {
    Attributes::synthesized(move |args| Value::Expr(take(args, index)))
}

/// `E -> E + T | E - T | T ; T -> T * F | T / F | F ; F -> num | ( E ) | - F`
pub fn define(g: &mut GrammarDef<Value>) -> Result<(), GrammarError> {
    let lparen = g.terminal("LPAREN")?;
    let rparen = g.terminal("RPAREN")?;
    let plus = g.terminal("PLUS")?;
    let minus = g.terminal("MINUS")?;
    let star = g.terminal("STAR")?;
    let slash = g.terminal("SLASH")?;
    let num = g.terminal("NUM")?;

    let expr = g.nonterminal("EXPR")?;
    let term = g.nonterminal("TERM")?;
    let factor = g.nonterminal("FACTOR")?;

    g.start_symbol(expr)?;

    g.production(expr, [N(expr), T(plus), N(term)], binary(BinOp::Add))?;
    g.production(expr, [N(expr), T(minus), N(term)], binary(BinOp::Sub))?;
    g.production(expr, [N(term)], pass(1))?;

    g.production(term, [N(term), T(star), N(factor)], binary(BinOp::Mul))?;
    g.production(term, [N(term), T(slash), N(factor)], binary(BinOp::Div))?;
    g.production(term, [N(factor)], pass(1))?;

    g.production(factor, [T(num)], pass(1))?;
    g.production(factor, [T(lparen), N(expr), T(rparen)], pass(2))?;
    g.production(
        factor,
        [T(minus), N(factor)],
        Attributes::synthesized(|args| {
            Value::Expr(Expr::Neg {
                expr: Box::new(take(args, 2)),
            })
        }),
    )?;

    Ok(())
}

/// The order in which the attributes are evaluated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Evaluation {
    #[default]
    BottomUp,
    TopDown,
}

/// The compiled grammar and its parse table.
#[derive(Debug)]
pub struct Calculator {
    grammar: Grammar<Value>,
    table: ParseTable,
}

impl Calculator {
    pub fn new() -> anyhow::Result<Self> {
        let grammar = Grammar::define(define)?;
        let table = ParseTable::compile(&grammar)?;
        if !table.conflicts().is_empty() {
            anyhow::bail!("the arithmetic grammar is not LR(1)");
        }
        Ok(Self { grammar, table })
    }

    pub fn grammar(&self) -> &Grammar<Value> {
        &self.grammar
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    /// Parse `input` and build its expression tree.
    pub fn parse(&self, input: &str, evaluation: Evaluation) -> anyhow::Result<Expr> {
        let tokens = lexer::tokenize(&self.grammar, input)?;
        let output = Parser::new(&self.table).parse(&tokens)?;

        let value = match evaluation {
            Evaluation::BottomUp => {
                evaluate_bottom_up(&self.grammar, &output.reductions, &output.operations, &tokens)?
            }
            Evaluation::TopDown => {
                let derivation = left_parse(&self.grammar, &output.reductions)?;
                evaluate_top_down(&self.grammar, &derivation, &tokens)?
            }
        };

        value
            .map(Value::into_expr)
            .ok_or_else(|| anyhow::anyhow!("the input has no value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_evaluations_agree() {
        let calc = Calculator::new().unwrap();
        for (input, expected, value) in [
            ("1 + 2 * 3", "(+ 1 (* 2 3))", 7),
            ("-(4 - 6) / 2", "(/ (neg (- 4 6)) 2)", 1),
            ("2 * -3 - 1", "(- (* 2 (neg 3)) 1)", -7),
        ] {
            for evaluation in [Evaluation::BottomUp, Evaluation::TopDown] {
                let expr = calc.parse(input, evaluation).unwrap();
                assert_eq!(expr.to_string(), expected);
                assert_eq!(expr.eval(), Some(value));
            }
        }
    }

    #[test]
    fn errors() {
        let calc = Calculator::new().unwrap();
        let err = calc.parse("1 +", Evaluation::BottomUp).unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error near token `$' at line 1, column 4"
        );
        assert!(calc.parse("1 % 2", Evaluation::BottomUp).is_err());
        assert_eq!(calc.parse("1 / 0", Evaluation::BottomUp).unwrap().eval(), None);
    }
}
