//! Grammar definition for integration tests.

use crate::ast::Ast;
use attrlr::{
    attribute::{AttrArgs, Attributes},
    grammar::{GrammarDef, GrammarError, SymbolID::*},
};

fn take(args: &mut AttrArgs<'_, Ast>, index: usize) -> Ast {
    args.take_synthesized(index)
        .unwrap_or_else(|| Ast::Leaf("?".into()))
}

fn inherited(args: &AttrArgs<'_, Ast>) -> Ast {
    args.inherited(0)
        .cloned()
        .unwrap_or_else(|| Ast::Leaf("?".into()))
}

/// `S -> ( S ) | a`
pub fn brackets(g: &mut GrammarDef<Ast>) -> Result<(), GrammarError> {
    let lparen = g.terminal("LPAREN")?;
    let rparen = g.terminal("RPAREN")?;
    let a = g.terminal("A")?;

    let s = g.nonterminal("S")?;

    g.production(
        s,
        [T(lparen), N(s), T(rparen)],
        Attributes::synthesized(|args| Ast::node("()", [take(args, 2)])),
    )?;
    g.production(s, [T(a)], Attributes::synthesized(|args| take(args, 1)))?;

    Ok(())
}

fn binary(op: &'static str) -> Attributes<Ast> {
    Attributes::synthesized(move |args| Ast::node(op, [take(args, 1), take(args, 3)]))
}

/// The left-recursive arithmetic grammar, S-attributed.
pub fn arithmetic(g: &mut GrammarDef<Ast>) -> Result<(), GrammarError> {
    // declare terminal symbols.
    let plus = g.terminal("PLUS")?;
    let minus = g.terminal("MINUS")?;
    let star = g.terminal("STAR")?;
    let slash = g.terminal("SLASH")?;
    let lparen = g.terminal("LPAREN")?;
    let rparen = g.terminal("RPAREN")?;
    let num = g.terminal("NUM")?;

    // declare nonterminal symbols.
    let expr = g.nonterminal("EXPR")?;
    let term = g.nonterminal("TERM")?;
    let factor = g.nonterminal("FACTOR")?;

    g.start_symbol(expr)?;

    g.production(expr, [N(expr), T(plus), N(term)], binary("+"))?;
    g.production(expr, [N(expr), T(minus), N(term)], binary("-"))?;
    g.production(expr, [N(term)], Attributes::synthesized(|args| take(args, 1)))?;

    g.production(term, [N(term), T(star), N(factor)], binary("*"))?;
    g.production(term, [N(term), T(slash), N(factor)], binary("/"))?;
    g.production(term, [N(factor)], Attributes::synthesized(|args| take(args, 1)))?;

    g.production(factor, [T(num)], Attributes::synthesized(|args| take(args, 1)))?;
    g.production(
        factor,
        [T(lparen), N(expr), T(rparen)],
        Attributes::synthesized(|args| take(args, 2)),
    )?;

    Ok(())
}

/// The arithmetic grammar without left recursion, L-attributed.
///
/// The operator tails `X` and `Y` receive the left operand as an inherited
/// value, which keeps the operators left-associative.
pub fn arithmetic_ll(g: &mut GrammarDef<Ast>) -> Result<(), GrammarError> {
    let plus = g.terminal("PLUS")?;
    let minus = g.terminal("MINUS")?;
    let star = g.terminal("STAR")?;
    let slash = g.terminal("SLASH")?;
    let lparen = g.terminal("LPAREN")?;
    let rparen = g.terminal("RPAREN")?;
    let num = g.terminal("NUM")?;

    let e = g.nonterminal("E")?;
    let x = g.nonterminal("X")?;
    let t = g.nonterminal("T")?;
    let y = g.nonterminal("Y")?;
    let f = g.nonterminal("F")?;

    // E -> T X
    g.production(
        e,
        [N(t), N(x)],
        Attributes::synthesized(|args| take(args, 2)).with_inherited(2, |args| take(args, 1)),
    )?;

    // X -> + T X | - T X | ε
    for (op, label) in [(plus, "+"), (minus, "-")] {
        g.production(
            x,
            [T(op), N(t), N(x)],
            Attributes::synthesized(|args| take(args, 3)).with_inherited(3, move |args| {
                Ast::node(label, [inherited(args), take(args, 2)])
            }),
        )?;
    }
    g.production(x, [], Attributes::synthesized(|args| inherited(args)))?;

    // T -> F Y
    g.production(
        t,
        [N(f), N(y)],
        Attributes::synthesized(|args| take(args, 2)).with_inherited(2, |args| take(args, 1)),
    )?;

    // Y -> * F Y | / F Y | ε
    for (op, label) in [(star, "*"), (slash, "/")] {
        g.production(
            y,
            [T(op), N(f), N(y)],
            Attributes::synthesized(|args| take(args, 3)).with_inherited(3, move |args| {
                Ast::node(label, [inherited(args), take(args, 2)])
            }),
        )?;
    }
    g.production(y, [], Attributes::synthesized(|args| inherited(args)))?;

    // F -> num | ( E )
    g.production(f, [T(num)], Attributes::synthesized(|args| take(args, 1)))?;
    g.production(
        f,
        [T(lparen), N(e), T(rparen)],
        Attributes::synthesized(|args| take(args, 2)),
    )?;

    Ok(())
}

/// The dangling-else grammar, which has a shift/reduce conflict on `ELSE`.
pub fn dangling_else(g: &mut GrammarDef<Ast>) -> Result<(), GrammarError> {
    let if_ = g.terminal("IF")?;
    let cond = g.terminal("COND")?;
    let then = g.terminal("THEN")?;
    let else_ = g.terminal("ELSE")?;
    let other = g.terminal("OTHER")?;

    let stmt = g.nonterminal("STMT")?;

    g.production(
        stmt,
        [T(if_), T(cond), T(then), N(stmt)],
        Attributes::synthesized(|args| Ast::node("if", [take(args, 2), take(args, 4)])),
    )?;
    g.production(
        stmt,
        [T(if_), T(cond), T(then), N(stmt), T(else_), N(stmt)],
        Attributes::synthesized(|args| {
            Ast::node("if", [take(args, 2), take(args, 4), take(args, 6)])
        }),
    )?;
    g.production(stmt, [T(other)], Attributes::synthesized(|args| take(args, 1)))?;

    Ok(())
}

/// A grammar whose reduce/reduce conflict is hidden behind a shift/reduce
/// conflict that the reduction wins.
///
/// `T -> ε` is declared first, so after `x` the parser reduces `T` on `y`
/// and never enters `S -> x y . R`, where `RA -> a` and `RB -> a` collide.
pub fn shadowed_conflict(g: &mut GrammarDef<Ast>) -> Result<(), GrammarError> {
    let x = g.terminal("X")?;
    let y = g.terminal("Y")?;
    let a = g.terminal("A")?;
    let plus = g.terminal("PLUS")?;
    let star = g.terminal("STAR")?;
    let lparen = g.terminal("LPAREN")?;
    let rparen = g.terminal("RPAREN")?;
    let num = g.terminal("NUM")?;

    let s = g.nonterminal("S")?;
    let t = g.nonterminal("T")?;
    let r = g.nonterminal("R")?;
    let ra = g.nonterminal("RA")?;
    let rb = g.nonterminal("RB")?;
    let e = g.nonterminal("E")?;
    let f = g.nonterminal("F")?;
    let p = g.nonterminal("P")?;

    g.start_symbol(s)?;

    g.production(t, [], Attributes::new())?;
    g.production(s, [T(x), N(t), T(y), N(e)], Attributes::new())?;
    g.production(s, [T(x), T(y), N(r)], Attributes::new())?;
    g.production(r, [N(ra)], Attributes::new())?;
    g.production(r, [N(rb)], Attributes::new())?;
    g.production(ra, [T(a)], Attributes::new())?;
    g.production(rb, [T(a)], Attributes::new())?;

    g.production(e, [N(e), T(plus), N(f)], Attributes::new())?;
    g.production(e, [N(f)], Attributes::new())?;
    g.production(f, [N(f), T(star), N(p)], Attributes::new())?;
    g.production(f, [N(p)], Attributes::new())?;
    g.production(p, [T(num)], Attributes::new())?;
    g.production(p, [T(lparen), N(e), T(rparen)], Attributes::new())?;

    Ok(())
}
