//! Token streams for the test grammars.

use anyhow::Context as _;
use attrlr::{grammar::Grammar, grammar::TerminalID, runtime::token::Token};
use logos::Logos;

/// Token classes shared by the bracket and arithmetic grammars.
///
/// The extras hold the number of newlines seen so far and the byte offset at
/// which the current line starts.
#[derive(Debug, Copy, Clone, Logos, PartialEq)]
#[logos(extras = (usize, usize))]
#[logos(skip r"[ \t\r\f]+")]
enum Lexeme {
    #[regex(r"\n", newline)]
    Newline,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("a")]
    A,

    #[regex(r"[0-9]+")]
    Num,
}

fn newline(lex: &mut logos::Lexer<Lexeme>) -> logos::Skip {
    lex.extras.0 += 1;
    lex.extras.1 = lex.span().end;
    logos::Skip
}

impl Lexeme {
    fn terminal_name(self) -> &'static str {
        match self {
            Self::Newline => "NEWLINE",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Star => "STAR",
            Self::Slash => "SLASH",
            Self::A => "A",
            Self::Num => "NUM",
        }
    }
}

/// Tokenize `input` for one of the bracket or arithmetic grammars.
///
/// Whitespace is skipped. Every lexeme must name a terminal of `g`. The
/// stream is terminated by an end-of-input token positioned just past the
/// input.
pub fn scan<V>(g: &Grammar<V>, input: &str) -> anyhow::Result<Vec<Token<TerminalID>>> {
    let mut tokens = vec![];
    let mut lexer = Lexeme::lexer(input);

    while let Some(res) = lexer.next() {
        let (lines, line_start) = lexer.extras;
        let (row, col) = (lines + 1, lexer.span().start - line_start + 1);
        let lexeme = res.map_err(|_| {
            anyhow::anyhow!(
                "unexpected character {:?} at {}:{}",
                lexer.slice(),
                row,
                col
            )
        })?;
        let class = terminal(g, lexeme.terminal_name())?;
        tokens.push(Token::new(lexer.slice(), class, row, col));
    }

    let (lines, line_start) = lexer.extras;
    tokens.push(Token::new("$", TerminalID::EOF, lines + 1, input.len() - line_start + 1));
    Ok(tokens)
}

/// Build a token stream from whitespace-separated terminal names.
///
/// The lexeme of each token is the lowercased terminal name.
pub fn words<V>(g: &Grammar<V>, input: &str) -> anyhow::Result<Vec<Token<TerminalID>>> {
    let mut tokens = vec![];
    let mut col = 1;
    for word in input.split(' ') {
        if !word.is_empty() {
            tokens.push(Token::new(word.to_lowercase(), terminal(g, word)?, 1, col));
        }
        col += word.chars().count() + 1;
    }
    tokens.push(Token::new("$", TerminalID::EOF, 1, col));
    Ok(tokens)
}

fn terminal<V>(g: &Grammar<V>, name: &str) -> anyhow::Result<TerminalID> {
    g.terminal_by_name(name)
        .with_context(|| format!("unknown terminal `{}'", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ast::Ast, grammars};

    #[test]
    fn positions() -> anyhow::Result<()> {
        let g = Grammar::<Ast>::define(grammars::arithmetic)?;
        let tokens = scan(&g, "12 +\n  (3)")?;
        let positions: Vec<_> = tokens
            .iter()
            .map(|t| (t.lexeme(), t.row(), t.col()))
            .collect();
        assert_eq!(
            positions,
            [
                ("12", 1, 1),
                ("+", 1, 4),
                ("(", 2, 3),
                ("3", 2, 4),
                (")", 2, 5),
                ("$", 2, 6),
            ]
        );
        Ok(())
    }

    #[test]
    fn rejects_foreign_lexemes() -> anyhow::Result<()> {
        let g = Grammar::<Ast>::define(grammars::brackets)?;
        assert!(scan(&g, "( 1 )").is_err());
        assert!(scan(&g, "( % )").is_err());
        Ok(())
    }
}
