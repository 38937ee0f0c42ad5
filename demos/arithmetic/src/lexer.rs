use attrlr::{
    grammar::{Grammar, TerminalID},
    runtime::token::Token,
};
use logos::Logos;

#[derive(Debug, Copy, Clone, Logos, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Lexeme {
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

    #[regex(r"[0-9]+")]
    Num,
}

impl Lexeme {
    /// The name of the terminal symbol this lexeme is classified as.
    pub fn terminal_name(self) -> &'static str {
        match self {
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Star => "STAR",
            Self::Slash => "SLASH",
            Self::Num => "NUM",
        }
    }
}

/// Tokenize `input` against the terminals of `g`.
///
/// The returned stream always ends with an end-of-input token `$`.
pub fn tokenize<V>(g: &Grammar<V>, input: &str) -> anyhow::Result<Vec<Token<TerminalID>>> {
    let lines = LineIndex::new(input);
    let mut tokens = vec![];

    let mut lexer = Lexeme::lexer(input);
    while let Some(res) = lexer.next() {
        let (row, col) = lines.position(input, lexer.span().start);
        let lexeme = res.map_err(|_| {
            anyhow::anyhow!(
                "unexpected character `{}' at line {}, column {}",
                lexer.slice(),
                row,
                col
            )
        })?;
        let class = g
            .terminal_by_name(lexeme.terminal_name())
            .ok_or_else(|| anyhow::anyhow!("unknown terminal `{}'", lexeme.terminal_name()))?;
        tokens.push(Token::new(lexer.slice(), class, row, col));
    }

    let (row, col) = lines.position(input, input.len());
    tokens.push(Token::new("$", TerminalID::EOF, row, col));

    Ok(tokens)
}

struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(input: &str) -> Self {
        let starts = Some(0)
            .into_iter()
            .chain(input.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// One-based line and column of the byte offset `pos`.
    fn position(&self, input: &str, pos: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= pos) - 1;
        let col = input[self.starts[line]..pos].chars().count() + 1;
        (line + 1, col)
    }
}
