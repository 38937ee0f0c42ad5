//! The semantic value built by the test grammars.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    Leaf(String),
    Node(String, Vec<Ast>),
}

impl Ast {
    pub fn node<I>(label: &str, children: I) -> Self
    where
        I: IntoIterator<Item = Ast>,
    {
        Self::Node(label.to_owned(), children.into_iter().collect())
    }
}

impl From<String> for Ast {
    fn from(lexeme: String) -> Self {
        Self::Leaf(lexeme)
    }
}

// `(label child1 child2 ...)`
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(lexeme) => f.write_str(lexeme),
            Self::Node(label, children) => {
                write!(f, "({}", label)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}
