//! Grammar types.

use crate::{attribute::Attributes, types::Map, util::display_fn};
use std::{fmt, hash::Hash};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalID(u16);
impl TerminalID {
    /// Reserved symbol used as a terminal symbol that means the end of input.
    pub const EOF: Self = Self(0);

    const OFFSET: u16 = 1;

    pub const fn raw(self) -> u16 {
        self.0
    }
}
impl fmt::Debug for TerminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EOF => write!(f, "T#EOF"),
            _ => write!(f, "T#{:03}", self.0),
        }
    }
}

/// A set of terminal symbols.
#[derive(Default, Clone)]
pub struct TerminalSet {
    inner: bit_set::BitSet,
}
impl TerminalSet {
    pub fn contains(&self, id: TerminalID) -> bool {
        self.inner.contains(id.0.into())
    }
    pub fn insert(&mut self, id: TerminalID) -> bool {
        self.inner.insert(id.0.into())
    }
    pub fn union_with(&mut self, other: &Self) {
        self.inner.union_with(&other.inner)
    }
    pub fn is_subset(&self, other: &Self) -> bool {
        self.inner.is_subset(&other.inner)
    }
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
    pub fn len(&self) -> usize {
        self.inner.len()
    }
    pub fn iter(&self) -> impl Iterator<Item = TerminalID> + '_ {
        // Only ids built from a `u16` are ever inserted.
        self.inner.iter().map(|raw| TerminalID(raw as u16))
    }
}
impl PartialEq for TerminalSet {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}
impl Eq for TerminalSet {}
impl Hash for TerminalSet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for t in self.iter() {
            t.hash(state);
        }
    }
}
impl fmt::Debug for TerminalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
impl FromIterator<TerminalID> for TerminalSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = TerminalID>,
    {
        Self {
            inner: iter.into_iter().map(|t| t.0.into()).collect(),
        }
    }
}

#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    name: String,
}
impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonterminalID(u16);
impl NonterminalID {
    /// Reserved symbol used as the augmented start symbol.
    pub const START: Self = Self(0);

    const OFFSET: u16 = 1;

    pub const fn raw(self) -> u16 {
        self.0
    }
}
impl fmt::Debug for NonterminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::START => write!(f, "N#Start"),
            _ => write!(f, "N#{:03}", self.0),
        }
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    name: String,
}
impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionID(u16);
impl ProductionID {
    /// The augmenting production `$start := S`.
    pub const ACCEPT: Self = Self(0);

    const OFFSET: u16 = 1;

    pub const fn raw(self) -> u16 {
        self.0
    }
}
impl fmt::Debug for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ACCEPT => write!(f, "P#Accept"),
            _ => write!(f, "P#{:03}", self.0),
        }
    }
}

/// A production rule, together with its attribute rules.
#[derive(Debug)]
pub struct Production<V> {
    id: ProductionID,
    head: NonterminalID,
    body: Vec<SymbolID>,
    attributes: Attributes<V>,
}
impl<V> Production<V> {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn head(&self) -> NonterminalID {
        self.head
    }

    /// Return the right-hand side of this production.
    pub fn body(&self) -> &[SymbolID] {
        &self.body[..]
    }

    pub fn attributes(&self) -> &Attributes<V> {
        &self.attributes
    }

    // `"HEAD := A b C"`
    pub fn display<'g>(&'g self, g: &'g Grammar<V>) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(f, "{} :=", g.nonterminals[&self.head])?;
            if self.body.is_empty() {
                write!(f, " ε")?;
            }
            for symbol in &self.body {
                write!(f, " {}", g.symbol_name(*symbol))?;
            }
            Ok(())
        })
    }
}

/// The grammar definition used to derive the parser tables.
///
/// `V` is the type of the semantic values computed by the attribute rules.
#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar<V = ()> {
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub productions: Map<ProductionID, Production<V>>,
    pub start_symbol: NonterminalID,
}

impl<V> fmt::Display for Grammar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            writeln!(f, "{}", terminal)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{}", nonterminal)?;
            if nonterminal.id() == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## productions:")?;
        for production in self.productions.values() {
            writeln!(f, "{}", production.display(self))?;
        }

        Ok(())
    }
}

impl<V> Grammar<V> {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef<V>) -> Result<(), GrammarError>,
    {
        let mut def = GrammarDef {
            terminals: Map::default(),
            nonterminals: Map::default(),
            productions: Map::default(),
            start: None,
            next_terminal_id: TerminalID::OFFSET,
            next_nonterminal_id: NonterminalID::OFFSET,
            next_production_id: ProductionID::OFFSET,
        };

        def.terminals.insert(
            TerminalID::EOF,
            Terminal {
                id: TerminalID::EOF,
                name: "$eof".into(),
            },
        );
        def.nonterminals.insert(
            NonterminalID::START,
            Nonterminal {
                id: NonterminalID::START,
                name: "$start".into(),
            },
        );
        // The body is filled in once the start symbol is known.
        def.productions.insert(
            ProductionID::ACCEPT,
            Production {
                id: ProductionID::ACCEPT,
                head: NonterminalID::START,
                body: vec![],
                attributes: Attributes::new(),
            },
        );

        f(&mut def)?;

        def.end()
    }

    pub fn production(&self, id: ProductionID) -> Option<&Production<V>> {
        self.productions.get(&id)
    }

    /// Iterate over the productions whose head is `head`, in declaration order.
    pub fn productions_of(&self, head: NonterminalID) -> impl Iterator<Item = &Production<V>> + '_ {
        self.productions.values().filter(move |p| p.head == head)
    }

    pub fn terminal_by_name(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .values()
            .find(|t| t.name == name)
            .map(|t| t.id)
    }

    pub fn nonterminal_by_name(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .values()
            .find(|n| n.name == name)
            .map(|n| n.id)
    }

    pub fn symbol_name(&self, symbol: SymbolID) -> &str {
        match symbol {
            SymbolID::T(t) => self.terminals.get(&t).map_or("<unknown>", |t| t.name()),
            SymbolID::N(n) => self.nonterminals.get(&n).map_or("<unknown>", |n| n.name()),
        }
    }
}

/// The contextual values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef<V> {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    productions: Map<ProductionID, Production<V>>,
    start: Option<NonterminalID>,
    next_terminal_id: u16,
    next_nonterminal_id: u16,
    next_production_id: u16,
}

impl<V> GrammarDef<V> {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(&mut self, name: &str) -> Result<TerminalID, GrammarError> {
        self.verify_name(name)?;

        let id = TerminalID(self.next_terminal_id);
        self.next_terminal_id += 1;
        self.terminals.insert(
            id,
            Terminal {
                id,
                name: name.to_owned(),
            },
        );

        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarError> {
        self.verify_name(name)?;

        let id = NonterminalID(self.next_nonterminal_id);
        self.next_nonterminal_id += 1;
        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                name: name.to_owned(),
            },
        );

        Ok(id)
    }

    /// Add a production rule into this grammar.
    ///
    /// `attributes` may carry rules for slots `0..=len(body)`; the missing
    /// ones are left unset.
    pub fn production<I>(
        &mut self,
        head: NonterminalID,
        body: I,
        attributes: Attributes<V>,
    ) -> Result<ProductionID, GrammarError>
    where
        I: IntoIterator<Item = SymbolID>,
    {
        if !self.nonterminals.contains_key(&head) {
            return Err(GrammarError::UnknownSymbol {
                symbol: SymbolID::N(head),
            });
        }

        let body: Vec<SymbolID> = body.into_iter().collect();
        for symbol in &body {
            let known = match symbol {
                SymbolID::T(t) => self.terminals.contains_key(t),
                SymbolID::N(n) => *n != NonterminalID::START && self.nonterminals.contains_key(n),
            };
            if !known {
                return Err(GrammarError::UnknownSymbol { symbol: *symbol });
            }
        }

        for production in self.productions.values() {
            if production.head == head && production.body == body {
                return Err(GrammarError::DuplicateProduction {
                    head: self.nonterminals[&head].name.clone(),
                });
            }
        }

        let attributes = attributes.fit(body.len()).map_err(|slot| match slot {
            0 => GrammarError::InheritedOnHead,
            slot => GrammarError::AttributeSlot {
                slot,
                len: body.len(),
            },
        })?;
        if let Some(position) = attributes
            .inherited_positions()
            .find(|&i| matches!(body[i - 1], SymbolID::T(..)))
        {
            return Err(GrammarError::InheritedOnTerminal { position });
        }

        let id = ProductionID(self.next_production_id);
        self.next_production_id += 1;
        self.productions.insert(
            id,
            Production {
                id,
                head,
                body,
                attributes,
            },
        );

        Ok(id)
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, symbol: NonterminalID) -> Result<(), GrammarError> {
        if symbol == NonterminalID::START || !self.nonterminals.contains_key(&symbol) {
            return Err(GrammarError::UnknownSymbol {
                symbol: SymbolID::N(symbol),
            });
        }
        self.start.replace(symbol);
        Ok(())
    }

    fn verify_name(&self, name: &str) -> Result<(), GrammarError> {
        if name.is_empty() {
            return Err(GrammarError::EmptyName);
        }
        let used = self.terminals.values().any(|t| t.name == name)
            || self.nonterminals.values().any(|n| n.name == name);
        if used {
            return Err(GrammarError::DuplicateSymbol {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    fn end(mut self) -> Result<Grammar<V>, GrammarError> {
        // Without an explicit start symbol, the first declared nonterminal is used.
        let start = match self.start.take() {
            Some(start) => start,
            None => self
                .nonterminals
                .keys()
                .find(|id| **id != NonterminalID::START)
                .copied()
                .ok_or(GrammarError::EmptyNonterminals)?,
        };

        if let Some(accept) = self.productions.get_mut(&ProductionID::ACCEPT) {
            accept.body = vec![SymbolID::N(start)];
        }

        let count = self
            .productions
            .values()
            .filter(|p| p.head == NonterminalID::START)
            .count();
        if count != 1 {
            return Err(GrammarError::Augmentation { count });
        }

        for nonterminal in self.nonterminals.values() {
            if nonterminal.id != NonterminalID::START
                && !self.productions.values().any(|p| p.head == nonterminal.id)
            {
                tracing::warn!("nonterminal `{}' has no productions", nonterminal);
            }
        }

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            productions: self.productions,
            start_symbol: start,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("symbol names must not be empty")]
    EmptyName,

    #[error("the symbol `{name}' has already been declared")]
    DuplicateSymbol { name: String },

    #[error("duplicate production rule detected for `{head}'")]
    DuplicateProduction { head: String },

    #[error("the symbol {symbol:?} is not declared in this grammar")]
    UnknownSymbol { symbol: SymbolID },

    #[error("attribute slot {slot} is out of range for a body of {len} symbols")]
    AttributeSlot { slot: usize, len: usize },

    #[error("inherited rules cannot be attached to the head")]
    InheritedOnHead,

    #[error("inherited rule attached to the terminal at position {position}")]
    InheritedOnTerminal { position: usize },

    #[error("empty nonterminal symbols")]
    EmptyNonterminals,

    #[error("the augmented start symbol must have exactly one production, found {count}")]
    Augmentation { count: usize },

    #[error("Other error: {}", msg)]
    Other { msg: String },
}
impl From<&str> for GrammarError {
    fn from(msg: &str) -> Self {
        Self::Other { msg: msg.into() }
    }
}
impl From<String> for GrammarError {
    fn from(msg: String) -> Self {
        Self::Other { msg }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brackets() -> Grammar {
        Grammar::define(|g| {
            let lparen = g.terminal("LPAREN")?;
            let rparen = g.terminal("RPAREN")?;
            let a = g.terminal("A")?;
            let s = g.nonterminal("S")?;
            g.production(
                s,
                [SymbolID::T(lparen), SymbolID::N(s), SymbolID::T(rparen)],
                Attributes::new(),
            )?;
            g.production(s, [SymbolID::T(a)], Attributes::new())?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn augmented_with_first_nonterminal() {
        let g = brackets();
        let s = g.nonterminal_by_name("S").unwrap();
        assert_eq!(g.start_symbol, s);

        let accept = g.production(ProductionID::ACCEPT).unwrap();
        assert_eq!(accept.head(), NonterminalID::START);
        assert_eq!(accept.body(), [SymbolID::N(s)]);
        assert_eq!(g.productions_of(NonterminalID::START).count(), 1);
    }

    #[test]
    fn display_production() {
        let g = brackets();
        let rendered: Vec<String> = g
            .productions
            .values()
            .map(|p| p.display(&g).to_string())
            .collect();
        assert_eq!(rendered, ["$start := S", "S := LPAREN S RPAREN", "S := A"]);
        eprintln!("{}", g);
    }

    #[test]
    fn lookup_by_name() {
        let g = brackets();
        assert_eq!(g.terminal_by_name("$eof"), Some(TerminalID::EOF));
        assert!(g.terminal_by_name("S").is_none());
        let a = g.terminal_by_name("A").unwrap();
        assert_eq!(g.symbol_name(SymbolID::T(a)), "A");
    }

    #[test]
    fn terminal_set_equality() {
        let a: TerminalSet = [TerminalID(3), TerminalID(1)].into_iter().collect();
        let mut b = TerminalSet::default();
        b.insert(TerminalID(1));
        assert_ne!(a, b);
        b.insert(TerminalID(3));
        assert_eq!(a, b);
        assert_eq!(a.iter().collect::<Vec<_>>(), [TerminalID(1), TerminalID(3)]);
    }

    #[test]
    fn empty_grammar() {
        let err = Grammar::<()>::define(|_| Ok(())).unwrap_err();
        assert!(matches!(err, GrammarError::EmptyNonterminals));
    }
}
