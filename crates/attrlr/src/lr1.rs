//! The implementation of LR(1) automaton.

use crate::{
    first_sets::FirstSets,
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID, TerminalSet},
    types::{Map, Set},
    util::display_fn,
};
use std::{collections::VecDeque, fmt};

#[derive(Debug, thiserror::Error)]
pub enum AutomatonError {
    #[error("the grammar is not augmented ({count} productions for the start symbol)")]
    NotAugmented { count: usize },

    #[error("epsilon leaked into the lookaheads while expanding `{item}'")]
    EpsilonLookahead { item: String },

    #[error("too many states")]
    TooManyStates,
}

/// An LR(0) item, i.e. a production with a marker position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Center {
    pub production: ProductionID,
    pub position: u16,
}

impl Center {
    pub fn new(production: ProductionID, position: u16) -> Self {
        Self {
            production,
            position,
        }
    }

    /// The symbol just after the marker, or `None` for a reduce item.
    pub fn next_symbol<V>(&self, g: &Grammar<V>) -> Option<SymbolID> {
        g.production(self.production)?
            .body()
            .get(usize::from(self.position))
            .copied()
    }

    pub fn is_reduce_item<V>(&self, g: &Grammar<V>) -> bool {
        self.next_symbol(g).is_none()
    }

    fn rest<'g, V>(&self, g: &'g Grammar<V>) -> &'g [SymbolID] {
        g.production(self.production)
            .and_then(|p| p.body().get(usize::from(self.position) + 1..))
            .unwrap_or(&[])
    }

    fn advance(self) -> Self {
        Self {
            position: self.position + 1,
            ..self
        }
    }

    pub fn display<'g, V>(&'g self, g: &'g Grammar<V>) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let production = match g.production(self.production) {
                Some(p) => p,
                None => return write!(f, "{:?}", self.production),
            };
            write!(f, "{} :=", g.nonterminals[&production.head()])?;
            for (i, symbol) in production.body().iter().enumerate() {
                if i == usize::from(self.position) {
                    f.write_str(" .")?;
                }
                write!(f, " {}", g.symbol_name(*symbol))?;
            }
            if usize::from(self.position) == production.body().len() {
                f.write_str(" .")?;
            }
            Ok(())
        })
    }
}

/// An LR(1) item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub center: Center,
    pub lookaheads: TerminalSet,
}

impl Item {
    pub fn display<'g, V>(&'g self, g: &'g Grammar<V>) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{}  [", self.center.display(g))?;
            for (i, lookahead) in self.lookaheads.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", g.terminals[&lookahead])?;
            }
            f.write_str("]")
        })
    }
}

/// A compressed set of LR(1) items.
///
/// Items are sorted by center and every center occurs at most once, so two
/// sets compare equal exactly when they hold the same centers with the same
/// lookaheads. This ordering doubles as the canonical key of a state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ItemSet {
    items: Vec<Item>,
}

impl ItemSet {
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The sorted `(production, position, lookaheads)` tuples of this set.
    pub fn canonical_key(&self) -> Vec<(ProductionID, u16, Vec<TerminalID>)> {
        self.items
            .iter()
            .map(|item| {
                (
                    item.center.production,
                    item.center.position,
                    item.lookaheads.iter().collect(),
                )
            })
            .collect()
    }
}

impl FromIterator<Item> for ItemSet {
    /// Merge the items sharing a center, uniting their lookaheads.
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        compress(iter)
    }
}

impl<'a> IntoIterator for &'a ItemSet {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Generate the items predicted by `item`.
///
/// When the symbol after the marker is a nonterminal `N`, an item at
/// position 0 is created for every production of `N`, with the lookaheads
/// `First(rest z)` for each lookahead `z` of `item`.
pub fn expand<V>(
    g: &Grammar<V>,
    item: &Item,
    firsts: &FirstSets,
) -> Result<Vec<Item>, AutomatonError> {
    let next = match item.center.next_symbol(g) {
        Some(SymbolID::N(n)) => n,
        _ => return Ok(vec![]),
    };

    let lookaheads = firsts.local_first(item.center.rest(g), &item.lookaheads);
    if lookaheads.epsilon {
        return Err(AutomatonError::EpsilonLookahead {
            item: item.display(g).to_string(),
        });
    }

    Ok(g.productions_of(next)
        .map(|p| Item {
            center: Center::new(p.id(), 0),
            lookaheads: lookaheads.terminals.clone(),
        })
        .collect())
}

/// Merge the items sharing a center, uniting their lookaheads.
pub fn compress<I>(items: I) -> ItemSet
where
    I: IntoIterator<Item = Item>,
{
    let mut centers: Map<Center, TerminalSet> = Map::default();
    for item in items {
        centers
            .entry(item.center)
            .or_default()
            .union_with(&item.lookaheads);
    }
    centers.sort_keys();
    ItemSet {
        items: centers
            .into_iter()
            .map(|(center, lookaheads)| Item { center, lookaheads })
            .collect(),
    }
}

/// Expand `items` until no new item appears, then compress the result.
pub fn closure<V>(
    g: &Grammar<V>,
    items: &ItemSet,
    firsts: &FirstSets,
) -> Result<ItemSet, AutomatonError> {
    let mut closure: Set<Item> = items.iter().cloned().collect();
    let mut cursor = 0;
    while let Some(item) = closure.get_index(cursor).cloned() {
        closure.extend(expand(g, &item, firsts)?);
        cursor += 1;
    }
    Ok(compress(closure))
}

/// Advance every item whose next symbol is `symbol`.
///
/// The kernel is closed again when `firsts` is provided.
pub fn goto<V>(
    g: &Grammar<V>,
    items: &ItemSet,
    symbol: SymbolID,
    firsts: Option<&FirstSets>,
) -> Result<ItemSet, AutomatonError> {
    let kernel = compress(
        items
            .iter()
            .filter(|item| item.center.next_symbol(g) == Some(symbol))
            .map(|item| Item {
                center: item.center.advance(),
                lookaheads: item.lookaheads.clone(),
            }),
    );
    match firsts {
        Some(firsts) => closure(g, &kernel, firsts),
        None => Ok(kernel),
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateID(u32);

impl StateID {
    pub const ROOT: Self = Self(0);

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

#[derive(Debug)]
pub struct State {
    pub kernel: ItemSet,
    /// The closure of `kernel`.
    pub items: ItemSet,
    pub transitions: Map<SymbolID, StateID>,
}

/// The canonical LR(1) automaton of a grammar.
#[derive(Debug)]
pub struct Automaton {
    pub states: Map<StateID, State>,
}

impl Automaton {
    /// Construct the automaton, numbering the states in discovery order.
    #[tracing::instrument(skip_all)]
    pub fn build<V>(g: &Grammar<V>) -> Result<Self, AutomatonError> {
        let count = g.productions_of(NonterminalID::START).count();
        if count != 1 {
            return Err(AutomatonError::NotAugmented { count });
        }

        let firsts = FirstSets::new(g);
        let symbols: Vec<SymbolID> = g
            .terminals
            .keys()
            .map(|t| SymbolID::T(*t))
            .chain(g.nonterminals.keys().map(|n| SymbolID::N(*n)))
            .collect();

        let root = compress(Some(Item {
            center: Center::new(ProductionID::ACCEPT, 0),
            lookaheads: Some(TerminalID::EOF).into_iter().collect(),
        }));
        let root_items = closure(g, &root, &firsts)?;

        let mut states: Map<StateID, State> = Map::default();
        let mut index: Map<ItemSet, StateID> = Map::default();
        let mut pending = VecDeque::new();

        index.insert(root.clone(), StateID::ROOT);
        states.insert(
            StateID::ROOT,
            State {
                kernel: root,
                items: root_items,
                transitions: Map::default(),
            },
        );
        pending.push_back(StateID::ROOT);

        while let Some(current) = pending.pop_front() {
            let items = states[&current].items.clone();
            let mut transitions = Map::default();

            for &symbol in &symbols {
                let kernel = goto(g, &items, symbol, None)?;
                if kernel.is_empty() {
                    continue;
                }

                let next = match index.get(&kernel) {
                    Some(next) => *next,
                    None => {
                        let next = u32::try_from(states.len())
                            .map(StateID)
                            .map_err(|_| AutomatonError::TooManyStates)?;
                        let items = closure(g, &kernel, &firsts)?;
                        index.insert(kernel.clone(), next);
                        states.insert(
                            next,
                            State {
                                kernel,
                                items,
                                transitions: Map::default(),
                            },
                        );
                        pending.push_back(next);
                        next
                    }
                };
                transitions.insert(symbol, next);
            }

            if let Some(state) = states.get_mut(&current) {
                state.transitions = transitions;
            }
        }

        tracing::debug!("LR(1) automaton: {} states", states.len());

        Ok(Self { states })
    }

    pub fn state(&self, id: StateID) -> Option<&State> {
        self.states.get(&id)
    }

    pub fn display<'g, V>(&'g self, g: &'g Grammar<V>) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, (id, state)) in self.states.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }

                writeln!(f, "#### State {}", id)?;
                writeln!(f, "## items")?;
                for item in &state.items {
                    writeln!(f, "- {}", item.display(g))?;
                }

                writeln!(f, "## transitions")?;
                for (symbol, next) in &state.transitions {
                    writeln!(f, "- {} => {}", g.symbol_name(*symbol), next)?;
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attributes;

    // S -> ( S ) | a
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
    fn closure_is_fixpoint() {
        let g = brackets();
        let firsts = FirstSets::new(&g);
        let root = compress(Some(Item {
            center: Center::new(ProductionID::ACCEPT, 0),
            lookaheads: Some(TerminalID::EOF).into_iter().collect(),
        }));

        let once = closure(&g, &root, &firsts).unwrap();
        let twice = closure(&g, &once, &firsts).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
        for item in &once {
            assert_eq!(item.lookaheads.iter().collect::<Vec<_>>(), [TerminalID::EOF]);
        }
    }

    #[test]
    fn goto_without_firsts_returns_kernel() {
        let g = brackets();
        let firsts = FirstSets::new(&g);
        let lparen = SymbolID::T(g.terminal_by_name("LPAREN").unwrap());
        let rparen = g.terminal_by_name("RPAREN").unwrap();
        let root = compress(Some(Item {
            center: Center::new(ProductionID::ACCEPT, 0),
            lookaheads: Some(TerminalID::EOF).into_iter().collect(),
        }));
        let items = closure(&g, &root, &firsts).unwrap();

        let kernel = goto(&g, &items, lparen, None).unwrap();
        assert_eq!(kernel.len(), 1);

        let closed = goto(&g, &items, lparen, Some(&firsts)).unwrap();
        assert_eq!(closed.len(), 3);
        let predicted: Vec<_> = closed
            .iter()
            .filter(|item| item.center.position == 0)
            .map(|item| item.lookaheads.iter().collect::<Vec<_>>())
            .collect();
        assert_eq!(predicted, [[rparen], [rparen]]);
    }

    #[test]
    fn canonical_states() {
        let _ = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();

        let g = brackets();
        let automaton = Automaton::build(&g).unwrap();
        eprintln!("{}", automaton.display(&g));
        assert_eq!(automaton.states.len(), 10);

        let root = automaton.state(StateID::ROOT).unwrap();
        assert_eq!(root.transitions.len(), 3);
        assert!(root
            .kernel
            .iter()
            .all(|item| item.center.production == ProductionID::ACCEPT));
    }

    #[test]
    fn deterministic_construction() {
        let g = brackets();
        let a = Automaton::build(&g).unwrap();
        let b = Automaton::build(&g).unwrap();
        assert_eq!(a.states.len(), b.states.len());
        for (id, state) in &a.states {
            let other = &b.states[id];
            assert_eq!(state.kernel.canonical_key(), other.kernel.canonical_key());
            assert_eq!(state.transitions, other.transitions);
        }
    }
}
