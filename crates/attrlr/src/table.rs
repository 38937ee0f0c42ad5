//! Compilation of the LR(1) automaton into action/goto tables.

use crate::{
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID},
    lr1::{Automaton, AutomatonError, StateID},
    types::Map,
    util::display_fn,
};
use attrlr_runtime::definition::{ParseAction, ParserDef};
use std::fmt;

/// The payload of a reduce action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Reduce {
    pub production: ProductionID,
    pub head: NonterminalID,
    /// The number of body symbols to pop.
    pub len: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Shift(StateID),
    Reduce(Reduce),
    Accept,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShiftReduce => f.write_str("shift/reduce"),
            Self::ReduceReduce => f.write_str("reduce/reduce"),
        }
    }
}

/// An action cell holding more than one entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateID,
    pub terminal: TerminalID,
    pub kind: ConflictKind,
}

/// The action/goto tables derived from a grammar.
///
/// Every cell keeps the list of entries in registration order. The first
/// entry of a cell is the one the engine uses.
#[derive(Debug, Default)]
pub struct ParseTable {
    actions: Map<(StateID, TerminalID), Vec<Action>>,
    gotos: Map<(StateID, NonterminalID), Vec<StateID>>,
    num_states: usize,
}

impl ParseTable {
    /// Build the automaton of `g` and compile it.
    pub fn compile<V>(g: &Grammar<V>) -> Result<Self, AutomatonError> {
        let automaton = Automaton::build(g)?;
        Ok(Self::from_automaton(g, &automaton))
    }

    #[tracing::instrument(skip_all)]
    pub fn from_automaton<V>(g: &Grammar<V>, automaton: &Automaton) -> Self {
        let mut table = Self {
            num_states: automaton.states.len(),
            ..Default::default()
        };

        for (&id, state) in &automaton.states {
            for item in &state.items {
                let center = item.center;
                match center.next_symbol(g) {
                    None if center.production == ProductionID::ACCEPT => {
                        register(&mut table.actions, (id, TerminalID::EOF), Action::Accept);
                    }
                    None => {
                        let production = match g.production(center.production) {
                            Some(p) => p,
                            None => continue,
                        };
                        let reduce = Reduce {
                            production: production.id(),
                            head: production.head(),
                            len: production.body().len(),
                        };
                        for lookahead in item.lookaheads.iter() {
                            register(
                                &mut table.actions,
                                (id, lookahead),
                                Action::Reduce(reduce),
                            );
                        }
                    }
                    Some(symbol) => {
                        let next = match state.transitions.get(&symbol) {
                            Some(next) => *next,
                            None => continue,
                        };
                        match symbol {
                            SymbolID::T(t) => {
                                register(&mut table.actions, (id, t), Action::Shift(next))
                            }
                            SymbolID::N(n) => register(&mut table.gotos, (id, n), next),
                        }
                    }
                }
            }
        }

        let conflicts = table.conflicts();
        tracing::debug!(
            "parse table: {} states, {} conflicts",
            table.num_states,
            conflicts.len()
        );
        for conflict in &conflicts {
            tracing::debug!(
                "{} conflict at ({:?}, {})",
                conflict.kind,
                conflict.state,
                g.terminals[&conflict.terminal]
            );
        }

        table
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Every registered action in the cell.
    pub fn actions(&self, state: StateID, terminal: TerminalID) -> &[Action] {
        self.actions
            .get(&(state, terminal))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The authoritative action in the cell.
    pub fn action(&self, state: StateID, terminal: TerminalID) -> Option<Action> {
        self.actions(state, terminal).first().copied()
    }

    pub fn gotos(&self, state: StateID, symbol: NonterminalID) -> &[StateID] {
        self.gotos
            .get(&(state, symbol))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn goto(&self, state: StateID, symbol: NonterminalID) -> Option<StateID> {
        self.gotos(state, symbol).first().copied()
    }

    pub fn action_cells(&self) -> impl Iterator<Item = ((StateID, TerminalID), &[Action])> + '_ {
        self.actions.iter().map(|(key, actions)| (*key, &actions[..]))
    }

    /// List the action cells with more than one entry.
    pub fn conflicts(&self) -> Vec<Conflict> {
        self.actions
            .iter()
            .filter(|(_, actions)| actions.len() > 1)
            .map(|(&(state, terminal), actions)| {
                let kind = if actions.iter().any(|a| matches!(a, Action::Shift(..))) {
                    ConflictKind::ShiftReduce
                } else {
                    ConflictKind::ReduceReduce
                };
                Conflict {
                    state,
                    terminal,
                    kind,
                }
            })
            .collect()
    }

    pub fn display<'g, V>(&'g self, g: &'g Grammar<V>) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let mut rows: Map<StateID, (Vec<_>, Vec<_>)> = Map::default();
            for (key, actions) in &self.actions {
                rows.entry(key.0).or_default().0.push((key.1, actions));
            }
            for (key, gotos) in &self.gotos {
                rows.entry(key.0).or_default().1.push((key.1, gotos));
            }
            rows.sort_keys();

            for (i, (state, (actions, gotos))) in rows.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {}", state)?;

                writeln!(f, "## actions")?;
                for (terminal, actions) in actions {
                    write!(f, "- {} =>", g.terminals[terminal])?;
                    for (i, action) in actions.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        match action {
                            Action::Shift(next) => write!(f, " shift({})", next)?,
                            Action::Reduce(reduce) => match g.production(reduce.production) {
                                Some(p) => write!(f, " reduce({})", p.display(g))?,
                                None => write!(f, " reduce({:?})", reduce.production)?,
                            },
                            Action::Accept => f.write_str(" accept")?,
                        }
                    }
                    if actions.len() > 1 {
                        f.write_str("  (conflict)")?;
                    }
                    writeln!(f)?;
                }

                writeln!(f, "## gotos")?;
                for (symbol, gotos) in gotos {
                    for next in gotos.iter() {
                        writeln!(f, "- {} => goto({})", g.nonterminals[symbol], next)?;
                    }
                }
            }
            Ok(())
        })
    }
}

/// Append `value` to the cell unless an identical entry is already there.
fn register<K, T>(table: &mut Map<K, Vec<T>>, key: K, value: T)
where
    K: std::hash::Hash + Eq,
    T: PartialEq,
{
    let entries = table.entry(key).or_default();
    if !entries.contains(&value) {
        entries.push(value);
    }
}

impl ParserDef for ParseTable {
    type State = StateID;
    type Terminal = TerminalID;
    type Nonterminal = NonterminalID;
    type Reduce = ProductionID;

    fn initial_state(&self) -> Self::State {
        StateID::ROOT
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Self::Terminal,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Reduce>> {
        match ParseTable::action(self, current, lookahead)? {
            Action::Shift(next) => Some(ParseAction::Shift(next)),
            Action::Reduce(reduce) => Some(ParseAction::Reduce(
                reduce.production,
                reduce.head,
                reduce.len,
            )),
            Action::Accept => Some(ParseAction::Accept),
        }
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        ParseTable::goto(self, current, symbol)
    }
}
