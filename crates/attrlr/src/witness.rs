//! Search for inputs that lead the parser into a conflicting table cell.

use crate::{
    grammar::TerminalID,
    lr1::StateID,
    table::{Action, Conflict, ParseTable},
    types::Set,
};
use std::collections::VecDeque;

/// Finds the shortest terminal strings that drive the parser into a
/// conflicting action cell.
///
/// The search simulates the first registered action of every cell, which is
/// what the engine does at runtime. The last terminal of a witness is the
/// lookahead of the conflicting cell.
#[derive(Debug)]
pub struct ConflictWitness<'t> {
    table: &'t ParseTable,
    terminals: Vec<TerminalID>,
    max_len: usize,
}

impl<'t> ConflictWitness<'t> {
    pub fn new<I>(table: &'t ParseTable, terminals: I) -> Self
    where
        I: IntoIterator<Item = TerminalID>,
    {
        let mut terminals: Vec<_> = terminals.into_iter().collect();
        terminals.sort();
        terminals.dedup();
        Self {
            table,
            terminals,
            max_len: 64,
        }
    }

    /// Set the maximum length of the witnesses to search for.
    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Return a shortest terminal string reaching the cell `(state, terminal)`.
    pub fn find(&self, state: StateID, terminal: TerminalID) -> Option<Vec<TerminalID>> {
        // Configurations are keyed by their top state and stack depth.
        let mut visited: Set<(StateID, usize)> = Set::default();
        let mut queue = VecDeque::new();

        visited.insert((StateID::ROOT, 1));
        queue.push_back((vec![StateID::ROOT], vec![]));

        while let Some((stack, prefix)) = queue.pop_front() {
            if prefix.len() >= self.max_len {
                continue;
            }

            for &t in &self.terminals {
                let mut stack = stack.clone();
                match self.consume(&mut stack, t, (state, terminal)) {
                    Step::Reached => {
                        let mut witness = prefix.clone();
                        witness.push(t);
                        return Some(witness);
                    }
                    Step::Shifted => {
                        let top = match stack.last() {
                            Some(top) => *top,
                            None => continue,
                        };
                        if visited.insert((top, stack.len())) {
                            let mut prefix = prefix.clone();
                            prefix.push(t);
                            queue.push_back((stack, prefix));
                        }
                    }
                    Step::Stuck => (),
                }
            }
        }

        tracing::debug!(
            "no witness of length <= {} for ({:?}, {:?})",
            self.max_len,
            state,
            terminal
        );
        None
    }

    /// Return the first conflict that has a witness, together with it.
    pub fn find_any(&self) -> Option<(Conflict, Vec<TerminalID>)> {
        self.table
            .conflicts()
            .into_iter()
            .find_map(|conflict| Some((conflict, self.find(conflict.state, conflict.terminal)?)))
    }

    /// Apply reductions on `lookahead` until it is shifted.
    fn consume(
        &self,
        stack: &mut Vec<StateID>,
        lookahead: TerminalID,
        target: (StateID, TerminalID),
    ) -> Step {
        // Bounds the reductions between two shifts.
        let mut budget = self.table.num_states() + stack.len();
        loop {
            let top = match stack.last() {
                Some(top) => *top,
                None => return Step::Stuck,
            };
            if (top, lookahead) == target {
                return Step::Reached;
            }

            match self.table.action(top, lookahead) {
                Some(Action::Shift(next)) => {
                    stack.push(next);
                    return Step::Shifted;
                }
                Some(Action::Reduce(reduce)) => {
                    if budget == 0 || reduce.len >= stack.len() {
                        return Step::Stuck;
                    }
                    budget -= 1;
                    stack.truncate(stack.len() - reduce.len);
                    let top = match stack.last() {
                        Some(top) => *top,
                        None => return Step::Stuck,
                    };
                    match self.table.goto(top, reduce.head) {
                        Some(next) => stack.push(next),
                        None => return Step::Stuck,
                    }
                }
                Some(Action::Accept) | None => return Step::Stuck,
            }
        }
    }
}

enum Step {
    Reached,
    Shifted,
    Stuck,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        attribute::Attributes,
        grammar::{Grammar, SymbolID},
    };

    #[test]
    fn witness_of_reduce_reduce() {
        // S -> A y | B y | z ; A -> x ; B -> x
        let g = Grammar::<()>::define(|g| {
            let x = g.terminal("x")?;
            let y = g.terminal("y")?;
            let z = g.terminal("z")?;
            let s = g.nonterminal("S")?;
            let a = g.nonterminal("A")?;
            let b = g.nonterminal("B")?;
            g.production(s, [SymbolID::N(a), SymbolID::T(y)], Attributes::new())?;
            g.production(s, [SymbolID::N(b), SymbolID::T(y)], Attributes::new())?;
            g.production(s, [SymbolID::T(z)], Attributes::new())?;
            g.production(a, [SymbolID::T(x)], Attributes::new())?;
            g.production(b, [SymbolID::T(x)], Attributes::new())?;
            Ok(())
        })
        .unwrap();
        let x = g.terminal_by_name("x").unwrap();
        let y = g.terminal_by_name("y").unwrap();

        let table = ParseTable::compile(&g).unwrap();
        let witness = ConflictWitness::new(&table, g.terminals.keys().copied());
        let (conflict, found) = witness.find_any().unwrap();
        assert_eq!(conflict.terminal, y);
        assert_eq!(found, [x, y]);

        assert!(witness.max_len(1).find_any().is_none());
    }

    #[test]
    fn no_witness_for_unreachable_cell() {
        let g = Grammar::<()>::define(|g| {
            let x = g.terminal("x")?;
            let s = g.nonterminal("S")?;
            g.production(s, [SymbolID::T(x)], Attributes::new())?;
            Ok(())
        })
        .unwrap();
        let x = g.terminal_by_name("x").unwrap();
        let table = ParseTable::compile(&g).unwrap();
        let witness = ConflictWitness::new(&table, g.terminals.keys().copied());

        assert!(witness.find_any().is_none());
        assert_eq!(witness.find(StateID::ROOT, x), Some(vec![x]));
    }
}
