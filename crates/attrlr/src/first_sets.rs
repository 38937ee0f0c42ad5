//! Calculation of first set function.

use crate::{
    grammar::{Grammar, SymbolID, TerminalSet},
    types::{Map, Set},
};

/// FIRST of a symbol sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct First {
    pub terminals: TerminalSet,
    /// Whether the sequence derives the empty string.
    pub epsilon: bool,
}

#[derive(Debug)]
pub struct FirstSets {
    nulls: Set<SymbolID>,
    map: Map<SymbolID, TerminalSet>,
    empty: TerminalSet,
}

impl FirstSets {
    pub fn new<V>(grammar: &Grammar<V>) -> Self {
        let nulls = nulls_set(grammar);
        let map = first_sets(grammar, &nulls);
        Self {
            nulls,
            map,
            empty: TerminalSet::default(),
        }
    }

    /// `First(symbol)`, without the epsilon flag.
    pub fn first(&self, symbol: SymbolID) -> &TerminalSet {
        self.map.get(&symbol).unwrap_or(&self.empty)
    }

    pub fn is_nullable(&self, symbol: SymbolID) -> bool {
        self.nulls.contains(&symbol)
    }

    /// `First(symbols)`
    pub fn sequence(&self, symbols: &[SymbolID]) -> First {
        let mut terminals = TerminalSet::default();
        for symbol in symbols {
            terminals.union_with(self.first(*symbol));
            if !self.is_nullable(*symbol) {
                return First {
                    terminals,
                    epsilon: false,
                };
            }
        }
        First {
            terminals,
            epsilon: true,
        }
    }

    /// `First(rest z)` for every `z` in `lookaheads`.
    ///
    /// The result is nullable only when `rest` is nullable and `lookaheads`
    /// is empty.
    pub fn local_first(&self, rest: &[SymbolID], lookaheads: &TerminalSet) -> First {
        let mut first = self.sequence(rest);
        if first.epsilon && !lookaheads.is_empty() {
            first.terminals.union_with(lookaheads);
            first.epsilon = false;
        }
        first
    }
}

/// Calculate the set of nullable symbols in this grammar.
fn nulls_set<V>(grammar: &Grammar<V>) -> Set<SymbolID> {
    let mut nulls: Set<SymbolID> = grammar
        .productions
        .values()
        .filter_map(|p| p.body().is_empty().then_some(SymbolID::N(p.head())))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions.values() {
            let head = SymbolID::N(production.head());
            if nulls.contains(&head) {
                continue;
            }
            if production.body().iter().all(|s| nulls.contains(s)) {
                changed = true;
                nulls.insert(head);
            }
        }
    }

    nulls
}

fn first_sets<V>(grammar: &Grammar<V>, nulls: &Set<SymbolID>) -> Map<SymbolID, TerminalSet> {
    let mut map: Map<SymbolID, TerminalSet> = Map::default();

    // First(t) = {t}
    for &id in grammar.terminals.keys() {
        map.insert(SymbolID::T(id), Some(id).into_iter().collect());
    }
    for &id in grammar.nonterminals.keys() {
        map.insert(SymbolID::N(id), TerminalSet::default());
    }

    // For `X -> Y1 Y2 ... Yn`, let Yk be the first non-nullable symbol.
    // Then First(X) contains First(Yi) for every i <= k.
    #[derive(Debug)]
    struct Constraint {
        sup: SymbolID,
        sub: SymbolID,
    }
    let mut constraints = vec![];
    for production in grammar.productions.values() {
        let head = SymbolID::N(production.head());
        for symbol in production.body() {
            if head != *symbol {
                constraints.push(Constraint {
                    sup: head,
                    sub: *symbol,
                });
            }
            if !nulls.contains(symbol) {
                break;
            }
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for Constraint { sup, sub } in &constraints {
            let subset = map.get(sub).cloned().unwrap_or_default();
            if let Some(superset) = map.get_mut(sup) {
                if !subset.is_subset(superset) {
                    superset.union_with(&subset);
                    changed = true;
                }
            }
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{attribute::Attributes, grammar::TerminalID};

    #[test]
    fn nullable_recursion() {
        // S -> a S b | ε
        let g = Grammar::<()>::define(|g| {
            let a = g.terminal("a")?;
            let b = g.terminal("b")?;
            let s = g.nonterminal("S")?;
            g.production(
                s,
                [SymbolID::T(a), SymbolID::N(s), SymbolID::T(b)],
                Attributes::new(),
            )?;
            g.production(s, [], Attributes::new())?;
            Ok(())
        })
        .unwrap();
        let a = g.terminal_by_name("a").unwrap();
        let b = g.terminal_by_name("b").unwrap();
        let s = SymbolID::N(g.nonterminal_by_name("S").unwrap());

        let firsts = FirstSets::new(&g);
        assert_eq!(firsts.first(s).iter().collect::<Vec<_>>(), [a]);
        assert!(firsts.is_nullable(s));
        assert!(!firsts.is_nullable(SymbolID::T(a)));

        let seq = firsts.sequence(&[s, SymbolID::T(b)]);
        assert_eq!(seq.terminals.iter().collect::<Vec<_>>(), [a, b]);
        assert!(!seq.epsilon);

        let seq = firsts.sequence(&[s, s]);
        assert!(seq.epsilon);

        let lookaheads: TerminalSet = Some(TerminalID::EOF).into_iter().collect();
        let local = firsts.local_first(&[s], &lookaheads);
        assert_eq!(
            local.terminals.iter().collect::<Vec<_>>(),
            [TerminalID::EOF, a]
        );
        assert!(!local.epsilon);

        let local = firsts.local_first(&[s], &TerminalSet::default());
        assert!(local.epsilon);
    }

    #[test]
    fn indirect_first() {
        // E -> T plus E | T ; T -> num | lparen E rparen
        let g = Grammar::<()>::define(|g| {
            let plus = g.terminal("plus")?;
            let num = g.terminal("num")?;
            let lparen = g.terminal("lparen")?;
            let rparen = g.terminal("rparen")?;
            let e = g.nonterminal("E")?;
            let t = g.nonterminal("T")?;
            g.production(
                e,
                [SymbolID::N(t), SymbolID::T(plus), SymbolID::N(e)],
                Attributes::new(),
            )?;
            g.production(e, [SymbolID::N(t)], Attributes::new())?;
            g.production(t, [SymbolID::T(num)], Attributes::new())?;
            g.production(
                t,
                [SymbolID::T(lparen), SymbolID::N(e), SymbolID::T(rparen)],
                Attributes::new(),
            )?;
            Ok(())
        })
        .unwrap();
        let num = g.terminal_by_name("num").unwrap();
        let lparen = g.terminal_by_name("lparen").unwrap();
        let e = SymbolID::N(g.nonterminal_by_name("E").unwrap());

        let firsts = FirstSets::new(&g);
        assert_eq!(firsts.first(e).iter().collect::<Vec<_>>(), [num, lparen]);
        assert!(!firsts.is_nullable(e));
    }
}
