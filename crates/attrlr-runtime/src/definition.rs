//! Parser definition.

use std::fmt;

/// The trait for abstracting a compiled LR(1) parse table.
pub trait ParserDef {
    /// The number to identify the state of LR(1) automaton.
    type State: Copy + fmt::Debug;

    /// The number to identify the terminal symbols (token classes).
    type Terminal: Copy + fmt::Debug;

    /// The number to identify the nonterminal symbols.
    type Nonterminal: Copy + fmt::Debug;

    /// The value recorded in the reduction trace for a matched production.
    type Reduce: Copy;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::State;

    /// Return the authoritative action for the specified state number and
    /// lookahead symbol.
    ///
    /// When several actions were registered for the same cell, the first
    /// registered one must be returned. `None` means a syntax error.
    fn action(
        &self,
        current: Self::State,
        lookahead: Self::Terminal,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Reduce>>;

    /// Return the state to transition to after reducing to `symbol`.
    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State>;
}

impl<T: ?Sized> ParserDef for &T
where
    T: ParserDef,
{
    type State = T::State;
    type Terminal = T::Terminal;
    type Nonterminal = T::Nonterminal;
    type Reduce = T::Reduce;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Self::Terminal,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Reduce>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        (**self).goto(current, symbol)
    }
}

impl<T: ?Sized> ParserDef for std::rc::Rc<T>
where
    T: ParserDef,
{
    type State = T::State;
    type Terminal = T::Terminal;
    type Nonterminal = T::Nonterminal;
    type Reduce = T::Reduce;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Self::Terminal,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Reduce>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        (**self).goto(current, symbol)
    }
}

impl<T: ?Sized> ParserDef for std::sync::Arc<T>
where
    T: ParserDef,
{
    type State = T::State;
    type Terminal = T::Terminal;
    type Nonterminal = T::Nonterminal;
    type Reduce = T::Reduce;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Self::Terminal,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Reduce>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        (**self).goto(current, symbol)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseAction<TState, TSymbol, TReduce> {
    /// Consume the lookahead token and push the specified state.
    Shift(TState),

    /// Pop `n` states and reduce to the nonterminal `TSymbol`.
    Reduce(TReduce, TSymbol, usize),

    Accept,
}
