//! Positional attribute rules attached to productions.

use std::{fmt, sync::Arc};

/// A semantic rule evaluated against the attribute arrays of one production.
///
/// The rule in slot 0 returns the synthesized value of the head. A rule in
/// slot `i > 0` returns the inherited value of the `i`-th body symbol.
pub type AttributeRule<V> = Arc<dyn Fn(&mut AttrArgs<'_, V>) -> V + Send + Sync>;

/// The attribute rules of a production, indexed by position.
///
/// Slot 0 belongs to the head and slots `1..=len(body)` to the body symbols.
pub struct Attributes<V> {
    slots: Vec<Option<AttributeRule<V>>>,
    /// Set when an inherited rule was attached to the head.
    inherited_on_head: bool,
}

impl<V> Attributes<V> {
    /// Create an empty set of rules. A production without a head rule
    /// synthesizes no value.
    pub fn new() -> Self {
        Self {
            slots: vec![None],
            inherited_on_head: false,
        }
    }

    /// Create a set of rules containing only the head rule.
    pub fn synthesized<F>(f: F) -> Self
    where
        F: Fn(&mut AttrArgs<'_, V>) -> V + Send + Sync + 'static,
    {
        Self::new().with_synthesized(f)
    }

    pub fn with_synthesized<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut AttrArgs<'_, V>) -> V + Send + Sync + 'static,
    {
        self.slots[0] = Some(Arc::new(f));
        self
    }

    /// Attach the rule computing the inherited value of the body symbol at
    /// `position` (1-based).
    ///
    /// The head has no inherited rule of its own. Position 0 leaves the head
    /// rule untouched and makes the production fail to register.
    pub fn with_inherited<F>(mut self, position: usize, f: F) -> Self
    where
        F: Fn(&mut AttrArgs<'_, V>) -> V + Send + Sync + 'static,
    {
        if position == 0 {
            self.inherited_on_head = true;
            return self;
        }
        if self.slots.len() <= position {
            self.slots.resize_with(position + 1, || None);
        }
        self.slots[position] = Some(Arc::new(f));
        self
    }

    /// Return the head rule, if any.
    pub fn head(&self) -> Option<&AttributeRule<V>> {
        self.get(0)
    }

    pub fn get(&self, slot: usize) -> Option<&AttributeRule<V>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// The number of slots, i.e. `len(body) + 1` once attached to a production.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Whether only the head slot carries a rule.
    pub fn is_s_attributed(&self) -> bool {
        self.slots.iter().skip(1).all(Option::is_none)
    }

    /// Positions of the body symbols with an inherited rule.
    pub fn inherited_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, slot)| slot.is_some().then_some(i))
    }

    /// Resize the slots to match a body of `body_len` symbols.
    ///
    /// Returns the first misplaced slot: 0 for an inherited rule on the head,
    /// or a slot that lies beyond the body.
    pub(crate) fn fit(mut self, body_len: usize) -> Result<Self, usize> {
        if self.inherited_on_head {
            return Err(0);
        }
        if let Some(slot) = self.inherited_positions().find(|&i| i > body_len) {
            return Err(slot);
        }
        self.slots.resize_with(body_len + 1, || None);
        Ok(self)
    }
}

impl<V> Default for Attributes<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Attributes<V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            inherited_on_head: self.inherited_on_head,
        }
    }
}

impl<V> fmt::Debug for Attributes<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.slots
                    .iter()
                    .map(|slot| if slot.is_some() { "<rule>" } else { "-" }),
            )
            .finish()
    }
}

/// The attribute arrays passed to an [`AttributeRule`].
///
/// Index 0 refers to the head and index `i` to the `i`-th body symbol.
/// Positions that have not been computed yet hold `None`.
pub struct AttrArgs<'a, V> {
    inherited: &'a mut [Option<V>],
    synthesized: &'a mut [Option<V>],
}

impl<'a, V> AttrArgs<'a, V> {
    pub(crate) fn new(inherited: &'a mut [Option<V>], synthesized: &'a mut [Option<V>]) -> Self {
        debug_assert_eq!(inherited.len(), synthesized.len());
        Self {
            inherited,
            synthesized,
        }
    }

    pub fn inherited(&self, index: usize) -> Option<&V> {
        self.inherited.get(index).and_then(Option::as_ref)
    }

    pub fn synthesized(&self, index: usize) -> Option<&V> {
        self.synthesized.get(index).and_then(Option::as_ref)
    }

    /// Move the inherited value out of the array.
    pub fn take_inherited(&mut self, index: usize) -> Option<V> {
        self.inherited.get_mut(index).and_then(Option::take)
    }

    /// Move the synthesized value out of the array.
    pub fn take_synthesized(&mut self, index: usize) -> Option<V> {
        self.synthesized.get_mut(index).and_then(Option::take)
    }

    pub fn len(&self) -> usize {
        self.synthesized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synthesized.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_and_rejects() {
        let attrs = Attributes::<i32>::synthesized(|_| 0).fit(3).unwrap();
        assert_eq!(attrs.len(), 4);
        assert!(attrs.is_s_attributed());

        let attrs = Attributes::<i32>::new().with_inherited(3, |_| 0);
        assert_eq!(attrs.fit(2).unwrap_err(), 3);
    }

    #[test]
    fn inherited_on_head_keeps_head_rule() {
        let attrs = Attributes::<i32>::synthesized(|_| 1).with_inherited(0, |_| 2);
        let head = attrs.head().unwrap().clone();
        let mut inherited = vec![None];
        let mut synthesized = vec![None];
        assert_eq!(head(&mut AttrArgs::new(&mut inherited, &mut synthesized)), 1);
        assert!(attrs.is_s_attributed());
        assert_eq!(attrs.fit(0).unwrap_err(), 0);
    }

    #[test]
    fn args_access() {
        let mut inherited = vec![Some(1), None];
        let mut synthesized = vec![None, Some(2)];
        let rule: AttributeRule<i32> = Arc::new(|args: &mut AttrArgs<'_, i32>| {
            args.inherited(0).copied().unwrap_or(0) + args.take_synthesized(1).unwrap_or(0)
        });
        let value = rule(&mut AttrArgs::new(&mut inherited, &mut synthesized));
        assert_eq!(value, 3);
        assert_eq!(synthesized[1], None);
    }
}
