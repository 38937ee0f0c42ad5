//! Recovery of the leftmost derivation from a bottom-up reduction trace.

use crate::{
    eval::EvalError,
    grammar::{Grammar, ProductionID, SymbolID},
};

#[derive(Debug)]
struct Node {
    production: ProductionID,
    children: Vec<usize>,
}

/// Rebuild the leftmost derivation corresponding to `reductions`.
///
/// The reductions of an LR parse form a rightmost derivation in reverse.
/// Replaying them builds the derivation tree, whose preorder walk is the
/// leftmost derivation consumed by
/// [`evaluate_top_down`](crate::eval::evaluate_top_down).
pub fn left_parse<V>(
    g: &Grammar<V>,
    reductions: &[ProductionID],
) -> Result<Vec<ProductionID>, EvalError> {
    let mut arena: Vec<Node> = Vec::with_capacity(reductions.len());
    // Subtrees not yet attached to a parent, left to right.
    let mut roots: Vec<usize> = vec![];

    for &id in reductions {
        let production = g
            .production(id)
            .ok_or(EvalError::UnknownProduction { production: id })?;
        let arity = production
            .body()
            .iter()
            .filter(|symbol| matches!(symbol, SymbolID::N(..)))
            .count();
        if roots.len() < arity {
            return Err(EvalError::UnbalancedReductions { len: roots.len() });
        }

        let children = roots.split_off(roots.len() - arity);
        for (&child, symbol) in children.iter().zip(
            production
                .body()
                .iter()
                .filter_map(|symbol| match symbol {
                    SymbolID::N(n) => Some(*n),
                    SymbolID::T(..) => None,
                }),
        ) {
            let head = g.production(arena[child].production).map(|p| p.head());
            if head != Some(symbol) {
                return Err(EvalError::DerivationMismatch {
                    expected: symbol,
                    found: arena[child].production,
                });
            }
        }

        roots.push(arena.len());
        arena.push(Node {
            production: id,
            children,
        });
    }

    let root = match roots[..] {
        [] => return Ok(vec![]),
        [root] => root,
        _ => return Err(EvalError::UnbalancedReductions { len: roots.len() }),
    };

    let mut derivation = Vec::with_capacity(arena.len());
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        let node = &arena[node];
        derivation.push(node.production);
        pending.extend(node.children.iter().rev());
    }

    Ok(derivation)
}
