//! Per-ingredient availability.
//!
//! Rules, in order:
//! 1. an item not held at all is unavailable;
//! 2. with separate HQ pools, only the tier the ingredient asks for counts;
//! 3. an HQ-required ingredient only counts HQ units;
//! 4. otherwise NQ units count first and HQ units (when substitution is on)
//!    top up only the remaining per-craft shortfall.

use crate::inventory::InventorySnapshot;
use crate::options::SolveOptions;
use crate::recipe::Ingredient;

/// Units usable for one ingredient and the per-craft shortfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Availability {
    /// Units usable for this ingredient
    pub available: u32,
    /// Units missing for a single craft
    pub shortfall: u32,
}

impl Availability {
    fn for_required(available: u32, required: u32) -> Self {
        Self {
            available,
            shortfall: required.saturating_sub(available),
        }
    }
}

/// Computes how many units of `ingredient` the snapshot can supply.
#[must_use]
pub fn calculate(
    ingredient: &Ingredient,
    snapshot: &InventorySnapshot,
    options: &SolveOptions,
) -> Availability {
    let required = ingredient.quantity;
    if !snapshot.contains(ingredient.item) {
        return Availability::for_required(0, required);
    }

    let held = snapshot.quantity(ingredient.item);

    let available = if options.separate_hq_pool {
        if ingredient.hq_required {
            held.hq
        } else {
            held.nq
        }
    } else if ingredient.hq_required {
        held.hq
    } else if options.allow_hq_substitution {
        let missing = required.saturating_sub(held.nq);
        held.nq.saturating_add(missing.min(held.hq))
    } else {
        held.nq
    };

    Availability::for_required(available, required)
}
