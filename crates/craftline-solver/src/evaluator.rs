//! Max-craftable evaluation.
//!
//! A recipe's maximum craft count is the minimum over its ingredients of
//! `available / required`. Recipes with no ingredients are not craftable
//! unless [`is_special_recipe`] says otherwise.

use tracing::debug;

use crate::availability;
use crate::error::{SolveError, SolveResult};
use crate::inventory::InventorySnapshot;
use crate::options::SolveOptions;
use crate::outcome::{CraftabilityRecord, MaterialOutcome};
use crate::recipe::RecipeDefinition;
use crate::resolver::IntermediateResolver;

/// Classifies recipes that need no materials at all.
///
/// No recipe is currently classified as special, so zero-ingredient
/// recipes evaluate to zero crafts.
#[must_use]
pub fn is_special_recipe(_recipe: &RecipeDefinition) -> bool {
    false
}

/// Material outcomes and craft count computed from inventory alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Maximum crafts
    pub max_craftable: u32,
    /// Per-ingredient outcomes, in ingredient order
    pub materials: Vec<MaterialOutcome>,
}

/// Computes per-ingredient availability and the resulting craft count.
pub fn evaluate_materials(
    recipe: &RecipeDefinition,
    snapshot: &InventorySnapshot,
    options: &SolveOptions,
) -> SolveResult<Evaluation> {
    recipe
        .validate()
        .map_err(|e| SolveError::InvalidRecipe {
            recipe: recipe.id,
            reason: e.to_string(),
        })?;

    let materials: Vec<MaterialOutcome> = recipe
        .ingredients
        .iter()
        .map(|ingredient| {
            let availability = availability::calculate(ingredient, snapshot, options);
            MaterialOutcome {
                item: ingredient.item,
                required: ingredient.quantity,
                available: availability.available,
                needed: availability.shortfall,
                satisfied: availability.shortfall == 0,
                hq_required: ingredient.hq_required,
            }
        })
        .collect();

    Ok(Evaluation {
        max_craftable: max_craftable(recipe, &materials),
        materials,
    })
}

/// `min(available / required)` over the materials, zero as soon as any
/// material has nothing available.
#[must_use]
pub fn max_craftable(recipe: &RecipeDefinition, materials: &[MaterialOutcome]) -> u32 {
    if materials.is_empty() {
        return if is_special_recipe(recipe) { u32::MAX } else { 0 };
    }

    let mut max = u32::MAX;
    for material in materials {
        if material.available == 0 {
            return 0;
        }
        if material.required > 0 {
            max = max.min(material.available / material.required);
        }
    }
    max
}

/// Evaluates a recipe into a cacheable record.
///
/// With `depth > 0` and resolution enabled, each unsatisfied ingredient is
/// handed to the resolver and recommended intermediate yield is folded back
/// into availability before the craft count is recomputed.
pub fn evaluate_record(
    recipe: &RecipeDefinition,
    snapshot: &InventorySnapshot,
    options: &SolveOptions,
    depth: u8,
    resolver: &IntermediateResolver,
) -> SolveResult<CraftabilityRecord> {
    let Evaluation {
        max_craftable: direct_max,
        materials,
    } = evaluate_materials(recipe, snapshot, options)?;

    let has_all_materials = if materials.is_empty() {
        is_special_recipe(recipe)
    } else {
        materials.iter().all(|m| m.satisfied)
    };

    let mut record = CraftabilityRecord {
        recipe_id: recipe.id,
        max_craftable: direct_max,
        has_all_materials,
        materials,
        intermediates: Vec::new(),
    };

    if depth == 0 || !options.resolve_intermediates || has_all_materials {
        return Ok(record);
    }

    let mut folded = record.materials.clone();
    let mut any_folded = false;
    for material in folded.iter_mut().filter(|m| !m.satisfied) {
        let Some(outcome) = resolver.resolve(recipe, material, snapshot, options, depth) else {
            continue;
        };
        if outcome.recommended {
            material.add_available(outcome.quantity_obtainable.min(material.needed));
            any_folded = true;
        }
        record.intermediates.push(outcome);
    }

    if any_folded {
        record.max_craftable = max_craftable(recipe, &folded);
        debug!(
            recipe = %recipe.id,
            direct = direct_max,
            resolved = record.max_craftable,
            "folded intermediate yield"
        );
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use craftline_common::{ItemId, RecipeId};
    use proptest::prelude::*;
    use std::sync::Arc;

    const A: ItemId = ItemId::new(1);
    const B: ItemId = ItemId::new(2);

    fn r1() -> RecipeDefinition {
        RecipeDefinition::builder(RecipeId::new(1), "R1", ItemId::new(100))
            .ingredient(A, 4)
            .ingredient(B, 1)
            .build()
    }

    fn example_snapshot() -> InventorySnapshot {
        InventorySnapshot::builder().item(A, 10, 0).item(B, 0, 2).build()
    }

    fn empty_resolver() -> IntermediateResolver {
        IntermediateResolver::new(Arc::new(InMemoryCatalog::new()), 16)
    }

    #[test]
    fn test_worked_example_with_substitution() {
        let evaluation = evaluate_materials(&r1(), &example_snapshot(), &SolveOptions::default())
            .expect("evaluate");
        assert_eq!(evaluation.materials[0].available, 10);
        assert_eq!(evaluation.materials[1].available, 1);
        assert_eq!(evaluation.max_craftable, 1);
    }

    #[test]
    fn test_without_substitution_missing_hq_only_item() {
        let options = SolveOptions {
            allow_hq_substitution: false,
            ..SolveOptions::default()
        };
        let evaluation = evaluate_materials(&r1(), &example_snapshot(), &options).expect("evaluate");
        assert_eq!(evaluation.max_craftable, 0);
        assert!(!evaluation.materials[1].satisfied);
        assert_eq!(evaluation.materials[1].needed, 1);
    }

    #[test]
    fn test_zero_ingredient_recipe_not_craftable() {
        let recipe = RecipeDefinition::builder(RecipeId::new(5), "Nothing", ItemId::new(5)).build();
        let record = evaluate_record(
            &recipe,
            &example_snapshot(),
            &SolveOptions::default(),
            1,
            &empty_resolver(),
        )
        .expect("evaluate");
        assert_eq!(record.max_craftable, 0);
        assert!(!record.has_all_materials);
    }

    #[test]
    fn test_invalid_recipe_is_an_error() {
        let recipe = RecipeDefinition::builder(RecipeId::new(6), "Bad", ItemId::new(6))
            .ingredient(A, 0)
            .build();
        assert!(matches!(
            evaluate_materials(&recipe, &example_snapshot(), &SolveOptions::default()),
            Err(SolveError::InvalidRecipe { .. })
        ));
    }

    #[test]
    fn test_no_producer_leaves_count_unchanged() {
        let options = SolveOptions {
            allow_hq_substitution: false,
            resolve_intermediates: true,
            ..SolveOptions::default()
        };
        let record = evaluate_record(&r1(), &example_snapshot(), &options, 1, &empty_resolver())
            .expect("evaluate");
        assert_eq!(record.max_craftable, 0);
        assert!(record.intermediates.is_empty());
        assert!(!record.has_all_materials);
    }

    proptest! {
        #[test]
        fn test_more_material_never_lowers_direct_count(
            a in 0u32..200, b_nq in 0u32..50, b_hq in 0u32..50, extra in 0u32..100
        ) {
            let options = SolveOptions::default();
            let before = InventorySnapshot::builder().item(A, a, 0).item(B, b_nq, b_hq).build();
            let after = InventorySnapshot::builder().item(A, a + extra, 0).item(B, b_nq, b_hq).build();
            let lo = evaluate_materials(&r1(), &before, &options).expect("evaluate").max_craftable;
            let hi = evaluate_materials(&r1(), &after, &options).expect("evaluate").max_craftable;
            prop_assert!(hi >= lo);
        }
    }
}
