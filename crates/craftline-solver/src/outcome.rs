//! Evaluation outcomes: per-material, per-intermediate, per-recipe.

use craftline_common::{ItemId, JobId, RecipeId};
use serde::{Deserialize, Serialize};

use crate::recipe::RecipeDefinition;

/// Availability of one ingredient for one craft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialOutcome {
    /// Ingredient item
    pub item: ItemId,
    /// Units required per craft
    pub required: u32,
    /// Units usable from inventory (plus any folded intermediate yield)
    pub available: u32,
    /// Units missing for one craft
    pub needed: u32,
    /// Whether one craft's worth is on hand
    pub satisfied: bool,
    /// Only HQ units count
    pub hq_required: bool,
}

impl MaterialOutcome {
    /// Adds units to `available` and recomputes the shortfall.
    pub fn add_available(&mut self, units: u32) {
        self.available = self.available.saturating_add(units);
        self.needed = self.required.saturating_sub(self.available);
        self.satisfied = self.needed == 0;
    }
}

/// Best intermediate craft found for one missing ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntermediateOutcome {
    /// Missing ingredient this would produce
    pub item: ItemId,
    /// Candidate recipe
    pub recipe_id: RecipeId,
    /// Candidate recipe name
    pub recipe_name: String,
    /// Units the parent is short
    pub quantity_needed: u32,
    /// Units the planned crafts would produce
    pub quantity_obtainable: u32,
    /// Crafts of the candidate planned
    pub crafts: u32,
    /// Crafts of the candidate possible right now
    pub max_craftable: u32,
    /// Selection score
    pub score: f64,
    /// True only if the planned crafts fully cover the shortfall
    pub recommended: bool,
    /// Candidate's own material breakdown
    pub materials: Vec<MaterialOutcome>,
}

/// Memoized craftability of one recipe against one inventory state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftabilityRecord {
    /// Recipe evaluated
    pub recipe_id: RecipeId,
    /// Maximum executable crafts
    pub max_craftable: u32,
    /// Every ingredient is on hand for one craft, without intermediates
    pub has_all_materials: bool,
    /// Per-ingredient outcomes from inventory alone
    pub materials: Vec<MaterialOutcome>,
    /// Intermediate crafts considered
    pub intermediates: Vec<IntermediateOutcome>,
}

/// Public per-recipe result.
///
/// Built fresh per call from a record and the recipe definition, so
/// descriptive fields never need cache invalidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftableResult {
    /// Recipe identifier
    pub recipe_id: RecipeId,
    /// Produced item
    pub item_id: ItemId,
    /// Recipe name
    pub name: String,
    /// Crafting job
    pub job: JobId,
    /// Job level required
    pub job_level: u32,
    /// Recipe level
    pub recipe_level: u32,
    /// Items per craft
    pub yield_per_craft: u32,
    /// Output can be HQ
    pub can_hq: bool,
    /// Requires a specialization
    pub is_specialization: bool,
    /// Expert recipe
    pub is_expert: bool,
    /// Maximum executable crafts
    pub max_craftable: u32,
    /// Every ingredient is on hand for one craft
    pub has_all_materials: bool,
    /// Per-ingredient outcomes
    pub materials: Vec<MaterialOutcome>,
    /// Intermediate crafts considered
    pub intermediates: Vec<IntermediateOutcome>,
}

impl CraftableResult {
    /// Projects a record onto a recipe's descriptive fields.
    #[must_use]
    pub fn from_record(recipe: &RecipeDefinition, record: &CraftabilityRecord) -> Self {
        Self {
            recipe_id: recipe.id,
            item_id: recipe.item,
            name: recipe.name.clone(),
            job: recipe.job,
            job_level: recipe.job_level,
            recipe_level: recipe.recipe_level,
            yield_per_craft: recipe.yield_per_craft,
            can_hq: recipe.can_hq,
            is_specialization: recipe.is_specialization,
            is_expert: recipe.is_expert,
            max_craftable: record.max_craftable,
            has_all_materials: record.has_all_materials,
            materials: record.materials.clone(),
            intermediates: record.intermediates.clone(),
        }
    }

    /// Whether at least one craft is possible.
    #[must_use]
    pub const fn is_craftable(&self) -> bool {
        self.max_craftable > 0
    }

    /// Intermediates that fully cover their shortfall.
    pub fn recommended_intermediates(&self) -> impl Iterator<Item = &IntermediateOutcome> {
        self.intermediates.iter().filter(|i| i.recommended)
    }
}
