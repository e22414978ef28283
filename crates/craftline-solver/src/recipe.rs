//! Static recipe definitions as seen by the solver.
//!
//! Definitions are produced by a catalog loader and are read-only here. The
//! solver never sees how a catalog stores or parses its rows.

use craftline_common::{CatalogError, CatalogResult, ItemId, JobId, RecipeId};
use serde::{Deserialize, Serialize};

/// An ingredient requirement for a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Item type required
    pub item: ItemId,
    /// Quantity required per craft
    pub quantity: u32,
    /// Only high-quality units satisfy this requirement
    #[serde(default)]
    pub hq_required: bool,
}

impl Ingredient {
    /// Creates a new ingredient requirement.
    #[must_use]
    pub const fn new(item: ItemId, quantity: u32) -> Self {
        Self {
            item,
            quantity,
            hq_required: false,
        }
    }

    /// Creates an ingredient that must be high quality.
    #[must_use]
    pub const fn hq(item: ItemId, quantity: u32) -> Self {
        Self {
            item,
            quantity,
            hq_required: true,
        }
    }
}

/// An immutable recipe definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDefinition {
    /// Recipe identifier
    pub id: RecipeId,
    /// Display name
    pub name: String,
    /// Item produced
    pub item: ItemId,
    /// Job that crafts this recipe
    pub job: JobId,
    /// Job level required
    pub job_level: u32,
    /// Recipe level (difficulty tier)
    pub recipe_level: u32,
    /// Items produced per craft
    pub yield_per_craft: u32,
    /// Whether the output can be high quality
    pub can_hq: bool,
    /// Requires a job specialization
    pub is_specialization: bool,
    /// Expert recipe
    pub is_expert: bool,
    /// Ordered ingredient list
    pub ingredients: Vec<Ingredient>,
}

impl RecipeDefinition {
    /// Creates a new recipe builder.
    #[must_use]
    pub fn builder(id: RecipeId, name: impl Into<String>, item: ItemId) -> RecipeBuilder {
        RecipeBuilder::new(id, name, item)
    }

    /// Returns true if any ingredient is the given item.
    #[must_use]
    pub fn requires(&self, item: ItemId) -> bool {
        self.ingredients.iter().any(|i| i.item == item)
    }

    /// Checks structural invariants the evaluator depends on.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.yield_per_craft == 0 {
            return Err(CatalogError::InvalidRecipe {
                recipe: self.id,
                reason: "zero yield per craft".to_string(),
            });
        }

        for (i, ingredient) in self.ingredients.iter().enumerate() {
            if ingredient.quantity == 0 {
                return Err(CatalogError::InvalidRecipe {
                    recipe: self.id,
                    reason: format!("ingredient {i} ({}) has zero quantity", ingredient.item),
                });
            }
        }

        Ok(())
    }
}

/// Builder for creating recipe definitions.
#[derive(Debug)]
pub struct RecipeBuilder {
    recipe: RecipeDefinition,
}

impl RecipeBuilder {
    fn new(id: RecipeId, name: impl Into<String>, item: ItemId) -> Self {
        Self {
            recipe: RecipeDefinition {
                id,
                name: name.into(),
                item,
                job: JobId::default(),
                job_level: 1,
                recipe_level: 1,
                yield_per_craft: 1,
                can_hq: false,
                is_specialization: false,
                is_expert: false,
                ingredients: Vec::new(),
            },
        }
    }

    /// Adds an ingredient requirement.
    #[must_use]
    pub fn ingredient(mut self, item: ItemId, quantity: u32) -> Self {
        self.recipe.ingredients.push(Ingredient::new(item, quantity));
        self
    }

    /// Adds an ingredient that only high-quality units satisfy.
    #[must_use]
    pub fn hq_ingredient(mut self, item: ItemId, quantity: u32) -> Self {
        self.recipe.ingredients.push(Ingredient::hq(item, quantity));
        self
    }

    /// Sets the crafting job and its level requirement.
    #[must_use]
    pub const fn job(mut self, job: JobId, level: u32) -> Self {
        self.recipe.job = job;
        self.recipe.job_level = level;
        self
    }

    /// Sets the recipe level.
    #[must_use]
    pub const fn recipe_level(mut self, level: u32) -> Self {
        self.recipe.recipe_level = level;
        self
    }

    /// Sets the items produced per craft.
    #[must_use]
    pub const fn yield_per_craft(mut self, quantity: u32) -> Self {
        self.recipe.yield_per_craft = quantity;
        self
    }

    /// Marks the output as HQ-capable.
    #[must_use]
    pub const fn can_hq(mut self, can_hq: bool) -> Self {
        self.recipe.can_hq = can_hq;
        self
    }

    /// Marks the recipe as requiring a specialization.
    #[must_use]
    pub const fn specialization(mut self) -> Self {
        self.recipe.is_specialization = true;
        self
    }

    /// Marks the recipe as expert.
    #[must_use]
    pub const fn expert(mut self) -> Self {
        self.recipe.is_expert = true;
        self
    }

    /// Builds the recipe.
    #[must_use]
    pub fn build(self) -> RecipeDefinition {
        self.recipe
    }
}
