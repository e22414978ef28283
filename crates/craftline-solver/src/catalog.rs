//! Recipe catalog interface and an in-memory implementation.

use ahash::AHashMap;
use craftline_common::{CatalogError, CatalogResult, ItemId, RecipeId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::recipe::RecipeDefinition;

/// Read access to static recipe definitions.
///
/// How rows are loaded or indexed is up to the implementation; the solver
/// only depends on typed definitions.
pub trait RecipeCatalog: Send + Sync {
    /// Whether loading has completed. Solving is gated on this.
    fn is_initialized(&self) -> bool;

    /// Looks up a recipe by ID.
    fn recipe(&self, id: RecipeId) -> Option<Arc<RecipeDefinition>>;

    /// Returns every recipe, in catalog order.
    fn all_recipes(&self) -> Vec<Arc<RecipeDefinition>>;

    /// Returns the IDs of recipes whose output is `item`.
    fn recipes_producing(&self, item: ItemId) -> CatalogResult<Vec<RecipeId>>;
}

/// Catalog held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    /// Recipes by ID
    by_id: AHashMap<RecipeId, Arc<RecipeDefinition>>,
    /// Recipe IDs by produced item
    by_output: AHashMap<ItemId, Vec<RecipeId>>,
    /// Registration order
    order: Vec<RecipeId>,
    /// Readiness flag
    initialized: AtomicBool,
}

impl InMemoryCatalog {
    /// Creates an empty, uninitialized catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an initialized catalog from definitions.
    pub fn from_recipes(
        recipes: impl IntoIterator<Item = RecipeDefinition>,
    ) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        for recipe in recipes {
            catalog.register(recipe)?;
        }
        catalog.mark_initialized();
        Ok(catalog)
    }

    /// Registers a recipe after validating it.
    pub fn register(&mut self, recipe: RecipeDefinition) -> CatalogResult<()> {
        recipe.validate()?;
        if self.by_id.contains_key(&recipe.id) {
            return Err(CatalogError::DuplicateId(recipe.id));
        }

        let id = recipe.id;
        self.by_output.entry(recipe.item).or_default().push(id);
        self.order.push(id);
        self.by_id.insert(id, Arc::new(recipe));
        Ok(())
    }

    /// Flags loading as complete.
    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }

    /// Returns the number of registered recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl RecipeCatalog for InMemoryCatalog {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn recipe(&self, id: RecipeId) -> Option<Arc<RecipeDefinition>> {
        self.by_id.get(&id).cloned()
    }

    fn all_recipes(&self) -> Vec<Arc<RecipeDefinition>> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }

    fn recipes_producing(&self, item: ItemId) -> CatalogResult<Vec<RecipeId>> {
        Ok(self.by_output.get(&item).cloned().unwrap_or_default())
    }
}
