//! Recipe catalog loading.
//!
//! Reads a TOML file of `[[recipes]]` tables into an [`InMemoryCatalog`].
//! Invalid or duplicate recipes are skipped with a warning and counted, so
//! one bad row does not prevent solving the rest.

use std::fs;
use std::path::{Path, PathBuf};

use craftline_common::{CatalogError, ItemId, JobId, RecipeId};
use craftline_solver::catalog::InMemoryCatalog;
use craftline_solver::recipe::RecipeDefinition;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during catalog loading.
#[derive(Debug, Error)]
pub enum RecipeLoadError {
    /// File not found.
    #[error("Recipe file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read recipe file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse recipe TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Result type for catalog loading operations.
pub type RecipeLoadResult<T> = Result<T, RecipeLoadError>;

/// A recipe ingredient row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientEntry {
    /// Item consumed.
    pub item_id: u32,
    /// Units per craft.
    pub quantity: u32,
    /// Whether only high-quality units count.
    #[serde(default)]
    pub hq: bool,
}

/// A recipe row as written in the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeEntry {
    /// Unique recipe identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Item produced.
    pub item_id: u32,
    /// Crafting job.
    #[serde(default)]
    pub job: u8,
    /// Job level required.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Recipe difficulty level; defaults to the job level.
    #[serde(default)]
    pub recipe_level: Option<u32>,
    /// Units produced per craft.
    #[serde(default = "default_yield", rename = "yield")]
    pub yield_per_craft: u32,
    /// Whether the output can be high quality.
    #[serde(default)]
    pub can_hq: bool,
    /// Specialist-only recipe.
    #[serde(default)]
    pub specialization: bool,
    /// Expert recipe.
    #[serde(default)]
    pub expert: bool,
    /// Ingredients consumed per craft.
    #[serde(default)]
    pub ingredients: Vec<IngredientEntry>,
}

const fn default_level() -> u32 {
    1
}

const fn default_yield() -> u32 {
    1
}

impl RecipeEntry {
    /// Converts the row into a solver recipe definition.
    #[must_use]
    pub fn to_definition(&self) -> RecipeDefinition {
        let mut builder =
            RecipeDefinition::builder(RecipeId::new(self.id), &self.name, ItemId::new(self.item_id))
                .job(JobId::new(self.job), self.level)
                .recipe_level(self.recipe_level.unwrap_or(self.level))
                .yield_per_craft(self.yield_per_craft)
                .can_hq(self.can_hq);

        if self.specialization {
            builder = builder.specialization();
        }
        if self.expert {
            builder = builder.expert();
        }

        for ingredient in &self.ingredients {
            let item = ItemId::new(ingredient.item_id);
            builder = if ingredient.hq {
                builder.hq_ingredient(item, ingredient.quantity)
            } else {
                builder.ingredient(item, ingredient.quantity)
            };
        }

        builder.build()
    }
}

/// A catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeFile {
    /// Recipes in file order.
    #[serde(default)]
    pub recipes: Vec<RecipeEntry>,
}

/// A recipe rejected while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecipe {
    /// Recipe ID as written in the file.
    pub id: u32,
    /// Why it was rejected.
    pub reason: String,
}

/// Statistics for a catalog load.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CatalogLoadStats {
    /// Rows read from the file.
    pub rows_read: usize,
    /// Recipes registered.
    pub recipes_loaded: usize,
    /// Rows skipped with the reason.
    pub rejected: Vec<RejectedRecipe>,
}

/// Loads a catalog file and marks the catalog initialized.
pub fn load_catalog(path: &Path) -> RecipeLoadResult<(InMemoryCatalog, CatalogLoadStats)> {
    if !path.exists() {
        return Err(RecipeLoadError::NotFound(path.to_path_buf()));
    }

    debug!("Loading recipe file: {:?}", path);
    let content = fs::read_to_string(path)?;
    let file: RecipeFile = toml::from_str(&content)?;

    let (catalog, stats) = build_catalog(file.recipes);
    info!(
        "Loaded {} of {} recipes from {:?}",
        stats.recipes_loaded, stats.rows_read, path
    );
    Ok((catalog, stats))
}

/// Registers rows into a fresh catalog, skipping rows that fail validation.
pub fn build_catalog(rows: Vec<RecipeEntry>) -> (InMemoryCatalog, CatalogLoadStats) {
    let mut catalog = InMemoryCatalog::new();
    let mut stats = CatalogLoadStats {
        rows_read: rows.len(),
        ..CatalogLoadStats::default()
    };

    for row in rows {
        let id = row.id;
        match catalog.register(row.to_definition()) {
            Ok(()) => stats.recipes_loaded += 1,
            Err(e) => {
                warn!("Skipping recipe {id}: {e}");
                let reason = match e {
                    CatalogError::InvalidRecipe { reason, .. } => reason,
                    other => other.to_string(),
                };
                stats.rejected.push(RejectedRecipe { id, reason });
            },
        }
    }

    catalog.mark_initialized();
    (catalog, stats)
}
