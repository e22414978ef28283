//! Solver error types.

use craftline_common::{CatalogError, InventoryError, RecipeId};
use thiserror::Error;

/// Solver error types.
#[derive(Debug, Error)]
pub enum SolveError {
    /// Recipe violates an evaluation invariant
    #[error("Invalid recipe {recipe}: {reason}")]
    InvalidRecipe {
        /// Offending recipe
        recipe: RecipeId,
        /// What is wrong with it
        reason: String,
    },
    /// Recipe referenced but missing from the catalog
    #[error("Recipe not found: {0}")]
    RecipeNotFound(RecipeId),
    /// Catalog collaborator failure
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    /// Inventory collaborator failure
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
    /// Evaluation of a single recipe panicked
    #[error("Evaluation of {recipe} panicked: {message}")]
    EvaluationPanicked {
        /// Recipe being evaluated
        recipe: RecipeId,
        /// Panic payload, if it was a string
        message: String,
    },
    /// Solve was cancelled by the caller
    #[error("Solve cancelled")]
    Cancelled,
}

/// Result type for solver operations.
pub type SolveResult<T> = Result<T, SolveError>;
