//! Error types shared by Craftline crates.

use thiserror::Error;

use crate::ids::{ItemId, RecipeId};

/// Top-level error type for Craftline operations.
#[derive(Debug, Error)]
pub enum CraftlineError {
    /// Recipe catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Inventory collaborator errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a recipe catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog has not finished loading
    #[error("Recipe catalog is not initialized")]
    NotInitialized,

    /// Recipe lookup failed
    #[error("Recipe not found: {0}")]
    RecipeNotFound(RecipeId),

    /// Produced-item lookup failed in the backing store
    #[error("Producer lookup failed for {item}: {reason}")]
    LookupFailed {
        /// Item being looked up
        item: ItemId,
        /// Backend failure description
        reason: String,
    },

    /// Recipe rejected on registration
    #[error("Invalid recipe {recipe}: {reason}")]
    InvalidRecipe {
        /// Offending recipe
        recipe: RecipeId,
        /// Why it was rejected
        reason: String,
    },

    /// Recipe ID registered twice
    #[error("Duplicate recipe ID: {0}")]
    DuplicateId(RecipeId),
}

/// Errors raised by the inventory collaborator.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Inventory source is not reachable right now
    #[error("Inventory source unavailable: {0}")]
    Unavailable(String),

    /// Scan started but did not complete
    #[error("Inventory scan failed: {0}")]
    ScanFailed(String),

    /// Scan produced data that could not be interpreted
    #[error("Malformed inventory data: {0}")]
    Malformed(String),
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Result type alias for Craftline operations.
pub type CraftlineResult<T> = Result<T, CraftlineError>;
