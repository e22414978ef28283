//! Per-call solve options.

use craftline_common::JobId;
use serde::{Deserialize, Serialize};

use crate::recipe::RecipeDefinition;

/// Options for one solve call. Immutable for the duration of the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Jobs to include (empty = all jobs)
    pub jobs: Vec<JobId>,
    /// Lowest job level to include
    pub min_level: Option<u32>,
    /// Highest job level to include
    pub max_level: Option<u32>,
    /// Include expert recipes
    pub include_expert: bool,
    /// Include specialization recipes
    pub include_specialization: bool,
    /// Let HQ units cover an NQ shortfall
    pub allow_hq_substitution: bool,
    /// Treat NQ and HQ as fully separate pools
    pub separate_hq_pool: bool,
    /// Try to cover shortfalls by crafting an intermediate item first
    pub resolve_intermediates: bool,
    /// Consult the job-level gate while filtering
    pub enforce_job_levels: bool,
    /// Allow parallel evaluation
    pub parallel: bool,
    /// Maximum worker threads (0 = one per core)
    pub max_parallelism: usize,
    /// Cap on the number of recipes processed
    pub max_recipes: Option<usize>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            min_level: None,
            max_level: None,
            include_expert: true,
            include_specialization: true,
            allow_hq_substitution: true,
            separate_hq_pool: false,
            resolve_intermediates: false,
            enforce_job_levels: false,
            parallel: true,
            max_parallelism: 0,
            max_recipes: None,
        }
    }
}

impl SolveOptions {
    /// Derives the restricted variant used while evaluating intermediate
    /// candidates: no further resolution and no fan-out.
    #[must_use]
    pub fn dependency_safe(&self) -> Self {
        Self {
            resolve_intermediates: false,
            parallel: false,
            max_parallelism: 1,
            max_recipes: None,
            ..self.clone()
        }
    }

    /// Returns the option flags that change a recipe's evaluation.
    #[must_use]
    pub const fn result_flags(&self) -> ResultFlags {
        ResultFlags {
            hq_substitution: self.allow_hq_substitution,
            separate_hq_pool: self.separate_hq_pool,
            resolve_intermediates: self.resolve_intermediates,
        }
    }

    /// Remaining intermediate-resolution depth for a top-level evaluation.
    #[must_use]
    pub const fn resolution_depth(&self) -> u8 {
        if self.resolve_intermediates {
            1
        } else {
            0
        }
    }

    /// Whether fan-out is allowed at all.
    #[must_use]
    pub const fn allows_parallelism(&self) -> bool {
        self.parallel && self.max_parallelism != 1
    }

    /// Applies the job, level, expert and specialization filters.
    #[must_use]
    pub fn matches(&self, recipe: &RecipeDefinition) -> bool {
        if !self.jobs.is_empty() && !self.jobs.contains(&recipe.job) {
            return false;
        }
        if self.min_level.is_some_and(|min| recipe.job_level < min) {
            return false;
        }
        if self.max_level.is_some_and(|max| recipe.job_level > max) {
            return false;
        }
        if recipe.is_expert && !self.include_expert {
            return false;
        }
        if recipe.is_specialization && !self.include_specialization {
            return false;
        }
        true
    }
}

/// The subset of options that affects a cached craftability record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResultFlags {
    /// HQ substitution enabled
    pub hq_substitution: bool,
    /// Separate HQ pool enabled
    pub separate_hq_pool: bool,
    /// Intermediate resolution enabled
    pub resolve_intermediates: bool,
}
