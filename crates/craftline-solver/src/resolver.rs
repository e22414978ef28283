//! Intermediate-craft resolution.
//!
//! For an ingredient the player is short on, the resolver looks for a
//! recipe producing it, scores every viable producer and picks the best.
//! Resolution is exactly one level deep: candidates are evaluated with the
//! dependency-safe option set and a remaining depth of zero.
//!
//! Scoring (higher is better):
//!
//! | term | value |
//! |------|-------|
//! | craftable now | `100 * max_craftable` |
//! | material efficiency | `50 * yield / ingredient_count`, or `200` with no ingredients |
//! | low recipe level | `max(0, 100 - recipe_level)` |
//! | coverage | `150 - waste` when projected yield covers the need, else `100 * projected / need` |
//! | specialization | `-75` |
//! | expert | `-100` |
//!
//! Waste is the overproduction of the crafts actually required, as a share
//! of the need, scaled to at most 50.
//!
//! Producers that can cover the whole shortfall always rank ahead of those
//! that cannot; the score only orders candidates within each group. More
//! inventory therefore never swaps a covering pick for a partial one.

use craftline_common::{CatalogResult, ItemId, RecipeId};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::catalog::RecipeCatalog;
use crate::evaluator;
use crate::inventory::InventorySnapshot;
use crate::options::SolveOptions;
use crate::outcome::{IntermediateOutcome, MaterialOutcome};
use crate::recipe::RecipeDefinition;

/// Maximum waste penalty.
const MAX_WASTE_PENALTY: f64 = 50.0;

/// Bounded, concurrent item → producing-recipe index.
pub struct ProducerIndex {
    entries: DashMap<ItemId, Arc<[RecipeId]>>,
    capacity: usize,
}

impl ProducerIndex {
    /// Creates an empty index holding at most `capacity` items.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Returns the producers of `item`, loading them from the catalog on miss.
    pub fn producers(
        &self,
        item: ItemId,
        catalog: &dyn RecipeCatalog,
    ) -> CatalogResult<Arc<[RecipeId]>> {
        if let Some(hit) = self.entries.get(&item) {
            return Ok(Arc::clone(hit.value()));
        }

        let loaded: Arc<[RecipeId]> = catalog.recipes_producing(item)?.into();

        if self.entries.len() >= self.capacity {
            trace!(capacity = self.capacity, "producer index full, clearing");
            self.entries.clear();
        }

        let entry = self.entries.entry(item).or_insert(loaded);
        Ok(Arc::clone(entry.value()))
    }

    /// Number of items indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every indexed item.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for ProducerIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerIndex")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Finds and scores intermediate crafts for missing ingredients.
pub struct IntermediateResolver {
    catalog: Arc<dyn RecipeCatalog>,
    index: ProducerIndex,
}

impl IntermediateResolver {
    /// Creates a resolver over a catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn RecipeCatalog>, index_capacity: usize) -> Self {
        Self {
            catalog,
            index: ProducerIndex::new(index_capacity),
        }
    }

    /// Returns the producer index.
    #[must_use]
    pub const fn index(&self) -> &ProducerIndex {
        &self.index
    }

    /// Picks the best intermediate craft for `material` of `parent`.
    ///
    /// Returns `None` when nothing produces the item, every producer is
    /// cyclic, or no producer can be crafted right now. Failures while
    /// evaluating a candidate only drop that candidate.
    pub fn resolve(
        &self,
        parent: &RecipeDefinition,
        material: &MaterialOutcome,
        snapshot: &InventorySnapshot,
        options: &SolveOptions,
        depth: u8,
    ) -> Option<IntermediateOutcome> {
        if depth == 0 || material.satisfied {
            return None;
        }

        let target = material.item;
        let need = material.needed;

        let producers = match self.index.producers(target, self.catalog.as_ref()) {
            Ok(producers) => producers,
            Err(e) => {
                debug!(item = %target, error = %e, "producer lookup failed");
                return None;
            },
        };

        let safe = options.dependency_safe();
        let mut best: Option<(bool, f64, Arc<RecipeDefinition>, evaluator::Evaluation)> = None;

        for &candidate_id in producers.iter() {
            let Some(candidate) = self.catalog.recipe(candidate_id) else {
                debug!(recipe = %candidate_id, "producer missing from catalog");
                continue;
            };

            if self.is_cyclic(&candidate, target, parent) {
                trace!(candidate = %candidate.id, item = %target, "rejected cyclic candidate");
                continue;
            }

            let evaluation = match evaluator::evaluate_materials(&candidate, snapshot, &safe) {
                Ok(evaluation) => evaluation,
                Err(e) => {
                    debug!(candidate = %candidate.id, error = %e, "candidate evaluation failed");
                    continue;
                },
            };

            if evaluation.max_craftable == 0 {
                continue;
            }

            let score = score_candidate(&candidate, evaluation.max_craftable, need);
            let covers = covers_need(&candidate, evaluation.max_craftable, need);
            trace!(candidate = %candidate.id, score, covers, "scored candidate");
            if best
                .as_ref()
                .map_or(true, |(top_covers, top, _, _)| (covers, score) > (*top_covers, *top))
            {
                best = Some((covers, score, candidate, evaluation));
            }
        }

        let (_, score, candidate, evaluation) = best?;
        let yield_per_craft = candidate.yield_per_craft;
        let times_needed = need.div_ceil(yield_per_craft);
        let crafts = evaluation.max_craftable.min(times_needed);
        let obtainable = crafts.saturating_mul(yield_per_craft);

        Some(IntermediateOutcome {
            item: target,
            recipe_id: candidate.id,
            recipe_name: candidate.name.clone(),
            quantity_needed: need,
            quantity_obtainable: obtainable,
            crafts,
            max_craftable: evaluation.max_craftable,
            score,
            recommended: crafts > 0 && obtainable >= need,
            materials: evaluation.materials,
        })
    }

    /// A candidate is cyclic when it is the parent itself, needs the target
    /// or the parent's output directly, or needs an ingredient whose own
    /// producers need the target. The transitive check stops at one level.
    fn is_cyclic(
        &self,
        candidate: &RecipeDefinition,
        target: ItemId,
        parent: &RecipeDefinition,
    ) -> bool {
        if candidate.id == parent.id
            || candidate.requires(target)
            || candidate.requires(parent.item)
        {
            return true;
        }

        candidate.ingredients.iter().any(|ingredient| {
            let producers = match self.index.producers(ingredient.item, self.catalog.as_ref()) {
                Ok(producers) => producers,
                Err(_) => return false,
            };
            producers.iter().any(|&id| {
                self.catalog
                    .recipe(id)
                    .is_some_and(|producer| producer.requires(target))
            })
        })
    }
}

impl std::fmt::Debug for IntermediateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntermediateResolver")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Whether `max_craftable` crafts of `candidate` yield at least `need` units.
fn covers_need(candidate: &RecipeDefinition, max_craftable: u32, need: u32) -> bool {
    max_craftable.saturating_mul(candidate.yield_per_craft) >= need
}

/// Scores a producing recipe for covering `need` units.
#[must_use]
pub fn score_candidate(candidate: &RecipeDefinition, max_craftable: u32, need: u32) -> f64 {
    let yield_per_craft = f64::from(candidate.yield_per_craft);
    let need_f = f64::from(need.max(1));

    let mut score = 100.0 * f64::from(max_craftable);

    score += if candidate.ingredients.is_empty() {
        200.0
    } else {
        yield_per_craft / candidate.ingredients.len() as f64 * 50.0
    };

    score += f64::from(100u32.saturating_sub(candidate.recipe_level));

    let projected = f64::from(max_craftable) * yield_per_craft;
    if projected >= need_f {
        let crafts_needed = (need_f / yield_per_craft).ceil();
        let excess = crafts_needed * yield_per_craft - need_f;
        let waste = (excess / need_f * 100.0).min(MAX_WASTE_PENALTY);
        score += 150.0 - waste;
    } else {
        score += projected / need_f * 100.0;
    }

    if candidate.is_specialization {
        score -= 75.0;
    }
    if candidate.is_expert {
        score -= 100.0;
    }

    score
}
