//! Solve orchestration.
//!
//! A solve filters the catalog, evaluates each selected recipe through the
//! craftability cache, and returns one result per evaluated recipe in
//! processing order. Large batches fan out over a rayon pool; each recipe
//! is isolated so one failure only drops that recipe.

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Span};

use crate::cache::{CacheKey, CraftabilityCache};
use crate::cancel::CancellationToken;
use crate::catalog::RecipeCatalog;
use crate::config::SolverConfig;
use crate::error::{SolveError, SolveResult};
use crate::evaluator;
use crate::events::{EventBus, SolverEvent};
use crate::inventory::{InventorySnapshot, InventorySource, ScanOptions};
use crate::jobs::{JobLevelGate, PermitAll};
use crate::metrics::{PerformanceSnapshot, SolveMetrics};
use crate::options::SolveOptions;
use crate::outcome::CraftableResult;
use crate::recipe::RecipeDefinition;
use crate::resolver::IntermediateResolver;

/// Entry point for craftability solving.
pub struct CraftabilitySolver {
    catalog: Arc<dyn RecipeCatalog>,
    config: SolverConfig,
    cache: CraftabilityCache,
    resolver: IntermediateResolver,
    gate: Arc<dyn JobLevelGate>,
    events: Arc<EventBus>,
    metrics: SolveMetrics,
    pool: Mutex<Option<(usize, Arc<ThreadPool>)>>,
    last_results: RwLock<Arc<[CraftableResult]>>,
}

impl CraftabilitySolver {
    /// Creates a solver over a catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn RecipeCatalog>, config: SolverConfig) -> Self {
        let events = Arc::new(EventBus::new(config.event_capacity));
        let cache = CraftabilityCache::new(
            config.cache_capacity,
            config.eviction_fraction,
            config.cache_max_age(),
        )
        .with_event_sender(events.sender());
        let resolver = IntermediateResolver::new(Arc::clone(&catalog), config.producer_index_capacity);

        Self {
            catalog,
            cache,
            resolver,
            gate: Arc::new(PermitAll),
            events,
            metrics: SolveMetrics::new(config.metrics_window),
            pool: Mutex::new(None),
            last_results: RwLock::new(Arc::from(Vec::new())),
            config,
        }
    }

    /// Replaces the job-level gate consulted when options enforce levels.
    #[must_use]
    pub fn with_job_gate(mut self, gate: Arc<dyn JobLevelGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Returns the notification bus.
    #[must_use]
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Returns the craftability cache.
    #[must_use]
    pub const fn cache(&self) -> &CraftabilityCache {
        &self.cache
    }

    /// Returns the solver configuration.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves against a snapshot.
    pub fn solve(&self, snapshot: &InventorySnapshot, options: &SolveOptions) -> Vec<CraftableResult> {
        self.solve_with_cancel(snapshot, options, &CancellationToken::new())
    }

    /// Solves against a snapshot, checking `cancel` between recipes.
    ///
    /// A cancelled call returns no results and leaves the last successful
    /// result set in place.
    pub fn solve_with_cancel(
        &self,
        snapshot: &InventorySnapshot,
        options: &SolveOptions,
        cancel: &CancellationToken,
    ) -> Vec<CraftableResult> {
        let span = info_span!(
            "solve",
            fingerprint = %snapshot.fingerprint(),
            recipes = tracing::field::Empty
        );
        let _enter = span.enter();

        match self.run(snapshot, options, cancel) {
            Ok(results) => results,
            Err(e) => {
                debug!(reason = %e, "solve produced no results");
                Vec::new()
            },
        }
    }

    fn run(
        &self,
        snapshot: &InventorySnapshot,
        options: &SolveOptions,
        cancel: &CancellationToken,
    ) -> SolveResult<Vec<CraftableResult>> {
        let started = Instant::now();

        if !self.catalog.is_initialized() {
            warn!("recipe catalog not initialized, returning no results");
            return Ok(Vec::new());
        }

        self.cache.observe_fingerprint(snapshot.fingerprint());

        let recipes = self.select_recipes(options);
        let parallel =
            options.allows_parallelism() && recipes.len() >= self.config.parallel_threshold;
        Span::current().record("recipes", recipes.len());
        debug!(parallel, "evaluating recipes");

        let outcomes = match parallel.then(|| self.worker_pool(options.max_parallelism)).flatten() {
            Some(pool) => pool.install(|| {
                recipes
                    .par_iter()
                    .map(|recipe| self.evaluate_unless_cancelled(recipe, snapshot, options, cancel))
                    .collect::<Vec<_>>()
            }),
            None => recipes
                .iter()
                .map(|recipe| self.evaluate_unless_cancelled(recipe, snapshot, options, cancel))
                .take_while(Option::is_some)
                .collect(),
        };

        if cancel.is_cancelled() {
            return Err(SolveError::Cancelled);
        }

        let mut results = Vec::with_capacity(outcomes.len());
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => warn!(error = %e, "recipe evaluation failed, skipping"),
            }
        }

        let elapsed = started.elapsed();
        let craftable_count = results.iter().filter(|r| r.is_craftable()).count();
        self.metrics.record(elapsed);
        self.events.publish(SolverEvent::SolveCompleted {
            craftable_count,
            recipes_processed: recipes.len(),
            elapsed,
        });
        *self.last_results.write() = Arc::from(results.clone());

        info!(
            craftable = craftable_count,
            processed = recipes.len(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "solve completed"
        );
        Ok(results)
    }

    /// Scans the inventory source, then solves.
    ///
    /// Scan failures propagate to the caller.
    pub async fn solve_from_source<S>(
        &self,
        source: &S,
        scan_options: &ScanOptions,
        options: &SolveOptions,
        cancel: &CancellationToken,
    ) -> SolveResult<Vec<CraftableResult>>
    where
        S: InventorySource + ?Sized,
    {
        let snapshot = source.scan(scan_options).await?;
        debug!(items = snapshot.len(), fingerprint = %snapshot.fingerprint(), "inventory scanned");
        Ok(self.solve_with_cancel(&snapshot, options, cancel))
    }

    /// Evaluates a single recipe through the cache.
    pub fn evaluate_recipe(
        &self,
        recipe: &RecipeDefinition,
        snapshot: &InventorySnapshot,
        options: &SolveOptions,
    ) -> SolveResult<CraftableResult> {
        let key = CacheKey::new(recipe.id, snapshot.fingerprint(), options.result_flags());
        let record = self.cache.get_or_compute(key, || {
            evaluator::evaluate_record(
                recipe,
                snapshot,
                options,
                options.resolution_depth(),
                &self.resolver,
            )
        })?;
        Ok(CraftableResult::from_record(recipe, &record))
    }

    /// Clears the cache and publishes an invalidation notification.
    pub fn invalidate_cache(&self) -> usize {
        self.cache.invalidate()
    }

    /// Returns the most recent successful result set.
    #[must_use]
    pub fn last_results(&self) -> Arc<[CraftableResult]> {
        Arc::clone(&self.last_results.read())
    }

    /// Returns current performance figures.
    #[must_use]
    pub fn performance(&self) -> PerformanceSnapshot {
        let stats = self.cache.stats();
        PerformanceSnapshot {
            average_solve_time: self.metrics.average(),
            last_solve_time: self.metrics.last(),
            cache_hit_rate: stats.hit_rate(),
            cache_size: stats.entries,
            total_solves: self.metrics.total_solves(),
            is_ready: self.catalog.is_initialized(),
        }
    }

    fn select_recipes(&self, options: &SolveOptions) -> Vec<Arc<RecipeDefinition>> {
        let mut selected: Vec<_> = self
            .catalog
            .all_recipes()
            .into_iter()
            .filter(|recipe| options.matches(recipe))
            .filter(|recipe| {
                !options.enforce_job_levels || self.gate.permits(recipe.job, recipe.job_level)
            })
            .collect();

        if let Some(cap) = options.max_recipes {
            selected.truncate(cap);
        }
        selected
    }

    fn evaluate_unless_cancelled(
        &self,
        recipe: &RecipeDefinition,
        snapshot: &InventorySnapshot,
        options: &SolveOptions,
        cancel: &CancellationToken,
    ) -> Option<SolveResult<CraftableResult>> {
        if cancel.is_cancelled() {
            return None;
        }
        Some(self.evaluate_isolated(recipe, snapshot, options))
    }

    fn evaluate_isolated(
        &self,
        recipe: &RecipeDefinition,
        snapshot: &InventorySnapshot,
        options: &SolveOptions,
    ) -> SolveResult<CraftableResult> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.evaluate_recipe(recipe, snapshot, options)
        }))
        .unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            Err(SolveError::EvaluationPanicked {
                recipe: recipe.id,
                message,
            })
        })
    }

    fn worker_pool(&self, degree: usize) -> Option<Arc<ThreadPool>> {
        let mut slot = self.pool.lock();
        if let Some((built_for, pool)) = slot.as_ref() {
            if *built_for == degree {
                return Some(Arc::clone(pool));
            }
        }

        match ThreadPoolBuilder::new()
            .num_threads(degree)
            .thread_name(|i| format!("craftline-solve-{i}"))
            .build()
        {
            Ok(pool) => {
                let pool = Arc::new(pool);
                *slot = Some((degree, Arc::clone(&pool)));
                Some(pool)
            },
            Err(e) => {
                warn!(error = %e, "failed to build worker pool, evaluating sequentially");
                None
            },
        }
    }
}

impl std::fmt::Debug for CraftabilitySolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CraftabilitySolver")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::events::InvalidationReason;
    use crate::inventory::StaticInventorySource;
    use craftline_common::{
        CatalogResult, InventoryError, InventoryResult, ItemId, JobId, RecipeId,
    };
    use proptest::prelude::*;

    const A: ItemId = ItemId::new(1);
    const B: ItemId = ItemId::new(2);
    const ORE: ItemId = ItemId::new(3);

    fn r1() -> RecipeDefinition {
        RecipeDefinition::builder(RecipeId::new(1), "R1", ItemId::new(100))
            .ingredient(A, 4)
            .ingredient(B, 1)
            .job(JobId::new(1), 10)
            .build()
    }

    fn b_from_ore() -> RecipeDefinition {
        RecipeDefinition::builder(RecipeId::new(2), "B", B)
            .ingredient(ORE, 2)
            .job(JobId::new(2), 5)
            .build()
    }

    fn empty_recipe() -> RecipeDefinition {
        RecipeDefinition::builder(RecipeId::new(3), "Nothing", ItemId::new(300))
            .job(JobId::new(1), 1)
            .build()
    }

    fn solver_with(recipes: Vec<RecipeDefinition>) -> CraftabilitySolver {
        let catalog = InMemoryCatalog::from_recipes(recipes).expect("catalog");
        CraftabilitySolver::new(Arc::new(catalog), SolverConfig::default())
    }

    fn example_snapshot() -> InventorySnapshot {
        InventorySnapshot::builder().item(A, 10, 0).item(B, 0, 2).build()
    }

    fn find(results: &[CraftableResult], id: u32) -> &CraftableResult {
        results
            .iter()
            .find(|r| r.recipe_id == RecipeId::new(id))
            .expect("result present")
    }

    #[test]
    fn test_worked_example() {
        let solver = solver_with(vec![r1()]);
        let results = solver.solve(&example_snapshot(), &SolveOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].max_craftable, 1);
        assert!(results[0].has_all_materials);
    }

    #[test]
    fn test_worked_example_without_producer() {
        let solver = solver_with(vec![r1()]);
        let options = SolveOptions {
            resolve_intermediates: true,
            ..SolveOptions::default()
        };
        let results = solver.solve(&example_snapshot(), &options);
        assert_eq!(results[0].max_craftable, 1);
        assert!(results[0].has_all_materials);
        assert!(results[0].intermediates.is_empty());
    }

    #[test]
    fn test_zero_craftable_results_are_returned() {
        let solver = solver_with(vec![r1(), empty_recipe()]);
        let results = solver.solve(&InventorySnapshot::empty(), &SolveOptions::default());
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.max_craftable == 0));
        assert!(!find(&results, 3).has_all_materials);
    }

    #[test]
    fn test_results_in_filter_order() {
        let solver = solver_with(vec![b_from_ore(), r1(), empty_recipe()]);
        let options = SolveOptions {
            parallel: false,
            ..SolveOptions::default()
        };
        let ids: Vec<_> = solver
            .solve(&example_snapshot(), &options)
            .iter()
            .map(|r| r.recipe_id.raw())
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_filters_and_cap() {
        let solver = solver_with(vec![r1(), b_from_ore(), empty_recipe()]);
        let by_job = SolveOptions {
            jobs: vec![JobId::new(1)],
            ..SolveOptions::default()
        };
        assert_eq!(solver.solve(&example_snapshot(), &by_job).len(), 2);

        let capped = SolveOptions {
            max_recipes: Some(1),
            ..SolveOptions::default()
        };
        let results = solver.solve(&example_snapshot(), &capped);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe_id, RecipeId::new(1));
    }

    #[test]
    fn test_job_gate_only_applies_when_enforced() {
        let deny_all = |_: JobId, _: u32| false;
        struct Deny<F>(F);
        impl<F: Fn(JobId, u32) -> bool + Send + Sync> JobLevelGate for Deny<F> {
            fn permits(&self, job: JobId, level: u32) -> bool {
                (self.0)(job, level)
            }
        }

        let solver = solver_with(vec![r1()]).with_job_gate(Arc::new(Deny(deny_all)));
        assert_eq!(solver.solve(&example_snapshot(), &SolveOptions::default()).len(), 1);

        let enforcing = SolveOptions {
            enforce_job_levels: true,
            ..SolveOptions::default()
        };
        assert!(solver.solve(&example_snapshot(), &enforcing).is_empty());
    }

    #[test]
    fn test_not_ready_catalog_returns_empty() {
        let catalog = InMemoryCatalog::new();
        let solver = CraftabilitySolver::new(Arc::new(catalog), SolverConfig::default());
        assert!(solver.solve(&example_snapshot(), &SolveOptions::default()).is_empty());
        assert!(!solver.performance().is_ready);
        assert!(solver.events().drain().is_empty());
    }

    #[test]
    fn test_warm_cache_matches_cold() {
        let solver = solver_with(vec![r1(), b_from_ore()]);
        let options = SolveOptions {
            resolve_intermediates: true,
            ..SolveOptions::default()
        };
        let snapshot = InventorySnapshot::builder().nq(A, 10).nq(ORE, 4).build();

        let cold = solver.solve(&snapshot, &options);
        let warm = solver.solve(&snapshot, &options);
        assert_eq!(cold, warm);
        assert!(solver.performance().cache_hit_rate > 0.0);
    }

    #[test]
    fn test_intermediate_resolution_end_to_end() {
        let solver = solver_with(vec![r1(), b_from_ore()]);
        let snapshot = InventorySnapshot::builder().nq(A, 10).nq(ORE, 4).build();

        let plain = solver.solve(&snapshot, &SolveOptions::default());
        assert_eq!(find(&plain, 1).max_craftable, 0);

        let options = SolveOptions {
            resolve_intermediates: true,
            ..SolveOptions::default()
        };
        let resolved = solver.solve(&snapshot, &options);
        let r1 = find(&resolved, 1);
        assert_eq!(r1.max_craftable, 1);
        assert!(!r1.has_all_materials);
        assert_eq!(r1.recommended_intermediates().count(), 1);
        assert_eq!(r1.intermediates[0].recipe_id, RecipeId::new(2));
    }

    #[test]
    fn test_fingerprint_change_refreshes_results() {
        let solver = solver_with(vec![r1()]);
        let options = SolveOptions::default();

        let before = solver.solve(&example_snapshot(), &options);
        assert_eq!(before[0].max_craftable, 1);

        let richer = InventorySnapshot::builder().item(A, 12, 0).item(B, 3, 0).build();
        let after = solver.solve(&richer, &options);
        assert_eq!(after[0].max_craftable, 3);

        let invalidations = solver
            .events()
            .drain()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    SolverEvent::CacheInvalidated {
                        reason: InvalidationReason::FingerprintChanged,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(invalidations, 1);
    }

    #[test]
    fn test_solve_completed_published() {
        let solver = solver_with(vec![r1(), empty_recipe()]);
        solver.solve(&example_snapshot(), &SolveOptions::default());
        let events = solver.events().drain();
        assert!(events.iter().any(|e| matches!(
            e,
            SolverEvent::SolveCompleted {
                craftable_count: 1,
                recipes_processed: 2,
                ..
            }
        )));
        assert_eq!(solver.performance().total_solves, 1);
    }

    #[test]
    fn test_cancelled_solve_keeps_last_results() {
        let solver = solver_with(vec![r1()]);
        let first = solver.solve(&example_snapshot(), &SolveOptions::default());
        assert_eq!(solver.last_results().len(), 1);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let cancelled =
            solver.solve_with_cancel(&InventorySnapshot::empty(), &SolveOptions::default(), &cancel);
        assert!(cancelled.is_empty());
        assert_eq!(solver.last_results().as_ref(), first.as_slice());
    }

    struct CancellingCatalog {
        inner: InMemoryCatalog,
        cancel: CancellationToken,
    }

    impl RecipeCatalog for CancellingCatalog {
        fn is_initialized(&self) -> bool {
            true
        }
        fn recipe(&self, id: RecipeId) -> Option<Arc<RecipeDefinition>> {
            self.inner.recipe(id)
        }
        fn all_recipes(&self) -> Vec<Arc<RecipeDefinition>> {
            self.inner.all_recipes()
        }
        fn recipes_producing(&self, item: ItemId) -> CatalogResult<Vec<RecipeId>> {
            self.cancel.cancel();
            self.inner.recipes_producing(item)
        }
    }

    #[test]
    fn test_parallel_solve_cancelled_mid_batch() {
        let cancel = CancellationToken::new();
        let recipes: Vec<_> = (0..150)
            .map(|i| {
                RecipeDefinition::builder(RecipeId::new(i), format!("Item {i}"), ItemId::new(1000 + i))
                    .ingredient(A, 1)
                    .ingredient(B, 1)
                    .build()
            })
            .collect();
        let catalog = CancellingCatalog {
            inner: InMemoryCatalog::from_recipes(recipes).expect("catalog"),
            cancel: cancel.clone(),
        };
        let solver = CraftabilitySolver::new(Arc::new(catalog), SolverConfig::default());
        let parallel = SolveOptions {
            max_parallelism: 4,
            ..SolveOptions::default()
        };

        // B is covered here, so the resolver never runs.
        let first = solver.solve(&example_snapshot(), &parallel);
        assert_eq!(first.len(), 150);
        assert!(!cancel.is_cancelled());

        let resolving = SolveOptions {
            resolve_intermediates: true,
            ..parallel
        };
        let snapshot = InventorySnapshot::builder().nq(A, 10).build();
        let cancelled = solver.solve_with_cancel(&snapshot, &resolving, &cancel);
        assert!(cancel.is_cancelled());
        assert!(cancelled.is_empty());
        assert_eq!(solver.last_results().as_ref(), first.as_slice());
        assert_eq!(solver.performance().total_solves, 1);
    }

    #[test]
    fn test_explicit_invalidation() {
        let solver = solver_with(vec![r1()]);
        solver.solve(&example_snapshot(), &SolveOptions::default());
        assert_eq!(solver.performance().cache_size, 1);
        assert_eq!(solver.invalidate_cache(), 1);
        assert_eq!(solver.performance().cache_size, 0);
    }

    struct PanickingCatalog {
        inner: InMemoryCatalog,
    }

    impl RecipeCatalog for PanickingCatalog {
        fn is_initialized(&self) -> bool {
            true
        }
        fn recipe(&self, id: RecipeId) -> Option<Arc<RecipeDefinition>> {
            self.inner.recipe(id)
        }
        fn all_recipes(&self) -> Vec<Arc<RecipeDefinition>> {
            self.inner.all_recipes()
        }
        fn recipes_producing(&self, item: ItemId) -> CatalogResult<Vec<RecipeId>> {
            if item == B {
                panic!("producer table corrupted");
            }
            self.inner.recipes_producing(item)
        }
    }

    #[test]
    fn test_panicking_recipe_is_isolated() {
        let healthy = RecipeDefinition::builder(RecipeId::new(9), "Healthy", ItemId::new(900))
            .ingredient(A, 1)
            .build();
        let catalog = PanickingCatalog {
            inner: InMemoryCatalog::from_recipes(vec![r1(), healthy]).expect("catalog"),
        };
        let solver = CraftabilitySolver::new(Arc::new(catalog), SolverConfig::default());
        let options = SolveOptions {
            resolve_intermediates: true,
            allow_hq_substitution: false,
            ..SolveOptions::default()
        };

        let results = solver.solve(&example_snapshot(), &options);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe_id, RecipeId::new(9));
        assert_eq!(results[0].max_craftable, 10);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let recipes: Vec<_> = (0..250)
            .map(|i| {
                RecipeDefinition::builder(RecipeId::new(i), format!("Item {i}"), ItemId::new(1000 + i))
                    .ingredient(A, 1 + i % 7)
                    .ingredient(ORE, 1 + i % 3)
                    .build()
            })
            .collect();
        let solver = solver_with(recipes);
        let snapshot = InventorySnapshot::builder().nq(A, 40).item(ORE, 5, 5).build();

        let parallel = solver.solve(
            &snapshot,
            &SolveOptions {
                max_parallelism: 4,
                ..SolveOptions::default()
            },
        );
        solver.invalidate_cache();
        let mut sequential = solver.solve(
            &snapshot,
            &SolveOptions {
                parallel: false,
                ..SolveOptions::default()
            },
        );

        let mut parallel = parallel;
        parallel.sort_by_key(|r| r.recipe_id);
        sequential.sort_by_key(|r| r.recipe_id);
        assert_eq!(parallel.len(), 250);
        assert_eq!(parallel, sequential);
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl InventorySource for FailingSource {
        async fn scan(&self, _options: &ScanOptions) -> InventoryResult<InventorySnapshot> {
            Err(InventoryError::Unavailable("game client not running".to_string()))
        }
    }

    #[tokio::test]
    async fn test_solve_from_source() {
        let solver = solver_with(vec![r1()]);
        let source = StaticInventorySource::new(example_snapshot());
        let results = solver
            .solve_from_source(
                &source,
                &ScanOptions::default(),
                &SolveOptions::default(),
                &CancellationToken::new(),
            )
            .await
            .expect("solve");
        assert_eq!(results[0].max_craftable, 1);
    }

    #[tokio::test]
    async fn test_scan_failure_propagates() {
        let solver = solver_with(vec![r1()]);
        let result = solver
            .solve_from_source(
                &FailingSource,
                &ScanOptions::default(),
                &SolveOptions::default(),
                &CancellationToken::new(),
            )
            .await;
        assert!(matches!(result, Err(SolveError::Inventory(_))));
    }

    const X: ItemId = ItemId::new(4);
    const Y: ItemId = ItemId::new(5);
    const Z: ItemId = ItemId::new(6);

    /// A parent short on Y, with a bulk Y recipe from Z and a single Y
    /// recipe from X, which the parent also needs.
    fn shared_ingredient_catalog() -> Vec<RecipeDefinition> {
        vec![
            RecipeDefinition::builder(RecipeId::new(20), "Parent", ItemId::new(200))
                .ingredient(X, 1)
                .ingredient(Y, 5)
                .build(),
            RecipeDefinition::builder(RecipeId::new(21), "Y Batch", Y)
                .ingredient(Z, 1)
                .yield_per_craft(5)
                .build(),
            RecipeDefinition::builder(RecipeId::new(22), "Y", Y)
                .ingredient(X, 1)
                .build(),
        ]
    }

    fn resolving_sequential() -> SolveOptions {
        SolveOptions {
            resolve_intermediates: true,
            parallel: false,
            ..SolveOptions::default()
        }
    }

    #[test]
    fn test_more_shared_ingredient_keeps_resolved_count() {
        let mut counts = Vec::new();
        for x in [1, 4, 20] {
            let solver = solver_with(shared_ingredient_catalog());
            let snapshot = InventorySnapshot::builder().nq(X, x).nq(Z, 1).build();
            let results = solver.solve(&snapshot, &resolving_sequential());
            let parent = find(&results, 20);
            assert_eq!(parent.recommended_intermediates().count(), 1);
            counts.push(parent.max_craftable);
        }
        assert_eq!(counts, vec![1, 1, 1]);
    }

    proptest! {
        #[test]
        fn test_more_material_never_lowers_resolved_count(
            x in 0u32..8, y in 0u32..6, z in 0u32..3, extra in 0u32..10, which in 0usize..3
        ) {
            let mut more = [x, y, z];
            more[which] += extra;
            let solve = |[x, y, z]: [u32; 3]| {
                let solver = solver_with(shared_ingredient_catalog());
                let snapshot = InventorySnapshot::builder().nq(X, x).nq(Y, y).nq(Z, z).build();
                let results = solver.solve(&snapshot, &resolving_sequential());
                find(&results, 20).max_craftable
            };
            prop_assert!(solve(more) >= solve([x, y, z]));
        }
    }

    proptest! {
        #[test]
        fn test_determinism_cold_and_warm(
            a in 0u32..40, b_nq in 0u32..5, b_hq in 0u32..5, ore in 0u32..10, resolve in any::<bool>()
        ) {
            let snapshot = InventorySnapshot::builder()
                .item(A, a, 0)
                .item(B, b_nq, b_hq)
                .nq(ORE, ore)
                .build();
            let options = SolveOptions { resolve_intermediates: resolve, ..SolveOptions::default() };

            let cold_solver = solver_with(vec![r1(), b_from_ore()]);
            let cold = cold_solver.solve(&snapshot, &options);

            let warm_solver = solver_with(vec![r1(), b_from_ore()]);
            warm_solver.solve(&snapshot, &options);
            let warm = warm_solver.solve(&snapshot, &options);

            for (c, w) in cold.iter().zip(&warm) {
                prop_assert_eq!(c.max_craftable, w.max_craftable);
                prop_assert_eq!(c.has_all_materials, w.has_all_materials);
            }
        }
    }
}
