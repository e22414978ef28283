//! Job-level gating.
//!
//! Level gating is an injected predicate so the heuristics behind it can
//! change independently of the solver. The current policy treats every
//! recipe as level-met; [`AdvisoryGate`] still consults the job service so
//! its verdict shows up in traces.

use craftline_common::JobId;
use std::sync::Arc;
use tracing::trace;

/// Player job-level collaborator.
pub trait JobLevelService: Send + Sync {
    /// Whether the player's level in `job` meets `required_level`.
    fn can_craft(&self, job: JobId, required_level: u32) -> bool;

    /// Whether job levels are known at all.
    fn is_available(&self) -> bool;
}

/// Pure predicate deciding whether a recipe's level requirement is met.
pub trait JobLevelGate: Send + Sync {
    /// Returns true if a recipe of `job` at `required_level` may be offered.
    fn permits(&self, job: JobId, required_level: u32) -> bool;
}

/// Gate that permits every recipe.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl JobLevelGate for PermitAll {
    fn permits(&self, _job: JobId, _required_level: u32) -> bool {
        true
    }
}

/// Gate that asks a [`JobLevelService`] and then permits regardless.
pub struct AdvisoryGate {
    service: Arc<dyn JobLevelService>,
}

impl AdvisoryGate {
    /// Wraps a job-level service.
    #[must_use]
    pub fn new(service: Arc<dyn JobLevelService>) -> Self {
        Self { service }
    }
}

impl std::fmt::Debug for AdvisoryGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisoryGate").finish_non_exhaustive()
    }
}

impl JobLevelGate for AdvisoryGate {
    fn permits(&self, job: JobId, required_level: u32) -> bool {
        if self.service.is_available() && !self.service.can_craft(job, required_level) {
            trace!(%job, required_level, "job level below requirement, permitted by policy");
        }
        true
    }
}
