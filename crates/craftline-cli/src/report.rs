//! Result rendering.

use craftline_solver::metrics::PerformanceSnapshot;
use craftline_solver::outcome::CraftableResult;
use serde::Serialize;
use std::fmt::Write as _;

/// JSON document printed by `solve --json`.
#[derive(Debug, Serialize)]
pub struct SolveReport<'a> {
    /// Results in display order
    pub results: Vec<&'a CraftableResult>,
    /// Solver performance, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceSnapshot>,
}

/// Orders results for display and optionally drops uncraftable ones.
pub fn display_order(results: &[CraftableResult], craftable_only: bool) -> Vec<&CraftableResult> {
    let mut rows: Vec<_> = results
        .iter()
        .filter(|r| !craftable_only || r.is_craftable())
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.recipe_id.cmp(&b.recipe_id)));
    rows
}

/// Renders a fixed-width table.
pub fn render_table(rows: &[&CraftableResult]) -> String {
    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>6}  {:>5}  {:>5}  {:>4}  intermediates",
        "name", "recipe", "job", "level", "max"
    );

    for row in rows {
        let marker = if row.has_all_materials { ' ' } else { '*' };
        let intermediates = row
            .recommended_intermediates()
            .map(|i| format!("{}x {}", i.crafts, i.recipe_name))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "{:<width$}  {:>6}  {:>5}  {:>5}  {:>4}{marker} {intermediates}",
            row.name,
            row.recipe_id.raw(),
            row.job.raw(),
            row.job_level,
            row.max_craftable,
        );
    }
    out
}

/// Renders the performance block printed by `solve --stats`.
pub fn render_performance(perf: &PerformanceSnapshot) -> String {
    format!(
        "solves: {}  last: {:.2?}  average: {:.2?}  cache: {} entries, {:.1}% hits",
        perf.total_solves,
        perf.last_solve_time.unwrap_or_default(),
        perf.average_solve_time,
        perf.cache_size,
        perf.cache_hit_rate * 100.0,
    )
}
