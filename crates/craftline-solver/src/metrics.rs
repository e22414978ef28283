//! Rolling solve-time metrics.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Point-in-time view of solver performance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceSnapshot {
    /// Mean of the recent solve durations
    pub average_solve_time: Duration,
    /// Most recent solve duration
    pub last_solve_time: Option<Duration>,
    /// Cumulative cache hit ratio (0.0-1.0)
    pub cache_hit_rate: f64,
    /// Records currently cached
    pub cache_size: usize,
    /// Solves recorded since startup
    pub total_solves: u64,
    /// Whether the catalog is ready for solving
    pub is_ready: bool,
}

#[derive(Debug)]
struct Window {
    durations: VecDeque<Duration>,
    total_solves: u64,
}

/// Window over the most recent solve durations.
#[derive(Debug)]
pub struct SolveMetrics {
    window: Mutex<Window>,
    history_size: usize,
}

impl Default for SolveMetrics {
    fn default() -> Self {
        Self::new(10)
    }
}

impl SolveMetrics {
    /// Creates a metrics window.
    ///
    /// # Arguments
    /// * `history_size` - Number of solves kept for averaging
    #[must_use]
    pub fn new(history_size: usize) -> Self {
        let history_size = history_size.max(1);
        Self {
            window: Mutex::new(Window {
                durations: VecDeque::with_capacity(history_size),
                total_solves: 0,
            }),
            history_size,
        }
    }

    /// Records one solve duration.
    pub fn record(&self, elapsed: Duration) {
        let mut window = self.window.lock();
        window.durations.push_back(elapsed);
        if window.durations.len() > self.history_size {
            window.durations.pop_front();
        }
        window.total_solves += 1;
    }

    /// Mean of the recorded durations, zero with none.
    #[must_use]
    pub fn average(&self) -> Duration {
        let window = self.window.lock();
        if window.durations.is_empty() {
            return Duration::ZERO;
        }
        window.durations.iter().sum::<Duration>() / window.durations.len() as u32
    }

    /// Most recent duration.
    #[must_use]
    pub fn last(&self) -> Option<Duration> {
        self.window.lock().durations.back().copied()
    }

    /// Total solves recorded.
    #[must_use]
    pub fn total_solves(&self) -> u64 {
        self.window.lock().total_solves
    }
}
