//! Result type for a pipeline run.

use std::time::Duration;

use crate::changes::DeobStats;

/// Number of pipeline phases that report iteration counts (phases 1–5).
pub const PHASE_COUNT: usize = 5;

/// Outcome of a deobfuscation run: statistics, timing, and per-phase iteration
/// counts.
#[derive(Debug, Clone, Default)]
pub struct DeobfuscationResult {
    /// Rewrite counters populated during the run
    pub stats: DeobStats,
    /// Total wall-clock time of the run
    pub total_time: Duration,
    /// Outer iterations used by each phase (0 when a phase was skipped)
    pub phase_iterations: [usize; PHASE_COUNT],
}

impl DeobfuscationResult {
    /// Creates a result from the derived statistics.
    #[must_use]
    pub fn new(stats: DeobStats) -> Self {
        Self {
            stats,
            total_time: Duration::ZERO,
            phase_iterations: [0; PHASE_COUNT],
        }
    }

    /// Attaches timing and iteration information.
    ///
    /// # Arguments
    ///
    /// * `total_time` - Wall-clock duration of the run.
    /// * `phase_iterations` - Outer iterations used per phase.
    ///
    /// # Returns
    ///
    /// The modified result (builder pattern).
    #[must_use]
    pub fn with_timing(mut self, total_time: Duration, phase_iterations: [usize; PHASE_COUNT]) -> Self {
        self.total_time = total_time;
        self.phase_iterations = phase_iterations;
        self
    }

    /// Returns `true` when the run performed no rewrites at all.
    #[must_use]
    pub fn unchanged(&self) -> bool {
        self.stats.total() == 0
    }

    /// Renders a human-readable summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let s = &self.stats;
        format!(
            "deobfuscation: {} rewrites in {:?} \
             (arrays {}, decoder {}, folds {}, merges {}, resolvers {}, \
             hex {}, properties {}, booleans {}, dead code {})",
            s.total(),
            self.total_time,
            s.array_accesses_inlined,
            s.decoder_calls_inlined,
            s.constants_folded,
            s.strings_merged,
            s.resolver_calls_inlined,
            s.hex_normalized,
            s.properties_simplified,
            s.booleans_simplified,
            s.dead_code_removed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged() {
        let result = DeobfuscationResult::new(DeobStats::default());
        assert!(result.unchanged());
    }

    #[test]
    fn test_summary_mentions_counters() {
        let stats = DeobStats {
            array_accesses_inlined: 7,
            ..DeobStats::default()
        };
        let result = DeobfuscationResult::new(stats)
            .with_timing(Duration::from_millis(5), [2, 1, 1, 0, 1]);
        let summary = result.summary();
        assert!(summary.contains("arrays 7"));
        assert!(summary.contains("7 rewrites"));
    }
}
