//! Configuration for the deobfuscation engine.
//!
//! This module provides the configuration type controlling the pipeline:
//! per-phase iteration caps, pass selection, and discovery thresholds.

/// Configuration for the deobfuscation engine.
///
/// Controls iteration limits for the fixed-point phases, which inliner passes
/// run, and the thresholds the discovery heuristics apply.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum iterations per fixed-point phase (default: 10).
    ///
    /// Applies to the array-inlining, decoder-inlining and folding phases. The
    /// cap is a safety net; normal convergence takes 1-3 iterations. Exceeding
    /// it is not an error, and remaining indirection is left in the output.
    pub max_phase_iterations: usize,

    /// Maximum iterations for the resolver-inlining phase (default: 3).
    pub max_resolver_iterations: usize,

    /// Enable constant-array access inlining.
    pub enable_array_inlining: bool,

    /// Enable decoder-call inlining.
    pub enable_decoder_inlining: bool,

    /// Enable constant folding / string merging.
    pub enable_constant_folding: bool,

    /// Enable global-resolver call inlining.
    pub enable_resolver_inlining: bool,

    /// Enable the cosmetic cleanup pass.
    pub enable_cleanup: bool,

    /// Minimum element count for an all-literal array to be recorded as a
    /// constant array (default: 10).
    pub min_array_len: usize,

    /// Minimum number of valid mappings for a function to be promoted to a
    /// global resolver (default: 5).
    pub min_resolver_mappings: usize,

    /// Byte window scanned by the textual decoder-discovery fallback, measured
    /// forward from the last `decompressFromUTF16` occurrence (default: 1000).
    pub decoder_scan_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_phase_iterations: 10,
            max_resolver_iterations: 3,
            enable_array_inlining: true,
            enable_decoder_inlining: true,
            enable_constant_folding: true,
            enable_resolver_inlining: true,
            enable_cleanup: true,
            min_array_len: 10,
            min_resolver_mappings: 5,
            decoder_scan_window: 1000,
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a "fast" configuration for quick processing.
    ///
    /// Caps every phase at 3 iterations. Bundles whose indirection nests deeper
    /// than that keep the residue in the output, which is acceptable for triage
    /// runs.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            max_phase_iterations: 3,
            max_resolver_iterations: 1,
            ..Self::default()
        }
    }

    /// Sets the maximum number of iterations per fixed-point phase.
    ///
    /// # Arguments
    ///
    /// * `max` - The iteration cap.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_max_phase_iterations(mut self, max: usize) -> Self {
        self.max_phase_iterations = max;
        self
    }

    /// Enables or disables specific passes.
    ///
    /// # Arguments
    ///
    /// * `arrays` - Enable constant-array access inlining.
    /// * `decoder` - Enable decoder-call inlining.
    /// * `folding` - Enable constant folding / string merging.
    /// * `resolvers` - Enable global-resolver call inlining.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn with_passes(mut self, arrays: bool, decoder: bool, folding: bool, resolvers: bool) -> Self {
        self.enable_array_inlining = arrays;
        self.enable_decoder_inlining = decoder;
        self.enable_constant_folding = folding;
        self.enable_resolver_inlining = resolvers;
        self
    }

    /// Sets the discovery thresholds.
    ///
    /// # Arguments
    ///
    /// * `min_array_len` - Minimum constant-array element count.
    /// * `min_resolver_mappings` - Minimum resolver mapping count.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_discovery_thresholds(
        mut self,
        min_array_len: usize,
        min_resolver_mappings: usize,
    ) -> Self {
        self.min_array_len = min_array_len;
        self.min_resolver_mappings = min_resolver_mappings;
        self
    }

    /// Checks if all inliner passes are enabled.
    #[must_use]
    pub fn all_passes_enabled(&self) -> bool {
        self.enable_array_inlining
            && self.enable_decoder_inlining
            && self.enable_constant_folding
            && self.enable_resolver_inlining
            && self.enable_cleanup
    }
}
