//! Main deobfuscation engine.
//!
//! The [`DeobfuscationEngine`] is the entry point for deobfuscating a script.
//! It orchestrates parsing, artifact discovery, fixed-point pass execution and
//! printing:
//!
//! 1. **Phase 0**: parse the source and run discovery
//! 2. **Phase 1**: array-access inlining interleaved with constant folding
//! 3. **Phase 2**: decoder-call inlining interleaved with array-access
//!    inlining (nested decoder/array indirection is common)
//! 4. **Phase 3**: constant folding to a fixed point
//! 5. **Phase 4**: resolver-call inlining
//! 6. **Phase 5**: cosmetic cleanup, then one final folding sweep
//!
//! Phases 1–4 iterate until their passes report zero changes, bounded by the
//! configured caps. Exceeding a cap is not an error; remaining indirection is
//! left in the output. Discovery failures disable the corresponding phase but
//! never fail the pipeline; a run that discovers nothing still produces a
//! valid parse-and-print round trip.

use std::time::Instant;

use swc_core::common::{Globals, GLOBALS};

use crate::{
    changes::EventLog,
    config::EngineConfig,
    discovery::Artifacts,
    pass::{Pass, PassContext},
    passes::{ArrayAccessPass, CleanupPass, ConstantFoldingPass, DecoderCallPass, GlobalResolverPass},
    result::{DeobfuscationResult, PHASE_COUNT},
    syntax::Session,
    Result,
};

/// Main deobfuscation engine.
///
/// The engine is stateless between runs: each call to
/// [`process_source`](Self::process_source) owns its tree and discovery state,
/// so independent workers may drive separate engines concurrently without
/// synchronization.
///
/// # Example
///
/// ```
/// use clearscript::{DeobfuscationEngine, EngineConfig};
///
/// let engine = DeobfuscationEngine::new(EngineConfig::default());
/// let (output, result) = engine.process_source("x = !0 ? 1 : 2;").unwrap();
/// assert!(output.contains("x = 1"));
/// assert!(result.stats.total() > 0);
/// ```
pub struct DeobfuscationEngine {
    config: EngineConfig,
    array_pass: ArrayAccessPass,
    decoder_pass: DecoderCallPass,
    folding_pass: ConstantFoldingPass,
    resolver_pass: GlobalResolverPass,
    cleanup_pass: CleanupPass,
}

impl Default for DeobfuscationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DeobfuscationEngine {
    /// Creates a new engine with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration controlling iteration caps, pass
    ///   selection and discovery thresholds.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            array_pass: ArrayAccessPass,
            decoder_pass: DecoderCallPass,
            folding_pass: ConstantFoldingPass,
            resolver_pass: GlobalResolverPass,
            cleanup_pass: CleanupPass,
        }
    }

    /// Creates a new engine with default settings.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the complete pipeline over one source string.
    ///
    /// # Arguments
    ///
    /// * `source` - The obfuscated script.
    ///
    /// # Returns
    ///
    /// The deobfuscated source together with a [`DeobfuscationResult`] holding
    /// statistics, timing and per-phase iteration counts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](crate::Error::Parse) when the input cannot be
    /// parsed at all, [`Error::Print`](crate::Error::Print) when emission
    /// fails, and [`Error::Internal`](crate::Error::Internal) when a pass
    /// invariant is violated. Discovery finding nothing is not an error.
    pub fn process_source(&self, source: &str) -> Result<(String, DeobfuscationResult)> {
        let globals = Globals::new();
        GLOBALS.set(&globals, || self.run_pipeline(source))
    }

    fn run_pipeline(&self, source: &str) -> Result<(String, DeobfuscationResult)> {
        let start = Instant::now();

        // Phase 0: parse and discover.
        let session = Session::new();
        let mut program = session.parse(source)?;
        let artifacts = Artifacts::discover(&program, source, &self.config);

        let events = EventLog::new();
        let ctx = PassContext {
            artifacts: &artifacts,
            events: &events,
        };
        let mut iterations = [0usize; PHASE_COUNT];

        // Phase 1: array accesses, interleaved with folding so indices that
        // are themselves expressions keep resolving.
        if self.config.enable_array_inlining && !artifacts.arrays.is_empty() {
            let mut passes: Vec<&dyn Pass> = vec![&self.array_pass];
            if self.config.enable_constant_folding {
                passes.push(&self.folding_pass);
            }
            iterations[0] = self.run_phase(
                &mut program,
                &ctx,
                &passes,
                self.config.max_phase_iterations,
            )?;
        }

        // Phase 2: decoder calls, interleaved with array accesses for nested
        // indirection. Only scheduled when a decoder name is known.
        let decoder_known = artifacts
            .table
            .as_ref()
            .is_some_and(|table| table.decoder.is_some());
        if self.config.enable_decoder_inlining && decoder_known {
            let mut passes: Vec<&dyn Pass> = vec![&self.decoder_pass];
            if self.config.enable_array_inlining && !artifacts.arrays.is_empty() {
                passes.push(&self.array_pass);
            }
            iterations[1] = self.run_phase(
                &mut program,
                &ctx,
                &passes,
                self.config.max_phase_iterations,
            )?;
        }

        // Phase 3: folding to a fixed point.
        if self.config.enable_constant_folding {
            iterations[2] = self.run_phase(
                &mut program,
                &ctx,
                &[&self.folding_pass as &dyn Pass],
                self.config.max_phase_iterations,
            )?;
        }

        // Phase 4: resolver calls.
        if self.config.enable_resolver_inlining && !artifacts.resolvers.is_empty() {
            iterations[3] = self.run_phase(
                &mut program,
                &ctx,
                &[&self.resolver_pass as &dyn Pass],
                self.config.max_resolver_iterations,
            )?;
        }

        // Phase 5: cleanup once, then one final folding sweep.
        if self.config.enable_cleanup {
            self.cleanup_pass.run(&mut program, &ctx)?;
            if self.config.enable_constant_folding {
                self.folding_pass.run(&mut program, &ctx)?;
            }
            iterations[4] = 1;
        }

        let output = session.print(&program)?;
        let result =
            DeobfuscationResult::new(events.derive()).with_timing(start.elapsed(), iterations);

        Ok((output, result))
    }

    /// Runs a set of passes until none of them changes the tree, bounded by
    /// `cap` outer iterations. Returns the number of iterations used.
    fn run_phase(
        &self,
        program: &mut swc_core::ecma::ast::Program,
        ctx: &PassContext<'_>,
        passes: &[&dyn Pass],
        cap: usize,
    ) -> Result<usize> {
        let mut used = 0;
        while used < cap {
            used += 1;
            let mut changed = 0;
            for pass in passes {
                changed += pass.run(program, ctx)?;
            }
            if changed == 0 {
                break;
            }
        }
        Ok(used)
    }
}

/// Deobfuscates a script with default settings, returning only the output
/// source.
///
/// This is the crate's primary entry point; use
/// [`DeobfuscationEngine::process_source`] when statistics or configuration
/// are needed.
///
/// # Errors
///
/// Returns [`Error::Parse`](crate::Error::Parse) when the input cannot be
/// parsed; see [`DeobfuscationEngine::process_source`] for the full contract.
pub fn deobfuscate(source: &str) -> Result<String> {
    DeobfuscationEngine::with_defaults()
        .process_source(source)
        .map(|(output, _)| output)
}
