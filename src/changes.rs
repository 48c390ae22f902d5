//! Change tracking for the rewrite passes.
//!
//! Passes record every rewrite they make into a shared [`EventLog`] keyed by
//! [`EventKind`]. The engine derives the operator-facing [`DeobStats`] record
//! from the log once the pipeline finishes.

use std::sync::atomic::{AtomicUsize, Ordering};

use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// The kinds of rewrites the pipeline performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumCount, EnumIter)]
pub enum EventKind {
    /// A computed access into a discovered constant array was inlined
    ArrayAccessInlined,
    /// A call to the discovered decoder function was inlined
    DecoderCallInlined,
    /// A constant (non-string) expression was folded
    ConstantFolded,
    /// Adjacent string literals were merged
    StringMerged,
    /// A global-resolver call was replaced by a bare identifier
    ResolverCallInlined,
    /// A hex numeral was normalized to decimal output
    HexNormalized,
    /// A bracketed property access was simplified to dotted form
    PropertyAccessSimplified,
    /// A `!0`/`!1`-style boolean encoding was replaced by `true`/`false`
    BooleanSimplified,
    /// Dead code was removed (untaken branches, empty statements)
    DeadCodeRemoved,
}

impl EventKind {
    /// Returns a human-readable name for this event kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ArrayAccessInlined => "array accesses inlined",
            Self::DecoderCallInlined => "decoder calls inlined",
            Self::ConstantFolded => "constants folded",
            Self::StringMerged => "strings merged",
            Self::ResolverCallInlined => "resolver calls inlined",
            Self::HexNormalized => "hex numerals normalized",
            Self::PropertyAccessSimplified => "property accesses simplified",
            Self::BooleanSimplified => "booleans simplified",
            Self::DeadCodeRemoved => "dead code removals",
        }
    }
}

/// Shared log of rewrite events.
///
/// Recording goes through `&self` so passes can share one log through the pass
/// context; counters are atomic, which also keeps the log usable from hosts
/// that drive independent pipelines on separate threads.
#[derive(Debug)]
pub struct EventLog {
    counts: [AtomicUsize; EventKind::COUNT],
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: std::array::from_fn(|_| AtomicUsize::new(0)),
        }
    }

    /// Records one event of the given kind.
    pub fn record(&self, kind: EventKind) {
        self.counts[kind as usize].fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of recorded events of the given kind.
    #[must_use]
    pub fn count(&self, kind: EventKind) -> usize {
        self.counts[kind as usize].load(Ordering::Relaxed)
    }

    /// Returns the total number of recorded events.
    #[must_use]
    pub fn total(&self) -> usize {
        EventKind::iter().map(|kind| self.count(kind)).sum()
    }

    /// Derives the statistics record from the log.
    #[must_use]
    pub fn derive(&self) -> DeobStats {
        DeobStats {
            hex_normalized: self.count(EventKind::HexNormalized),
            array_accesses_inlined: self.count(EventKind::ArrayAccessInlined),
            decoder_calls_inlined: self.count(EventKind::DecoderCallInlined),
            strings_merged: self.count(EventKind::StringMerged),
            resolver_calls_inlined: self.count(EventKind::ResolverCallInlined),
            properties_simplified: self.count(EventKind::PropertyAccessSimplified),
            booleans_simplified: self.count(EventKind::BooleanSimplified),
            dead_code_removed: self.count(EventKind::DeadCodeRemoved),
            constants_folded: self.count(EventKind::ConstantFolded),
        }
    }
}

/// Statistics record populated during a run.
///
/// Exposed to the (out-of-scope) CLI and service layers through
/// [`DeobfuscationResult`](crate::DeobfuscationResult).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeobStats {
    /// Hex numerals normalized to decimal output
    pub hex_normalized: usize,
    /// Constant-array accesses inlined
    pub array_accesses_inlined: usize,
    /// Decoder calls inlined
    pub decoder_calls_inlined: usize,
    /// String merges applied
    pub strings_merged: usize,
    /// Resolver calls inlined
    pub resolver_calls_inlined: usize,
    /// Property accesses simplified
    pub properties_simplified: usize,
    /// Boolean encodings simplified
    pub booleans_simplified: usize,
    /// Dead-code removals
    pub dead_code_removed: usize,
    /// Constant folds applied
    pub constants_folded: usize,
}

impl DeobStats {
    /// Returns the total number of rewrites across all categories.
    #[must_use]
    pub fn total(&self) -> usize {
        self.hex_normalized
            + self.array_accesses_inlined
            + self.decoder_calls_inlined
            + self.strings_merged
            + self.resolver_calls_inlined
            + self.properties_simplified
            + self.booleans_simplified
            + self.dead_code_removed
            + self.constants_folded
    }
}
