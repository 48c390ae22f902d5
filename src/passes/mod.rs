//! Built-in rewrite passes.
//!
//! The engine organizes these passes into phases that run in a fixed order;
//! within each phase, passes iterate until a fixed point is reached (capped).
//!
//! | Pass | Description |
//! |------|-------------|
//! | [`ArrayAccessPass`] | Inlines computed accesses into discovered constant arrays |
//! | [`DecoderCallPass`] | Inlines decoder calls into string-table entries |
//! | [`ConstantFoldingPass`] | Folds constant expressions and merges string literals |
//! | [`GlobalResolverPass`] | Replaces resolver calls with well-known global identifiers |
//! | [`CleanupPass`] | Cosmetic cleanup: hex numerals, bracketed access, boolean encodings, dead branches |
//!
//! Each pass implements the [`Pass`](crate::pass::Pass) trait and records its
//! rewrites into the shared [`EventLog`](crate::changes::EventLog).

mod arrays;
mod cleanup;
mod decoder;
mod folding;
mod globals;

pub use self::arrays::ArrayAccessPass;
pub use self::cleanup::CleanupPass;
pub use self::decoder::DecoderCallPass;
pub use self::folding::ConstantFoldingPass;
pub use self::globals::GlobalResolverPass;
