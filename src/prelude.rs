//! # clearscript Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! of the crate, allowing for convenient glob imports:
//!
//! ```
//! use clearscript::prelude::*;
//!
//! let output = deobfuscate("x = !0 ? 1 : 2;")?;
//! assert!(output.contains("x = 1"));
//! # Ok::<(), clearscript::Error>(())
//! ```

pub use crate::{
    changes::{DeobStats, EventKind, EventLog},
    config::EngineConfig,
    deobfuscate,
    discovery::{Artifacts, ConstantArray, GlobalResolver, StringTable},
    engine::DeobfuscationEngine,
    error::{Error, Result},
    result::DeobfuscationResult,
};
