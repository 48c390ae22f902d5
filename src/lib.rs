// Copyright 2025-2026 clearscript contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! # clearscript
//!
//! A multi-pass AST-based deobfuscator for JavaScript bundles whose readable
//! logic has been hidden behind four co-designed obfuscation layers: a large
//! literal-array indirection, a compressed string table decoded through an
//! index function, a global-identifier lookup function, and cosmetic
//! transforms (hex numerals, bracketed property access, `!0`/`!1` boolean
//! encoding). The output is the same program semantically, with the
//! indirection inlined so control flow and string contents become directly
//! readable.
//!
//! # Architecture
//!
//! The pipeline is a single-threaded sequence of tree rewrites:
//!
//! ```text
//! source ──► parse ──► discovery ──► fixed-point phases ──► cleanup ──► print
//!            (C2)        (C4)          (C5 passes, C6)        (C5)       (C2)
//! ```
//!
//! - [`crate::syntax`] - Parser/printer adapter over the script parser
//! - [`crate::utils`] - The compressed-string codec the string table ships in
//! - [`crate::eval`] - Partial evaluator for literal expressions
//! - [`crate::discovery`] - Locates constant arrays, the string table and its
//!   decoder, and global-resolver functions
//! - [`crate::passes`] - The five inliner/cleanup passes
//! - [`crate::engine`] - The pipeline driver and the [`deobfuscate`] entry point
//! - [`crate::prelude`] - Convenient re-exports of commonly used types
//! - [`crate::Error`] and [`crate::Result`] - Error handling
//!
//! # Usage
//!
//! ```
//! use clearscript::deobfuscate;
//!
//! let source = r#"
//!     var k = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
//!     x = k[0x3] + k[1];
//! "#;
//! let output = deobfuscate(source)?;
//! assert!(output.contains("x = 4"));
//! # Ok::<(), clearscript::Error>(())
//! ```
//!
//! With statistics and configuration:
//!
//! ```
//! use clearscript::{DeobfuscationEngine, EngineConfig};
//!
//! let engine = DeobfuscationEngine::new(EngineConfig::fast());
//! let (output, result) = engine.process_source("y = \"a\" + \"b\";")?;
//! assert!(output.contains("\"ab\""));
//! println!("{}", result.summary());
//! # Ok::<(), clearscript::Error>(())
//! ```
//!
//! # Failure Semantics
//!
//! Every discovery heuristic and rewrite rule is non-failing by design: when
//! it cannot make progress it reports zero changes and the original node is
//! left in place. Unknown obfuscation variants therefore survive into the
//! output unchanged rather than crash the pipeline. The only hard errors are
//! an unparseable input, a printer failure, and pass-invariant violations
//! (see [`Error`]).
//!
//! # Thread Safety
//!
//! A pipeline run owns its tree and discovery state, holds no global mutable
//! state, and performs no I/O. Hosts that process many files concurrently
//! can simply drive one engine per worker.

#[macro_use]
pub(crate) mod error;

pub mod changes;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod eval;
pub mod pass;
pub mod passes;
pub mod prelude;
pub mod result;
pub mod syntax;
pub mod utils;

pub use changes::{DeobStats, EventKind, EventLog};
pub use config::EngineConfig;
pub use discovery::Artifacts;
pub use engine::{deobfuscate, DeobfuscationEngine};
pub use error::{Error, Result};
pub use result::DeobfuscationResult;
