use thiserror::Error;

macro_rules! internal_error {
    // Single string version
    ($pass:expr, $msg:expr) => {
        crate::Error::Internal {
            pass: $pass,
            message: $msg.to_string(),
        }
    };

    // Format string with arguments version
    ($pass:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::Internal {
            pass: $pass,
            message: format!($fmt, $($arg)*),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The pipeline is designed so that heuristics and rewrites never fail: when a discovery
/// heuristic or an inliner pass cannot make progress it reports zero changes instead of an
/// error. What remains are the three hard failure modes below.
///
/// # Error Categories
///
/// - [`Error::Parse`] - The parser could not produce a tree, even in recovery mode
/// - [`Error::Print`] - The printer failed to emit source from a rewritten tree
/// - [`Error::Internal`] - A pass invariant was violated
///
/// # Examples
///
/// ```rust
/// use clearscript::{deobfuscate, Error};
///
/// match deobfuscate("var x = ][;") {
///     Ok(_) => println!("clean output"),
///     Err(Error::Parse(msg)) => eprintln!("unparseable input: {}", msg),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input source could not be parsed into a syntax tree.
    ///
    /// The parser runs in its most permissive configuration and tolerates recoverable
    /// diagnostics; this variant surfaces only when no tree could be produced at all.
    /// The parser's own message is carried verbatim.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The printer failed to emit source from a rewritten tree.
    ///
    /// This should not occur with the rewrites this crate performs and is treated as a
    /// bug when it does.
    #[error("Print error: {0}")]
    Print(String),

    /// A pass invariant was violated.
    ///
    /// Should not occur; if it does, the pipeline aborts and surfaces the violation
    /// together with the name of the failing pass.
    #[error("Internal error in pass '{pass}': {message}")]
    Internal {
        /// Name of the pass whose invariant was violated
        pass: &'static str,
        /// Description of the violation
        message: String,
    },
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
