//! Parse and print adapter around the script parser.
//!
//! The pipeline treats the syntax tree as an opaque structure delivered by a
//! third-party parser; this module is the only place that knows how to obtain one
//! from source text and how to turn a rewritten tree back into source. The parser
//! runs in its most permissive configuration (script or module, JSX superset,
//! recoverable diagnostics tolerated) and comments are carried through to the
//! printer.

use swc_core::{
    common::{comments::SingleThreadedComments, sync::Lrc, FileName, SourceMap},
    ecma::{
        ast::Program,
        codegen::{text_writer::JsWriter, Emitter},
        parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax},
    },
};

use crate::{Error, Result};

/// One parse/print session.
///
/// Holds the source map and comment store shared between [`parse`](Self::parse)
/// and [`print`](Self::print); a session belongs to a single pipeline invocation
/// and is not reused across inputs.
pub struct Session {
    source_map: Lrc<SourceMap>,
    comments: SingleThreadedComments,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a fresh session with an empty source map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source_map: Lrc::new(SourceMap::default()),
            comments: SingleThreadedComments::default(),
        }
    }

    /// Parses source text into a mutable syntax tree.
    ///
    /// Recoverable diagnostics are discarded, mirroring an error-recovery parser
    /// mode: only a hard failure to produce a tree surfaces as [`Error::Parse`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] with the parser's message when no tree could be
    /// produced.
    pub fn parse(&self, source: &str) -> Result<Program> {
        let file = self.source_map.new_source_file(
            FileName::Custom("input.js".into()).into(),
            source.to_string(),
        );

        let lexer = Lexer::new(
            Syntax::Es(EsSyntax {
                jsx: true,
                ..Default::default()
            }),
            Default::default(),
            StringInput::from(&*file),
            Some(&self.comments),
        );

        let mut parser = Parser::new_from(lexer);
        let program = parser
            .parse_program()
            .map_err(|e| Error::Parse(e.kind().msg().to_string()))?;

        // Recovered diagnostics do not invalidate the tree.
        let _ = parser.take_errors();

        Ok(program)
    }

    /// Emits source text from a (possibly rewritten) tree, preserving comments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Print`] when the emitter fails; this is not expected for
    /// trees produced by this crate's rewrites.
    pub fn print(&self, program: &Program) -> Result<String> {
        let mut buf = Vec::new();
        {
            let writer = JsWriter::new(self.source_map.clone(), "\n", &mut buf, None);
            let mut emitter = Emitter {
                cfg: Default::default(),
                cm: self.source_map.clone(),
                comments: Some(&self.comments),
                wr: Box::new(writer),
            };
            emitter
                .emit_program(program)
                .map_err(|e| Error::Print(e.to_string()))?;
        }
        String::from_utf8(buf).map_err(|e| Error::Print(e.to_string()))
    }
}
