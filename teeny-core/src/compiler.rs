use std::io::Write;

use crate::emitter::Emitter;
use crate::error::CoreError;
use crate::lexer::{Lexer, tokenize};
use crate::parser::Parser;

/// Result of translating one Teeny program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationArtifact {
    /// Complete C translation unit.
    pub c_source: String,
    /// Functions the program declares, sorted.
    pub functions: Vec<String>,
    /// Labels the program declares, sorted.
    pub labels: Vec<String>,
}

/// Translate a Teeny program into C.
pub fn translate(source: &str) -> Result<CompilationArtifact, CoreError> {
    let mut emitter = Emitter::new();
    let summary = Parser::new(Lexer::new(source), &mut emitter)?.program()?;

    Ok(CompilationArtifact {
        c_source: emitter.flatten(),
        functions: summary.functions,
        labels: summary.labels,
    })
}

/// Translate `source` and write the C text to `out`.
///
/// Nothing is written unless the whole program translated cleanly.
pub fn translate_to(source: &str, mut out: impl Write) -> Result<(), CoreError> {
    let mut emitter = Emitter::new();
    Parser::new(Lexer::new(source), &mut emitter)?.program()?;
    emitter.write_to(&mut out).map_err(CoreError::OutputIo)
}

/// Render the token stream of `source`, one `KIND text` line per token.
pub fn dump_tokens(source: &str) -> Result<String, CoreError> {
    let mut listing = String::new();
    for token in tokenize(source)? {
        listing.push_str(&format!("{:<8} {}\n", token.kind, token.text.escape_debug()));
    }
    Ok(listing)
}
