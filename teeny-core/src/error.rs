use std::io;

use thiserror::Error;

/// Every failure the translator can report.
///
/// Translation is fail-fast: the first error unwinds straight to the
/// caller of `Parser::program`, and any partially filled emitter buffers
/// must be discarded.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read source: {0}")]
    SourceIo(#[from] io::Error),
    #[error("failed to write output: {0}")]
    OutputIo(io::Error),
    #[error("unsupported emit format: {0}")]
    UnsupportedFormat(String),
    #[error("lex error at byte {position}: {message}")]
    LexError { position: usize, message: String },
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("semantic error: {0}")]
    SemanticError(String),
}

impl CoreError {
    pub(crate) fn lex(position: usize, message: impl Into<String>) -> Self {
        CoreError::LexError {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        CoreError::ParseError(message.into())
    }

    pub(crate) fn semantic(message: impl Into<String>) -> Self {
        CoreError::SemanticError(message.into())
    }
}
