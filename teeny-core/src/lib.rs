//! Core translator for the Teeny language.
//!
//! Teeny programs are translated to C in a single pass:
//!
//!   source .teeny
//!     -> lexer    (tokens, on demand)
//!     -> parser   (recursive descent, checks + C emission inline)
//!     -> emitter  (header / functions / main buffers)
//!     -> C source
//!
//! There is no syntax tree between the parser and the emitter. Higher
//! level tools (the CLI) should call into `compiler` rather than wiring
//! the stages together themselves.

// ---------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------

pub mod error;

// ---------------------------------------------------------------------
// Front-end: tokens and lexing
// ---------------------------------------------------------------------

pub mod token;
pub mod lexer;

// ---------------------------------------------------------------------
// Translation: parsing with inline C emission
// ---------------------------------------------------------------------

pub mod emitter;
pub mod parser;

// ---------------------------------------------------------------------
// Orchestration and source discovery
// ---------------------------------------------------------------------

pub mod compiler;
pub mod sources;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use compiler::{CompilationArtifact, dump_tokens, translate, translate_to};
pub use error::CoreError;
