//! Output buffers for generated C text.
//!
//! The parser writes C as it recognizes each construct, but C needs the
//! `#include` first and function definitions before `main`. The emitter
//! keeps one buffer per region and always flattens them in the same
//! order, whatever order they were filled in.

use std::io::{self, Write};

/// Region of the output that receives the next emitted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitScope {
    /// `#include` lines.
    Header,
    /// Bodies of user-declared functions.
    Functions,
    /// The body of `main`.
    #[default]
    Main,
}

#[derive(Debug, Default)]
pub struct Emitter {
    scope: EmitScope,
    header: String,
    functions: String,
    main: String,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter::default()
    }

    pub fn scope(&self) -> EmitScope {
        self.scope
    }

    pub fn set_scope(&mut self, scope: EmitScope) {
        self.scope = scope;
    }

    /// Append text as-is to the active buffer.
    pub fn emit(&mut self, text: &str) {
        self.buffer_mut().push_str(text);
    }

    pub fn emit_line(&mut self, text: &str) {
        let buffer = self.buffer_mut();
        buffer.push_str(text);
        buffer.push('\n');
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn functions(&self) -> &str {
        &self.functions
    }

    pub fn main_body(&self) -> &str {
        &self.main
    }

    /// header ++ functions ++ main.
    pub fn flatten(&self) -> String {
        let mut out =
            String::with_capacity(self.header.len() + self.functions.len() + self.main.len());
        out.push_str(&self.header);
        out.push_str(&self.functions);
        out.push_str(&self.main);
        out
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(self.header.as_bytes())?;
        out.write_all(self.functions.as_bytes())?;
        out.write_all(self.main.as_bytes())?;
        out.flush()
    }

    fn buffer_mut(&mut self) -> &mut String {
        match self.scope {
            EmitScope::Header => &mut self.header,
            EmitScope::Functions => &mut self.functions,
            EmitScope::Main => &mut self.main,
        }
    }
}
