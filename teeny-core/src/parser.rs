//! Single-pass parser and C code generator for Teeny.
//!
//! There is no syntax tree. Each grammar rule writes its C text into the
//! emitter the moment it is recognized, and every semantic check runs
//! against the tables as they stand at that point in the source. The one
//! exception is `goto`: targets are collected and checked after the last
//! statement, because a label may be declared below the jump to it.
//!
//! ```text
//! program     := { statement }
//! statement   := ( action | block | label-stmt | assignment ) nl
//! action      := "print" ( STRING | expression ) | IDENT
//! block       := "fn" IDENT nl { statement } "end"
//!              | ("if" | "while") "(" comparison ")" nl { statement } "end"
//! label-stmt  := "label" IDENT | "goto" IDENT
//! assignment  := "let" IDENT "=" expression | "input" IDENT
//! comparison  := expression ( cmp-op expression )+
//! expression  := term { ("+" | "-") term }
//! term        := unary { ("*" | "/") unary }
//! unary       := [ "+" | "-" ] primary
//! primary     := NUMBER | IDENT
//! nl          := NEWLINE+
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::mem;

use crate::emitter::{EmitScope, Emitter};
use crate::error::CoreError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Implicit function scope for top-level statements.
const MAIN: &str = "main";

/// Names the parser collected from a program it translated successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSummary {
    /// Declared functions, sorted.
    pub functions: Vec<String>,
    /// Declared labels, sorted.
    pub labels: Vec<String>,
}

pub struct Parser<'e> {
    lexer: Lexer,
    emitter: &'e mut Emitter,

    cur_func: String,
    /// Variables declared so far, per function.
    symbols: HashMap<String, HashSet<String>>,
    functions: HashSet<String>,
    labels_declared: HashSet<String>,
    /// Ordered so the undeclared-label report does not depend on hashing.
    labels_gone_to: BTreeSet<String>,

    cur: Token,
    peek: Token,
}

impl<'e> Parser<'e> {
    /// Prime the two-token window. Fails if the first tokens do not lex.
    pub fn new(mut lexer: Lexer, emitter: &'e mut Emitter) -> Result<Self, CoreError> {
        let cur = lexer.next_token()?;
        let peek = lexer.next_token()?;

        let mut symbols = HashMap::new();
        symbols.insert(MAIN.to_string(), HashSet::new());

        Ok(Parser {
            lexer,
            emitter,
            cur_func: MAIN.to_string(),
            symbols,
            functions: HashSet::new(),
            labels_declared: HashSet::new(),
            labels_gone_to: BTreeSet::new(),
            cur,
            peek,
        })
    }

    /// program ::= { statement }
    ///
    /// Consumes the whole token stream. On error the emitter holds a
    /// partial translation that must not be persisted.
    pub fn program(mut self) -> Result<ProgramSummary, CoreError> {
        self.emitter.set_scope(EmitScope::Header);
        self.emitter.emit_line("#include <stdio.h>");

        self.emitter.set_scope(EmitScope::Main);
        self.emitter.emit_line("int main() {");

        while self.check(TokenKind::Newline) {
            self.next_token()?;
        }

        while !self.check(TokenKind::Eof) {
            self.statement()?;
        }

        self.emitter.emit_line("return 0;");
        self.emitter.emit_line("}");

        if let Some(label) = self
            .labels_gone_to
            .iter()
            .find(|label| !self.labels_declared.contains(*label))
        {
            return Err(CoreError::semantic(format!(
                "attempting to go to undeclared label: {label}"
            )));
        }

        let mut functions: Vec<String> = self.functions.into_iter().collect();
        functions.sort();
        let mut labels: Vec<String> = self.labels_declared.into_iter().collect();
        labels.sort();
        Ok(ProgramSummary { functions, labels })
    }

    fn statement(&mut self) -> Result<(), CoreError> {
        match self.cur.kind {
            TokenKind::Print => self.print_statement()?,
            TokenKind::Ident => self.call_statement()?,
            TokenKind::Fn => self.function_declaration()?,
            TokenKind::If => self.conditional_block("if")?,
            TokenKind::While => self.conditional_block("while")?,
            TokenKind::Label => self.label_declaration()?,
            TokenKind::Goto => self.goto_statement()?,
            TokenKind::Let => self.let_statement()?,
            TokenKind::Input => self.input_statement()?,
            TokenKind::Eof
            | TokenKind::Newline
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::End
            | TokenKind::Eq
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => {
                return Err(CoreError::parse(format!(
                    "invalid statement at '{}'",
                    self.cur
                )));
            }
        }

        self.nl()
    }

    /// "print" ( STRING | expression )
    fn print_statement(&mut self) -> Result<(), CoreError> {
        self.next_token()?;

        if self.check(TokenKind::String) {
            // Teeny strings have no escapes, so a backslash prints as itself.
            let text = self.cur.text.replace('\\', "\\\\");
            self.emitter
                .emit_line(&format!("printf(\"%s\\n\", \"{text}\");"));
            self.next_token()
        } else {
            self.emitter.emit("printf(\"%.2f\\n\", (float) (");
            self.expression()?;
            self.emitter.emit_line("));");
            Ok(())
        }
    }

    /// IDENT, calling a function declared earlier in the source.
    fn call_statement(&mut self) -> Result<(), CoreError> {
        let name = self.cur.text.clone();
        if !self.functions.contains(&name) {
            let hint = if self.peek_is(TokenKind::Eq) {
                format!(" (use `let {name} = ...` to assign a variable)")
            } else {
                String::new()
            };
            return Err(CoreError::semantic(format!(
                "function does not exist: {name}{hint}"
            )));
        }

        self.emitter.emit_line(&format!("{name}();"));
        self.next_token()
    }

    /// "fn" IDENT nl { statement } "end"
    fn function_declaration(&mut self) -> Result<(), CoreError> {
        if self.emitter.scope() == EmitScope::Functions {
            return Err(CoreError::semantic("cannot create function in function"));
        }
        self.next_token()?;

        let name = self.expect_ident()?;
        if name == MAIN || !self.functions.insert(name.clone()) {
            return Err(CoreError::semantic(format!(
                "function already exists: {name}"
            )));
        }
        self.symbols.insert(name.clone(), HashSet::new());

        self.emitter.set_scope(EmitScope::Functions);
        self.emitter.emit_line(&format!("void {name}() {{"));
        self.cur_func = name;

        self.block_body()?;

        self.emitter.emit_line("}");
        self.emitter.set_scope(EmitScope::Main);
        self.cur_func = MAIN.to_string();
        Ok(())
    }

    /// ("if" | "while") "(" comparison ")" nl { statement } "end"
    fn conditional_block(&mut self, keyword: &str) -> Result<(), CoreError> {
        self.next_token()?;

        self.expect(TokenKind::LParen)?;
        self.emitter.emit(&format!("{keyword} ("));

        self.comparison()?;

        self.expect(TokenKind::RParen)?;
        self.emitter.emit_line(") {");

        self.block_body()?;
        self.emitter.emit_line("}");
        Ok(())
    }

    /// nl { statement } "end"
    fn block_body(&mut self) -> Result<(), CoreError> {
        self.nl()?;
        while !self.check(TokenKind::End) && !self.check(TokenKind::Eof) {
            self.statement()?;
        }
        self.expect(TokenKind::End)
    }

    /// "label" IDENT
    fn label_declaration(&mut self) -> Result<(), CoreError> {
        self.next_token()?;

        let name = self.expect_ident()?;
        if !self.labels_declared.insert(name.clone()) {
            return Err(CoreError::semantic(format!("label already exists: {name}")));
        }

        // C rejects a label directly before `}`; the empty statement avoids that.
        self.emitter.emit_line(&format!("{name}:;"));
        Ok(())
    }

    /// "goto" IDENT
    fn goto_statement(&mut self) -> Result<(), CoreError> {
        self.next_token()?;

        let name = self.expect_ident()?;
        self.emitter.emit_line(&format!("goto {name};"));
        self.labels_gone_to.insert(name);
        Ok(())
    }

    /// "let" IDENT "=" expression
    fn let_statement(&mut self) -> Result<(), CoreError> {
        self.next_token()?;

        let name = self.expect_ident()?;
        self.declare_variable(&name);
        self.emitter.emit(&format!("{name} = "));

        self.expect(TokenKind::Eq)?;
        self.expression()?;
        self.emitter.emit_line(";");
        Ok(())
    }

    /// "input" IDENT
    ///
    /// Unparseable input leaves the variable at zero and discards the
    /// offending word so the next `input` can proceed.
    fn input_statement(&mut self) -> Result<(), CoreError> {
        self.next_token()?;

        let name = self.expect_ident()?;
        self.declare_variable(&name);

        self.emitter
            .emit_line(&format!("if (0 == scanf(\"%f\", &{name})) {{"));
        self.emitter.emit_line(&format!("{name} = 0;"));
        self.emitter.emit_line("scanf(\"%*s\");");
        self.emitter.emit_line("}");
        Ok(())
    }

    /// comparison ::= expression ( cmp-op expression )+
    fn comparison(&mut self) -> Result<(), CoreError> {
        self.expression()?;

        if !self.cur.kind.is_comparison() {
            return Err(CoreError::parse(format!(
                "expected comparison operator, got {}",
                self.cur
            )));
        }

        while self.cur.kind.is_comparison() {
            self.binary_operator()?;
            self.expression()?;
        }
        Ok(())
    }

    /// expression ::= term { ("+" | "-") term }
    fn expression(&mut self) -> Result<(), CoreError> {
        self.term()?;

        while self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
            self.binary_operator()?;
            self.term()?;
        }
        Ok(())
    }

    /// term ::= unary { ("*" | "/") unary }
    fn term(&mut self) -> Result<(), CoreError> {
        self.unary()?;

        while self.check(TokenKind::Asterisk) || self.check(TokenKind::Slash) {
            self.binary_operator()?;
            self.unary()?;
        }
        Ok(())
    }

    /// unary ::= [ "+" | "-" ] primary
    fn unary(&mut self) -> Result<(), CoreError> {
        if self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
            self.emitter.emit(&self.cur.text);
            self.next_token()?;
        }

        self.primary()
    }

    /// primary ::= NUMBER | IDENT
    fn primary(&mut self) -> Result<(), CoreError> {
        match self.cur.kind {
            TokenKind::Number => {}
            TokenKind::Ident => {
                if !self.is_declared(&self.cur.text) {
                    return Err(CoreError::semantic(format!(
                        "referencing variable before assignment: {}",
                        self.cur.text
                    )));
                }
            }
            TokenKind::Eof
            | TokenKind::Newline
            | TokenKind::String
            | TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::Label
            | TokenKind::Goto
            | TokenKind::Print
            | TokenKind::Input
            | TokenKind::Let
            | TokenKind::Fn
            | TokenKind::If
            | TokenKind::While
            | TokenKind::End
            | TokenKind::Eq
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => {
                return Err(CoreError::parse(format!(
                    "unexpected token at '{}'",
                    self.cur
                )));
            }
        }

        self.emitter.emit(&self.cur.text);
        self.next_token()
    }

    /// Writes the current operator with a space on each side, so that a
    /// unary sign after it cannot fuse into `--` or `++`.
    fn binary_operator(&mut self) -> Result<(), CoreError> {
        self.emitter.emit(&format!(" {} ", self.cur.text));
        self.next_token()
    }

    /// nl ::= NEWLINE+
    fn nl(&mut self) -> Result<(), CoreError> {
        self.expect(TokenKind::Newline)?;
        while self.check(TokenKind::Newline) {
            self.next_token()?;
        }
        Ok(())
    }

    fn declare_variable(&mut self, name: &str) {
        let vars = self.symbols.entry(self.cur_func.clone()).or_default();
        if vars.insert(name.to_string()) {
            self.emitter.emit_line(&format!("float {name};"));
        }
    }

    fn is_declared(&self, name: &str) -> bool {
        self.symbols
            .get(&self.cur_func)
            .is_some_and(|vars| vars.contains(name))
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.cur.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), CoreError> {
        if !self.check(kind) {
            return Err(CoreError::parse(format!(
                "expected {kind}, got {}",
                self.cur.kind
            )));
        }
        self.next_token()
    }

    fn expect_ident(&mut self) -> Result<String, CoreError> {
        if !self.check(TokenKind::Ident) {
            return Err(CoreError::parse(format!(
                "expected {}, got {}",
                TokenKind::Ident,
                self.cur.kind
            )));
        }
        let name = self.cur.text.clone();
        self.next_token()?;
        Ok(name)
    }

    fn next_token(&mut self) -> Result<(), CoreError> {
        let next = self.lexer.next_token()?;
        self.cur = mem::replace(&mut self.peek, next);
        Ok(())
    }
}
