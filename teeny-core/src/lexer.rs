//! Demand-driven lexer for Teeny source text.
//!
//! The lexer hands out one token per `next_token` call. Newlines are
//! significant (they terminate statements), so only horizontal
//! whitespace is skipped.

use crate::error::CoreError;
use crate::token::{Token, TokenKind};

/// Current-character value once the cursor has run off the input.
const NUL: u8 = b'\0';

pub struct Lexer {
    /// Source text plus a sentinel newline so the last statement is
    /// always terminated.
    source: String,
    pos: usize,
    cur: u8,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let source = format!("{source}\n");
        let cur = source.as_bytes()[0];
        Lexer {
            source,
            pos: 0,
            cur,
        }
    }

    pub fn advance(&mut self) {
        self.pos += 1;
        self.cur = self.byte_at(self.pos);
    }

    pub fn peek(&self) -> u8 {
        self.byte_at(self.pos + 1)
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.cur, b' ' | b'\t' | 0x0b) {
            self.advance();
        }
    }

    /// Skips a `#` comment up to, but not including, the newline.
    pub fn skip_comment(&mut self) {
        if self.cur != b'#' {
            return;
        }
        while self.cur != b'\n' && !self.at_end() {
            self.advance();
        }
    }

    /// Produce the next token.
    ///
    /// Once EOF has been returned, every further call returns EOF again.
    pub fn next_token(&mut self) -> Result<Token, CoreError> {
        self.skip_whitespace();
        self.skip_comment();

        let token = if let Some(token) = self.general_token()? {
            token
        } else if let Some(token) = self.operator_token() {
            token
        } else if let Some(token) = self.comparison_token()? {
            token
        } else if let Some(token) = self.special_token() {
            token
        } else {
            let ch = self.source[self.pos..].chars().next().unwrap_or('\0');
            return Err(self.error(format!("unknown token: {}", ch.escape_debug())));
        };

        self.advance();
        Ok(token)
    }

    /// Identifiers, keywords, literals and parentheses.
    fn general_token(&mut self) -> Result<Option<Token>, CoreError> {
        let token = match self.cur {
            ch if ch.is_ascii_alphabetic() => {
                let start = self.pos;
                while is_ident_continue(self.peek()) {
                    self.advance();
                }
                let text = &self.source[start..=self.pos];
                let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Ident);
                Token::new(text, kind)
            }
            ch if ch.is_ascii_digit() => self.lex_number()?,
            b'"' => self.lex_string()?,
            b'(' => Token::new("(", TokenKind::LParen),
            b')' => Token::new(")", TokenKind::RParen),
            _ => return Ok(None),
        };
        Ok(Some(token))
    }

    fn operator_token(&self) -> Option<Token> {
        let kind = match self.cur {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Asterisk,
            b'/' => TokenKind::Slash,
            _ => return None,
        };
        Some(Token::new(char::from(self.cur), kind))
    }

    fn comparison_token(&mut self) -> Result<Option<Token>, CoreError> {
        let token = match self.cur {
            b'=' => self.one_or_two(TokenKind::Eq, TokenKind::EqEq),
            b'<' => self.one_or_two(TokenKind::Lt, TokenKind::LtEq),
            b'>' => self.one_or_two(TokenKind::Gt, TokenKind::GtEq),
            b'!' => {
                if self.peek() != b'=' {
                    let got = self.source[self.pos + 1..]
                        .chars()
                        .next()
                        .unwrap_or('\0')
                        .escape_debug();
                    return Err(self.error(format!("expected !=, got !{got}")));
                }
                self.advance();
                Token::new("!=", TokenKind::NotEq)
            }
            _ => return Ok(None),
        };
        Ok(Some(token))
    }

    /// Emits `two` when the current character is followed by `=`.
    fn one_or_two(&mut self, one: TokenKind, two: TokenKind) -> Token {
        let first = char::from(self.cur);
        if self.peek() == b'=' {
            self.advance();
            Token::new(format!("{first}="), two)
        } else {
            Token::new(first, one)
        }
    }

    fn special_token(&self) -> Option<Token> {
        match self.cur {
            b'\n' => Some(Token::new("\n", TokenKind::Newline)),
            NUL if self.at_end() => Some(Token::new("", TokenKind::Eof)),
            _ => None,
        }
    }

    /// digits [ '.' digits ]
    fn lex_number(&mut self) -> Result<Token, CoreError> {
        let start = self.pos;
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' {
            self.advance();
            if !self.peek().is_ascii_digit() {
                return Err(self.error("illegal character in number"));
            }
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        Ok(Token::new(&self.source[start..=self.pos], TokenKind::Number))
    }

    /// Leaves the cursor on the closing quote.
    fn lex_string(&mut self) -> Result<Token, CoreError> {
        self.advance();
        let start = self.pos;
        while self.cur != b'"' {
            if self.cur == b'\n' || self.at_end() {
                return Err(self.error("unterminated string literal"));
            }
            self.advance();
        }
        Ok(Token::new(&self.source[start..self.pos], TokenKind::String))
    }

    /// Only running off the end is end of input; a NUL inside the text
    /// is an ordinary character that no token starts with.
    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn byte_at(&self, index: usize) -> u8 {
        self.source.as_bytes().get(index).copied().unwrap_or(NUL)
    }

    fn error(&self, message: impl Into<String>) -> CoreError {
        CoreError::lex(self.pos, message)
    }
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

/// Lex a whole source string, up to and including the EOF token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CoreError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
