//! Token model shared by the lexer and the parser.

use core::fmt;

/// Kind of a token produced by the lexer.
///
/// The set is closed: the parser matches on it exhaustively, so adding a
/// kind forces every consumer to decide what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural
    Eof,
    Newline,
    Number,
    Ident,
    String,
    LParen, // (
    RParen, // )

    // Keywords
    Label,
    Goto,
    Print,
    Input,
    Let,
    Fn,
    If,
    While,
    End,

    // Operators
    Eq,       // =
    Plus,     // +
    Minus,    // -
    Asterisk, // *
    Slash,    // /
    EqEq,     // ==
    NotEq,    // !=
    Lt,       // <
    LtEq,     // <=
    Gt,       // >
    GtEq,     // >=
}

impl TokenKind {
    /// Resolve an identifier-shaped lexeme to its keyword kind.
    ///
    /// The match is case-sensitive: `Print` is an ordinary identifier.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "label" => TokenKind::Label,
            "goto" => TokenKind::Goto,
            "print" => TokenKind::Print,
            "input" => TokenKind::Input,
            "let" => TokenKind::Let,
            "fn" => TokenKind::Fn,
            "if" => TokenKind::If,
            "while" => TokenKind::While,
            "end" => TokenKind::End,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::LtEq
                | TokenKind::Gt
                | TokenKind::GtEq
        )
    }

    fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Number => "NUMBER",
            TokenKind::Ident => "IDENT",
            TokenKind::String => "STRING",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Label => "LABEL",
            TokenKind::Goto => "GOTO",
            TokenKind::Print => "PRINT",
            TokenKind::Input => "INPUT",
            TokenKind::Let => "LET",
            TokenKind::Fn => "FN",
            TokenKind::If => "IF",
            TokenKind::While => "WHILE",
            TokenKind::End => "END",
            TokenKind::Eq => "EQ",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Slash => "SLASH",
            TokenKind::EqEq => "EQEQ",
            TokenKind::NotEq => "NOTEQ",
            TokenKind::Lt => "LT",
            TokenKind::LtEq => "LTEQ",
            TokenKind::Gt => "GT",
            TokenKind::GtEq => "GTEQ",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A single lexeme and its kind.
///
/// No position is kept. String tokens hold the text between the quotes;
/// the EOF token has empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Token {
            text: text.into(),
            kind,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Renders the token the way diagnostics quote it: the lexeme itself,
/// or the kind name for tokens whose text is not printable.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof | TokenKind::Newline => write!(f, "{}", self.kind),
            _ => f.write_str(&self.text),
        }
    }
}
