use compact_str::CompactString;

/// Position in source string (byte offset).
pub type Pos = usize;

/// All token kinds recognized by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    QuotedIdentifier,
    String,
    Number,
    Parameter,
    Operator,
    Punctuation,
    Comment,
    Eof,
}

impl TokenKind {
    /// Tokens the parser never sees.
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Comment)
    }

    pub fn is_identifier(self) -> bool {
        matches!(self, Self::Identifier | Self::QuotedIdentifier)
    }

    pub fn is_literal(self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Parameter)
    }
}

/// An immutable token produced by the lexer.
///
/// `prefix` holds the whitespace between the previous token and this one, so
/// the concatenation of every `prefix + text` reproduces the source exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub prefix: CompactString,
    pub text: CompactString,
    pub spos: Pos,
    pub epos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, prefix: &str, text: &str, spos: Pos, epos: Pos) -> Self {
        Self {
            kind,
            prefix: CompactString::from(prefix),
            text: CompactString::from(text),
            spos,
            epos,
        }
    }

    /// Case-insensitive keyword test. `kw` is given in uppercase.
    pub fn is_keyword(&self, kw: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(kw)
    }

    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == p
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// Human readable form used in parse errors.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Keyword => format!("keyword {}", self.text.to_ascii_uppercase()),
            TokenKind::Identifier | TokenKind::QuotedIdentifier => {
                format!("identifier {}", self.text)
            }
            TokenKind::String | TokenKind::Number | TokenKind::Parameter => {
                format!("literal {}", self.text)
            }
            TokenKind::Operator | TokenKind::Punctuation => format!("'{}'", self.text),
            TokenKind::Comment => "comment".to_string(),
        }
    }
}
