use memchr::{memchr, memchr2};

use crate::error::{Result, SqlprettyError};
use crate::token::{Token, TokenKind};

/// Every word the lexer classifies as a keyword (lowercase).
static KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "add", "all", "alter", "and", "as", "asc", "between", "by", "cascade", "case",
    "cast", "check", "column", "constraint", "create", "cross", "current", "default",
    "delete", "desc", "distinct", "drop", "else", "end", "except", "exists", "false",
    "filter", "first", "following", "foreign", "from", "full", "group", "having", "if",
    "ilike", "in", "index", "inner", "insert", "intersect", "into", "is", "join", "key",
    "last", "lateral", "left", "like", "limit", "materialized", "natural", "not", "null",
    "nulls", "offset", "on", "or", "order", "outer", "over", "partition", "preceding",
    "primary", "range", "recursive", "references", "rename", "replace", "restrict",
    "returning", "right", "row", "rows", "schema", "select", "set", "table", "temp",
    "temporary", "then", "to", "true", "unbounded", "union", "unique", "unknown",
    "update", "using", "values", "view", "when", "where", "with",
};

/// Keywords that may never be used as a bare identifier.
static RESERVED: phf::Set<&'static str> = phf::phf_set! {
    "all", "alter", "and", "as", "asc", "between", "by", "case", "cast", "check",
    "constraint", "create", "cross", "default", "delete", "desc", "distinct", "drop",
    "else", "end", "except", "exists", "false", "foreign", "from", "full", "group",
    "having", "ilike", "in", "inner", "insert", "intersect", "into", "is", "join",
    "lateral", "left", "like", "limit", "natural", "not", "null", "offset", "on", "or",
    "order", "outer", "over", "primary", "references", "returning", "right", "select",
    "set", "table", "then", "true", "union", "unique", "update", "using", "values",
    "when", "where", "with",
};

/// Multi-character operators, longest first.
const COMPOUND_OPERATORS: &[&str] = &[
    "->>", "#>>", "->", "#>", "@>", "<@", "::", "<=", ">=", "<>", "!=", "||", "**",
];

const SINGLE_OPERATORS: &[u8] = b"=<>+-*/%^~&|#";

const PUNCTUATION: &[u8] = b"(),;.";

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word.to_ascii_lowercase().as_str())
}

pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(word.to_ascii_lowercase().as_str())
}

/// Split `source` into tokens. The returned stream always ends with an
/// `Eof` token whose prefix holds any trailing whitespace.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        let remaining = &source[pos..];
        let prefix_len = skip_whitespace(remaining);
        let prefix = &remaining[..prefix_len];
        let spos = pos + prefix_len;
        let rest = &remaining[prefix_len..];

        if rest.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, prefix, "", spos, spos));
            break;
        }

        let (kind, len) = lex_one(rest, spos)?;
        let text = &rest[..len];
        let kind = if kind == TokenKind::Identifier && is_keyword(text) {
            TokenKind::Keyword
        } else {
            kind
        };
        tokens.push(Token::new(kind, prefix, text, spos, spos + len));
        pos = spos + len;
    }

    log::debug!("lexed {} tokens from {} bytes", tokens.len(), source.len());
    Ok(tokens)
}

/// Lex a single token at the start of `rest`, which begins at byte `spos`
/// of the source. Returns the token kind and its byte length.
fn lex_one(rest: &str, spos: usize) -> Result<(TokenKind, usize)> {
    let bytes = rest.as_bytes();
    let b0 = bytes[0];
    let b1 = bytes.get(1).copied();

    match b0 {
        b'-' if b1 == Some(b'-') => Ok((TokenKind::Comment, scan_line_comment(bytes))),
        b'/' if b1 == Some(b'*') => scan_block_comment(bytes)
            .map(|len| (TokenKind::Comment, len))
            .ok_or_else(|| SqlprettyError::lex(spos, "unterminated block comment")),
        b'\'' => scan_quoted(bytes, b'\'', false)
            .map(|len| (TokenKind::String, len))
            .ok_or_else(|| SqlprettyError::lex(spos, "unterminated string literal")),
        b'"' | b'`' => scan_quoted(bytes, b0, false)
            .map(|len| (TokenKind::QuotedIdentifier, len))
            .ok_or_else(|| SqlprettyError::lex(spos, "unterminated quoted identifier")),
        b'$' => {
            let digits = scan_digits(&bytes[1..]);
            if digits > 0 {
                return Ok((TokenKind::Parameter, 1 + digits));
            }
            match scan_dollar_string(bytes) {
                Some(len) if len > 0 => Ok((TokenKind::String, len)),
                Some(_) => Err(unrecognized(rest, spos)),
                None => Err(SqlprettyError::lex(spos, "unterminated dollar-quoted string")),
            }
        }
        b'?' => Ok((TokenKind::Parameter, 1)),
        b'0'..=b'9' => Ok((TokenKind::Number, scan_number(bytes))),
        b'.' if b1.is_some_and(|b| b.is_ascii_digit()) => {
            Ok((TokenKind::Number, scan_number(bytes)))
        }
        _ if PUNCTUATION.contains(&b0) => Ok((TokenKind::Punctuation, 1)),
        _ if is_word_start(b0) => {
            let len = scan_word(bytes);
            // E'...', N'...', B'...', X'...' string literals
            if len == 1 && b1 == Some(b'\'') && matches!(b0 | 0x20, b'e' | b'n' | b'b' | b'x') {
                let escapes = b0 | 0x20 == b'e';
                return scan_quoted(&bytes[1..], b'\'', escapes)
                    .map(|qlen| (TokenKind::String, 1 + qlen))
                    .ok_or_else(|| SqlprettyError::lex(spos + 1, "unterminated string literal"));
            }
            Ok((TokenKind::Identifier, len))
        }
        _ => {
            let len = scan_operator(bytes);
            if len > 0 {
                Ok((TokenKind::Operator, len))
            } else {
                Err(unrecognized(rest, spos))
            }
        }
    }
}

fn unrecognized(rest: &str, spos: usize) -> SqlprettyError {
    let ch = rest.chars().next().unwrap_or('\0');
    SqlprettyError::lex(spos, format!("unrecognized character {:?}", ch))
}

/// Returns the byte length of leading whitespace (newlines included).
#[inline]
fn skip_whitespace(text: &str) -> usize {
    text.char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[inline]
fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

/// Scan an identifier (word characters: alphanumeric, underscore, `$`).
/// Returns byte length of the identifier.
#[inline]
fn scan_word(bytes: &[u8]) -> usize {
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
            i += 1;
        } else if b >= 0x80 {
            // Non-ASCII: could be unicode identifier. Accept it.
            i += 1;
        } else {
            break;
        }
    }
    i
}

#[inline]
fn scan_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Scan a number starting at bytes[0]. Handles:
/// - Hex (0x...), binary (0b...), octal (0o...)
/// - Decimal with optional fractional part and scientific notation
///
/// Returns byte length.
fn scan_number(bytes: &[u8]) -> usize {
    let len = bytes.len();
    if len == 0 {
        return 0;
    }

    let mut i = 0;

    if bytes[0] == b'0' && len > 2 {
        let radix_digit: Option<fn(u8) -> bool> = match bytes[1] {
            b'x' | b'X' => Some(|b: u8| b.is_ascii_hexdigit()),
            b'b' | b'B' => Some(|b: u8| b == b'0' || b == b'1'),
            b'o' | b'O' => Some(|b: u8| (b'0'..=b'7').contains(&b)),
            _ => None,
        };
        if let Some(is_digit) = radix_digit {
            if is_digit(bytes[2]) {
                i = 2;
                while i < len && (is_digit(bytes[i]) || bytes[i] == b'_') {
                    i += 1;
                }
                return i;
            }
        }
    }

    // Integer part: digits and underscores
    while i < len && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
        i += 1;
    }

    // Decimal part
    if i < len && bytes[i] == b'.' {
        i += 1;
        while i < len && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
            i += 1;
        }
    }

    // Scientific notation
    if i < len && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < len && bytes[j].is_ascii_digit() {
            i = j;
            while i < len && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }

    i
}

/// Scan a quoted run starting at the opening `quote`. A doubled quote stands
/// for one literal quote; with `escapes`, a backslash escapes the next byte.
/// Returns the byte length including delimiters, or `None` if unterminated.
fn scan_quoted(bytes: &[u8], quote: u8, escapes: bool) -> Option<usize> {
    let mut i = 1;
    while i < bytes.len() {
        let offset = if escapes {
            memchr2(quote, b'\\', &bytes[i..])?
        } else {
            memchr(quote, &bytes[i..])?
        };
        let pos = i + offset;
        if bytes[pos] == b'\\' {
            i = pos + 2;
            continue;
        }
        if bytes.get(pos + 1) == Some(&quote) {
            i = pos + 2;
            continue;
        }
        return Some(pos + 1);
    }
    None
}

/// Scan a line comment (`--`). Returns byte length up to, not including,
/// the newline.
fn scan_line_comment(bytes: &[u8]) -> usize {
    memchr(b'\n', bytes).unwrap_or(bytes.len())
}

/// Scan a block comment. `bytes` starts at `/*`. Returns byte length
/// including delimiters, or `None` if unterminated.
fn scan_block_comment(bytes: &[u8]) -> Option<usize> {
    let mut i = 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return Some(i + 2);
        }
        i += 1;
    }
    None
}

/// Scan a dollar-quoted string (`$tag$...$tag$`). `bytes` starts at `$`.
/// Returns `Some(0)` if this is not a dollar quote at all and `None` if the
/// closing tag is missing.
fn scan_dollar_string(bytes: &[u8]) -> Option<usize> {
    let mut tag_end = 1;
    while tag_end < bytes.len()
        && (bytes[tag_end].is_ascii_alphanumeric() || bytes[tag_end] == b'_')
    {
        tag_end += 1;
    }
    if tag_end >= bytes.len() || bytes[tag_end] != b'$' {
        return Some(0);
    }
    let tag = &bytes[..tag_end + 1]; // e.g. $$ or $tag$
    let tag_len = tag.len();

    let mut i = tag_len;
    while i + tag_len <= bytes.len() {
        if bytes[i] == b'$' && bytes[i..].starts_with(tag) {
            return Some(i + tag_len);
        }
        i += 1;
    }
    None
}

/// Scan an operator. Returns byte length, 0 if `bytes` does not start with one.
fn scan_operator(bytes: &[u8]) -> usize {
    for op in COMPOUND_OPERATORS {
        if bytes.starts_with(op.as_bytes()) {
            return op.len();
        }
    }
    if SINGLE_OPERATORS.contains(&bytes[0]) {
        1
    } else {
        0
    }
}
