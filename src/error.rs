use thiserror::Error;

/// User-facing errors.
#[derive(Error, Debug)]
pub enum SqlprettyError {
    #[error("sqlpretty lex error at position {position}: {reason}")]
    Lex { position: usize, reason: String },

    #[error("sqlpretty parse error at position {position}: expected {expected}, found {found}")]
    Parse {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("sqlpretty config error: {0}")]
    Config(String),

    #[error("sqlpretty stack exhausted: nesting needs more than {limit} bytes of stack")]
    StackExhausted { limit: usize },

    #[error("sqlpretty equivalence error: {0}")]
    Equivalence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SqlprettyError {
    pub fn lex(position: usize, reason: impl Into<String>) -> Self {
        Self::Lex {
            position,
            reason: reason.into(),
        }
    }

    pub fn parse(position: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Parse {
            position,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Byte offset in the source the error points at, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Lex { position, .. } | Self::Parse { position, .. } => Some(*position),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SqlprettyError>;
