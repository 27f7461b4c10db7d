use serde::Deserialize;

use crate::builder::DEFAULT_INDENT;
use crate::error::SqlprettyError;
use crate::stack::{DEFAULT_MAX_STACK_SIZE, DEFAULT_STACK_SIZE};

/// Mode holds all formatting configuration for sqlpretty.
#[derive(Debug, Clone, Deserialize)]
pub struct Mode {
    #[serde(default = "default_line_length")]
    pub line_length: usize,

    /// Columns added per nesting level.
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Bytes of stack the first formatting attempt runs on.
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,

    /// Largest stack region the formatter may grow to.
    #[serde(default = "default_max_stack_size")]
    pub max_stack_size: usize,

    #[serde(default)]
    pub check: bool,

    #[serde(default)]
    pub diff: bool,

    /// Skip safety equivalence check for faster operation.
    #[serde(default)]
    pub fast: bool,

    /// Glob patterns to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub quiet: bool,

    #[serde(default)]
    pub no_color: bool,

    #[serde(default)]
    pub force_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[serde(default)]
    pub threads: usize,

    #[serde(default)]
    pub single_process: bool,
}

fn default_line_length() -> usize {
    80
}
fn default_indent() -> usize {
    DEFAULT_INDENT
}
fn default_stack_size() -> usize {
    DEFAULT_STACK_SIZE
}
fn default_max_stack_size() -> usize {
    DEFAULT_MAX_STACK_SIZE
}

impl Mode {
    /// A default mode with the given line width.
    pub fn with_width(line_length: usize) -> Self {
        Self {
            line_length,
            ..Self::default()
        }
    }

    /// Reject settings the formatter cannot honor.
    pub fn validate(&self) -> Result<(), SqlprettyError> {
        if self.line_length == 0 {
            return Err(SqlprettyError::Config(
                "line width must be positive".to_string(),
            ));
        }
        if self.max_stack_size < self.stack_size {
            return Err(SqlprettyError::Config(format!(
                "max_stack_size ({}) is smaller than stack_size ({})",
                self.max_stack_size, self.stack_size
            )));
        }
        Ok(())
    }

    /// Whether color output is enabled.
    pub fn color(&self) -> bool {
        if self.force_color {
            return true;
        }
        if self.no_color {
            return false;
        }
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }
        true
    }

    /// Whether safety check should be performed.
    pub fn should_safety_check(&self) -> bool {
        !self.fast && !self.check && !self.diff
    }

    /// SQL file extensions to process.
    pub fn sql_extensions(&self) -> &[&str] {
        &["sql", "ddl", "dml"]
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self {
            line_length: default_line_length(),
            indent: default_indent(),
            stack_size: default_stack_size(),
            max_stack_size: default_max_stack_size(),
            check: false,
            diff: false,
            fast: false,
            exclude: Vec::new(),
            verbose: false,
            quiet: false,
            no_color: false,
            force_color: false,
            threads: 0,
            single_process: false,
        }
    }
}
