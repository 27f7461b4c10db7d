pub mod api;
pub mod ast;
pub mod builder;
pub mod config;
pub mod doc;
pub mod error;
pub mod layout;
pub mod lexer;
pub mod mode;
pub mod operator_precedence;
pub mod parser;
pub mod report;
pub mod stack;
pub mod token;

// Re-export the main public API
pub use api::{
    format_string, get_matching_paths, pretty_print, pretty_print_or_original, pretty_print_with,
    pretty_statements, run,
};
pub use config::load_config;
pub use error::{Result, SqlprettyError};
pub use mode::Mode;
pub use stack::{StackGuard, StackProbe, StackSwitch, ThreadStack};
