use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::SqlprettyError;
use crate::mode::Mode;

const CONFIG_FILE_NAME: &str = "sqlpretty.toml";

const KNOWN_KEYS: &[&str] = &[
    "line_length",
    "indent",
    "stack_size",
    "max_stack_size",
    "exclude",
];

/// Load sqlpretty configuration.
/// Searches parent directories for sqlpretty.toml or pyproject.toml if no
/// config path is given.
pub fn load_config(files: &[PathBuf], config_path: Option<&Path>) -> Result<Mode, SqlprettyError> {
    let mut mode = Mode::default();

    let config_file = match config_path {
        Some(path) => {
            if path.exists() {
                Some(path.to_path_buf())
            } else {
                return Err(SqlprettyError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }
        None => find_config_file(files),
    };

    if let Some(path) = config_file {
        log::debug!("loading config from {}", path.display());
        let raw = load_config_from_path(&path)?;
        apply_config(&mut mode, &raw)?;
    }

    Ok(mode)
}

/// Search the parents of the given files for a config file. A
/// sqlpretty.toml wins over a pyproject.toml in the same directory, and a
/// pyproject.toml only counts if it has a `[tool.sqlpretty]` table.
fn find_config_file(files: &[PathBuf]) -> Option<PathBuf> {
    for parent in get_common_parents(files) {
        let config = parent.join(CONFIG_FILE_NAME);
        if config.exists() {
            return Some(config);
        }
        let pyproject = parent.join("pyproject.toml");
        if pyproject.exists() && has_tool_section(&pyproject) {
            return Some(pyproject);
        }
    }
    None
}

fn has_tool_section(pyproject: &Path) -> bool {
    std::fs::read_to_string(pyproject)
        .ok()
        .and_then(|content| content.parse::<toml::Table>().ok())
        .is_some_and(|table| {
            table
                .get("tool")
                .and_then(|tool| tool.get("sqlpretty"))
                .is_some()
        })
}

/// Get the parent directories of the given file paths, ordered from most
/// specific to least specific.
fn get_common_parents(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut parents = Vec::new();

    for file in files {
        if file.as_os_str() == "-" {
            continue;
        }
        let parent = if file.is_dir() {
            file.clone()
        } else {
            file.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        };

        let mut current = Some(parent.as_path());
        while let Some(dir) = current {
            let dir_buf = dir.to_path_buf();
            if !parents.contains(&dir_buf) {
                parents.push(dir_buf);
            }
            current = dir.parent();
        }
    }

    parents
}

/// Load and parse a TOML config file into its sqlpretty keys.
fn load_config_from_path(path: &Path) -> Result<HashMap<String, toml::Value>, SqlprettyError> {
    let content = std::fs::read_to_string(path)?;
    let parsed: toml::Table = content.parse()?;

    let is_own_file = path
        .file_name()
        .map(|n| n == CONFIG_FILE_NAME)
        .unwrap_or(false);
    let section = if is_own_file {
        Some(&parsed)
    } else {
        parsed
            .get("tool")
            .and_then(|t| t.get("sqlpretty"))
            .and_then(toml::Value::as_table)
    };

    let mut map = HashMap::new();
    if let Some(table) = section {
        for (k, v) in table {
            map.insert(k.to_lowercase().replace('-', "_"), v.clone());
        }
    }
    Ok(map)
}

fn positive_integer(config: &HashMap<String, toml::Value>, key: &str) -> Result<Option<usize>, SqlprettyError> {
    match config.get(key) {
        None => Ok(None),
        Some(toml::Value::Integer(n)) if *n > 0 => Ok(Some(*n as usize)),
        Some(other) => Err(SqlprettyError::Config(format!(
            "{} must be a positive integer, got {}",
            key, other
        ))),
    }
}

/// Apply configuration values to a Mode.
fn apply_config(mode: &mut Mode, config: &HashMap<String, toml::Value>) -> Result<(), SqlprettyError> {
    for key in config.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            return Err(SqlprettyError::Config(format!(
                "Unknown config option: {}",
                key
            )));
        }
    }

    if let Some(n) = positive_integer(config, "line_length")? {
        mode.line_length = n;
    }
    if let Some(n) = positive_integer(config, "indent")? {
        mode.indent = n;
    }
    if let Some(n) = positive_integer(config, "stack_size")? {
        mode.stack_size = n;
    }
    if let Some(n) = positive_integer(config, "max_stack_size")? {
        mode.max_stack_size = n;
    }

    match config.get("exclude") {
        None => {}
        Some(toml::Value::Array(arr)) => {
            mode.exclude = arr
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect();
        }
        Some(toml::Value::String(pattern)) => mode.exclude = vec![pattern.clone()],
        Some(other) => {
            return Err(SqlprettyError::Config(format!(
                "exclude must be a string or a list of strings, got {}",
                other
            )))
        }
    }

    mode.validate()
}
