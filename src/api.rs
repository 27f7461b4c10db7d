use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::Statement;
use crate::builder::build_statement;
use crate::error::{Result, SqlprettyError};
use crate::layout::render;
use crate::mode::Mode;
use crate::parser::parse_statements_with;
use crate::report::{FileResult, FileStatus, Report};
use crate::stack::{StackGuard, StackProbe, StackSwitch, ThreadStack};

/// Format `text` to fit in `width` columns.
///
/// Every statement is laid out independently and the results are joined in
/// source order. No trailing newline is added.
pub fn pretty_print(text: &str, width: usize) -> Result<String> {
    pretty_print_with(text, &Mode::with_width(width), &ThreadStack::new())
}

/// Like [`pretty_print`], with explicit options and stack capability.
pub fn pretty_print_with<S: StackSwitch>(text: &str, mode: &Mode, switch: &S) -> Result<String> {
    mode.validate()?;
    let guard = StackGuard::new(switch, mode.stack_size, mode.max_stack_size)?;
    guard.run(|probe| {
        let statements = parse_statements_with(text, probe)?;
        let rendered = render_statements(&statements, mode, probe)?;
        Ok(join_statements(text, &statements, rendered))
    })
}

/// Format each statement of `text` separately, in source order.
pub fn pretty_statements(text: &str, width: usize) -> Result<Vec<String>> {
    let mode = Mode::with_width(width);
    mode.validate()?;
    let switch = ThreadStack::new();
    let guard = StackGuard::new(&switch, mode.stack_size, mode.max_stack_size)?;
    guard.run(|probe| {
        let statements = parse_statements_with(text, probe)?;
        render_statements(&statements, &mode, probe)
    })
}

/// Format `text`, or return it unchanged if it cannot be formatted.
pub fn pretty_print_or_original(text: &str, width: usize) -> String {
    match pretty_print(text, width) {
        Ok(formatted) => formatted,
        Err(e) => {
            log::debug!("leaving input unformatted: {}", e);
            text.to_string()
        }
    }
}

/// Format a SQL string according to the given mode, then verify that the
/// output parses to the same statements unless the mode skips the check.
pub fn format_string(source: &str, mode: &Mode) -> Result<String> {
    let switch = ThreadStack::new();
    let result = pretty_print_with(source, mode, &switch)?;

    if mode.should_safety_check() {
        safety_check(source, &result, mode, &switch)?;
    }

    Ok(result)
}

fn render_statements(statements: &[Statement], mode: &Mode, probe: &StackProbe<'_>) -> Result<Vec<String>> {
    statements
        .iter()
        .map(|statement| {
            let doc = build_statement(statement, probe, mode.indent)?;
            Ok(render(&doc, mode.line_length))
        })
        .collect()
}

/// Join rendered statements with a blank line where the source had one
/// between them, a single newline otherwise.
fn join_statements(source: &str, statements: &[Statement], rendered: Vec<String>) -> String {
    let mut out = String::new();
    for (i, text) in rendered.into_iter().enumerate() {
        if i > 0 {
            let gap = &source[statements[i - 1].span.end..statements[i].span.start];
            out.push_str(if has_blank_line(gap) { "\n\n" } else { "\n" });
        }
        out.push_str(&text);
    }
    out
}

fn has_blank_line(gap: &str) -> bool {
    let lines: Vec<&str> = gap.split('\n').collect();
    lines.len() > 2 && lines[1..lines.len() - 1].iter().any(|l| l.trim().is_empty())
}

/// Reparse the original and the formatted text and require the same
/// statements, ignoring layout and keyword case.
fn safety_check(original: &str, formatted: &str, mode: &Mode, switch: &dyn StackSwitch) -> Result<()> {
    let guard = StackGuard::new(switch, mode.stack_size, mode.max_stack_size)?;
    guard.run(|probe| {
        let before = parse_statements_with(original, probe)?;
        let after = parse_statements_with(formatted, probe).map_err(|e| {
            SqlprettyError::Equivalence(format!("formatted output does not parse: {}", e))
        })?;

        if before.len() != after.len() {
            return Err(SqlprettyError::Equivalence(format!(
                "Statement count mismatch: original has {} statements, formatted has {}",
                before.len(),
                after.len()
            )));
        }

        for (i, (b, a)) in before.iter().zip(after.iter()).enumerate() {
            if b.body != a.body || b.terminated != a.terminated {
                return Err(SqlprettyError::Equivalence(format!(
                    "Statement {} changed meaning: original at bytes {}..{}",
                    i + 1,
                    b.span.start,
                    b.span.end
                )));
            }
        }
        Ok(())
    })
}

/// Run the formatter on a collection of files.
pub fn run(files: &[PathBuf], mode: &Mode) -> Report {
    let matching_paths = get_matching_paths(files, mode);
    let mut report = Report::new();

    if mode.single_process || matching_paths.len() <= 1 {
        for path in &matching_paths {
            report.add(format_file(path, mode));
        }
        return report;
    }

    use rayon::prelude::*;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(mode.threads)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            log::warn!("falling back to a single thread: {}", e);
            for path in &matching_paths {
                report.add(format_file(path, mode));
            }
            return report;
        }
    };

    let results: Vec<FileResult> = pool.install(|| {
        matching_paths
            .par_iter()
            .map(|path| format_file(path, mode))
            .collect()
    });
    for result in results {
        report.add(result);
    }

    report
}

/// Formatted file contents: the formatted text plus a final newline, or
/// nothing for a file without statements.
pub fn with_trailing_newline(formatted: String) -> String {
    if formatted.is_empty() {
        formatted
    } else {
        formatted + "\n"
    }
}

/// Format a single file.
fn format_file(path: &Path, mode: &Mode) -> FileResult {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => return FileResult::error(path, format!("Read error: {}", e)),
    };

    let formatted = match format_string(&source, mode) {
        Ok(f) => with_trailing_newline(f),
        Err(e) => return FileResult::error(path, e.to_string()),
    };

    if source == formatted {
        log::info!("{} unchanged", path.display());
        return FileResult::new(path, FileStatus::Unchanged);
    }

    if mode.check || mode.diff {
        if mode.diff {
            if let Err(e) = print_diff(path, &source, &formatted, mode) {
                log::warn!("could not print diff for {}: {}", path.display(), e);
            }
        }
        return FileResult::new(path, FileStatus::Changed);
    }

    match std::fs::write(path, &formatted) {
        Ok(_) => {
            log::info!("reformatted {}", path.display());
            FileResult::new(path, FileStatus::Changed)
        }
        Err(e) => FileResult::error(path, format!("Write error: {}", e)),
    }
}

/// Get all SQL file paths that match the given inputs.
pub fn get_matching_paths(paths: &[PathBuf], mode: &Mode) -> Vec<PathBuf> {
    let extensions = mode.sql_extensions();
    let exclude: Vec<glob::Pattern> = mode
        .exclude
        .iter()
        .filter_map(|pattern| match glob::Pattern::new(pattern) {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("ignoring invalid exclude pattern {:?}: {}", pattern, e);
                None
            }
        })
        .collect();
    let mut result = HashSet::new();

    for path in paths {
        if path.is_file() {
            if is_sql_file(path, extensions) && !is_excluded(path, &exclude) {
                result.insert(path.clone());
            }
        } else if path.is_dir() {
            collect_sql_files(path, extensions, &exclude, &mut result);
        }
    }

    let mut sorted: Vec<PathBuf> = result.into_iter().collect();
    sorted.sort();
    sorted
}

/// Check if a file has a SQL extension.
fn is_sql_file(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// A path is excluded when a pattern matches its file name or the full path.
fn is_excluded(path: &Path, exclude: &[glob::Pattern]) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    exclude
        .iter()
        .any(|pattern| pattern.matches(&name) || pattern.matches_path(path))
}

/// Recursively collect SQL files from a directory.
fn collect_sql_files(
    dir: &Path,
    extensions: &[&str],
    exclude: &[glob::Pattern],
    result: &mut HashSet<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("cannot read {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let hidden = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        if hidden || is_excluded(&path, exclude) {
            continue;
        }

        if path.is_dir() {
            collect_sql_files(&path, extensions, exclude, result);
        } else if is_sql_file(&path, extensions) {
            result.insert(path);
        }
    }
}

/// Print a unified-style diff between original and formatted content to
/// stderr, colored unless the mode disables color.
fn print_diff(path: &Path, original: &str, formatted: &str, mode: &Mode) -> std::io::Result<()> {
    use similar::{ChangeTag, TextDiff};

    let choice = if mode.color() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let stream = StandardStream::stderr(choice);
    let mut out = stream.lock();

    writeln!(out, "--- {}", path.display())?;
    writeln!(out, "+++ {}", path.display())?;

    let diff = TextDiff::from_lines(original, formatted);
    for change in diff.iter_all_changes() {
        let (sign, color) = match change.tag() {
            ChangeTag::Delete => ("-", Some(Color::Red)),
            ChangeTag::Insert => ("+", Some(Color::Green)),
            ChangeTag::Equal => (" ", None),
        };
        out.set_color(ColorSpec::new().set_fg(color))?;
        write!(out, "{}{}", sign, change)?;
        if change.missing_newline() {
            writeln!(out)?;
        }
    }
    out.reset()?;
    Ok(())
}
