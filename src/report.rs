use std::path::{Path, PathBuf};

/// Status of formatting a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// File was already formatted correctly.
    Unchanged,
    /// File was reformatted (or would be, in check mode).
    Changed,
    /// The file could not be read, formatted or written.
    Error,
}

/// Result of formatting a single file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub status: FileStatus,
    pub error: Option<String>,
}

impl FileResult {
    pub fn new(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            error: None,
        }
    }

    pub fn error(path: &Path, message: String) -> Self {
        log::debug!("{}: {}", path.display(), message);
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Error,
            error: Some(message),
        }
    }
}

/// Aggregated report of formatting results.
#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<FileResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    fn count(&self, status: FileStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn unchanged(&self) -> usize {
        self.count(FileStatus::Unchanged)
    }

    pub fn changed(&self) -> usize {
        self.count(FileStatus::Changed)
    }

    pub fn errors(&self) -> usize {
        self.count(FileStatus::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    pub fn has_changes(&self) -> bool {
        self.changed() > 0
    }

    /// One-line summary, e.g. "3 file(s) processed, 1 reformatted, 2 unchanged".
    /// In check mode changed files are reported as "would be reformatted".
    pub fn summary(&self, check: bool) -> String {
        let mut parts = vec![format!("{} file(s) processed", self.total())];
        if self.changed() > 0 {
            let verb = if check { "would be reformatted" } else { "reformatted" };
            parts.push(format!("{} {}", self.changed(), verb));
        }
        if self.unchanged() > 0 {
            parts.push(format!("{} unchanged", self.unchanged()));
        }
        if self.errors() > 0 {
            parts.push(format!("{} error(s)", self.errors()));
        }
        parts.join(", ")
    }

    /// Print error details.
    pub fn print_errors(&self) {
        for result in &self.results {
            if let Some(ref error) = result.error {
                eprintln!("error: {}: {}", result.path.display(), error);
            }
        }
    }
}
