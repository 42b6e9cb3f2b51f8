//! Domain models for gathered files, load outcomes, and build reports.

use std::path::PathBuf;

/// Why a gathered file was left out of the mega string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Content is not valid UTF-8.
    Binary,
    /// The file could not be opened or read.
    Unreadable(String),
}

/// A gathered file that did not make it into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of a single pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// The concatenated output placed on the clipboard.
    pub mega_string: String,
    /// Files whose content was included, in output order.
    pub included: Vec<PathBuf>,
    /// Files that were gathered but could not be loaded as text.
    pub skipped: Vec<SkippedFile>,
    /// Configured entries that resolved to neither a file nor a directory.
    pub missing: Vec<PathBuf>,
}

impl BuildReport {
    pub fn included_count(&self) -> usize {
        self.included.len()
    }

    pub fn characters(&self) -> usize {
        self.mega_string.chars().count()
    }
}
