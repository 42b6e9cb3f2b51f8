//! Assembling loaded files into the mega string.
//!
//! Each file becomes `File: <path>`, [`SEPARATOR`], the raw content, and [`SEPARATOR`]
//! again. Content is embedded verbatim with no escaping, so a file that itself contains
//! the separator makes the output ambiguous to split.

use std::path::{Path, PathBuf};

/// A newline, fifty `=`, and a newline.
pub const SEPARATOR: &str = "\n==================================================\n";

/// Header prefix written before each file path.
pub const HEADER_PREFIX: &str = "File: ";

/// Accumulates file sections in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MegaStringBuilder {
    output: String,
    included: Vec<PathBuf>,
}

impl MegaStringBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one file section.
    pub fn push(&mut self, path: &Path, content: &str) {
        self.output.reserve(
            HEADER_PREFIX.len() + path.as_os_str().len() + content.len() + 2 * SEPARATOR.len(),
        );
        self.output.push_str(HEADER_PREFIX);
        self.output.push_str(&path.display().to_string());
        self.output.push_str(SEPARATOR);
        self.output.push_str(content);
        self.output.push_str(SEPARATOR);
        self.included.push(path.to_path_buf());
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }

    /// Consume the builder, returning the output and the included paths.
    pub fn finish(self) -> (String, Vec<PathBuf>) {
        (self.output, self.included)
    }
}
