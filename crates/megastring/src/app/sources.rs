//! Reading the path-list file.

use std::fs;
use std::path::Path;

use crate::domain::errors::PathListError;

/// Read the path-list file into trimmed, non-blank entries in file order.
pub fn read_path_list(path: &Path) -> Result<Vec<String>, PathListError> {
    let contents = fs::read_to_string(path).map_err(|source| PathListError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_path_list(&contents))
}

/// Split path-list contents into entries. No comment or quoting syntax is recognized.
pub fn parse_path_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
