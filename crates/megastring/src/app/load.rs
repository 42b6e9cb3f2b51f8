//! Loading gathered files as UTF-8 text.

use std::fs;
use std::path::Path;

use crate::domain::model::SkipReason;

/// Read `path` as UTF-8 text.
///
/// Bytes that fail to decode mark the file as binary. Other I/O failures are reported
/// with their message. Neither is retried.
pub fn load_text(path: &Path) -> Result<String, SkipReason> {
    let bytes = fs::read(path).map_err(|err| SkipReason::Unreadable(err.to_string()))?;
    String::from_utf8(bytes).map_err(|_| SkipReason::Binary)
}
