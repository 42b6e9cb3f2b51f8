//! Infrastructure adapters for the clipboard, configuration, and process signals.

pub mod clipboard;
pub mod config;
pub mod signal;
