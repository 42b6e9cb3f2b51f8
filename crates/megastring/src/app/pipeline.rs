//! One full build: path list → gather → load → assemble → publish.

use std::path::{Path, PathBuf};

use crate::app::bundle::MegaStringBuilder;
use crate::app::gather::FileGatherer;
use crate::app::load::load_text;
use crate::app::sources::read_path_list;
use crate::domain::errors::RunError;
use crate::domain::model::{BuildReport, SkipReason, SkippedFile};
use crate::infra::clipboard::ClipboardSink;

/// Runs the build pipeline against a path-list file and publishes to a sink.
pub struct Pipeline<S> {
    sources: PathBuf,
    gatherer: FileGatherer,
    sink: S,
}

impl<S: ClipboardSink> Pipeline<S> {
    /// `sources` is the path-list file. Relative entries inside it resolve against `base`.
    pub fn new(sources: impl Into<PathBuf>, base: impl Into<PathBuf>, sink: S) -> Self {
        Self {
            sources: sources.into(),
            gatherer: FileGatherer::new(base),
            sink,
        }
    }

    pub fn sources(&self) -> &Path {
        &self.sources
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Build the mega string without publishing it.
    pub fn build(&self) -> Result<BuildReport, RunError> {
        let entries = read_path_list(&self.sources)?;
        let gathered = self.gatherer.gather(&entries);

        let mut builder = MegaStringBuilder::new();
        let mut skipped = Vec::new();
        for path in gathered.files {
            match load_text(&path) {
                Ok(content) => {
                    tracing::info!(path = %path.display(), "including");
                    builder.push(&path, &content);
                }
                Err(reason) => {
                    match &reason {
                        SkipReason::Binary => {
                            tracing::warn!(path = %path.display(), "skipping binary file");
                        }
                        SkipReason::Unreadable(error) => {
                            tracing::warn!(path = %path.display(), %error, "failed to read file");
                        }
                    }
                    skipped.push(SkippedFile { path, reason });
                }
            }
        }

        let (mega_string, included) = builder.finish();
        Ok(BuildReport {
            mega_string,
            included,
            skipped,
            missing: gathered.missing,
        })
    }

    /// Build and publish. The sink is written once, and only after the build succeeded.
    pub fn run(&mut self) -> Result<BuildReport, RunError> {
        tracing::info!(sources = %self.sources.display(), "rebuilding mega string");
        let report = self.build()?;
        self.sink.set_text(&report.mega_string)?;
        tracing::info!(
            included = report.included_count(),
            skipped = report.skipped.len(),
            missing = report.missing.len(),
            characters = report.characters(),
            "mega string copied to clipboard"
        );
        Ok(report)
    }

    /// Called before exit so the last published text outlives the process.
    pub fn hand_off(&mut self) {
        if let Err(err) = self.sink.persist() {
            tracing::warn!(error = %err, "clipboard contents will be cleared on exit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::bundle::{HEADER_PREFIX, SEPARATOR};
    use crate::domain::errors::ClipboardError;
    use crate::infra::clipboard::MemoryClipboard;
    use anyhow::Result;
    use std::fs;

    struct BrokenClipboard;

    impl ClipboardSink for BrokenClipboard {
        fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::NoBackend)
        }
    }

    #[derive(Default)]
    struct CountingClipboard {
        writes: usize,
        persisted: usize,
    }

    impl ClipboardSink for CountingClipboard {
        fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            self.writes += 1;
            Ok(())
        }

        fn persist(&mut self) -> Result<(), ClipboardError> {
            self.persisted += 1;
            Err(ClipboardError::NoBackend)
        }
    }

    #[test]
    fn hand_off_persists_and_tolerates_failure() -> Result<()> {
        let temp = scratch_tree()?;
        let root = temp.path();
        let mut pipeline = Pipeline::new(
            root.join("LLM_MEGASTRING_SOURCES.txt"),
            root,
            CountingClipboard::default(),
        );
        pipeline.run()?;
        pipeline.hand_off();
        assert_eq!(pipeline.sink().writes, 1);
        assert_eq!(pipeline.sink().persisted, 1);
        Ok(())
    }

    fn scratch_tree() -> Result<tempfile::TempDir> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("subdir"))?;
        fs::write(root.join("a.txt"), "hello")?;
        fs::write(root.join("subdir/b.txt"), "world")?;
        fs::write(root.join("LLM_MEGASTRING_SOURCES.txt"), "a.txt\nsubdir/\n")?;
        Ok(temp)
    }

    #[test]
    fn builds_example_scenario() -> Result<()> {
        let temp = scratch_tree()?;
        let root = temp.path();
        let mut pipeline = Pipeline::new(
            root.join("LLM_MEGASTRING_SOURCES.txt"),
            root,
            MemoryClipboard::default(),
        );

        let report = pipeline.run()?;

        let a = root.join("a.txt");
        let b = root.join("subdir/b.txt");
        assert_eq!(report.included, vec![a.clone(), b.clone()]);
        assert_eq!(report.included_count(), 2);
        let expected = format!(
            "File: {}{SEPARATOR}hello{SEPARATOR}File: {}{SEPARATOR}world{SEPARATOR}",
            a.display(),
            b.display()
        );
        assert_eq!(report.mega_string, expected);
        assert_eq!(pipeline.sink().contents(), Some(expected.as_str()));
        Ok(())
    }

    #[test]
    fn binary_files_are_skipped_without_aborting() -> Result<()> {
        let temp = scratch_tree()?;
        let root = temp.path();
        fs::write(root.join("subdir/a_blob.bin"), [0xff, 0xfe, 0x00, 0x80])?;

        let pipeline = Pipeline::new(
            root.join("LLM_MEGASTRING_SOURCES.txt"),
            root,
            MemoryClipboard::default(),
        );
        let report = pipeline.build()?;

        let blob = root.join("subdir/a_blob.bin");
        assert_eq!(report.included_count(), 2);
        assert!(!report.included.contains(&blob));
        assert!(!report.mega_string.contains("a_blob.bin"));
        assert_eq!(
            report.skipped,
            vec![SkippedFile {
                path: blob,
                reason: SkipReason::Binary
            }]
        );
        Ok(())
    }

    #[test]
    fn output_splits_back_into_headers_and_contents() -> Result<()> {
        let temp = scratch_tree()?;
        let root = temp.path();
        let pipeline = Pipeline::new(
            root.join("LLM_MEGASTRING_SOURCES.txt"),
            root,
            MemoryClipboard::default(),
        );
        let report = pipeline.build()?;

        let parts: Vec<&str> = report.mega_string.split(SEPARATOR).collect();
        // Trailing separator leaves one empty tail; each file contributes a header and a body.
        assert_eq!(parts.len(), report.included.len() * 2 + 1);
        assert_eq!(parts.last(), Some(&""));
        for (index, path) in report.included.iter().enumerate() {
            let header = parts[index * 2];
            assert_eq!(header, format!("{HEADER_PREFIX}{}", path.display()));
            assert_eq!(parts[index * 2 + 1], fs::read_to_string(path)?);
        }
        Ok(())
    }

    #[test]
    fn repeated_builds_are_identical() -> Result<()> {
        let temp = scratch_tree()?;
        let root = temp.path();
        let mut pipeline = Pipeline::new(
            root.join("LLM_MEGASTRING_SOURCES.txt"),
            root,
            MemoryClipboard::default(),
        );
        let first = pipeline.run()?;
        let second = pipeline.run()?;
        assert_eq!(first, second);
        assert_eq!(pipeline.sink().history[0], pipeline.sink().history[1]);
        Ok(())
    }

    #[test]
    fn missing_path_list_aborts_before_publishing() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut pipeline = Pipeline::new(
            temp.path().join("absent.txt"),
            temp.path(),
            MemoryClipboard::default(),
        );
        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, RunError::PathList(_)));
        assert!(pipeline.sink().history.is_empty());
        Ok(())
    }

    #[test]
    fn clipboard_failure_surfaces() -> Result<()> {
        let temp = scratch_tree()?;
        let root = temp.path();
        let mut pipeline =
            Pipeline::new(root.join("LLM_MEGASTRING_SOURCES.txt"), root, BrokenClipboard);
        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, RunError::Publish(ClipboardError::NoBackend)));
        Ok(())
    }

    #[test]
    fn missing_entries_are_reported() -> Result<()> {
        let temp = scratch_tree()?;
        let root = temp.path();
        fs::write(root.join("LLM_MEGASTRING_SOURCES.txt"), "ghost/\na.txt\n")?;
        let pipeline = Pipeline::new(
            root.join("LLM_MEGASTRING_SOURCES.txt"),
            root,
            MemoryClipboard::default(),
        );
        let report = pipeline.build()?;
        assert_eq!(report.missing, vec![root.join("ghost/")]);
        assert_eq!(report.included, vec![root.join("a.txt")]);
        Ok(())
    }
}
