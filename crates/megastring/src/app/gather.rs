//! Expanding configured entries into a flat list of files.

use std::fs;
use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;

/// Files discovered for one run, plus the entries that resolved to nothing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Gathered {
    pub files: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

/// Expands path-list entries into absolute file paths.
///
/// Relative entries resolve against `base`, and `.`/`..` are folded lexically before the
/// filesystem is consulted, so `missing/../a.txt` names `a.txt`. Directories are walked depth-first with
/// entries sorted by file name, so an unchanged tree always yields the same order.
/// Nothing is filtered: hidden files and files covered by ignore rules are included.
#[derive(Debug, Clone)]
pub struct FileGatherer {
    base: PathBuf,
}

impl FileGatherer {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn gather<S: AsRef<str>>(&self, entries: &[S]) -> Gathered {
        let mut gathered = Gathered::default();
        for entry in entries {
            let path = self.resolve(entry.as_ref());
            if path.is_file() {
                gathered.files.push(path);
            } else if path.is_dir() {
                walk_dir(&path, &mut gathered.files);
            } else {
                tracing::warn!(path = %path.display(), "path not found");
                gathered.missing.push(path);
            }
        }
        gathered
    }

    fn resolve(&self, entry: &str) -> PathBuf {
        let joined = self.base.join(entry);
        let absolute = std::path::absolute(&joined).unwrap_or(joined);
        normalize_lexically(&absolute)
    }
}

/// Drop `.` and fold `..` into its parent without touching the filesystem.
/// `..` at the root stays at the root.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn is_dangling_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
        && fs::metadata(path).is_err()
}

fn walk_dir(root: &Path, out: &mut Vec<PathBuf>) {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for result in walker {
        match result {
            Ok(entry) => {
                if entry.depth() == 0 {
                    continue;
                }
                // Symlinks to files count as files; symlinked directories are not descended.
                // Dangling links are kept so loading reports them as unreadable.
                let path = entry.path();
                if path.is_file() {
                    out.push(entry.into_path());
                } else if is_dangling_symlink(path) {
                    tracing::debug!(path = %path.display(), "dangling symlink");
                    out.push(entry.into_path());
                }
            }
            Err(err) => {
                tracing::warn!(root = %root.display(), error = %err, "directory walk error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;

    #[test]
    fn expands_files_and_directories_in_entry_order() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("subdir/nested"))?;
        fs::write(root.join("a.txt"), "hello")?;
        fs::write(root.join("subdir/b.txt"), "world")?;
        fs::write(root.join("subdir/nested/c.txt"), "deep")?;

        let gathered = FileGatherer::new(root).gather(&["subdir/", "a.txt"]);

        assert_eq!(
            gathered.files,
            vec![
                root.join("subdir/b.txt"),
                root.join("subdir/nested/c.txt"),
                root.join("a.txt"),
            ]
        );
        assert!(gathered.missing.is_empty());
        Ok(())
    }

    #[test]
    fn includes_hidden_and_gitignored_files() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("tree"))?;
        fs::write(root.join("tree/.gitignore"), "*.log\n")?;
        fs::write(root.join("tree/.hidden"), "h")?;
        fs::write(root.join("tree/run.log"), "l")?;

        let gathered = FileGatherer::new(root).gather(&["tree"]);

        assert_eq!(
            gathered.files,
            vec![
                root.join("tree/.gitignore"),
                root.join("tree/.hidden"),
                root.join("tree/run.log"),
            ]
        );
        Ok(())
    }

    #[test]
    fn reports_missing_entries_and_keeps_going() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::write(root.join("real.txt"), "x")?;

        let gathered = FileGatherer::new(root).gather(&["nope.txt", "real.txt"]);

        assert_eq!(gathered.files, vec![root.join("real.txt")]);
        assert_eq!(gathered.missing, vec![root.join("nope.txt")]);
        Ok(())
    }

    #[test]
    fn overlapping_entries_are_not_deduplicated() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("dir"))?;
        fs::write(root.join("dir/f.txt"), "x")?;

        let gathered = FileGatherer::new(root).gather(&["dir", "dir/f.txt"]);

        assert_eq!(gathered.files, vec![root.join("dir/f.txt"), root.join("dir/f.txt")]);
        Ok(())
    }

    #[test]
    fn absolute_entries_ignore_the_base() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("abs.txt");
        fs::write(&file, "x")?;

        let entry = file.display().to_string();
        let gathered = FileGatherer::new("/definitely/not/here").gather(&[entry]);

        assert_eq!(gathered.files, vec![file]);
        Ok(())
    }

    #[test]
    fn parent_and_current_components_are_folded() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("sub"))?;
        fs::write(root.join("a.txt"), "x")?;

        let gathered = FileGatherer::new(root).gather(&["sub/../a.txt", "./a.txt"]);

        let rendered: Vec<_> = gathered.files.iter().map(|p| p.display().to_string()).collect();
        let expected = root.join("a.txt").display().to_string();
        assert_eq!(rendered, vec![expected.clone(), expected]);
        Ok(())
    }

    #[test]
    fn parent_of_missing_directory_still_resolves() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::write(root.join("a.txt"), "x")?;

        let gathered = FileGatherer::new(root).gather(&["nodir/../a.txt"]);

        assert_eq!(gathered.files, vec![root.join("a.txt")]);
        assert!(gathered.missing.is_empty());
        Ok(())
    }

    #[test]
    fn lexical_normalization_keeps_root() {
        assert_eq!(
            normalize_lexically(Path::new("/../a/./b/../c")),
            PathBuf::from("/a/c")
        );
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlinks_are_gathered() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("tree"))?;
        fs::write(root.join("tree/real.txt"), "x")?;
        std::os::unix::fs::symlink(root.join("tree/absent"), root.join("tree/broken"))?;

        let gathered = FileGatherer::new(root).gather(&["tree"]);

        assert_eq!(
            gathered.files,
            vec![root.join("tree/broken"), root.join("tree/real.txt")]
        );
        assert!(matches!(
            crate::app::load::load_text(&gathered.files[0]),
            Err(crate::domain::model::SkipReason::Unreadable(_))
        ));
        Ok(())
    }

    #[test]
    fn directory_order_is_stable_across_runs() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        for name in ["zeta", "alpha", "mid/one", "mid/two", "beta"] {
            let path = root.join("tree").join(name);
            fs::create_dir_all(path.parent().unwrap())?;
            fs::write(path, name)?;
        }

        let gatherer = FileGatherer::new(root);
        let first = gatherer.gather(&["tree"]);
        let second = gatherer.gather(&["tree"]);

        assert_eq!(first, second);
        let names: Vec<_> = first
            .files
            .iter()
            .map(|p| p.strip_prefix(root.join("tree")).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "beta", "mid/one", "mid/two", "zeta"]);
        Ok(())
    }
}
