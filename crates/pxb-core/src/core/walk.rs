use std::io;
use std::path::{Path, PathBuf};

use pxb_domain::Configuration;
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::error::Result;
use super::filter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}

/// A path that survived filtering.
#[derive(Debug)]
pub struct WalkedEntry {
    pub path: PathBuf,
    /// Relative to the project root; what the filter saw.
    pub relative: PathBuf,
    /// Relative to the walk root; empty for the root itself.
    pub within: PathBuf,
    pub kind: EntryKind,
}

/// Visit `walk_root` (which must live under `project_root`) in file-name
/// order, pruning directories the filter rejects.
///
/// The walk root itself is visited unfiltered, even when it appears in
/// `skip`. Other paths in `skip` are never visited; symlinks and special
/// files are ignored.
pub fn walk_filtered<F>(
    config: &Configuration,
    project_root: &Path,
    walk_root: &Path,
    skip: &[PathBuf],
    mut visit: F,
) -> Result<()>
where
    F: FnMut(&WalkedEntry) -> Result<()>,
{
    let mut entries = WalkDir::new(walk_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = entries.next() {
        let entry = entry.map_err(io::Error::from)?;
        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            debug!(path = %entry.path().display(), "skipping symlink or special file");
            continue;
        };

        if entry.depth() > 0 && skip.iter().any(|skipped| skipped == entry.path()) {
            trace!(path = %entry.path().display(), "skipping build output");
            if kind == EntryKind::Dir {
                entries.skip_current_dir();
            }
            continue;
        }

        let relative = strip_root(entry.path(), project_root)?;
        let within = strip_root(entry.path(), walk_root)?;
        if entry.depth() > 0 && !filter::include(config, &relative)? {
            trace!(path = %relative.display(), "excluded by filter");
            if kind == EntryKind::Dir {
                entries.skip_current_dir();
            }
            continue;
        }

        visit(&WalkedEntry {
            path: entry.path().to_path_buf(),
            relative,
            within,
            kind,
        })?;
    }
    Ok(())
}

fn strip_root(path: &Path, root: &Path) -> io::Result<PathBuf> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is outside {}", path.display(), root.display()),
            )
        })
}

/// Archive member name: `/`-separated regardless of platform.
pub fn archive_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pxb_domain::{
        BuildKind, BuildSettings, DistLabel, ProjectMetadata, ToolOptions,
    };

    use super::*;

    fn config(root: &Path) -> Configuration {
        let metadata = ProjectMetadata {
            name: "demo".to_string(),
            version: "1.0".to_string(),
            ..ProjectMetadata::default()
        };
        Configuration {
            kind: BuildKind::Sdist,
            project_root: root.to_path_buf(),
            label: DistLabel::new("demo", "1.0").unwrap(),
            metadata,
            tool: ToolOptions::default(),
            settings: BuildSettings::default(),
            source_date_epoch: None,
        }
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    #[test]
    fn walks_in_name_order_and_prunes_rejected_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        touch(&root, "src/demo/core.py");
        touch(&root, "src/demo/__init__.py");
        touch(&root, ".git/config");
        touch(&root, "src/demo/__pycache__/core.pyc");
        touch(&root, "out/demo-1.0.tar.gz");

        let mut seen = Vec::new();
        walk_filtered(&config(&root), &root, &root, &[root.join("out")], |entry| {
            seen.push(archive_path(&entry.relative));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec!["", "src", "src/demo", "src/demo/__init__.py", "src/demo/core.py"]
        );
    }

    #[test]
    fn walk_root_is_visited_even_when_listed_in_skip() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        touch(&root, "src/demo/core.py");

        let mut seen = Vec::new();
        walk_filtered(&config(&root), &root, &root, &[root.clone()], |entry| {
            seen.push(archive_path(&entry.relative));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec!["", "src", "src/demo", "src/demo/core.py"]);
    }

    #[test]
    fn within_is_relative_to_the_walk_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        touch(&root, "src/demo/core.py");

        let mut files = Vec::new();
        walk_filtered(&config(&root), &root, &root.join("src"), &[], |entry| {
            if entry.kind == EntryKind::File {
                files.push((archive_path(&entry.within), archive_path(&entry.relative)));
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(
            files,
            vec![("demo/core.py".to_string(), "src/demo/core.py".to_string())]
        );
    }
}
