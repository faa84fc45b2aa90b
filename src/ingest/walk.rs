//! Recursive source tree enumeration.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory and file names treated as version-control metadata.
const VCS_NAMES: &[&str] = &[".svn", ".hg"];

/// Whether an entry name is version-control metadata (`.git*`, `.svn`, `.hg`).
pub fn is_vcs_metadata(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with(".git") || VCS_NAMES.contains(&name.as_ref())
}

/// Enumerate every regular file under `root`.
///
/// Version-control metadata is skipped, both as directories (not descended)
/// and as files. Entries are visited in file-name order, so the output is
/// stable for an unchanged tree. An entry that vanishes or becomes
/// unreadable while the walk is in progress is left out; it never fails
/// the walk. Symlinked directories are not followed.
pub fn walk_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_vcs_metadata(entry.file_name()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("skipping unreadable entry: {}", err);
                continue;
            }
        };

        if entry.depth() == 0 && entry.file_type().is_dir() {
            continue;
        }

        // Re-stat through symlinks: the entry may have disappeared since it was listed.
        match entry.path().metadata() {
            Ok(metadata) if metadata.is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => {
                log::debug!("skipping vanished entry {}: {}", entry.path().display(), err);
            }
        }
    }

    files
}
