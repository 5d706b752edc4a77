//! Filesystem primitives used to materialize templates on disk.
//!
//! Copies are recursive, overwrite existing files, and skip every source
//! path listed in an ignore list (ignored directories are not descended
//! into). The `.git` folder of a target directory is never touched by
//! [`empty_dir`] and does not count against [`is_empty`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// VCS metadata folder tolerated in an otherwise empty target directory.
const VCS_DIR: &str = ".git";

/// Whether `dir` has no entries, or only a `.git` folder.
pub fn is_empty(dir: &Path) -> Result<bool> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name());
        if names.len() > 1 {
            return Ok(false);
        }
    }
    Ok(names.is_empty() || names[0] == VCS_DIR)
}

/// Remove everything inside `dir` except a `.git` folder.
///
/// Missing directories are left alone.
pub fn empty_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == VCS_DIR {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Recursively copy the contents of `src` into `dest`.
///
/// `ignore` holds source paths (files or directories) to skip.
pub fn copy_dir(src: &Path, dest: &Path, ignore: &[PathBuf]) -> Result<()> {
    fs::create_dir_all(dest)?;

    let walker = WalkDir::new(src)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry.path(), ignore));

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::Filesystem {
                message: format!("'{}' is outside '{}': {}", entry.path().display(), src.display(), e),
            })?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copy a single file or directory from `src` to `dest`.
///
/// Does nothing when `src` itself is in the ignore list.
pub fn copy_entry(src: &Path, dest: &Path, ignore: &[PathBuf]) -> Result<()> {
    if is_ignored(src, ignore) {
        debug!("Skipping ignored path {}", src.display());
        return Ok(());
    }
    if fs::metadata(src)?.is_dir() {
        copy_dir(src, dest, ignore)
    } else {
        copy_file(src, dest)
    }
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest).map_err(|e| Error::Filesystem {
        message: format!("Failed to copy '{}' to '{}': {}", src.display(), dest.display(), e),
    })?;
    Ok(())
}

fn is_ignored(path: &Path, ignore: &[PathBuf]) -> bool {
    ignore.iter().any(|ignored| ignored == path)
}

/// Rewrite a UTF-8 file in place through `edit`.
pub fn edit_file<F>(path: &Path, edit: F) -> Result<()>
where
    F: FnOnce(String) -> String,
{
    let content = fs::read_to_string(path)?;
    fs::write(path, edit(content))?;
    Ok(())
}

/// Remove a temporary directory, logging instead of failing.
pub fn remove_dir_best_effort(dir: &Path) {
    if !dir.exists() {
        return;
    }
    if let Err(e) = fs::remove_dir_all(dir) {
        warn!("Failed to remove temporary directory {}: {}", dir.display(), e);
    }
}
