//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use walkdir::WalkDir;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Replace every occurrence of `from` with `to` in a text file.
///
/// Returns whether the file contained `from`. The file is only rewritten
/// when something changed.
pub fn replace_in_file(path: &Path, from: &str, to: &str) -> Result<bool> {
    let contents = read_to_string(path)?;
    if !contents.contains(from) {
        return Ok(false);
    }
    write_string(path, &contents.replace(from, to))?;
    Ok(true)
}

/// Find files under `base` whose file name matches a glob `pattern`.
///
/// The search is recursive. Returned paths are relative to `base`, sorted.
/// Symlinks are reported but not followed.
pub fn find_matching(base: &Path, pattern: &str) -> io::Result<Vec<PathBuf>> {
    let pattern = Pattern::new(pattern)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let mut results = Vec::new();
    for entry in WalkDir::new(base).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if pattern.matches(&name) {
            results.push(relative_path(base, entry.path()));
        }
    }

    results.sort();
    Ok(results)
}

/// Copy a single file, creating the destination's parent directory.
///
/// A symlink pointing at a sibling file (`liblzma.so -> liblzma.so.5`) is
/// recreated as a symlink on Unix; anything else is copied by content.
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Some(target) = sibling_link_target(src)? {
        if dst.symlink_metadata().is_ok() {
            fs::remove_file(dst)?;
        }
        return symlink(&target, dst);
    }

    fs::copy(src, dst).map(|_| ())
}

#[cfg(unix)]
fn sibling_link_target(path: &Path) -> io::Result<Option<PathBuf>> {
    if !path.symlink_metadata()?.file_type().is_symlink() {
        return Ok(None);
    }
    let target = fs::read_link(path)?;
    let is_sibling = target.components().count() == 1 && target.is_relative();
    Ok(is_sibling.then_some(target))
}

#[cfg(not(unix))]
fn sibling_link_target(_path: &Path) -> io::Result<Option<PathBuf>> {
    Ok(None)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Absolute form of `path` with `.` and `..` folded away and symlinks
/// resolved in the part that already exists.
///
/// Paths that do not exist yet still compare correctly against ones that do.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }

    let mut missing = Vec::new();
    let mut existing = cleaned.as_path();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    cleaned
}

/// Check if a path is inside (or equal to) another path.
pub fn is_inside(path: &Path, parent: &Path) -> bool {
    path.starts_with(parent)
}

/// Create a symlink (platform-aware).
#[cfg(unix)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}
