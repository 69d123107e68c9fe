//! Shared utilities for the builder module.

use std::path::Path;

/// Link-library extensions, i.e. files a consumer names on its link line.
const LINK_EXTENSIONS: &[&str] = &["a", "so", "dylib", "lib"];

/// Extract the link name of a library file.
///
/// Handles both Unix and Windows library naming conventions:
/// - Strips "lib" prefix on Unix: `liblzma.a` → `lzma`
/// - Keeps Windows names as-is: `liblzma.lib` → `liblzma`
/// - Returns `None` for files that are not link libraries, including
///   versioned shared objects (`liblzma.so.5`) and DLLs
///
/// # Example
/// ```ignore
/// use std::path::Path;
/// assert_eq!(extract_lib_name(Path::new("liblzma.a")), Some("lzma".to_string()));
/// assert_eq!(extract_lib_name(Path::new("liblzma.lib")), Some("liblzma".to_string()));
/// ```
pub fn extract_lib_name(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !LINK_EXTENSIONS.contains(&ext) {
        return None;
    }

    let stem = path.file_stem()?.to_string_lossy();
    if ext == "lib" {
        return Some(stem.into_owned());
    }

    // Apple puts the version before the extension: `liblzma.5.dylib`.
    let stem = if ext == "dylib" {
        stem.split('.').next().unwrap_or_default().to_string()
    } else {
        stem.into_owned()
    };

    // Remove lib prefix if present
    let name = stem.strip_prefix("lib").unwrap_or(&stem);
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// Normalize the GNU triplet for a target, as passed to `--build`/`--host`.
pub fn gnu_triplet(os: &str, arch: &str) -> Option<String> {
    let cpu = match arch {
        "x86" => "i686",
        "x86_64" => "x86_64",
        _ => return None,
    };

    let system = match os.to_ascii_lowercase().as_str() {
        "linux" => "linux-gnu",
        "android" => "linux-android",
        "macos" => "apple-darwin",
        "freebsd" => "unknown-freebsd",
        _ => return None,
    };

    Some(format!("{}-{}", cpu, system))
}
