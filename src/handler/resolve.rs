//! Request path resolution module
//!
//! Maps a request path to a file inside the root directory. The boundary check
//! runs on the canonical path, after every symlink has been resolved, so a
//! link inside the root cannot expose anything outside it.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

use crate::error::FileError;
use crate::http::mime;
use crate::logger;

/// A file the server may send
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    /// Canonical path, always strictly below the root. For a symlink this is
    /// the link target.
    pub path: PathBuf,
    pub len: u64,
    /// Guessed from the requested name (or index file name), not from `path`:
    /// a link `page.html -> page.v2` is served as HTML.
    pub content_type: &'static str,
    pub modified: Option<SystemTime>,
}

/// Decoded request path with `.` and `..` collapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    /// Path relative to the root; empty for the root itself
    pub relative: PathBuf,
    /// The request names a directory (root or trailing slash)
    pub directory: bool,
}

/// Percent-decode and lexically normalize a request path
///
/// Invalid encodings, non UTF-8 results and NUL bytes are `NotFound`.
/// A `..` that would climb above the root is `Forbidden`.
pub fn normalize(request_path: &str) -> Result<NormalizedPath, FileError> {
    let decoded = percent_decode_str(request_path)
        .decode_utf8()
        .map_err(|_| FileError::NotFound)?;
    if decoded.contains('\0') {
        return Err(FileError::NotFound);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(FileError::Forbidden);
                }
            }
            s if cfg!(windows) && s.contains(['\\', ':']) => return Err(FileError::NotFound),
            s => segments.push(s),
        }
    }

    Ok(NormalizedPath {
        directory: segments.is_empty() || decoded.ends_with('/'),
        relative: segments.iter().collect(),
    })
}

/// Resolve `request_path` to a readable regular file under `root`
///
/// `root` must already be canonical. Directories are served through the
/// first existing entry of `index_files`; a directory without one is
/// `NotFound`, never a listing.
pub async fn resolve(
    root: &Path,
    request_path: &str,
    index_files: &[String],
) -> Result<ResolvedFile, FileError> {
    let normalized = match normalize(request_path) {
        Ok(n) => n,
        Err(FileError::Forbidden) => {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {request_path} climbs above the root"
            ));
            return Err(FileError::Forbidden);
        }
        Err(e) => return Err(e),
    };

    let mut candidate = root.join(&normalized.relative);
    let is_dir =
        normalized.directory || fs::metadata(&candidate).await.is_ok_and(|m| m.is_dir());
    if is_dir {
        candidate = find_index(&candidate, index_files)
            .await
            .ok_or(FileError::NotFound)?;
    }

    // Missing components, loops and over-long names all read as "not there"
    let canonical = fs::canonicalize(&candidate)
        .await
        .map_err(|_| FileError::NotFound)?;
    if canonical == root || !canonical.starts_with(root) {
        logger::log_traversal_blocked(request_path, &canonical);
        return Err(FileError::Forbidden);
    }

    let metadata = fs::metadata(&canonical).await.map_err(FileError::from_io)?;
    if !metadata.is_file() {
        return Err(FileError::NotFound);
    }

    Ok(ResolvedFile {
        content_type: mime::content_type_for(&candidate),
        path: canonical,
        len: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

/// First index file in `dir` that is a regular file
async fn find_index(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for name in index_files {
        let path = dir.join(name);
        if fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            return Some(path);
        }
    }
    None
}
