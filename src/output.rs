use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DocsError;

/// File stem for a page URL: the last `/` segment, cut at its first `.`.
///
/// `https://v2.ocaml.org/api/Array.html` -> `Array`. Returns `None` when
/// that leaves nothing, e.g. for a URL ending in `/`.
pub fn basename_from_url(url: &str) -> Option<&str> {
    let last = url.rsplit('/').next().unwrap_or(url);
    let stem = last.split('.').next().unwrap_or(last);
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Create `dir` if needed and write `<dir>/<basename>.md`, replacing any
/// existing file of that name.
pub fn write_markdown(dir: &Path, basename: &str, markdown: &str) -> Result<PathBuf, DocsError> {
    fs::create_dir_all(dir).map_err(|source| DocsError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(format!("{basename}.md"));
    fs::write(&path, markdown).map_err(|source| DocsError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
