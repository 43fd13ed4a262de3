use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DocsError;

pub const DEFAULT_MERGED_NAME: &str = "concat.md";

pub struct ConcatReport {
    pub path: PathBuf,
    pub entries: usize,
    pub bytes: usize,
}

/// Merge every entry of `dir`, in listing order and without separators,
/// into `<dir>/<merged_name>`.
///
/// A merged file left by a previous run is listed like any other entry and
/// folded into the new merge unless `exclude_merged` is set. Every entry
/// must be readable as UTF-8 text; otherwise nothing is written.
pub fn concat_dir(
    dir: &Path,
    merged_name: &str,
    exclude_merged: bool,
) -> Result<ConcatReport, DocsError> {
    let list_err = |source: std::io::Error| DocsError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut merged = String::new();
    let mut entries = 0usize;

    for entry in fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        if exclude_merged && entry.file_name() == merged_name {
            debug!(name = merged_name, "skipping previous merge");
            continue;
        }

        let path = entry.path();
        let text = fs::read_to_string(&path)
            .map_err(|source| DocsError::Unreadable { path: path.clone(), source })?;
        merged.push_str(&text);
        entries += 1;
    }

    let path = dir.join(merged_name);
    fs::write(&path, &merged).map_err(|source| DocsError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(ConcatReport {
        path,
        entries,
        bytes: merged.len(),
    })
}
