use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::DocsError;

/// Lazy reader over a newline-delimited URL list.
///
/// Yields each non-empty line with surrounding whitespace trimmed. No URL
/// validation happens here.
pub struct Links {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

/// Open the link list. Fails immediately if the file is missing.
pub fn read_links(path: &Path) -> Result<Links, DocsError> {
    let file = File::open(path).map_err(|source| DocsError::Links {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Links {
        path: path.to_path_buf(),
        lines: BufReader::new(file).lines(),
    })
}

impl Iterator for Links {
    type Item = Result<String, DocsError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    let url = line.trim();
                    if !url.is_empty() {
                        return Some(Ok(url.to_string()));
                    }
                }
                Err(source) => {
                    return Some(Err(DocsError::Links {
                        path: self.path.clone(),
                        source,
                    }))
                }
            }
        }
    }
}
