use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the fetch and concat stages.
///
/// Non-200 responses and pages without a header marker are not errors;
/// the fetch stage counts and skips them.
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("failed to read link list {}", path.display())]
    Links {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid header marker selector {selector:?}: {reason}")]
    Marker { selector: String, reason: String },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list {}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} cannot be read as text", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
