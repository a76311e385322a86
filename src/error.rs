use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between a page specification on the command
/// line and a scrubbed document on disk.
#[derive(Debug, Error)]
pub enum ScrubError {
    /// A token was neither a page number nor a `start-end` pair.
    #[error("Malformed page token `{token}` (expected a page number or `start-end`)")]
    MalformedToken { token: String },

    /// The specification contained no tokens at all.
    #[error("Empty page specification")]
    EmptySpec,

    /// Pages are numbered from 1; a `0` can never name a page.
    #[error("Page numbers start at 1 (offending token `{token}`)")]
    InvalidPageNumber { token: String },

    /// A range like `9-3` that runs backwards.
    #[error("Page range `{token}` runs backwards ({start} > {end})")]
    DescendingRange { token: String, start: u32, end: u32 },

    #[error("Failed to read PDF {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("Failed to write PDF {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rendered placeholder page could not be loaded back for grafting.
    #[error("Failed to assemble placeholder page: {0}")]
    Placeholder(String),
}
