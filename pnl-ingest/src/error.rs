use thiserror::Error;

use crate::types::SourceFormat;

/// File-level ingestion failures. Row-level problems are not errors at this
/// level; they travel as `RowError` entries on the successful `Statement`.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The detector could not classify the file. Terminal, never a guess.
    #[error("unrecognized statement format: {filename}")]
    UnrecognizedFormat { filename: String },

    /// The file passed coarse detection but its internal layout is not the
    /// expected statement layout.
    #[error("{format:?} layout mismatch: {reason}")]
    FormatMismatch {
        format: SourceFormat,
        reason: String,
    },

    /// The byte buffer is not valid UTF-8
    #[error("file is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),
}
