/// Error types for the codec module
use thiserror::Error;

/// Errors that can occur while preparing codec input or output
///
/// Decoding itself never fails: malformed query segments and multipart parts
/// are tolerated. These errors cover the fallible edges around the codecs.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Boundary token rejected by validation
    #[error("Invalid multipart boundary: {0}")]
    InvalidBoundary(String),

    /// Content-Type header carries no `boundary=` parameter
    #[error("Missing boundary in Content-Type: {0}")]
    MissingBoundary(String),

    /// Content-Type header is not `multipart/form-data`
    #[error("Not a multipart/form-data content type: {0}")]
    NotMultipart(String),

    /// JSON input could not be turned into a parameter map
    #[error("Invalid parameter map: {0}")]
    InvalidMap(#[from] serde_json::Error),

    /// Unknown line ending name
    #[error("Unknown line ending: {0} (expected crlf or lf)")]
    UnknownLineEnding(String),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
