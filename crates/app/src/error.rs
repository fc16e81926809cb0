use thiserror::Error;

/// Structural parser failure. Malformed-but-tokenizable SQL is never an
/// error; this fires only when a grouping pass loses or duplicates source
/// text, which indicates an internal fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("parsed tree renders {rendered} characters for a {source_len} character source")]
    Coverage { source_len: usize, rendered: usize },
}

/// Failure of a single completion request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompleteError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("completion request cancelled")]
    Cancelled,
}
