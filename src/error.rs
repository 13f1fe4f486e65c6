//! Error types for parsing and allocation.

use std::fmt;

/// Category of a [`QueryError`], one per documented result code.
///
/// `InvalidHex`, `InvalidFormat` and `Internal` are part of the public
/// surface but never produced: invalid escapes degrade to literal text.
/// `NullInput` has no producer either, references cannot be null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NullInput,
    EmptyString,
    InvalidHex,
    BufferTooSmall,
    Memory,
    TooManyPairs,
    InvalidFormat,
    Internal,
}

impl ErrorKind {
    /// Human-readable description of the error kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::NullInput => "Null input",
            ErrorKind::EmptyString => "Empty string",
            ErrorKind::InvalidHex => "Invalid hex encoding",
            ErrorKind::BufferTooSmall => "Buffer too small",
            ErrorKind::Memory => "Memory allocation error",
            ErrorKind::TooManyPairs => "Too many key-value pairs",
            ErrorKind::InvalidFormat => "Invalid query format",
            ErrorKind::Internal => "Internal error",
        }
    }

    /// Stable snake_case label, used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::NullInput => "null_input",
            ErrorKind::EmptyString => "empty_string",
            ErrorKind::InvalidHex => "invalid_hex",
            ErrorKind::BufferTooSmall => "buffer_too_small",
            ErrorKind::Memory => "memory_error",
            ErrorKind::TooManyPairs => "too_many_pairs",
            ErrorKind::InvalidFormat => "invalid_format",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// An allocator could not provide the requested bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    /// Number of bytes requested.
    pub requested: usize,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to allocate {} bytes", self.requested)
    }
}

impl std::error::Error for AllocError {}

/// Errors reported by table operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A required input was missing.
    NullInput,

    /// The query string was empty.
    EmptyString,

    /// A percent escape was malformed.
    InvalidHex { offset: usize },

    /// A caller-provided buffer cannot hold the output.
    BufferTooSmall { needed: usize, capacity: usize },

    /// An allocation failed.
    Memory(AllocError),

    /// More pairs than the table capacity (strict mode only).
    TooManyPairs { limit: u16 },

    /// The query string was structurally invalid.
    InvalidFormat(String),

    /// Invariant violation inside the library.
    Internal(String),
}

impl QueryError {
    /// Result code category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::NullInput => ErrorKind::NullInput,
            QueryError::EmptyString => ErrorKind::EmptyString,
            QueryError::InvalidHex { .. } => ErrorKind::InvalidHex,
            QueryError::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            QueryError::Memory(_) => ErrorKind::Memory,
            QueryError::TooManyPairs { .. } => ErrorKind::TooManyPairs,
            QueryError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            QueryError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a capacity overflow in strict mode.
    pub fn is_too_many_pairs(&self) -> bool {
        matches!(self, QueryError::TooManyPairs { .. })
    }

    /// Check if this is an allocation failure.
    pub fn is_memory(&self) -> bool {
        matches!(self, QueryError::Memory(_))
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::NullInput => write!(f, "null input"),
            QueryError::EmptyString => write!(f, "empty query string"),
            QueryError::InvalidHex { offset } => {
                write!(f, "invalid hex encoding at offset {}", offset)
            }
            QueryError::BufferTooSmall { needed, capacity } => {
                write!(
                    f,
                    "buffer too small: {} bytes needed, {} available",
                    needed, capacity
                )
            }
            QueryError::Memory(e) => write!(f, "memory error: {}", e),
            QueryError::TooManyPairs { limit } => {
                write!(f, "too many key-value pairs (limit {})", limit)
            }
            QueryError::InvalidFormat(msg) => write!(f, "invalid query format: {}", msg),
            QueryError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Memory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AllocError> for QueryError {
    fn from(e: AllocError) -> Self {
        QueryError::Memory(e)
    }
}

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, QueryError>;
