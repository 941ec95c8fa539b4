//! The errors a decode or encode pass can end with.
use crate::SectionId;
use thiserror::Error;

/// What went wrong while reading a binary module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The magic number or version did not match.
    #[error("bad {field}: expected {expected:#010x}, found {found:#010x}")]
    BadHeader {
        /// Either `"magic"` or `"version"`.
        field: &'static str,
        /// The value a valid module carries.
        expected: u32,
        /// The value actually read.
        found: u32,
    },

    /// The input ended in the middle of a structure.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A LEB128 integer used more groups than its width allows, or its
    /// value does not fit that width.
    #[error("integer representation too long")]
    VarintTooLong,

    /// A LEB128 integer was not minimally encoded and the decoder was
    /// configured to reject that.
    #[error("integer representation is not canonical")]
    NonCanonicalVarint,

    /// A length-prefixed structure was not consumed exactly.
    #[error("length mismatch: declared {declared} bytes, consumed {consumed}")]
    SectionLengthMismatch {
        /// The declared length.
        declared: usize,
        /// How many bytes the contents actually needed.
        consumed: usize,
    },

    /// A known section appeared after one that must follow it, or twice.
    #[error("{id} section out of order (after {previous} section)")]
    SectionOutOfOrder {
        /// The offending section.
        id: SectionId,
        /// The last known section seen before it.
        previous: SectionId,
    },

    /// A discriminator byte had no meaning in its position.
    #[error("unknown {what} {tag:#04x}")]
    UnknownTag {
        /// The kind of tag, e.g. `"opcode"` or `"value type"`.
        what: &'static str,
        /// The value read.
        tag: u32,
    },

    /// A name was not valid UTF-8.
    #[error("malformed UTF-8 encoding")]
    InvalidUtf8,

    /// A decoder was asked to decode twice.
    #[error("decoder already consumed its input")]
    AlreadyConsumed,

    /// Control instructions did not nest properly.
    #[error("malformed nesting: {0}")]
    MalformedNesting(&'static str),

    /// A configured resource limit was exceeded.
    #[error("{what} exceed the limit of {limit}")]
    ImplementationLimit {
        /// What was being counted.
        what: &'static str,
        /// The configured limit.
        limit: usize,
    },

    /// A visitor aborted the pipeline.
    #[error("rejected by visitor: {0}")]
    Rejected(String),

    /// The underlying source failed.
    #[error("I/O error: {0}")]
    Io(String),
}

/// An [`ErrorKind`] together with the byte offset it was detected at.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct BinaryError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Absolute offset from the start of the module.
    pub offset: usize,
}

impl BinaryError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// What went wrong.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Where it went wrong.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// An error raised by a pipeline stage to abort the pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct VisitError {
    /// A human readable description.
    pub message: String,
}

impl VisitError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<BinaryError> for VisitError {
    fn from(original: BinaryError) -> Self {
        Self::new(original.to_string())
    }
}

/// A convenient alias for a `Result` that uses `BinaryError` as the error type.
pub type BinaryResult<T> = std::result::Result<T, BinaryError>;

/// The result type of every visitor event.
pub type VisitResult<T = ()> = std::result::Result<T, VisitError>;
