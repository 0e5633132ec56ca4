use std::fmt;

use thiserror::Error;

/// Specific kinds of failures that can occur while encoding values.
#[derive(Error, Debug)]
pub enum PackErrorKind {
    #[error(
        "{type_name} is not supported as a value type in codec version {version}. \
         Please make sure the peer supports a newer protocol version."
    )]
    TypeNotSupportedInThisVersion {
        type_name: &'static str,
        version: u32,
    },

    #[error("cannot write a raw {0} reference")]
    ReferenceNotSerializable(&'static str),

    #[error("failed to read entity contents: {0}")]
    EntityReadFailure(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("content of {0} items exceeds the maximum encodable size")]
    ContentTooLarge(usize),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type returned when encoding a value fails.
///
/// Bytes already emitted before the failure are not rolled back; the
/// enclosing message must be discarded by the session layer.
#[derive(Error, Debug)]
#[error("pack error: {kind}")]
pub struct PackError {
    kind: PackErrorKind,
}

impl PackError {
    pub(crate) fn new(kind: PackErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the specific kind of encode error that occurred.
    pub fn kind(&self) -> &PackErrorKind {
        &self.kind
    }
}

impl From<std::io::Error> for PackError {
    fn from(err: std::io::Error) -> Self {
        PackError::new(PackErrorKind::Io(err))
    }
}

/// Result type for encoding operations.
pub type PackResult<T> = Result<T, PackError>;

/// Specific kinds of failures that can occur while decoding values.
#[derive(Error, Debug)]
pub enum UnpackErrorKind {
    /// Unknown marker, truncated payload, declared size exceeding the
    /// remaining input, or a violated map/path invariant.
    #[error("{0}")]
    MalformedFormat(String),

    /// The signature byte does not belong to any known protocol version.
    #[error("struct types of 0x{signature:02X} are not recognized")]
    StructSignatureUnknown { signature: u8 },

    /// The signature is known, but only to a newer protocol version.
    #[error("{name} values cannot be unpacked with codec version {version}")]
    StructNotSupportedInThisVersion { name: &'static str, version: u32 },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type returned when decoding a value fails.
///
/// Carries the byte offset into the stream at which the failure was
/// detected, when the input adapter can report one.
#[derive(Debug)]
pub struct UnpackError {
    kind: UnpackErrorKind,
    offset: Option<usize>,
}

impl UnpackError {
    pub(crate) fn new(kind: UnpackErrorKind) -> Self {
        Self { kind, offset: None }
    }

    pub(crate) fn at(kind: UnpackErrorKind, offset: usize) -> Self {
        Self {
            kind,
            offset: Some(offset),
        }
    }

    /// Returns the specific kind of decode error that occurred.
    pub fn kind(&self) -> &UnpackErrorKind {
        &self.kind
    }

    /// Byte offset into the input at which decoding failed, if known.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl fmt::Display for UnpackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "unpack error at byte {offset}: {}", self.kind),
            None => write!(f, "unpack error: {}", self.kind),
        }
    }
}

impl std::error::Error for UnpackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            UnpackErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for UnpackError {
    fn from(err: std::io::Error) -> Self {
        UnpackError::new(UnpackErrorKind::Io(err))
    }
}

/// Result type for decoding operations.
pub type UnpackResult<T> = Result<T, UnpackError>;
