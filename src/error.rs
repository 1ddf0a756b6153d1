
//! Error type used across the pixel engine and the compression dispatcher.

/// Specialized result type with the crate-wide error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that only signals success or failure.
pub type PassiveResult = Result<()>;

pub use std::io::Error as IoError;
pub use std::io::Result as IoResult;


/// All the ways an operation in this crate can fail.
/// Nothing is recovered internally; every failure surfaces at the API boundary.
#[derive(Debug)]
pub enum Error {

    /// A runtime pixel format id was outside the supported set.
    UnknownPixelFormat(u32),

    /// Bitmap-level conversion was called with differently sized source and target.
    MismatchedDimensions,

    /// The requested format pair has no defined conversion.
    /// Reserved for forward compatibility, the closed format set converts everywhere.
    UnsupportedConversion,

    /// A wrapped compression library failed or reported corrupted input.
    /// The message includes the library's own message when available.
    Compression(String),

    /// No compression algorithm with this id is registered.
    UnknownAlgorithm([u8; 8]),

    /// A caller-provided argument was unusable.
    InvalidArgument(String),

    /// An allocation inside a compression adapter failed.
    OutOfMemory,

    /// A collaborator stream failed.
    Io(IoError),
}


impl Error {
    pub(crate) fn compression(message: impl Into<String>) -> Self {
        Error::Compression(message.into())
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}


impl std::fmt::Display for Error {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownPixelFormat(id) =>
                write!(formatter, "unknown pixel format id {}", id),

            Error::MismatchedDimensions =>
                write!(formatter, "source and target bitmap dimensions differ"),

            Error::UnsupportedConversion =>
                write!(formatter, "no conversion is defined for this format pair"),

            Error::Compression(message) =>
                write!(formatter, "compression failed: {}", message),

            Error::UnknownAlgorithm(id) =>
                write!(formatter, "no compression algorithm with id {:?} is registered", id),

            Error::InvalidArgument(message) =>
                write!(formatter, "invalid argument: {}", message),

            Error::OutOfMemory =>
                write!(formatter, "a compression adapter ran out of memory"),

            Error::Io(error) =>
                write!(formatter, "stream failure: {}", error),
        }
    }
}

impl std::error::Error for Error {}

/// Enable using the `?` operator on io::Result
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        Error::Io(error)
    }
}
