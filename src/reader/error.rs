use crate::ParseError;
use thiserror::Error;

#[doc = r#"
A failed read, tagged with the offset of the record that failed

Decoders reset the [`Reader`](super::Reader) before returning one of these,
so [`ReaderError::position`] is also where the reader is left.
"#]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Reading at Position {position}, {kind}")]
pub struct ReaderError {
    position: usize,
    pub(crate) kind: ReaderErrorKind,
}

/// Why a read failed
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReaderErrorKind {
    /// The bytes are present but do not form a valid record
    #[error("Parsing {0}")]
    ParseError(#[from] ParseError),
    /// The buffer ended before the record did
    #[error("Read out of bounds!")]
    OutOfBounds,
}

impl ReaderErrorKind {
    /// True if this kind is a [`ParseError::MalformedVlq`]
    pub const fn is_malformed_vlq(&self) -> bool {
        matches!(self, Self::ParseError(ParseError::MalformedVlq))
    }
}

impl ReaderError {
    /// Tag `kind` with the offset it happened at
    pub const fn new(position: usize, kind: ReaderErrorKind) -> Self {
        Self { position, kind }
    }

    /// True if the buffer ran out
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::OutOfBounds)
    }

    /// Why the read failed
    pub fn error_kind(&self) -> &ReaderErrorKind {
        &self.kind
    }

    /// Offset of the first byte of the failing record, delta-time included
    pub fn position(&self) -> usize {
        self.position
    }

    /// A [`ReaderErrorKind::ParseError`] at `position`
    pub const fn parse_error(position: usize, error: ParseError) -> Self {
        Self::new(position, ReaderErrorKind::ParseError(error))
    }

    /// A [`ReaderErrorKind::OutOfBounds`] at `position`
    pub const fn oob(position: usize) -> Self {
        Self::new(position, ReaderErrorKind::OutOfBounds)
    }
}

/// Result of reading from a [`Reader`](super::Reader)
pub type ReadResult<T> = Result<T, ReaderError>;
