use thiserror::Error;

#[doc = r#"
The ways a byte stream can fail to be an SMF event stream
"#]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A variable length quantity ran past four bytes, ran into the end of
    /// the stream, or was overlong while the reader is strict.
    #[error("Malformed variable length quantity")]
    MalformedVlq,
    /// The byte after `0xFF` is not a known meta event type.
    #[error("Invalid meta event type {0:#04X}")]
    InvalidMetaType(u8),
    /// No event recognizer accepted the opcode.
    #[error("Unrecognized event opcode {0:#04X}")]
    UnrecognizedEvent(u8),
    /// The stream ended before the track's declared length was consumed.
    #[error("Track truncated: declared {declared} bytes, stream ended after {consumed}")]
    TruncatedTrack {
        /// Bytes the chunk header declared
        declared: u32,
        /// Bytes consumed before the stream ran out
        consumed: u32,
    },
    /// An event ran past the track's declared length.
    #[error("Track length mismatch: declared {declared} bytes, event ends at {consumed}")]
    TrackLengthMismatch {
        /// Bytes the chunk header declared
        declared: u32,
        /// Where the overrunning event would have ended
        consumed: u32,
    },
    /// A chunk was expected to be tagged `MTrk`.
    #[error("Invalid chunk identifier {0:?}")]
    InvalidChunkId([u8; 4]),
    /// A data byte had its high bit set.
    #[error("Invalid data byte {0:#04X}, leading bit must be 0")]
    InvalidDataByte(u8),
    /// Channels are 0-15.
    #[error("Invalid channel {0}")]
    InvalidChannel(u8),
}

#[doc = r#"
Errors produced while turning events into bytes
"#]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The value does not fit in a four byte variable length quantity (28 bits).
    #[error("Value {0} is out of the variable length quantity range")]
    ValueOutOfRange(u64),
}
