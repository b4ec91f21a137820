#![doc = r#"
Events found in an `MTrk` chunk

Every event shares the same framing:

```text
┌────────────┬────────┬──────────────────────┐
│ delta-time │ opcode │ type-specific payload│
│   (VLQ)    │ 1 byte │                      │
└────────────┴────────┴──────────────────────┘
```

The opcode picks one of a closed set of bodies, see [`EventKind`]:

| opcode        | body                   |
|---------------|------------------------|
| `FF`          | [`MetaEvent`]          |
| `80`..=`EF`   | [`ChannelVoiceEvent`]  |
| `F0`, `F7`    | [`SysExEvent`]         |

[`pop_event`] reads the delta-time and asks each body, in that order,
whether it recognizes what follows. A body that does not recognize the bytes
leaves the reader exactly where it found it.
"#]

mod channel;
pub use channel::*;

mod meta;
pub use meta::*;

mod sysex;
pub use sysex::*;

use alloc::vec::Vec;
use core::fmt;

use crate::{
    EncodeError, ParseError,
    reader::{ReadResult, Reader, ReaderError, ReaderErrorKind},
    vlq,
};

#[doc = r#"
The outcome of a speculative decode, see [`EventBody::try_decode`]
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognized<T> {
    /// The body was read and consumed.
    Match(T),
    /// The opcode does not belong to this body. Nothing was consumed.
    NoMatch,
    /// The opcode belongs to this body but what follows is broken.
    /// Nothing was consumed.
    Rejected(ReaderErrorKind),
}

impl<T> Recognized<T> {
    /// Runs `read`, rewinding the reader if it fails.
    pub fn attempt<F>(reader: &mut Reader<'_>, read: F) -> Self
    where
        F: FnOnce(&mut Reader<'_>) -> ReadResult<T>,
    {
        let mark = reader.mark();
        match read(reader) {
            Ok(value) => Self::Match(value),
            Err(e) => {
                reader.reset(mark);
                Self::Rejected(e.kind)
            }
        }
    }

    /// Maps the matched value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Recognized<U> {
        match self {
            Self::Match(v) => Recognized::Match(f(v)),
            Self::NoMatch => Recognized::NoMatch,
            Self::Rejected(kind) => Recognized::Rejected(kind),
        }
    }

    /// Drops the rejection reason
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Match(v) => Some(v),
            _ => None,
        }
    }
}

#[doc = r#"
The contract shared by every event body

A body is everything after the delta-time. [`Event`] adds the delta-time
framing on top.
"#]
pub trait EventBody: Sized + Clone + fmt::Display {
    /// The number of bytes [`EventBody::encode_body`] writes.
    fn body_length(&self) -> u32;

    /// Appends the body's bytes.
    fn encode_body(&self, out: &mut Vec<u8>) -> Result<(), EncodeError>;

    /// Decodes a body if the next byte is one of its opcodes.
    ///
    /// Implementations peek before consuming, and must leave the reader
    /// untouched unless they return [`Recognized::Match`].
    fn try_decode(reader: &mut Reader<'_>) -> Recognized<Self>;
}

#[doc = r#"
The closed set of event bodies
"#]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// `FF`
    Meta(MetaEvent),
    /// `80`-`EF`
    ChannelVoice(ChannelVoiceEvent),
    /// `F0` or `F7`
    SysEx(SysExEvent),
}

impl From<MetaEvent> for EventKind {
    fn from(value: MetaEvent) -> Self {
        Self::Meta(value)
    }
}

impl From<ChannelVoiceEvent> for EventKind {
    fn from(value: ChannelVoiceEvent) -> Self {
        Self::ChannelVoice(value)
    }
}

impl From<SysExEvent> for EventKind {
    fn from(value: SysExEvent) -> Self {
        Self::SysEx(value)
    }
}

impl EventBody for EventKind {
    fn body_length(&self) -> u32 {
        match self {
            Self::Meta(m) => m.body_length(),
            Self::ChannelVoice(c) => c.body_length(),
            Self::SysEx(s) => s.body_length(),
        }
    }

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self {
            Self::Meta(m) => m.encode_body(out),
            Self::ChannelVoice(c) => c.encode_body(out),
            Self::SysEx(s) => s.encode_body(out),
        }
    }

    /// Tries meta, then channel voice, then system exclusive.
    ///
    /// Returns the first match. Otherwise the first rejection is kept, since
    /// it names what was wrong with bytes that looked like a known opcode.
    fn try_decode(reader: &mut Reader<'_>) -> Recognized<Self> {
        let mut rejection = None;

        macro_rules! try_body {
            ($body:ty) => {
                match <$body>::try_decode(reader).map(EventKind::from) {
                    matched @ Recognized::Match(_) => return matched,
                    Recognized::Rejected(kind) => {
                        rejection.get_or_insert(kind);
                    }
                    Recognized::NoMatch => {}
                }
            };
        }

        try_body!(MetaEvent);
        try_body!(ChannelVoiceEvent);
        try_body!(SysExEvent);

        match rejection {
            Some(kind) => Recognized::Rejected(kind),
            None => Recognized::NoMatch,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meta(m) => m.fmt(f),
            Self::ChannelVoice(c) => c.fmt(f),
            Self::SysEx(s) => s.fmt(f),
        }
    }
}

#[doc = r#"
A delta-time and the body that follows it

# Example
```rust
# use smf_codec::prelude::*;
let event = Event::new(0, MetaEvent::text(MetaType::Text, "Hi").unwrap());
assert_eq!(event.to_bytes().unwrap(), [0x00, 0xFF, 0x01, 0x02, b'H', b'i']);
assert_eq!(event.length(), 6);
```
"#]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "vlq::deserialize_quantity"))]
    delta_time: u32,
    kind: EventKind,
}

impl Event {
    /// Creates an event from a delta-time known to fit in a quantity.
    ///
    /// # Panics
    /// if `delta_time` is greater than [`vlq::MAX`]. Untrusted values go
    /// through [`Event::try_new`], which reports the same case as an error.
    pub fn new(delta_time: u32, kind: impl Into<EventKind>) -> Self {
        match Self::try_new(delta_time, kind) {
            Ok(event) => event,
            Err(_) => panic!("Delta-time {delta_time} does not fit in a variable length quantity"),
        }
    }

    /// Create an event, checking that `delta_time` can be encoded.
    pub fn try_new(delta_time: u32, kind: impl Into<EventKind>) -> Result<Self, EncodeError> {
        let delta_time = vlq::check_range(delta_time as u64)?;
        Ok(Self {
            delta_time,
            kind: kind.into(),
        })
    }

    /// Reads one event, see [`pop_event`].
    pub fn decode(reader: &mut Reader<'_>) -> ReadResult<Self> {
        pop_event(reader)
    }

    /// Ticks since the previous event
    pub const fn delta_time(&self) -> u32 {
        self.delta_time
    }

    /// Set the ticks since the previous event
    pub fn set_delta_time(&mut self, delta_time: u32) -> Result<(), EncodeError> {
        self.delta_time = vlq::check_range(delta_time as u64)?;
        Ok(())
    }

    /// The body of the event
    pub const fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Mutable access to the body. Bodies keep their own lengths consistent.
    pub fn kind_mut(&mut self) -> &mut EventKind {
        &mut self.kind
    }

    /// Returns the body
    pub fn into_kind(self) -> EventKind {
        self.kind
    }

    /// Returns the meta body, if this is a meta event
    pub const fn as_meta(&self) -> Option<&MetaEvent> {
        match &self.kind {
            EventKind::Meta(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the channel voice body, if this is a channel voice event
    pub const fn as_channel_voice(&self) -> Option<&ChannelVoiceEvent> {
        match &self.kind {
            EventKind::ChannelVoice(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the system exclusive body, if this is a sysex event
    pub const fn as_sysex(&self) -> Option<&SysExEvent> {
        match &self.kind {
            EventKind::SysEx(s) => Some(s),
            _ => None,
        }
    }

    /// True for `FF 2F 00`
    pub fn is_end_of_track(&self) -> bool {
        self.as_meta()
            .is_some_and(|m| m.meta_type() == MetaType::EndOfTrack)
    }

    /// Total encoded size including the delta-time
    pub fn length(&self) -> u32 {
        vlq::length(self.delta_time) + self.kind.body_length()
    }

    /// Appends the delta-time and body to `out`, returning the bytes written.
    ///
    /// The event is assembled on its own first, so `out` is untouched
    /// on failure.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let bytes = self.to_bytes()?;
        out.extend_from_slice(&bytes);
        Ok(bytes.len())
    }

    /// Encodes the event into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut bytes = Vec::with_capacity(self.length() as usize);
        vlq::encode_into(self.delta_time, &mut bytes)?;
        self.kind.encode_body(&mut bytes)?;
        Ok(bytes)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{:<8} {}", self.delta_time, self.kind)
    }
}

#[doc = r#"
Reads the next event from the reader.

The delta-time is read first, then [`MetaEvent`], [`ChannelVoiceEvent`] and
[`SysExEvent`] are given the chance to recognize the opcode, in that order.

# Errors
Every error is reported at the offset where the event began, and the reader
is left at that offset so the caller can inspect the offending bytes.

- [`ParseError::MalformedVlq`] if the delta-time is broken
- the reason of the first body that claimed the opcode but rejected what
  followed, such as [`ParseError::InvalidMetaType`] or
  [`ReaderErrorKind::OutOfBounds`] for a body cut short
- [`ParseError::UnrecognizedEvent`] if no body claimed the opcode

# Example
```rust
# use smf_codec::prelude::*;
let mut reader = Reader::from_byte_slice(&[0x00, 0xFF, 0x99, 0x00]);
let err = pop_event(&mut reader).unwrap_err();

assert_eq!(
    err.error_kind(),
    &ReaderErrorKind::ParseError(ParseError::InvalidMetaType(0x99))
);
assert_eq!(reader.buffer_position(), 0);
```
"#]
pub fn pop_event(reader: &mut Reader<'_>) -> ReadResult<Event> {
    let mark = reader.mark();
    let start = mark.position();

    let (delta_time, _) = vlq::decode(reader)?;
    let opcode = reader.peek();

    let kind = match EventKind::try_decode(reader) {
        Recognized::Match(kind) => {
            return Ok(Event { delta_time, kind });
        }
        Recognized::Rejected(kind) => kind,
        Recognized::NoMatch => match opcode {
            Some(op) => ReaderErrorKind::ParseError(ParseError::UnrecognizedEvent(op)),
            None => ReaderErrorKind::OutOfBounds,
        },
    };

    reader.reset(mark);
    #[cfg(feature = "tracing")]
    tracing::debug!("No event could be read at {start}: {kind}");
    Err(ReaderError::new(start, kind))
}
