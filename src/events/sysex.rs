use alloc::vec::Vec;
use core::fmt;

use super::{EventBody, Recognized};
use crate::{
    EncodeError, ParseError,
    reader::{ReadResult, Reader, ReaderError},
    vlq,
};

/// Which of the two system exclusive forms an event uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SysExKind {
    /// `F0 <len> <data>`, a message (or the first packet of one)
    Normal,
    /// `F7 <len> <data>`, a continuation packet or arbitrary bytes to send
    Escape,
}

impl SysExKind {
    /// The opcode
    pub const fn byte(&self) -> u8 {
        match self {
            Self::Normal => 0xF0,
            Self::Escape => 0xF7,
        }
    }

    const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0xF0 => Some(Self::Normal),
            0xF7 => Some(Self::Escape),
            _ => None,
        }
    }
}

#[doc = r#"
A system exclusive event as stored in a file: `F0|F7 <len> <data>`

The data is kept exactly as read. A complete message written with
[`SysExKind::Normal`] ends with its own `F7` inside `data`.
"#]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SysExEvent {
    kind: SysExKind,
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "vlq::deserialize_sized_bytes")
    )]
    data: Vec<u8>,
}

impl SysExEvent {
    /// Create a sysex event
    pub fn new(kind: SysExKind, data: impl Into<Vec<u8>>) -> Result<Self, EncodeError> {
        let data = data.into();
        vlq::check_range(data.len() as u64)?;
        Ok(Self { kind, data })
    }

    /// Normal or escape
    pub const fn kind(&self) -> SysExKind {
        self.kind
    }

    /// The bytes after the length
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the data
    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) -> Result<(), EncodeError> {
        let data = data.into();
        vlq::check_range(data.len() as u64)?;
        self.data = data;
        Ok(())
    }

    fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let position = reader.buffer_position();
        let opcode = reader.read_byte()?;
        let Some(kind) = SysExKind::from_byte(opcode) else {
            return Err(ReaderError::parse_error(
                position,
                ParseError::UnrecognizedEvent(opcode),
            ));
        };
        let (len, _) = vlq::decode(reader)?;
        let data = reader.read_slice(len as usize)?.to_vec();

        reader.clear_running_status();
        Ok(Self { kind, data })
    }
}

impl EventBody for SysExEvent {
    fn body_length(&self) -> u32 {
        let len = self.data.len() as u32;
        1 + vlq::length(len) + len
    }

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.push(self.kind.byte());
        vlq::encode_into(self.data.len() as u32, out)?;
        out.extend_from_slice(&self.data);
        Ok(())
    }

    fn try_decode(reader: &mut Reader<'_>) -> Recognized<Self> {
        if !matches!(reader.peek(), Some(0xF0 | 0xF7)) {
            return Recognized::NoMatch;
        }
        Recognized::attempt(reader, Self::read)
    }
}

impl fmt::Display for SysExEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            SysExKind::Normal => "SysEx",
            SysExKind::Escape => "SysExEscape",
        };
        write!(f, "{label} len={}", self.data.len())?;
        for byte in &self.data {
            write!(f, " {byte:02X}")?;
        }
        Ok(())
    }
}

#[test]
fn sysex_clears_running_status() {
    use pretty_assertions::assert_eq;
    let bytes = [0xF0, 0x03, 0x7E, 0x09, 0xF7, 0x40];
    let mut reader = Reader::from_byte_slice(&bytes);
    reader.set_running_status(0x90);

    let sysex = SysExEvent::try_decode(&mut reader).into_option().unwrap();
    assert_eq!(sysex.kind(), SysExKind::Normal);
    assert_eq!(sysex.data(), &[0x7E, 0x09, 0xF7]);
    assert_eq!(sysex.body_length(), 5);
    assert_eq!(reader.running_status(), None);
    assert_eq!(reader.buffer_position(), 5);
}
