use alloc::{borrow::Cow, string::String, vec::Vec};
use core::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::{EventBody, Recognized};
use crate::{
    EncodeError, ParseError,
    reader::{ReadResult, Reader, ReaderError},
    vlq,
};

const META_MARKER: u8 = 0xFF;

#[doc = r#"
The meta event types this codec knows about.

A meta event whose type byte is not listed here is not recognized.

```text
FF 00 02 ssss      Sequence Number
FF 01 len text     Text
FF 02 len text     Copyright
FF 03 len text     Track Name
FF 04 len text     Instrument Name
FF 05 len text     Lyric
FF 06 len text     Marker
FF 07 len text     Cue Point
FF 20 01 cc        Channel Prefix
FF 2F 00           End of Track
FF 51 03 tttttt    Set Tempo
FF 54 05 hr mn se fr ff   SMPTE Offset
FF 58 04 nn dd cc bb      Time Signature
FF 59 02 sf mi     Key Signature
FF 7F len data     Sequencer Specific
```

Only the type byte is checked. Payloads are kept as raw bytes, so a
tempo event with four bytes of payload round-trips just as it was read.
"#]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[num_enum(error_type(name = ParseError, constructor = ParseError::InvalidMetaType))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MetaType {
    /// `0x00`
    SequenceNumber = 0x00,
    /// `0x01`
    Text = 0x01,
    /// `0x02`
    Copyright = 0x02,
    /// `0x03`
    TrackName = 0x03,
    /// `0x04`
    InstrumentName = 0x04,
    /// `0x05`
    Lyric = 0x05,
    /// `0x06`
    Marker = 0x06,
    /// `0x07`
    CuePoint = 0x07,
    /// `0x20`
    ChannelPrefix = 0x20,
    /// `0x2F`
    EndOfTrack = 0x2F,
    /// `0x51`
    Tempo = 0x51,
    /// `0x54`
    SmpteOffset = 0x54,
    /// `0x58`
    TimeSignature = 0x58,
    /// `0x59`
    KeySignature = 0x59,
    /// `0x7F`
    SequencerSpecific = 0x7F,
}

impl MetaType {
    /// The type byte
    pub fn byte(self) -> u8 {
        self.into()
    }

    /// True for the types `0x01`-`0x07`, whose payload is text
    pub const fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Copyright
                | Self::TrackName
                | Self::InstrumentName
                | Self::Lyric
                | Self::Marker
                | Self::CuePoint
        )
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::SequenceNumber => "SEQUENCE_NUMBER",
            Self::Text => "TEXT",
            Self::Copyright => "COPYRIGHT",
            Self::TrackName => "NAME_TRACK",
            Self::InstrumentName => "NAME_INSTRUMENT",
            Self::Lyric => "TEXT_LYRIC",
            Self::Marker => "TEXT_MARKER",
            Self::CuePoint => "CUE",
            Self::ChannelPrefix => "CHANNEL_PREFIX_ASSIGNMENT",
            Self::EndOfTrack => "EOT",
            Self::Tempo => "TEMPO",
            Self::SmpteOffset => "SMPTE_OFFSET",
            Self::TimeSignature => "SIGNATURE_TIME",
            Self::KeySignature => "SIGNATURE_KEY",
            Self::SequencerSpecific => "SPECIFIC",
        }
    }
}

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[doc = r#"
A meta event: `FF <type> <len> <payload>`

The length written on the wire is always derived from the payload, so the
two can never disagree.

# Example
```rust
# use smf_codec::prelude::*;
let mut name = MetaEvent::new(MetaType::TrackName);
assert_eq!(name.body_length(), 3);

name.set_payload(b"Piano".to_vec()).unwrap();
assert_eq!(name.body_length(), 8);
assert_eq!(name.as_text().unwrap(), "Piano");
```
"#]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetaEvent {
    meta_type: MetaType,
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "vlq::deserialize_sized_bytes")
    )]
    payload: Vec<u8>,
}

impl MetaEvent {
    /// A meta event with an empty payload
    pub const fn new(meta_type: MetaType) -> Self {
        Self {
            meta_type,
            payload: Vec::new(),
        }
    }

    /// A meta event with an empty payload from a raw type byte
    ///
    /// # Errors
    /// [`ParseError::InvalidMetaType`] if the byte is not a [`MetaType`]
    pub fn from_type_byte(byte: u8) -> Result<Self, ParseError> {
        MetaType::try_from(byte).map(Self::new)
    }

    /// A meta event carrying `payload`
    pub fn with_payload(
        meta_type: MetaType,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Self, EncodeError> {
        let mut event = Self::new(meta_type);
        event.set_payload(payload)?;
        Ok(event)
    }

    /// `FF 2F 00`
    pub const fn end_of_track() -> Self {
        Self::new(MetaType::EndOfTrack)
    }

    /// A meta event carrying `text` as its payload
    pub fn text(meta_type: MetaType, text: &str) -> Result<Self, EncodeError> {
        Self::with_payload(meta_type, text.as_bytes())
    }

    /// The type of this meta event
    pub const fn meta_type(&self) -> MetaType {
        self.meta_type
    }

    /// Change the type, keeping the payload
    pub fn set_meta_type(&mut self, meta_type: MetaType) {
        self.meta_type = meta_type;
    }

    /// The raw payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The payload length written after the type byte
    pub fn payload_len(&self) -> u32 {
        self.payload.len() as u32
    }

    /// Replace the payload
    ///
    /// # Errors
    /// [`EncodeError::ValueOutOfRange`] if the payload is longer than [`vlq::MAX`].
    /// The old payload is kept.
    pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) -> Result<(), EncodeError> {
        let payload = payload.into();
        vlq::check_range(payload.len() as u64)?;
        self.payload = payload;
        Ok(())
    }

    /// Append to the payload
    pub fn push_payload(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        vlq::check_range(self.payload.len() as u64 + bytes.len() as u64)?;
        self.payload.extend_from_slice(bytes);
        Ok(())
    }

    /// Empty the payload
    pub fn clear_payload(&mut self) {
        self.payload.clear();
    }

    /// Returns the payload
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// The payload as text, for the text types (`0x01`-`0x07`).
    ///
    /// Invalid UTF-8 is replaced, see [`String::from_utf8_lossy`].
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        if !self.meta_type.is_text() {
            return None;
        }
        Some(String::from_utf8_lossy(&self.payload))
    }

    /// Reads the event. The reader is positioned on the `FF` marker.
    fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        reader.read_byte()?;

        let type_position = reader.buffer_position();
        let meta_type = MetaType::try_from(reader.read_byte()?)
            .map_err(|e| ReaderError::parse_error(type_position, e))?;

        let (len, _) = vlq::decode(reader)?;
        let payload = reader.read_slice(len as usize)?.to_vec();

        reader.clear_running_status();
        Ok(Self { meta_type, payload })
    }
}

impl EventBody for MetaEvent {
    /// Marker, type byte, length quantity and payload
    fn body_length(&self) -> u32 {
        let len = self.payload_len();
        2 + vlq::length(len) + len
    }

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.push(META_MARKER);
        out.push(self.meta_type.byte());
        vlq::encode_into(self.payload_len(), out)?;
        out.extend_from_slice(&self.payload);
        Ok(())
    }

    fn try_decode(reader: &mut Reader<'_>) -> Recognized<Self> {
        if reader.peek() != Some(META_MARKER) {
            return Recognized::NoMatch;
        }
        Recognized::attempt(reader, Self::read)
    }
}

impl fmt::Display for MetaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Meta({}) len={}", self.meta_type, self.payload.len())?;
        if let Some(text) = self.as_text() {
            return write!(f, " {text:?}");
        }
        for byte in &self.payload {
            write!(f, " {byte:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReaderErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_type_byte() {
        assert_eq!(
            MetaEvent::from_type_byte(0x99),
            Err(ParseError::InvalidMetaType(0x99))
        );
        assert_eq!(
            MetaEvent::from_type_byte(0x51).unwrap().meta_type(),
            MetaType::Tempo
        );
    }

    #[test]
    fn every_listed_type_converts_back() {
        for byte in 0..=u8::MAX {
            if let Ok(meta_type) = MetaType::try_from(byte) {
                assert_eq!(meta_type.byte(), byte);
            }
        }
        assert!(MetaType::try_from(0x08).is_err());
        assert!(MetaType::try_from(0x21).is_err());
    }

    #[test]
    fn length_grows_by_two_at_128() {
        let mut meta = MetaEvent::with_payload(MetaType::Text, [b'a'; 127]).unwrap();
        assert_eq!(meta.body_length(), 2 + 1 + 127);
        meta.push_payload(b"a").unwrap();
        assert_eq!(meta.body_length(), 2 + 2 + 128);

        let mut out = Vec::new();
        meta.encode_body(&mut out).unwrap();
        assert_eq!(out.len() as u32, meta.body_length());
        assert_eq!(&out[..4], &[0xFF, 0x01, 0x81, 0x00]);
    }

    #[test]
    fn non_meta_opcode_is_not_consumed() {
        let mut reader = Reader::from_byte_slice(&[0x90, 0x40, 0x40]);
        assert_eq!(MetaEvent::try_decode(&mut reader), Recognized::NoMatch);
        assert_eq!(reader.buffer_position(), 0);
    }

    #[test]
    fn truncated_payload_rolls_back() {
        let mut reader = Reader::from_byte_slice(&[0xFF, 0x03, 0x05, b'a', b'b']);
        assert_eq!(
            MetaEvent::try_decode(&mut reader),
            Recognized::Rejected(ReaderErrorKind::OutOfBounds)
        );
        assert_eq!(reader.buffer_position(), 0);
    }

    #[test]
    fn decode_keeps_raw_tempo_payload() {
        let mut reader = Reader::from_byte_slice(&[0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
        let Recognized::Match(tempo) = MetaEvent::try_decode(&mut reader) else {
            panic!("tempo should decode");
        };
        assert_eq!(tempo.meta_type(), MetaType::Tempo);
        assert_eq!(tempo.payload(), &[0x07, 0xA1, 0x20]);
        assert_eq!(reader.buffer_position(), 6);
    }

    #[test]
    fn display() {
        use alloc::string::ToString;
        let text = MetaEvent::text(MetaType::Marker, "Verse").unwrap();
        assert_eq!(text.to_string(), "Meta(TEXT_MARKER) len=5 \"Verse\"");
        let tempo = MetaEvent::with_payload(MetaType::Tempo, [0x07, 0xA1, 0x20]).unwrap();
        assert_eq!(tempo.to_string(), "Meta(TEMPO) len=3 07 A1 20");
    }
}
