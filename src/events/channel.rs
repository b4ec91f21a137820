#![doc = r#"
Channel voice messages

```text
status   data
1000nnnn 0kkkkkkk 0vvvvvvv   Note Off
1001nnnn 0kkkkkkk 0vvvvvvv   Note On
1010nnnn 0kkkkkkk 0vvvvvvv   Polyphonic Aftertouch
1011nnnn 0ccccccc 0vvvvvvv   Control Change
1100nnnn 0ppppppp            Program Change
1101nnnn 0vvvvvvv            Channel Aftertouch
1110nnnn 0lllllll 0mmmmmmm   Pitch Bend
```

`nnnn` is the channel. In a file, a status byte identical to the previous
channel status may be left out ("running status").
"#]

use alloc::vec::Vec;
use core::fmt;

use super::{EventBody, Recognized};
use crate::{
    DataByte, EncodeError, ParseError,
    reader::{ReadResult, Reader, ReaderError},
};

#[doc = r#"
The seven channel voice messages, without their channel
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VoiceMessage {
    /// `8n`
    NoteOff {
        /// The key released
        key: DataByte,
        /// Release velocity
        velocity: DataByte,
    },
    /// `9n`. A velocity of 0 is kept as a note on.
    NoteOn {
        /// The key pressed
        key: DataByte,
        /// Attack velocity
        velocity: DataByte,
    },
    /// `An`
    PolyphonicAftertouch {
        /// The key under pressure
        key: DataByte,
        /// Pressure amount
        pressure: DataByte,
    },
    /// `Bn`
    ControlChange {
        /// Controller number
        controller: DataByte,
        /// New value
        value: DataByte,
    },
    /// `Cn`
    ProgramChange {
        /// Program number
        program: DataByte,
    },
    /// `Dn`
    ChannelAftertouch {
        /// Pressure amount
        pressure: DataByte,
    },
    /// `En`. Least significant 7 bits come first on the wire.
    PitchBend {
        /// Low 7 bits
        lsb: DataByte,
        /// High 7 bits
        msb: DataByte,
    },
}

impl VoiceMessage {
    /// The upper nibble of the status byte
    pub const fn status_nibble(&self) -> u8 {
        match self {
            Self::NoteOff { .. } => 0x80,
            Self::NoteOn { .. } => 0x90,
            Self::PolyphonicAftertouch { .. } => 0xA0,
            Self::ControlChange { .. } => 0xB0,
            Self::ProgramChange { .. } => 0xC0,
            Self::ChannelAftertouch { .. } => 0xD0,
            Self::PitchBend { .. } => 0xE0,
        }
    }

    /// Number of data bytes after the status
    pub const fn data_len(&self) -> u32 {
        match self {
            Self::ProgramChange { .. } | Self::ChannelAftertouch { .. } => 1,
            _ => 2,
        }
    }

    /// A pitch bend from a 14-bit value, `0x2000` being centered
    pub const fn pitch_bend(value: u16) -> Self {
        Self::PitchBend {
            lsb: DataByte::new_unchecked(value as u8),
            msb: DataByte::new_unchecked((value >> 7) as u8),
        }
    }

    fn push_data(&self, out: &mut Vec<u8>) {
        match *self {
            Self::NoteOff { key, velocity } | Self::NoteOn { key, velocity } => {
                out.extend_from_slice(&[key.0, velocity.0]);
            }
            Self::PolyphonicAftertouch { key, pressure } => {
                out.extend_from_slice(&[key.0, pressure.0]);
            }
            Self::ControlChange { controller, value } => {
                out.extend_from_slice(&[controller.0, value.0]);
            }
            Self::ProgramChange { program } => out.push(program.0),
            Self::ChannelAftertouch { pressure } => out.push(pressure.0),
            Self::PitchBend { lsb, msb } => out.extend_from_slice(&[lsb.0, msb.0]),
        }
    }
}

#[doc = r#"
A channel voice message on one of the 16 channels

# Example
```rust
# use smf_codec::prelude::*;
let on = ChannelVoiceEvent::note_on(3, 60, 100).unwrap();
assert_eq!(Event::new(0, on).to_bytes().unwrap(), [0x00, 0x93, 60, 100]);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelVoiceEvent {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_channel"))]
    channel: u8,
    message: VoiceMessage,
}

#[cfg(feature = "serde")]
fn deserialize_channel<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let channel = <u8 as serde::Deserialize>::deserialize(deserializer)?;
    if channel > 0x0F {
        return Err(serde::de::Error::custom(ParseError::InvalidChannel(channel)));
    }
    Ok(channel)
}

impl ChannelVoiceEvent {
    /// Create a message for `channel` (0-15).
    pub const fn new(channel: u8, message: VoiceMessage) -> Result<Self, ParseError> {
        if channel > 0x0F {
            return Err(ParseError::InvalidChannel(channel));
        }
        Ok(Self { channel, message })
    }

    /// Note on for a key and velocity, both 0-127
    pub fn note_on(channel: u8, key: u8, velocity: u8) -> Result<Self, ParseError> {
        Self::new(
            channel,
            VoiceMessage::NoteOn {
                key: DataByte::new(key)?,
                velocity: DataByte::new(velocity)?,
            },
        )
    }

    /// Note off for a key and velocity, both 0-127
    pub fn note_off(channel: u8, key: u8, velocity: u8) -> Result<Self, ParseError> {
        Self::new(
            channel,
            VoiceMessage::NoteOff {
                key: DataByte::new(key)?,
                velocity: DataByte::new(velocity)?,
            },
        )
    }

    /// The channel, 0-15
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// The message
    pub const fn message(&self) -> &VoiceMessage {
        &self.message
    }

    /// Replace the message, keeping the channel
    pub fn set_message(&mut self, message: VoiceMessage) {
        self.message = message;
    }

    /// The status byte written on the wire
    pub const fn status(&self) -> u8 {
        self.message.status_nibble() | self.channel
    }

    /// Reads the message. The reader is positioned on a status byte, or on
    /// a data byte while running status is in effect.
    fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let status = match reader.peek() {
            Some(byte @ 0x80..=0xEF) => {
                reader.read_byte()?;
                byte
            }
            Some(byte) => match reader.running_status() {
                Some(status) if reader.config().running_status => status,
                _ => {
                    return Err(ReaderError::parse_error(
                        reader.buffer_position(),
                        ParseError::UnrecognizedEvent(byte),
                    ));
                }
            },
            None => return Err(ReaderError::oob(reader.buffer_position())),
        };

        let message = match status & 0xF0 {
            0x80 => VoiceMessage::NoteOff {
                key: read_data(reader)?,
                velocity: read_data(reader)?,
            },
            0x90 => VoiceMessage::NoteOn {
                key: read_data(reader)?,
                velocity: read_data(reader)?,
            },
            0xA0 => VoiceMessage::PolyphonicAftertouch {
                key: read_data(reader)?,
                pressure: read_data(reader)?,
            },
            0xB0 => VoiceMessage::ControlChange {
                controller: read_data(reader)?,
                value: read_data(reader)?,
            },
            0xC0 => VoiceMessage::ProgramChange {
                program: read_data(reader)?,
            },
            0xD0 => VoiceMessage::ChannelAftertouch {
                pressure: read_data(reader)?,
            },
            // 0xE0
            _ => VoiceMessage::PitchBend {
                lsb: read_data(reader)?,
                msb: read_data(reader)?,
            },
        };

        reader.set_running_status(status);
        Ok(Self {
            channel: status & 0x0F,
            message,
        })
    }
}

fn read_data(reader: &mut Reader<'_>) -> ReadResult<DataByte> {
    let position = reader.buffer_position();
    let byte = reader.read_byte()?;
    DataByte::new(byte).map_err(|e| ReaderError::parse_error(position, e))
}

impl EventBody for ChannelVoiceEvent {
    fn body_length(&self) -> u32 {
        1 + self.message.data_len()
    }

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.push(self.status());
        self.message.push_data(out);
        Ok(())
    }

    fn try_decode(reader: &mut Reader<'_>) -> Recognized<Self> {
        let claims = match reader.peek() {
            Some(0x80..=0xEF) => true,
            Some(0x00..=0x7F) => {
                reader.config().running_status && reader.running_status().is_some()
            }
            _ => false,
        };
        if !claims {
            return Recognized::NoMatch;
        }
        Recognized::attempt(reader, Self::read)
    }
}

impl fmt::Display for ChannelVoiceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ch = self.channel;
        match self.message {
            VoiceMessage::NoteOff { key, velocity } => {
                write!(f, "NoteOff(ch={ch}) key={key} velocity={velocity}")
            }
            VoiceMessage::NoteOn { key, velocity } => {
                write!(f, "NoteOn(ch={ch}) key={key} velocity={velocity}")
            }
            VoiceMessage::PolyphonicAftertouch { key, pressure } => {
                write!(f, "PolyAftertouch(ch={ch}) key={key} pressure={pressure}")
            }
            VoiceMessage::ControlChange { controller, value } => {
                write!(f, "ControlChange(ch={ch}) controller={controller} value={value}")
            }
            VoiceMessage::ProgramChange { program } => {
                write!(f, "ProgramChange(ch={ch}) program={program}")
            }
            VoiceMessage::ChannelAftertouch { pressure } => {
                write!(f, "ChannelAftertouch(ch={ch}) pressure={pressure}")
            }
            VoiceMessage::PitchBend { lsb, msb } => {
                let value = ((msb.0 as u16) << 7) | lsb.0 as u16;
                write!(f, "PitchBend(ch={ch}) value={value}")
            }
        }
    }
}
