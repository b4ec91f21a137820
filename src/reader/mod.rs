#![doc = r#"
A byte cursor over an SMF event stream

The [`Reader`] never consumes on failure: every read that runs out of bytes
leaves the position untouched. Speculative parsing is done by taking a
[`Mark`] and handing it back to [`Reader::reset`] when a recognizer
gives up.
"#]

mod error;
pub use error::*;

use alloc::borrow::Cow;

use crate::vlq;

#[doc = r#"
Runtime settings for a [`Reader`]
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReaderConfig {
    /// Reject variable length quantities padded with leading `0x80` bytes.
    ///
    /// When false the value is accepted and re-encoding writes the minimal form.
    pub strict_vlq: bool,
    /// Allow channel messages to omit a status byte repeated from the previous one.
    pub running_status: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderConfig {
    /// Accepts overlong quantities and running status.
    pub const fn new() -> Self {
        Self {
            strict_vlq: false,
            running_status: true,
        }
    }

    /// Rejects overlong quantities and running status.
    pub const fn strict() -> Self {
        Self {
            strict_vlq: true,
            running_status: false,
        }
    }
}

/// A saved reader state, see [`Reader::mark`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    position: usize,
    running_status: Option<u8>,
}

impl Mark {
    /// The buffer position when the mark was taken
    pub const fn position(&self) -> usize {
        self.position
    }
}

#[doc = r#"
A reader over a borrowed or owned byte buffer

# Example
```rust
# use smf_codec::prelude::*;
let mut reader = Reader::from_byte_slice(&[0x82, 0x2C, 0xFF]);
assert_eq!(reader.read_vlq().unwrap(), 300);
assert_eq!(reader.peek(), Some(0xFF));
assert_eq!(reader.buffer_position(), 2);
```
"#]
#[derive(Debug, Clone)]
pub struct Reader<'slc> {
    data: Cow<'slc, [u8]>,
    position: usize,
    running_status: Option<u8>,
    config: ReaderConfig,
}

impl<'slc> Reader<'slc> {
    /// Create a reader that borrows the slice
    pub const fn from_byte_slice(data: &'slc [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            position: 0,
            running_status: None,
            config: ReaderConfig::new(),
        }
    }

    /// Create a reader from anything that can become a [`Cow`] of bytes
    pub fn from_bytes<B>(data: B) -> Self
    where
        B: Into<Cow<'slc, [u8]>>,
    {
        Self {
            data: data.into(),
            position: 0,
            running_status: None,
            config: ReaderConfig::new(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration
    pub const fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// The offset of the next byte to be read
    pub const fn buffer_position(&self) -> usize {
        self.position
    }

    /// Bytes left before the end of the buffer
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// True if there is nothing left to read
    pub fn is_eof(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Look at the next byte without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    /// Consume one byte
    pub fn read_byte(&mut self) -> ReadResult<u8> {
        let byte = self.peek().ok_or(ReaderError::oob(self.position))?;
        self.position += 1;
        Ok(byte)
    }

    /// Consume `len` bytes. Consumes nothing if fewer are left.
    pub fn read_slice(&mut self, len: usize) -> ReadResult<&[u8]> {
        if len > self.remaining() {
            return Err(ReaderError::oob(self.position));
        }
        let start = self.position;
        self.position += len;
        Ok(&self.data[start..self.position])
    }

    /// Consume exactly `N` bytes into an array
    pub fn read_exact_size<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let slice = self.read_slice(N)?;
        let mut bytes = [0; N];
        bytes.copy_from_slice(slice);
        Ok(bytes)
    }

    /// Read a variable length quantity, see [`vlq::decode`]
    pub fn read_vlq(&mut self) -> ReadResult<u32> {
        vlq::decode(self).map(|(value, _)| value)
    }

    /// Save the position and running status
    pub const fn mark(&self) -> Mark {
        Mark {
            position: self.position,
            running_status: self.running_status,
        }
    }

    /// Return to a state saved with [`Reader::mark`]
    pub fn reset(&mut self, mark: Mark) {
        self.position = mark.position;
        self.running_status = mark.running_status;
    }

    /// The last channel status byte seen, if running status is in effect
    pub const fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    pub(crate) fn set_running_status(&mut self, status: u8) {
        self.running_status = Some(status);
    }

    pub(crate) fn clear_running_status(&mut self) {
        self.running_status = None;
    }
}

#[test]
fn failed_reads_do_not_consume() {
    use pretty_assertions::assert_eq;
    let mut reader = Reader::from_byte_slice(&[0x01, 0x02]);
    assert!(reader.read_slice(3).unwrap_err().is_out_of_bounds());
    assert_eq!(reader.buffer_position(), 0);
    assert_eq!(reader.read_exact_size::<2>().unwrap(), [0x01, 0x02]);
    assert_eq!(reader.read_byte().unwrap_err(), ReaderError::oob(2));
    assert!(reader.is_eof());
}

#[test]
fn reset_restores_running_status() {
    use pretty_assertions::assert_eq;
    let mut reader = Reader::from_byte_slice(&[0x90, 0x40, 0x7F]);
    let mark = reader.mark();
    reader.read_byte().unwrap();
    reader.set_running_status(0x90);
    reader.reset(mark);
    assert_eq!(reader.running_status(), None);
    assert_eq!(reader.buffer_position(), 0);
}

#[test]
fn constructors_share_default_config() {
    use pretty_assertions::assert_eq;
    let bytes = [0x00];
    assert_eq!(Reader::from_byte_slice(&bytes).config(), &ReaderConfig::default());
    assert_eq!(Reader::from_bytes(&bytes[..]).config(), &ReaderConfig::new());
}
