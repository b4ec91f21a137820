use core::fmt;

use crate::ParseError;

#[doc = r#"
A byte with its leading bit cleared.

Every byte following a channel status is a data byte. The leading bit
is what tells a status apart from data, so it must be 0.

# Example
```rust
# use smf_codec::prelude::*;
assert!(DataByte::new(0x40).is_ok());
assert_eq!(DataByte::new(0x90), Err(ParseError::InvalidDataByte(0x90)));
```
"#]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct DataByte(pub(crate) u8);

impl DataByte {
    /// Checks for correctness (leading 0 bit).
    pub const fn new(byte: u8) -> Result<Self, ParseError> {
        if byte > 0x7F {
            return Err(ParseError::InvalidDataByte(byte));
        }
        Ok(Self(byte))
    }

    /// Masks off the leading bit instead of checking it.
    pub const fn new_unchecked(byte: u8) -> Self {
        Self(byte & 0x7F)
    }

    /// Returns the underlying byte
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DataByte {
    type Error = ParseError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DataByte> for u8 {
    fn from(value: DataByte) -> Self {
        value.0
    }
}

impl fmt::Display for DataByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[test]
fn data_byte_masks_when_unchecked() {
    use pretty_assertions::assert_eq;
    assert_eq!(DataByte::new_unchecked(0xC5).value(), 0x45);
    assert_eq!(DataByte::new(0x7F).unwrap().value(), 0x7F);
    assert_eq!(DataByte::try_from(0x80u8), Err(ParseError::InvalidDataByte(0x80)));
}
