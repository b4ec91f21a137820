#![doc = r#"
The `MTrk` chunk

```text
┌──────┬────────────────┬───────┬───────┬─────┐
│ MTrk │ length (u32 BE)│ event │ event │ ... │
└──────┴────────────────┴───────┴───────┴─────┘
```

The length field counts the bytes after it. [`Track::length`] counts the
whole chunk, so it is always 8 more than the length field.
"#]

use alloc::vec::Vec;
use core::fmt;

use crate::{
    EncodeError, ParseError,
    events::{Event, pop_event},
    reader::{ReadResult, Reader, ReaderError},
};

/// The identifier every track chunk starts with
pub const TRACK_CHUNK_ID: [u8; 4] = *b"MTrk";

/// The identifier and the length field
pub const CHUNK_HEADER_LEN: u32 = 8;

#[doc = r#"
An ordered list of events that serializes to one `MTrk` chunk.

The track owns its events and keeps its serialized length cached. Every
change to the events goes through the track, so the cache is refreshed
each time.

# Example
```rust
# use smf_codec::prelude::*;
let mut track = Track::new();
assert_eq!(track.length(), 8);

track.push(Event::new(0, MetaEvent::end_of_track()));
assert_eq!(track.length(), 12);

track.modify(0, |e| e.set_delta_time(200)).unwrap().unwrap();
assert_eq!(track.length(), 13);
```
"#]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<Event>", into = "Vec<Event>")
)]
pub struct Track {
    length: u32,
    events: Vec<Event>,
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl Track {
    /// An empty track
    pub const fn new() -> Self {
        Self {
            length: CHUNK_HEADER_LEN,
            events: Vec::new(),
        }
    }

    /// A track holding `events` in order
    pub fn from_events(events: Vec<Event>) -> Self {
        let mut track = Self {
            length: CHUNK_HEADER_LEN,
            events,
        };
        track.recompute_length();
        track
    }

    fn recompute_length(&mut self) {
        self.length = self
            .events
            .iter()
            .fold(CHUNK_HEADER_LEN, |acc, e| acc + e.length());
    }

    /// The size of the whole chunk, header included
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// The value written in the chunk's length field
    pub const fn body_length(&self) -> u32 {
        self.length - CHUNK_HEADER_LEN
    }

    /// The events in order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterate over the events
    pub fn iter(&self) -> core::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// The number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if there are no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True if the last event is `FF 2F 00`
    pub fn ends_with_eot(&self) -> bool {
        self.events.last().is_some_and(Event::is_end_of_track)
    }

    /// Append an event
    pub fn push(&mut self, event: Event) {
        self.length += event.length();
        self.events.push(event);
    }

    /// Insert an event at `index`
    ///
    /// # Panics
    /// if `index > len`, as [`Vec::insert`]
    pub fn insert(&mut self, index: usize, event: Event) {
        self.length += event.length();
        self.events.insert(index, event);
    }

    /// Remove the event at `index`, if there is one
    pub fn remove(&mut self, index: usize) -> Option<Event> {
        if index >= self.events.len() {
            return None;
        }
        let event = self.events.remove(index);
        self.length -= event.length();
        Some(event)
    }

    /// Remove the last event
    pub fn pop(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.length -= event.length();
        Some(event)
    }

    /// Remove every event
    pub fn clear(&mut self) {
        self.events.clear();
        self.length = CHUNK_HEADER_LEN;
    }

    /// Change the event at `index` in place.
    ///
    /// Returns `None` if there is no such event.
    pub fn modify<F, R>(&mut self, index: usize, f: F) -> Option<R>
    where
        F: FnOnce(&mut Event) -> R,
    {
        let event = self.events.get_mut(index)?;
        let before = event.length();
        let result = f(event);
        let after = event.length();
        self.length = self.length - before + after;
        Some(result)
    }

    /// Returns the events
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Appends the whole chunk to `out`, returning the bytes written.
    ///
    /// The chunk is assembled on its own first, so `out` is untouched
    /// on failure.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let mut bytes = Vec::with_capacity(self.length as usize);
        bytes.extend_from_slice(&TRACK_CHUNK_ID);
        bytes.extend_from_slice(&self.body_length().to_be_bytes());
        for event in &self.events {
            event.encode(&mut bytes)?;
        }
        out.extend_from_slice(&bytes);
        Ok(bytes.len())
    }

    /// Encodes the chunk into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::with_capacity(self.length as usize);
        self.encode(&mut out)?;
        Ok(out)
    }

    /// Reads a whole chunk: `MTrk`, the length field, then the events.
    ///
    /// # Errors
    /// [`ParseError::InvalidChunkId`] if the chunk is not a track chunk. The
    /// reader is left at the start of the chunk. Otherwise see [`Track::decode`].
    pub fn read_chunk(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let mark = reader.mark();
        let header = reader.read_exact_size::<4>().and_then(|id| {
            let len = reader.read_exact_size::<4>()?;
            Ok((id, u32::from_be_bytes(len)))
        });

        let (id, declared) = match header {
            Ok(header) => header,
            Err(e) => {
                reader.reset(mark);
                return Err(ReaderError::new(mark.position(), e.kind));
            }
        };
        if id != TRACK_CHUNK_ID {
            reader.reset(mark);
            return Err(ReaderError::parse_error(
                mark.position(),
                ParseError::InvalidChunkId(id),
            ));
        }

        Self::decode(reader, declared)
    }

    /// Reads events until exactly `declared` bytes have been consumed.
    ///
    /// `declared` is the value of the chunk's length field. The bytes
    /// consumed by each event are counted, not their re-encoded length,
    /// since running status makes a decoded event shorter than it encodes.
    ///
    /// # Errors
    /// All errors are reported at the offset of the event that failed, and
    /// the reader is left there.
    ///
    /// - [`ParseError::TruncatedTrack`] if the stream ends first
    /// - [`ParseError::TrackLengthMismatch`] if an event runs past `declared`.
    ///   That event is not kept. When the event also runs off the end of the
    ///   stream, `consumed` is the least it could have needed.
    /// - any error from [`pop_event`]
    pub fn decode(reader: &mut Reader<'_>, declared: u32) -> ReadResult<Self> {
        let mut track = Self::new();
        let mut consumed: u32 = 0;

        while consumed < declared {
            let mark = reader.mark();
            let truncated = ReaderError::parse_error(
                mark.position(),
                ParseError::TruncatedTrack { declared, consumed },
            );
            if reader.is_eof() {
                return Err(truncated);
            }

            let event = match pop_event(reader) {
                Ok(event) => event,
                Err(e)
                    if (e.is_out_of_bounds() || e.error_kind().is_malformed_vlq())
                        && reader.remaining() < (declared - consumed) as usize =>
                {
                    return Err(truncated);
                }
                // needs more than what is left, which already covers the rest of the body
                Err(e) if e.is_out_of_bounds() => {
                    let remaining = u32::try_from(reader.remaining()).unwrap_or(u32::MAX);
                    return Err(ReaderError::parse_error(
                        mark.position(),
                        ParseError::TrackLengthMismatch {
                            declared,
                            consumed: consumed.saturating_add(remaining).saturating_add(1),
                        },
                    ));
                }
                Err(e) => return Err(e),
            };

            let used = (reader.buffer_position() - mark.position()) as u32;
            if consumed + used > declared {
                reader.reset(mark);
                return Err(ReaderError::parse_error(
                    mark.position(),
                    ParseError::TrackLengthMismatch {
                        declared,
                        consumed: consumed + used,
                    },
                ));
            }

            consumed += used;
            track.push(event);
        }

        #[cfg(feature = "tracing")]
        {
            tracing::trace!(
                "Decoded track of {} events from {} bytes",
                track.len(),
                declared
            );
            if !track.ends_with_eot() {
                tracing::warn!("Track does not end with an End of Track event");
            }
        }

        Ok(track)
    }
}

impl From<Vec<Event>> for Track {
    fn from(value: Vec<Event>) -> Self {
        Self::from_events(value)
    }
}

impl From<Track> for Vec<Event> {
    fn from(value: Track) -> Self {
        value.events
    }
}

impl FromIterator<Event> for Track {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        Self::from_events(iter.into_iter().collect())
    }
}

impl Extend<Event> for Track {
    fn extend<T: IntoIterator<Item = Event>>(&mut self, iter: T) {
        for event in iter {
            self.push(event);
        }
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a Event;
    type IntoIter = core::slice::Iter<'a, Event>;
    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MTrk length={} events={}", self.body_length(), self.len())?;
        for event in &self.events {
            writeln!(f, "  {event}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{MetaEvent, MetaType};
    use pretty_assertions::assert_eq;

    fn sample() -> Track {
        [
            Event::new(0, MetaEvent::text(MetaType::TrackName, "Lead").unwrap()),
            Event::new(0, MetaEvent::end_of_track()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn cached_length_follows_mutation() {
        let mut track = sample();
        let expected = |t: &Track| 8 + t.iter().map(Event::length).sum::<u32>();
        assert_eq!(track.length(), expected(&track));

        track.insert(1, Event::new(300, MetaEvent::new(MetaType::Marker)));
        assert_eq!(track.length(), expected(&track));

        track
            .modify(1, |e| {
                let crate::events::EventKind::Meta(meta) = e.kind_mut() else {
                    unreachable!()
                };
                meta.set_payload([0u8; 200]).unwrap();
            })
            .unwrap();
        assert_eq!(track.length(), expected(&track));

        track.remove(0).unwrap();
        assert_eq!(track.length(), expected(&track));
        assert!(track.remove(10).is_none());

        track.pop().unwrap();
        track.clear();
        assert_eq!(track.length(), 8);
    }

    #[test]
    fn encoded_size_matches_length() {
        let track = sample();
        let bytes = track.to_bytes().unwrap();
        assert_eq!(bytes.len() as u32, track.length());
        assert_eq!(&bytes[..4], b"MTrk");
        assert_eq!(&bytes[4..8], &track.body_length().to_be_bytes());
    }

    #[test]
    fn wrong_chunk_id() {
        let bytes = *b"MThd\x00\x00\x00\x06\x00\x01\x00\x02\x00\x60";
        let mut reader = Reader::from_byte_slice(&bytes);
        let err = Track::read_chunk(&mut reader).unwrap_err();
        assert_eq!(
            err,
            ReaderError::parse_error(0, ParseError::InvalidChunkId(*b"MThd"))
        );
        assert_eq!(reader.buffer_position(), 0);
    }
}
