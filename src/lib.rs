#![doc = r#"
A bit-exact codec for the Standard MIDI File event stream.

Bytes go in through a [`Reader`](crate::reader::Reader), come out as typed
[`Event`](crate::events::Event)s collected into a [`Track`](crate::track::Track),
and go back out as the exact bytes an `MTrk` chunk holds.

# Layout

```text
 vlq  ──►  reader  ──►  events (meta | channel voice | sysex)  ──►  track
```

- [`vlq`]: the 7-bit variable length quantity used for delta-times and lengths
- [`reader`]: a byte cursor with peek, mark/reset and running status
- [`events`]: the event variants and the dispatcher [`pop_event`](crate::events::pop_event)
- [`track`]: the `MTrk` container

# Example
```rust
use smf_codec::prelude::*;

let mut track = Track::new();
track.push(Event::new(0, MetaEvent::text(MetaType::Text, "Hi").unwrap()));
track.push(Event::new(0, MetaEvent::end_of_track()));

let mut bytes = Vec::new();
track.encode(&mut bytes).unwrap();

let mut reader = Reader::from_byte_slice(&bytes);
let decoded = Track::read_chunk(&mut reader).unwrap();
assert_eq!(decoded, track);
```
"#]
#![warn(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod byte;
pub use byte::*;

mod error;
pub use error::*;

pub mod events;
pub mod reader;
pub mod track;
pub mod vlq;

#[doc = r#"
Common re-exports
"#]
pub mod prelude {
    pub use crate::{
        byte::*,
        error::*,
        events::{
            ChannelVoiceEvent, Event, EventBody, EventKind, MetaEvent, MetaType, Recognized,
            SysExEvent, SysExKind, VoiceMessage, pop_event,
        },
        reader::{ReadResult, Reader, ReaderConfig, ReaderError, ReaderErrorKind},
        track::Track,
    };
}
