use pretty_assertions::assert_eq;
use smf_codec::{prelude::*, vlq};

fn meta(delta_time: u32, meta_type: MetaType, payload: &[u8]) -> Event {
    Event::new(delta_time, MetaEvent::with_payload(meta_type, payload).unwrap())
}

#[test]
fn text_hi() {
    let event = meta(0, MetaType::Text, b"Hi");
    let mut out = Vec::new();
    let written = event.encode(&mut out).unwrap();

    assert_eq!(out, [0x00, 0xFF, 0x01, 0x02, 0x48, 0x69]);
    assert_eq!(written, 6);
    assert_eq!(event.length(), 6);
}

#[test]
fn end_of_track_bytes() {
    let event = Event::new(0, MetaEvent::end_of_track());
    assert_eq!(event.to_bytes().unwrap(), [0x00, 0xFF, 0x2F, 0x00]);
    assert_eq!(event.length(), 4);
}

#[test]
fn decode_end_of_track() {
    let bytes = [0x00, 0xFF, 0x2F, 0x00];
    let mut reader = Reader::from_byte_slice(&bytes);
    let event = pop_event(&mut reader).unwrap();

    assert_eq!(event.delta_time(), 0);
    let meta = event.as_meta().unwrap();
    assert_eq!(meta.meta_type(), MetaType::EndOfTrack);
    assert!(meta.payload().is_empty());
    assert!(event.is_end_of_track());
    assert_eq!(reader.buffer_position(), 4);
}

#[test]
fn decode_unknown_meta_type() {
    let bytes = [0x00, 0xFF, 0x99, 0x00];
    let mut reader = Reader::from_byte_slice(&bytes);
    let err = pop_event(&mut reader).unwrap_err();

    assert_eq!(
        err.error_kind(),
        &ReaderErrorKind::ParseError(ParseError::InvalidMetaType(0x99))
    );
    assert_eq!(err.position(), 0);
    assert_eq!(reader.buffer_position(), 0);
}

#[test]
fn round_trip_every_type() {
    let types = [
        MetaType::SequenceNumber,
        MetaType::Text,
        MetaType::Copyright,
        MetaType::TrackName,
        MetaType::InstrumentName,
        MetaType::Lyric,
        MetaType::Marker,
        MetaType::CuePoint,
        MetaType::ChannelPrefix,
        MetaType::EndOfTrack,
        MetaType::Tempo,
        MetaType::SmpteOffset,
        MetaType::TimeSignature,
        MetaType::KeySignature,
        MetaType::SequencerSpecific,
    ];
    let payloads: [&[u8]; 4] = [&[], &[0x07, 0xA1, 0x20], &[0xFF; 127], &[0x55; 300]];

    for meta_type in types {
        for payload in payloads {
            for delta_time in [0, 0x7F, 0x80, 96_000, 0x0FFF_FFFF] {
                let event = meta(delta_time, meta_type, payload);
                let bytes = event.to_bytes().unwrap();
                assert_eq!(bytes.len() as u32, event.length());

                let mut reader = Reader::from_byte_slice(&bytes);
                let decoded = pop_event(&mut reader).unwrap();
                assert_eq!(decoded, event);
                assert!(reader.is_eof());
            }
        }
    }
}

#[test]
fn length_tracks_payload_mutation() {
    let mut event = meta(10, MetaType::Lyric, b"");

    for size in [0usize, 1, 127, 128, 129, 16_383, 16_384] {
        let EventKind::Meta(meta) = event.kind_mut() else {
            unreachable!()
        };
        meta.set_payload(vec![b'x'; size]).unwrap();
        assert_eq!(event.length() as usize, event.to_bytes().unwrap().len());
    }

    let short = meta(0, MetaType::Text, &[0; 127]).length();
    let long = meta(0, MetaType::Text, &[0; 128]).length();
    assert_eq!(long - short, 2);
}

#[test]
fn clone_does_not_share_payload() {
    let original = meta(0, MetaType::Copyright, b"(C) 2024");
    let mut copy = original.clone();
    let EventKind::Meta(meta) = copy.kind_mut() else {
        unreachable!()
    };
    meta.push_payload(b" someone").unwrap();

    assert_eq!(original.as_meta().unwrap().payload(), b"(C) 2024");
    assert_ne!(original, copy);
}

#[test]
fn display_does_not_change_length() {
    let event = meta(96, MetaType::TrackName, b"Strings");
    let before = event.length();
    let printed = event.to_string();
    assert!(printed.contains("NAME_TRACK"));
    assert!(printed.contains("\"Strings\""));
    assert_eq!(event.length(), before);
}

#[test]
#[should_panic]
fn new_rejects_delta_time_out_of_range() {
    Event::new(vlq::MAX + 1, MetaEvent::end_of_track());
}

#[test]
fn delta_time_out_of_range() {
    assert_eq!(
        Event::try_new(0x1000_0000, MetaEvent::end_of_track()),
        Err(EncodeError::ValueOutOfRange(0x1000_0000))
    );
    let mut event = Event::new(0, MetaEvent::end_of_track());
    assert!(event.set_delta_time(u32::MAX).is_err());
    assert_eq!(event.delta_time(), 0);
}
