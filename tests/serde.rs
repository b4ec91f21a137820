#![cfg(feature = "serde")]

use pretty_assertions::assert_eq;
use smf_codec::prelude::*;

fn track() -> Track {
    [
        Event::new(0, MetaEvent::text(MetaType::TrackName, "Bass").unwrap()),
        Event::new(0, ChannelVoiceEvent::note_on(2, 40, 100).unwrap()),
        Event::new(240, ChannelVoiceEvent::note_off(2, 40, 0).unwrap()),
        Event::new(0, MetaEvent::end_of_track()),
    ]
    .into_iter()
    .collect()
}

#[test]
fn track_round_trip() {
    let track = track();
    let json = serde_json::to_string(&track).unwrap();
    let back: Track = serde_json::from_str(&json).unwrap();
    assert_eq!(back, track);
    assert_eq!(back.length(), track.length());
    assert_eq!(back.to_bytes().unwrap(), track.to_bytes().unwrap());
}

#[test]
fn track_is_a_list_of_events() {
    let empty: Track = serde_json::from_str("[]").unwrap();
    assert_eq!(empty.length(), 8);
    assert_eq!(empty.body_length(), 0);

    assert!(serde_json::from_str::<Track>(r#"{"length":3,"events":[]}"#).is_err());
}

#[test]
fn length_is_recomputed() {
    let json = r#"[{"delta_time":128,"kind":{"Meta":{"meta_type":"EndOfTrack","payload":[]}}}]"#;
    let track: Track = serde_json::from_str(json).unwrap();
    assert_eq!(track.length(), 8 + 5);
    assert_eq!(
        track.to_bytes().unwrap(),
        [b'M', b'T', b'r', b'k', 0, 0, 0, 5, 0x81, 0x00, 0xFF, 0x2F, 0x00]
    );
}

#[test]
fn out_of_range_values_are_rejected() {
    let delta = r#"{"delta_time":268435456,"kind":{"Meta":{"meta_type":"EndOfTrack","payload":[]}}}"#;
    assert!(serde_json::from_str::<Event>(delta).is_err());

    let channel = r#"{"channel":16,"message":{"ProgramChange":{"program":1}}}"#;
    assert!(serde_json::from_str::<ChannelVoiceEvent>(channel).is_err());

    let data = r#"{"channel":0,"message":{"NoteOn":{"key":128,"velocity":1}}}"#;
    assert!(serde_json::from_str::<ChannelVoiceEvent>(data).is_err());

    let ok = r#"{"channel":15,"message":{"NoteOn":{"key":127,"velocity":1}}}"#;
    assert_eq!(
        serde_json::from_str::<ChannelVoiceEvent>(ok).unwrap(),
        ChannelVoiceEvent::note_on(15, 127, 1).unwrap()
    );
}
