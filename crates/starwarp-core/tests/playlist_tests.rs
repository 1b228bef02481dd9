// Host-side tests for playlist parsing, navigation and track observers.

use rand::rngs::StdRng;
use rand::SeedableRng;
use starwarp_core::*;
use std::cell::RefCell;
use std::rc::Rc;

const PLAYLIST_JSON: &str = r#"{
  "tracks": [
    { "title": "Departure", "artist": "Orbit", "album": "Lift", "duration": 212.5, "filePath": "/audio/departure.mp3" },
    { "title": "Drift", "artist": "Orbit", "filePath": "/audio/drift.mp3" },
    { "title": "Arrival", "artist": "Nadir", "filePath": "/audio/arrival.mp3" }
  ]
}"#;

fn playlist() -> Playlist {
    Playlist::from_json(PLAYLIST_JSON).expect("valid playlist")
}

#[test]
fn parses_camel_case_tracks_with_optional_fields() {
    let list = playlist();
    assert_eq!(list.len(), 3);
    let first = &list.tracks()[0];
    assert_eq!(first.file_path, "/audio/departure.mp3");
    assert_eq!(first.album.as_deref(), Some("Lift"));
    assert_eq!(first.duration, Some(212.5));
    assert_eq!(list.tracks()[1].album, None);
    assert_eq!(list.current().map(|t| t.title.as_str()), Some("Departure"));
}

#[test]
fn malformed_json_is_an_error() {
    let err = Playlist::from_json(r#"{ "tracks": [ { "title": 1 } ] }"#);
    assert!(matches!(err, Err(EngineError::Playlist(_))));
}

#[test]
fn navigation_wraps_both_ways() {
    let mut list = playlist();
    let mut transport = ManualTransport::new();
    assert_eq!(list.next_index(), Some(1));
    assert_eq!(list.previous_index(), Some(2));

    list.load(2, &mut transport).expect("load");
    assert_eq!(list.next_index(), Some(0));
    assert_eq!(transport.source(), Some("/audio/arrival.mp3"));
}

#[test]
fn load_out_of_range_keeps_current_track() {
    let mut list = playlist();
    let mut transport = ManualTransport::new();
    let err = list.load(3, &mut transport).unwrap_err();
    assert!(matches!(err, EngineError::TrackOutOfRange { index: 3, len: 3 }));
    assert_eq!(list.current_index(), 0);
    assert_eq!(transport.load_count(), 0);
}

#[test]
fn random_index_never_repeats_the_current_track() {
    let mut list = playlist();
    let mut transport = ManualTransport::new();
    let mut rng = StdRng::seed_from_u64(8);
    let mut seen = [false; 3];
    for round in 0..100 {
        let current = round % 3;
        list.load(current, &mut transport).expect("load");
        let pick = list.random_index(&mut rng).expect("non-empty");
        assert_ne!(pick, current);
        seen[pick] = true;
    }
    assert!(seen.iter().all(|s| *s), "every track is reachable");

    let single = Playlist::new(vec![list.tracks()[0].clone()]);
    assert_eq!(single.random_index(&mut rng), Some(0));
    assert_eq!(Playlist::default().random_index(&mut rng), None);
}

#[test]
fn observers_see_every_change_and_failures_are_isolated() {
    let mut list = playlist();
    let mut transport = ManualTransport::new();
    let titles = Rc::new(RefCell::new(Vec::new()));

    list.subscribe(|_| anyhow::bail!("metadata panel offline"));
    list.subscribe(|_| panic!("observer bug"));
    let sink = titles.clone();
    let sub = list.subscribe(move |track| {
        sink.borrow_mut().push(track.title.clone());
        Ok(())
    });

    list.load(1, &mut transport).expect("load survives failing observers");
    list.load(2, &mut transport).expect("load");
    assert_eq!(*titles.borrow(), vec!["Drift".to_string(), "Arrival".to_string()]);

    assert!(list.unsubscribe(sub));
    assert!(!list.unsubscribe(sub));
    list.load(0, &mut transport).expect("load");
    assert_eq!(titles.borrow().len(), 2);
}
