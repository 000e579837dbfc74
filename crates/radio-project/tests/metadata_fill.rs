mod common;

use common::{tag_file, write_silent_mp3, write_silent_wav};
use lofty::prelude::ItemKey;
use lofty::tag::TagType;
use radio_project::metadata::MetadataExtractor;
use radio_project::{DocumentDefaults, EditorSession, SongField};

#[test]
fn untagged_wav_still_reports_length() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("silence.wav");
    write_silent_wav(&path, 65).expect("wav");

    let meta = MetadataExtractor::new().extract(&path).expect("extract");
    assert_eq!(meta.title, None);
    assert_eq!(meta.artist, None);
    assert_eq!(meta.duration_secs, Some(65));
}

#[test]
fn wav_prefers_id3_title_over_riff_info() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tagged.wav");
    write_silent_wav(&path, 3).expect("wav");
    tag_file(
        &path,
        TagType::RiffInfo,
        &[
            (ItemKey::TrackTitle, "Riff Title"),
            (ItemKey::TrackArtist, "Riff Artist"),
        ],
    )
    .expect("riff info");
    tag_file(&path, TagType::Id3v2, &[(ItemKey::TrackTitle, "Id3 Title")]).expect("id3v2");

    let meta = MetadataExtractor::new().extract(&path).expect("extract");
    assert_eq!(meta.title.as_deref(), Some("Id3 Title"));
    assert_eq!(meta.artist.as_deref(), Some("Riff Artist"));
    assert_eq!(meta.duration_secs, Some(3));
}

#[test]
fn setting_song_file_fills_only_empty_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("track.wav");
    write_silent_wav(&path, 65).expect("wav");
    tag_file(
        &path,
        TagType::Id3v2,
        &[(ItemKey::TrackTitle, "Y"), (ItemKey::TrackArtist, "Tagged")],
    )
    .expect("id3v2");
    let audio = path.to_str().expect("utf-8 path");

    let mut session = EditorSession::new(&DocumentDefaults::default());

    // Pre-set name survives.
    session.document_mut().set_song_field(0, SongField::Name, "X");
    let filled = session.set_song_file(0, audio).expect("row exists");
    assert!(!filled.contains(&SongField::Name));
    let song = &session.document().songs()[0];
    assert_eq!(song.name(), "X");
    assert_eq!(song.artist(), "Tagged");
    assert_eq!(song.length(), "1:05");

    // Empty name is filled from the tag.
    let (idx, filled) = session.add_song_from_file(audio);
    assert!(filled.contains(&SongField::Name));
    assert_eq!(session.document().songs()[idx].name(), "Y");
    assert_eq!(session.document().songs()[idx].search_key(), "y tagged");
}

#[test]
fn mp3_with_only_id3v1_fills_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("old_rip.mp3");
    write_silent_mp3(&path, 200).expect("mp3");
    tag_file(
        &path,
        TagType::Id3v1,
        &[
            (ItemKey::TrackTitle, "V1 Title"),
            (ItemKey::TrackArtist, "V1 Artist"),
            (ItemKey::Year, "1987"),
        ],
    )
    .expect("id3v1");

    let meta = MetadataExtractor::new().extract(&path).expect("extract");
    assert_eq!(meta.title.as_deref(), Some("V1 Title"));
    assert_eq!(meta.artist.as_deref(), Some("V1 Artist"));
    assert_eq!(meta.date.as_deref(), Some("1987"));
    assert!(meta.duration_secs.is_some());

    let mut session = EditorSession::new(&DocumentDefaults::default());
    let (idx, _) = session.add_song_from_file(path.to_str().expect("utf-8 path"));
    let song = &session.document().songs()[idx];
    assert_eq!(song.name(), "V1 Title");
    assert_eq!(song.year(), "1987");
}
