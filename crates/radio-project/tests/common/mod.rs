#![allow(dead_code)]

use anyhow::{Context, Result};
use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::tag::{Tag, TagType};
use radio_project::{ProjectDocument, Song, SongField};
use std::path::Path;

pub const SAMPLE_RATE: u32 = 8_000;

/// Silent 16-bit mono WAV of `secs` seconds.
pub fn write_silent_wav(path: &Path, secs: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("creating {}", path.display()))?;
    for _ in 0..SAMPLE_RATE * secs {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, no padding: 417 bytes per frame.
const MP3_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];
const MP3_FRAME_LEN: usize = 417;

/// `frames` zero-payload MP3 frames with no tags.
pub fn write_silent_mp3(path: &Path, frames: usize) -> Result<()> {
    let mut frame = vec![0u8; MP3_FRAME_LEN];
    frame[..4].copy_from_slice(&MP3_FRAME_HEADER);
    let bytes = frame.repeat(frames);
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Attach a tag of `tag_type` carrying the given items.
pub fn tag_file(path: &Path, tag_type: TagType, items: &[(ItemKey, &str)]) -> Result<()> {
    let mut tag = Tag::new(tag_type);
    for (key, value) in items {
        tag.insert_text(key.clone(), value.to_string());
    }
    tag.save_to_path(path, WriteOptions::default())
        .with_context(|| format!("tagging {}", path.display()))?;
    Ok(())
}

/// Document with every section filled in and no placeholder rows.
pub fn sample_document() -> ProjectDocument {
    let mut doc = ProjectDocument::default();
    doc.set_fmod_path(r"C:\Tools\fmod_designercl.exe");
    doc.set_radio_id("NITE");
    doc.set_radio_name("Night Drive FM");
    doc.set_radio_logo("logo.dds");
    doc.add_jingle("jingles/intro.wav");
    doc.add_jingle("jingles/outro.wav");

    for (file, name, artist, year, length) in [
        ("music/a.mp3", "Like a Rolling Stone", "Bob Dylan", "1965", "6:13"),
        ("music/b.flac", "Windowlicker", "Aphex Twin", "1999", "6:07"),
        ("music/c.wav", "Fish & Chips <live>", "The \"Quotes\"", "2001", "3:30"),
    ] {
        let mut song = Song::with_file(file);
        song.set(SongField::Name, name);
        song.set(SongField::Artist, artist);
        song.set(SongField::Year, year);
        song.set(SongField::Length, length);
        doc.add_song(song);
    }
    doc
}
