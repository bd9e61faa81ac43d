//! Standard MIDI File (SMF) note extraction.
//!
//! Reads .mid files and flattens every track into (key, onset) pairs.
//!
//! # Behavior
//!
//! - Each track has its own clock and tempo, starting at 0 s and 500000 usec/beat
//! - Tempo meta events change the tempo for the rest of their track
//! - Note on with velocity 0 is treated as note off
//! - Releases without a recorded onset are dropped
//! - Keys outside the 88-key piano range are rejected
//! - Other events (controllers, SysEx, pitch bend, ...) only advance the clock

use super::{
    note_to_name, piano_key_index, ticks_to_seconds, Note, NoteSet, DEFAULT_TEMPO_USEC,
    PIANO_KEYS,
};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during note extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data is not a valid Standard MIDI File
    #[error("MIDI parse error: {0}")]
    Parse(String),

    /// Valid MIDI that uses features the extractor cannot time
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A note lies outside the 88-key piano range
    #[error("note {name} ({key}) in track {track} is outside the piano range A0-C8")]
    KeyOutOfRange {
        /// MIDI note number
        key: u8,
        /// Note name for display
        name: String,
        /// Zero-based track index
        track: usize,
    },
}

/// Tracks how many notes are held down across the whole file.
///
/// The live count is shared between tracks and may dip below zero when a
/// file releases keys it never pressed; the peak only ever grows.
#[derive(Debug, Default)]
struct PolyphonyCounter {
    live: i64,
    peak: i64,
}

impl PolyphonyCounter {
    fn press(&mut self) {
        self.live += 1;
    }

    fn release(&mut self) {
        self.live -= 1;
    }

    /// Samples the live count. Called once per event.
    fn observe(&mut self) {
        self.peak = self.peak.max(self.live);
    }

    fn peak(&self) -> usize {
        self.peak.max(0) as usize
    }
}

/// Extracts the notes of a MIDI file.
///
/// # Arguments
///
/// * `path` - Path to the .mid or .midi file
///
/// # Returns
///
/// The zero-centered notes in extraction order, with the peak polyphony
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed, uses SMPTE timing,
/// or contains keys outside the piano range
pub fn extract<P: AsRef<Path>>(path: P) -> Result<NoteSet, ExtractError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let notes = extract_from_bytes(&data)?;

    info!(
        "Extracted {} notes from {:?} (max {} simultaneous)",
        notes.len(),
        path,
        notes.max_concurrent
    );

    Ok(notes)
}

/// Extracts the notes of an in-memory MIDI file.
///
/// See [`extract`] for details.
pub fn extract_from_bytes(data: &[u8]) -> Result<NoteSet, ExtractError> {
    let smf = Smf::parse(data).map_err(|e| ExtractError::Parse(e.to_string()))?;

    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(tpb) => tpb.as_int(),
        Timing::Timecode(_, _) => {
            return Err(ExtractError::UnsupportedFormat(
                "SMPTE timecode timing not supported".to_string(),
            ))
        }
    };
    if ticks_per_beat == 0 {
        return Err(ExtractError::Parse("header declares 0 ticks per beat".to_string()));
    }
    if smf.tracks.is_empty() {
        return Err(ExtractError::Parse("file contains no tracks".to_string()));
    }

    let mut counter = PolyphonyCounter::default();
    let mut notes = Vec::new();

    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let before = notes.len();
        parse_track(track, track_idx, ticks_per_beat, &mut counter, &mut notes)?;
        debug!(
            "Track {}: {} events, {} notes",
            track_idx,
            track.len(),
            notes.len() - before
        );
    }

    let mut set = NoteSet::new(notes, counter.peak());
    let mean = set.center_pitches();
    debug!("Centered pitches around key index {:.3}", mean);

    Ok(set)
}

/// Walks one track, appending every completed note to `notes`.
fn parse_track(
    track: &[TrackEvent],
    track_idx: usize,
    ticks_per_beat: u16,
    counter: &mut PolyphonyCounter,
    notes: &mut Vec<Note>,
) -> Result<(), ExtractError> {
    let mut tempo = DEFAULT_TEMPO_USEC;
    let mut time = 0.0f64;
    let mut onsets: [Option<f64>; PIANO_KEYS] = [None; PIANO_KEYS];
    let mut dropped = 0usize;

    for event in track {
        time += ticks_to_seconds(event.delta.as_int(), ticks_per_beat, tempo);

        match event.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(usec_per_beat)) => {
                tempo = usec_per_beat.as_int();
            }
            TrackEventKind::Midi { message, .. } => match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    let slot = key_slot(key.as_int(), track_idx)?;
                    counter.press();
                    onsets[slot] = Some(time);
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    let slot = key_slot(key.as_int(), track_idx)?;
                    counter.release();
                    match onsets[slot].take() {
                        Some(onset) => notes.push(Note::new(slot as f64, onset)),
                        None => dropped += 1,
                    }
                }
                _ => {} // Ignore other MIDI messages
            },
            _ => {} // Ignore SysEx and other meta events
        }

        counter.observe();
    }

    if dropped > 0 {
        warn!(
            "Track {}: dropped {} note releases without a matching onset",
            track_idx, dropped
        );
    }

    Ok(())
}

/// Maps a MIDI key to its onset slot, failing for keys off the piano.
fn key_slot(key: u8, track: usize) -> Result<usize, ExtractError> {
    piano_key_index(key).ok_or_else(|| ExtractError::KeyOutOfRange {
        key,
        name: note_to_name(key),
        track,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use midly::{Format, Header};

    fn on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: delta.into(),
            kind: TrackEventKind::Midi {
                channel: 0.into(),
                message: MidiMessage::NoteOn {
                    key: key.into(),
                    vel: vel.into(),
                },
            },
        }
    }

    fn off(delta: u32, key: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: delta.into(),
            kind: TrackEventKind::Midi {
                channel: 0.into(),
                message: MidiMessage::NoteOff {
                    key: key.into(),
                    vel: 0.into(),
                },
            },
        }
    }

    fn tempo(delta: u32, usec: u32) -> TrackEvent<'static> {
        TrackEvent {
            delta: delta.into(),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(usec.into())),
        }
    }

    fn end(delta: u32) -> TrackEvent<'static> {
        TrackEvent {
            delta: delta.into(),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        }
    }

    fn build(tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
        let format = if tracks.len() > 1 {
            Format::Parallel
        } else {
            Format::SingleTrack
        };
        let mut smf = Smf::new(Header::new(format, Timing::Metrical(480.into())));
        smf.tracks = tracks;
        let mut bytes = Vec::new();
        smf.write(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_onset_after_one_beat() {
        // Onset is taken from the clock at the note on, released one beat later
        let bytes = build(vec![vec![
            tempo(0, 500_000),
            on(480, 60, 100),
            off(480, 60),
            end(0),
        ]]);
        let set = extract_from_bytes(&bytes).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.max_concurrent, 1);
        let note = set.notes()[0];
        assert!(note.pitch.abs() < 1e-9);
        assert!((note.onset - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_onset_at_tick_zero() {
        // Pressed at tick 0, released one beat later at 500000 usec/beat
        let bytes = build(vec![vec![
            tempo(0, 500_000),
            on(0, 60, 100),
            off(480, 60),
            end(0),
        ]]);
        let set = extract_from_bytes(&bytes).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.max_concurrent, 1);
        assert!(set.notes()[0].pitch.abs() < 1e-9);
        assert!(set.notes()[0].onset.abs() < 1e-9);
    }

    #[test]
    fn test_stray_releases_still_plan_every_note() {
        // A reset burst of note offs drives the live count negative
        let bytes = build(vec![vec![
            off(0, 50),
            off(0, 51),
            on(0, 60, 100),
            off(480, 60),
            end(0),
        ]]);
        let set = extract_from_bytes(&bytes).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.max_concurrent, 0);

        let config = SceneConfig::default();
        let agent_count = config.agent_count(&set);
        assert_eq!(agent_count, 1);

        let plan = crate::path::plan(set.notes(), agent_count, &config);
        assert_eq!(plan.agents.len(), 1);
        assert_eq!(plan.agents[0].visits().len(), 1);
    }

    #[test]
    fn test_tempo_change_applies_to_later_deltas() {
        let bytes = build(vec![vec![
            on(480, 60, 100), // 0.5 s at default tempo
            off(0, 60),
            tempo(0, 1_000_000),
            on(480, 62, 100), // +1.0 s at the slower tempo
            off(0, 62),
            end(0),
        ]]);
        let set = extract_from_bytes(&bytes).unwrap();
        let onsets: Vec<f64> = set.iter().map(|n| n.onset).collect();
        assert!((onsets[0] - 0.5).abs() < 1e-9);
        assert!((onsets[1] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_velocity_is_release() {
        let bytes = build(vec![vec![on(0, 60, 90), on(240, 60, 0), end(0)]]);
        let set = extract_from_bytes(&bytes).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.max_concurrent, 1);
    }

    #[test]
    fn test_unmatched_release_is_dropped() {
        let bytes = build(vec![vec![
            off(0, 64),
            on(0, 60, 90),
            off(240, 60),
            off(240, 60),
            end(0),
        ]]);
        let set = extract_from_bytes(&bytes).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_centering_and_polyphony() {
        // C major triad held together, then a single note
        let bytes = build(vec![vec![
            on(0, 60, 90),
            on(0, 64, 90),
            on(0, 67, 90),
            off(480, 60),
            off(0, 64),
            off(0, 67),
            on(0, 72, 90),
            off(480, 72),
            end(0),
        ]]);
        let set = extract_from_bytes(&bytes).unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.max_concurrent, 3);
        assert!(set.mean_pitch().unwrap().abs() < 1e-9);

        // Relative spacing survives centering
        let pitches: Vec<f64> = set.iter().map(|n| n.pitch).collect();
        assert!((pitches[1] - pitches[0] - 4.0).abs() < 1e-9);
        assert!((pitches[3] - pitches[0] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_tracks_have_independent_clocks() {
        let bytes = build(vec![
            vec![on(960, 60, 90), off(480, 60), end(0)],
            vec![on(0, 62, 90), off(480, 62), end(0)],
        ]);
        let set = extract_from_bytes(&bytes).unwrap();

        // Extraction order follows the tracks, not the clock
        let onsets: Vec<f64> = set.iter().map(|n| n.onset).collect();
        assert!((onsets[0] - 1.0).abs() < 1e-9);
        assert!(onsets[1].abs() < 1e-9);
    }

    #[test]
    fn test_key_out_of_range() {
        let bytes = build(vec![vec![on(0, 110, 90), off(480, 110), end(0)]]);
        match extract_from_bytes(&bytes) {
            Err(ExtractError::KeyOutOfRange { key, track, .. }) => {
                assert_eq!(key, 110);
                assert_eq!(track, 0);
            }
            other => panic!("expected KeyOutOfRange, got {:?}", other),
        }

        let bytes = build(vec![vec![on(0, 20, 90), end(0)]]);
        assert!(matches!(
            extract_from_bytes(&bytes),
            Err(ExtractError::KeyOutOfRange { key: 20, .. })
        ));
    }

    #[test]
    fn test_invalid_data() {
        assert!(matches!(
            extract_from_bytes(b"not a midi file"),
            Err(ExtractError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            extract("/nonexistent/dir/piano.mid"),
            Err(ExtractError::Io(_))
        ));
    }

    #[test]
    fn test_extract_from_file() {
        let bytes = build(vec![vec![on(0, 60, 90), off(480, 60), end(0)]]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, &bytes).unwrap();

        let set = extract(file.path()).unwrap();
        assert_eq!(set.len(), 1);
    }
}
