//! MIDI input for the choreography planner.
//!
//! This module reads Standard MIDI Files and reduces them to a flat list of
//! piano notes (key, onset time) that the path planner consumes.

mod extract;
mod note;

pub use extract::{extract, extract_from_bytes, ExtractError};
pub use note::{onset_span, Note, NoteSet};

/// Standard MIDI note names for display purposes.
/// Maps MIDI note number (0-127) to note name within an octave.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// MIDI note number of the lowest key on an 88-key piano (A0).
pub const LOWEST_PIANO_KEY: u8 = 21;

/// MIDI note number of the highest key on an 88-key piano (C8).
pub const HIGHEST_PIANO_KEY: u8 = 108;

/// Number of keys on a standard piano.
pub const PIANO_KEYS: usize = 88;

/// Tempo assumed until a track sets its own, in microseconds per beat (120 BPM).
pub const DEFAULT_TEMPO_USEC: u32 = 500_000;

/// Converts a MIDI note number to a human-readable note name with octave.
///
/// # Arguments
///
/// * `note` - MIDI note number (0-127)
///
/// # Returns
///
/// String representation like "C4" or "F#5"
///
/// # Examples
///
/// ```
/// use musimation::midi::note_to_name;
///
/// let name = note_to_name(60); // Middle C
/// assert_eq!(name, "C4");
/// ```
pub fn note_to_name(note: u8) -> String {
    let octave = (note / 12) as i8 - 1; // MIDI octave convention
    let note_index = (note % 12) as usize;
    format!("{}{}", NOTE_NAMES[note_index], octave)
}

/// Maps a MIDI note number to its piano key index (0 = A0, 87 = C8).
///
/// Returns None for notes outside the 88-key range.
pub fn piano_key_index(note: u8) -> Option<usize> {
    if (LOWEST_PIANO_KEY..=HIGHEST_PIANO_KEY).contains(&note) {
        Some((note - LOWEST_PIANO_KEY) as usize)
    } else {
        None
    }
}

/// Converts a tick delta to seconds at the given tempo.
///
/// # Arguments
///
/// * `ticks` - Number of ticks
/// * `ticks_per_beat` - File resolution from the SMF header
/// * `tempo_usec` - Tempo in microseconds per beat
///
/// # Returns
///
/// Duration in seconds
pub fn ticks_to_seconds(ticks: u32, ticks_per_beat: u16, tempo_usec: u32) -> f64 {
    ticks as f64 / ticks_per_beat as f64 * tempo_usec as f64 / 1_000_000.0
}
