//! Extracted note representation.
//!
//! A note is reduced to the two values the choreography needs: where it sits
//! on the keyboard and when it starts sounding.

use serde::{Deserialize, Serialize};

/// A single piano note as seen by the path planner.
///
/// `pitch` starts out as a piano key index (0 = A0) and becomes a real-valued,
/// zero-centered offset once the owning [`NoteSet`] is centered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Horizontal position in semitones.
    pub pitch: f64,

    /// Time the note starts sounding, in seconds from the start of its track.
    pub onset: f64,
}

impl Note {
    /// Creates a new note.
    ///
    /// # Examples
    ///
    /// ```
    /// use musimation::midi::Note;
    ///
    /// let note = Note::new(39.0, 0.5);
    /// assert_eq!(note.onset, 0.5);
    /// ```
    pub fn new(pitch: f64, onset: f64) -> Self {
        Self { pitch, onset }
    }
}

/// The notes of a MIDI file together with its peak polyphony.
///
/// Notes are kept in extraction order (track order, then release order),
/// which is not necessarily chronological. Use [`NoteSet::sort_by_onset`]
/// when chronological order is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteSet {
    notes: Vec<Note>,

    /// Largest number of notes held down at the same time.
    pub max_concurrent: usize,
}

impl NoteSet {
    /// Creates a note set from already extracted notes.
    pub fn new(notes: Vec<Note>, max_concurrent: usize) -> Self {
        Self {
            notes,
            max_concurrent,
        }
    }

    /// Returns the notes in their current order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Returns an iterator over the notes.
    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    /// Returns the number of notes.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Returns true if there are no notes.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Returns the mean pitch, or None for an empty set.
    pub fn mean_pitch(&self) -> Option<f64> {
        if self.notes.is_empty() {
            return None;
        }
        let sum: f64 = self.notes.iter().map(|n| n.pitch).sum();
        Some(sum / self.notes.len() as f64)
    }

    /// Shifts every pitch so the mean pitch becomes zero.
    ///
    /// # Returns
    ///
    /// The mean that was subtracted (0.0 for an empty set)
    pub fn center_pitches(&mut self) -> f64 {
        let Some(mean) = self.mean_pitch() else {
            return 0.0;
        };
        for note in &mut self.notes {
            note.pitch -= mean;
        }
        mean
    }

    /// Sorts notes by onset time. The sort is stable, so simultaneous notes
    /// keep their extraction order.
    pub fn sort_by_onset(&mut self) {
        self.notes.sort_by(|a, b| a.onset.total_cmp(&b.onset));
    }

    /// Returns the earliest and latest onset, or None for an empty set.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        onset_span(&self.notes)
    }
}

/// Returns the earliest and latest onset of `notes`, or None when empty.
pub fn onset_span(notes: &[Note]) -> Option<(f64, f64)> {
    let first = notes.first()?.onset;
    Some(
        notes
            .iter()
            .fold((first, first), |(lo, hi), n| (lo.min(n.onset), hi.max(n.onset))),
    )
}

impl<'a> IntoIterator for &'a NoteSet {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}
