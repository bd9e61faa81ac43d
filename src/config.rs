//! Scene configuration.
//!
//! All tunables of the extraction-to-path pipeline live in [`SceneConfig`],
//! which is passed explicitly to the planner. It can be loaded from a JSON
//! file; missing fields fall back to their defaults.

use crate::midi::{Note, NoteSet};
use crate::path::Point3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading or saving a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parameters that map notes into scene space and shape the trajectories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene units per second along the time (y) axis.
    pub y_axis_scale: f64,

    /// Seconds the agents get to reach their first pad.
    pub runup_time: f64,

    /// Trajectory samples per note over the whole run.
    /// The actual density is `points_per_note * note_count / run_time` per second.
    pub points_per_note: f64,

    /// y coordinate of the agents' starting anchors.
    pub anchor_y: f64,

    /// Height of pads and anchors.
    pub pad_z: f64,

    /// Trajectories are raised by this much so agents sit on top of pads.
    pub agent_radius: f64,

    /// Fixed arc apex height; None derives it from the hop distance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apex_height: Option<f64>,

    /// Sort notes chronologically before assignment.
    pub sort_by_onset: bool,

    /// Agent count override; None uses the file's peak polyphony.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<usize>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            y_axis_scale: 16.0,
            runup_time: 1.0,
            points_per_note: 25.0,
            anchor_y: -12.0,
            pad_z: 0.01,
            agent_radius: 0.2,
            apex_height: None,
            sort_by_onset: true,
            agents: None,
        }
    }
}

impl SceneConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid JSON
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Scene position of the pad for a note.
    pub fn pad_position(&self, note: &Note) -> Point3 {
        Point3::new(note.pitch, note.onset * self.y_axis_scale, self.pad_z)
    }

    /// Starting anchor of agent `index` out of `count`, spread one unit
    /// apart along x and roughly centered on 0.
    pub fn anchor_position(&self, index: usize, count: usize) -> Point3 {
        Point3::new(
            index as f64 - count as f64 / 2.0,
            self.anchor_y,
            self.pad_z,
        )
    }

    /// Number of agents to plan for a set of notes.
    ///
    /// Files that release keys they never pressed can report a peak
    /// polyphony of 0; any non-empty set still gets at least one agent.
    pub fn agent_count(&self, notes: &NoteSet) -> usize {
        let count = self.agents.unwrap_or(notes.max_concurrent);
        if notes.is_empty() {
            count
        } else {
            count.max(1)
        }
    }
}
