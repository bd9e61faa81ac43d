//! Renderer hand-off format.
//!
//! A [`Choreography`] is everything an animation engine needs to play a
//! planned piece: where the pads go, how long the run lasts, how far the
//! camera travels, and each agent's color and trajectory. It is saved as
//! JSON for inspection or as bincode for fast loading.

use crate::config::SceneConfig;
use crate::midi::{onset_span, Note};
use crate::path::{AgentId, Plan, Point3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Extra camera travel past the last pad, in scene units.
const CAMERA_MARGIN: f64 = 20.0;

/// Hue step between consecutive agents (golden ratio conjugate).
const HUE_STEP: f64 = 0.618_033_988_749_895;

/// Errors that can occur while saving or loading a choreography.
#[derive(Debug, Error)]
pub enum ChoreographyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary encoding error: {0}")]
    Binary(#[from] bincode::Error),
}

/// One agent as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPath {
    pub id: AgentId,

    /// Display color as "#rrggbb".
    pub color: String,

    pub anchor: Point3,

    /// Notes the agent lands on, in order.
    pub notes: Vec<Note>,

    pub trajectory: Vec<Point3>,
}

/// A fully planned piece ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choreography {
    /// Seconds the agents need to traverse their trajectories.
    pub run_time: f64,

    /// Scene units per second along y; the renderer moves at this speed.
    pub y_axis_scale: f64,

    /// Distance the camera should dolly along y over the run.
    pub camera_travel: f64,

    /// One pad per note, in assignment order.
    pub pads: Vec<Point3>,

    pub agents: Vec<AgentPath>,
}

impl Choreography {
    /// Builds the hand-off for a plan.
    pub fn from_plan(plan: &Plan, config: &SceneConfig) -> Self {
        let span = onset_span(&plan.notes).map_or(0.0, |(lo, hi)| hi - lo);

        let agents = plan
            .agents
            .iter()
            .map(|agent| AgentPath {
                id: agent.id,
                color: agent_color(agent.id.index()),
                anchor: agent.anchor,
                notes: agent.notes().copied().collect(),
                trajectory: agent.trajectory().to_vec(),
            })
            .collect();

        Self {
            run_time: plan.run_time,
            y_axis_scale: config.y_axis_scale,
            camera_travel: span * config.y_axis_scale + CAMERA_MARGIN,
            pads: plan.notes.iter().map(|n| config.pad_position(n)).collect(),
            agents,
        }
    }

    /// Total number of trajectory points across all agents.
    pub fn point_count(&self) -> usize {
        self.agents.iter().map(|a| a.trajectory.len()).sum()
    }

    pub fn to_json(&self) -> Result<String, ChoreographyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ChoreographyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Saves the choreography as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file writing fails
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ChoreographyError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Loads a choreography from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ChoreographyError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Saves the choreography in binary form.
    ///
    /// Uses bincode, which is much smaller than JSON for long trajectories.
    pub fn save_to_binary<P: AsRef<Path>>(&self, path: P) -> Result<(), ChoreographyError> {
        let data = bincode::serialize(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Loads a choreography from a binary file.
    pub fn load_from_binary<P: AsRef<Path>>(path: P) -> Result<Self, ChoreographyError> {
        let data = fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }
}

/// Picks a bright display color for an agent.
///
/// Hues advance by the golden ratio so neighbouring agents stay far apart
/// on the color wheel, for any number of agents.
pub fn agent_color(index: usize) -> String {
    let hue = (index as f64 * HUE_STEP).fract();
    let (r, g, b) = hsv_to_rgb(hue, 0.75, 0.95);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// HSV with all components in [0, 1] to 8-bit RGB.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let sector = h * 6.0;
    let i = sector.floor();
    let f = sector - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let to_byte = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::plan;

    fn sample() -> Choreography {
        let config = SceneConfig::default();
        let notes = [
            Note::new(-3.0, 0.0),
            Note::new(2.0, 0.5),
            Note::new(1.0, 1.5),
        ];
        Choreography::from_plan(&plan(&notes, 2, &config), &config)
    }

    #[test]
    fn test_from_plan() {
        let choreo = sample();
        assert_eq!(choreo.agents.len(), 2);
        assert_eq!(choreo.pads.len(), 3);
        assert!((choreo.run_time - 2.5).abs() < 1e-12);
        assert!((choreo.camera_travel - (1.5 * 16.0 + CAMERA_MARGIN)).abs() < 1e-9);
        assert_ne!(choreo.agents[0].color, choreo.agents[1].color);
        assert!(choreo.point_count() > 0);
    }

    /// JSON float parsing may differ in the last bit.
    fn assert_same(a: &Choreography, b: &Choreography) {
        assert_eq!(a.agents.len(), b.agents.len());
        assert_eq!(a.pads.len(), b.pads.len());
        assert!((a.run_time - b.run_time).abs() < 1e-9);
        for (x, y) in a.agents.iter().zip(&b.agents) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.color, y.color);
            assert_eq!(x.notes.len(), y.notes.len());
            assert_eq!(x.trajectory.len(), y.trajectory.len());
            for (p, q) in x.trajectory.iter().zip(&y.trajectory) {
                assert!(p.distance(q) < 1e-9);
            }
        }
    }

    #[test]
    fn test_json_round_trip() {
        let choreo = sample();
        let json = choreo.to_json().unwrap();
        assert_same(&Choreography::from_json(&json).unwrap(), &choreo);
    }

    #[test]
    fn test_file_persistence() {
        let choreo = sample();
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("piece.choreo.json");
        choreo.save_to_file(&json_path).unwrap();
        assert_same(&Choreography::load_from_file(&json_path).unwrap(), &choreo);

        let bin_path = dir.path().join("piece.choreo.bin");
        choreo.save_to_binary(&bin_path).unwrap();
        assert_eq!(Choreography::load_from_binary(&bin_path).unwrap(), choreo);
    }

    #[test]
    fn test_load_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            Choreography::load_from_file(&path),
            Err(ChoreographyError::Json(_))
        ));
    }

    #[test]
    fn test_agent_colors() {
        assert_eq!(agent_color(0), "#f23d3d");
        let color = agent_color(7);
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
        assert_ne!(agent_color(1), agent_color(2));
    }
}
