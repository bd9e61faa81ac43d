//! musimation - Falling-note choreography planner.
//!
//! This library turns a MIDI file into a set of arced 3D trajectories, one
//! per moving agent, for an external animation engine to play back.

pub mod choreography;
pub mod config;
pub mod midi;
pub mod path;

// Re-export commonly used types
pub use choreography::{AgentPath, Choreography, ChoreographyError};
pub use config::{ConfigError, SceneConfig};
pub use midi::{extract, ExtractError, Note, NoteSet};
pub use path::{plan, Agent, AgentId, Plan, Point3, Segment};
