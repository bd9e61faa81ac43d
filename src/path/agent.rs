//! Agent representation.
//!
//! An agent is one moving object in the animation. It starts at an anchor,
//! collects the notes it is assigned in order, and is finally given the
//! trajectory that carries it through all of them.

use super::Point3;
use crate::midi::Note;
use serde::{Deserialize, Serialize};

/// Index of an agent within its plan. Lower ids win assignment ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(usize);

impl AgentId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent {}", self.0)
    }
}

/// A note assigned to an agent, with the pad position it has to reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub note: Note,
    pub pad: Point3,
}

/// One moving object and everything planned for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,

    /// Resting position before the first visit.
    pub anchor: Point3,

    /// Assigned notes in assignment order. Only ever appended to.
    visits: Vec<Visit>,

    /// Scene-space path, empty until the planner synthesizes it.
    trajectory: Vec<Point3>,
}

impl Agent {
    /// Creates an agent waiting at `anchor` with nothing assigned.
    pub fn new(id: AgentId, anchor: Point3) -> Self {
        Self {
            id,
            anchor,
            visits: Vec::new(),
            trajectory: Vec::new(),
        }
    }

    /// Appends a visit.
    pub fn push_visit(&mut self, note: Note, pad: Point3) {
        self.visits.push(Visit { note, pad });
    }

    /// Returns the assigned visits in order.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Returns the assigned notes in order.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.visits.iter().map(|v| &v.note)
    }

    /// The position the agent will be at after its latest visit.
    pub fn last_point(&self) -> Point3 {
        self.visits.last().map_or(self.anchor, |v| v.pad)
    }

    pub fn trajectory(&self) -> &[Point3] {
        &self.trajectory
    }

    pub(crate) fn set_trajectory(&mut self, points: Vec<Point3>) {
        self.trajectory = points;
    }
}
