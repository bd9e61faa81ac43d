//! Trajectory planning for a pool of agents.
//!
//! Planning runs in two passes: the greedy assignment fills every agent's
//! visit list, then each agent's visits are joined into a trajectory made of
//! arced segments. Every trajectory ends at the pad of the final note, so all
//! agents come to rest in the same place once the piece is over.

use super::{assign, Agent, AgentId, Point3, Segment, Visit};
use crate::config::SceneConfig;
use crate::midi::{onset_span, Note};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// The result of planning: every agent with its visits and trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Notes in the order they were assigned.
    pub notes: Vec<Note>,

    /// Agents in id order.
    pub agents: Vec<Agent>,

    /// Seconds from the start of the run-up to the last onset.
    pub run_time: f64,

    /// Trajectory sampling density used for every segment.
    pub points_per_second: f64,
}

impl Plan {
    /// Returns true when nothing was planned.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Looks up an agent by id.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    /// Iterates over (agent id, trajectory) pairs.
    pub fn trajectories(&self) -> impl Iterator<Item = (AgentId, &[Point3])> {
        self.agents.iter().map(|a| (a.id, a.trajectory()))
    }
}

/// Plans trajectories for `agent_count` agents over `notes`.
///
/// Notes are assigned in the order given, after a stable chronological sort
/// when `config.sort_by_onset` is set. Zero agents or zero notes produce an
/// empty plan.
pub fn plan(notes: &[Note], agent_count: usize, config: &SceneConfig) -> Plan {
    if agent_count == 0 || notes.is_empty() {
        warn!(
            "Nothing to plan ({} notes, {} agents)",
            notes.len(),
            agent_count
        );
        return Plan::default();
    }

    let mut ordered = notes.to_vec();
    if config.sort_by_onset {
        ordered.sort_by(|a, b| a.onset.total_cmp(&b.onset));
    }

    let Some((_, last_onset)) = onset_span(&ordered) else {
        return Plan::default();
    };
    let run_time = last_onset + config.runup_time;
    let total_points = config.points_per_note * ordered.len() as f64;
    let points_per_second = if run_time > 0.0 {
        total_points / run_time
    } else {
        total_points
    };

    let mut agents: Vec<Agent> = (0..agent_count)
        .map(|i| Agent::new(AgentId::new(i), config.anchor_position(i, agent_count)))
        .collect();
    assign(&mut agents, &ordered, config);

    // The chronologically last note in assignment order is the shared resting place
    let Some(&final_note) = ordered.last() else {
        return Plan::default();
    };
    let finish = Visit {
        note: final_note,
        pad: config.pad_position(&final_note),
    };

    for agent in &mut agents {
        let segments = agent_segments(agent, &finish, points_per_second, config);
        let mut points = join_segments(&segments);
        for p in &mut points {
            p.z += config.agent_radius;
        }
        debug!(
            "{}: {} notes, {} segments, {} points",
            agent.id,
            agent.visits().len(),
            segments.len(),
            points.len()
        );
        agent.set_trajectory(points);
    }

    info!(
        "Planned {} notes across {} agents ({:.2}s run time)",
        ordered.len(),
        agent_count,
        run_time
    );

    Plan {
        notes: ordered,
        agents,
        run_time,
        points_per_second,
    }
}

/// Splits an agent's route into segments: anchor to first pad, pad to pad,
/// then last pad to `finish`.
///
/// The anchor counts as being left `runup_time` seconds before time zero.
/// An agent without visits stays on its anchor.
fn agent_segments(
    agent: &Agent,
    finish: &Visit,
    points_per_second: f64,
    config: &SceneConfig,
) -> Vec<Segment> {
    if agent.visits().is_empty() {
        return vec![Segment::straight(agent.anchor, agent.anchor)];
    }

    let mut segments = Vec::with_capacity(agent.visits().len() + 1);
    let mut from = agent.anchor;
    let mut from_time = -config.runup_time;

    for visit in agent.visits().iter().chain(std::iter::once(finish)) {
        segments.push(Segment::new(
            from,
            visit.pad,
            visit.note.onset - from_time,
            points_per_second,
            config.apex_height,
        ));
        from = visit.pad;
        from_time = visit.note.onset;
    }

    segments
}

/// Concatenates sampled segments. Splice points appear twice, once as the
/// end of one segment and once as the start of the next.
fn join_segments(segments: &[Segment]) -> Vec<Point3> {
    segments.iter().flat_map(|s| s.points()).collect()
}
