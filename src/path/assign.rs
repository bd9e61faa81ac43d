//! Greedy note-to-agent assignment.
//!
//! Each note goes to the agent with the lowest score against the agent's
//! latest position. The score subtracts the y (time) distance from the x
//! (pitch) distance, so an agent that has been idle for a long time beats a
//! recently used one at the same pitch distance.
//! This is a single pass, O(notes x agents); it is not an optimal matching.

use super::{Agent, Point3};
use crate::config::SceneConfig;
use crate::midi::Note;
use tracing::trace;

/// Assignment score of moving from `last` to `pad`. Lower is better.
pub fn score(last: &Point3, pad: &Point3) -> f64 {
    (last.x - pad.x).abs() - (last.y - pad.y).abs()
}

/// Assigns every note, in the given order, to one of `agents`.
///
/// Ties go to the agent with the lowest index. Does nothing when there
/// are no agents.
pub fn assign(agents: &mut [Agent], notes: &[Note], config: &SceneConfig) {
    if agents.is_empty() {
        return;
    }

    for note in notes {
        let pad = config.pad_position(note);

        let mut best = 0;
        let mut best_score = score(&agents[0].last_point(), &pad);
        for (idx, agent) in agents.iter().enumerate().skip(1) {
            let s = score(&agent.last_point(), &pad);
            if s < best_score {
                best = idx;
                best_score = s;
            }
        }

        trace!(
            "note {:.2}@{:.3}s -> {} (score {:.3})",
            note.pitch,
            note.onset,
            agents[best].id,
            best_score
        );
        agents[best].push_visit(*note, pad);
    }
}
