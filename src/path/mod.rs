//! Agent path planning.
//!
//! Notes become pads in scene space. A fixed pool of agents is assigned to
//! the pads greedily, then each agent's visits are joined by arced segments
//! into one continuous trajectory.
//!
//! Scene axes: x follows pitch, y follows time, z is height above the pads.

mod agent;
mod assign;
mod planner;
mod segment;

pub use agent::{Agent, AgentId, Visit};
pub use assign::{assign, score};
pub use planner::{plan, Plan};
pub use segment::{apex_for_distance, Segment};

use serde::{Deserialize, Serialize};

/// A point in scene space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Linear interpolation towards `other`; `t = 0` is self, `t = 1` is other.
    pub fn lerp(&self, other: &Point3, t: f64) -> Point3 {
        Point3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point3::new(0.0, 0.0, 1.0);
        let b = Point3::new(3.0, 4.0, 1.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_lerp() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, -4.0, 1.0);
        assert_eq!(a.lerp(&b, 0.5), Point3::new(1.0, -2.0, 0.5));
        assert_eq!(a.lerp(&b, 0.0), a);
    }
}
