//! Arced segments between two pads.
//!
//! A segment rises from its start point and lands on its end point along a
//! parabola whose apex sits halfway along the horizontal distance. Longer
//! jumps get taller arcs, saturating at 2.5 scene units.

use super::Point3;

/// Apex height used when no explicit height is configured.
///
/// Logistic in the travel distance: near 0 for short hops, approaching 2.5
/// for long ones.
pub fn apex_for_distance(distance: f64) -> f64 {
    (5.0 / (1.0 + (-0.2 * distance).exp()) - 2.5).abs()
}

/// One arced hop between two consecutive points of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point3,
    pub end: Point3,
    pub apex_height: f64,
    /// Number of sampled points, always at least 2.
    pub resolution: usize,
}

impl Segment {
    /// Plans a segment.
    ///
    /// # Arguments
    ///
    /// * `start` / `end` - Endpoints in scene space
    /// * `duration` - Seconds available for the hop; negative values are allowed
    ///   and yield the minimum resolution
    /// * `points_per_second` - Sampling density
    /// * `apex_override` - Fixed apex height, or None for [`apex_for_distance`]
    pub fn new(
        start: Point3,
        end: Point3,
        duration: f64,
        points_per_second: f64,
        apex_override: Option<f64>,
    ) -> Self {
        if Self::is_negligible(start.distance(&end)) {
            return Self::straight(start, end);
        }

        // Float to int casts saturate, so negative or NaN products land on 0
        let resolution = ((points_per_second * duration).floor() as usize).max(2);
        let apex_height = apex_override.unwrap_or_else(|| apex_for_distance(start.distance(&end)));

        Self {
            start,
            end,
            apex_height,
            resolution,
        }
    }

    /// A flat two-point segment.
    pub fn straight(start: Point3, end: Point3) -> Self {
        Self {
            start,
            end,
            apex_height: 0.0,
            resolution: 2,
        }
    }

    /// Distances that round to zero at three decimals.
    fn is_negligible(distance: f64) -> bool {
        (distance * 1000.0).round() == 0.0
    }

    /// Length of the straight line between the endpoints.
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// True for segments that collapse to a straight line without an arc.
    pub fn is_degenerate(&self) -> bool {
        Self::is_negligible(self.length())
    }

    /// Arc height above the straight line at distance `d` along it.
    fn height_at(&self, d: f64, mid: f64) -> f64 {
        self.apex_height - (self.apex_height / (mid * mid)) * (d - mid) * (d - mid)
    }

    /// Samples the segment.
    ///
    /// The first and last points are exactly `start` and `end`, so segments
    /// that share an endpoint join without a gap.
    pub fn points(&self) -> Vec<Point3> {
        if self.is_degenerate() {
            return vec![self.start, self.end];
        }

        let full = self.length();
        let mid = full / 2.0;
        let last = self.resolution - 1;

        (0..self.resolution)
            .map(|i| {
                if i == 0 {
                    return self.start;
                }
                if i == last {
                    return self.end;
                }
                let t = i as f64 / last as f64;
                let mut p = self.start.lerp(&self.end, t);
                p.z += self.height_at(t * full, mid);
                p
            })
            .collect()
    }
}
