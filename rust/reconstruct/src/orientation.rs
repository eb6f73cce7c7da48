// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heading estimation in the XY plane
//!
//! Headings are degrees in [0, 360), counter-clockwise from +X. They are
//! computed and stored at full precision; rounding happens only when names
//! are exported.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Below this |dx| a segment counts as vertical
pub const VERTICAL_SLOPE_TOLERANCE: f64 = 1e-6;

/// Wrap an angle in degrees into [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can land exactly on 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Heading of a direction projected onto the XY plane
pub fn heading_of(direction: &Vector3<f64>) -> f64 {
    normalize_degrees(direction.y.atan2(direction.x).to_degrees())
}

/// Heading of the bisector of the two vertices nearest to `origin`
///
/// Direction vectors with a squared length below `tolerance_sq` are
/// ignored. With one remaining vector its own heading is returned; with
/// none the heading is 0. If the two nearest directions cancel out the
/// nearest one is used alone.
pub fn bisector_heading(origin: &Point3<f64>, vertices: &[Point3<f64>], tolerance_sq: f64) -> f64 {
    let mut directions: Vec<(f64, Vector3<f64>)> = vertices
        .iter()
        .map(|v| v - origin)
        .map(|d| (d.norm_squared(), d))
        .filter(|(len_sq, _)| *len_sq >= tolerance_sq)
        .collect();

    if directions.is_empty() {
        return 0.0;
    }
    directions.sort_by(|a, b| a.0.total_cmp(&b.0));

    let nearest = directions[0].1;
    let Some(&(_, second)) = directions.get(1) else {
        return heading_of(&nearest);
    };

    let bisector = nearest.normalize() + second.normalize();
    if bisector.norm_squared() < 1e-12 {
        heading_of(&nearest)
    } else {
        heading_of(&bisector)
    }
}

/// Heading from `origin` toward the nearest reference point
///
/// Ties keep the first reference encountered. `None` without references.
pub fn nearest_reference_heading(origin: &Point3<f64>, references: &[Point3<f64>]) -> Option<f64> {
    let mut best: Option<(f64, Vector3<f64>)> = None;
    for reference in references {
        let direction = reference - origin;
        let dist_sq = direction.norm_squared();
        if best.map_or(true, |(best_sq, _)| dist_sq < best_sq) {
            best = Some((dist_sq, direction));
        }
    }
    best.map(|(_, direction)| heading_of(&direction))
}

/// Slope of a plan segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Slope {
    Finite(f64),
    Vertical,
}

/// Midpoint and slope of one orientation segment, in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    pub midpoint: Point3<f64>,
    pub slope: Slope,
}

impl SegmentDescriptor {
    pub fn from_segment(a: &Point3<f64>, b: &Point3<f64>) -> Self {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let slope = if dx.abs() < VERTICAL_SLOPE_TOLERANCE {
            Slope::Vertical
        } else {
            Slope::Finite(dy / dx)
        };
        Self {
            midpoint: nalgebra::center(a, b),
            slope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_degrees() {
        assert_relative_eq!(normalize_degrees(-90.0), 270.0);
        assert_relative_eq!(normalize_degrees(720.5), 0.5, epsilon = 1e-12);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
        for step in -100..100 {
            let a = normalize_degrees(step as f64 * 17.3);
            assert!((0.0..360.0).contains(&a));
        }
    }

    #[test]
    fn test_bisector_of_right_angle() {
        let origin = Point3::new(1.0, 1.0, 0.0);
        let vertices = vec![
            origin,
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(3.0, 3.0, 0.0),
        ];
        assert_relative_eq!(bisector_heading(&origin, &vertices, 1e-6), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bisector_sweep_stays_in_range() {
        let origin = Point3::origin();
        for step in 0..72 {
            let a = (step as f64 * 5.0).to_radians();
            let b = a + 60f64.to_radians();
            let vertices = vec![
                Point3::new(a.cos(), a.sin(), 0.0),
                Point3::new(2.0 * b.cos(), 2.0 * b.sin(), 0.0),
            ];
            let heading = bisector_heading(&origin, &vertices, 1e-6);
            assert!((0.0..360.0).contains(&heading));
            let expected = normalize_degrees(step as f64 * 5.0 + 30.0);
            let diff = (heading - expected).abs();
            assert!(diff < 1e-9 || (360.0 - diff) < 1e-9);
        }
    }

    #[test]
    fn test_bisector_fallbacks() {
        let origin = Point3::origin();
        assert_eq!(bisector_heading(&origin, &[origin], 1e-6), 0.0);
        assert_relative_eq!(
            bisector_heading(&origin, &[Point3::new(0.0, -2.0, 0.0)], 1e-6),
            270.0
        );
        // Opposite neighbours fall back to the nearest one
        let opposite = vec![Point3::new(-1.0, 0.0, 0.0), Point3::new(1.5, 0.0, 0.0)];
        assert_relative_eq!(bisector_heading(&origin, &opposite, 1e-6), 180.0);
    }

    #[test]
    fn test_nearest_reference_heading() {
        let origin = Point3::new(0.0, 0.0, 0.0);
        let references = vec![
            Point3::new(0.0, 5.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        // (-1,0) and (1,0) tie; the first wins
        assert_relative_eq!(nearest_reference_heading(&origin, &references).unwrap(), 180.0);
        assert!(nearest_reference_heading(&origin, &[]).is_none());
    }

    #[test]
    fn test_segment_descriptor() {
        let d = SegmentDescriptor::from_segment(&Point3::new(0.0, 0.0, 0.0), &Point3::new(2.0, 1.0, 0.0));
        assert_eq!(d.midpoint, Point3::new(1.0, 0.5, 0.0));
        assert_eq!(d.slope, Slope::Finite(0.5));

        let v = SegmentDescriptor::from_segment(&Point3::new(1.0, 0.0, 0.0), &Point3::new(1.0, 3.0, 0.0));
        assert_eq!(v.slope, Slope::Vertical);
    }
}
