// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rectangular footprints of point sets on the XY plane
//!
//! Two producers share one corner convention: the quad is described in its
//! own frame, `u` along the bottom edge and `v` rotated 90 degrees
//! counter-clockwise from `u`. `bottom_left` is the (min u, min v) corner, so
//! `ring()` always walks the footprint counter-clockwise seen from +Z.

use crate::error::{Error, Result};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Four coplanar corners of a rectangular footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerQuad {
    pub top_left: Point3<f64>,
    pub top_right: Point3<f64>,
    pub bottom_left: Point3<f64>,
    pub bottom_right: Point3<f64>,
}

impl CornerQuad {
    /// Corners in winding order: bottom-left, bottom-right, top-right, top-left
    pub fn ring(&self) -> [Point3<f64>; 4] {
        [
            self.bottom_left,
            self.bottom_right,
            self.top_right,
            self.top_left,
        ]
    }

    /// Build a quad from a ring in winding order
    pub fn from_ring(ring: [Point3<f64>; 4]) -> Self {
        Self {
            bottom_left: ring[0],
            bottom_right: ring[1],
            top_right: ring[2],
            top_left: ring[3],
        }
    }

    /// Length of the bottom edge
    pub fn width(&self) -> f64 {
        (self.bottom_right - self.bottom_left).norm()
    }

    /// Length of the left edge
    pub fn depth(&self) -> f64 {
        (self.top_left - self.bottom_left).norm()
    }

    /// Area of the XY projection
    pub fn area(&self) -> f64 {
        let ring = self.ring();
        let mut area = 0.0;
        for i in 0..4 {
            let (p, q) = (ring[i], ring[(i + 1) % 4]);
            area += p.x * q.y - q.x * p.y;
        }
        area.abs() / 2.0
    }

    pub fn center(&self) -> Point3<f64> {
        let sum = self
            .ring()
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / 4.0)
    }
}

/// Convex hull of 2D points (Andrew's monotone chain)
///
/// Returns the hull counter-clockwise without collinear points. Fewer than
/// three distinct input points yield those points.
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut sorted: Vec<Point2<f64>> = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(sorted.len() * 2);
    // Lower hull
    for p in &sorted {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    // Upper hull
    let lower_len = hull.len() + 1;
    for p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Minimum-area rectangle enclosing the XY projection of `points`
///
/// Rotating calipers over the convex hull: the optimal rectangle has one
/// side collinear with a hull edge. The rectangle frame is normalised so
/// that `u` points at an angle in [0, 90) degrees. Every corner sits at the
/// mean Z of the input; per-vertex Z variation is not preserved.
pub fn minimal_rotated_footprint(points: &[Point3<f64>]) -> Result<CornerQuad> {
    let projected: Vec<Point2<f64>> = points.iter().map(|p| Point2::new(p.x, p.y)).collect();
    let hull = convex_hull(&projected);
    if hull.len() < 3 {
        return Err(Error::Degenerate(format!(
            "footprint needs 3 non-collinear points, found {} hull points",
            hull.len()
        )));
    }

    let z = points.iter().map(|p| p.z).sum::<f64>() / points.len() as f64;

    let mut best_angle = 0.0;
    let mut best_area = f64::INFINITY;
    for i in 0..hull.len() {
        let edge = hull[(i + 1) % hull.len()] - hull[i];
        let angle = edge.y.atan2(edge.x);
        let (u_range, v_range) = extents(&hull, angle);
        let area = (u_range.1 - u_range.0) * (v_range.1 - v_range.0);
        if area < best_area {
            best_area = area;
            best_angle = angle;
        }
    }

    let mut angle = best_angle.rem_euclid(FRAC_PI_2);
    if FRAC_PI_2 - angle < 1e-12 {
        angle = 0.0;
    }
    let (u_range, v_range) = extents(&hull, angle);
    let u = Vector2::new(angle.cos(), angle.sin());
    let v = Vector2::new(-u.y, u.x);

    let corner = |a: f64, b: f64| {
        let p = u * a + v * b;
        Point3::new(p.x, p.y, z)
    };

    Ok(CornerQuad {
        bottom_left: corner(u_range.0, v_range.0),
        bottom_right: corner(u_range.1, v_range.0),
        top_right: corner(u_range.1, v_range.1),
        top_left: corner(u_range.0, v_range.1),
    })
}

/// (min, max) projections of `hull` onto the frame rotated by `angle`
fn extents(hull: &[Point2<f64>], angle: f64) -> ((f64, f64), (f64, f64)) {
    let u = Vector2::new(angle.cos(), angle.sin());
    let v = Vector2::new(-u.y, u.x);
    let mut u_range = (f64::INFINITY, f64::NEG_INFINITY);
    let mut v_range = (f64::INFINITY, f64::NEG_INFINITY);
    for p in hull {
        let a = p.coords.dot(&u);
        let b = p.coords.dot(&v);
        u_range = (u_range.0.min(a), u_range.1.max(a));
        v_range = (v_range.0.min(b), v_range.1.max(b));
    }
    (u_range, v_range)
}

/// Axis-aligned footprint corners at the minimum Z of `points`
pub fn axis_aligned_corners(points: &[Point3<f64>]) -> Result<CornerQuad> {
    let first = points
        .first()
        .ok_or_else(|| Error::Degenerate("footprint of an empty point set".to_string()))?;

    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_y, mut max_y) = (first.y, first.y);
    let mut base_z = first.z;
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
        base_z = base_z.min(p.z);
    }

    Ok(CornerQuad {
        top_left: Point3::new(min_x, max_y, base_z),
        top_right: Point3::new(max_x, max_y, base_z),
        bottom_left: Point3::new(min_x, min_y, base_z),
        bottom_right: Point3::new(max_x, min_y, base_z),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation2;

    fn rectangle(w: f64, h: f64, angle_deg: f64, offset: Vector2<f64>) -> Vec<Point3<f64>> {
        let rot = Rotation2::new(angle_deg.to_radians());
        [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h), (w / 2.0, h / 2.0)]
            .iter()
            .map(|&(x, y)| {
                let p = rot * Point2::new(x, y) + offset;
                Point3::new(p.x, p.y, 1.5)
            })
            .collect()
    }

    #[test]
    fn test_convex_hull_drops_interior_and_collinear() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
            Point2::new(1.0, 1.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!(crate::triangulation::signed_area(&hull) > 0.0);
    }

    #[test]
    fn test_rotated_rectangle_is_recovered() {
        let points = rectangle(3.0, 1.0, 30.0, Vector2::new(5.0, -2.0));
        let quad = minimal_rotated_footprint(&points).unwrap();

        assert_relative_eq!(quad.area(), 3.0, epsilon = 1e-9);
        let mut sides = [quad.width(), quad.depth()];
        sides.sort_by(f64::total_cmp);
        assert_relative_eq!(sides[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(sides[1], 3.0, epsilon = 1e-9);
        for corner in quad.ring() {
            assert_relative_eq!(corner.z, 1.5);
        }
    }

    #[test]
    fn test_ring_is_counter_clockwise() {
        let points = rectangle(2.0, 1.0, 75.0, Vector2::zeros());
        let ring = minimal_rotated_footprint(&points).unwrap().ring();
        let projected: Vec<_> = ring.iter().map(|p| Point2::new(p.x, p.y)).collect();
        assert!(crate::triangulation::signed_area(&projected) > 0.0);
    }

    #[test]
    fn test_rotated_area_never_exceeds_axis_aligned() {
        let shapes = [(3.0, 1.0), (1.0, 1.0), (5.0, 0.2), (0.7, 2.3)];
        for (w, h) in shapes {
            for step in 0..36 {
                let points = rectangle(w, h, step as f64 * 10.0 + 3.0, Vector2::new(1.0, 2.0));
                let rotated = minimal_rotated_footprint(&points).unwrap();
                let aligned = axis_aligned_corners(&points).unwrap();
                assert!(rotated.area() <= aligned.area() + 1e-9);
            }
        }
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ];
        assert!(matches!(
            minimal_rotated_footprint(&points),
            Err(Error::Degenerate(_))
        ));
    }

    #[test]
    fn test_axis_aligned_corners() {
        let points = vec![
            Point3::new(1.0, 2.0, 0.5),
            Point3::new(4.0, 3.0, 0.2),
            Point3::new(2.0, 5.0, 0.9),
        ];
        let quad = axis_aligned_corners(&points).unwrap();
        assert_eq!(quad.bottom_left, Point3::new(1.0, 2.0, 0.2));
        assert_eq!(quad.top_right, Point3::new(4.0, 5.0, 0.2));
        assert_eq!(quad.top_left, Point3::new(1.0, 5.0, 0.2));
        assert_eq!(quad.bottom_right, Point3::new(4.0, 2.0, 0.2));
        assert!(axis_aligned_corners(&[]).is_err());
    }
}
