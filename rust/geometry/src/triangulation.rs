// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar polygon utilities
//!
//! Wrapper around earcutr for filling curve regions with holes, plus the
//! small 2D predicates used to sort loops into outers and holes.

use crate::error::{Error, Result};
use nalgebra::Point2;

/// Signed area of a polygon (positive when counter-clockwise)
#[inline]
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    area / 2.0
}

/// Even-odd point in polygon test
pub fn point_in_polygon(point: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (&polygon[i], &polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Fill an outer loop with holes using ear clipping
///
/// Indices refer to the outer loop's points followed by each hole's points
/// in order, three per triangle.
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if outer.len() < 3 || holes.iter().any(|h| h.len() < 3) {
        return Err(Error::Triangulation(
            "every loop needs three or more points".to_string(),
        ));
    }

    let mut hole_starts = Vec::with_capacity(holes.len());
    let mut flat: Vec<f64> = outer.iter().flat_map(|p| [p.x, p.y]).collect();
    for hole in holes {
        hole_starts.push(flat.len() / 2);
        flat.extend(hole.iter().flat_map(|p| [p.x, p.y]));
    }

    earcutr::earcut(&flat, &hole_starts, 2).map_err(|e| Error::Triangulation(format!("{:?}", e)))
}
