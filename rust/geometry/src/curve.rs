// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar curve data and curve-to-mesh tessellation
//!
//! Curves arrive from the drafting export as groups of splines. Tessellation
//! turns every spline into a vertex chain with edges, and fills closed
//! splines with faces. A closed spline that encloses other closed splines is
//! filled as a polygon with holes.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::{point_in_polygon, signed_area, triangulate_polygon_with_holes};
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Default number of samples per Bezier segment
pub const DEFAULT_BEZIER_RESOLUTION: u32 = 12;

/// One control point of a Bezier spline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierKnot {
    pub co: Point3<f64>,
    pub handle_left: Point3<f64>,
    pub handle_right: Point3<f64>,
}

impl BezierKnot {
    /// Knot whose handles sit on the control point (a sharp corner)
    pub fn sharp(co: Point3<f64>) -> Self {
        Self {
            co,
            handle_left: co,
            handle_right: co,
        }
    }
}

/// A single spline of a curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Spline {
    Poly {
        points: Vec<Point3<f64>>,
        closed: bool,
    },
    Bezier {
        knots: Vec<BezierKnot>,
        closed: bool,
        resolution: u32,
    },
}

impl Spline {
    /// Polyline spline through `points`
    pub fn poly(points: Vec<Point3<f64>>, closed: bool) -> Self {
        Spline::Poly { points, closed }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Spline::Poly { closed, .. } | Spline::Bezier { closed, .. } => *closed,
        }
    }

    /// Sample the spline into an ordered point chain.
    ///
    /// Closed splines do not repeat their first point at the end.
    pub fn sample(&self) -> Vec<Point3<f64>> {
        match self {
            Spline::Poly { points, .. } => points.clone(),
            Spline::Bezier {
                knots,
                closed,
                resolution,
            } => sample_bezier(knots, *closed, (*resolution).max(1)),
        }
    }
}

fn sample_bezier(knots: &[BezierKnot], closed: bool, resolution: u32) -> Vec<Point3<f64>> {
    if knots.len() < 2 {
        return knots.iter().map(|k| k.co).collect();
    }

    let segment_count = if closed { knots.len() } else { knots.len() - 1 };
    let mut points = Vec::with_capacity(segment_count * resolution as usize + 1);

    for s in 0..segment_count {
        let k0 = &knots[s];
        let k1 = &knots[(s + 1) % knots.len()];
        for step in 0..resolution {
            let t = step as f64 / resolution as f64;
            points.push(cubic_bezier(k0.co, k0.handle_right, k1.handle_left, k1.co, t));
        }
    }

    if !closed {
        if let Some(last) = knots.last() {
            points.push(last.co);
        }
    }

    points
}

#[inline]
fn cubic_bezier(
    p0: Point3<f64>,
    p1: Point3<f64>,
    p2: Point3<f64>,
    p3: Point3<f64>,
    t: f64,
) -> Point3<f64> {
    let u = 1.0 - t;
    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;
    Point3::from(p0.coords * b0 + p1.coords * b1 + p2.coords * b2 + p3.coords * b3)
}

/// Curve payload of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveData {
    pub splines: Vec<Spline>,
    /// Fill closed splines with faces
    #[serde(default = "default_fill")]
    pub fill_closed: bool,
}

fn default_fill() -> bool {
    true
}

impl CurveData {
    pub fn new(splines: Vec<Spline>) -> Self {
        Self {
            splines,
            fill_closed: true,
        }
    }

    /// Curve whose closed splines are tessellated as outlines only
    pub fn unfilled(splines: Vec<Spline>) -> Self {
        Self {
            splines,
            fill_closed: false,
        }
    }

    /// Move every control point and handle by `offset`
    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for spline in &mut self.splines {
            match spline {
                Spline::Poly { points, .. } => {
                    for p in points {
                        *p += offset;
                    }
                }
                Spline::Bezier { knots, .. } => {
                    for k in knots {
                        k.co += offset;
                        k.handle_left += offset;
                        k.handle_right += offset;
                    }
                }
            }
        }
    }

    /// Tessellate the curve into a mesh in the same local space.
    ///
    /// Fails when no spline has a single point to contribute.
    pub fn to_mesh(&self) -> Result<Mesh> {
        let chains: Vec<(Vec<Point3<f64>>, bool)> = self
            .splines
            .iter()
            .map(|s| (s.sample(), s.is_closed()))
            .filter(|(points, _)| !points.is_empty())
            .collect();

        if chains.is_empty() {
            return Err(Error::Conversion("curve has no renderable geometry".to_string()));
        }

        let mut mesh = Mesh::new();
        let mut loops: Vec<Vec<u32>> = Vec::new();

        for (points, closed) in &chains {
            let start = mesh.vertex_count() as u32;
            for p in points {
                mesh.add_vertex(*p);
            }
            let count = points.len() as u32;
            for i in 1..count {
                mesh.add_edge(start + i - 1, start + i);
            }
            if *closed && count > 2 {
                mesh.add_edge(start + count - 1, start);
                loops.push((start..start + count).collect());
            }
        }

        if self.fill_closed && !loops.is_empty() {
            fill_loops(&mut mesh, &loops)?;
        }

        Ok(mesh)
    }
}

/// Fill closed loops: outer loops become faces, loops nested directly inside
/// an outer loop become its holes.
fn fill_loops(mesh: &mut Mesh, loops: &[Vec<u32>]) -> Result<()> {
    let projected: Vec<Vec<Point2<f64>>> = loops
        .iter()
        .map(|l| {
            l.iter()
                .map(|&i| {
                    let p = mesh.vertices[i as usize];
                    Point2::new(p.x, p.y)
                })
                .collect()
        })
        .collect();

    // Nesting depth of each loop: the number of other loops containing it
    let depth: Vec<usize> = (0..loops.len())
        .map(|i| {
            (0..loops.len())
                .filter(|&j| j != i && point_in_polygon(&projected[i][0], &projected[j]))
                .count()
        })
        .collect();

    for outer in (0..loops.len()).filter(|&i| depth[i] % 2 == 0) {
        if signed_area(&projected[outer]).abs() < 1e-12 {
            continue;
        }

        let holes: Vec<usize> = (0..loops.len())
            .filter(|&h| {
                depth[h] == depth[outer] + 1
                    && point_in_polygon(&projected[h][0], &projected[outer])
            })
            .collect();

        let mut outer_ring = loops[outer].clone();
        if signed_area(&projected[outer]) < 0.0 {
            outer_ring.reverse();
        }

        if holes.is_empty() {
            mesh.add_face(&outer_ring);
            continue;
        }

        let ring_points: Vec<Point2<f64>> = outer_ring
            .iter()
            .map(|&i| {
                let p = mesh.vertices[i as usize];
                Point2::new(p.x, p.y)
            })
            .collect();
        let hole_points: Vec<Vec<Point2<f64>>> =
            holes.iter().map(|&h| projected[h].clone()).collect();

        let triangles = triangulate_polygon_with_holes(&ring_points, &hole_points)?;

        let mut combined: Vec<u32> = outer_ring;
        for &h in &holes {
            combined.extend_from_slice(&loops[h]);
        }
        for tri in triangles.chunks_exact(3) {
            let (a, b, c) = (combined[tri[0]], combined[tri[1]], combined[tri[2]]);
            let pa = mesh.vertices[a as usize];
            let pb = mesh.vertices[b as usize];
            let pc = mesh.vertices[c as usize];
            // Keep every triangle counter-clockwise seen from +Z
            let cross = (pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x);
            if cross >= 0.0 {
                mesh.add_face(&[a, b, c]);
            } else {
                mesh.add_face(&[a, c, b]);
            }
        }
    }

    mesh.rebuild_edges();
    Ok(())
}
