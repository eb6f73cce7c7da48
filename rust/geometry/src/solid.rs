// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Prism builders for slabs, window layers and other box-like solids
//!
//! A prism is built from a [`CornerQuad`] footprint: the ring is optionally
//! shrunk ("thin" prism), moved along the extrusion axis by an offset and
//! swept by the height into an 8-vertex, 6-face hexahedron.

use crate::error::{Error, Result};
use crate::footprint::CornerQuad;
use crate::mesh::{Face, Mesh};
use crate::normals::recompute_outward_normals;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

/// Direction a prism is swept along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtrusionAxis {
    /// World +Z
    #[default]
    Z,
    /// `(v1 - v0) x (v2 - v0)` of the footprint ring
    FootprintNormal,
}

/// Immutable description of an extruded rectangular solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prism {
    pub height: f64,
    pub offset: f64,
    pub axis: ExtrusionAxis,
    /// Fraction of the footprint's shorter side that is kept
    pub thickness_ratio: f64,
}

impl Prism {
    pub fn new(height: f64) -> Self {
        Self {
            height,
            offset: 0.0,
            axis: ExtrusionAxis::Z,
            thickness_ratio: 1.0,
        }
    }

    /// Move the base along the extrusion axis
    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Sweep along the footprint normal instead of +Z
    pub fn along_normal(mut self) -> Self {
        self.axis = ExtrusionAxis::FootprintNormal;
        self
    }

    /// Shrink the footprint's shorter side to `ratio` of its length
    pub fn thin(mut self, ratio: f64) -> Self {
        self.thickness_ratio = ratio;
        self
    }

    /// Build the closed hexahedron with every face wound outward
    pub fn build(&self, corners: &CornerQuad) -> Result<Mesh> {
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(Error::InvalidExtrusion(format!(
                "prism height must be positive, got {}",
                self.height
            )));
        }
        if !self.offset.is_finite() {
            return Err(Error::InvalidExtrusion(format!(
                "prism offset must be finite, got {}",
                self.offset
            )));
        }
        if !(self.thickness_ratio > 0.0 && self.thickness_ratio <= 1.0) {
            return Err(Error::InvalidExtrusion(format!(
                "thickness ratio must be in (0, 1], got {}",
                self.thickness_ratio
            )));
        }

        let ring = shrink_ring(corners, self.thickness_ratio);
        let direction = match self.axis {
            ExtrusionAxis::Z => Vector3::z(),
            ExtrusionAxis::FootprintNormal => {
                let normal = (ring[1] - ring[0]).cross(&(ring[2] - ring[0]));
                let len = normal.norm();
                if len < 1e-12 {
                    return Err(Error::Degenerate(
                        "footprint has no normal".to_string(),
                    ));
                }
                normal / len
            }
        };

        let base_shift = direction * self.offset;
        let top_shift = direction * (self.offset + self.height);
        let mut vertices: Vec<Point3<f64>> = ring.iter().map(|p| p + base_shift).collect();
        vertices.extend(ring.iter().map(|p| p + top_shift));

        let faces: Vec<Face> = vec![
            smallvec![0, 1, 2, 3], // base
            smallvec![4, 5, 6, 7], // top
            smallvec![0, 1, 5, 4],
            smallvec![1, 2, 6, 5],
            smallvec![2, 3, 7, 6],
            smallvec![3, 0, 4, 7],
        ];

        let mut mesh = Mesh::from_faces(vertices, faces)?;
        recompute_outward_normals(&mut mesh);
        Ok(mesh)
    }
}

/// Footprint ring with its shorter side scaled about the centre
fn shrink_ring(corners: &CornerQuad, ratio: f64) -> [Point3<f64>; 4] {
    let ring = corners.ring();
    if ratio >= 1.0 {
        return ring;
    }

    let across = if corners.width() <= corners.depth() {
        ring[1] - ring[0]
    } else {
        ring[3] - ring[0]
    };
    let len = across.norm();
    if len < 1e-12 {
        return ring;
    }
    let axis = across / len;
    let center = corners.center();

    ring.map(|p| {
        let along = (p - center).dot(&axis);
        p - axis * (along * (1.0 - ratio))
    })
}

/// Build a single prism; a `thickness_ratio` below 1 produces a thin slab
pub fn build_prism(
    corners: &CornerQuad,
    height: f64,
    offset: f64,
    thickness_ratio: f64,
) -> Result<Mesh> {
    Prism::new(height)
        .offset(offset)
        .thin(thickness_ratio)
        .build(corners)
}

/// Three prisms stacked along +Z without gaps: base, thin middle, top
pub fn build_stacked_solids(
    corners: &CornerQuad,
    base_height: f64,
    mid_height: f64,
    top_height: f64,
    mid_thickness_ratio: f64,
) -> Result<[Mesh; 3]> {
    let base = Prism::new(base_height).build(corners)?;
    let mid = Prism::new(mid_height)
        .offset(base_height)
        .thin(mid_thickness_ratio)
        .build(corners)?;
    let top = Prism::new(top_height)
        .offset(base_height + mid_height)
        .build(corners)?;
    Ok([base, mid, top])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::axis_aligned_corners;
    use approx::assert_relative_eq;

    fn window_corners() -> CornerQuad {
        axis_aligned_corners(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.2, 0.0, 0.0),
            Point3::new(1.2, 0.3, 0.0),
            Point3::new(0.0, 0.3, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_prism_is_closed_and_outward() {
        let mesh = Prism::new(2.0).build(&window_corners()).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.edge_count(), 12);
        assert_relative_eq!(mesh.signed_volume(), 1.2 * 0.3 * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_prism_is_deterministic() {
        let corners = window_corners();
        let a = build_prism(&corners, 1.3, 0.9, 1.0 / 6.0).unwrap();
        let b = build_prism(&corners, 1.3, 0.9, 1.0 / 6.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_thin_prism_shrinks_shorter_side() {
        let mesh = build_prism(&window_corners(), 1.0, 0.0, 0.5).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(max.x - min.x, 1.2, epsilon = 1e-12);
        assert_relative_eq!(max.y - min.y, 0.15, epsilon = 1e-12);
        assert_relative_eq!((max.y + min.y) / 2.0, 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_along_normal() {
        let corners = window_corners();
        let slab = Prism::new(0.1).offset(-0.1).along_normal().build(&corners).unwrap();
        let (min, max) = slab.bounds().unwrap();
        assert_relative_eq!(min.z, -0.1, epsilon = 1e-12);
        assert_relative_eq!(max.z, 0.0, epsilon = 1e-12);
        assert!(slab.signed_volume() > 0.0);
    }

    #[test]
    fn test_stacked_solids_have_no_gaps() {
        let [base, mid, top] = build_stacked_solids(&window_corners(), 0.9, 1.3, 0.5, 1.0 / 6.0).unwrap();
        let z_range = |m: &Mesh| {
            let (min, max) = m.bounds().unwrap();
            (min.z, max.z)
        };
        assert_eq!(z_range(&base), (0.0, 0.9));
        assert_relative_eq!(z_range(&mid).0, 0.9);
        assert_relative_eq!(z_range(&mid).1, 2.2, epsilon = 1e-12);
        assert_relative_eq!(z_range(&top).0, 2.2, epsilon = 1e-12);
        assert_relative_eq!(z_range(&top).1, 2.7, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let corners = window_corners();
        assert!(Prism::new(0.0).build(&corners).is_err());
        assert!(Prism::new(1.0).thin(0.0).build(&corners).is_err());
        assert!(Prism::new(1.0).thin(1.5).build(&corners).is_err());

        let flat = CornerQuad::from_ring([Point3::origin(); 4]);
        assert!(matches!(
            Prism::new(1.0).along_normal().build(&flat),
            Err(Error::Degenerate(_))
        ));
    }
}
