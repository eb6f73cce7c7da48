// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cube (box) UV projection

use crate::mesh::{FaceUv, Mesh};
use nalgebra::Point2;

/// Project every face onto the axis plane most orthogonal to its normal and
/// scale all UVs uniformly into the unit square.
///
/// Uniform scaling keeps the texel aspect ratio. Faces with no measurable
/// normal are projected onto the XY plane.
pub fn apply_cube_uv(mesh: &mut Mesh) {
    let mut uvs: Vec<FaceUv> = Vec::with_capacity(mesh.faces.len());

    for face in &mesh.faces {
        let n = mesh.face_area_vector(face);
        let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());
        let uv: FaceUv = face
            .iter()
            .map(|&i| {
                let p = mesh.vertices[i as usize];
                if ax > ay && ax > az {
                    Point2::new(p.y, p.z)
                } else if ay > az {
                    Point2::new(p.x, p.z)
                } else {
                    Point2::new(p.x, p.y)
                }
            })
            .collect();
        uvs.push(uv);
    }

    let mut min = Point2::new(f64::MAX, f64::MAX);
    let mut max = Point2::new(f64::MIN, f64::MIN);
    for p in uvs.iter().flatten() {
        min = min.inf(p);
        max = max.sup(p);
    }

    let span = (max.x - min.x).max(max.y - min.y);
    if span > 1e-12 {
        for p in uvs.iter_mut().flatten() {
            *p = Point2::from((*p - min) / span);
        }
    }

    mesh.face_uvs = Some(uvs);
}
