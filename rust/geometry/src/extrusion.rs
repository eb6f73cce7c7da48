// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - sweeping a planar mesh region into a solid

use crate::error::{Error, Result};
use crate::mesh::{Face, Mesh};
use nalgebra::Vector3;
use rustc_hash::FxHashMap;

/// Extrude a whole mesh along `direction` by `distance`
///
/// Every vertex is duplicated at `vertex + direction.normalize() * distance`.
/// Faces keep a bottom copy and gain an offset top copy, boundary edges of
/// the face region and loose edges are stitched with side quads, and loose
/// vertices become vertical edges. Bottom, top and sides are wound outward
/// for a face region whose normal agrees with the direction as well as for
/// one that opposes it.
pub fn extrude(mesh: &Mesh, direction: &Vector3<f64>, distance: f64) -> Result<Mesh> {
    if !distance.is_finite() || distance == 0.0 {
        return Err(Error::InvalidExtrusion(format!(
            "distance must be finite and non-zero, got {}",
            distance
        )));
    }
    let len = direction.norm();
    if !len.is_finite() || len < 1e-12 {
        return Err(Error::InvalidExtrusion(
            "direction must be a non-zero vector".to_string(),
        ));
    }
    mesh.validate()?;

    let offset = direction / len * distance;
    let n = mesh.vertex_count() as u32;

    let mut out = Mesh::with_capacity(
        mesh.vertex_count() * 2,
        mesh.face_count() * 2 + mesh.edge_count(),
    );
    out.vertices.extend_from_slice(&mesh.vertices);
    out.vertices
        .extend(mesh.vertices.iter().map(|v| v + offset));

    // How many faces use each undirected edge
    let mut face_use: FxHashMap<[u32; 2], u32> = FxHashMap::default();
    for face in &mesh.faces {
        for (a, b) in face_edges(face) {
            *face_use.entry([a.min(b), a.max(b)]).or_insert(0) += 1;
        }
    }

    let mut connected = vec![false; mesh.vertex_count()];

    for face in &mesh.faces {
        let facing = mesh.face_area_vector(face).dot(&offset);
        let mut bottom = face.clone();
        let mut top: Face = face.iter().map(|&i| i + n).collect();
        if facing >= 0.0 {
            bottom.reverse();
        } else {
            top.reverse();
        }
        out.faces.push(bottom);
        out.faces.push(top);

        for (a, b) in face_edges(face) {
            connected[a as usize] = true;
            if face_use.get(&[a.min(b), a.max(b)]) != Some(&1) {
                continue;
            }
            if facing >= 0.0 {
                out.add_face(&[a, b, b + n, a + n]);
            } else {
                out.add_face(&[b, a, a + n, b + n]);
            }
        }
    }

    for e in &mesh.edges {
        let (a, b) = (e[0], e[1]);
        connected[a as usize] = true;
        connected[b as usize] = true;
        if face_use.contains_key(e) {
            continue;
        }
        out.add_face(&[a, b, b + n, a + n]);
    }

    for (i, &c) in connected.iter().enumerate() {
        if !c {
            out.add_edge(i as u32, i as u32 + n);
        }
    }

    out.rebuild_edges();
    Ok(out)
}

/// Directed edges of a face in winding order
#[inline]
pub(crate) fn face_edges(face: &[u32]) -> impl Iterator<Item = (u32, u32)> + '_ {
    let n = face.len();
    (0..n).map(move |i| (face[i], face[(i + 1) % n]))
}
