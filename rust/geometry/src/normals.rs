// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consistent outward face winding

use crate::extrusion::face_edges;
use crate::mesh::{face_signed_volume, Mesh};
use nalgebra::Point3;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Relative tolerance below which a component's volume counts as zero
const VOLUME_EPSILON: f64 = 1e-9;

/// Rewind every face so that its normal points away from the interior.
///
/// Faces are grouped into edge-connected components. Within a component the
/// winding is propagated from the first face so that every shared edge is
/// traversed in opposite directions by its two faces. The component is then
/// flipped as a whole when its signed volume, measured about the component's
/// own centroid, is negative. Components with no measurable volume keep the
/// propagated winding. Applying the function twice gives the same winding
/// as applying it once. Returns the number of faces whose winding changed.
pub fn recompute_outward_normals(mesh: &mut Mesh) -> usize {
    let face_count = mesh.faces.len();
    if face_count == 0 {
        return 0;
    }

    let mut edge_faces: FxHashMap<[u32; 2], Vec<usize>> = FxHashMap::default();
    for (fi, face) in mesh.faces.iter().enumerate() {
        for (a, b) in face_edges(face) {
            edge_faces.entry([a.min(b), a.max(b)]).or_default().push(fi);
        }
    }

    let original = mesh.faces.clone();
    let mut visited = vec![false; face_count];

    for seed in 0..face_count {
        if visited[seed] {
            continue;
        }

        let mut component = vec![seed];
        let mut queue = VecDeque::from([seed]);
        visited[seed] = true;

        while let Some(f) = queue.pop_front() {
            let face = mesh.faces[f].clone();
            for (a, b) in face_edges(&face) {
                let Some(neighbours) = edge_faces.get(&[a.min(b), a.max(b)]) else {
                    continue;
                };
                for &g in neighbours {
                    if visited[g] {
                        continue;
                    }
                    // A consistent neighbour walks the shared edge as b -> a
                    if face_edges(&mesh.faces[g]).any(|(x, y)| x == a && y == b) {
                        mesh.faces[g].reverse();
                    }
                    visited[g] = true;
                    component.push(g);
                    queue.push_back(g);
                }
            }
        }

        if component_volume(mesh, &component) < 0.0 {
            for &f in &component {
                mesh.faces[f].reverse();
            }
        }
    }

    let changed = mesh
        .faces
        .iter()
        .zip(&original)
        .filter(|(now, before)| now != before)
        .count();

    if changed > 0 {
        if let Some(uvs) = mesh.face_uvs.as_mut() {
            for (uv, (now, before)) in uvs.iter_mut().zip(mesh.faces.iter().zip(&original)) {
                if now != before {
                    uv.reverse();
                }
            }
        }
    }

    changed
}

/// Signed volume of a face component about its centroid, snapped to zero
/// when it is negligible for the component's size
fn component_volume(mesh: &Mesh, component: &[usize]) -> f64 {
    let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
    let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
    let mut sum = nalgebra::Vector3::zeros();
    let mut count = 0usize;

    for &f in component {
        for &i in &mesh.faces[f] {
            let p = mesh.vertices[i as usize];
            min = min.inf(&p);
            max = max.sup(&p);
            sum += p.coords;
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }

    let center = sum / count as f64;
    let local: Vec<Point3<f64>> = mesh.vertices.iter().map(|p| p - center).collect();
    let volume: f64 = component
        .iter()
        .map(|&f| face_signed_volume(&local, &mesh.faces[f]))
        .sum();

    let extent = (max - min).norm();
    if volume.abs() <= VOLUME_EPSILON * extent * extent * extent {
        0.0
    } else {
        volume
    }
}
