// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merge-by-distance vertex welding

use crate::mesh::{Face, Mesh};
use nalgebra::Point3;
use rustc_hash::{FxHashMap, FxHashSet};

type Cell = (i64, i64, i64);

#[inline]
fn cell_of(p: &Point3<f64>, size: f64) -> Cell {
    (
        (p.x / size).floor() as i64,
        (p.y / size).floor() as i64,
        (p.z / size).floor() as i64,
    )
}

/// Collapse vertices closer than `threshold` onto the first one seen.
///
/// Edges and faces are remapped. Collapsed edges, faces left with fewer than
/// three distinct corners and duplicated edges/faces are dropped, and the
/// vertex array is compacted. Returns the number of removed vertices.
/// A non-positive threshold leaves the mesh untouched.
pub fn merge_by_distance(mesh: &mut Mesh, threshold: f64) -> usize {
    if threshold <= 0.0 || mesh.vertex_count() < 2 {
        return 0;
    }

    let threshold_sq = threshold * threshold;
    let mut grid: FxHashMap<Cell, Vec<u32>> = FxHashMap::default();
    // Index of the surviving vertex each original vertex maps onto
    let mut target: Vec<u32> = Vec::with_capacity(mesh.vertex_count());

    for (i, p) in mesh.vertices.iter().enumerate() {
        let (cx, cy, cz) = cell_of(p, threshold);
        let mut found = None;

        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &kept in bucket {
                        if (mesh.vertices[kept as usize] - p).norm_squared() < threshold_sq {
                            found = Some(kept);
                            break 'search;
                        }
                    }
                }
            }
        }

        match found {
            Some(kept) => target.push(kept),
            None => {
                grid.entry((cx, cy, cz)).or_default().push(i as u32);
                target.push(i as u32);
            }
        }
    }

    // Compact the surviving vertices
    let mut compact: Vec<u32> = vec![u32::MAX; mesh.vertex_count()];
    let mut vertices = Vec::with_capacity(mesh.vertex_count());
    for (i, &t) in target.iter().enumerate() {
        if t as usize == i {
            compact[i] = vertices.len() as u32;
            vertices.push(mesh.vertices[i]);
        }
    }
    let remap = |i: u32| compact[target[i as usize] as usize];

    let removed = mesh.vertex_count() - vertices.len();
    if removed == 0 {
        return 0;
    }

    let mut seen_faces: FxHashSet<Vec<u32>> = FxHashSet::default();
    let mut faces = Vec::with_capacity(mesh.faces.len());
    for face in &mesh.faces {
        let mut remapped: Face = Face::new();
        for &i in face {
            let r = remap(i);
            if remapped.last() != Some(&r) {
                remapped.push(r);
            }
        }
        while remapped.len() > 1 && remapped.first() == remapped.last() {
            remapped.pop();
        }
        let distinct: FxHashSet<u32> = remapped.iter().copied().collect();
        if distinct.len() < 3 {
            continue;
        }
        let mut key: Vec<u32> = remapped.to_vec();
        key.sort_unstable();
        if seen_faces.insert(key) {
            faces.push(remapped);
        }
    }

    let mut seen_edges: FxHashSet<[u32; 2]> = FxHashSet::default();
    let mut edges = Vec::with_capacity(mesh.edges.len());
    for e in &mesh.edges {
        let (a, b) = (remap(e[0]), remap(e[1]));
        if a == b {
            continue;
        }
        let key = [a.min(b), a.max(b)];
        if seen_edges.insert(key) {
            edges.push(key);
        }
    }

    mesh.vertices = vertices;
    mesh.faces = faces;
    mesh.edges = edges;
    mesh.face_uvs = None;

    removed
}
