// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loose-part decomposition
//!
//! A loose part is a maximal set of vertices connected through edges or
//! faces. Fragments come out ordered by their lowest vertex index, which is
//! deterministic for a given input but carries no meaning of its own; callers
//! re-derive identity from the fragment geometry.

use crate::mesh::{Face, Mesh};
use rustc_hash::FxHashMap;

fn find(parent: &mut [usize], x: usize) -> usize {
    let mut root = x;
    while parent[root] != root {
        root = parent[root];
    }
    // Path compression
    let mut node = x;
    while parent[node] != root {
        let next = parent[node];
        parent[node] = root;
        node = next;
    }
    root
}

fn union(parent: &mut [usize], rank: &mut [usize], x: usize, y: usize) {
    let rx = find(parent, x);
    let ry = find(parent, y);
    if rx == ry {
        return;
    }
    if rank[rx] < rank[ry] {
        parent[rx] = ry;
    } else if rank[rx] > rank[ry] {
        parent[ry] = rx;
    } else {
        parent[ry] = rx;
        rank[rx] += 1;
    }
}

/// Label every vertex with the index of its loose part.
///
/// Returns the per-vertex labels and the number of parts. Labels are
/// assigned in order of each part's lowest vertex index.
pub fn loose_part_labels(mesh: &Mesh) -> (Vec<usize>, usize) {
    let n = mesh.vertex_count();
    let mut parent: Vec<usize> = (0..n).collect();
    let mut rank = vec![0usize; n];

    for e in &mesh.edges {
        union(&mut parent, &mut rank, e[0] as usize, e[1] as usize);
    }
    for face in &mesh.faces {
        for w in face.windows(2) {
            union(&mut parent, &mut rank, w[0] as usize, w[1] as usize);
        }
    }

    let mut label_of_root: FxHashMap<usize, usize> = FxHashMap::default();
    let mut labels = Vec::with_capacity(n);
    for v in 0..n {
        let root = find(&mut parent, v);
        let next = label_of_root.len();
        labels.push(*label_of_root.entry(root).or_insert(next));
    }

    let count = label_of_root.len();
    (labels, count)
}

/// Split a mesh into one fragment per loose part.
///
/// Each fragment keeps its vertices in their original relative order and
/// the edges, faces and UVs that belong to it.
pub fn split_by_connectivity(mesh: &Mesh) -> Vec<Mesh> {
    let (labels, count) = loose_part_labels(mesh);
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![mesh.clone()];
    }

    let mut parts: Vec<Mesh> = (0..count).map(|_| Mesh::new()).collect();
    let mut local_index = vec![0u32; mesh.vertex_count()];
    for (v, &label) in labels.iter().enumerate() {
        local_index[v] = parts[label].add_vertex(mesh.vertices[v]);
    }

    for e in &mesh.edges {
        let label = labels[e[0] as usize];
        parts[label]
            .edges
            .push([local_index[e[0] as usize], local_index[e[1] as usize]]);
    }

    let keep_uvs = mesh.face_uvs.is_some();
    if keep_uvs {
        for part in &mut parts {
            part.face_uvs = Some(Vec::new());
        }
    }

    for (fi, face) in mesh.faces.iter().enumerate() {
        let Some(&first) = face.first() else {
            continue;
        };
        let label = labels[first as usize];
        let local: Face = face.iter().map(|&i| local_index[i as usize]).collect();
        parts[label].faces.push(local);
        if let (Some(src), Some(dst)) = (mesh.face_uvs.as_ref(), parts[label].face_uvs.as_mut()) {
            dst.push(src[fi].clone());
        }
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::unit_box;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_single_part_is_returned_whole() {
        let mesh = unit_box(1.0);
        let parts = split_by_connectivity(&mesh);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0], mesh);
    }

    #[test]
    fn test_two_boxes_split_apart() {
        let mut mesh = unit_box(1.0);
        let mut other = unit_box(2.0);
        other.translate(&Vector3::new(10.0, 0.0, 0.0));
        mesh.merge(&other);

        let parts = split_by_connectivity(&mesh);

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], unit_box(1.0));
        assert_eq!(parts[1].vertex_count(), 8);
        assert_eq!(parts[1].face_count(), 6);
        assert_eq!(parts[1].edge_count(), 12);
        assert!(parts[1].validate().is_ok());
        assert_eq!(parts[1].vertices[0], Point3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_edge_chains_and_loose_vertices() {
        let mut mesh = Mesh::new();
        for i in 0..5 {
            mesh.add_vertex(Point3::new(i as f64, 0.0, 0.0));
        }
        // 0-2 chained through 1, 3 isolated, 4 isolated
        mesh.add_edge(2, 1);
        mesh.add_edge(0, 1);

        let (labels, count) = loose_part_labels(&mesh);
        assert_eq!(count, 3);
        assert_eq!(labels, vec![0, 0, 0, 1, 2]);

        let parts = split_by_connectivity(&mesh);
        assert_eq!(parts[0].edge_count(), 2);
        assert_eq!(parts[1].vertex_count(), 1);
    }

    #[test]
    fn test_empty_mesh_has_no_parts() {
        assert!(split_by_connectivity(&Mesh::new()).is_empty());
    }
}
