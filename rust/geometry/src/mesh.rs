// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon mesh data structures

use crate::error::{Error, Result};
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Vertex indices of one planar polygon, in winding order
pub type Face = SmallVec<[u32; 4]>;

/// Per-corner texture coordinates of one face
pub type FaceUv = SmallVec<[Point2<f64>; 4]>;

/// Polygon mesh in local (object) space
///
/// Edges are unordered pairs stored as `[min, max]`. Faces are planar
/// polygons of three or more vertices. UVs, when present, are aligned
/// with `faces` one entry per face corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions
    pub vertices: Vec<Point3<f64>>,
    /// Undirected edges `[a, b]` with `a < b`
    pub edges: Vec<[u32; 2]>,
    /// Polygon faces
    pub faces: Vec<Face>,
    /// Per-face-corner UV coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_uvs: Option<Vec<FaceUv>>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            face_uvs: None,
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            edges: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            face_uvs: None,
        }
    }

    /// Build a mesh from vertices and faces, deriving the edge set from the faces
    pub fn from_faces(vertices: Vec<Point3<f64>>, faces: Vec<Face>) -> Result<Self> {
        let mut mesh = Self {
            vertices,
            edges: Vec::new(),
            faces,
            face_uvs: None,
        };
        mesh.validate()?;
        mesh.rebuild_edges();
        Ok(mesh)
    }

    /// Add a vertex and return its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.vertices.push(position);
        (self.vertices.len() - 1) as u32
    }

    /// Add an undirected edge. Self-loops are ignored.
    #[inline]
    pub fn add_edge(&mut self, a: u32, b: u32) {
        if a != b {
            self.edges.push([a.min(b), a.max(b)]);
        }
    }

    /// Add a face
    #[inline]
    pub fn add_face(&mut self, indices: &[u32]) {
        self.faces.push(Face::from_slice(indices));
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get edge count
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get face count
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Check that every edge and face index refers to an existing vertex
    pub fn validate(&self) -> Result<()> {
        let len = self.vertices.len();
        let out_of_range = self
            .edges
            .iter()
            .flat_map(|e| e.iter())
            .chain(self.faces.iter().flat_map(|f| f.iter()))
            .find(|&&i| i as usize >= len);
        match out_of_range {
            Some(&index) => Err(Error::InvalidIndex { index, len }),
            None => Ok(()),
        }
    }

    /// Recompute the edge set as the union of the face boundaries and the
    /// existing loose edges, without duplicates
    pub fn rebuild_edges(&mut self) {
        let mut seen: FxHashSet<[u32; 2]> = FxHashSet::default();
        let mut edges = Vec::with_capacity(self.edges.len() + self.faces.len() * 4);

        let face_edges = self.faces.iter().flat_map(|face| {
            let n = face.len();
            (0..n).map(move |i| (face[i], face[(i + 1) % n]))
        });
        let loose = self.edges.iter().map(|e| (e[0], e[1]));

        for (a, b) in face_edges.chain(loose) {
            if a == b {
                continue;
            }
            let key = [a.min(b), a.max(b)];
            if seen.insert(key) {
                edges.push(key);
            }
        }

        self.edges = edges;
    }

    /// Merge another mesh into this one
    ///
    /// UVs do not survive a merge; reproject after joining.
    pub fn merge(&mut self, other: &Mesh) {
        self.merge_transformed(other, &Matrix4::identity());
    }

    /// Merge another mesh, mapping its vertices through `transform` first
    pub fn merge_transformed(&mut self, other: &Mesh, transform: &Matrix4<f64>) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertices.len() as u32;

        self.vertices.reserve(other.vertices.len());
        self.edges.reserve(other.edges.len());
        self.faces.reserve(other.faces.len());

        self.vertices
            .extend(other.vertices.iter().map(|p| transform.transform_point(p)));
        self.edges.extend(
            other
                .edges
                .iter()
                .map(|e| [e[0] + vertex_offset, e[1] + vertex_offset]),
        );
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| f.iter().map(|&i| i + vertex_offset).collect::<Face>()),
        );
        self.face_uvs = None;
    }

    /// Apply a transform to every vertex in place
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for v in &mut self.vertices {
            *v = matrix.transform_point(v);
        }
        // Mirroring transforms flip the winding
        if matrix.fixed_view::<3, 3>(0, 0).clone_owned().determinant() < 0.0 {
            for face in &mut self.faces {
                face.reverse();
            }
        }
    }

    /// Translate every vertex
    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Calculate bounds (min, max), or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;
        let mut min = *first;
        let mut max = *first;

        for v in &self.vertices[1..] {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        Some((min, max))
    }

    /// Centre of the bounding box
    pub fn bounds_center(&self) -> Option<Point3<f64>> {
        self.bounds().map(|(min, max)| nalgebra::center(&min, &max))
    }

    /// Average of all vertex positions
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.is_empty() {
            return None;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Some(Point3::from(sum / self.vertices.len() as f64))
    }

    /// Unnormalized face normal using Newell's method
    ///
    /// The length is twice the polygon area, the direction follows the
    /// right-hand rule relative to the winding.
    pub fn face_area_vector(&self, face: &[u32]) -> Vector3<f64> {
        let n = face.len();
        let mut normal = Vector3::zeros();
        for i in 0..n {
            let curr = &self.vertices[face[i] as usize];
            let next = &self.vertices[face[(i + 1) % n] as usize];
            normal.x += (curr.y - next.y) * (curr.z + next.z);
            normal.y += (curr.z - next.z) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
        }
        normal
    }

    /// Unit face normal, or `None` for a degenerate face
    pub fn face_normal(&self, face_index: usize) -> Option<Vector3<f64>> {
        let face = self.faces.get(face_index)?;
        if face.len() < 3 {
            return None;
        }
        let normal = self.face_area_vector(face);
        let len = normal.norm();
        if len < 1e-15 {
            return None;
        }
        Some(normal / len)
    }

    /// Signed volume enclosed by the faces (positive when wound outward)
    ///
    /// Sums the signed volume of the tetrahedra formed by each fan triangle
    /// and the origin. Only meaningful for closed surfaces.
    pub fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|face| face_signed_volume(&self.vertices, face))
            .sum()
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.face_uvs = None;
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed volume swept by one face's fan triangles toward the origin
pub(crate) fn face_signed_volume(vertices: &[Point3<f64>], face: &[u32]) -> f64 {
    if face.len() < 3 {
        return 0.0;
    }
    let p0 = vertices[face[0] as usize].coords;
    (1..face.len() - 1)
        .map(|i| {
            let p1 = vertices[face[i] as usize].coords;
            let p2 = vertices[face[i + 1] as usize].coords;
            p0.dot(&p1.cross(&p2))
        })
        .sum::<f64>()
        / 6.0
}
