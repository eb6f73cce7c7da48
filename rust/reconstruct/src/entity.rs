// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene entities: named geometry with a world transform and element metadata

use crate::error::{ReconstructError, Result};
use crate::naming::{format_number, round_to};
use crate::orientation::{SegmentDescriptor, Slope};
use nalgebra::{Matrix4, Point3, Vector3};
use plan3d_geometry::transform;
use plan3d_geometry::{CurveData, Mesh};
use serde::{Deserialize, Serialize};

/// Decimals of headings in exported names
const HEADING_DECIMALS: u32 = 2;

/// Decimals of furniture dimensions in exported names
const DIMENSION_DECIMALS: u32 = 3;

/// Geometry payload of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Geometry {
    Curve(CurveData),
    Mesh(Mesh),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Curve,
    Mesh,
}

/// Semantic role of an entity in the reconstructed building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Unclassified,
    Wall,
    Door,
    DoorFrame,
    WindowBase,
    WindowPane,
    WindowTop,
    Furniture,
    Floor,
    Ceiling,
    Light,
    OrientationMarker,
}

/// Measured plan size of a furniture block, in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanDimensions {
    /// Extent along Y once rotated to its heading
    pub length: f64,
    /// Extent along X once rotated to its heading
    pub width: f64,
}

/// Orientation segment a marker stands for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMarker {
    /// Name of the orientation fragment the segment came from
    pub part: String,
    /// Edge index within that fragment
    pub index: usize,
    pub descriptor: SegmentDescriptor,
}

/// Structured element metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementInfo {
    pub category: Category,
    /// Heading in degrees, [0, 360)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<PlanDimensions>,
    /// Element this one belongs to, e.g. the door leaf of a frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<SegmentMarker>,
}

impl ElementInfo {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            ..Default::default()
        }
    }
}

/// A named object of the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    /// Local-to-world transform
    pub transform: Matrix4<f64>,
    pub geometry: Geometry,
    #[serde(default)]
    pub info: ElementInfo,
}

impl Entity {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::identity(),
            geometry,
            info: ElementInfo::default(),
        }
    }

    pub fn curve(name: impl Into<String>, curve: CurveData) -> Self {
        Self::new(name, Geometry::Curve(curve))
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::new(name, Geometry::Mesh(mesh))
    }

    pub fn with_transform(mut self, transform: Matrix4<f64>) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.info.category = category;
        self
    }

    pub fn kind(&self) -> EntityKind {
        match self.geometry {
            Geometry::Curve(_) => EntityKind::Curve,
            Geometry::Mesh(_) => EntityKind::Mesh,
        }
    }

    pub fn category(&self) -> Category {
        self.info.category
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.geometry {
            Geometry::Mesh(mesh) => Some(mesh),
            Geometry::Curve(_) => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.geometry {
            Geometry::Mesh(mesh) => Some(mesh),
            Geometry::Curve(_) => None,
        }
    }

    /// Mesh payload, or a conversion error for a curve that was never converted
    pub fn require_mesh_mut(&mut self) -> Result<&mut Mesh> {
        match &mut self.geometry {
            Geometry::Mesh(mesh) => Ok(mesh),
            Geometry::Curve(_) => Err(ReconstructError::Conversion {
                name: self.name.clone(),
                reason: "entity is still a curve".to_string(),
            }),
        }
    }

    /// World position of the local origin
    pub fn origin(&self) -> Point3<f64> {
        transform::origin_of(&self.transform)
    }

    /// World position of one local mesh vertex
    pub fn world_vertex(&self, index: usize) -> Option<Point3<f64>> {
        let v = self.as_mesh()?.vertices.get(index)?;
        Some(self.transform.transform_point(v))
    }

    /// World positions of every vertex; curves contribute their samples
    pub fn world_vertices(&self) -> Vec<Point3<f64>> {
        match &self.geometry {
            Geometry::Mesh(mesh) => mesh
                .vertices
                .iter()
                .map(|v| self.transform.transform_point(v))
                .collect(),
            Geometry::Curve(curve) => curve
                .splines
                .iter()
                .flat_map(|s| s.sample())
                .map(|v| self.transform.transform_point(&v))
                .collect(),
        }
    }

    /// Tessellate a curve entity in place, keeping its transform
    pub fn convert_to_mesh(&mut self) -> Result<()> {
        if let Geometry::Curve(curve) = &self.geometry {
            let mesh = curve.to_mesh().map_err(|e| ReconstructError::Conversion {
                name: self.name.clone(),
                reason: e.to_string(),
            })?;
            self.geometry = Geometry::Mesh(mesh);
        }
        Ok(())
    }

    /// Move the origin to `world_point` without moving the geometry
    pub fn relocate_origin(&mut self, world_point: &Point3<f64>) -> Result<()> {
        let (moved, offset) = transform::relocate_origin(&self.transform, world_point)?;
        let shift = -offset;
        match &mut self.geometry {
            Geometry::Mesh(mesh) => mesh.translate(&shift),
            Geometry::Curve(curve) => curve.translate(&shift),
        }
        self.transform = moved;
        Ok(())
    }

    /// Move the origin to the centre of the local bounding box
    pub fn set_origin_to_bounds_center(&mut self) -> Result<()> {
        let Some(center) = self.as_mesh().and_then(Mesh::bounds_center) else {
            return Ok(());
        };
        let world = self.transform.transform_point(&center);
        self.relocate_origin(&world)
    }

    /// Bake the transform into the mesh and reset it to identity
    pub fn apply_transform(&mut self) -> Result<()> {
        let matrix = self.transform;
        self.require_mesh_mut()?.transform(&matrix);
        self.transform = Matrix4::identity();
        Ok(())
    }

    /// World-space axis-aligned bounds
    pub fn world_bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let vertices = self.world_vertices();
        let first = *vertices.first()?;
        Some(
            vertices[1..]
                .iter()
                .fold((first, first), |(min, max), v| (min.inf(v), max.sup(v))),
        )
    }

    pub fn world_bounds_center(&self) -> Option<Point3<f64>> {
        self.world_bounds()
            .map(|(min, max)| nalgebra::center(&min, &max))
    }

    /// World-space extents along X, Y and Z
    pub fn dimensions(&self) -> Vector3<f64> {
        self.world_bounds()
            .map(|(min, max)| max - min)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Largest world-space extent
    pub fn max_dimension(&self) -> f64 {
        self.dimensions().max()
    }

    /// Join other mesh entities into this one
    ///
    /// The result keeps this entity's name, transform and metadata; the
    /// others are re-expressed in its local frame.
    pub fn join(mut self, others: Vec<Entity>) -> Result<Entity> {
        let to_local = transform::inverse(&self.transform)?;
        for mut other in others {
            other.convert_to_mesh()?;
            let other_transform = other.transform;
            if let Some(mesh) = other.as_mesh() {
                let into_self = to_local * other_transform;
                self.require_mesh_mut()?.merge_transformed(mesh, &into_self);
            }
        }
        Ok(self)
    }

    /// Name under the legacy naming scheme, with metadata encoded
    pub fn export_name(&self) -> String {
        match (self.info.category, &self.info) {
            (Category::Door, ElementInfo { heading: Some(h), .. }) => {
                format!("{}_{}R", self.name, format_number(round_to(*h, HEADING_DECIMALS)))
            }
            (
                Category::Furniture,
                ElementInfo {
                    heading: Some(h),
                    dimensions: Some(d),
                    ..
                },
            ) => format!(
                "{}_{}L_{}W_{}R",
                self.name,
                format_number(round_to(d.length, DIMENSION_DECIMALS)),
                format_number(round_to(d.width, DIMENSION_DECIMALS)),
                format_number(round_to(*h, HEADING_DECIMALS))
            ),
            (
                Category::OrientationMarker,
                ElementInfo {
                    segment: Some(marker),
                    ..
                },
            ) => {
                let p = marker.descriptor.midpoint;
                let slope = match marker.descriptor.slope {
                    Slope::Vertical => "90".to_string(),
                    Slope::Finite(s) => format!("{:.2}", s),
                };
                format!(
                    "{}_seg{}_pt_{:.2}_{:.2}_slope_{}",
                    marker.part, marker.index, p.x, p.y, slope
                )
            }
            _ => self.name.clone(),
        }
    }
}

/// Vertex of `target` closest to any vertex of `candidates`, in world space
///
/// `None` when `target` or every candidate has no vertices. The first pair
/// found wins ties.
pub fn closest_vertex_between(target: &Entity, candidates: &[&Entity]) -> Option<Point3<f64>> {
    let candidate_vertices: Vec<Point3<f64>> =
        candidates.iter().flat_map(|c| c.world_vertices()).collect();
    if candidate_vertices.is_empty() {
        return None;
    }

    let mut best: Option<(f64, Point3<f64>)> = None;
    for v in target.world_vertices() {
        for c in &candidate_vertices {
            let dist_sq = (v - c).norm_squared();
            if best.map_or(true, |(best_sq, _)| dist_sq < best_sq) {
                best = Some((dist_sq, v));
            }
        }
    }
    best.map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use plan3d_geometry::Spline;

    fn square_curve(side: f64) -> CurveData {
        CurveData::new(vec![Spline::poly(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(side, 0.0, 0.0),
                Point3::new(side, side, 0.0),
                Point3::new(0.0, side, 0.0),
            ],
            true,
        )])
    }

    fn point_mesh(points: &[(f64, f64)]) -> Mesh {
        let mut mesh = Mesh::new();
        for &(x, y) in points {
            mesh.add_vertex(Point3::new(x, y, 0.0));
        }
        mesh
    }

    #[test]
    fn test_convert_keeps_transform() {
        let t = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0));
        let mut entity = Entity::curve("00_A_MUROS_curve_", square_curve(4.0)).with_transform(t);
        entity.convert_to_mesh().unwrap();

        assert_eq!(entity.kind(), EntityKind::Mesh);
        assert_eq!(entity.transform, t);
        assert_eq!(entity.world_vertex(1), Some(Point3::new(14.0, 0.0, 0.0)));
    }

    #[test]
    fn test_convert_empty_curve_fails() {
        let mut entity = Entity::curve("empty", CurveData::new(vec![]));
        assert!(matches!(
            entity.convert_to_mesh(),
            Err(ReconstructError::Conversion { .. })
        ));
    }

    #[test]
    fn test_relocate_origin_keeps_world_geometry() {
        let mut entity = Entity::mesh("m", point_mesh(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0)]))
            .with_transform(Matrix4::new_translation(&Vector3::new(1.0, 1.0, 0.0)));
        let before = entity.world_vertices();

        entity.relocate_origin(&Point3::new(3.0, 1.0, 0.0)).unwrap();

        assert_eq!(entity.origin(), Point3::new(3.0, 1.0, 0.0));
        for (a, b) in before.iter().zip(entity.world_vertices()) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_origin_to_bounds_center() {
        let mut entity = Entity::mesh("m", point_mesh(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0)]));
        entity.set_origin_to_bounds_center().unwrap();
        assert_relative_eq!(entity.origin(), Point3::new(2.0, 1.0, 0.0));
        assert_relative_eq!(entity.dimensions(), Vector3::new(4.0, 2.0, 0.0));
    }

    #[test]
    fn test_join_reexpresses_in_first_frame() {
        let a = Entity::mesh("a", point_mesh(&[(0.0, 0.0)]))
            .with_transform(Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0)));
        let b = Entity::mesh("b", point_mesh(&[(0.0, 0.0)]))
            .with_transform(Matrix4::new_translation(&Vector3::new(7.0, 1.0, 0.0)));

        let joined = a.join(vec![b]).unwrap();

        assert_eq!(joined.name, "a");
        assert_eq!(
            joined.world_vertices(),
            vec![Point3::new(5.0, 0.0, 0.0), Point3::new(7.0, 1.0, 0.0)]
        );
    }

    #[test]
    fn test_closest_vertex_between() {
        let door = Entity::mesh("door", point_mesh(&[(0.0, 0.0), (0.9, 0.0), (0.9, 0.05)]));
        let frame = Entity::mesh("frame", point_mesh(&[(1.0, 0.0), (1.1, 0.0)]));
        let empty = Entity::mesh("empty", Mesh::new());

        assert_eq!(
            closest_vertex_between(&door, &[&frame]),
            Some(Point3::new(0.9, 0.0, 0.0))
        );
        assert_eq!(closest_vertex_between(&door, &[&empty]), None);
        assert_eq!(closest_vertex_between(&empty, &[&frame]), None);
    }

    #[test]
    fn test_export_names() {
        let mut door = Entity::mesh("PUERTA.002", Mesh::new()).with_category(Category::Door);
        door.info.heading = Some(89.99999);
        assert_eq!(door.export_name(), "PUERTA.002_90.0R");

        let mut table = Entity::mesh("Mesa", Mesh::new()).with_category(Category::Furniture);
        table.info.heading = Some(180.0);
        table.info.dimensions = Some(PlanDimensions {
            length: 0.80004,
            width: 1.6,
        });
        assert_eq!(table.export_name(), "Mesa_0.8L_1.6W_180.0R");

        let mut marker =
            Entity::mesh("00_Orientacion_curve__seg0", Mesh::new()).with_category(Category::OrientationMarker);
        marker.info.segment = Some(SegmentMarker {
            part: "00_Orientacion_curve_".to_string(),
            index: 0,
            descriptor: SegmentDescriptor::from_segment(
                &Point3::new(1.0, 0.0, 0.0),
                &Point3::new(1.0, 2.5, 0.0),
            ),
        });
        assert_eq!(
            marker.export_name(),
            "00_Orientacion_curve__seg0_pt_1.00_1.25_slope_90"
        );

        let wall = Entity::mesh("00_A_MUROS_curve_", Mesh::new()).with_category(Category::Wall);
        assert_eq!(wall.export_name(), "00_A_MUROS_curve_");
    }
}
