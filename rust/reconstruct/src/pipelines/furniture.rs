// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Furniture blocks oriented toward the nearest orientation segment
//!
//! The orientation reference group is broken into segments and replaced by
//! one marker per segment. Every remaining curve that is not a reference
//! group becomes a four-corner footprint whose heading points at the nearest
//! segment midpoint. Length and width are measured with the block turned to
//! that heading, but the block keeps its unrotated transform: the measured
//! values travel as metadata.

use super::{separate_loose_parts, CategoryStats};
use crate::config::{FurnitureConfig, NamingConfig};
use crate::entity::{Category, Entity, EntityKind, PlanDimensions, SegmentMarker};
use crate::error::Result;
use crate::orientation::{nearest_reference_heading, SegmentDescriptor};
use crate::scene::Scene;
use nalgebra::{Matrix4, Point3};
use plan3d_geometry::transform::with_rotation_z;
use plan3d_geometry::{minimal_rotated_footprint, Mesh};

pub fn run(scene: &mut Scene, config: &FurnitureConfig, naming: &NamingConfig) -> Result<CategoryStats> {
    scene.lookup(&naming.orientation)?;
    let mut stats = CategoryStats::default();

    let segments = replace_orientation_with_markers(scene, config, naming, &mut stats)?;
    let midpoints: Vec<Point3<f64>> = segments.iter().map(|s| s.midpoint).collect();
    if midpoints.is_empty() {
        tracing::warn!(reference = %naming.orientation, "Orientation group has no segments, headings default to 0");
    }

    let candidates: Vec<String> = scene
        .names_of_kind(EntityKind::Curve)
        .into_iter()
        .filter(|name| !name.starts_with(&naming.reference_prefix))
        .collect();

    for name in candidates {
        let Some(entity) = scene.get_mut(&name) else {
            continue;
        };
        match orient_block(entity, &midpoints) {
            Ok(()) => {
                tracing::debug!(name = %name, exported = %entity.export_name(), "Oriented furniture block");
                stats.produced.push(name);
            }
            Err(e) => stats.skip_unit(&name, &e),
        }
    }

    tracing::info!(
        blocks = stats.produced.len(),
        segments = segments.len(),
        "Furniture oriented"
    );
    Ok(stats)
}

/// Split the orientation group into segments and leave one marker each
fn replace_orientation_with_markers(
    scene: &mut Scene,
    config: &FurnitureConfig,
    naming: &NamingConfig,
    stats: &mut CategoryStats,
) -> Result<Vec<SegmentDescriptor>> {
    let parts = separate_loose_parts(scene, &naming.orientation)?;
    let mut segments = Vec::new();

    for part_name in parts {
        let Some(part) = scene.remove(&part_name) else {
            continue;
        };
        let Some(mesh) = part.as_mesh() else {
            continue;
        };

        for (index, edge) in mesh.edges.iter().enumerate() {
            let (Some(a), Some(b)) = (
                part.world_vertex(edge[0] as usize),
                part.world_vertex(edge[1] as usize),
            ) else {
                continue;
            };
            let descriptor = SegmentDescriptor::from_segment(&a, &b);
            segments.push(descriptor);

            let mut point = Mesh::new();
            point.add_vertex(Point3::origin());
            let mut marker = Entity::mesh(
                format!("{}{}{}", part_name, config.marker_separator, index),
                point,
            )
            .with_transform(Matrix4::new_translation(&descriptor.midpoint.coords))
            .with_category(Category::OrientationMarker);
            marker.info.segment = Some(SegmentMarker {
                part: part_name.clone(),
                index,
                descriptor,
            });
            stats.produced.push(scene.insert(marker));
        }
    }

    Ok(segments)
}

/// Footprint, heading and plan dimensions of one furniture block
///
/// The block is only updated once every step has succeeded.
fn orient_block(entity: &mut Entity, midpoints: &[Point3<f64>]) -> Result<()> {
    let mut block = entity.clone();
    block.convert_to_mesh()?;
    block.apply_transform()?;

    let corners = minimal_rotated_footprint(&block.world_vertices())?;
    let mut footprint = Mesh::with_capacity(4, 0);
    for corner in corners.ring() {
        footprint.add_vertex(corner);
    }
    *block.require_mesh_mut()? = footprint;
    block.set_origin_to_bounds_center()?;

    let heading = nearest_reference_heading(&block.origin(), midpoints).unwrap_or(0.0);

    let mut turned = block.clone();
    turned.transform = with_rotation_z(&block.transform, heading.to_radians());
    let size = turned.dimensions();

    block.info.category = Category::Furniture;
    block.info.heading = Some(heading);
    block.info.dimensions = Some(PlanDimensions {
        length: size.y,
        width: size.x,
    });
    *entity = block;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconstructError;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use plan3d_geometry::{CurveData, Spline};

    fn segment(a: (f64, f64), b: (f64, f64)) -> Spline {
        Spline::poly(
            vec![Point3::new(a.0, a.1, 0.0), Point3::new(b.0, b.1, 0.0)],
            false,
        )
    }

    fn table(at: (f64, f64)) -> Entity {
        let outline = Spline::poly(
            vec![
                Point3::new(-1.0, -0.5, 0.0),
                Point3::new(1.0, -0.5, 0.0),
                Point3::new(1.0, 0.5, 0.0),
                Point3::new(-1.0, 0.5, 0.0),
            ],
            true,
        );
        Entity::curve("Mesa", CurveData::new(vec![outline]))
            .with_transform(Matrix4::new_translation(&Vector3::new(at.0, at.1, 0.0)))
    }

    fn scene_with(orientation: Vec<Spline>, blocks: Vec<Entity>) -> Scene {
        let mut scene = Scene::new();
        scene.insert(Entity::curve("00_Orientacion_curve_", CurveData::new(orientation)));
        for block in blocks {
            scene.insert(block);
        }
        scene
    }

    #[test]
    fn test_block_faces_nearest_segment() {
        let mut scene = scene_with(
            vec![segment((5.0, -1.0), (5.0, 1.0)), segment((-1.0, 20.0), (1.0, 20.0))],
            vec![table((0.0, 0.0))],
        );

        let stats = run(&mut scene, &FurnitureConfig::default(), &NamingConfig::default()).unwrap();

        assert!(stats.produced.contains(&"Mesa".to_string()));
        let mesa = scene.get("Mesa").unwrap();
        assert_eq!(mesa.category(), Category::Furniture);
        assert_relative_eq!(mesa.info.heading.unwrap(), 0.0, epsilon = 1e-9);
        assert_eq!(mesa.export_name(), "Mesa_1.0L_2.0W_0.0R");
        assert_eq!(mesa.as_mesh().unwrap().vertex_count(), 4);
        assert_relative_eq!(mesa.origin(), Point3::new(0.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_dimensions_measured_at_heading_but_transform_kept() {
        let mut scene = scene_with(vec![segment((-1.0, 5.0), (1.0, 5.0))], vec![table((0.0, 0.0))]);

        run(&mut scene, &FurnitureConfig::default(), &NamingConfig::default()).unwrap();

        let mesa = scene.get("Mesa").unwrap();
        assert_eq!(mesa.export_name(), "Mesa_2.0L_1.0W_90.0R");
        // Unrotated: world extents are still 2 x 1
        assert_relative_eq!(mesa.dimensions(), Vector3::new(2.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_orientation_group_becomes_markers() {
        let mut scene = scene_with(
            vec![segment((5.0, -1.0), (5.0, 1.0)), segment((0.0, 3.0), (2.0, 4.0))],
            vec![],
        );

        run(&mut scene, &FurnitureConfig::default(), &NamingConfig::default()).unwrap();

        assert!(!scene.contains("00_Orientacion_curve_"));
        let mut exported: Vec<String> = scene
            .entities()
            .filter(|e| e.category() == Category::OrientationMarker)
            .map(Entity::export_name)
            .collect();
        exported.sort();
        assert_eq!(
            exported,
            vec![
                "00_Orientacion_curve_.001_seg0_pt_1.00_3.50_slope_0.50",
                "00_Orientacion_curve__seg0_pt_5.00_0.00_slope_90",
            ]
        );
    }

    #[test]
    fn test_degenerate_block_is_left_untouched() {
        let line = Spline::poly(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            false,
        );
        let shift = Matrix4::new_translation(&Vector3::new(3.0, 1.0, 0.0));
        let block = Entity::curve("Linea", CurveData::unfilled(vec![line])).with_transform(shift);
        let mut scene = scene_with(vec![segment((5.0, -1.0), (5.0, 1.0))], vec![block]);

        let stats = run(&mut scene, &FurnitureConfig::default(), &NamingConfig::default()).unwrap();

        assert_eq!(stats.skipped_units, 1);
        assert!(!stats.produced.contains(&"Linea".to_string()));
        let linea = scene.get("Linea").unwrap();
        assert_eq!(linea.kind(), EntityKind::Curve);
        assert_eq!(linea.transform, shift);
        assert_eq!(linea.info.heading, None);
    }

    #[test]
    fn test_missing_orientation_skips_category() {
        let mut scene = Scene::new();
        scene.insert(table((0.0, 0.0)));
        let result = run(&mut scene, &FurnitureConfig::default(), &NamingConfig::default());
        assert!(matches!(result, Err(ReconstructError::Lookup(_))));
        assert_eq!(scene.get("Mesa").unwrap().kind(), EntityKind::Curve);
    }
}
