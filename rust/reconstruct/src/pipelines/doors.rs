// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Doors: leaves with a swing heading, frames grouped under their leaf
//!
//! The door group is split into loose parts. Parts whose largest extent
//! reaches the leaf threshold are leaves and are renamed `PUERTA`,
//! `PUERTA.002`, … in descending size order. The rest are frame pieces.
//! A leaf's origin moves to its vertex nearest to any frame, and its heading
//! is the bisector of the two directions leaving that corner.
//!
//! Frame pieces past the first few decomposition slots are attached to the
//! leaf whose origin is nearest and joined per leaf. Everything is extruded
//! to door height.

use super::{extrude_up, finish_solid, separate_loose_parts, CategoryStats};
use crate::config::{DoorConfig, NamingConfig};
use crate::entity::{closest_vertex_between, Category, Entity};
use crate::error::Result;
use crate::naming::{numbered_name, numeric_suffix};
use crate::orientation::bisector_heading;
use crate::scene::Scene;
use nalgebra::Point3;
use rustc_hash::FxHashMap;

pub fn run(scene: &mut Scene, config: &DoorConfig, naming: &NamingConfig) -> Result<CategoryStats> {
    let parts = separate_loose_parts(scene, &naming.doors)?;
    let mut stats = CategoryStats::default();

    let (leaves, mut frames) = classify_parts(scene, config, parts)?;
    frames.sort();

    let oriented = orient_leaves(scene, config, &leaves, &frames, &mut stats);
    let mut solids = oriented.clone();
    solids.extend(group_frames(scene, config, &oriented, frames, &mut stats));

    for name in solids {
        let Some(entity) = scene.get_mut(&name) else {
            continue;
        };
        let built = extrude_up(entity, config.height).and_then(|_| finish_solid(entity));
        match built {
            Ok(()) => stats.produced.push(name),
            Err(e) => stats.skip_unit(&name, &e),
        }
    }

    tracing::info!(
        leaves = oriented.len(),
        solids = stats.produced.len(),
        height = config.height,
        "Doors extruded"
    );
    Ok(stats)
}

/// Rename leaves and return `(leaves, frames)`
fn classify_parts(
    scene: &mut Scene,
    config: &DoorConfig,
    parts: Vec<String>,
) -> Result<(Vec<String>, Vec<String>)> {
    let mut sized: Vec<(String, f64)> = parts
        .into_iter()
        .filter_map(|name| {
            let size = scene.get(&name)?.max_dimension();
            Some((name, size))
        })
        .collect();
    sized.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut leaves = Vec::new();
    let mut frames = Vec::new();
    for (name, size) in sized {
        if size < config.leaf_threshold {
            frames.push(name);
            continue;
        }
        let wanted = numbered_name(&config.leaf_name, leaves.len() + 1, 1);
        let leaf = scene.rename(&name, &wanted)?;
        scene.lookup_mut(&leaf)?.info.category = Category::Door;
        tracing::debug!(part = %name, leaf = %leaf, size, "Classified door leaf");
        leaves.push(leaf);
    }
    Ok((leaves, frames))
}

/// Anchor and head each leaf, returning the leaves that were oriented
///
/// A leaf whose origin cannot be moved is skipped and left as it was.
fn orient_leaves(
    scene: &mut Scene,
    config: &DoorConfig,
    leaves: &[String],
    frames: &[String],
    stats: &mut CategoryStats,
) -> Vec<String> {
    let mut oriented = Vec::with_capacity(leaves.len());
    for name in leaves {
        let anchor = scene.get(name).and_then(|leaf| {
            let frame_refs: Vec<&Entity> = frames.iter().filter_map(|f| scene.get(f)).collect();
            closest_vertex_between(leaf, &frame_refs)
        });
        let Some(leaf) = scene.get_mut(name) else {
            continue;
        };

        if let Some(anchor) = anchor {
            if let Err(e) = leaf.relocate_origin(&anchor) {
                stats.skip_unit(name, &e);
                continue;
            }
        }
        let heading = bisector_heading(
            &leaf.origin(),
            &leaf.world_vertices(),
            config.direction_tolerance_sq,
        );
        leaf.info.heading = Some(heading);
        tracing::debug!(leaf = %name, heading, "Door heading");
        oriented.push(name.clone());
    }
    oriented
}

/// Attach eligible frame pieces to their nearest leaf and join each group
///
/// Returns the frame solids left in the scene: joined groups first, in leaf
/// order, then the pieces that stay on their own.
fn group_frames(
    scene: &mut Scene,
    config: &DoorConfig,
    leaves: &[String],
    frames: Vec<String>,
    stats: &mut CategoryStats,
) -> Vec<String> {
    let leaf_origins: Vec<Point3<f64>> = leaves
        .iter()
        .filter_map(|name| scene.get(name).map(Entity::origin))
        .collect();

    let mut groups: FxHashMap<usize, Vec<String>> = FxHashMap::default();
    let mut singles = Vec::new();

    for name in frames {
        let Some(frame) = scene.get_mut(&name) else {
            continue;
        };
        frame.info.category = Category::DoorFrame;

        let eligible = numeric_suffix(&name).is_some_and(|n| n > config.min_frame_suffix);
        if !eligible || leaf_origins.is_empty() {
            singles.push(name);
            continue;
        }
        if let Err(e) = frame.set_origin_to_bounds_center() {
            stats.skip_unit(&name, &e);
            continue;
        }

        let origin = frame.origin();
        let mut nearest = 0;
        let mut best = f64::INFINITY;
        for (i, leaf_origin) in leaf_origins.iter().enumerate() {
            let dist = nalgebra::distance(&origin, leaf_origin);
            if dist < best {
                best = dist;
                nearest = i;
            }
        }
        groups.entry(nearest).or_default().push(name);
    }

    let mut joined = Vec::new();
    for (index, host) in leaves.iter().enumerate() {
        let Some(members) = groups.remove(&index) else {
            continue;
        };
        let mut pieces: Vec<Entity> = members.iter().filter_map(|n| scene.remove(n)).collect();
        if pieces.is_empty() {
            continue;
        }
        let first = pieces.remove(0);
        let first_name = first.name.clone();
        match first.join(pieces) {
            Ok(mut frame) => {
                frame.info.host = Some(host.clone());
                tracing::debug!(frame = %frame.name, host = %host, pieces = members.len(), "Joined door frame");
                joined.push(scene.insert(frame));
            }
            Err(e) => stats.skip_unit(&first_name, &e),
        }
    }

    joined.extend(singles);
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconstructError;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Vector3};
    use plan3d_geometry::{CurveData, Spline};

    fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Spline {
        Spline::poly(
            vec![
                Point3::new(x0, y0, 0.0),
                Point3::new(x1, y0, 0.0),
                Point3::new(x1, y1, 0.0),
                Point3::new(x0, y1, 0.0),
            ],
            true,
        )
    }

    /// Two loose jamb pieces, an open leaf, then two frame pieces
    fn door_scene() -> Scene {
        let mut scene = Scene::new();
        scene.insert(Entity::curve(
            "00_A_PUERTAS_curve_",
            CurveData::new(vec![
                rectangle(-0.5, -0.1, -0.4, 0.0),
                rectangle(1.4, -0.1, 1.5, 0.0),
                rectangle(0.0, 0.0, 0.05, 0.9),
                rectangle(-0.15, -0.1, -0.05, 0.0),
                rectangle(0.95, -0.1, 1.05, 0.0),
            ]),
        ));
        scene
    }

    #[test]
    fn test_leaf_is_renamed_and_oriented() {
        let mut scene = door_scene();
        run(&mut scene, &DoorConfig::default(), &NamingConfig::default()).unwrap();

        let leaf = scene.get("PUERTA").unwrap();
        assert_eq!(leaf.category(), Category::Door);
        assert_relative_eq!(leaf.origin(), Point3::new(0.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(leaf.info.heading.unwrap(), 45.0, epsilon = 1e-9);
        assert_eq!(leaf.export_name(), "PUERTA_45.0R");
        assert!(!scene.contains("00_A_PUERTAS_curve_.002"));
    }

    #[test]
    fn test_late_frames_join_under_their_leaf() {
        let mut scene = door_scene();
        let stats = run(&mut scene, &DoorConfig::default(), &NamingConfig::default()).unwrap();

        assert_eq!(
            stats.produced,
            vec![
                "PUERTA",
                "00_A_PUERTAS_curve_.003",
                "00_A_PUERTAS_curve_",
                "00_A_PUERTAS_curve_.001",
            ]
        );
        assert!(!scene.contains("00_A_PUERTAS_curve_.004"));

        let frame = scene.get("00_A_PUERTAS_curve_.003").unwrap();
        assert_eq!(frame.category(), Category::DoorFrame);
        assert_eq!(frame.info.host.as_deref(), Some("PUERTA"));
        assert_eq!(frame.as_mesh().unwrap().vertex_count(), 16);
        let (min, max) = frame.world_bounds().unwrap();
        assert_relative_eq!(min.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(max.z, 2.03, epsilon = 1e-12);

        let jamb = scene.get("00_A_PUERTAS_curve_").unwrap();
        assert_eq!(jamb.category(), Category::DoorFrame);
        assert_eq!(jamb.info.host, None);
        assert_eq!(jamb.as_mesh().unwrap().vertex_count(), 8);
    }

    #[test]
    fn test_second_leaf_skips_number_one() {
        let mut scene = Scene::new();
        scene.insert(Entity::curve(
            "00_A_PUERTAS_curve_",
            CurveData::new(vec![
                rectangle(0.0, 0.0, 0.05, 0.8),
                rectangle(3.0, 0.0, 3.05, 0.9),
            ]),
        ));

        let stats = run(&mut scene, &DoorConfig::default(), &NamingConfig::default()).unwrap();

        assert_eq!(stats.produced, vec!["PUERTA", "PUERTA.002"]);
        // The larger part is classified first
        let first = scene.get("PUERTA").unwrap();
        assert_relative_eq!(first.dimensions().y, 0.9, epsilon = 1e-12);
        // No frames: the origin stays put and the heading uses the raw vertices
        assert!(first.info.heading.is_some());
    }

    #[test]
    fn test_leaf_that_cannot_be_anchored_is_not_extruded() {
        let mut scene = Scene::new();
        scene.insert(
            Entity::curve(
                "00_A_PUERTAS_curve_",
                CurveData::new(vec![
                    rectangle(0.0, 0.0, 0.05, 0.9),
                    rectangle(0.95, -0.1, 1.05, 0.0),
                ]),
            )
            .with_transform(Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0))),
        );

        let stats = run(&mut scene, &DoorConfig::default(), &NamingConfig::default()).unwrap();

        // The leaf is counted once and never reported as built
        assert!(stats.produced.is_empty());
        assert_eq!(stats.skipped_units, 2);
        let leaf = scene.get("PUERTA").unwrap();
        assert_eq!(leaf.info.heading, None);
        assert_relative_eq!(leaf.dimensions().z, 0.0);
    }

    #[test]
    fn test_missing_door_group_is_a_lookup_error() {
        let mut scene = Scene::new();
        let result = run(&mut scene, &DoorConfig::default(), &NamingConfig::default());
        assert!(matches!(result, Err(ReconstructError::Lookup(_))));
    }
}
