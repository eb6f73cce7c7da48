// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Windows: merge drafted fragments into units, then stack three solids
//!
//! Fragments are first merged while any of their vertices lie closer than
//! the vertex threshold, then while their bounding box centres lie closer
//! than the centre threshold. Each resulting unit is replaced by a base,
//! a thin pane and a top prism over its axis-aligned footprint.

use super::{finish_solid, separate_loose_parts, CategoryStats};
use crate::cluster::{centroid_distance, cluster_to_fixpoint, vertex_distance};
use crate::config::{NamingConfig, WindowConfig};
use crate::entity::{Category, Entity};
use crate::error::{ReconstructError, Result};
use crate::scene::Scene;
use nalgebra::Point3;
use plan3d_geometry::{axis_aligned_corners, build_stacked_solids};

pub fn run(scene: &mut Scene, config: &WindowConfig, naming: &NamingConfig) -> Result<CategoryStats> {
    let parts = separate_loose_parts(scene, &naming.windows)?;
    let fragments: Vec<Entity> = parts.iter().filter_map(|name| scene.remove(name)).collect();
    let fragment_count = fragments.len();

    let mut stats = CategoryStats::default();
    // Fragments that could not be merged or recentred go back unchanged
    let mut set_aside = Vec::new();

    let by_vertices = cluster_to_fixpoint(
        fragments,
        Entity::world_vertices,
        |a: &Vec<Point3<f64>>, b: &Vec<Point3<f64>>| vertex_distance(a, b),
        config.vertex_threshold,
        |group| merge_units(group, &mut set_aside, &mut stats),
    )?;
    tracing::debug!(passes = ?by_vertices.pass_counts, "Merged window fragments by vertex proximity");

    let mut units = Vec::with_capacity(by_vertices.items.len());
    for mut unit in by_vertices.items {
        match unit.set_origin_to_bounds_center() {
            Ok(()) => units.push(unit),
            Err(e) => {
                stats.skip_unit(&unit.name, &e);
                set_aside.push(unit);
            }
        }
    }

    let by_centres = cluster_to_fixpoint(
        units,
        |unit: &Entity| unit.world_bounds_center().unwrap_or_else(|| unit.origin()),
        centroid_distance,
        config.center_threshold,
        |group| merge_units(group, &mut set_aside, &mut stats),
    )?;
    tracing::debug!(passes = ?by_centres.pass_counts, "Merged window units by centre proximity");

    for unit in by_centres.items {
        if let Err(e) = build_layers(scene, config, &unit, &mut stats) {
            stats.skip_unit(&unit.name, &e);
            scene.insert(unit);
        }
    }
    for fragment in set_aside {
        scene.insert(fragment);
    }

    tracing::info!(
        fragments = fragment_count,
        solids = stats.produced.len(),
        "Windows built"
    );
    Ok(stats)
}

/// Join a group into its first member
///
/// If the join fails the first member goes on alone and the others are
/// moved to `set_aside` unmerged.
fn merge_units(
    group: Vec<Entity>,
    set_aside: &mut Vec<Entity>,
    stats: &mut CategoryStats,
) -> Result<Entity> {
    let mut members = group.into_iter();
    let first = members
        .next()
        .ok_or_else(|| ReconstructError::Lookup("empty window group".to_string()))?;
    let rest: Vec<Entity> = members.collect();

    match first.clone().join(rest.clone()) {
        Ok(unit) => Ok(unit),
        Err(e) => {
            stats.skip_unit(&first.name, &e);
            set_aside.extend(rest);
            Ok(first)
        }
    }
}

/// Base, pane and top solids of one window unit
fn build_layers(
    scene: &mut Scene,
    config: &WindowConfig,
    unit: &Entity,
    stats: &mut CategoryStats,
) -> Result<()> {
    let corners = axis_aligned_corners(&unit.world_vertices())?;
    let layers = build_stacked_solids(
        &corners,
        config.base_height,
        config.mid_height,
        config.top_height,
        config.pane_ratio,
    )?;

    let prefixes = [
        (&config.base_prefix, Category::WindowBase),
        (&config.mid_prefix, Category::WindowPane),
        (&config.top_prefix, Category::WindowTop),
    ];
    for ((prefix, category), mesh) in prefixes.into_iter().zip(layers) {
        let mut layer = Entity::mesh(format!("{}{}", prefix, unit.name), mesh).with_category(category);
        layer.info.host = Some(unit.name.clone());
        finish_solid(&mut layer)?;
        stats.produced.push(scene.insert(layer));
    }
    Ok(())
}
