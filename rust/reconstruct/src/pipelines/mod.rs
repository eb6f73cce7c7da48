// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-category reconstruction pipelines
//!
//! Each pipeline consumes its input entities from the scene and inserts the
//! solids it builds. A missing or unconvertible input fails the whole
//! category; a failure while building one unit only skips that unit.

pub mod doors;
pub mod furniture;
pub mod lights;
pub mod names;
pub mod surfaces;
pub mod walls;
pub mod windows;

use crate::entity::Entity;
use crate::error::{ReconstructError, Result};
use crate::scene::Scene;
use nalgebra::Vector3;
use plan3d_geometry::transform::world_direction_to_local;
use plan3d_geometry::{apply_cube_uv, extrude, recompute_outward_normals, split_by_connectivity};

/// What a completed category produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryStats {
    /// Names of the entities built or updated, in creation order
    pub produced: Vec<String>,
    /// Units dropped after a geometry failure
    pub skipped_units: usize,
}

impl CategoryStats {
    pub(crate) fn skip_unit(&mut self, unit: &str, error: &dyn std::fmt::Display) {
        tracing::warn!(unit = %unit, error = %error, "Skipping unit");
        self.skipped_units += 1;
    }
}

/// Look up an entity by exact name and make sure it is a mesh
pub(crate) fn convert_in_place(scene: &mut Scene, name: &str) -> Result<()> {
    let entity = scene.lookup_mut(name)?;
    entity.convert_to_mesh()?;
    tracing::debug!(name = %name, "Converted curve to mesh");
    Ok(())
}

/// Replace an entity by one entity per loose part
///
/// Parts keep the transform and metadata of the source and are named
/// `<name>`, `<name>.001`, … in part order. Returns the part names.
pub(crate) fn separate_loose_parts(scene: &mut Scene, name: &str) -> Result<Vec<String>> {
    scene.lookup_mut(name)?.convert_to_mesh()?;
    let source = scene
        .remove(name)
        .ok_or_else(|| ReconstructError::Lookup(name.to_string()))?;

    let parts = source
        .as_mesh()
        .map(split_by_connectivity)
        .unwrap_or_default();

    let names: Vec<String> = parts
        .into_iter()
        .map(|mesh| {
            let mut part = Entity::mesh(name, mesh).with_transform(source.transform);
            part.info = source.info.clone();
            scene.insert(part)
        })
        .collect();

    tracing::debug!(source = %name, parts = names.len(), "Separated loose parts");
    Ok(names)
}

/// Extrude an entity's mesh by `height` along world +Z
pub(crate) fn extrude_up(entity: &mut Entity, height: f64) -> Result<()> {
    let local_up = world_direction_to_local(&entity.transform, &Vector3::z())?;
    let mesh = entity.require_mesh_mut()?;
    *mesh = extrude(mesh, &local_up, local_up.norm() * height)?;
    Ok(())
}

/// Outward normals and cube UVs, the finish every solid gets
pub(crate) fn finish_solid(entity: &mut Entity) -> Result<()> {
    let mesh = entity.require_mesh_mut()?;
    recompute_outward_normals(mesh);
    apply_cube_uv(mesh);
    Ok(())
}
