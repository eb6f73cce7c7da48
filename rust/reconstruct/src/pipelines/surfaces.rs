// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor and ceiling slabs under and over every wall outline

use super::{finish_solid, CategoryStats};
use crate::config::{NamingConfig, SurfaceConfig};
use crate::entity::{Category, Entity, EntityKind};
use crate::error::{ReconstructError, Result};
use crate::scene::Scene;
use plan3d_geometry::{minimal_rotated_footprint, Prism};

pub fn run(scene: &mut Scene, config: &SurfaceConfig, naming: &NamingConfig) -> Result<CategoryStats> {
    let curves: Vec<String> = scene
        .names_with_prefix(&naming.surface_prefix)
        .into_iter()
        .filter(|name| scene.get(name).map(Entity::kind) == Some(EntityKind::Curve))
        .collect();
    if curves.is_empty() {
        return Err(ReconstructError::Lookup(format!("{}*", naming.surface_prefix)));
    }

    let mut stats = CategoryStats::default();
    for name in curves {
        let source = scene.lookup_mut(&name)?;
        if let Err(e) = source.convert_to_mesh() {
            stats.skip_unit(&name, &e);
            continue;
        }

        let corners = match minimal_rotated_footprint(&source.world_vertices()) {
            Ok(corners) => corners,
            Err(e) => {
                stats.skip_unit(&name, &e);
                continue;
            }
        };

        let slabs = [
            (&config.floor_prefix, config.floor_offset, Category::Floor),
            (&config.ceiling_prefix, config.ceiling_offset, Category::Ceiling),
        ];
        for (prefix, offset, category) in slabs {
            let slab_name = format!("{}{}", prefix, name);
            let built = Prism::new(config.thickness)
                .offset(offset)
                .along_normal()
                .build(&corners);
            match built {
                Ok(mesh) => {
                    let mut slab = Entity::mesh(slab_name, mesh).with_category(category);
                    finish_solid(&mut slab)?;
                    stats.produced.push(scene.insert(slab));
                }
                Err(e) => stats.skip_unit(&slab_name, &e),
            }
        }
    }

    tracing::info!(slabs = stats.produced.len(), "Floor and ceiling slabs built");
    Ok(stats)
}
