// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Walls: weld, split into loose parts, extrude to storey height

use super::{convert_in_place, extrude_up, finish_solid, separate_loose_parts, CategoryStats};
use crate::config::{NamingConfig, WallConfig};
use crate::entity::Category;
use crate::error::Result;
use crate::scene::Scene;
use plan3d_geometry::merge_by_distance;

pub fn run(scene: &mut Scene, config: &WallConfig, naming: &NamingConfig) -> Result<CategoryStats> {
    convert_in_place(scene, &naming.walls)?;

    let welded = scene
        .lookup_mut(&naming.walls)?
        .require_mesh_mut()
        .map(|mesh| merge_by_distance(mesh, config.weld_threshold))?;
    tracing::debug!(welded, threshold = config.weld_threshold, "Welded wall vertices");

    let parts = separate_loose_parts(scene, &naming.walls)?;
    let mut stats = CategoryStats::default();

    for name in parts {
        let Some(wall) = scene.get_mut(&name) else {
            continue;
        };
        wall.info.category = Category::Wall;
        let built = extrude_up(wall, config.height).and_then(|_| finish_solid(wall));
        match built {
            Ok(()) => stats.produced.push(name),
            Err(e) => stats.skip_unit(&name, &e),
        }
    }

    tracing::info!(walls = stats.produced.len(), height = config.height, "Walls extruded");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::error::ReconstructError;
    use nalgebra::Point3;
    use plan3d_geometry::{CurveData, Spline};

    fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Spline {
        Spline::poly(
            vec![
                Point3::new(x, y, 0.0),
                Point3::new(x + w, y, 0.0),
                Point3::new(x + w, y + h, 0.0),
                Point3::new(x, y + h, 0.0),
            ],
            true,
        )
    }

    #[test]
    fn test_two_wall_outlines_become_two_solids() {
        let mut scene = Scene::new();
        scene.insert(Entity::curve(
            "00_A_MUROS_curve_",
            CurveData::new(vec![rectangle(0.0, 0.0, 4.0, 0.2), rectangle(0.0, 3.0, 4.0, 0.2)]),
        ));

        let stats = run(&mut scene, &WallConfig::default(), &NamingConfig::default()).unwrap();

        assert_eq!(stats.produced, vec!["00_A_MUROS_curve_", "00_A_MUROS_curve_.001"]);
        for name in &stats.produced {
            let wall = scene.get(name).unwrap();
            assert_eq!(wall.category(), Category::Wall);
            let mesh = wall.as_mesh().unwrap();
            assert!(mesh.signed_volume() > 0.0);
            assert!(mesh.face_uvs.is_some());
        }
    }

    #[test]
    fn test_missing_walls_is_a_lookup_error() {
        let mut scene = Scene::new();
        let result = run(&mut scene, &WallConfig::default(), &NamingConfig::default());
        assert!(matches!(result, Err(ReconstructError::Lookup(_))));
    }
}
