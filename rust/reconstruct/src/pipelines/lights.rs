// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light fixtures: one entity per drafted symbol, named `Luz`, `Luz.001`, …

use super::{separate_loose_parts, CategoryStats};
use crate::config::{LightConfig, NamingConfig};
use crate::entity::Category;
use crate::error::Result;
use crate::naming::numbered_name;
use crate::scene::Scene;

pub fn run(scene: &mut Scene, config: &LightConfig, naming: &NamingConfig) -> Result<CategoryStats> {
    let mut parts = separate_loose_parts(scene, &naming.lights)?;
    parts.sort();

    let mut stats = CategoryStats::default();
    for (index, part) in parts.iter().enumerate() {
        let name = scene.rename(part, &numbered_name(&config.base_name, index, 0))?;
        let light = scene.lookup_mut(&name)?;
        light.info.category = Category::Light;
        match light.set_origin_to_bounds_center() {
            Ok(()) => {
                tracing::debug!(light = %name, origin = ?light.origin(), "Placed light");
                stats.produced.push(name);
            }
            Err(e) => stats.skip_unit(&name, &e),
        }
    }

    tracing::info!(lights = stats.produced.len(), "Lights placed");
    Ok(stats)
}
