// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Furniture name normalization

use crate::config::NamingConfig;
use crate::entity::EntityKind;
use crate::error::Result;
use crate::naming::furniture_base_name;
use crate::scene::Scene;

/// Shorten exported furniture curve names to their leading word
///
/// `MesaRectangular_E30_curve_` becomes `MesaRectangular`. Reference groups
/// (`00_…`) are left alone. Returns `(old, new)` pairs in scan order.
pub fn run(scene: &mut Scene, naming: &NamingConfig) -> Result<Vec<(String, String)>> {
    let mut renamed = Vec::new();
    for name in scene.names_of_kind(EntityKind::Curve) {
        let Some(short) = furniture_base_name(&name, &naming.curve_suffix, &naming.reference_prefix)
        else {
            continue;
        };
        if short == name {
            continue;
        }
        let short = short.to_string();
        let stored = scene.rename(&name, &short)?;
        tracing::debug!(from = %name, to = %stored, "Renamed furniture curve");
        renamed.push((name, stored));
    }
    Ok(renamed)
}
