// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan3D Reconstruct
//!
//! Turns the curve groups of a drafted floor plan into building solids.
//!
//! ## Overview
//!
//! A [`Scene`] holds named curve and mesh [`Entity`] values. Categories are
//! discovered by name (`00_A_MUROS_curve_`, `00_A_PUERTAS_curve_`, …) and each
//! one runs through its own pipeline:
//!
//! - **Surfaces**: floor and ceiling slabs over each wall outline
//! - **Furniture**: blocks reduced to footprints facing the nearest
//!   orientation segment
//! - **Walls**: welded, split and extruded to storey height
//! - **Doors**: leaves with a swing heading, frames joined per leaf
//! - **Windows**: fragments merged into units, three stacked solids each
//! - **Lights**: one centred entity per fixture symbol
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plan3d_reconstruct::{reconstruct, ReconstructionConfig, Scene};
//!
//! let mut scene = Scene::from_json(&std::fs::read_to_string("plan.json")?)?;
//! let report = reconstruct(&mut scene, &ReconstructionConfig::default());
//! for (stage, outcome) in &report.outcomes {
//!     println!("{:?}: {:?}", stage, outcome);
//! }
//! let exported = scene.export_snapshot();
//! ```
//!
//! Computed metrics live in [`ElementInfo`]; [`Entity::export_name`] renders
//! them into the legacy `<name>_<angle>R` style names at the boundary.

pub mod cluster;
pub mod config;
pub mod entity;
pub mod error;
pub mod naming;
pub mod orientation;
pub mod pipelines;
pub mod scene;

pub use config::{
    DoorConfig, FurnitureConfig, LightConfig, NamingConfig, ReconstructionConfig, SurfaceConfig,
    WallConfig, WindowConfig,
};
pub use entity::{
    closest_vertex_between, Category, ElementInfo, Entity, EntityKind, Geometry, PlanDimensions,
    SegmentMarker,
};
pub use error::{ReconstructError, Result};
pub use orientation::{SegmentDescriptor, Slope};
pub use pipelines::CategoryStats;
pub use scene::Scene;

use serde::Serialize;

/// Category pipelines in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Surfaces,
    Furniture,
    Walls,
    Doors,
    Windows,
    Lights,
}

impl Stage {
    /// Run order. Furniture needs the orientation group before anything else
    /// consumes reference curves, and surfaces read the wall outlines before
    /// the walls are extruded.
    pub const ORDER: [Stage; 6] = [
        Stage::Surfaces,
        Stage::Furniture,
        Stage::Walls,
        Stage::Doors,
        Stage::Windows,
        Stage::Lights,
    ];

    fn run(self, scene: &mut Scene, config: &ReconstructionConfig) -> Result<CategoryStats> {
        let naming = &config.naming;
        match self {
            Stage::Surfaces => pipelines::surfaces::run(scene, &config.surfaces, naming),
            Stage::Furniture => pipelines::furniture::run(scene, &config.furniture, naming),
            Stage::Walls => pipelines::walls::run(scene, &config.walls, naming),
            Stage::Doors => pipelines::doors::run(scene, &config.doors, naming),
            Stage::Windows => pipelines::windows::run(scene, &config.windows, naming),
            Stage::Lights => pipelines::lights::run(scene, &config.lights, naming),
        }
    }
}

/// How one category ended
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryOutcome {
    Completed {
        produced: Vec<String>,
        skipped_units: usize,
    },
    /// The category input was missing or unusable; earlier mutations stay
    Skipped { reason: ReconstructError },
}

impl CategoryOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CategoryOutcome::Completed { .. })
    }
}

/// Result of a full run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconstructionReport {
    /// Furniture curves renamed before the pipelines ran, `(old, new)`
    pub renamed: Vec<(String, String)>,
    pub outcomes: Vec<(Stage, CategoryOutcome)>,
}

impl ReconstructionReport {
    pub fn outcome(&self, stage: Stage) -> Option<&CategoryOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, outcome)| outcome)
    }
}

/// Rebuild every category of `scene` in place
///
/// Never fails as a whole: a category whose input is missing is reported as
/// skipped and the run moves on to the next one. An invalid `config` skips
/// every category and leaves the scene untouched.
pub fn reconstruct(scene: &mut Scene, config: &ReconstructionConfig) -> ReconstructionReport {
    let mut report = ReconstructionReport::default();

    if let Err(reason) = config.validate() {
        tracing::warn!(reason = %reason, "Invalid configuration, nothing reconstructed");
        report.outcomes = Stage::ORDER
            .iter()
            .map(|&stage| {
                let reason = reason.clone();
                (stage, CategoryOutcome::Skipped { reason })
            })
            .collect();
        return report;
    }

    match pipelines::names::run(scene, &config.naming) {
        Ok(renamed) => report.renamed = renamed,
        Err(e) => tracing::warn!(error = %e, "Furniture name normalization failed"),
    }

    for stage in Stage::ORDER {
        let outcome = match stage.run(scene, config) {
            Ok(stats) => {
                tracing::info!(
                    stage = ?stage,
                    produced = stats.produced.len(),
                    skipped_units = stats.skipped_units,
                    "Category completed"
                );
                CategoryOutcome::Completed {
                    produced: stats.produced,
                    skipped_units: stats.skipped_units,
                }
            }
            Err(reason) => {
                tracing::warn!(stage = ?stage, reason = %reason, "Category skipped");
                CategoryOutcome::Skipped { reason }
            }
        };
        report.outcomes.push((stage, outcome));
    }

    report
}
