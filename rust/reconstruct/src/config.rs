// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction parameters
//!
//! Defaults reproduce the conventions of the drafting exports this crate
//! consumes. Every struct deserializes from partial JSON: missing fields
//! keep their default.

use crate::error::{ReconstructError, Result};
use serde::{Deserialize, Serialize};

/// Names and prefixes used to discover category input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub walls: String,
    pub doors: String,
    pub windows: String,
    pub orientation: String,
    pub lights: String,
    /// Prefix of the curves that get floor and ceiling slabs
    pub surface_prefix: String,
    /// Prefix of reference groups that are never furniture
    pub reference_prefix: String,
    /// Suffix of raw exported curve groups
    pub curve_suffix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            walls: "00_A_MUROS_curve_".to_string(),
            doors: "00_A_PUERTAS_curve_".to_string(),
            windows: "00_A_CARP_curve_".to_string(),
            orientation: "00_Orientacion_curve_".to_string(),
            lights: "00_Iluminacion_curve_".to_string(),
            surface_prefix: "00_A_MUROS".to_string(),
            reference_prefix: "00_".to_string(),
            curve_suffix: "_curve_".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub height: f64,
    /// Vertices closer than this are welded before decomposition
    pub weld_threshold: f64,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            height: 2.70,
            weld_threshold: 0.0001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    pub height: f64,
    /// Fragments whose largest extent reaches this are door leaves
    pub leaf_threshold: f64,
    pub leaf_name: String,
    /// Only frame fragments with a `.NNN` suffix above this are grouped
    pub min_frame_suffix: u32,
    /// Squared length below which a direction is ignored for the heading
    pub direction_tolerance_sq: f64,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            height: 2.03,
            leaf_threshold: 0.5,
            leaf_name: "PUERTA".to_string(),
            min_frame_suffix: 2,
            direction_tolerance_sq: 1e-6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Fragments with vertices closer than this are merged
    pub vertex_threshold: f64,
    /// Units with bounding-box centres closer than this are merged
    pub center_threshold: f64,
    pub base_height: f64,
    pub mid_height: f64,
    pub top_height: f64,
    /// Kept fraction of the footprint depth for the middle pane
    pub pane_ratio: f64,
    pub base_prefix: String,
    pub mid_prefix: String,
    pub top_prefix: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            vertex_threshold: 0.15,
            center_threshold: 0.5,
            base_height: 0.9,
            mid_height: 1.3,
            top_height: 0.5,
            pane_ratio: 1.0 / 6.0,
            base_prefix: "PRISMA_BASE_".to_string(),
            mid_prefix: "PRISMA_MEDIO_".to_string(),
            top_prefix: "PRISMA_TOP_".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FurnitureConfig {
    /// Name of a marker is `<fragment>_seg<i>`
    pub marker_separator: String,
}

impl Default for FurnitureConfig {
    fn default() -> Self {
        Self {
            marker_separator: "_seg".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub thickness: f64,
    pub floor_offset: f64,
    pub ceiling_offset: f64,
    pub floor_prefix: String,
    pub ceiling_prefix: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            thickness: 0.1,
            floor_offset: -0.1,
            ceiling_offset: 2.7,
            floor_prefix: "FLOOR_LOWER_".to_string(),
            ceiling_prefix: "FLOOR_UPPER_".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub base_name: String,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            base_name: "Luz".to_string(),
        }
    }
}

/// All reconstruction parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    pub naming: NamingConfig,
    pub walls: WallConfig,
    pub doors: DoorConfig,
    pub windows: WindowConfig,
    pub furniture: FurnitureConfig,
    pub surfaces: SurfaceConfig,
    pub lights: LightConfig,
}

impl ReconstructionConfig {
    /// Parse and validate a (possibly partial) JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ReconstructError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject heights, thresholds and ratios the builders cannot use
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("walls.height", self.walls.height),
            ("doors.height", self.doors.height),
            ("doors.leaf_threshold", self.doors.leaf_threshold),
            ("windows.vertex_threshold", self.windows.vertex_threshold),
            ("windows.center_threshold", self.windows.center_threshold),
            ("windows.base_height", self.windows.base_height),
            ("windows.mid_height", self.windows.mid_height),
            ("windows.top_height", self.windows.top_height),
            ("surfaces.thickness", self.surfaces.thickness),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ReconstructError::Config(format!(
                    "{} must be positive, got {}",
                    field, value
                )));
            }
        }
        if !(self.walls.weld_threshold.is_finite() && self.walls.weld_threshold >= 0.0) {
            return Err(ReconstructError::Config(format!(
                "walls.weld_threshold must not be negative, got {}",
                self.walls.weld_threshold
            )));
        }
        if !(self.windows.pane_ratio > 0.0 && self.windows.pane_ratio <= 1.0) {
            return Err(ReconstructError::Config(format!(
                "windows.pane_ratio must be in (0, 1], got {}",
                self.windows.pane_ratio
            )));
        }
        if self.lights.base_name.is_empty() || self.doors.leaf_name.is_empty() {
            return Err(ReconstructError::Config(
                "generated base names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
