// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for reconstruction operations
pub type Result<T> = std::result::Result<T, ReconstructError>;

/// Errors raised while reconstructing a scene
///
/// None of them aborts a run: a lookup or conversion failure skips the
/// category, a geometry failure skips the unit being built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconstructError {
    #[error("Entity not found: {0}")]
    Lookup(String),

    #[error("Cannot convert '{name}' to a mesh: {reason}")]
    Conversion { name: String, reason: String },

    #[error("Geometry error: {0}")]
    Geometry(#[from] plan3d_geometry::Error),

    #[error("Name already in use: {0}")]
    NameCollision(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Scene serialization failed: {0}")]
    Serialization(String),
}
