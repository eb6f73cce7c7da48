// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Curve conversion failed: {0}")]
    Conversion(String),

    #[error("Degenerate geometry: {0}")]
    Degenerate(String),

    #[error("Invalid extrusion parameters: {0}")]
    InvalidExtrusion(String),

    #[error("Index {index} out of range for {len} vertices")]
    InvalidIndex { index: u32, len: usize },

    #[error("Transform is not invertible")]
    SingularTransform,

    #[error("Triangulation failed: {0}")]
    Triangulation(String),
}
