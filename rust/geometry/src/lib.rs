// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan3D Geometry
//!
//! Polygon mesh primitives for turning floor plan curves into solids: curve
//! tessellation with earcutr, vertex welding, extrusion, outward normals,
//! cube UVs, loose-part decomposition, rotated footprints and prism builders.
//! All math uses nalgebra in f64.

pub mod connectivity;
pub mod curve;
pub mod error;
pub mod extrusion;
pub mod footprint;
pub mod mesh;
pub mod normals;
pub mod solid;
pub mod transform;
pub mod triangulation;
pub mod uv;
pub mod weld;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use connectivity::{loose_part_labels, split_by_connectivity};
pub use curve::{BezierKnot, CurveData, Spline, DEFAULT_BEZIER_RESOLUTION};
pub use error::{Error, Result};
pub use extrusion::extrude;
pub use footprint::{axis_aligned_corners, convex_hull, minimal_rotated_footprint, CornerQuad};
pub use mesh::{Face, FaceUv, Mesh};
pub use normals::recompute_outward_normals;
pub use solid::{build_prism, build_stacked_solids, ExtrusionAxis, Prism};
pub use triangulation::{point_in_polygon, signed_area, triangulate_polygon_with_holes};
pub use uv::apply_cube_uv;
pub use weld::merge_by_distance;
