//! Deflected polygons.
//!
//! Purpose
//! - Turn one of the seed shapes into an organic outline by repeated midpoint
//!   deflection, and record the magnitudes so a polygon can be replayed exactly
//!   or re-distorted into a sister.
//!
//! Code cross-refs: `DeflectedPolygon`, `Canvas`, `PolyCfg`, `ShapeKind`

mod deflect;
mod types;

pub use deflect::{expected_vertex_count, DeflectedPolygon, MAX_DEFLECTIONS};
pub use types::{Canvas, PolyCfg};

#[cfg(test)]
mod tests;
