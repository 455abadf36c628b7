//! Deflected-polygon stimuli: geometry engine.
//!
//! Polygons start from a seed shape and are recursively "deflected": every edge
//! midpoint is pushed in or out perpendicular to the edge, doubling the vertex
//! count per step. A `Kaleido` overlays several such polygons with geometric
//! scale decay; sisters re-distort a prototype's recorded deflections within a
//! bounded window.
//!
//! Randomness is always injected as `&mut impl Rng`; use `ReplayToken` to derive
//! reproducible per-task streams.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API.
//! - Prefer clarity over compatibility; breaking changes are fine when they
//!   improve the design.

pub mod api;
pub mod codec;
pub mod color;
pub mod error;
pub mod kaleido;
pub mod poly;
pub mod rng;
pub mod shape;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{KaleidoError, Result};
pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::codec::{decode, encode};
    pub use crate::color::{random_color, Rgb};
    pub use crate::kaleido::{Kaleido, KaleidoParams};
    pub use crate::poly::{Canvas, DeflectedPolygon, PolyCfg};
    pub use crate::rng::ReplayToken;
    pub use crate::shape::ShapeKind;
    pub use crate::{KaleidoError, Result};
    pub use nalgebra::Vector2 as Vec2;
}
