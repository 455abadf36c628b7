//! Curated internal API for batch tooling (UNSTABLE).
//!
//! Important
//! - This is not a public API. It is a convenience surface for the CLI and
//!   experiments. Breaking changes are allowed and expected.

// Geometry
pub use crate::kaleido::{Kaleido, KaleidoParams, MAX_LAYERS};
pub use crate::poly::{expected_vertex_count, Canvas, DeflectedPolygon, PolyCfg, MAX_DEFLECTIONS};
pub use crate::shape::ShapeKind;
// Colors and randomness
pub use crate::color::{random_color, Rgb};
pub use crate::rng::ReplayToken;
// Descriptor records
pub use crate::codec::{decode as decode_record, encode as encode_record, Record, MARKER};
