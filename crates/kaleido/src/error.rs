//! Error type shared by construction, comparison, normalization and the codec.

use thiserror::Error;

/// Failure modes of the geometry engine.
///
/// Out-of-canvas vertices are never an error: deflection clamps them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KaleidoError {
    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("color list has {colors} entries but the composition has {layers} layers")]
    ColorCountMismatch { colors: usize, layers: usize },
    #[error("explicit deflection list has {given} entries, expected {expected}")]
    DeflectionListMismatch { given: usize, expected: usize },
    #[error("layer counts differ (left={left}, right={right})")]
    LayerCountMismatch { left: usize, right: usize },
    #[error("layer {layer}: deflection counts differ (left={left}, right={right})")]
    DeflectionCountMismatch {
        layer: usize,
        left: usize,
        right: usize,
    },
    #[error("{vertices} vertices cannot come from a {initial}-gon after {deflections} deflections")]
    VertexCountMismatch {
        vertices: usize,
        initial: usize,
        deflections: usize,
    },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("composition has zero extent around its center; cannot rescale")]
    DegenerateExtent,
}

impl KaleidoError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        KaleidoError::Parse {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        KaleidoError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KaleidoError>;
