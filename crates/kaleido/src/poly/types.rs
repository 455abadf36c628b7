//! Canvas bounds and per-polygon construction parameters.

use nalgebra::Vector2;

use crate::color::Rgb;
use crate::error::{KaleidoError, Result};
use crate::shape::ShapeKind;

/// Pixel canvas. Valid coordinates are `[0, width) × [0, height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Geometric center `(width/2, height/2)`.
    #[inline]
    pub fn center(&self) -> Vector2<f64> {
        Vector2::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Clamp a point into the canvas: negatives go to 0, overflow goes to `dim - 1`.
    #[inline]
    pub fn clamp(&self, p: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(clamp_axis(p.x, self.width), clamp_axis(p.y, self.height))
    }

    #[inline]
    pub fn contains(&self, p: Vector2<f64>) -> bool {
        p.x >= 0.0 && p.x < self.width as f64 && p.y >= 0.0 && p.y < self.height as f64
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(KaleidoError::invalid(
                "canvas",
                format!("{}x{} has no area", self.width, self.height),
            ));
        }
        Ok(())
    }
}

#[inline]
fn clamp_axis(v: f64, dim: u32) -> f64 {
    if v < 0.0 {
        0.0
    } else if v >= dim as f64 {
        dim as f64 - 1.0
    } else {
        v
    }
}

/// Everything a polygon needs besides its deflection sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolyCfg {
    pub shape: ShapeKind,
    pub scale: f64,
    pub canvas: Canvas,
    pub color: Rgb,
    /// Bound for randomly sampled magnitudes, `[-deflect_bound, deflect_bound]`.
    pub deflect_bound: f64,
}

impl PolyCfg {
    pub(crate) fn validate(&self) -> Result<()> {
        self.canvas.validate()?;
        if !self.scale.is_finite() {
            return Err(KaleidoError::invalid("scale", format!("{} is not finite", self.scale)));
        }
        check_bound("deflect_bound", self.deflect_bound)
    }
}

/// A symmetric sampling bound `b`: finite, `>= 0`, and `[-b, b]` has a finite width.
pub(crate) fn check_bound(name: &'static str, b: f64) -> Result<()> {
    if b >= 0.0 && (2.0 * b).is_finite() {
        Ok(())
    } else {
        Err(KaleidoError::invalid(
            name,
            format!("{b} must be >= 0 with a finite range width"),
        ))
    }
}
