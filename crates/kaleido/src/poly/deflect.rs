//! Recursive edge deflection.
//!
//! Model
//! - One deflection step subdivides every edge at its midpoint and pushes the
//!   midpoint perpendicular to the edge by a signed magnitude in canvas units
//!   (`midpoint + m·(sin θ, −cos θ)`, `θ = atan2(dy, dx)`). Positive magnitudes
//!   move the midpoint to the left of the edge direction in screen coordinates.
//! - Each step doubles the vertex count and appends its magnitude to the
//!   deflection history, so `|vertices| = seed × 2^|history|`.
//! - After each step every vertex is clamped into the canvas.
//! - The reference center is fixed at construction and never recomputed.

use nalgebra::Vector2;
use rand::Rng;

use super::types::{check_bound, Canvas, PolyCfg};
use crate::color::Rgb;
use crate::error::{KaleidoError, Result};
use crate::shape::ShapeKind;

/// Most deflection steps a polygon may carry (a hexagon then has 393 216 vertices).
pub const MAX_DEFLECTIONS: usize = 16;

/// A seed polygon plus the deflections applied to it so far.
#[derive(Clone, Debug, PartialEq)]
pub struct DeflectedPolygon {
    pub(crate) vertices: Vec<Vector2<f64>>,
    pub(crate) deflections: Vec<f64>,
    pub(crate) center: Vector2<f64>,
    pub(crate) canvas: Canvas,
    pub(crate) color: Rgb,
    /// Always concrete.
    pub(crate) shape: ShapeKind,
    pub(crate) scale: f64,
    pub(crate) deflect_bound: f64,
}

impl DeflectedPolygon {
    /// Seed polygon with no deflections. A `Random` shape is resolved here, once.
    pub fn new<R: Rng + ?Sized>(cfg: PolyCfg, rng: &mut R) -> Result<Self> {
        cfg.validate()?;
        let shape = cfg.shape.resolve(rng);
        let center = cfg.canvas.center();
        Ok(Self {
            vertices: shape.place(cfg.scale, center),
            deflections: Vec::new(),
            center,
            canvas: cfg.canvas,
            color: cfg.color,
            shape,
            scale: cfg.scale,
            deflect_bound: cfg.deflect_bound,
        })
    }

    /// Seed polygon followed by `recurse(count, explicit)`.
    pub fn generate<R: Rng + ?Sized>(
        cfg: PolyCfg,
        count: usize,
        explicit: Option<&[f64]>,
        rng: &mut R,
    ) -> Result<Self> {
        let mut p = Self::new(cfg, rng)?;
        p.recurse(count, explicit, rng)?;
        Ok(p)
    }

    /// Rebuild from persisted vertices and history without running any deflection.
    ///
    /// `cfg.shape` must be concrete and agree with the vertex count.
    pub fn from_parts(
        cfg: PolyCfg,
        vertices: Vec<Vector2<f64>>,
        deflections: Vec<f64>,
    ) -> Result<Self> {
        cfg.validate()?;
        if cfg.shape == ShapeKind::Random {
            return Err(KaleidoError::invalid(
                "shape",
                "reconstruction needs a concrete shape kind",
            ));
        }
        if deflections.len() > MAX_DEFLECTIONS {
            return Err(too_deep(deflections.len()));
        }
        let initial = cfg.shape.vertex_count();
        if expected_vertex_count(initial, deflections.len()) != Some(vertices.len()) {
            return Err(KaleidoError::VertexCountMismatch {
                vertices: vertices.len(),
                initial,
                deflections: deflections.len(),
            });
        }
        if vertices.iter().any(|v| !(v.x.is_finite() && v.y.is_finite())) {
            return Err(KaleidoError::invalid("vertices", "non-finite coordinate"));
        }
        if deflections.iter().any(|d| !d.is_finite()) {
            return Err(KaleidoError::invalid("deflections", "non-finite magnitude"));
        }
        Ok(Self {
            vertices,
            deflections,
            center: cfg.canvas.center(),
            canvas: cfg.canvas,
            color: cfg.color,
            shape: cfg.shape,
            scale: cfg.scale,
            deflect_bound: cfg.deflect_bound,
        })
    }

    /// One deflection step; returns the magnitude used.
    ///
    /// `None` samples uniformly from `[-deflect_bound, deflect_bound]`; `Some(m)`
    /// uses `m` exactly, including zero.
    pub fn deflect<R: Rng + ?Sized>(&mut self, angle: Option<f64>, rng: &mut R) -> Result<f64> {
        if self.deflections.len() >= MAX_DEFLECTIONS {
            return Err(too_deep(self.deflections.len() + 1));
        }
        let magnitude = match angle {
            Some(m) if m.is_finite() => m,
            Some(m) => {
                return Err(KaleidoError::invalid(
                    "angle",
                    format!("{m} is not a finite magnitude"),
                ))
            }
            None => rng.gen_range(-self.deflect_bound..=self.deflect_bound),
        };

        let n = self.vertices.len();
        let mut next = Vec::with_capacity(2 * n);
        for k in 0..n {
            let a = self.vertices[k];
            let b = self.vertices[(k + 1) % n];
            next.push(a);
            next.push(displaced_midpoint(a, b, magnitude));
        }
        for v in next.iter_mut() {
            *v = self.canvas.clamp(*v);
        }

        self.vertices = next;
        self.deflections.push(magnitude);
        Ok(magnitude)
    }

    /// Apply `count` deflections; an explicit list (length `count`) is replayed exactly.
    pub fn recurse<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        explicit: Option<&[f64]>,
        rng: &mut R,
    ) -> Result<()> {
        if self.deflections.len().saturating_add(count) > MAX_DEFLECTIONS {
            return Err(too_deep(self.deflections.len().saturating_add(count)));
        }
        match explicit {
            Some(list) => {
                if list.len() != count {
                    return Err(KaleidoError::DeflectionListMismatch {
                        given: list.len(),
                        expected: count,
                    });
                }
                for &m in list {
                    self.deflect(Some(m), rng)?;
                }
            }
            None => {
                for _ in 0..count {
                    self.deflect(None, rng)?;
                }
            }
        }
        Ok(())
    }

    /// Rebuild this polygon's deflections from `source`'s history.
    ///
    /// Step `i` uses `source[i] ± U[distance/2, distance]` with a fair sign. The
    /// polygon is first reset to its seed shape, so the result always has the
    /// same topology as `source` when both share a seed shape.
    pub fn distort<R: Rng + ?Sized>(
        &mut self,
        source: &DeflectedPolygon,
        distance: f64,
        rng: &mut R,
    ) -> Result<()> {
        check_bound("distance", distance)?;
        self.reset();
        for &d in &source.deflections {
            let offset = rng.gen_range(distance / 2.0..=distance);
            let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
            self.deflect(Some(d + offset * sign), rng)?;
        }
        Ok(())
    }

    /// Back to the undeflected seed polygon.
    fn reset(&mut self) {
        self.vertices = self.shape.place(self.scale, self.center);
        self.deflections.clear();
    }

    /// Uniform scale about `c`; used by composition normalization. No clamping.
    pub(crate) fn rescale_about(&mut self, c: Vector2<f64>, factor: f64) {
        for v in self.vertices.iter_mut() {
            *v = (*v - c) * factor + c;
        }
    }

    /// Max `|x − cx|` and max `|y − cy|` over all vertices.
    pub fn extent(&self) -> (f64, f64) {
        self.vertices.iter().fold((0.0_f64, 0.0_f64), |(mx, my), v| {
            (mx.max((v.x - self.center.x).abs()), my.max((v.y - self.center.y).abs()))
        })
    }

    #[inline]
    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.vertices
    }
    #[inline]
    pub fn deflections(&self) -> &[f64] {
        &self.deflections
    }
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
    #[inline]
    pub fn deflection_count(&self) -> usize {
        self.deflections.len()
    }
    #[inline]
    pub fn center(&self) -> Vector2<f64> {
        self.center
    }
    #[inline]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }
    #[inline]
    pub fn color(&self) -> Rgb {
        self.color
    }
    #[inline]
    pub fn shape(&self) -> ShapeKind {
        self.shape
    }
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }
    #[inline]
    pub fn deflect_bound(&self) -> f64 {
        self.deflect_bound
    }
}

fn too_deep(n: usize) -> KaleidoError {
    KaleidoError::invalid(
        "deflections",
        format!("{n} exceeds the limit of {MAX_DEFLECTIONS}"),
    )
}

/// `seed × 2^deflections`, or `None` on overflow.
pub fn expected_vertex_count(seed: usize, deflections: usize) -> Option<usize> {
    let deflections = u32::try_from(deflections).ok()?;
    1usize.checked_shl(deflections).and_then(|f| f.checked_mul(seed))
}

/// Midpoint of `a`–`b` pushed perpendicular to the edge. Coincident ends stay put.
#[inline]
fn displaced_midpoint(a: Vector2<f64>, b: Vector2<f64>, magnitude: f64) -> Vector2<f64> {
    let mid = (a + b) * 0.5;
    let d = b - a;
    if d.x == 0.0 && d.y == 0.0 {
        return mid;
    }
    let theta = d.y.atan2(d.x);
    mid + Vector2::new(theta.sin(), -theta.cos()) * magnitude
}
