//! Kaleido: an ordered stack of deflected polygons sharing one canvas.
//!
//! Model
//! - Layer `i` has scale `base_scale · zoom^i`; layers are drawn back-to-front in
//!   list order, so a zoom below 1 keeps later layers visible on top.
//! - A sister (`copy`) re-distorts each prototype layer with a bounded offset per
//!   step. Topology and decay schedule match the prototype; geometry does not.
//! - `resize` scales everything rigidly about layer 0's center.

use nalgebra::Vector2;
use rand::Rng;

use crate::color::{random_color, Rgb};
use crate::error::{KaleidoError, Result};
use crate::poly::{Canvas, DeflectedPolygon, PolyCfg, MAX_DEFLECTIONS};
use crate::shape::ShapeKind;

/// Most layers a composition may stack.
pub const MAX_LAYERS: usize = 64;

/// Generation parameters of a composition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KaleidoParams {
    /// Requested seed shape; `Random` is resolved per layer.
    pub shape: ShapeKind,
    pub canvas: Canvas,
    pub layers: usize,
    /// Deflection steps per layer.
    pub deflections: usize,
    pub base_scale: f64,
    /// Geometric scale decay between successive layers.
    pub zoom: f64,
    /// Bound on randomly sampled deflection magnitudes.
    pub deflect_size: f64,
}

impl Default for KaleidoParams {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Random,
            canvas: Canvas::new(800, 800),
            layers: 3,
            deflections: 4,
            base_scale: 1.5,
            zoom: 0.7,
            deflect_size: 90.0,
        }
    }
}

impl KaleidoParams {
    /// `base_scale, base_scale·zoom, …` for every layer.
    pub fn layer_scales(&self) -> impl Iterator<Item = f64> {
        let zoom = self.zoom;
        std::iter::successors(Some(self.base_scale), move |s| Some(s * zoom)).take(self.layers)
    }

    /// Layer count, depth and zoom checks; per-layer settings are checked by `PolyCfg`.
    pub fn validate(&self) -> Result<()> {
        if self.layers == 0 || self.layers > MAX_LAYERS {
            return Err(KaleidoError::invalid(
                "layers",
                format!("{} is outside 1..={MAX_LAYERS}", self.layers),
            ));
        }
        if self.deflections > MAX_DEFLECTIONS {
            return Err(KaleidoError::invalid(
                "deflections",
                format!("{} exceeds the limit of {MAX_DEFLECTIONS}", self.deflections),
            ));
        }
        if !self.zoom.is_finite() {
            return Err(KaleidoError::invalid("zoom", format!("{} is not finite", self.zoom)));
        }
        Ok(())
    }

    fn poly_cfg(&self, shape: ShapeKind, scale: f64, color: Rgb) -> PolyCfg {
        PolyCfg {
            shape,
            scale,
            canvas: self.canvas,
            color,
            deflect_bound: self.deflect_size,
        }
    }
}

/// Composition of deflected polygons.
#[derive(Clone, Debug, PartialEq)]
pub struct Kaleido {
    pub(crate) params: KaleidoParams,
    pub(crate) colors: Vec<Rgb>,
    pub(crate) layers: Vec<DeflectedPolygon>,
}

impl Kaleido {
    /// Fresh composition; every layer gets independent randomness.
    ///
    /// Without `colors`, one random color per layer is drawn first.
    pub fn make<R: Rng + ?Sized>(
        params: KaleidoParams,
        colors: Option<Vec<Rgb>>,
        rng: &mut R,
    ) -> Result<Self> {
        params.validate()?;
        let colors = match colors {
            Some(c) if c.len() != params.layers => {
                return Err(KaleidoError::ColorCountMismatch {
                    colors: c.len(),
                    layers: params.layers,
                })
            }
            Some(c) => c,
            None => (0..params.layers).map(|_| random_color(rng)).collect(),
        };
        tracing::debug!(
            shape = %params.shape,
            layers = params.layers,
            deflections = params.deflections,
            "new kaleido"
        );
        let layers = params
            .layer_scales()
            .zip(&colors)
            .map(|(scale, &color)| {
                let cfg = params.poly_cfg(params.shape, scale, color);
                DeflectedPolygon::generate(cfg, params.deflections, None, rng)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            params,
            colors,
            layers,
        })
    }

    /// Sister of `prototype`: each layer re-distorted by `distortion`.
    ///
    /// Each sister layer reuses the prototype layer's resolved seed shape.
    pub fn copy<R: Rng + ?Sized>(prototype: &Kaleido, distortion: f64, rng: &mut R) -> Result<Self> {
        tracing::debug!(distortion, layers = prototype.layers.len(), "copying kaleido");
        let params = prototype.params;
        let layers = params
            .layer_scales()
            .zip(prototype.layers.iter().zip(&prototype.colors))
            .map(|(scale, (source, &color))| -> Result<DeflectedPolygon> {
                let cfg = params.poly_cfg(source.shape(), scale, color);
                let mut p = DeflectedPolygon::new(cfg, rng)?;
                p.distort(source, distortion, rng)?;
                Ok(p)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            params,
            colors: prototype.colors.clone(),
            layers,
        })
    }

    /// Rebuild from already-reconstructed layers (codec path).
    pub(crate) fn from_layers(
        params: KaleidoParams,
        colors: Vec<Rgb>,
        layers: Vec<DeflectedPolygon>,
    ) -> Result<Self> {
        params.validate()?;
        if colors.len() != params.layers {
            return Err(KaleidoError::ColorCountMismatch {
                colors: colors.len(),
                layers: params.layers,
            });
        }
        if layers.len() != params.layers {
            return Err(KaleidoError::LayerCountMismatch {
                left: params.layers,
                right: layers.len(),
            });
        }
        Ok(Self {
            params,
            colors,
            layers,
        })
    }

    /// Scale every layer about layer 0's center so the largest half-axis
    /// deviation becomes `target_radius`. Returns the factor applied.
    pub fn resize(&mut self, target_radius: f64) -> Result<f64> {
        if !target_radius.is_finite() || target_radius <= 0.0 {
            return Err(KaleidoError::invalid(
                "target_radius",
                format!("{target_radius} must be finite and > 0"),
            ));
        }
        let c = self
            .layers
            .first()
            .map(DeflectedPolygon::center)
            .ok_or_else(|| KaleidoError::invalid("layers", "empty composition"))?;
        let extent = self.half_axis_extent(c);
        if extent <= 0.0 || !extent.is_finite() {
            return Err(KaleidoError::DegenerateExtent);
        }
        let factor = target_radius / extent;
        for p in self.layers.iter_mut() {
            p.rescale_about(c, factor);
        }
        tracing::debug!(target_radius, extent, factor, "resized kaleido");
        Ok(factor)
    }

    /// Largest of `max(x−cx)`, `max(cx−x)`, `max(y−cy)`, `max(cy−y)` over every
    /// vertex of every layer, floored at zero.
    pub fn half_axis_extent(&self, c: Vector2<f64>) -> f64 {
        self.layers
            .iter()
            .flat_map(|p| p.vertices().iter())
            .fold(0.0_f64, |acc, v| {
                acc.max(v.x - c.x)
                    .max(c.x - v.x)
                    .max(v.y - c.y)
                    .max(c.y - v.y)
            })
    }

    /// Sum of squared differences of the deflection histories, layer by layer.
    pub fn similarity(&self, other: &Kaleido) -> Result<f64> {
        if self.layers.len() != other.layers.len() {
            return Err(KaleidoError::LayerCountMismatch {
                left: self.layers.len(),
                right: other.layers.len(),
            });
        }
        let mut r = 0.0;
        for (layer, (a, b)) in self.layers.iter().zip(&other.layers).enumerate() {
            if a.deflection_count() != b.deflection_count() {
                return Err(KaleidoError::DeflectionCountMismatch {
                    layer,
                    left: a.deflection_count(),
                    right: b.deflection_count(),
                });
            }
            r += a
                .deflections()
                .iter()
                .zip(b.deflections())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>();
        }
        Ok(r)
    }

    /// Per-layer `(max |x−cx|, max |y−cy|)`.
    pub fn extents(&self) -> Vec<(f64, f64)> {
        self.layers.iter().map(DeflectedPolygon::extent).collect()
    }

    #[inline]
    pub fn params(&self) -> &KaleidoParams {
        &self.params
    }
    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
    #[inline]
    pub fn layers(&self) -> &[DeflectedPolygon] {
        &self.layers
    }
    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
    /// Vertex count of the back layer (0 for an empty composition).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.layers.first().map_or(0, DeflectedPolygon::vertex_count)
    }
}
