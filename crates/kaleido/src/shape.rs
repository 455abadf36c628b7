//! Seed shapes for deflected polygons.
//!
//! Templates are centered on the origin with a nominal radius of 100 canvas
//! units; a polygon scales them by its own factor and translates them to the
//! canvas center. Vertices run in screen winding order (y grows downward).

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector2;
use rand::Rng;

use crate::error::KaleidoError;

const SQUARE: [(f64, f64); 4] = [(-100.0, -100.0), (-100.0, 100.0), (100.0, 100.0), (100.0, -100.0)];

const PENTAGON: [(f64, f64); 5] = [
    (0.0, -100.0),
    (-95.0, -31.0),
    (-56.0, 81.0),
    (56.0, 81.0),
    (95.0, -31.0),
];

const HEXAGON: [(f64, f64); 6] = [
    (0.0, -100.0),
    (-87.0, -50.0),
    (-87.0, 50.0),
    (0.0, 100.0),
    (87.0, 50.0),
    (87.0, -50.0),
];

/// Seed shape kind. `Random` is a request, resolved once per polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Square,
    Pentagon,
    Hexagon,
    Random,
}

impl ShapeKind {
    /// Concrete kinds a `Random` request chooses from.
    pub const CONCRETE: [ShapeKind; 3] = [ShapeKind::Square, ShapeKind::Pentagon, ShapeKind::Hexagon];

    /// Single-letter code used in descriptors and file names.
    pub fn code(self) -> char {
        match self {
            ShapeKind::Square => 's',
            ShapeKind::Pentagon => 'p',
            ShapeKind::Hexagon => 'h',
            ShapeKind::Random => 'r',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        match c {
            's' => Some(ShapeKind::Square),
            'p' => Some(ShapeKind::Pentagon),
            'h' => Some(ShapeKind::Hexagon),
            'r' => Some(ShapeKind::Random),
            _ => None,
        }
    }

    /// Concrete kind with the given seed vertex count.
    pub fn from_vertex_count(n: usize) -> Option<Self> {
        ShapeKind::CONCRETE
            .into_iter()
            .find(|k| k.template().len() == n)
    }

    /// Pick uniformly among the concrete kinds if this is `Random`.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> ShapeKind {
        match self {
            ShapeKind::Random => ShapeKind::CONCRETE[rng.gen_range(0..ShapeKind::CONCRETE.len())],
            k => k,
        }
    }

    /// Template vertices of a concrete kind. Empty for `Random`.
    pub fn template(self) -> &'static [(f64, f64)] {
        match self {
            ShapeKind::Square => &SQUARE,
            ShapeKind::Pentagon => &PENTAGON,
            ShapeKind::Hexagon => &HEXAGON,
            ShapeKind::Random => &[],
        }
    }

    /// Seed vertex count (0 for `Random`).
    #[inline]
    pub fn vertex_count(self) -> usize {
        self.template().len()
    }

    /// Template scaled by `scale` and translated to `center`.
    pub fn place(self, scale: f64, center: Vector2<f64>) -> Vec<Vector2<f64>> {
        self.template()
            .iter()
            .map(|&(x, y)| Vector2::new(x * scale, y * scale) + center)
            .collect()
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ShapeKind {
    type Err = KaleidoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let kind = match lower.as_str() {
            "s" | "square" => Some(ShapeKind::Square),
            "p" | "pentagon" => Some(ShapeKind::Pentagon),
            "h" | "hexagon" => Some(ShapeKind::Hexagon),
            "r" | "random" => Some(ShapeKind::Random),
            _ => None,
        };
        kind.ok_or_else(|| KaleidoError::invalid("shape", format!("unknown shape kind `{s}`")))
    }
}
