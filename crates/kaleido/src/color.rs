//! Fill colors.

use std::fmt;

use rand::Rng;

/// 8-bit RGB fill color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    #[inline]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb([r, g, b])
    }

    /// True when every channel is below 128.
    #[inline]
    pub fn is_dark(&self) -> bool {
        self.0.iter().all(|&c| c < 128)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "{r},{g},{b}")
    }
}

/// Uniform color in `[0,256)^3`, resampled until some channel reaches 128.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    loop {
        let c = Rgb([rng.gen(), rng.gen(), rng.gen()]);
        if !c.is_dark() {
            return c;
        }
    }
}
