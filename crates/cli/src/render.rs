//! Raster output: flat-filled polygons on a black canvas.
//!
//! Layers are painted back-to-front. Each polygon is filled with an even-odd
//! scanline rule sampled at pixel centers; no anti-aliasing. Vertices outside
//! the canvas (possible after `resize`) are clipped.

use anyhow::{Context, Result};
use image::{Rgb as Pixel, RgbImage};
use kaleido::api::{Kaleido, Rgb};
use kaleido::Vec2;
use std::path::Path;

/// Paint every layer of `k` onto a fresh canvas.
pub fn render(k: &Kaleido) -> RgbImage {
    let canvas = k.params().canvas;
    let mut img = RgbImage::new(canvas.width, canvas.height);
    for layer in k.layers() {
        fill_polygon(&mut img, layer.vertices(), layer.color());
    }
    img
}

/// Render and save; the format follows the file extension.
pub fn save(k: &Kaleido, path: &Path) -> Result<()> {
    render(k)
        .save(path)
        .with_context(|| format!("writing image {}", path.display()))?;
    tracing::debug!(path = %path.display(), "image written");
    Ok(())
}

/// Even-odd fill of a closed vertex loop.
pub fn fill_polygon(img: &mut RgbImage, vertices: &[Vec2<f64>], color: Rgb) {
    if vertices.len() < 3 {
        return;
    }
    let (w, h) = img.dimensions();
    let (min_y, max_y) = vertices
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v.y), hi.max(v.y)));
    // Rows whose center `py + 0.5` lies inside [min_y, max_y].
    let y0 = (min_y - 0.5).ceil().max(0.0);
    let y1 = (max_y - 0.5).floor().min(h as f64 - 1.0);
    if y0 > y1 {
        return;
    }
    let pixel = Pixel(color.0);
    let mut xs: Vec<f64> = Vec::with_capacity(vertices.len());
    for py in y0 as u32..=y1 as u32 {
        let sy = py as f64 + 0.5;
        xs.clear();
        for (a, b) in vertices.iter().zip(vertices.iter().cycle().skip(1)) {
            if (a.y <= sy) != (b.y <= sy) {
                xs.push(a.x + (sy - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        xs.sort_by(f64::total_cmp);
        for span in xs.chunks_exact(2) {
            let x0 = (span[0] - 0.5).ceil().max(0.0);
            let x1 = (span[1] - 0.5).floor().min(w as f64 - 1.0);
            if x0 > x1 {
                continue;
            }
            for px in x0 as u32..=x1 as u32 {
                img.put_pixel(px, py, pixel);
            }
        }
    }
}
