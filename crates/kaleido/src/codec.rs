//! Text record of a composition (`.kdf` descriptor).
//!
//! Grammar
//! ```text
//! poly_type=<s|p|h|r>;size=<W>x<H>;npoly=<N>;deflect=<D>;scale=<f>;zoom=<f>;deflect_size=<f>;colors=<r>,<g>,<b>/...
//! ***
//! DEFLECTS: <f>,<f>,...
//! PV: <x>,<y>,<x>,<y>,...
//! ***
//! ```
//! with one `DEFLECTS`/`PV`/`***` block per layer. Blank lines are ignored.
//! Reals use the shortest representation that parses back to the same `f64`,
//! so `decode(encode(k)) == k` for any finite composition.
//!
//! Each layer's seed shape is recovered from `|PV| / 2 / 2^|DEFLECTS|`.

use std::fmt;

use nalgebra::Vector2;

use crate::color::Rgb;
use crate::error::{KaleidoError, Result};
use crate::kaleido::{Kaleido, KaleidoParams};
use crate::poly::{Canvas, DeflectedPolygon, PolyCfg};
use crate::shape::ShapeKind;

/// Block terminator.
pub const MARKER: &str = "***";

const HEADER_KEYS: [&str; 8] = [
    "poly_type",
    "size",
    "npoly",
    "deflect",
    "scale",
    "zoom",
    "deflect_size",
    "colors",
];

/// Display adapter writing the record of a composition.
pub struct Record<'a>(pub &'a Kaleido);

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let k = self.0;
        let p = k.params();
        let colors = k
            .colors()
            .iter()
            .map(Rgb::to_string)
            .collect::<Vec<_>>()
            .join("/");
        writeln!(
            f,
            "poly_type={};size={}x{};npoly={};deflect={};scale={};zoom={};deflect_size={};colors={}",
            p.shape,
            p.canvas.width,
            p.canvas.height,
            k.layer_count(),
            k.layers().first().map_or(p.deflections, DeflectedPolygon::deflection_count),
            p.base_scale,
            p.zoom,
            p.deflect_size,
            colors
        )?;
        writeln!(f, "{MARKER}")?;
        for layer in k.layers() {
            write_list(f, "DEFLECTS:", layer.deflections().iter().copied())?;
            write_list(f, "PV:", layer.vertices().iter().flat_map(|v| [v.x, v.y]))?;
            writeln!(f, "{MARKER}")?;
        }
        Ok(())
    }
}

fn write_list(
    f: &mut fmt::Formatter<'_>,
    tag: &str,
    values: impl Iterator<Item = f64>,
) -> fmt::Result {
    f.write_str(tag)?;
    for (i, v) in values.enumerate() {
        f.write_str(if i == 0 { " " } else { "," })?;
        write!(f, "{v}")?;
    }
    writeln!(f)
}

/// Serialize a composition to its text record.
pub fn encode(k: &Kaleido) -> String {
    Record(k).to_string()
}

/// Rebuild a composition from its text record. No randomness is involved.
pub fn decode(text: &str) -> Result<Kaleido> {
    let mut lines = Cursor::new(text);
    let mut next = |what: &str| lines.next_line(what);

    let (n, header) = next("header")?;
    let (params, colors) = parse_header(n, header)?;
    params
        .validate()
        .map_err(|e| KaleidoError::parse(n, e.to_string()))?;
    expect_marker(next("`***`")?)?;

    let mut layers = Vec::new();
    for (i, (scale, &color)) in params.layer_scales().zip(&colors).enumerate() {
        let (n, line) = next("DEFLECTS")?;
        let deflections = parse_reals(n, tagged(n, line, "DEFLECTS:")?)?;
        if deflections.len() != params.deflections {
            return Err(KaleidoError::parse(
                n,
                format!(
                    "layer {i} has {} deflections, header says {}",
                    deflections.len(),
                    params.deflections
                ),
            ));
        }
        let (n, line) = next("PV")?;
        let coords = parse_reals(n, tagged(n, line, "PV:")?)?;
        if coords.len() % 2 != 0 {
            return Err(KaleidoError::parse(n, "odd number of vertex coordinates"));
        }
        let vertices: Vec<Vector2<f64>> = coords
            .chunks_exact(2)
            .map(|c| Vector2::new(c[0], c[1]))
            .collect();
        let shape = infer_shape(n, vertices.len(), deflections.len())?;
        if params.shape != ShapeKind::Random && shape != params.shape {
            return Err(KaleidoError::parse(
                n,
                format!("layer {i} is a {shape}, header poly_type is {}", params.shape),
            ));
        }
        let cfg = PolyCfg {
            shape,
            scale,
            canvas: params.canvas,
            color,
            deflect_bound: params.deflect_size,
        };
        let layer = DeflectedPolygon::from_parts(cfg, vertices, deflections)
            .map_err(|e| KaleidoError::parse(n, e.to_string()))?;
        layers.push(layer);
        expect_marker(next("`***`")?)?;
    }
    if let Ok((n, _)) = next("") {
        return Err(KaleidoError::parse(n, "trailing content after last layer"));
    }
    Kaleido::from_layers(params, colors, layers)
}

/// Non-blank, trimmed lines with 1-based line numbers.
struct Cursor<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    last: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            last: 0,
        }
    }

    fn next_line(&mut self, what: &str) -> Result<(usize, &'a str)> {
        for (i, line) in self.lines.by_ref() {
            self.last = i + 1;
            let line = line.trim();
            if !line.is_empty() {
                return Ok((i + 1, line));
            }
        }
        Err(KaleidoError::parse(
            self.last + 1,
            format!("unexpected end of input, expected {what}"),
        ))
    }
}

fn parse_header(n: usize, line: &str) -> Result<(KaleidoParams, Vec<Rgb>)> {
    let fields: Vec<&str> = line.split(';').collect();
    if fields.len() != HEADER_KEYS.len() {
        return Err(KaleidoError::parse(
            n,
            format!("header has {} fields, expected {}", fields.len(), HEADER_KEYS.len()),
        ));
    }
    let mut values = [""; 8];
    for ((slot, field), key) in values.iter_mut().zip(&fields).zip(HEADER_KEYS) {
        *slot = field
            .split_once('=')
            .filter(|(k, _)| k.trim() == key)
            .map(|(_, v)| v.trim())
            .ok_or_else(|| KaleidoError::parse(n, format!("expected `{key}=` in `{field}`")))?;
    }
    let [poly_type, size, npoly, deflect, scale, zoom, deflect_size, colors] = values;

    let mut chars = poly_type.chars();
    let shape = match (chars.next(), chars.next()) {
        (Some(c), None) => ShapeKind::from_code(c),
        _ => None,
    }
    .ok_or_else(|| KaleidoError::parse(n, format!("unknown poly_type `{poly_type}`")))?;

    let (w, h) = size
        .split_once('x')
        .ok_or_else(|| KaleidoError::parse(n, format!("size `{size}` is not WxH")))?;
    let canvas = Canvas::new(parse_num(n, "width", w)?, parse_num(n, "height", h)?);

    let params = KaleidoParams {
        shape,
        canvas,
        layers: parse_num(n, "npoly", npoly)?,
        deflections: parse_num(n, "deflect", deflect)?,
        base_scale: parse_real(n, "scale", scale)?,
        zoom: parse_real(n, "zoom", zoom)?,
        deflect_size: parse_real(n, "deflect_size", deflect_size)?,
    };

    let colors = colors
        .split('/')
        .map(|c| parse_color(n, c))
        .collect::<Result<Vec<_>>>()?;
    if colors.len() != params.layers {
        return Err(KaleidoError::parse(
            n,
            format!("{} colors for {} layers", colors.len(), params.layers),
        ));
    }
    Ok((params, colors))
}

fn parse_color(n: usize, s: &str) -> Result<Rgb> {
    let channels = s
        .split(',')
        .map(|c| parse_num::<u8>(n, "color channel", c))
        .collect::<Result<Vec<_>>>()?;
    match channels[..] {
        [r, g, b] => Ok(Rgb::new(r, g, b)),
        _ => Err(KaleidoError::parse(n, format!("color `{s}` is not r,g,b"))),
    }
}

fn parse_num<T: std::str::FromStr>(n: usize, what: &str, s: &str) -> Result<T> {
    s.trim()
        .parse()
        .map_err(|_| KaleidoError::parse(n, format!("bad {what} `{}`", s.trim())))
}

fn parse_real(n: usize, what: &str, s: &str) -> Result<f64> {
    let v: f64 = parse_num(n, what, s)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(KaleidoError::parse(n, format!("non-finite {what} `{}`", s.trim())))
    }
}

fn parse_reals(n: usize, s: &str) -> Result<Vec<f64>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',').map(|t| parse_real(n, "number", t)).collect()
}

fn tagged<'a>(n: usize, line: &'a str, tag: &str) -> Result<&'a str> {
    line.strip_prefix(tag)
        .map(str::trim)
        .ok_or_else(|| KaleidoError::parse(n, format!("expected `{tag}`, found `{line}`")))
}

fn expect_marker((n, line): (usize, &str)) -> Result<()> {
    if line == MARKER {
        Ok(())
    } else {
        Err(KaleidoError::parse(n, format!("expected `{MARKER}`, found `{line}`")))
    }
}

fn infer_shape(n: usize, vertices: usize, deflections: usize) -> Result<ShapeKind> {
    let seed = u32::try_from(deflections)
        .ok()
        .and_then(|d| 1usize.checked_shl(d))
        .filter(|f| vertices % f == 0)
        .map(|f| vertices / f);
    seed.and_then(ShapeKind::from_vertex_count).ok_or_else(|| {
        KaleidoError::parse(
            n,
            format!("{vertices} vertices after {deflections} deflections match no seed shape"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn sample(seed: u64) -> Kaleido {
        let mut rng = StdRng::seed_from_u64(seed);
        let params = KaleidoParams {
            layers: 2,
            deflections: 2,
            ..KaleidoParams::default()
        };
        Kaleido::make(params, None, &mut rng).unwrap()
    }

    #[test]
    fn header_and_blocks_layout() {
        let k = sample(1);
        let text = encode(&k);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("poly_type=r;size=800x800;npoly=2;deflect=2;scale=1.5;zoom=0.7;deflect_size=90;colors="));
        assert_eq!(lines[1], MARKER);
        assert!(lines[2].starts_with("DEFLECTS: "));
        assert!(lines[3].starts_with("PV: "));
        assert_eq!(lines[4], MARKER);
        assert_eq!(lines.len(), 2 + 3 * 2);
    }

    #[test]
    fn round_trip_after_resize() {
        let mut k = sample(2);
        k.resize(400.0).unwrap();
        let back = decode(&encode(&k)).unwrap();
        assert_eq!(back, k);
    }

    #[test]
    fn zero_deflection_layers() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = KaleidoParams {
            shape: ShapeKind::Pentagon,
            deflections: 0,
            ..KaleidoParams::default()
        };
        let k = Kaleido::make(params, None, &mut rng).unwrap();
        let text = encode(&k);
        assert!(text.contains("DEFLECTS:\n"));
        assert_eq!(decode(&text).unwrap(), k);
    }

    fn line_of(err: KaleidoError) -> usize {
        match err {
            KaleidoError::Parse { line, .. } => line,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_records() {
        let text = encode(&sample(4));
        let cases = [
            ("", 1),
            (&text[..text.len() - 4], 8),
            ("poly_type=s;size=800x800\n***\n", 1),
        ];
        for (input, line) in cases {
            assert_eq!(line_of(decode(input).unwrap_err()), line, "input {input:?}");
        }

        let bad_number = text.replacen("PV: ", "PV: 12abc,", 1);
        assert_eq!(line_of(decode(&bad_number).unwrap_err()), 4);

        let missing_coord = text.replacen("PV: ", "PV: 1,", 1);
        assert_eq!(line_of(decode(&missing_coord).unwrap_err()), 4);

        let bad_key = text.replacen("zoom=", "zoomx=", 1);
        assert_eq!(line_of(decode(&bad_key).unwrap_err()), 1);

        let trailing = format!("{text}garbage\n");
        assert_eq!(line_of(decode(&trailing).unwrap_err()), 9);

        let wrong_colors = text.replacen("colors=", "colors=1,2,3/", 1);
        assert_eq!(line_of(decode(&wrong_colors).unwrap_err()), 1);

        let infinite_zoom = text.replacen("zoom=0.7", "zoom=inf", 1);
        assert_eq!(line_of(decode(&infinite_zoom).unwrap_err()), 1);

        let too_deep = text.replacen("deflect=2", "deflect=40", 1);
        assert_eq!(line_of(decode(&too_deep).unwrap_err()), 1);

        let mut rng = StdRng::seed_from_u64(4);
        let squares = KaleidoParams {
            shape: ShapeKind::Square,
            layers: 2,
            deflections: 2,
            ..KaleidoParams::default()
        };
        let text = encode(&Kaleido::make(squares, None, &mut rng).unwrap());
        assert!(decode(&text).is_ok());
        let hex_header = text.replacen("poly_type=s", "poly_type=h", 1);
        assert_eq!(line_of(decode(&hex_header).unwrap_err()), 4);
    }

    #[test]
    fn rejects_topology_mismatch() {
        let text = encode(&sample(5));
        // One deflection fewer than the header announces.
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let first = lines[2].rsplit_once(',').unwrap().0.to_string();
        let edited = text.replacen(&lines[2], &first, 1);
        assert!(decode(&edited).is_err());
    }

    proptest! {
        #[test]
        fn codec_round_trip(
            seed in any::<u64>(),
            layers in 1usize..4,
            deflections in 0usize..5,
            scale in 0.1f64..3.0,
            zoom in 0.3f64..1.2,
            w in 50u32..1200,
            h in 50u32..1200,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let params = KaleidoParams {
                canvas: Canvas::new(w, h),
                layers,
                deflections,
                base_scale: scale,
                zoom,
                ..KaleidoParams::default()
            };
            let k = Kaleido::make(params, None, &mut rng).unwrap();
            let back = decode(&encode(&k)).unwrap();
            prop_assert_eq!(back.layer_count(), k.layer_count());
            for (a, b) in back.layers().iter().zip(k.layers()) {
                prop_assert_eq!(a.deflections(), b.deflections());
                prop_assert_eq!(a.vertices(), b.vertices());
            }
            prop_assert_eq!(back, k);
        }
    }
}
