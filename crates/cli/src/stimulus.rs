//! Batch of stimuli: prototypes, their sisters, and output naming.

use anyhow::{bail, Context, Result};
use kaleido::api::{Canvas, Kaleido, KaleidoParams, ReplayToken, Rgb, ShapeKind};
use kaleido::color::random_color;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a batch run needs. Missing JSON keys fall back to `Default`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Seed shape code: s, p, h or r.
    pub shape: String,
    pub width: u32,
    pub height: u32,
    pub layers: usize,
    pub deflections: usize,
    pub scale: f64,
    pub zoom: f64,
    pub deflect_size: f64,
    pub images: usize,
    /// Sisters per prototype; 0 disables sister generation.
    pub sisters: usize,
    pub sister_distance: f64,
    /// Share one color scheme across the whole set.
    pub fixed_color: bool,
    /// Explicit scheme for `fixed_color`; drawn from the seed when absent.
    pub colors: Option<Vec<[u8; 3]>>,
    pub seed: Option<u64>,
    pub stem: String,
    pub extension: String,
    pub out_dir: PathBuf,
    pub log: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let k = KaleidoParams::default();
        Self {
            shape: k.shape.to_string(),
            width: k.canvas.width,
            height: k.canvas.height,
            layers: k.layers,
            deflections: k.deflections,
            scale: k.base_scale,
            zoom: k.zoom,
            deflect_size: k.deflect_size,
            images: 10,
            sisters: 3,
            sister_distance: 10.0,
            fixed_color: true,
            colors: None,
            seed: None,
            stem: "kaleido".to_string(),
            extension: ".png".to_string(),
            out_dir: PathBuf::from("."),
            log: "kaleido.log".to_string(),
        }
    }
}

impl BatchConfig {
    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn params(&self) -> Result<KaleidoParams> {
        let shape: ShapeKind = self.shape.parse()?;
        let params = KaleidoParams {
            shape,
            canvas: Canvas::new(self.width, self.height),
            layers: self.layers,
            deflections: self.deflections,
            base_scale: self.scale,
            zoom: self.zoom,
            deflect_size: self.deflect_size,
        };
        params.validate()?;
        Ok(params)
    }

    /// Half of the shorter canvas side, in whole pixels.
    pub fn frame_radius(&self) -> f64 {
        (self.width / 2).min(self.height / 2) as f64
    }
}

/// One output image.
#[derive(Clone, Debug)]
pub struct Stimulus {
    /// Image file name (no directory).
    pub name: String,
    pub kaleido: Kaleido,
    /// Similarity to the prototype, for sisters.
    pub similarity: Option<f64>,
}

impl Stimulus {
    /// Descriptor file name; `n` disambiguates files with equal descriptions.
    pub fn descriptor_name(&self, n: usize) -> String {
        let k = &self.kaleido;
        let p = k.params();
        match self.similarity {
            None => format!(
                "{}_{}p_{}nd_{}nv-{}.kdf",
                p.shape,
                k.layer_count(),
                p.deflections,
                k.vertex_count(),
                n
            ),
            Some(r) => format!(
                "{}_{}p_{}nv_{}-{}.kdf",
                p.shape,
                k.layer_count(),
                k.vertex_count(),
                r as i64,
                n
            ),
        }
    }
}

/// `<stem><NNN><ext>` or `<stem><NNN>_sis<k><ext>`; `index` is 0-based.
pub fn image_name(stem: &str, index: usize, sister: Option<usize>, extension: &str) -> String {
    match sister {
        None => format!("{stem}{:03}{extension}", index + 1),
        Some(k) => format!("{stem}{:03}_sis{k}{extension}", index + 1),
    }
}

/// A generated set of stimuli in output order.
#[derive(Clone, Debug)]
pub struct StimulusSet {
    pub config: BatchConfig,
    pub seed: u64,
    pub color_scheme: Option<Vec<Rgb>>,
    pub entries: Vec<Stimulus>,
}

impl StimulusSet {
    /// Generate every prototype and sister.
    ///
    /// Image `i` draws from `ReplayToken { seed, index: i + 1 }` (index 0 feeds
    /// the shared color scheme), so the set is reproducible for a given seed
    /// whatever the thread count.
    pub fn make_set(config: BatchConfig) -> Result<Self> {
        let params = config.params()?;
        if !config.sister_distance.is_finite() || config.sister_distance < 0.0 {
            bail!("sister_distance must be finite and >= 0, got {}", config.sister_distance);
        }
        let seed = config.seed.unwrap_or_else(rand::random);
        let color_scheme = if config.fixed_color {
            Some(match &config.colors {
                Some(c) => c.iter().map(|&rgb| Rgb(rgb)).collect(),
                None => {
                    let mut rng = ReplayToken::new(seed, 0).to_std_rng();
                    (0..params.layers).map(|_| random_color(&mut rng)).collect()
                }
            })
        } else {
            None
        };
        tracing::info!(
            seed,
            width = config.width,
            height = config.height,
            scale = config.scale,
            zoom = config.zoom,
            layers = config.layers,
            deflections = config.deflections,
            deflect_size = config.deflect_size,
            fixed_color = config.fixed_color,
            "making stimulus set"
        );

        let groups = (0..config.images)
            .into_par_iter()
            .map(|i| make_group(&config, params, color_scheme.clone(), seed, i))
            .collect::<Result<Vec<_>>>()?;
        let entries = groups.into_iter().flatten().collect();
        Ok(Self {
            config,
            seed,
            color_scheme,
            entries,
        })
    }

    /// Normalize every composition to fill the frame.
    pub fn fix_size(&mut self) -> Result<()> {
        let radius = self.config.frame_radius();
        tracing::info!(radius, "fixing size");
        for s in self.entries.iter_mut() {
            s.kaleido
                .resize(radius)
                .with_context(|| format!("resizing {}", s.name))?;
        }
        Ok(())
    }

    /// Rasterize every entry into the output directory.
    pub fn write_images(&self) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.config.out_dir)
            .with_context(|| format!("creating {}", self.config.out_dir.display()))?;
        self.entries
            .par_iter()
            .map(|s| -> Result<PathBuf> {
                let path = self.config.out_dir.join(&s.name);
                crate::render::save(&s.kaleido, &path)?;
                Ok(path)
            })
            .collect()
    }

    /// Write one `.kdf` record per entry.
    pub fn write_descriptors(&self) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.config.out_dir)
            .with_context(|| format!("creating {}", self.config.out_dir.display()))?;
        self.entries
            .iter()
            .enumerate()
            .map(|(n, s)| -> Result<PathBuf> {
                let path = self.config.out_dir.join(s.descriptor_name(n + 1));
                std::fs::write(&path, kaleido::codec::encode(&s.kaleido))
                    .with_context(|| format!("writing {}", path.display()))?;
                Ok(path)
            })
            .collect()
    }
}

fn make_group(
    config: &BatchConfig,
    params: KaleidoParams,
    colors: Option<Vec<Rgb>>,
    seed: u64,
    i: usize,
) -> Result<Vec<Stimulus>> {
    let mut rng = ReplayToken::new(seed, i as u64 + 1).to_std_rng();
    let proto = Kaleido::make(params, colors, &mut rng)
        .with_context(|| format!("making image {}", i + 1))?;
    let ext = &config.extension;
    if config.sisters == 0 {
        return Ok(vec![Stimulus {
            name: image_name(&config.stem, i, None, ext),
            kaleido: proto,
            similarity: None,
        }]);
    }
    let mut group = Vec::with_capacity(config.sisters + 1);
    for j in 0..config.sisters {
        let sister = Kaleido::copy(&proto, config.sister_distance, &mut rng)?;
        let r = proto.similarity(&sister)?;
        group.push(Stimulus {
            name: image_name(&config.stem, i, Some(j + 2), ext),
            kaleido: sister,
            similarity: Some(r),
        });
    }
    group.insert(
        0,
        Stimulus {
            name: image_name(&config.stem, i, Some(1), ext),
            kaleido: proto,
            similarity: None,
        },
    );
    Ok(group)
}
