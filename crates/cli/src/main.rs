mod provenance;
mod render;
mod runlog;
mod stimulus;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kaleido::api::Kaleido;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

use stimulus::{BatchConfig, StimulusSet};

#[derive(Parser)]
#[command(name = "kaleido-cli")]
#[command(about = "Deflected-polygon stimulus generator")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Generate a stimulus set: images, optional sisters, run log
    Generate {
        /// JSON batch config; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
        /// Also write one .kdf descriptor per image
        #[arg(long)]
        descriptors: bool,
        /// Skip frame normalization
        #[arg(long)]
        no_fix_size: bool,
    },
    /// Rasterize a .kdf descriptor
    Render {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Normalize to the canvas frame before drawing
        #[arg(long)]
        fit: bool,
    },
    /// Print the parameters and extents stored in a .kdf descriptor
    Describe {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

/// Batch parameters settable from the command line.
#[derive(Args, Default)]
struct Overrides {
    /// Seed shape: s, p, h or r
    #[arg(long)]
    shape: Option<String>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    layers: Option<usize>,
    #[arg(long)]
    deflections: Option<usize>,
    #[arg(long)]
    scale: Option<f64>,
    #[arg(long)]
    zoom: Option<f64>,
    #[arg(long)]
    deflect_size: Option<f64>,
    #[arg(long)]
    images: Option<usize>,
    #[arg(long)]
    sisters: Option<usize>,
    #[arg(long)]
    sister_distance: Option<f64>,
    #[arg(long)]
    fixed_color: Option<bool>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    stem: Option<String>,
    #[arg(long)]
    extension: Option<String>,
    #[arg(long)]
    out_dir: Option<PathBuf>,
    #[arg(long)]
    log: Option<String>,
}

impl Overrides {
    fn apply(self, cfg: &mut BatchConfig) {
        macro_rules! set {
            ($from:ident => $to:ident: $($field:ident),*) => {
                $(if let Some(v) = $from.$field { $to.$field = v; })*
            };
        }
        let o = self;
        set!(o => cfg:
            shape,
            width,
            height,
            layers,
            deflections,
            scale,
            zoom,
            deflect_size,
            images,
            sisters,
            sister_distance,
            fixed_color,
            stem,
            extension,
            out_dir,
            log
        );
        if o.seed.is_some() {
            cfg.seed = o.seed;
        }
    }
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Generate {
            config,
            overrides,
            descriptors,
            no_fix_size,
        } => generate(config, overrides, descriptors, !no_fix_size),
        Action::Render { input, out, fit } => render_kdf(input, out, fit),
        Action::Describe { input } => describe(input),
        Action::Report => report(),
    }
}

fn generate(
    config: Option<PathBuf>,
    overrides: Overrides,
    descriptors: bool,
    fix_size: bool,
) -> Result<()> {
    let mut cfg = match &config {
        Some(path) => BatchConfig::from_json_file(path)?,
        None => BatchConfig::default(),
    };
    overrides.apply(&mut cfg);
    tracing::info!(config = ?config, images = cfg.images, sisters = cfg.sisters, "generate");

    let mut set = StimulusSet::make_set(cfg)?;
    if fix_size {
        set.fix_size()?;
    }
    let mut outputs = set.write_images()?;
    if descriptors {
        outputs.extend(set.write_descriptors()?);
    }
    let log_path = set.config.out_dir.join(&set.config.log);
    runlog::write_log(&set, &log_path)?;

    let params = serde_json::to_value(&set.config)?;
    let payload = provenance::Payload::new(set.seed, params).with_outputs(&outputs);
    let prov = provenance::write_sidecar(&log_path, payload)?;
    tracing::info!(
        outputs = outputs.len(),
        log = %log_path.display(),
        provenance = %prov.display(),
        "done"
    );
    Ok(())
}

fn read_kdf(input: &Path) -> Result<Kaleido> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    kaleido::codec::decode(&text).with_context(|| format!("decoding {}", input.display()))
}

fn render_kdf(input: PathBuf, out: PathBuf, fit: bool) -> Result<()> {
    tracing::info!(input = %input.display(), out = %out.display(), fit, "render");
    let mut k = read_kdf(&input)?;
    if fit {
        let c = k.params().canvas;
        k.resize((c.width / 2).min(c.height / 2) as f64)?;
    }
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    render::save(&k, &out)
}

fn describe(input: PathBuf) -> Result<()> {
    let k = read_kdf(&input)?;
    let p = k.params();
    println!(
        "Image size ({},{}), shape {}, {} polygons, {} deflections, scale {}, zoom {}",
        p.canvas.width,
        p.canvas.height,
        p.shape,
        k.layer_count(),
        p.deflections,
        p.base_scale,
        p.zoom
    );
    for (i, (layer, (mx, my))) in k.layers().iter().zip(k.extents()).enumerate() {
        println!(
            "Poly {}: init_shape {}, nv {}, color {}, scale {}, max X {:.1}, max Y {:.1}",
            i + 1,
            layer.shape(),
            layer.vertex_count(),
            layer.color(),
            layer.scale(),
            mx,
            my
        );
        println!("  Deflections: {:?}", layer.deflections());
    }
    Ok(())
}

fn report() -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "version": kaleido::VERSION,
        "defaults": BatchConfig::default(),
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
