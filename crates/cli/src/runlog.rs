//! Plain-text run log: parameters, image list, and the record of every image.

use anyhow::{Context, Result};
use kaleido::codec::Record;
use std::fmt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::stimulus::StimulusSet;

/// Display adapter for the log of `set`, stamped with `unix_secs`.
pub struct RunLog<'a> {
    pub set: &'a StimulusSet,
    pub unix_secs: u64,
}

impl fmt::Display for RunLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = self.set;
        let c = &set.config;
        writeln!(f, "Run on {} (unix seconds)", self.unix_secs)?;
        writeln!(f, "Generator: kaleido {}", kaleido::VERSION)?;
        writeln!(f, "Seed: {}", set.seed)?;
        writeln!(f, "Poly_type: {}", c.shape)?;
        writeln!(f, "Size: {}x{}", c.width, c.height)?;
        writeln!(f, "nPoly: {}", c.layers)?;
        writeln!(f, "Scale: {}", c.scale)?;
        writeln!(f, "Zoom: {}", c.zoom)?;
        writeln!(f, "Num_deflect: {}", c.deflections)?;
        writeln!(f, "Deflect_size: {}", c.deflect_size)?;
        if c.sisters > 0 {
            writeln!(f, "Sisters: {}", c.sisters)?;
            writeln!(f, "Sisters_deflection: {}", c.sister_distance)?;
        }
        if let Some(scheme) = &set.color_scheme {
            let colors: Vec<String> = scheme.iter().map(ToString::to_string).collect();
            writeln!(f, "Color scheme: {}", colors.join("/"))?;
        }
        writeln!(f, "Image List:")?;
        for e in &set.entries {
            writeln!(f, "{}", e.name)?;
        }
        writeln!(f, "Kaleido parameters:")?;
        for e in &set.entries {
            writeln!(f, "{}", e.name)?;
            writeln!(f, "{}", Record(&e.kaleido))?;
        }
        Ok(())
    }
}

/// Write the log for `set` to `path`, stamped with the current time.
pub fn write_log(set: &StimulusSet, path: &Path) -> Result<()> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    std::fs::write(path, RunLog { set, unix_secs: now }.to_string())
        .with_context(|| format!("writing log {}", path.display()))?;
    tracing::info!(path = %path.display(), entries = set.entries.len(), "log written");
    Ok(())
}
