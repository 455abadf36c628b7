//! `<log-stem>.provenance.json`: code revision, seed, settings and outputs of a run.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What a batch run recorded besides its log.
pub struct Payload {
    pub seed: u64,
    pub params: Value,
    pub outputs: Vec<String>,
}

impl Payload {
    pub fn new(seed: u64, params: Value) -> Self {
        Self {
            seed,
            params,
            outputs: Vec::new(),
        }
    }

    pub fn with_outputs<I, P>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.outputs
            .extend(outputs.into_iter().map(|p| p.as_ref().to_string_lossy().into_owned()));
        self
    }
}

/// Write the sidecar next to `log` and return its path.
pub fn write_sidecar(log: &Path, payload: Payload) -> Result<PathBuf> {
    let path = sidecar_path(log);
    let doc = json!({
        "code_rev": current_git_rev(),
        "version": kaleido::VERSION,
        "log": log.to_string_lossy(),
        "seed": payload.seed,
        "params": payload.params,
        "outputs": payload.outputs,
    });
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn sidecar_path(log: &Path) -> PathBuf {
    let stem = log
        .file_stem()
        .map_or_else(|| "kaleido".into(), |s| s.to_string_lossy().into_owned());
    log.with_file_name(format!("{stem}.provenance.json"))
}

/// `GIT_COMMIT` if set, else `git rev-parse HEAD`, else `"unknown"`.
pub fn current_git_rev() -> String {
    std::env::var("GIT_COMMIT")
        .ok()
        .filter(|rev| !rev.is_empty())
        .or_else(|| {
            let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
            out.status
                .success()
                .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}
