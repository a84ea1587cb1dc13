//! Pack configuration files (`pack.config.json` / `pack.config.toml`).

use std::fs::File;

use camino::{Utf8Path, Utf8PathBuf};
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::errors::CliError;

pub const CONFIG_FILE_STEM: &str = "pack.config";

/// Header values and options that can be stored next to a texture dump.
///
/// Every field is optional; command line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackConfig {
    pub description: Option<String>,
    pub author: Option<String>,
    pub packer: Option<String>,
    /// Banner icon path, relative to the config file.
    pub icon: Option<Utf8PathBuf>,
    pub parallel: Option<bool>,
}

/// Find the config file to use.
///
/// An explicit path must exist. Otherwise `search_dirs` are searched in order
/// for `pack.config.json`, then `pack.config.toml`; finding none is fine.
pub fn resolve_config_path(
    explicit: Option<&Utf8Path>,
    search_dirs: &[&Utf8Path],
) -> Result<Option<Utf8PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(CliError::config_not_found(path.to_path_buf()).into());
        }
        return Ok(Some(path.to_path_buf()));
    }

    for dir in search_dirs {
        if let Some(path) = resolve_correct_config_extension(dir) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

fn resolve_correct_config_extension(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    // JSON first, then TOML
    ["json", "toml"]
        .iter()
        .map(|ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
        .find(|path| path.is_file())
}

/// Load a config file, choosing the format by extension.
///
/// A relative `icon` is resolved against the config file's directory.
pub fn load_config(config_path: &Utf8Path) -> Result<PackConfig> {
    let mut config: PackConfig = match config_path.extension() {
        Some("json") => {
            let file = File::open(config_path)
                .into_diagnostic()
                .with_context(|| format!("Failed to open config file: {config_path}"))?;
            serde_json::from_reader(file)
                .into_diagnostic()
                .with_context(|| format!("Failed to parse JSON config file: {config_path}"))?
        }
        Some("toml") => {
            let content = std::fs::read_to_string(config_path)
                .into_diagnostic()
                .with_context(|| format!("Failed to read config file: {config_path}"))?;
            toml::from_str(&content)
                .into_diagnostic()
                .with_context(|| format!("Failed to parse TOML config file: {config_path}"))?
        }
        _ => {
            return Err(miette!(
                "Unsupported config file extension: {config_path} (expected .json or .toml)"
            ))
        }
    };

    if let (Some(icon), Some(dir)) = (&config.icon, config_path.parent()) {
        if icon.is_relative() {
            config.icon = Some(dir.join(icon));
        }
    }

    tracing::debug!("Loaded pack config from {}: {:?}", config_path, config);
    Ok(config)
}
