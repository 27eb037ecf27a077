use crate::error::Error;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Top-level powertop2tuned configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub powertop: PowertopConfig,
    pub tunings: TuningsConfig,
    pub profile: ProfileConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory new profiles are written under.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/etc/tuned"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PowertopConfig {
    /// PowerTOP executable, looked up in PATH unless absolute.
    pub binary: String,
    /// Base filename passed to `--html=`.
    pub html_base: PathBuf,
    /// Measurement time in seconds.
    pub time: u32,
}

impl Default for PowertopConfig {
    fn default() -> Self {
        Self {
            binary: "powertop".to_string(),
            html_base: PathBuf::from("/tmp/powertop"),
            time: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TuningsConfig {
    /// Emit tunings uncommented. Input-device autosuspend stays disabled.
    pub enable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Create a standalone profile instead of including the active one.
    pub new_profile: bool,
}

const SYSTEM_CONFIG: &str = "/etc/powertop2tuned/config.toml";

/// Config files in increasing precedence: system-wide, then per-user.
fn layer_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("powertop2tuned").join("config.toml"));
    }
    paths
}

/// Read one config file as a raw TOML table. A missing file is `Ok(None)`.
fn read_layer(path: &Path) -> Result<Option<toml::Value>, Error> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::Config(format!(
                "cannot read {}: {}",
                path.display(),
                e
            )));
        }
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| Error::Config(format!("invalid TOML in {}: {}", path.display(), e)))
}

/// Tables merge key by key; any other value in `top` replaces `base`.
fn overlay(base: toml::Value, top: toml::Value) -> toml::Value {
    match (base, top) {
        (toml::Value::Table(mut table), toml::Value::Table(top)) => {
            for (key, value) in top {
                let value = match table.remove(&key) {
                    Some(below) => overlay(below, value),
                    None => value,
                };
                table.insert(key, value);
            }
            toml::Value::Table(table)
        }
        (_, top) => top,
    }
}

/// Stack the readable layers in order and deserialize the result.
/// Broken layers are skipped; a result that does not fit [`Config`]
/// falls back to the defaults.
fn load_layers(paths: &[PathBuf]) -> Config {
    let merged = paths
        .iter()
        .filter_map(|path| {
            read_layer(path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring config file");
                None
            })
        })
        .reduce(overlay);

    let Some(value) = merged else {
        return Config::default();
    };
    value.try_into().unwrap_or_else(|e| {
        let e = Error::Config(e.to_string());
        tracing::warn!(error = %e, "using default config");
        Config::default()
    })
}

/// Load the layered config. `override_path` replaces the system and
/// user files entirely.
pub fn load(override_path: Option<&Path>) -> Config {
    match override_path {
        Some(path) => {
            if !path.exists() {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
            }
            load_layers(&[path.to_path_buf()])
        }
        None => load_layers(&layer_paths()),
    }
}
