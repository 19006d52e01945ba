use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub static CONFIG_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(option_env!("FACEMATCH_CONFIG_PATH").unwrap_or("/usr/local/etc/facematch/config.toml"))
});

pub static DEFAULT_STORE_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(
        option_env!("FACEMATCH_STORE_PATH").unwrap_or("/usr/local/etc/facematch/catalog.json"),
    )
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the serialized catalog of labeled embeddings.
    pub store_path: PathBuf,
    /// External embedder command; the image path is appended as the last
    /// argument and a JSON array (or null) is expected on stdout.
    pub embedder: String,
    /// How many matches a query returns by default.
    pub top_k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: DEFAULT_STORE_PATH.to_path_buf(),
            embedder: "face-embedder".to_string(),
            top_k: 20,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = load_config(Some(&dir.path().join("nope.toml")))?;
        assert_eq!(cfg.top_k, 20);
        assert_eq!(cfg.store_path, DEFAULT_STORE_PATH.to_path_buf());
        Ok(())
    }

    #[test]
    fn round_trips_through_toml() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        let cfg = Config {
            store_path: PathBuf::from("/tmp/faces.json"),
            embedder: "embed --dim 128".to_string(),
            top_k: 5,
        };
        save_config(&cfg, Some(&path))?;
        let loaded = load_config(Some(&path))?;
        assert_eq!(loaded.store_path, cfg.store_path);
        assert_eq!(loaded.embedder, cfg.embedder);
        assert_eq!(loaded.top_k, 5);
        Ok(())
    }
}
