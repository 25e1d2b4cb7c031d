use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use wp_store::StoreConfig;

/// Build the store configuration from an optional TOML file, then apply
/// the `--db` override.
pub fn load_config(file: Option<&Path>, db: Option<PathBuf>) -> anyhow::Result<StoreConfig> {
    let mut config = match file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            parse_config(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => StoreConfig::default(),
    };
    if let Some(db) = db {
        config.path = db;
    }
    Ok(config)
}

fn parse_config(text: &str) -> anyhow::Result<StoreConfig> {
    Ok(toml::from_str(text)?)
}
