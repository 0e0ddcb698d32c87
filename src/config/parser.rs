//! Configuration file parsing utilities

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use super::settings::PartialSettings;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "errpanic.toml";

/// Parse a TOML configuration file into PartialSettings
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<PartialSettings> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::not_found(path));
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;

    parse_config_content(&content, path)
}

/// Parse TOML configuration content into PartialSettings
pub fn parse_config_content<P: AsRef<Path>>(content: &str, path: P) -> Result<PartialSettings> {
    toml::from_str(content).map_err(|e| ConfigError::parse(path.as_ref(), e))
}

/// Candidate locations for the default configuration file, in lookup order
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("errpanic").join("config.toml"));
    }
    paths
}

/// Load the first of `paths` that exists, if any
pub fn find_config(paths: &[PathBuf]) -> Result<Option<PartialSettings>> {
    match paths.iter().find(|path| path.is_file()) {
        Some(path) => parse_config_file(path).map(Some),
        None => Ok(None),
    }
}

/// The configuration template written by [`create_default_config`]
pub fn default_config_content() -> &'static str {
    include_str!("default_config.toml")
}

/// Create a default configuration file at the specified path
pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::read(parent, e))?;
        }
    }

    fs::write(path, default_config_content()).map_err(|e| ConfigError::read(path, e))
}
