//! Configuration management
//!
//! Settings come from a TOML file and `ERRPANIC_*` environment variables, merged
//! over the defaults in priority order, and are applied once at startup with
//! [`init`].

pub mod file;
pub mod parser;
pub mod settings;

use std::path::PathBuf;

use tracing::debug;

use crate::error::{set_backtrace_policy, Result};
use crate::hook::install_hook;

pub use file::{EnvConfig, FileConfig, DEFAULT_ENV_PREFIX};
pub use parser::{
    create_default_config, default_config_paths, find_config, parse_config_content,
    parse_config_file,
};
pub use settings::{PartialHookSettings, PartialSettings, Settings};

/// Trait for configuration sources
pub trait ConfigSource {
    /// Load configuration from this source
    fn load(&self) -> Result<PartialSettings>;

    /// Check if this configuration source is available
    fn is_available(&self) -> bool;

    /// Get the name of this configuration source for logging
    fn name(&self) -> &str;

    /// Get the priority of this source (higher numbers take precedence)
    fn priority(&self) -> u8 {
        10
    }
}

/// Configuration builder for merging multiple sources
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    partial: PartialSettings,
}

impl ConfigBuilder {
    /// Create a new configuration builder with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge settings from a partial configuration
    pub fn merge(mut self, partial: PartialSettings) -> Self {
        self.partial.merge_from(partial);
        self
    }

    /// Load and merge settings from a configuration source
    pub fn load_from<S: ConfigSource + ?Sized>(self, source: &S) -> Result<Self> {
        if !source.is_available() {
            return Ok(self);
        }

        let partial = source.load()?;
        debug!(source = source.name(), "loaded settings");
        Ok(self.merge(partial))
    }

    /// Try to load from a source, ignoring it if unavailable or broken
    pub fn try_load_from<S: ConfigSource + ?Sized>(self, source: &S) -> Self {
        if !source.is_available() {
            return self;
        }

        match source.load() {
            Ok(partial) => {
                debug!(source = source.name(), "loaded settings");
                self.merge(partial)
            }
            Err(err) => {
                debug!(source = source.name(), error = %err, "ignoring configuration source");
                self
            }
        }
    }

    /// Load every source, lowest priority first so higher priorities win
    pub fn load_all(mut self, sources: &[&dyn ConfigSource]) -> Result<Self> {
        let mut sources = sources.to_vec();
        sources.sort_by_key(|source| source.priority());
        for source in sources {
            self = self.load_from(source)?;
        }
        Ok(self)
    }

    /// Add configuration from a file
    pub fn add_config_file(self, path: &std::path::Path) -> Result<Self> {
        self.load_from(&FileConfig::with_path(path))
    }

    /// Build the final settings
    pub fn build(self) -> Settings {
        self.partial.to_settings()
    }
}

/// Load settings from the default file locations and `ERRPANIC_*` variables
pub fn load() -> Result<Settings> {
    load_with(&parser::default_config_paths(), &EnvConfig::default())
}

/// Load settings from the first existing file in `paths`, then `env` on top
pub fn load_with(paths: &[PathBuf], env: &EnvConfig) -> Result<Settings> {
    let file = parser::find_config(paths)?.unwrap_or_default();
    let builder = ConfigBuilder::new().merge(file).load_from(env)?;
    Ok(builder.build())
}

/// Apply settings to the process: backtrace policy and panic hook
pub fn init(settings: &Settings) {
    set_backtrace_policy(settings.backtrace);
    if settings.hook.install {
        install_hook(&settings.hook);
    }
    debug!(backtrace = %settings.backtrace, hook = settings.hook.install, "errpanic initialized");
}
