//! Configuration sources: files and environment variables

use std::path::{Path, PathBuf};

use crate::error::{BacktracePolicy, ConfigError, Result};
use super::parser::{self, DEFAULT_CONFIG_FILE};
use super::settings::{PartialHookSettings, PartialSettings};
use super::ConfigSource;

/// Default environment variable prefix
pub const DEFAULT_ENV_PREFIX: &str = "ERRPANIC";

/// Configuration file source
pub struct FileConfig {
    path: PathBuf,
    name: String,
    priority: u8,
}

impl FileConfig {
    /// Create a new file configuration source with the default path
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            name: "default config file".to_string(),
            priority: 20,
        }
    }

    /// Create a new file configuration source with a custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            name: format!("config file ({})", path.as_ref().display()),
            priority: 20,
        }
    }

    /// Set the priority for this configuration source
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Get the path of this configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfig {
    fn load(&self) -> Result<PartialSettings> {
        parser::parse_config_file(&self.path)
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment variable configuration source
///
/// Reads `<PREFIX>_BACKTRACE`, `<PREFIX>_HOOK`, `<PREFIX>_HOOK_CHAIN` and
/// `<PREFIX>_HOOK_LOG`.
pub struct EnvConfig {
    prefix: String,
    name: String,
    priority: u8,
}

impl EnvConfig {
    /// Create a new environment variable configuration source
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            name: format!("{} environment variables", &prefix),
            prefix,
            priority: 30,
        }
    }

    /// Set the priority for this configuration source
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    fn var(&self, suffix: &str) -> Option<(String, String)> {
        let key = self.key(suffix);
        std::env::var(&key).ok().map(|value| (key, value))
    }

    fn flag(&self, suffix: &str) -> Result<Option<bool>> {
        self.var(suffix)
            .map(|(key, value)| {
                parse_flag(&value).ok_or_else(|| ConfigError::invalid_value(key, value))
            })
            .transpose()
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}

impl ConfigSource for EnvConfig {
    fn load(&self) -> Result<PartialSettings> {
        let mut settings = PartialSettings::default();

        if let Some((key, value)) = self.var("BACKTRACE") {
            let policy = value
                .parse::<BacktracePolicy>()
                .map_err(|_| ConfigError::invalid_value(key, value))?;
            settings.backtrace = Some(policy);
        }

        let hook = PartialHookSettings {
            install: self.flag("HOOK")?,
            chain_previous: self.flag("HOOK_CHAIN")?,
            log_event: self.flag("HOOK_LOG")?,
        };
        if hook != PartialHookSettings::default() {
            settings.hook = Some(hook);
        }

        Ok(settings)
    }

    fn is_available(&self) -> bool {
        ["BACKTRACE", "HOOK", "HOOK_CHAIN", "HOOK_LOG"]
            .iter()
            .any(|suffix| std::env::var_os(self.key(suffix)).is_some())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
