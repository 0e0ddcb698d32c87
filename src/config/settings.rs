//! Configuration settings structures

use serde::{Deserialize, Serialize};

use crate::error::BacktracePolicy;
use crate::hook::HookSettings;

/// Main configuration settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Backtrace capture for errors built with `Capture::Auto`
    pub backtrace: BacktracePolicy,

    /// Panic hook settings
    pub hook: HookSettings,
}

/// Partial hook settings for configuration merging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialHookSettings {
    pub install: Option<bool>,
    pub chain_previous: Option<bool>,
    pub log_event: Option<bool>,
}

/// Partial settings for configuration merging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialSettings {
    pub backtrace: Option<BacktracePolicy>,
    pub hook: Option<PartialHookSettings>,
}

impl PartialHookSettings {
    /// Merge another PartialHookSettings into this one
    /// Fields from `other` take precedence over existing fields
    pub fn merge_from(&mut self, other: PartialHookSettings) {
        if other.install.is_some() {
            self.install = other.install;
        }
        if other.chain_previous.is_some() {
            self.chain_previous = other.chain_previous;
        }
        if other.log_event.is_some() {
            self.log_event = other.log_event;
        }
    }

    fn apply_to(&self, hook: &mut HookSettings) {
        if let Some(install) = self.install {
            hook.install = install;
        }
        if let Some(chain_previous) = self.chain_previous {
            hook.chain_previous = chain_previous;
        }
        if let Some(log_event) = self.log_event {
            hook.log_event = log_event;
        }
    }
}

impl PartialSettings {
    /// Merge another PartialSettings into this one
    /// Fields from `other` take precedence over existing fields
    pub fn merge_from(&mut self, other: PartialSettings) {
        if other.backtrace.is_some() {
            self.backtrace = other.backtrace;
        }
        if let Some(hook) = other.hook {
            self.hook.get_or_insert_with(Default::default).merge_from(hook);
        }
    }

    /// Convert partial settings to full settings
    /// Uses defaults for any fields that are None
    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::default();

        if let Some(backtrace) = self.backtrace {
            settings.backtrace = backtrace;
        }
        if let Some(hook) = &self.hook {
            hook.apply_to(&mut settings.hook);
        }

        settings
    }
}
