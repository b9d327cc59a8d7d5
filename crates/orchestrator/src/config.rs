#![forbid(unsafe_code)]

use crate::context::RequestContext;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const ENV_VERSION: &str = "STREAMCTL_VERSION";
pub const ENV_DEADLINE_MS: &str = "STREAMCTL_DEADLINE_MS";
pub const ENV_AUDIT_ENABLED: &str = "STREAMCTL_AUDIT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    /// Reported by `getVersion`.
    pub version: String,
    /// Applied to every request that does not bring its own deadline.
    pub default_deadline_ms: Option<u64>,
    pub audit: AuditConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    pub enabled: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            default_deadline_ms: None,
            audit: AuditConfig::default(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ControlConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Read `path` (a missing file yields defaults), then apply process environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// [`ControlConfig::load`] with an explicit environment lookup.
    pub fn load_with_env(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_yaml_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err.into()),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(version) = lookup(ENV_VERSION).filter(|v| !v.trim().is_empty()) {
            self.version = version.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_DEADLINE_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_DEADLINE_MS,
                value: raw.clone(),
            })?;
            self.default_deadline_ms = (ms > 0).then_some(ms);
        }
        if let Some(raw) = lookup(ENV_AUDIT_ENABLED) {
            self.audit.enabled = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: ENV_AUDIT_ENABLED,
                        value: raw,
                    });
                }
            };
        }
        Ok(())
    }

    pub fn request_context(&self) -> RequestContext {
        match self.default_deadline_ms {
            Some(ms) => RequestContext::new().with_timeout(Duration::from_millis(ms)),
            None => RequestContext::new(),
        }
    }
}
