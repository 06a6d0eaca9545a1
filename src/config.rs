//! Container configuration.
//!
//! Options can be built in code, read from environment variables, or (with
//! the `config` feature) parsed from JSON or YAML documents.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::{DiError, DiResult};

/// Behaviour switches for a built container.
///
/// # Examples
///
/// ```
/// use lifetime_di::ContainerOptions;
///
/// let options = ContainerOptions::new()
///     .with_validate_scopes(true)
///     .with_max_depth(32);
/// assert!(options.validate_scopes);
/// assert!(!options.validate_on_build);
/// assert_eq!(options.max_depth, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Reject scoped services reached while constructing a singleton.
    pub validate_scopes: bool,
    /// Run declared-dependency validation in `ServiceCollection::try_build`.
    pub validate_on_build: bool,
    /// Longest in-progress resolution chain before failing.
    pub max_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            validate_scopes: false,
            validate_on_build: false,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

impl ContainerOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 256;
    pub const DEFAULT_ENV_PREFIX: &'static str = "LIFETIME_DI";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validate_scopes(mut self, enabled: bool) -> Self {
        self.validate_scopes = enabled;
        self
    }

    pub fn with_validate_on_build(mut self, enabled: bool) -> Self {
        self.validate_on_build = enabled;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Reads `LIFETIME_DI_*` variables over the defaults.
    pub fn from_env() -> DiResult<Self> {
        Self::from_env_with_prefix(Self::DEFAULT_ENV_PREFIX)
    }

    /// Reads `<PREFIX>_VALIDATE_SCOPES`, `<PREFIX>_VALIDATE_ON_BUILD` and
    /// `<PREFIX>_MAX_DEPTH`; unset variables keep their defaults.
    pub fn from_env_with_prefix(prefix: &str) -> DiResult<Self> {
        let prefix = prefix.to_uppercase();
        let var = |name: &str| env::var(format!("{}_{}", prefix, name)).ok();

        let mut options = Self::default();
        if let Some(value) = var("VALIDATE_SCOPES") {
            options.validate_scopes = parse_bool("VALIDATE_SCOPES", &value)?;
        }
        if let Some(value) = var("VALIDATE_ON_BUILD") {
            options.validate_on_build = parse_bool("VALIDATE_ON_BUILD", &value)?;
        }
        if let Some(value) = var("MAX_DEPTH") {
            options.max_depth = value
                .trim()
                .parse()
                .map_err(|_| DiError::Config(format!("MAX_DEPTH is not a number: {:?}", value)))?;
        }
        options.checked()
    }

    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DiResult<Self> {
        let options: Self = serde_json::from_str(json).map_err(|e| DiError::Config(e.to_string()))?;
        options.checked()
    }

    #[cfg(feature = "config")]
    pub fn from_yaml_str(yaml: &str) -> DiResult<Self> {
        let options: Self = serde_yaml::from_str(yaml).map_err(|e| DiError::Config(e.to_string()))?;
        options.checked()
    }

    fn checked(self) -> DiResult<Self> {
        if self.max_depth == 0 {
            return Err(DiError::Config("max_depth must be greater than 0".to_string()));
        }
        Ok(self)
    }
}

fn parse_bool(name: &str, value: &str) -> DiResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DiError::Config(format!("{} is not a boolean: {:?}", name, value))),
    }
}
