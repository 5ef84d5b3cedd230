//! Model configuration.

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use json_bind_path::DEFAULT_SCOPE_ATTRIBUTE;

/// Settings shared by a [`Model`](crate::Model) and its resolver.
///
/// ```
/// use json_bind::BindConfig;
///
/// let config = BindConfig::from_toml_str("create_arrays = false").unwrap();
/// assert!(!config.create_arrays);
/// assert_eq!(config.scope_attribute, "data-model");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Materialize lists (rather than maps) for missing containers whose
    /// next segment is a list index.
    pub create_arrays: bool,
    /// Attribute scope nodes declare their path piece under.
    pub scope_attribute: String,
}

impl BindConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        debug!(?config, "loaded bind config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scope_attribute.trim().is_empty() {
            return Err(ConfigError::EmptyScopeAttribute);
        }
        Ok(())
    }

    pub fn with_create_arrays(mut self, create_arrays: bool) -> Self {
        self.create_arrays = create_arrays;
        self
    }

    pub fn with_scope_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.scope_attribute = attribute.into();
        self
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            create_arrays: true,
            scope_attribute: DEFAULT_SCOPE_ATTRIBUTE.to_string(),
        }
    }
}
