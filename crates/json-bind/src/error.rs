use thiserror::Error;

pub use json_bind_path::PathError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("scope_attribute must not be empty")]
    EmptyScopeAttribute,
}
