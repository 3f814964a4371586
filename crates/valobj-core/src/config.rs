use serde::{Deserialize, Serialize};
use valobj_store::Retention;

use crate::error::{ValueError, ValueResult};

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Whether equal values resolve to one shared instance. Turning this
    /// off makes every construction build a fresh instance; it exists for
    /// test isolation and debugging.
    pub flyweight: bool,
    /// How long cached instances are kept.
    pub retention: Retention,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            flyweight: true,
            retention: Retention::Strong,
        }
    }
}

impl RegistryConfig {
    /// A configuration with the flyweight cache switched off.
    pub fn without_flyweight() -> Self {
        Self {
            flyweight: false,
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(source: &str) -> ValueResult<Self> {
        toml::from_str(source).map_err(|e| ValueError::Config(e.to_string()))
    }
}
