//! Traversal configuration
//!
//! Budgets for both builders, loadable from YAML. Every field has a default,
//! so a file only needs the values it changes:
//!
//! ```yaml
//! ring:
//!   ring0_radius: 2
//! tree:
//!   max_nodes: 30
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::traverse::{RingConfig, TreeConfig};

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Budgets for the ring walker and the genealogy builder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    pub ring: RingConfig,
    pub tree: TreeConfig,
}

impl TraversalConfig {
    /// Parse and validate a YAML document. An empty document yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject budgets that cannot produce a bundle
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tree.max_nodes == 0 {
            return Err(ConfigError::Invalid(
                "tree.max_nodes must be at least 1 (the anchor)".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace the tree budgets with the production preset
    pub fn with_production_tree(mut self) -> Self {
        self.tree = TreeConfig::production();
        self
    }
}
