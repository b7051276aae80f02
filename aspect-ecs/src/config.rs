// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! World and system configuration
//!
//! Both documents are plain TOML, loaded once at startup:
//!
//! ```toml
//! pool_cleanup_delay = 10
//! removed_entities_retention = 100
//! ```
//!
//! ```toml
//! [[systems]]
//! name = "movement"
//! update_type = "fixed_update"
//!
//! [[systems]]
//! name = "render"
//! execution_type = "asynchronous"
//! ```

use crate::ecs::{ExecutionType, UpdateType};
use crate::error::Result;
use serde::Deserialize;

/// Tunables of a [`World`](crate::ecs::World)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Fixed updates between two sweeps of every component pool
    pub pool_cleanup_delay: u32,
    /// Deleted entity records kept for reuse
    pub removed_entities_retention: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            pool_cleanup_delay: 10,
            removed_entities_retention: 100,
        }
    }
}

impl WorldConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of fixed updates between pool sweeps
    pub fn with_pool_cleanup_delay(mut self, delay: u32) -> Self {
        self.pool_cleanup_delay = delay;
        self
    }

    /// Set how many deleted records are kept for reuse
    pub fn with_removed_entities_retention(mut self, retention: usize) -> Self {
        self.removed_entities_retention = retention;
        self
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// One configured system
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemEntry {
    /// Name looked up in [`SystemFactories`](crate::declare::SystemFactories)
    pub name: String,
    /// Phase the system runs in
    #[serde(default)]
    pub update_type: UpdateType,
    /// Bucket within its layer
    #[serde(default)]
    pub execution_type: ExecutionType,
}

/// Ordered list of systems; an entry's position is its layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SystemsConfig {
    /// Entries in layer order
    #[serde(default)]
    pub systems: Vec<SystemEntry>,
}

impl SystemsConfig {
    /// Parse a TOML document with a `[[systems]]` array
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// True when no system is configured
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EcsError;

    #[test]
    fn test_world_config_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.pool_cleanup_delay, 10);
        assert_eq!(config.removed_entities_retention, 100);

        let partial = WorldConfig::from_toml_str("pool_cleanup_delay = 3").expect("valid toml");
        assert_eq!(partial, WorldConfig::new().with_pool_cleanup_delay(3));
    }

    #[test]
    fn test_systems_config_parsing() {
        let config = SystemsConfig::from_toml_str(
            r#"
            [[systems]]
            name = "movement"
            update_type = "fixed_update"

            [[systems]]
            name = "render"
            execution_type = "asynchronous"
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.len(), 2);
        assert_eq!(config.systems[0].update_type, UpdateType::FixedUpdate);
        assert_eq!(config.systems[0].execution_type, ExecutionType::Synchronous);
        assert_eq!(config.systems[1].update_type, UpdateType::FrameUpdate);
        assert_eq!(config.systems[1].execution_type, ExecutionType::Asynchronous);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let err = SystemsConfig::from_toml_str("[[systems]]\nupdate_type = \"sometimes\"");
        assert!(matches!(err, Err(EcsError::Config(_))));
    }
}
