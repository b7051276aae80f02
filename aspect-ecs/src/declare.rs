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
//! Declarative registration
//!
//! [`Declarations`] collects systems, entity templates and pools up front
//! and hands them to [`World::initialize_with_all_systems`] in one go.
//! [`SystemFactories`] maps names to constructors so a
//! [`SystemsConfig`](crate::config::SystemsConfig) document can pick and
//! order systems at startup.
//!
//! ```
//! use aspect_ecs::declare::{Declarations, SystemAttributes};
//! use aspect_ecs::ecs::systems::{ProcessSystem, ProcessingSystem};
//! use aspect_ecs::ecs::{UpdateType, World};
//!
//! struct Clock(u64);
//!
//! impl ProcessSystem for Clock {
//!     fn process_system(&mut self, _world: &World) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let world = World::new();
//! world.initialize_with_all_systems(
//!     Declarations::new().system(
//!         ProcessingSystem::new(Clock(0)),
//!         SystemAttributes::new().with_update_type(UpdateType::FixedUpdate),
//!     ),
//! );
//! assert_eq!(world.system_count(), 1);
//! ```
//!
//! [`World::initialize_with_all_systems`]: crate::ecs::World::initialize_with_all_systems

use crate::ecs::scheduler::Layer;
use crate::ecs::{EntityTemplate, ExecutionType, System, UpdateType, World};
use crate::error::{EcsError, Result};
use crate::pool::{ComponentPool, PoolConfig, Poolable};
use std::collections::HashMap;
use std::fmt;

/// Where and how a declared system is scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAttributes {
    /// Phase the system runs in
    pub update_type: UpdateType,
    /// Layer within the phase
    pub layer: Layer,
    /// Bucket within the layer
    pub execution_type: ExecutionType,
}

impl SystemAttributes {
    /// Frame update, layer 0, synchronous
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the phase
    pub fn with_update_type(mut self, update_type: UpdateType) -> Self {
        self.update_type = update_type;
        self
    }

    /// Set the layer
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Set the bucket
    pub fn with_execution_type(mut self, execution_type: ExecutionType) -> Self {
        self.execution_type = execution_type;
        self
    }
}

type Registrar = Box<dyn FnOnce(&World) + Send>;

/// Systems, templates and pools to register together
#[derive(Default)]
pub struct Declarations {
    pools: Vec<Registrar>,
    templates: Vec<Registrar>,
    systems: Vec<Registrar>,
}

impl Declarations {
    /// Start an empty declaration list
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a system
    pub fn system<S: System>(mut self, system: S, attributes: SystemAttributes) -> Self {
        self.systems.push(Box::new(move |world: &World| {
            world.set_system(
                system,
                attributes.update_type,
                attributes.layer,
                attributes.execution_type,
            );
        }));
        self
    }

    /// Declare an entity template
    pub fn entity_template<T: EntityTemplate + 'static>(
        mut self,
        name: impl Into<String>,
        template: T,
    ) -> Self {
        let name = name.into();
        self.templates.push(Box::new(move |world: &World| {
            world.set_entity_template(name, template);
        }));
        self
    }

    /// Declare a pool whose instances are built with `T::default`
    pub fn pool<T: Poolable + Default>(mut self, config: PoolConfig) -> Self {
        self.pools.push(Box::new(move |world: &World| {
            world.set_pool(ComponentPool::<T>::new(config));
        }));
        self
    }

    /// Declare a pool whose instances are built by `factory`
    pub fn pool_with<T: Poolable>(
        mut self,
        config: PoolConfig,
        factory: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        self.pools.push(Box::new(move |world: &World| {
            world.set_pool(ComponentPool::with_factory(config, factory));
        }));
        self
    }

    /// Number of declared systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Register everything with `world`: pools, then templates, then systems
    pub(crate) fn apply(self, world: &World) {
        tracing::debug!(
            pools = self.pools.len(),
            templates = self.templates.len(),
            systems = self.systems.len(),
            "applying declarations"
        );
        for register in self
            .pools
            .into_iter()
            .chain(self.templates)
            .chain(self.systems)
        {
            register(world);
        }
    }
}

impl fmt::Debug for Declarations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declarations")
            .field("pools", &self.pools.len())
            .field("templates", &self.templates.len())
            .field("systems", &self.systems.len())
            .finish()
    }
}

type Factory = Box<dyn Fn(&World, UpdateType, Layer, ExecutionType) + Send + Sync>;

/// Name to constructor table for configuration-driven setup
#[derive(Default)]
pub struct SystemFactories {
    factories: HashMap<String, Factory>,
}

impl SystemFactories {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any previous entry
    pub fn register<S: System>(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> S + Send + Sync + 'static,
    ) -> Self {
        self.factories.insert(
            name.into(),
            Box::new(move |world: &World, update, layer, execution| {
                world.initialize_system(factory(), update, layer, execution);
            }),
        );
        self
    }

    /// True when `name` has a factory
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Construct the system named `name` and initialize it in `world`
    pub(crate) fn build(
        &self,
        name: &str,
        world: &World,
        update: UpdateType,
        layer: Layer,
        execution: ExecutionType,
    ) -> Result<()> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| EcsError::UnknownSystem(name.to_owned()))?;
        factory(world, update, layer, execution);
        Ok(())
    }
}

impl fmt::Debug for SystemFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("SystemFactories").field("names", &names).finish()
    }
}
