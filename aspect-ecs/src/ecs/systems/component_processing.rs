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
//! Per-entity processing with typed component access
//!
//! The processor names up to five component types as a tuple. The system's
//! aspect requires all of them, and every call receives fresh handles.
//!
//! ```
//! use aspect_ecs::ecs::{Component, ComponentRef, Entity, World};
//! use aspect_ecs::ecs::systems::ProcessComponents;
//!
//! struct Position(f32);
//! impl Component for Position {}
//! struct Velocity(f32);
//! impl Component for Velocity {}
//!
//! struct Movement;
//!
//! impl ProcessComponents for Movement {
//!     type Components = (Position, Velocity);
//!
//!     fn process(
//!         &mut self,
//!         _world: &World,
//!         _entity: Entity,
//!         (position, velocity): (ComponentRef<Position>, ComponentRef<Velocity>),
//!     ) {
//!         position.write().0 += velocity.read().0;
//!     }
//! }
//! ```

use crate::ecs::aspect::AspectBuilder;
use crate::ecs::component::ComponentSet;
use crate::ecs::system::{ActiveEntities, System};
use crate::ecs::{Entity, World};
use std::ops::{Deref, DerefMut};

/// Logic applied to one entity and its components
pub trait ProcessComponents: Send + 'static {
    /// Component types every processed entity carries
    type Components: ComponentSet;

    /// Extra constraints on top of [`ProcessComponents::Components`]
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new()
    }

    /// Called once when the system is initialized
    fn load_content(&mut self, _world: &World) {}

    /// Called before the first entity of a run
    fn begin(&mut self, _world: &World) {}

    /// Process one entity
    fn process(
        &mut self,
        world: &World,
        entity: Entity,
        components: <Self::Components as ComponentSet>::Refs,
    );

    /// Called after the last entity of a run
    fn end(&mut self, _world: &World) {}

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Calls [`ProcessComponents::process`] for every active entity
#[derive(Debug, Default)]
pub struct EntityComponentProcessingSystem<S> {
    inner: S,
}

impl<S: ProcessComponents> EntityComponentProcessingSystem<S> {
    /// Wrap `inner`
    pub fn new(inner: S) -> Self {
        EntityComponentProcessingSystem { inner }
    }

    /// Unwrap the processor
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> Deref for EntityComponentProcessingSystem<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> DerefMut for EntityComponentProcessingSystem<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: ProcessComponents> System for EntityComponentProcessingSystem<S> {
    fn aspect(&self) -> AspectBuilder {
        self.inner.aspect().all_of::<S::Components>()
    }

    fn load_content(&mut self, world: &World) {
        self.inner.load_content(world);
    }

    fn begin(&mut self, world: &World) {
        self.inner.begin(world);
    }

    fn process_entities(&mut self, world: &World, entities: &ActiveEntities) {
        for entity in entities.values() {
            if let Some(components) = S::Components::fetch(world, *entity) {
                self.inner.process(world, *entity, components);
            }
        }
    }

    fn end(&mut self, world: &World) {
        self.inner.end(world);
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
