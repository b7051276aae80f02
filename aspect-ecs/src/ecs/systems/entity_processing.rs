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
//! Per-entity processing

use crate::ecs::aspect::AspectBuilder;
use crate::ecs::system::{ActiveEntities, System};
use crate::ecs::{Entity, World};
use std::ops::{Deref, DerefMut};

/// Logic applied to one entity at a time
///
/// Shared by [`EntityProcessingSystem`], [`TagSystem`] and
/// [`QueueProcessingSystem`]. The last two ignore [`ProcessEntity::aspect`].
///
/// [`TagSystem`]: super::TagSystem
/// [`QueueProcessingSystem`]: super::QueueProcessingSystem
pub trait ProcessEntity: Send + 'static {
    /// Component signature of the processed entities
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new()
    }

    /// Called once when the system is initialized
    fn load_content(&mut self, _world: &World) {}

    /// Called once when the world unloads its systems
    fn unload_content(&mut self, _world: &World) {}

    /// An entity started matching the aspect
    fn on_entity_added(&mut self, _world: &World, _entity: Entity) {}

    /// An entity stopped matching the aspect
    fn on_entity_removed(&mut self, _world: &World, _entity: Entity) {}

    /// Called before the first entity of a run
    fn begin(&mut self, _world: &World) {}

    /// Process one entity
    fn process(&mut self, world: &World, entity: Entity);

    /// Called after the last entity of a run
    fn end(&mut self, _world: &World) {}

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Calls [`ProcessEntity::process`] for every active entity, in ascending
/// slot order
#[derive(Debug, Default)]
pub struct EntityProcessingSystem<S> {
    inner: S,
}

impl<S: ProcessEntity> EntityProcessingSystem<S> {
    /// Wrap `inner`
    pub fn new(inner: S) -> Self {
        EntityProcessingSystem { inner }
    }

    /// Unwrap the processor
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> Deref for EntityProcessingSystem<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> DerefMut for EntityProcessingSystem<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: ProcessEntity> System for EntityProcessingSystem<S> {
    fn aspect(&self) -> AspectBuilder {
        self.inner.aspect()
    }

    fn load_content(&mut self, world: &World) {
        self.inner.load_content(world);
    }

    fn unload_content(&mut self, world: &World) {
        self.inner.unload_content(world);
    }

    fn on_entity_added(&mut self, world: &World, entity: Entity) {
        self.inner.on_entity_added(world, entity);
    }

    fn on_entity_removed(&mut self, world: &World, entity: Entity) {
        self.inner.on_entity_removed(world, entity);
    }

    fn begin(&mut self, world: &World) {
        self.inner.begin(world);
    }

    fn process_entities(&mut self, world: &World, entities: &ActiveEntities) {
        for entity in entities.values() {
            self.inner.process(world, *entity);
        }
    }

    fn end(&mut self, world: &World) {
        self.inner.end(world);
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
