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
//! Entity Component System core
//!
//! This module provides the ECS runtime:
//! - Entities with stable unique ids and recycled slots
//! - Components stored per slot and described by registered types
//! - Aspects matching entities by component signature
//! - Systems scheduled in layers, with synchronous and asynchronous buckets
//! - Deferred removal, deletion and refresh, applied at each fixed update

pub mod aspect;
pub mod component;
pub mod component_type;
pub mod entity;
pub(crate) mod entity_manager;
pub mod events;
pub mod scheduler;
pub mod system;
pub mod systems;
pub mod tags;
pub mod template;
mod world;

pub use aspect::{Aspect, AspectBuilder};
pub use component::{
    Component, ComponentKey, ComponentRef, ComponentSet, ErasedComponent, ResettableComponent,
    NOT_POOLED,
};
pub use component_type::{ComponentType, ComponentTypeRegistry};
pub use entity::{Entity, EntityId, EntityRef};
pub use events::{EntityEvent, Listener, ListenerId};
pub use scheduler::Layer;
pub use system::{ActiveEntities, ExecutionType, System, SystemHandle, UpdateType};
pub use tags::{GroupManager, TagManager};
pub use template::EntityTemplate;
pub use world::{EntityStats, World};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.system_count(), 0);
    }

    #[test]
    fn test_entity_creation() {
        let world = World::new();
        let entity = world.create_entity().entity();
        assert_eq!(world.entity_count(), 1);
        assert!(world.is_alive(entity));
    }
}
