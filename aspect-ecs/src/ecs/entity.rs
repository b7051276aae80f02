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
//! Entity management
//!
//! Entities are lightweight handles that tie components together. An
//! [`Entity`] pairs a dense slot index, which is reused after deletion, with
//! a unique [`EntityId`]. The world keeps one record per live slot; a handle
//! is alive only while the record in its slot carries the same id.
//!
//! [`EntityRef`] borrows a world and exposes the entity-centric API.

use crate::bits::Bits;
use crate::ecs::component::{Component, ComponentRef, ErasedComponent};
use crate::ecs::component_type::ComponentType;
use crate::ecs::World;
use crate::error::Result;
use crate::pool::Poolable;
use std::any::Any;
use std::fmt;

/// Unique identifier for an entity
///
/// Either supplied by the caller at creation or generated by the world. No
/// two live entities share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Create a new EntityId from a raw u64 value
    pub fn new(id: u64) -> Self {
        EntityId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity handle: slot index plus unique id
///
/// Handles order by slot index, which is the order systems visit them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    id: EntityId,
}

impl Entity {
    pub(crate) fn new(index: u32, id: EntityId) -> Self {
        Entity { index, id }
    }

    /// Dense slot index, shared by all component columns
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Unique id
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn slot(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}, id: {})", self.index, self.id.0)
    }
}

/// Per-slot bookkeeping owned by the entity manager
#[derive(Debug, Clone)]
pub(crate) struct EntityRecord {
    pub(crate) entity: Entity,
    pub(crate) type_bits: Bits,
    pub(crate) system_bits: Bits,
    pub(crate) enabled: bool,
    pub(crate) deleting: bool,
    pub(crate) refreshing: bool,
}

impl EntityRecord {
    pub(crate) fn new(entity: Entity) -> Self {
        EntityRecord {
            entity,
            type_bits: Bits::new(),
            system_bits: Bits::new(),
            enabled: true,
            deleting: false,
            refreshing: false,
        }
    }

    /// Clear all state so the record can back a new entity
    pub(crate) fn reset(&mut self, entity: Entity) {
        self.entity = entity;
        self.type_bits.reset();
        self.system_bits.reset();
        self.enabled = true;
        self.deleting = false;
        self.refreshing = false;
    }
}

/// Borrowed view of one entity in a world
///
/// All mutations go through the world's deferred protocol: component
/// additions take effect at once but systems only re-evaluate the entity at
/// the next fixed update; removals and deletion are applied at that flush.
#[derive(Clone, Copy)]
pub struct EntityRef<'w> {
    world: &'w World,
    entity: Entity,
}

impl<'w> EntityRef<'w> {
    pub(crate) fn new(world: &'w World, entity: Entity) -> Self {
        EntityRef { world, entity }
    }

    /// The underlying handle
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Unique id
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    /// Slot index
    pub fn index(&self) -> usize {
        self.entity.index()
    }

    /// The world this entity lives in
    pub fn world(&self) -> &'w World {
        self.world
    }

    /// True while the entity has not been removed by a flush
    pub fn is_active(&self) -> bool {
        self.world.is_alive(self.entity)
    }

    /// Attach `component`, replacing any component of the same type
    pub fn add_component<T: Component>(&self, component: T) -> ComponentRef<T> {
        self.world.add_component(self.entity, component)
    }

    /// Attach an existing component handle
    pub fn add_component_ref<T: Component>(&self, component: ComponentRef<T>) {
        self.world.add_component_ref(self.entity, component)
    }

    /// Attach a component taken from the world's pool for `T`
    pub fn add_component_from_pool<T: Poolable>(&self) -> Result<ComponentRef<T>> {
        self.world.add_component_from_pool::<T>(self.entity)
    }

    /// Attach a pooled component after running `init` on it
    pub fn add_component_from_pool_with<T: Poolable>(
        &self,
        init: impl FnOnce(&mut T),
    ) -> Result<ComponentRef<T>> {
        self.world.add_component_from_pool_with(self.entity, init)
    }

    /// Get the component of type `T`
    pub fn get_component<T: Component>(&self) -> Option<ComponentRef<T>> {
        self.world.get_component::<T>(self.entity)
    }

    /// Get the component of a runtime-described type
    pub fn get_component_by_type(&self, component_type: &ComponentType) -> Option<ErasedComponent> {
        self.world.get_component_by_type(self.entity, component_type)
    }

    /// True when a component of type `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.world.has_component::<T>(self.entity)
    }

    /// Mark the `T` component for removal at the next fixed update
    pub fn remove_component<T: Component>(&self) {
        self.world.remove_component::<T>(self.entity)
    }

    /// Mark a runtime-described component for removal at the next fixed update
    pub fn remove_component_by_type(&self, component_type: &ComponentType) {
        self.world.remove_component_by_type(self.entity, component_type)
    }

    /// Every attached component
    pub fn components(&self) -> Vec<ErasedComponent> {
        self.world.components_of(self.entity)
    }

    /// True when the `T` component supports [`ResettableComponent`]
    ///
    /// [`ResettableComponent`]: crate::ecs::ResettableComponent
    pub fn can_reset<T: Component>(&self) -> bool {
        self.world.can_reset::<T>(self.entity)
    }

    /// Reset the `T` component in place; returns false if it cannot be reset
    pub fn reset_component<T: Component>(&self, args: &[&dyn Any]) -> bool {
        self.world.reset_component::<T>(self.entity, args)
    }

    /// Ask systems to re-evaluate this entity at the next fixed update
    pub fn refresh(&self) {
        self.world.refresh_entity(self.entity)
    }

    /// Delete the entity at the next fixed update
    pub fn delete(&self) {
        self.world.delete_entity(self.entity)
    }

    /// Whether systems should process this entity
    pub fn is_enabled(&self) -> bool {
        self.world.is_entity_enabled(self.entity)
    }

    /// Enable or disable the entity; takes effect at the next refresh
    pub fn set_enabled(&self, enabled: bool) {
        self.world.set_entity_enabled(self.entity, enabled)
    }

    /// Tag bound to this entity
    pub fn tag(&self) -> Option<String> {
        self.world.tag_of(self.entity)
    }

    /// Bind `tag` to this entity, or unbind with `None`
    pub fn set_tag(&self, tag: Option<&str>) {
        self.world.set_tag(self.entity, tag)
    }

    /// Group this entity belongs to
    pub fn group(&self) -> Option<String> {
        self.world.group_of(self.entity)
    }

    /// Move this entity into `group`, or out of any group with `None`
    pub fn set_group(&self, group: Option<&str>) {
        self.world.set_group(self.entity, group)
    }
}

impl fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&self.entity).finish()
    }
}
