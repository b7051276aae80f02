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
//! Entity lifecycle and component storage
//!
//! Slots move through `free -> active -> pending delete -> free`. Deleted
//! records are kept for reuse up to a retention limit; past it only the
//! slot index is recycled.
//!
//! Components are stored per component type id, each column indexed by
//! entity slot. Removals are deferred: they are recorded in a set and
//! applied by [`EntityManager::remove_marked_components`] once per fixed
//! update.
//!
//! Every mutating operation returns the [`EntityEvent`]s it produced. The
//! caller dispatches them after releasing its lock.

use crate::bag::Bag;
use crate::bits::Bits;
use crate::ecs::aspect::Aspect;
use crate::ecs::component::{ErasedCell, ErasedComponent};
use crate::ecs::component_type::ComponentType;
use crate::ecs::entity::EntityRecord;
use crate::ecs::events::EntityEvent;
use crate::ecs::{Entity, EntityId};
use crate::error::{EcsError, Result};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Snapshot of the parts of a record a system needs to re-evaluate it
#[derive(Debug, Clone)]
pub(crate) struct EntityState {
    pub(crate) type_bits: Bits,
    pub(crate) system_bits: Bits,
    pub(crate) enabled: bool,
    pub(crate) deleting: bool,
}

pub(crate) struct EntityManager {
    active: Bag<EntityRecord>,
    recycled: Vec<EntityRecord>,
    free_indices: Vec<u32>,
    next_index: u32,
    by_id: HashMap<EntityId, Entity>,
    next_id: u64,
    components: Bag<Bag<Arc<dyn ErasedCell>>>,
    pending_removals: BTreeSet<(Entity, usize)>,
    pending_refresh: Vec<Entity>,
    pending_delete: Vec<Entity>,
    retention: usize,
    active_count: usize,
    total_created: u64,
    total_removed: u64,
}

impl EntityManager {
    pub(crate) fn new(retention: usize) -> Self {
        EntityManager {
            active: Bag::new(),
            recycled: Vec::new(),
            free_indices: Vec::new(),
            next_index: 0,
            by_id: HashMap::new(),
            next_id: 0,
            components: Bag::new(),
            pending_removals: BTreeSet::new(),
            pending_refresh: Vec::new(),
            pending_delete: Vec::new(),
            retention,
            active_count: 0,
            total_created: 0,
            total_removed: 0,
        }
    }

    /// Create an entity with a generated id
    pub(crate) fn create(&mut self) -> (Entity, Vec<EntityEvent>) {
        let id = self.generate_id();
        self.create_record(id)
    }

    /// Create an entity with a caller-supplied id
    pub(crate) fn create_with_id(&mut self, id: EntityId) -> Result<(Entity, Vec<EntityEvent>)> {
        if self.by_id.contains_key(&id) {
            return Err(EcsError::DuplicateEntityId(id));
        }
        Ok(self.create_record(id))
    }

    /// Reuse a recycled record or a free slot when possible
    fn create_record(&mut self, id: EntityId) -> (Entity, Vec<EntityEvent>) {
        let record = match self.recycled.pop() {
            Some(mut record) => {
                let entity = Entity::new(record.entity.slot(), id);
                record.reset(entity);
                record
            }
            None => {
                let index = match self.free_indices.pop() {
                    Some(index) => index,
                    None => {
                        let index = self.next_index;
                        self.next_index += 1;
                        index
                    }
                };
                EntityRecord::new(Entity::new(index, id))
            }
        };

        let entity = record.entity;
        self.active.set(entity.index(), record);
        self.by_id.insert(id, entity);
        self.active_count += 1;
        self.total_created += 1;
        (entity, vec![EntityEvent::EntityAdded(entity)])
    }

    fn generate_id(&mut self) -> EntityId {
        loop {
            let candidate = EntityId::new(self.next_id);
            self.next_id += 1;
            if !self.by_id.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn record(&self, entity: Entity) -> Option<&EntityRecord> {
        self.active
            .get(entity.index())
            .filter(|record| record.entity == entity)
    }

    fn record_mut(&mut self, entity: Entity) -> Option<&mut EntityRecord> {
        self.active
            .get_mut(entity.index())
            .filter(|record| record.entity == entity)
    }

    pub(crate) fn is_active(&self, entity: Entity) -> bool {
        self.record(entity).is_some()
    }

    pub(crate) fn entity_by_id(&self, id: EntityId) -> Option<Entity> {
        self.by_id.get(&id).copied()
    }

    pub(crate) fn entity_by_index(&self, index: usize) -> Option<Entity> {
        self.active.get(index).map(|record| record.entity)
    }

    pub(crate) fn state(&self, entity: Entity) -> Option<EntityState> {
        self.record(entity).map(|record| EntityState {
            type_bits: record.type_bits.clone(),
            system_bits: record.system_bits.clone(),
            enabled: record.enabled,
            deleting: record.deleting,
        })
    }

    pub(crate) fn type_bits(&self, entity: Entity) -> Option<Bits> {
        self.record(entity).map(|record| record.type_bits.clone())
    }

    pub(crate) fn set_system_bit(&mut self, entity: Entity, bit: usize, tracked: bool) {
        if let Some(record) = self.record_mut(entity) {
            if tracked {
                record.system_bits.set(bit);
            } else {
                record.system_bits.clear(bit);
            }
        }
    }

    pub(crate) fn is_enabled(&self, entity: Entity) -> bool {
        self.record(entity).map_or(false, |record| record.enabled)
    }

    /// Returns true when the flag changed
    pub(crate) fn set_enabled(&mut self, entity: Entity, enabled: bool) -> bool {
        match self.record_mut(entity) {
            Some(record) if record.enabled != enabled => {
                record.enabled = enabled;
                true
            }
            _ => false,
        }
    }

    /// Store `cell` as the `component_type` component of `entity`
    ///
    /// A displaced component of the same type is reported as removed, and a
    /// pending removal of that type is cancelled.
    pub(crate) fn add_component(
        &mut self,
        entity: Entity,
        component_type: &ComponentType,
        cell: Arc<dyn ErasedCell>,
    ) -> Option<Vec<EntityEvent>> {
        let record = self.record_mut(entity)?;
        record.type_bits.union_with(component_type.bit());

        let mut events = Vec::with_capacity(2);
        let column = self
            .components
            .get_or_insert_with(component_type.id(), Bag::new);
        if let Some(previous) = column.set(entity.index(), Arc::clone(&cell)) {
            if !Arc::ptr_eq(&previous, &cell) {
                events.push(EntityEvent::ComponentRemoved(entity, ErasedComponent::new(previous)));
            }
        }
        self.pending_removals.remove(&(entity, component_type.id()));
        events.push(EntityEvent::ComponentAdded(entity, ErasedComponent::new(cell)));
        self.request_refresh(entity);
        Some(events)
    }

    pub(crate) fn component(&self, entity: Entity, type_id: usize) -> Option<Arc<dyn ErasedCell>> {
        self.record(entity)?;
        self.components
            .get(type_id)
            .and_then(|column| column.get(entity.index()))
            .cloned()
    }

    pub(crate) fn components_of(&self, entity: Entity) -> Vec<ErasedComponent> {
        if !self.is_active(entity) {
            return Vec::new();
        }
        self.components
            .iter()
            .filter_map(|(_, column)| column.get(entity.index()))
            .map(|cell| ErasedComponent::new(Arc::clone(cell)))
            .collect()
    }

    /// Record a deferred removal; returns false if it was already pending
    pub(crate) fn remove_component(&mut self, entity: Entity, type_id: usize) -> bool {
        if !self.is_active(entity) {
            return false;
        }
        self.pending_removals.insert((entity, type_id))
    }

    pub(crate) fn pending_removal_count(&self) -> usize {
        self.pending_removals.len()
    }

    /// Apply every deferred component removal
    pub(crate) fn remove_marked_components(&mut self) -> Vec<EntityEvent> {
        let pending = std::mem::take(&mut self.pending_removals);
        let mut events = Vec::with_capacity(pending.len());

        for (entity, type_id) in pending {
            if !self.is_active(entity) {
                continue;
            }
            let removed = self
                .components
                .get_mut(type_id)
                .and_then(|column| column.take(entity.index()));
            if let Some(cell) = removed {
                if let Some(record) = self.record_mut(entity) {
                    record.type_bits.clear(type_id);
                }
                events.push(EntityEvent::ComponentRemoved(entity, ErasedComponent::new(cell)));
                self.request_refresh(entity);
            }
        }
        events
    }

    /// Queue `entity` for system re-evaluation; repeated requests collapse
    pub(crate) fn request_refresh(&mut self, entity: Entity) -> bool {
        match self.record_mut(entity) {
            Some(record) if !record.refreshing => {
                record.refreshing = true;
                self.pending_refresh.push(entity);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn take_refreshes(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.pending_refresh)
    }

    pub(crate) fn finish_refresh(&mut self, entity: Entity) {
        if let Some(record) = self.record_mut(entity) {
            record.refreshing = false;
        }
    }

    /// Queue `entity` for deletion; repeated requests collapse
    pub(crate) fn request_delete(&mut self, entity: Entity) -> bool {
        match self.record_mut(entity) {
            Some(record) if !record.deleting => {
                record.deleting = true;
                self.pending_delete.push(entity);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn take_deletions(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.pending_delete)
    }

    /// Vacate the slot of `entity`, stripping its components
    pub(crate) fn remove(&mut self, entity: Entity) -> Vec<EntityEvent> {
        if !self.is_active(entity) {
            return Vec::new();
        }
        let mut events = Vec::new();
        let Some(mut record) = self.active.take(entity.index()) else {
            return events;
        };

        for (_, column) in self.components.iter_mut() {
            if let Some(cell) = column.take(entity.index()) {
                events.push(EntityEvent::ComponentRemoved(entity, ErasedComponent::new(cell)));
            }
        }
        self.pending_removals.retain(|(pending, _)| *pending != entity);
        self.by_id.remove(&entity.id());

        record.type_bits.reset();
        record.deleting = false;
        if self.recycled.len() < self.retention {
            self.recycled.push(record);
        } else {
            self.free_indices.push(entity.slot());
        }

        self.active_count -= 1;
        self.total_removed += 1;
        events.push(EntityEvent::EntityRemoved(entity));
        events
    }

    /// Active entities matching `aspect`, in ascending slot order
    pub(crate) fn get_entities(&self, aspect: &Aspect) -> Vec<Entity> {
        self.active
            .iter()
            .filter(|(_, record)| aspect.interests(&record.type_bits))
            .map(|(_, record)| record.entity)
            .collect()
    }

    pub(crate) fn active_entities(&self) -> Vec<Entity> {
        self.active.iter().map(|(_, record)| record.entity).collect()
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active_count
    }

    pub(crate) fn slot_capacity(&self) -> usize {
        self.next_index as usize
    }

    pub(crate) fn total_created(&self) -> u64 {
        self.total_created
    }

    pub(crate) fn total_removed(&self) -> u64 {
        self.total_removed
    }
}
