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
//! World management
//!
//! The World is the central container for all ECS data. It owns the entity
//! manager, the component type registry, the system scheduler, tag and
//! group registries, component pools, entity templates, the shared queues
//! and the blackboard.
//!
//! # Update cycle
//!
//! [`World::fixed_update_with`] runs, in order:
//!
//! 1. deferred component removals
//! 2. the periodic pool sweep (every `pool_cleanup_delay + 1` updates)
//! 3. deferred deletions, most recent first
//! 4. deferred refreshes, re-evaluating each entity against every system
//! 5. the fixed-update layers
//!
//! [`World::frame_update`] runs the frame-update layers only.
//!
//! # Locking
//!
//! Every registry sits behind its own lock, held for the duration of one
//! call and never across user code. Entity events are collected under the
//! entity lock and dispatched to listeners after it is released.

use crate::blackboard::BlackBoard;
use crate::config::{SystemsConfig, WorldConfig};
use crate::declare::{Declarations, SystemFactories};
use crate::ecs::aspect::Aspect;
use crate::ecs::component::{Component, ComponentRef, ErasedComponent};
use crate::ecs::component_type::{ComponentType, ComponentTypeRegistry};
use crate::ecs::entity::{Entity, EntityId, EntityRef};
use crate::ecs::entity_manager::{EntityManager, EntityState};
use crate::ecs::events::{EntityEvent, ListenerId, Listeners};
use crate::ecs::scheduler::{Layer, SystemManager};
use crate::ecs::system::{ExecutionType, SharedSystem, System, SystemCell, SystemHandle, UpdateType};
use crate::ecs::systems::SharedQueues;
use crate::ecs::tags::{GroupManager, TagManager};
use crate::ecs::template::EntityTemplate;
use crate::error::{EcsError, Result};
use crate::pool::{ComponentPoolMultiThread, ErasedPool, Poolable};
use parking_lot::{Mutex, RwLock};
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Entity bookkeeping counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityStats {
    /// Entities currently alive
    pub active: usize,
    /// Entities created since the world was built
    pub created: u64,
    /// Entities removed by deletion flushes
    pub removed: u64,
    /// Slot indices ever handed out
    pub slots: usize,
}

/// The main ECS world container
///
/// World manages entity lifecycles and serves as the central access point
/// for all ECS operations. It is `Sync`: systems running concurrently in an
/// asynchronous bucket share it by reference.
pub struct World {
    config: WorldConfig,
    registry: ComponentTypeRegistry,
    entities: RwLock<EntityManager>,
    systems: RwLock<SystemManager>,
    tags: RwLock<TagManager>,
    groups: RwLock<GroupManager>,
    pools: RwLock<HashMap<TypeId, Arc<dyn ErasedPool>>>,
    templates: RwLock<HashMap<String, Arc<dyn EntityTemplate>>>,
    listeners: RwLock<Listeners>,
    queues: SharedQueues,
    blackboard: BlackBoard,
    delta: Duration,
    last_fixed_update: Instant,
    pool_cleanup_counter: u32,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world with explicit tunables
    pub fn with_config(config: WorldConfig) -> Self {
        World {
            entities: RwLock::new(EntityManager::new(config.removed_entities_retention)),
            config,
            registry: ComponentTypeRegistry::new(),
            systems: RwLock::new(SystemManager::new()),
            tags: RwLock::new(TagManager::new()),
            groups: RwLock::new(GroupManager::new()),
            pools: RwLock::new(HashMap::new()),
            templates: RwLock::new(HashMap::new()),
            listeners: RwLock::new(Listeners::default()),
            queues: SharedQueues::new(),
            blackboard: BlackBoard::new(),
            delta: Duration::ZERO,
            last_fixed_update: Instant::now(),
            pool_cleanup_counter: 0,
        }
    }

    /// The world's tunables
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Component type registry of this world
    pub fn component_types(&self) -> &ComponentTypeRegistry {
        &self.registry
    }

    // ---- entities ----

    /// Create a new entity with a generated id
    pub fn create_entity(&self) -> EntityRef<'_> {
        let (entity, events) = self.entities.write().create();
        tracing::trace!(%entity, "entity created");
        self.dispatch(events);
        EntityRef::new(self, entity)
    }

    /// Create a new entity with a caller-supplied unique id
    pub fn create_entity_with_id(&self, id: EntityId) -> Result<EntityRef<'_>> {
        let (entity, events) = self.entities.write().create_with_id(id)?;
        tracing::trace!(%entity, "entity created");
        self.dispatch(events);
        Ok(EntityRef::new(self, entity))
    }

    /// Create an entity and populate it with the template registered as `name`
    ///
    /// The entity is refreshed once the template has run.
    pub fn create_entity_from_template(&self, name: &str, args: &[&dyn Any]) -> Result<EntityRef<'_>> {
        let template = self.template(name)?;
        let entity = self.create_entity();
        template.build_entity(&entity, args);
        entity.refresh();
        Ok(entity)
    }

    /// Like [`World::create_entity_from_template`] with a caller-supplied id
    pub fn create_entity_from_template_with_id(
        &self,
        id: EntityId,
        name: &str,
        args: &[&dyn Any],
    ) -> Result<EntityRef<'_>> {
        let template = self.template(name)?;
        let entity = self.create_entity_with_id(id)?;
        template.build_entity(&entity, args);
        entity.refresh();
        Ok(entity)
    }

    /// Rebuild an entity from a saved state
    ///
    /// The entity is built from `template` when one is named, then joins
    /// `tag` and `group`, then receives `components`. Components replace any
    /// the template attached for the same type. Empty names count as absent.
    /// Systems see the entity at the next fixed update.
    ///
    /// Pair with [`World::current_state`] to copy entities between worlds.
    pub fn load_entity_state(
        &self,
        template: Option<&str>,
        tag: Option<&str>,
        group: Option<&str>,
        components: impl IntoIterator<Item = ErasedComponent>,
        args: &[&dyn Any],
    ) -> Result<EntityRef<'_>> {
        let entity = match template.filter(|name| !name.is_empty()) {
            Some(name) => self.create_entity_from_template(name, args)?,
            None => self.create_entity(),
        };
        if let Some(tag) = tag.filter(|tag| !tag.is_empty()) {
            entity.set_tag(Some(tag));
        }
        if let Some(group) = group.filter(|group| !group.is_empty()) {
            entity.set_group(Some(group));
        }
        for component in components {
            self.add_erased_component(entity.entity(), component);
        }
        entity.refresh();
        tracing::trace!(entity = %entity.entity(), "entity state loaded");
        Ok(entity)
    }

    fn add_erased_component(&self, entity: Entity, component: ErasedComponent) {
        let component_type = self.registry.type_for_key(component.key());
        let events = self.entities.write().add_component(
            entity,
            &component_type,
            Arc::clone(component.cell()),
        );
        if let Some(events) = events {
            self.dispatch(events);
        }
    }

    fn template(&self, name: &str) -> Result<Arc<dyn EntityTemplate>> {
        self.templates
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| EcsError::MissingEntityTemplate(name.to_owned()))
    }

    /// View of `entity` if it is alive
    pub fn entity(&self, entity: Entity) -> Option<EntityRef<'_>> {
        self.is_alive(entity).then(|| EntityRef::new(self, entity))
    }

    /// Live entity holding the unique id
    pub fn get_entity_by_id(&self, id: EntityId) -> Option<EntityRef<'_>> {
        let entity = self.entities.read().entity_by_id(id)?;
        Some(EntityRef::new(self, entity))
    }

    /// Live entity occupying slot `index`
    pub fn get_entity_by_index(&self, index: usize) -> Option<EntityRef<'_>> {
        let entity = self.entities.read().entity_by_index(index)?;
        Some(EntityRef::new(self, entity))
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.read().is_active(entity)
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.entities.read().active_count()
    }

    /// Every alive entity, in ascending slot order
    pub fn entities(&self) -> Vec<Entity> {
        self.entities.read().active_entities()
    }

    /// Entity bookkeeping counters
    pub fn entity_stats(&self) -> EntityStats {
        let manager = self.entities.read();
        EntityStats {
            active: manager.active_count(),
            created: manager.total_created(),
            removed: manager.total_removed(),
            slots: manager.slot_capacity(),
        }
    }

    /// Delete `entity` at the next fixed update
    ///
    /// Repeated calls before the flush have no further effect.
    pub fn delete_entity(&self, entity: Entity) {
        if self.entities.write().request_delete(entity) {
            tracing::trace!(%entity, "entity marked for deletion");
        }
    }

    /// Re-evaluate `entity` against every system at the next fixed update
    pub fn refresh_entity(&self, entity: Entity) {
        self.entities.write().request_refresh(entity);
    }

    /// Alive entities matching `aspect`, in ascending slot order
    pub fn get_entities(&self, aspect: &Aspect) -> Vec<Entity> {
        self.entities.read().get_entities(aspect)
    }

    /// Snapshot of every alive entity and its components
    pub fn current_state(&self) -> BTreeMap<Entity, Vec<ErasedComponent>> {
        let manager = self.entities.read();
        manager
            .active_entities()
            .into_iter()
            .map(|entity| (entity, manager.components_of(entity)))
            .collect()
    }

    // ---- components ----

    /// Attach `component` to `entity`, replacing any component of the same type
    ///
    /// Systems see the change at the next fixed update.
    pub fn add_component<T: Component>(&self, entity: Entity, component: T) -> ComponentRef<T> {
        let component = ComponentRef::new(component);
        self.add_component_ref(entity, component.clone());
        component
    }

    /// Attach an existing component handle to `entity`
    pub fn add_component_ref<T: Component>(&self, entity: Entity, component: ComponentRef<T>) {
        let component_type = self.registry.type_for::<T>();
        let events = self
            .entities
            .write()
            .add_component(entity, &component_type, component.erased());
        match events {
            Some(events) => self.dispatch(events),
            None => tracing::warn!(
                %entity,
                component = component_type.name(),
                "component added to an entity that is not alive"
            ),
        }
    }

    /// Get the `T` component of `entity`
    ///
    /// A component marked for removal stays readable until the next flush.
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<ComponentRef<T>> {
        let component_type = self.registry.lookup::<T>()?;
        let cell = self.entities.read().component(entity, component_type.id())?;
        ErasedComponent::new(cell).downcast::<T>()
    }

    /// Get the component of a runtime-described type
    pub fn get_component_by_type(
        &self,
        entity: Entity,
        component_type: &ComponentType,
    ) -> Option<ErasedComponent> {
        self.entities
            .read()
            .component(entity, component_type.id())
            .map(ErasedComponent::new)
    }

    /// True when `entity` carries a `T` component
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        let Some(component_type) = self.registry.lookup::<T>() else {
            return false;
        };
        self.entities
            .read()
            .type_bits(entity)
            .map_or(false, |bits| bits.contains(component_type.id()))
    }

    /// Mark the `T` component of `entity` for removal at the next fixed update
    pub fn remove_component<T: Component>(&self, entity: Entity) {
        if let Some(component_type) = self.registry.lookup::<T>() {
            self.remove_component_by_type(entity, &component_type);
        }
    }

    /// Mark a runtime-described component for removal at the next fixed update
    pub fn remove_component_by_type(&self, entity: Entity, component_type: &ComponentType) {
        self.entities
            .write()
            .remove_component(entity, component_type.id());
    }

    /// Every component attached to `entity`
    pub fn components_of(&self, entity: Entity) -> Vec<ErasedComponent> {
        self.entities.read().components_of(entity)
    }

    /// True when the `T` component of `entity` can be reset in place
    pub fn can_reset<T: Component>(&self, entity: Entity) -> bool {
        self.get_component::<T>(entity)
            .map_or(false, |component| component.write().as_resettable().is_some())
    }

    /// Reset the `T` component of `entity` with `args`
    ///
    /// Returns false when there is no such component or it cannot be reset.
    pub fn reset_component<T: Component>(&self, entity: Entity, args: &[&dyn Any]) -> bool {
        let Some(component) = self.get_component::<T>(entity) else {
            return false;
        };
        let mut value = component.write();
        match value.as_resettable() {
            Some(resettable) => {
                resettable.reset(args);
                true
            }
            None => false,
        }
    }

    /// Whether systems should process `entity`
    pub fn is_entity_enabled(&self, entity: Entity) -> bool {
        self.entities.read().is_enabled(entity)
    }

    /// Enable or disable `entity`; systems see the change at the next refresh
    pub fn set_entity_enabled(&self, entity: Entity, enabled: bool) {
        let mut manager = self.entities.write();
        if manager.set_enabled(entity, enabled) {
            manager.request_refresh(entity);
        }
    }

    // ---- tags and groups ----

    /// Bind `tag` to `entity`, or unbind its tag with `None`
    pub fn set_tag(&self, entity: Entity, tag: Option<&str>) {
        if !self.is_alive(entity) {
            return;
        }
        let mut tags = self.tags.write();
        match tag {
            Some(tag) => tags.register(tag, entity),
            None => {
                tags.unregister(entity);
            }
        }
    }

    /// Tag bound to `entity`
    pub fn tag_of(&self, entity: Entity) -> Option<String> {
        self.tags.read().tag_of(entity).map(str::to_owned)
    }

    /// Alive entity bound to `tag`
    pub fn tagged_entity(&self, tag: &str) -> Option<Entity> {
        let entity = self.tags.read().entity(tag)?;
        self.is_alive(entity).then_some(entity)
    }

    /// Move `entity` into `group`, or out of any group with `None`
    pub fn set_group(&self, entity: Entity, group: Option<&str>) {
        if !self.is_alive(entity) {
            return;
        }
        let mut groups = self.groups.write();
        match group {
            Some(group) => groups.set(group, entity),
            None => {
                groups.remove(entity);
            }
        }
    }

    /// Group `entity` belongs to
    pub fn group_of(&self, entity: Entity) -> Option<String> {
        self.groups.read().group_of(entity).map(str::to_owned)
    }

    /// Members of `group`, in insertion order
    pub fn group_entities(&self, group: &str) -> Vec<Entity> {
        self.groups.read().entities(group).to_vec()
    }

    // ---- pools and templates ----

    /// Register the pool for `T`, replacing any previous one
    ///
    /// Components of type `T` that carry a pool id are returned to this pool
    /// when they are removed from an entity.
    pub fn set_pool<T: Poolable>(
        &self,
        pool: impl Into<ComponentPoolMultiThread<T>>,
    ) -> Arc<ComponentPoolMultiThread<T>> {
        let pool = Arc::new(pool.into());
        tracing::debug!(
            component = std::any::type_name::<T>(),
            capacity = pool.capacity(),
            "pool registered"
        );
        self.pools
            .write()
            .insert(TypeId::of::<T>(), Arc::clone(&pool) as Arc<dyn ErasedPool>);
        pool
    }

    /// The pool registered for `T`
    pub fn get_pool<T: Poolable>(&self) -> Result<Arc<ComponentPoolMultiThread<T>>> {
        let pool = self
            .pools
            .read()
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or(EcsError::MissingPool(std::any::type_name::<T>()))?;
        pool.into_any()
            .downcast::<ComponentPoolMultiThread<T>>()
            .map_err(|_| EcsError::MissingPool(std::any::type_name::<T>()))
    }

    /// Take an initialized instance from the pool for `T`
    ///
    /// `Ok(None)` means the pool is exhausted and may not grow.
    pub fn get_component_from_pool<T: Poolable>(&self) -> Result<Option<ComponentRef<T>>> {
        Ok(self.get_pool::<T>()?.new_component())
    }

    /// Attach a pooled `T` to `entity`
    pub fn add_component_from_pool<T: Poolable>(&self, entity: Entity) -> Result<ComponentRef<T>> {
        self.add_component_from_pool_with(entity, |_: &mut T| {})
    }

    /// Attach a pooled `T` to `entity` after running `init` on it
    pub fn add_component_from_pool_with<T: Poolable>(
        &self,
        entity: Entity,
        init: impl FnOnce(&mut T),
    ) -> Result<ComponentRef<T>> {
        if !self.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        let component = self
            .get_component_from_pool::<T>()?
            .ok_or(EcsError::PoolExhausted(std::any::type_name::<T>()))?;
        init(&mut *component.write());
        self.add_component_ref(entity, component.clone());
        Ok(component)
    }

    /// Register `template` under `name`, replacing any previous one
    pub fn set_entity_template(&self, name: impl Into<String>, template: impl EntityTemplate + 'static) {
        let name = name.into();
        tracing::debug!(template = %name, "entity template registered");
        self.templates.write().insert(name, Arc::new(template));
    }

    /// True when a template is registered under `name`
    pub fn has_entity_template(&self, name: &str) -> bool {
        self.templates.read().contains_key(name)
    }

    // ---- systems ----

    /// Register `system` in one phase, layer and bucket
    ///
    /// Entities that already exist are evaluated against the new system at
    /// the next fixed update.
    pub fn set_system<S: System>(
        &self,
        system: S,
        update: UpdateType,
        layer: Layer,
        execution: ExecutionType,
    ) -> SystemHandle<S> {
        let aspect = system.aspect().build(&self.registry);
        let tracks = system.tracks_entities();
        let name = system.name().to_owned();

        let handle = {
            let mut systems = self.systems.write();
            let bit = systems.allocate_bit();
            tracing::debug!(
                system = %name,
                bit,
                ?update,
                layer,
                ?execution,
                aspect = %aspect.describe(&self.registry),
                "system registered"
            );
            let cell: SharedSystem = Arc::new(Mutex::new(SystemCell::new(system, aspect, bit)));
            systems.register::<S>(Arc::clone(&cell), update, layer, execution);
            SystemHandle::new(cell)
        };

        if tracks {
            let mut manager = self.entities.write();
            for entity in manager.active_entities() {
                manager.request_refresh(entity);
            }
        }
        handle
    }

    /// Also run an already registered system in another phase, layer or bucket
    ///
    /// Scheduling the same system twice in one bucket has no effect.
    pub fn schedule<S: System>(
        &self,
        handle: &SystemHandle<S>,
        update: UpdateType,
        layer: Layer,
        execution: ExecutionType,
    ) {
        self.systems
            .write()
            .schedule(handle.shared(), update, layer, execution);
    }

    /// Register `system` and call its `load_content` hook
    pub fn initialize_system<S: System>(
        &self,
        system: S,
        update: UpdateType,
        layer: Layer,
        execution: ExecutionType,
    ) -> SystemHandle<S> {
        let handle = self.set_system(system, update, layer, execution);
        handle.shared().lock().load_content(self);
        handle
    }

    /// Register every declaration, then call `load_content` on every system
    pub fn initialize_with_all_systems(&self, declarations: Declarations) {
        declarations.apply(self);
        let systems = self.systems.read().systems();
        for system in &systems {
            system.lock().load_content(self);
        }
        tracing::debug!(systems = systems.len(), "systems initialized");
    }

    /// Build and initialize the configured systems in order
    ///
    /// An entry's position is its layer. Every name is checked before any
    /// system is built.
    pub fn initialize_from_config(
        &self,
        config: &SystemsConfig,
        factories: &SystemFactories,
    ) -> Result<usize> {
        if let Some(missing) = config
            .systems
            .iter()
            .find(|entry| !factories.contains(&entry.name))
        {
            return Err(EcsError::UnknownSystem(missing.name.clone()));
        }
        for (layer, entry) in config.systems.iter().enumerate() {
            factories.build(
                &entry.name,
                self,
                entry.update_type,
                layer as Layer,
                entry.execution_type,
            )?;
        }
        Ok(config.systems.len())
    }

    /// The single registered system of type `S`
    pub fn get_system<S: System>(&self) -> Result<SystemHandle<S>> {
        self.systems.read().get_system::<S>()
    }

    /// Every registered system of type `S`
    pub fn get_systems<S: System>(&self) -> Vec<SystemHandle<S>> {
        self.systems.read().get_systems::<S>()
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.read().len()
    }

    /// Call `unload_content` on every system and drop all registrations
    pub fn unload_content(&mut self) {
        let systems = self.systems.read().systems();
        for system in &systems {
            system.lock().unload_content(self);
        }
        self.systems.write().clear();
        tracing::debug!(systems = systems.len(), "systems unloaded");
    }

    // ---- updates ----

    /// Run a fixed update with the wall-clock time since the previous one
    pub fn fixed_update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_fixed_update);
        self.last_fixed_update = now;
        self.fixed_update_with(delta);
    }

    /// Run a fixed update with an explicit delta
    pub fn fixed_update_with(&mut self, delta: Duration) {
        self.delta = delta;
        self.remove_marked_components();

        self.pool_cleanup_counter += 1;
        if self.pool_cleanup_counter > self.config.pool_cleanup_delay {
            self.pool_cleanup_counter = 0;
            self.clean_up_pools();
        }

        self.flush_deletions();
        self.flush_refreshes();
        self.run(UpdateType::FixedUpdate);
    }

    /// Run the frame-update layers
    pub fn frame_update(&mut self) {
        self.run(UpdateType::FrameUpdate);
    }

    /// Delete every entity and run a fixed update to flush the deletions
    pub fn clear(&mut self) {
        {
            let mut manager = self.entities.write();
            for entity in manager.active_entities() {
                manager.request_delete(entity);
            }
        }
        self.fixed_update();
    }

    /// Delta of the current fixed update
    pub fn delta(&self) -> Duration {
        self.delta
    }

    fn run(&self, update: UpdateType) {
        let layers = self.systems.read().layers(update);
        for layer in &layers {
            layer.run(self);
        }
    }

    pub(crate) fn remove_marked_components(&self) {
        let events = self.entities.write().remove_marked_components();
        self.dispatch(events);
    }

    fn clean_up_pools(&self) {
        let pools: Vec<Arc<dyn ErasedPool>> = self.pools.read().values().cloned().collect();
        let moved: usize = pools.iter().map(|pool| pool.clean_up()).sum();
        tracing::debug!(pools = pools.len(), moved, "pools cleaned up");
    }

    fn flush_deletions(&self) {
        let deleted = self.entities.write().take_deletions();
        if deleted.is_empty() {
            return;
        }
        let systems = self.systems.read().systems();
        let count = deleted.len();

        for entity in deleted.into_iter().rev() {
            // Still marked as deleting, so every tracking system drops it.
            for system in &systems {
                system.lock().on_entity_changed(self, entity);
            }
            self.tags.write().unregister(entity);
            self.groups.write().remove(entity);
            let events = self.entities.write().remove(entity);
            self.dispatch(events);
        }
        tracing::debug!(count, "entities removed");
    }

    fn flush_refreshes(&self) {
        let refreshed = self.entities.write().take_refreshes();
        if refreshed.is_empty() {
            return;
        }
        let systems = self.systems.read().systems();

        for entity in refreshed {
            if !self.is_alive(entity) {
                continue;
            }
            for system in &systems {
                system.lock().on_entity_changed(self, entity);
            }
            self.entities.write().finish_refresh(entity);
        }
    }

    pub(crate) fn entity_state(&self, entity: Entity) -> Option<EntityState> {
        self.entities.read().state(entity)
    }

    pub(crate) fn set_system_bit(&self, entity: Entity, bit: usize, tracked: bool) {
        self.entities.write().set_system_bit(entity, bit, tracked);
    }

    // ---- services ----

    /// The world's blackboard
    pub fn blackboard(&self) -> &BlackBoard {
        &self.blackboard
    }

    /// The world's shared queue registry
    pub fn shared_queues(&self) -> &SharedQueues {
        &self.queues
    }

    /// Call `listener` for every entity event, after the internal handlers
    pub fn subscribe(
        &self,
        listener: impl Fn(&World, &EntityEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.listeners.write().add(Arc::new(listener))
    }

    /// Stop calling a listener; returns false if it was not subscribed
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.write().remove(id)
    }

    fn dispatch(&self, events: Vec<EntityEvent>) {
        if events.is_empty() {
            return;
        }
        for event in &events {
            if let EntityEvent::ComponentRemoved(_, component) = event {
                self.return_to_pool(component);
            }
        }
        let listeners = self.listeners.read().snapshot();
        for event in &events {
            for listener in &listeners {
                listener(self, event);
            }
        }
    }

    fn return_to_pool(&self, component: &ErasedComponent) {
        if component.pool_id().is_none() {
            return;
        }
        let pool = self
            .pools
            .read()
            .get(&component.component_type_id())
            .cloned();
        match pool {
            Some(pool) => pool.return_erased(Arc::clone(component.cell())),
            None => tracing::warn!(
                component = component.type_name(),
                "pooled component removed but no pool is registered"
            ),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entity_count())
            .field("systems", &self.system_count())
            .field("component_types", &self.registry.len())
            .field("delta", &self.delta)
            .finish()
    }
}
