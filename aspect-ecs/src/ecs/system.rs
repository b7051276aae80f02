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
//! System execution framework
//!
//! Systems contain the logic that operates on entities and components. A
//! system declares an aspect; the world keeps, per system, the set of
//! entities that currently match it and hands that set to
//! [`System::process_entities`] on every run.
//!
//! The tracking state machine lives in [`SystemCell`]. For each refreshed
//! entity it compares the aspect's interest with the system's tracking bit
//! on the entity:
//!
//! | interest | tracked | enabled | transition |
//! |----------|---------|---------|------------|
//! | yes      | no      | any     | add (then enable if enabled) |
//! | no       | yes     | any     | remove (disable first) |
//! | yes      | yes     | yes     | enable |
//! | yes      | yes     | no      | disable |
//!
//! Enable and disable are idempotent; their callbacks fire only when the
//! active set actually changes.

use crate::ecs::aspect::{Aspect, AspectBuilder};
use crate::ecs::{Entity, World};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use serde::Deserialize;
use std::any::Any;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Entities a system is currently processing, keyed by slot index
pub type ActiveEntities = BTreeMap<usize, Entity>;

/// Update phase a system is scheduled in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    /// Run by [`World::frame_update`]
    #[default]
    FrameUpdate,
    /// Run by [`World::fixed_update`], after the deferred flush
    FixedUpdate,
}

/// How a system runs relative to the others in its layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionType {
    /// In declaration order, one after another
    #[default]
    Synchronous,
    /// Concurrently with the layer's other asynchronous systems
    Asynchronous,
}

/// Trait for systems that operate on the ECS world
///
/// Only [`System::process_entities`] is required. A system that returns an
/// empty aspect never tracks any entity.
pub trait System: Send + 'static {
    /// Component signature of the entities this system tracks
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new()
    }

    /// Whether entity refreshes should be evaluated at all
    fn tracks_entities(&self) -> bool {
        true
    }

    /// Called once when the system is initialized
    fn load_content(&mut self, _world: &World) {}

    /// Called once when the world unloads its systems
    fn unload_content(&mut self, _world: &World) {}

    /// An entity started matching the aspect
    fn on_entity_added(&mut self, _world: &World, _entity: Entity) {}

    /// An entity stopped matching the aspect, or is being deleted
    fn on_entity_removed(&mut self, _world: &World, _entity: Entity) {}

    /// A tracked entity entered the active set
    fn on_entity_enabled(&mut self, _world: &World, _entity: Entity) {}

    /// A tracked entity left the active set
    fn on_entity_disabled(&mut self, _world: &World, _entity: Entity) {}

    /// Decide whether this run should process; `enabled` is the system flag
    fn check_processing(&mut self, _world: &World, enabled: bool) -> bool {
        enabled
    }

    /// Called before [`System::process_entities`]
    fn begin(&mut self, _world: &World) {}

    /// Process the active entities
    fn process_entities(&mut self, world: &World, entities: &ActiveEntities);

    /// Called after [`System::process_entities`]
    fn end(&mut self, _world: &World) {}

    /// Get the name of this system for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// [`System`] plus downcasting, implemented for every system
pub(crate) trait AnySystem: System {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn as_any(&self) -> &dyn Any;
}

impl<S: System> AnySystem for S {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A registered system with its tracking state
pub struct SystemCell {
    bit: usize,
    aspect: Aspect,
    tracks: bool,
    enabled: bool,
    actives: ActiveEntities,
    system: Box<dyn AnySystem>,
}

impl SystemCell {
    pub(crate) fn new<S: System>(system: S, aspect: Aspect, bit: usize) -> Self {
        SystemCell {
            bit,
            aspect,
            tracks: system.tracks_entities(),
            enabled: true,
            actives: ActiveEntities::new(),
            system: Box::new(system),
        }
    }

    /// Re-evaluate `entity` against the aspect
    pub(crate) fn on_entity_changed(&mut self, world: &World, entity: Entity) {
        if !self.tracks {
            return;
        }
        let Some(state) = world.entity_state(entity) else {
            return;
        };
        let interest = !state.deleting && self.aspect.interests(&state.type_bits);
        let tracked = state.system_bits.contains(self.bit);

        match (interest, tracked) {
            (true, false) => {
                world.set_system_bit(entity, self.bit, true);
                if state.enabled {
                    self.enable(world, entity);
                }
                tracing::trace!(system = self.system.name(), %entity, "entity added");
                self.system.on_entity_added(world, entity);
            }
            (false, true) => {
                world.set_system_bit(entity, self.bit, false);
                self.disable(world, entity);
                tracing::trace!(system = self.system.name(), %entity, "entity removed");
                self.system.on_entity_removed(world, entity);
            }
            (true, true) if state.enabled => self.enable(world, entity),
            (true, true) => self.disable(world, entity),
            (false, false) => {}
        }
    }

    fn enable(&mut self, world: &World, entity: Entity) {
        if let Entry::Vacant(slot) = self.actives.entry(entity.index()) {
            slot.insert(entity);
            self.system.on_entity_enabled(world, entity);
        }
    }

    fn disable(&mut self, world: &World, entity: Entity) {
        if self.actives.remove(&entity.index()).is_some() {
            self.system.on_entity_disabled(world, entity);
        }
    }

    /// Run the system once if it agrees to process
    pub(crate) fn process(&mut self, world: &World) {
        if self.system.check_processing(world, self.enabled) {
            self.system.begin(world);
            self.system.process_entities(world, &self.actives);
            self.system.end(world);
        }
    }

    pub(crate) fn load_content(&mut self, world: &World) {
        self.system.load_content(world);
    }

    pub(crate) fn unload_content(&mut self, world: &World) {
        self.system.unload_content(world);
    }

    pub(crate) fn is<S: System>(&self) -> bool {
        self.system.as_any().is::<S>()
    }

    pub(crate) fn bit(&self) -> usize {
        self.bit
    }

    pub(crate) fn name(&self) -> &str {
        self.system.name()
    }
}

impl fmt::Debug for SystemCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemCell")
            .field("name", &self.system.name())
            .field("bit", &self.bit)
            .field("enabled", &self.enabled)
            .field("actives", &self.actives.len())
            .finish()
    }
}

pub(crate) type SharedSystem = Arc<Mutex<SystemCell>>;

/// Typed handle to a registered system
///
/// Cloning the handle does not clone the system. Locking a system that is
/// currently running (from inside its own callbacks) deadlocks.
pub struct SystemHandle<S> {
    cell: SharedSystem,
    _marker: PhantomData<fn() -> S>,
}

impl<S: System> SystemHandle<S> {
    pub(crate) fn new(cell: SharedSystem) -> Self {
        SystemHandle {
            cell,
            _marker: PhantomData,
        }
    }

    pub(crate) fn shared(&self) -> &SharedSystem {
        &self.cell
    }

    /// Lock the system for direct access
    ///
    /// # Panics
    ///
    /// Panics if the registered system is not an `S`. Handles are only built
    /// by the world from the system it registered or found by `TypeId`, so
    /// this cannot happen through the public API.
    pub fn lock(&self) -> MappedMutexGuard<'_, S> {
        MutexGuard::map(self.cell.lock(), |cell| {
            cell.system
                .as_any_mut()
                .downcast_mut::<S>()
                .expect("system handle type matches the registered system")
        })
    }

    /// Whether the system runs when scheduled
    pub fn is_enabled(&self) -> bool {
        self.cell.lock().enabled
    }

    /// Enable or disable the system
    pub fn set_enabled(&self, enabled: bool) {
        self.cell.lock().enabled = enabled;
    }

    /// Flip the enabled flag
    pub fn toggle(&self) {
        let mut cell = self.cell.lock();
        cell.enabled = !cell.enabled;
    }

    /// Entities in the active set, in ascending slot order
    pub fn active_entities(&self) -> Vec<Entity> {
        self.cell.lock().actives.values().copied().collect()
    }

    /// Size of the active set
    pub fn active_count(&self) -> usize {
        self.cell.lock().actives.len()
    }

    /// True when `entity` is in the active set
    pub fn is_active(&self, entity: Entity) -> bool {
        self.cell
            .lock()
            .actives
            .get(&entity.index())
            .map_or(false, |e| *e == entity)
    }

    /// The resolved aspect
    pub fn aspect(&self) -> Aspect {
        self.cell.lock().aspect.clone()
    }

    /// Tracking bit assigned at registration
    pub fn bit(&self) -> usize {
        self.cell.lock().bit
    }
}

impl<S> Clone for SystemHandle<S> {
    fn clone(&self) -> Self {
        SystemHandle {
            cell: Arc::clone(&self.cell),
            _marker: PhantomData,
        }
    }
}

impl<S> fmt::Debug for SystemHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SystemHandle")
            .field(&std::any::type_name::<S>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Component;

    struct Marker;
    impl Component for Marker {}

    struct Other;
    impl Component for Other {}

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        runs: usize,
    }

    impl System for Recorder {
        fn aspect(&self) -> AspectBuilder {
            AspectBuilder::new().all::<Marker>()
        }

        fn on_entity_added(&mut self, _world: &World, entity: Entity) {
            self.log.push(format!("added {}", entity.index()));
        }

        fn on_entity_removed(&mut self, _world: &World, entity: Entity) {
            self.log.push(format!("removed {}", entity.index()));
        }

        fn on_entity_enabled(&mut self, _world: &World, entity: Entity) {
            self.log.push(format!("enabled {}", entity.index()));
        }

        fn on_entity_disabled(&mut self, _world: &World, entity: Entity) {
            self.log.push(format!("disabled {}", entity.index()));
        }

        fn process_entities(&mut self, _world: &World, _entities: &ActiveEntities) {
            self.runs += 1;
        }
    }

    fn cell(world: &World) -> SystemCell {
        let aspect = Recorder::default().aspect().build(world.component_types());
        SystemCell::new(Recorder::default(), aspect, 0)
    }

    fn log(cell: &mut SystemCell) -> Vec<String> {
        let recorder = cell
            .system
            .as_any_mut()
            .downcast_mut::<Recorder>()
            .expect("recorder");
        std::mem::take(&mut recorder.log)
    }

    #[test]
    fn test_add_then_remove() {
        let world = World::new();
        let mut cell = cell(&world);
        let e = world.create_entity();
        e.add_component(Marker);

        cell.on_entity_changed(&world, e.entity());
        assert_eq!(log(&mut cell), vec!["enabled 0", "added 0"]);
        assert_eq!(cell.actives.len(), 1);
        assert!(world.entity_state(e.entity()).expect("alive").system_bits.contains(0));

        cell.on_entity_changed(&world, e.entity());
        assert!(log(&mut cell).is_empty());

        e.remove_component::<Marker>();
        world.remove_marked_components();
        cell.on_entity_changed(&world, e.entity());
        assert_eq!(log(&mut cell), vec!["disabled 0", "removed 0"]);
        assert!(cell.actives.is_empty());
    }

    #[test]
    fn test_disabled_entity_is_tracked_but_inactive() {
        let world = World::new();
        let mut cell = cell(&world);
        let e = world.create_entity();
        e.add_component(Marker);
        e.set_enabled(false);

        cell.on_entity_changed(&world, e.entity());
        assert_eq!(log(&mut cell), vec!["added 0"]);
        assert!(cell.actives.is_empty());

        e.set_enabled(true);
        cell.on_entity_changed(&world, e.entity());
        assert_eq!(log(&mut cell), vec!["enabled 0"]);

        e.set_enabled(false);
        cell.on_entity_changed(&world, e.entity());
        cell.on_entity_changed(&world, e.entity());
        assert_eq!(log(&mut cell), vec!["disabled 0"]);
    }

    #[test]
    fn test_non_matching_entity_ignored() {
        let world = World::new();
        let mut cell = cell(&world);
        let e = world.create_entity();
        e.add_component(Other);

        cell.on_entity_changed(&world, e.entity());
        assert!(log(&mut cell).is_empty());
        assert!(cell.actives.is_empty());
    }

    #[test]
    fn test_process_respects_enabled_flag() {
        let world = World::new();
        let mut cell = cell(&world);

        cell.process(&world);
        cell.enabled = false;
        cell.process(&world);

        let runs = cell
            .system
            .as_any()
            .downcast_ref::<Recorder>()
            .expect("recorder")
            .runs;
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_handle_toggle() {
        let world = World::new();
        let handle = world.set_system(
            Recorder::default(),
            UpdateType::FrameUpdate,
            0,
            ExecutionType::Synchronous,
        );
        assert!(handle.is_enabled());
        handle.toggle();
        assert!(!handle.is_enabled());
        handle.set_enabled(true);
        assert!(handle.is_enabled());
        assert_eq!(handle.lock().runs, 0);
    }
}
