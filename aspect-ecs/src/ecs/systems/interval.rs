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
//! Interval-gated systems
//!
//! The wrapped system runs only when the accumulated world delta crosses
//! the interval. The overshoot carries into the next period. The timer is
//! fed on every scheduled invocation, including while the system is
//! disabled.

use crate::ecs::aspect::AspectBuilder;
use crate::ecs::system::{ActiveEntities, System};
use crate::ecs::systems::{EntityProcessingSystem, TagSystem};
use crate::ecs::{Entity, World};
use crate::timer::Timer;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// Runs the wrapped system once per elapsed interval
#[derive(Debug)]
pub struct IntervalEntitySystem<S> {
    timer: Timer,
    inner: S,
}

/// Interval-gated [`EntityProcessingSystem`]
pub type IntervalEntityProcessingSystem<S> = IntervalEntitySystem<EntityProcessingSystem<S>>;

/// Interval-gated [`TagSystem`]
pub type IntervalTagSystem<S> = IntervalEntitySystem<TagSystem<S>>;

impl<S: System> IntervalEntitySystem<S> {
    /// Gate `inner` behind `interval`
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn new(interval: Duration, inner: S) -> Self {
        assert!(!interval.is_zero(), "Interval must be > 0");
        IntervalEntitySystem {
            timer: Timer::new(interval),
            inner,
        }
    }

    /// The gating timer
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Unwrap the inner system
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> Deref for IntervalEntitySystem<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> DerefMut for IntervalEntitySystem<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: System> System for IntervalEntitySystem<S> {
    fn aspect(&self) -> AspectBuilder {
        self.inner.aspect()
    }

    fn tracks_entities(&self) -> bool {
        self.inner.tracks_entities()
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

    fn on_entity_enabled(&mut self, world: &World, entity: Entity) {
        self.inner.on_entity_enabled(world, entity);
    }

    fn on_entity_disabled(&mut self, world: &World, entity: Entity) {
        self.inner.on_entity_disabled(world, entity);
    }

    fn check_processing(&mut self, world: &World, enabled: bool) -> bool {
        self.timer.is_reached(world.delta()) && self.inner.check_processing(world, enabled)
    }

    fn begin(&mut self, world: &World) {
        self.inner.begin(world);
    }

    fn process_entities(&mut self, world: &World, entities: &ActiveEntities) {
        self.inner.process_entities(world, entities);
    }

    fn end(&mut self, world: &World) {
        self.inner.end(world);
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
