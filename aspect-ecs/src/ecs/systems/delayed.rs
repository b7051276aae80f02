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
//! One-shot delayed systems
//!
//! A delayed system stays idle until [`DelayedEntitySystem::start_delayed_run`]
//! is called. Once the accumulated world delta crosses the delay it processes
//! its entities a single time and stops itself.

use crate::ecs::aspect::AspectBuilder;
use crate::ecs::system::{ActiveEntities, System};
use crate::ecs::{Entity, World};
use crate::error::{EcsError, Result};
use crate::timer::Timer;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// Logic run once per started delay, over every active entity
pub trait ProcessDelayed: Send + 'static {
    /// Component signature of the processed entities
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new()
    }

    /// Process the active entities; `accumulated` is the overshoot past the delay
    fn process_delayed(&mut self, world: &World, entities: &ActiveEntities, accumulated: Duration);

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Logic run once per started delay, per active entity
pub trait ProcessDelayedEntity: Send + 'static {
    /// Component signature of the processed entities
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new()
    }

    /// Process one entity; `accumulated` is the overshoot past the delay
    fn process(&mut self, world: &World, entity: Entity, accumulated: Duration);

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Adapts a [`ProcessDelayedEntity`] to [`ProcessDelayed`]
#[derive(Debug, Default)]
pub struct DelayedEntities<S>(pub S);

impl<S: ProcessDelayedEntity> ProcessDelayed for DelayedEntities<S> {
    fn aspect(&self) -> AspectBuilder {
        self.0.aspect()
    }

    fn process_delayed(&mut self, world: &World, entities: &ActiveEntities, accumulated: Duration) {
        for entity in entities.values() {
            self.0.process(world, *entity, accumulated);
        }
    }

    fn name(&self) -> &str {
        self.0.name()
    }
}

impl<S> Deref for DelayedEntities<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.0
    }
}

impl<S> DerefMut for DelayedEntities<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.0
    }
}

/// Runs a [`ProcessDelayed`] once after a started delay
#[derive(Debug, Default)]
pub struct DelayedEntitySystem<S> {
    timer: Option<Timer>,
    running: bool,
    inner: S,
}

/// Delayed system that processes each active entity
pub type DelayedEntityProcessingSystem<S> = DelayedEntitySystem<DelayedEntities<S>>;

impl<S: ProcessDelayed> DelayedEntitySystem<S> {
    /// Wrap `inner`; the system is idle until started
    pub fn new(inner: S) -> Self {
        DelayedEntitySystem {
            timer: None,
            running: false,
            inner,
        }
    }

    /// Arm the system to fire once after `delay`, replacing any pending run
    pub fn start_delayed_run(&mut self, delay: Duration) {
        self.timer = Some(Timer::new(delay));
        self.running = true;
    }

    /// Disarm the system
    pub fn stop(&mut self) -> Result<()> {
        let timer = self.timer.as_mut().ok_or(EcsError::DelayNotStarted)?;
        timer.reset();
        self.running = false;
        Ok(())
    }

    /// True between a start and the firing or stop
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Delay of the latest start, zero if never started
    pub fn initial_time_delay(&self) -> Duration {
        self.timer.as_ref().map_or(Duration::ZERO, Timer::delay)
    }

    /// Time left before the run fires, zero when not running
    pub fn remaining_time_until_processing(&self) -> Duration {
        match &self.timer {
            Some(timer) if self.running => timer.delay().saturating_sub(timer.accumulated()),
            _ => Duration::ZERO,
        }
    }

    /// Unwrap the processor
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ProcessDelayedEntity> DelayedEntitySystem<DelayedEntities<S>> {
    /// Wrap a per-entity processor
    pub fn per_entity(inner: S) -> Self {
        Self::new(DelayedEntities(inner))
    }
}

impl<S> Deref for DelayedEntitySystem<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> DerefMut for DelayedEntitySystem<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: ProcessDelayed> System for DelayedEntitySystem<S> {
    fn aspect(&self) -> AspectBuilder {
        self.inner.aspect()
    }

    fn check_processing(&mut self, world: &World, enabled: bool) -> bool {
        match self.timer.as_mut() {
            Some(timer) if self.running => timer.is_reached(world.delta()) && enabled,
            _ => false,
        }
    }

    fn process_entities(&mut self, world: &World, entities: &ActiveEntities) {
        let accumulated = self.timer.as_ref().map_or(Duration::ZERO, Timer::accumulated);
        self.inner.process_delayed(world, entities, accumulated);
        if let Err(err) = self.stop() {
            tracing::warn!(system = self.inner.name(), %err, "delayed system fired without a timer");
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, ExecutionType, UpdateType};

    struct Fuse;
    impl Component for Fuse {}

    #[derive(Default)]
    struct Detonator {
        fired: Vec<(usize, Duration)>,
    }

    impl ProcessDelayedEntity for Detonator {
        fn aspect(&self) -> AspectBuilder {
            AspectBuilder::new().all::<Fuse>()
        }

        fn process(&mut self, _world: &World, entity: Entity, accumulated: Duration) {
            self.fired.push((entity.index(), accumulated));
        }
    }

    #[test]
    fn test_fires_once_after_delay() {
        let mut world = World::new();
        let handle = world.set_system(
            DelayedEntityProcessingSystem::per_entity(Detonator::default()),
            UpdateType::FixedUpdate,
            0,
            ExecutionType::Synchronous,
        );
        world.create_entity().add_component(Fuse);

        world.fixed_update_with(Duration::from_millis(100));
        assert!(handle.lock().fired.is_empty());

        handle.lock().start_delayed_run(Duration::from_millis(250));
        assert_eq!(handle.lock().initial_time_delay(), Duration::from_millis(250));

        world.fixed_update_with(Duration::from_millis(100));
        assert_eq!(
            handle.lock().remaining_time_until_processing(),
            Duration::from_millis(150)
        );
        world.fixed_update_with(Duration::from_millis(100));
        world.fixed_update_with(Duration::from_millis(100));

        assert_eq!(handle.lock().fired, vec![(0, Duration::from_millis(50))]);
        assert!(!handle.lock().is_running());
        assert_eq!(handle.lock().remaining_time_until_processing(), Duration::ZERO);

        world.fixed_update_with(Duration::from_millis(500));
        assert_eq!(handle.lock().fired.len(), 1);
    }

    #[test]
    fn test_stop_before_start_fails() {
        let mut system = DelayedEntityProcessingSystem::per_entity(Detonator::default());
        assert!(matches!(system.stop(), Err(EcsError::DelayNotStarted)));

        system.start_delayed_run(Duration::from_secs(1));
        assert!(system.is_running());
        assert!(system.stop().is_ok());
        assert!(!system.is_running());
    }

    #[test]
    fn test_disabled_system_skips_firing() {
        let mut world = World::new();
        let handle = world.set_system(
            DelayedEntityProcessingSystem::per_entity(Detonator::default()),
            UpdateType::FixedUpdate,
            0,
            ExecutionType::Synchronous,
        );
        world.create_entity().add_component(Fuse);

        handle.lock().start_delayed_run(Duration::from_millis(10));
        handle.set_enabled(false);
        world.fixed_update_with(Duration::from_millis(20));

        assert!(handle.lock().fired.is_empty());
        assert!(handle.lock().is_running());
    }
}
