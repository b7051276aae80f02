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
//! Systems that run once per invocation without entity tracking

use crate::ecs::system::{ActiveEntities, System};
use crate::ecs::World;
use std::ops::{Deref, DerefMut};

/// Logic that runs once per scheduled invocation
pub trait ProcessSystem: Send + 'static {
    /// Called once when the system is initialized
    fn load_content(&mut self, _world: &World) {}

    /// Called once when the world unloads its systems
    fn unload_content(&mut self, _world: &World) {}

    /// Called before [`ProcessSystem::process_system`]
    fn begin(&mut self, _world: &World) {}

    /// Run the logic
    fn process_system(&mut self, world: &World);

    /// Called after [`ProcessSystem::process_system`]
    fn end(&mut self, _world: &World) {}

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Runs a [`ProcessSystem`] once per invocation
///
/// The system never tracks entities, so refreshes cost it nothing.
#[derive(Debug, Default)]
pub struct ProcessingSystem<S> {
    inner: S,
}

impl<S: ProcessSystem> ProcessingSystem<S> {
    /// Wrap `inner`
    pub fn new(inner: S) -> Self {
        ProcessingSystem { inner }
    }

    /// Unwrap the processor
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> Deref for ProcessingSystem<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> DerefMut for ProcessingSystem<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: ProcessSystem> System for ProcessingSystem<S> {
    fn tracks_entities(&self) -> bool {
        false
    }

    fn load_content(&mut self, world: &World) {
        self.inner.load_content(world);
    }

    fn unload_content(&mut self, world: &World) {
        self.inner.unload_content(world);
    }

    fn begin(&mut self, world: &World) {
        self.inner.begin(world);
    }

    fn process_entities(&mut self, world: &World, _entities: &ActiveEntities) {
        self.inner.process_system(world);
    }

    fn end(&mut self, world: &World) {
        self.inner.end(world);
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{ExecutionType, UpdateType};

    #[derive(Default)]
    struct Counter {
        runs: usize,
        loaded: bool,
        calls: Vec<&'static str>,
    }

    impl ProcessSystem for Counter {
        fn load_content(&mut self, _world: &World) {
            self.loaded = true;
        }

        fn begin(&mut self, _world: &World) {
            self.calls.push("begin");
        }

        fn process_system(&mut self, _world: &World) {
            self.runs += 1;
            self.calls.push("process");
        }

        fn end(&mut self, _world: &World) {
            self.calls.push("end");
        }
    }

    #[test]
    fn test_runs_once_per_update() {
        let mut world = World::new();
        let handle = world.initialize_system(
            ProcessingSystem::new(Counter::default()),
            UpdateType::FrameUpdate,
            0,
            ExecutionType::Synchronous,
        );
        assert!(handle.lock().loaded);

        world.create_entity().refresh();
        world.frame_update();
        world.frame_update();

        assert_eq!(handle.lock().runs, 2);
        assert_eq!(handle.active_count(), 0);
        assert_eq!(
            handle.lock().calls,
            ["begin", "process", "end", "begin", "process", "end"]
        );
    }
}
