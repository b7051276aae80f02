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
//! Systems bound to a single tagged entity

use crate::ecs::system::{ActiveEntities, System};
use crate::ecs::systems::ProcessEntity;
use crate::ecs::World;
use std::ops::{Deref, DerefMut};

/// Processes whichever entity currently holds `tag`
///
/// The tag is looked up on every run and nothing is tracked, so the
/// processor's aspect is ignored. An unbound tag makes the run a no-op.
#[derive(Debug)]
pub struct TagSystem<S> {
    tag: String,
    inner: S,
}

impl<S: ProcessEntity> TagSystem<S> {
    /// Bind `inner` to `tag`
    ///
    /// # Panics
    ///
    /// Panics if `tag` is empty.
    pub fn new(tag: impl Into<String>, inner: S) -> Self {
        let tag = tag.into();
        assert!(!tag.is_empty(), "Tag must not be empty");
        TagSystem { tag, inner }
    }

    /// The bound tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Unwrap the processor
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> Deref for TagSystem<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> DerefMut for TagSystem<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: ProcessEntity> System for TagSystem<S> {
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
        if let Some(entity) = world.tagged_entity(&self.tag) {
            self.inner.process(world, entity);
        }
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
    use crate::ecs::{Entity, ExecutionType, UpdateType};

    #[derive(Default)]
    struct Follow(Vec<Entity>);

    impl ProcessEntity for Follow {
        fn process(&mut self, _world: &World, entity: Entity) {
            self.0.push(entity);
        }
    }

    #[test]
    fn test_follows_tag_rebinding() {
        let mut world = World::new();
        let handle = world.set_system(
            TagSystem::new("player", Follow::default()),
            UpdateType::FrameUpdate,
            0,
            ExecutionType::Synchronous,
        );

        world.frame_update();
        assert!(handle.lock().0.is_empty());

        let first = world.create_entity();
        first.set_tag(Some("player"));
        let first = first.entity();
        world.frame_update();

        let second = world.create_entity();
        second.set_tag(Some("player"));
        let second = second.entity();
        world.frame_update();

        assert_eq!(handle.lock().0, vec![first, second]);
        assert_eq!(handle.lock().tag(), "player");
    }

    #[test]
    #[should_panic(expected = "Tag must not be empty")]
    fn test_empty_tag_panics() {
        TagSystem::new("", Follow::default());
    }
}
