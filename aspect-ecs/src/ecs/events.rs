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
//! Entity lifecycle notifications
//!
//! The entity manager records events while it holds its lock; the world
//! dispatches them to listeners after the lock is released, so listeners
//! may call back into the world.

use crate::ecs::component::ErasedComponent;
use crate::ecs::{Entity, World};
use std::sync::Arc;

/// Something that happened to an entity
#[derive(Debug, Clone)]
pub enum EntityEvent {
    /// A new entity was created
    EntityAdded(Entity),
    /// An entity was removed by the deferred-delete flush
    EntityRemoved(Entity),
    /// A component was attached
    ComponentAdded(Entity, ErasedComponent),
    /// A component was detached, either by a removal flush or by deletion
    ComponentRemoved(Entity, ErasedComponent),
}

impl EntityEvent {
    /// Entity the event concerns
    pub fn entity(&self) -> Entity {
        match self {
            EntityEvent::EntityAdded(e)
            | EntityEvent::EntityRemoved(e)
            | EntityEvent::ComponentAdded(e, _)
            | EntityEvent::ComponentRemoved(e, _) => *e,
        }
    }
}

/// Identifier returned by [`World::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked for every entity event
pub type Listener = Arc<dyn Fn(&World, &EntityEvent) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub(crate) fn snapshot(&self) -> Vec<Listener> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_listener() {
        let mut listeners = Listeners::default();
        let a = listeners.add(Arc::new(|_, _| {}));
        let b = listeners.add(Arc::new(|_, _| {}));
        assert_ne!(a, b);
        assert_eq!(listeners.len(), 2);

        assert!(listeners.remove(a));
        assert!(!listeners.remove(a));
        assert_eq!(listeners.snapshot().len(), 1);
    }
}
