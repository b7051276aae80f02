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
//! Tag and group registries
//!
//! A tag names exactly one entity; a group names any number of them. An
//! entity carries at most one tag and belongs to at most one group. Both
//! registries are owned by the world and cleared for an entity when it is
//! deleted.

use crate::ecs::Entity;
use std::collections::HashMap;

/// One-to-one mapping between tag names and entities
#[derive(Debug, Default)]
pub struct TagManager {
    by_tag: HashMap<String, Entity>,
    by_entity: HashMap<Entity, String>,
}

impl TagManager {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `tag` to `entity`
    ///
    /// Any previous binding of the tag or of the entity is dropped.
    pub fn register(&mut self, tag: &str, entity: Entity) {
        assert!(!tag.is_empty(), "Tag must not be empty");
        self.unregister(entity);
        if let Some(previous) = self.by_tag.insert(tag.to_owned(), entity) {
            self.by_entity.remove(&previous);
        }
        self.by_entity.insert(entity, tag.to_owned());
    }

    /// Drop the tag bound to `entity`, returning it
    pub fn unregister(&mut self, entity: Entity) -> Option<String> {
        let tag = self.by_entity.remove(&entity)?;
        self.by_tag.remove(&tag);
        Some(tag)
    }

    /// Entity bound to `tag`
    pub fn entity(&self, tag: &str) -> Option<Entity> {
        self.by_tag.get(tag).copied()
    }

    /// Tag bound to `entity`
    pub fn tag_of(&self, entity: Entity) -> Option<&str> {
        self.by_entity.get(&entity).map(String::as_str)
    }

    /// True when `tag` is bound
    pub fn is_registered(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// Number of bound tags
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// True when no tag is bound
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    /// Drop every binding
    pub fn clear(&mut self) {
        self.by_tag.clear();
        self.by_entity.clear();
    }
}

/// Many-to-one mapping from entities to group names
#[derive(Debug, Default)]
pub struct GroupManager {
    by_group: HashMap<String, Vec<Entity>>,
    by_entity: HashMap<Entity, String>,
}

impl GroupManager {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `entity` into `group`, leaving any previous group
    pub fn set(&mut self, group: &str, entity: Entity) {
        assert!(!group.is_empty(), "Group must not be empty");
        self.remove(entity);
        self.by_group.entry(group.to_owned()).or_default().push(entity);
        self.by_entity.insert(entity, group.to_owned());
    }

    /// Take `entity` out of its group, returning the group name
    pub fn remove(&mut self, entity: Entity) -> Option<String> {
        let group = self.by_entity.remove(&entity)?;
        if let Some(members) = self.by_group.get_mut(&group) {
            members.retain(|e| *e != entity);
            if members.is_empty() {
                self.by_group.remove(&group);
            }
        }
        Some(group)
    }

    /// Members of `group`, in insertion order
    pub fn entities(&self, group: &str) -> &[Entity] {
        self.by_group.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Group `entity` belongs to
    pub fn group_of(&self, entity: Entity) -> Option<&str> {
        self.by_entity.get(&entity).map(String::as_str)
    }

    /// True when `entity` belongs to some group
    pub fn is_grouped(&self, entity: Entity) -> bool {
        self.by_entity.contains_key(&entity)
    }

    /// Drop every membership
    pub fn clear(&mut self) {
        self.by_group.clear();
        self.by_entity.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityId;

    fn entity(index: u32) -> Entity {
        Entity::new(index, EntityId::new(index as u64 + 100))
    }

    #[test]
    fn test_tag_register_and_lookup() {
        let mut tags = TagManager::new();
        tags.register("player", entity(0));

        assert_eq!(tags.entity("player"), Some(entity(0)));
        assert_eq!(tags.tag_of(entity(0)), Some("player"));
        assert!(tags.is_registered("player"));
        assert!(!tags.is_registered("camera"));
    }

    #[test]
    fn test_tag_rebinding() {
        let mut tags = TagManager::new();
        tags.register("player", entity(0));
        tags.register("player", entity(1));
        assert_eq!(tags.entity("player"), Some(entity(1)));
        assert_eq!(tags.tag_of(entity(0)), None);

        tags.register("hero", entity(1));
        assert!(!tags.is_registered("player"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_tag_unregister() {
        let mut tags = TagManager::new();
        tags.register("boss", entity(2));
        assert_eq!(tags.unregister(entity(2)).as_deref(), Some("boss"));
        assert!(tags.is_empty());
        assert_eq!(tags.unregister(entity(2)), None);
    }

    #[test]
    #[should_panic(expected = "Tag must not be empty")]
    fn test_empty_tag_panics() {
        TagManager::new().register("", entity(0));
    }

    #[test]
    fn test_group_membership() {
        let mut groups = GroupManager::new();
        groups.set("enemies", entity(0));
        groups.set("enemies", entity(1));
        groups.set("allies", entity(2));

        assert_eq!(groups.entities("enemies"), &[entity(0), entity(1)]);
        assert_eq!(groups.group_of(entity(2)), Some("allies"));

        groups.set("allies", entity(0));
        assert_eq!(groups.entities("enemies"), &[entity(1)]);
        assert_eq!(groups.entities("allies"), &[entity(2), entity(0)]);

        groups.remove(entity(1));
        assert!(groups.entities("enemies").is_empty());
        assert!(!groups.is_grouped(entity(1)));
    }
}
