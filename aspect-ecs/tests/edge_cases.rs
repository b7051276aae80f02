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
//! Edge case tests
//!
//! Boundary conditions, misuse of builders and unusual update sequences.

use aspect_ecs::ecs::systems::{
    IntervalEntityProcessingSystem, EntityProcessingSystem, ParallelEntityProcessingSystem,
    ProcessEntity, ProcessEntityShared, TagSystem,
};
use aspect_ecs::ecs::{
    Aspect, AspectBuilder, Component, Entity, EntityEvent, ExecutionType, UpdateType, World,
};
use aspect_ecs::pool::PoolConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Marker;
impl Component for Marker {}

struct Ignored;
impl Component for Ignored {}

struct Noop;

impl ProcessEntity for Noop {
    fn process(&mut self, _world: &World, _entity: Entity) {}
}

impl ProcessEntityShared for Noop {
    fn process(&self, _world: &World, _entity: Entity) {}
}

#[test]
#[should_panic(expected = "Interval must be > 0")]
fn test_zero_interval_panics() {
    IntervalEntityProcessingSystem::new(Duration::ZERO, EntityProcessingSystem::new(Noop));
}

#[test]
#[should_panic(expected = "Concurrency must be > 0")]
fn test_zero_concurrency_panics() {
    ParallelEntityProcessingSystem::new(Noop).with_concurrency(0);
}

#[test]
#[should_panic(expected = "Tag must not be empty")]
fn test_empty_tag_panics() {
    TagSystem::new("", Noop);
}

#[test]
#[should_panic(expected = "Resizable pools need a resize amount > 0")]
fn test_resizable_pool_without_growth_panics() {
    aspect_ecs::pool::ComponentPool::<Pooled>::new(PoolConfig::new(1, 0));
}

#[derive(Debug, Default)]
struct Pooled;
impl Component for Pooled {}
impl aspect_ecs::pool::Poolable for Pooled {}

#[test]
fn test_update_on_empty_world() {
    let mut world = World::new();
    world.fixed_update();
    world.fixed_update_with(Duration::ZERO);
    world.frame_update();
    world.clear();
    assert_eq!(world.entity_count(), 0);
    assert_eq!(world.entity_stats().created, 0);
}

#[test]
fn test_empty_aspect_matches_nothing() {
    let world = World::new();
    let plain = world.create_entity().entity();
    let marked = world.create_entity();
    marked.add_component(Marker);
    let marked = marked.entity();

    assert!(world.get_entities(&Aspect::empty()).is_empty());
    let only_marked = AspectBuilder::new().all::<Marker>().build(world.component_types());
    assert_eq!(world.get_entities(&only_marked), vec![marked]);
    let excluding = AspectBuilder::new()
        .exclude::<Marker>()
        .build(world.component_types());
    assert_eq!(world.get_entities(&excluding), vec![plain]);
}

#[test]
fn test_unregistered_component_queries() {
    let world = World::new();
    let entity = world.create_entity();
    assert!(!entity.has_component::<Ignored>());
    assert!(entity.get_component::<Ignored>().is_none());
    entity.remove_component::<Ignored>();
    assert!(world.component_types().lookup::<Ignored>().is_none());
}

#[test]
fn test_readd_cancels_pending_removal() {
    let mut world = World::new();
    let entity = world.create_entity();
    entity.add_component(Marker);
    entity.remove_component::<Marker>();
    entity.add_component(Marker);
    let entity = entity.entity();

    world.fixed_update_with(Duration::ZERO);
    assert!(world.has_component::<Marker>(entity));
}

#[test]
fn test_delete_then_mutate_in_same_update() {
    let mut world = World::new();
    let entity = world.create_entity();
    entity.add_component(Marker);
    entity.delete();
    entity.remove_component::<Marker>();
    entity.refresh();
    let entity = entity.entity();

    world.fixed_update_with(Duration::ZERO);
    assert!(!world.is_alive(entity));
    assert_eq!(world.entity_count(), 0);
}

#[test]
fn test_component_events_are_reported() {
    let mut world = World::new();
    let events: Arc<Mutex<Vec<String>>> = Arc::default();
    let log = Arc::clone(&events);
    world.subscribe(move |_, event| {
        let line = match event {
            EntityEvent::EntityAdded(_) => "entity added".to_owned(),
            EntityEvent::EntityRemoved(_) => "entity removed".to_owned(),
            EntityEvent::ComponentAdded(_, c) => format!("added {}", short(c.type_name())),
            EntityEvent::ComponentRemoved(_, c) => format!("removed {}", short(c.type_name())),
        };
        log.lock().push(line);
    });

    let entity = world.create_entity();
    entity.add_component(Marker);
    entity.add_component(Marker);
    entity.delete();
    drop(entity);
    world.fixed_update_with(Duration::ZERO);

    assert_eq!(
        *events.lock(),
        vec![
            "entity added",
            "added Marker",
            "removed Marker",
            "added Marker",
            "removed Marker",
            "entity removed",
        ]
    );
}

fn short(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name)
}

#[test]
fn test_listener_may_call_back_into_world() {
    let world = World::new();
    world.subscribe(|world, event| {
        if let EntityEvent::EntityAdded(entity) = event {
            world.add_component(*entity, Marker);
        }
    });
    let entity = world.create_entity();
    assert!(entity.has_component::<Marker>());
}

#[test]
fn test_system_registered_mid_game_sees_existing_entities() {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..3)
        .map(|_| {
            let entity = world.create_entity();
            entity.add_component(Marker);
            entity.entity()
        })
        .collect();
    world.fixed_update_with(Duration::ZERO);

    struct Marked;
    impl ProcessEntity for Marked {
        fn aspect(&self) -> AspectBuilder {
            AspectBuilder::new().all::<Marker>()
        }
        fn process(&mut self, _world: &World, _entity: Entity) {}
    }

    let handle = world.set_system(
        EntityProcessingSystem::new(Marked),
        UpdateType::FixedUpdate,
        0,
        ExecutionType::Synchronous,
    );
    world.fixed_update_with(Duration::ZERO);
    assert_eq!(handle.active_entities(), entities);
}
