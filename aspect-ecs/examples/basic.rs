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
//! Basic example demonstrating the ECS structure
//!
//! This example shows how to create a world, register systems in layers,
//! spawn entities from a template, and drive fixed and frame updates.
//!
//! Run with `RUST_LOG=debug` to see the world's diagnostics.

use aspect_ecs::ecs::systems::{
    EntityComponentProcessingSystem, IntervalEntityProcessingSystem, EntityProcessingSystem,
    ProcessComponents, ProcessEntity, ProcessSystem, ProcessingSystem,
};
use aspect_ecs::ecs::{
    AspectBuilder, Component, ComponentRef, Entity, EntityRef, EntityTemplate, ExecutionType,
    UpdateType, World,
};
use std::any::Any;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Position {
    x: f32,
    y: f32,
}

impl Component for Position {}

#[derive(Debug, Default)]
struct Velocity {
    dx: f32,
    dy: f32,
}

impl Component for Velocity {}

#[derive(Debug)]
struct Lifetime(u32);

impl Component for Lifetime {}

// Applies velocity to position every fixed update
struct Movement;

impl ProcessComponents for Movement {
    type Components = (Position, Velocity);

    fn process(
        &mut self,
        world: &World,
        _entity: Entity,
        (position, velocity): (ComponentRef<Position>, ComponentRef<Velocity>),
    ) {
        let dt = world.delta().as_secs_f32();
        let velocity = velocity.read();
        let mut position = position.write();
        position.x += velocity.dx * dt;
        position.y += velocity.dy * dt;
    }
}

// Counts lifetimes down and deletes expired entities
struct Expiry;

impl ProcessEntity for Expiry {
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new().all::<Lifetime>()
    }

    fn process(&mut self, world: &World, entity: Entity) {
        let Some(lifetime) = world.get_component::<Lifetime>(entity) else {
            return;
        };
        let mut lifetime = lifetime.write();
        lifetime.0 = lifetime.0.saturating_sub(1);
        if lifetime.0 == 0 {
            println!("  [Expiry] {entity} expired");
            world.delete_entity(entity);
        }
    }
}

// Prints a summary once per rendered frame
struct Report {
    frames: u32,
}

impl ProcessSystem for Report {
    fn process_system(&mut self, world: &World) {
        self.frames += 1;
        println!("  [Report] frame {}: {} entities", self.frames, world.entity_count());
    }
}

// Prints positions every half second of simulated time
struct Positions;

impl ProcessEntity for Positions {
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new().all::<Position>()
    }

    fn process(&mut self, world: &World, entity: Entity) {
        if let Some(position) = world.get_component::<Position>(entity) {
            let position = position.read();
            println!("  [Positions] {entity}: ({:.2}, {:.2})", position.x, position.y);
        }
    }
}

struct Rocket;

impl EntityTemplate for Rocket {
    fn build_entity(&self, entity: &EntityRef<'_>, args: &[&dyn Any]) {
        let thrust = args
            .first()
            .and_then(|arg| arg.downcast_ref::<f32>())
            .copied()
            .unwrap_or(1.0);
        entity.add_component(Position::default());
        entity.add_component(Velocity { dx: 0.0, dy: thrust });
        entity.add_component(Lifetime(30));
        entity.set_group(Some("rockets"));
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Aspect ECS - Basic Example");
    println!("==========================\n");

    let mut world = World::new();
    world.set_entity_template("rocket", Rocket);

    world.set_system(
        EntityComponentProcessingSystem::new(Movement),
        UpdateType::FixedUpdate,
        0,
        ExecutionType::Synchronous,
    );
    world.set_system(
        EntityProcessingSystem::new(Expiry),
        UpdateType::FixedUpdate,
        1,
        ExecutionType::Synchronous,
    );
    world.set_system(
        IntervalEntityProcessingSystem::new(
            Duration::from_millis(500),
            EntityProcessingSystem::new(Positions),
        ),
        UpdateType::FixedUpdate,
        2,
        ExecutionType::Asynchronous,
    );
    world.set_system(
        ProcessingSystem::new(Report { frames: 0 }),
        UpdateType::FrameUpdate,
        0,
        ExecutionType::Synchronous,
    );
    println!("Registered {} systems\n", world.system_count());

    for (i, thrust) in [1.0f32, 2.5, 4.0].iter().enumerate() {
        match world.create_entity_from_template("rocket", &[thrust]) {
            Ok(rocket) => println!("Launched rocket {i}: {}", rocket.entity()),
            Err(err) => eprintln!("Could not launch rocket {i}: {err}"),
        }
    }

    let ground = world.create_entity();
    ground.add_component(Position { x: 0.0, y: -1.0 });
    ground.set_tag(Some("ground"));
    println!("Created ground: {}\n", ground.entity());

    let step = Duration::from_millis(100);
    for frame in 0..40 {
        world.fixed_update_with(step);
        if frame % 10 == 9 {
            world.frame_update();
        }
    }

    println!("\nRockets left: {}", world.group_entities("rockets").len());
    println!("Ground still tagged: {:?}", world.tagged_entity("ground"));
    println!("Stats: {:?}", world.entity_stats());

    world.unload_content();
}
