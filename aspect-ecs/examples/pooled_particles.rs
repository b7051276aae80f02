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
//! Pooled particle example
//!
//! Particles are emitted from a component pool by a queue-fed system,
//! aged in parallel, and returned to the pool when they expire. A
//! blackboard trigger reports when the live count crosses a threshold.

use aspect_ecs::blackboard::{Trigger, TriggerStateType};
use aspect_ecs::config::WorldConfig;
use aspect_ecs::declare::{Declarations, SystemAttributes};
use aspect_ecs::ecs::systems::{
    ParallelEntityProcessingSystem, ProcessEntityShared, ProcessQueued, ProcessSystem,
    ProcessingSystem, QueueSystemProcessingThreadSafe,
};
use aspect_ecs::ecs::{AspectBuilder, Component, Entity, ExecutionType, UpdateType, World};
use aspect_ecs::pool::{PoolConfig, Poolable};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Particle {
    position: [f32; 2],
    velocity: [f32; 2],
    age: u32,
    max_age: u32,
}

impl Component for Particle {}

impl Poolable for Particle {
    fn initialize(&mut self) {
        self.age = 0;
        self.max_age = 20;
    }

    fn clean_up(&mut self) {
        self.position = [0.0; 2];
        self.velocity = [0.0; 2];
    }
}

// One burst request: how many particles to emit and in which direction
#[derive(Debug, Clone, Copy)]
struct Burst {
    count: u32,
    direction: [f32; 2],
}

struct Emitter;

impl ProcessQueued<Burst> for Emitter {
    fn process(&mut self, world: &World, burst: Burst) {
        for i in 0..burst.count {
            let entity = world.create_entity();
            let spread = i as f32 * 0.1;
            let emitted = entity.add_component_from_pool_with(|particle: &mut Particle| {
                particle.velocity = [burst.direction[0] + spread, burst.direction[1] - spread];
            });
            if let Err(err) = emitted {
                tracing::warn!(%err, "particle not emitted");
                entity.delete();
            }
        }
    }
}

struct Aging;

impl ProcessEntityShared for Aging {
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new().all::<Particle>()
    }

    fn process(&self, world: &World, entity: Entity) {
        let Some(particle) = world.get_component::<Particle>(entity) else {
            return;
        };
        let mut particle = particle.write();
        particle.position[0] += particle.velocity[0];
        particle.position[1] += particle.velocity[1];
        particle.age += 1;
        if particle.age >= particle.max_age {
            world.delete_entity(entity);
        }
    }
}

struct Census;

impl ProcessSystem for Census {
    fn process_system(&mut self, world: &World) {
        world.blackboard().set_entry("live", world.entity_count());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Aspect ECS - Pooled Particles");
    println!("=============================\n");

    let mut world = World::with_config(WorldConfig::new().with_pool_cleanup_delay(5));

    world.initialize_with_all_systems(
        Declarations::new()
            .pool::<Particle>(PoolConfig::new(64, 32))
            .system(
                ParallelEntityProcessingSystem::new(Aging).with_concurrency(4),
                SystemAttributes::new()
                    .with_update_type(UpdateType::FixedUpdate)
                    .with_layer(1)
                    .with_execution_type(ExecutionType::Asynchronous),
            )
            .system(
                ProcessingSystem::new(Census),
                SystemAttributes::new()
                    .with_update_type(UpdateType::FixedUpdate)
                    .with_layer(2),
            ),
    );
    let emitter = QueueSystemProcessingThreadSafe::<Emitter, Burst>::new(&world, Emitter);
    world.initialize_system(
        emitter,
        UpdateType::FixedUpdate,
        0,
        ExecutionType::Synchronous,
    );

    world.blackboard().add_trigger(
        Trigger::new(["live"], |board, state: TriggerStateType| {
            if let Some(live) = board.get_entry::<usize>("live") {
                println!("  [Trigger] {state:?}: {live} live particles");
            }
        })
        .with_condition(|board, _| board.get_entry::<usize>("live").map_or(false, |live| live > 100)),
        false,
    );

    let queues = world.shared_queues().clone();
    for tick in 0..60u32 {
        if tick % 4 == 0 {
            let burst = Burst {
                count: 30,
                direction: [1.0, (tick as f32).sin()],
            };
            if let Err(err) = queues.add_to_queue::<Emitter, Burst>(burst) {
                eprintln!("Burst dropped: {err}");
            }
        }
        world.fixed_update_with(Duration::from_millis(16));

        if tick % 10 == 9 {
            match world.get_pool::<Particle>() {
                Ok(pool) => println!("Tick {tick}: {:?}", pool.stats()),
                Err(err) => eprintln!("Tick {tick}: {err}"),
            }
        }
    }

    println!("\nFinal: {:?}", world.entity_stats());
    world.clear();
    world.unload_content();
}
