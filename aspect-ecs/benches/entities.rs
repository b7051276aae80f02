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
//! Benchmarks for entity churn and system throughput
//!
//! Measures entity creation and deletion flushes, per-entity processing in
//! a synchronous system, and chunked processing in the parallel system.

use aspect_ecs::ecs::systems::{
    EntityProcessingSystem, ParallelEntityProcessingSystem, ProcessEntity, ProcessEntityShared,
};
use aspect_ecs::ecs::{AspectBuilder, Component, Entity, ExecutionType, UpdateType, World};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

const STEP: Duration = Duration::from_millis(16);

#[derive(Debug, Default, Clone, Copy)]
struct Position {
    x: f64,
    y: f64,
}
impl Component for Position {}

#[derive(Debug, Default, Clone, Copy)]
struct Velocity {
    dx: f64,
    dy: f64,
}
impl Component for Velocity {}

fn integrate(world: &World, entity: Entity) {
    if let (Some(position), Some(velocity)) = (
        world.get_component::<Position>(entity),
        world.get_component::<Velocity>(entity),
    ) {
        let dt = world.delta().as_secs_f64();
        let velocity = *velocity.read();
        let mut position = position.write();
        position.x += velocity.dx * dt;
        position.y += velocity.dy * dt;
    }
}

struct Movement;

impl ProcessEntity for Movement {
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new().all::<Position>().all::<Velocity>()
    }

    fn process(&mut self, world: &World, entity: Entity) {
        integrate(world, entity);
    }
}

struct SharedMovement;

impl ProcessEntityShared for SharedMovement {
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new().all::<Position>().all::<Velocity>()
    }

    fn process(&self, world: &World, entity: Entity) {
        integrate(world, entity);
    }
}

fn populate(world: &World, n_entities: usize) {
    for i in 0..n_entities {
        let entity = world.create_entity();
        entity.add_component(Position {
            x: i as f64,
            y: 0.0,
        });
        entity.add_component(Velocity { dx: 1.0, dy: 0.5 });
    }
}

fn bench_entity_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_churn");

    for n_entities in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*n_entities as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(n_entities),
            n_entities,
            |b, &n| {
                let mut world = World::new();
                b.iter(|| {
                    let entities: Vec<Entity> =
                        (0..n).map(|_| world.create_entity().entity()).collect();
                    for entity in &entities {
                        world.delete_entity(*entity);
                    }
                    world.fixed_update_with(STEP);
                    black_box(world.entity_count());
                });
            },
        );
    }

    group.finish();
}

fn bench_sequential_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_processing");

    for n_entities in [100, 1000, 10000].iter() {
        let mut world = World::new();
        world.set_system(
            EntityProcessingSystem::new(Movement),
            UpdateType::FixedUpdate,
            0,
            ExecutionType::Synchronous,
        );
        populate(&world, *n_entities);
        world.fixed_update_with(STEP);

        group.throughput(Throughput::Elements(*n_entities as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(n_entities),
            n_entities,
            |b, _| b.iter(|| world.fixed_update_with(black_box(STEP))),
        );
    }

    group.finish();
}

fn bench_parallel_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_processing");
    let n_entities = 10000;

    for concurrency in [1, 2, 4, 8].iter() {
        let mut world = World::new();
        world.set_system(
            ParallelEntityProcessingSystem::new(SharedMovement).with_concurrency(*concurrency),
            UpdateType::FixedUpdate,
            0,
            ExecutionType::Synchronous,
        );
        populate(&world, n_entities);
        world.fixed_update_with(STEP);

        group.throughput(Throughput::Elements(n_entities as u64));
        group.bench_with_input(
            BenchmarkId::new("concurrency", concurrency),
            concurrency,
            |b, _| b.iter(|| world.fixed_update_with(black_box(STEP))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_entity_churn,
    bench_sequential_processing,
    bench_parallel_processing
);
criterion_main!(benches);
