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
//! Benchmarks for component pooling
//!
//! Compares pooled component attachment against fresh allocation, and
//! measures the cost of compacting a fragmented pool.

use aspect_ecs::ecs::{Component, Entity, World};
use aspect_ecs::pool::{ComponentPool, PoolConfig, Poolable};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

const STEP: Duration = Duration::from_millis(16);

#[derive(Debug, Default)]
struct Particle {
    position: [f32; 3],
    velocity: [f32; 3],
    life: u32,
}
impl Component for Particle {}
impl Poolable for Particle {
    fn initialize(&mut self) {
        self.life = 120;
    }

    fn clean_up(&mut self) {
        self.position = [0.0; 3];
        self.velocity = [0.0; 3];
    }
}

fn bench_attach_detach(c: &mut Criterion) {
    let mut group = c.benchmark_group("attach_detach");

    for n_entities in [100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("allocated", n_entities),
            n_entities,
            |b, &n| {
                let mut world = World::new();
                let entities: Vec<Entity> = (0..n).map(|_| world.create_entity().entity()).collect();
                b.iter(|| {
                    for entity in &entities {
                        world.add_component(*entity, Particle::default());
                    }
                    for entity in &entities {
                        world.remove_component::<Particle>(*entity);
                    }
                    world.fixed_update_with(STEP);
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("pooled", n_entities),
            n_entities,
            |b, &n| {
                let mut world = World::new();
                world.set_pool(ComponentPool::<Particle>::new(PoolConfig::new(n, n)));
                let entities: Vec<Entity> = (0..n).map(|_| world.create_entity().entity()).collect();
                b.iter(|| {
                    for entity in &entities {
                        black_box(world.add_component_from_pool::<Particle>(*entity).ok());
                    }
                    for entity in &entities {
                        world.remove_component::<Particle>(*entity);
                    }
                    world.fixed_update_with(STEP);
                });
            },
        );
    }

    group.finish();
}

fn bench_pool_clean_up(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_clean_up");

    for capacity in [256, 4096].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            capacity,
            |b, &capacity| {
                b.iter_batched(
                    || {
                        let mut pool = ComponentPool::<Particle>::new(PoolConfig::new(capacity, 64));
                        let handed_out: Vec<_> =
                            (0..capacity).filter_map(|_| pool.new_component()).collect();
                        for item in handed_out.iter().step_by(2) {
                            pool.return_object(item);
                        }
                        (pool, handed_out)
                    },
                    |(mut pool, handed_out)| {
                        black_box(pool.clean_up());
                        handed_out
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_pool_stats_overhead(c: &mut Criterion) {
    let pool = ComponentPool::<Particle>::new(PoolConfig::new(1024, 64));

    c.bench_function("pool_stats", |b| b.iter(|| black_box(pool.stats())));
}

criterion_group!(
    benches,
    bench_attach_detach,
    bench_pool_clean_up,
    bench_pool_stats_overhead
);
criterion_main!(benches);
