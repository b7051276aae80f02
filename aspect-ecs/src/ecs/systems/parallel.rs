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
//! Chunked parallel per-entity processing
//!
//! The active set is snapshotted and split into `concurrency` chunks of
//! `ceil(n / concurrency)` entities. Chunk `k` walks indices downward from
//! `n - 1 - k * per_chunk`. With the `parallel` feature the chunks run on
//! Rayon and are joined before the run ends; without it they run one after
//! another in the same order.

use crate::ecs::aspect::AspectBuilder;
use crate::ecs::system::{ActiveEntities, System};
use crate::ecs::{Entity, World};
use std::ops::Range;

/// Logic applied to entities from several threads at once
pub trait ProcessEntityShared: Send + Sync + 'static {
    /// Component signature of the processed entities
    fn aspect(&self) -> AspectBuilder {
        AspectBuilder::new()
    }

    /// Called once when the system is initialized
    fn load_content(&mut self, _world: &World) {}

    /// Process one entity; may run concurrently with other calls
    fn process(&self, world: &World, entity: Entity);

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Default number of chunks
pub const DEFAULT_CONCURRENCY: usize = 2;

/// Processes every active entity exactly once, split across chunks
#[derive(Debug)]
pub struct ParallelEntityProcessingSystem<S> {
    concurrency: usize,
    inner: S,
}

impl<S: ProcessEntityShared> ParallelEntityProcessingSystem<S> {
    /// Wrap `inner` with the default concurrency
    pub fn new(inner: S) -> Self {
        ParallelEntityProcessingSystem {
            concurrency: DEFAULT_CONCURRENCY,
            inner,
        }
    }

    /// Set the number of chunks
    ///
    /// # Panics
    ///
    /// Panics if `concurrency` is zero.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        assert!(concurrency > 0, "Concurrency must be > 0");
        self.concurrency = concurrency;
        self
    }

    /// Number of chunks
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// The wrapped processor
    pub fn processor(&self) -> &S {
        &self.inner
    }
}

/// Snapshot positions covered by chunk `k`, in ascending order
fn chunk_range(len: usize, per_chunk: usize, k: usize) -> Option<Range<usize>> {
    let start = (len - 1).checked_sub(k * per_chunk)?;
    Some(start.saturating_sub(per_chunk - 1)..start + 1)
}

impl<S: ProcessEntityShared> System for ParallelEntityProcessingSystem<S> {
    fn aspect(&self) -> AspectBuilder {
        self.inner.aspect()
    }

    fn load_content(&mut self, world: &World) {
        self.inner.load_content(world);
    }

    fn process_entities(&mut self, world: &World, entities: &ActiveEntities) {
        let snapshot: Vec<Entity> = entities.values().copied().collect();
        if snapshot.is_empty() {
            return;
        }
        let per_chunk = (snapshot.len() + self.concurrency - 1) / self.concurrency;
        let chunks: Vec<&[Entity]> = (0..self.concurrency)
            .filter_map(|k| chunk_range(snapshot.len(), per_chunk, k))
            .map(|range| &snapshot[range])
            .collect();
        let inner = &self.inner;

        #[cfg(feature = "parallel")]
        rayon::scope(|scope| {
            for chunk in &chunks {
                scope.spawn(move |_| {
                    for entity in chunk.iter().rev() {
                        inner.process(world, *entity);
                    }
                });
            }
        });

        #[cfg(not(feature = "parallel"))]
        for chunk in &chunks {
            for entity in chunk.iter().rev() {
                inner.process(world, *entity);
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
