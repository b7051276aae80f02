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
//! Queue-fed systems
//!
//! Queue systems ignore aspect tracking. Work is pushed explicitly and each
//! run drains at most a configured number of items in FIFO order.
//!
//! [`QueueProcessingSystem`] owns its queue. [`QueueSystemProcessingThreadSafe`]
//! shares one queue per processor type through the world's [`SharedQueues`]
//! registry, so producers on any thread can feed it by type alone.
//!
//! # Lock ordering
//!
//! The registry map lock is always taken before a queue lock, and no queue
//! lock is held while user code runs.

use crate::ecs::system::{ActiveEntities, System};
use crate::ecs::systems::ProcessEntity;
use crate::ecs::{Entity, World};
use crate::error::{EcsError, Result};
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Items drained per run unless configured otherwise
pub const DEFAULT_ENTITIES_PER_FRAME: usize = 50;

/// Runs [`ProcessEntity::process`] on explicitly queued entities
#[derive(Debug)]
pub struct QueueProcessingSystem<S> {
    queue: VecDeque<Entity>,
    entities_to_process_each_frame: usize,
    inner: S,
}

impl<S: ProcessEntity> QueueProcessingSystem<S> {
    /// Wrap `inner` with an empty queue
    pub fn new(inner: S) -> Self {
        QueueProcessingSystem {
            queue: VecDeque::new(),
            entities_to_process_each_frame: DEFAULT_ENTITIES_PER_FRAME,
            inner,
        }
    }

    /// Set the per-run batch size
    pub fn with_entities_per_frame(mut self, limit: usize) -> Self {
        self.entities_to_process_each_frame = limit;
        self
    }

    /// Enqueue `entity` for a later run
    pub fn add_to_queue(&mut self, entity: Entity) {
        self.queue.push_back(entity);
    }

    /// Number of queued entities
    pub fn queue_count(&self) -> usize {
        self.queue.len()
    }

    /// Per-run batch size
    pub fn entities_to_process_each_frame(&self) -> usize {
        self.entities_to_process_each_frame
    }

    /// Change the per-run batch size
    pub fn set_entities_to_process_each_frame(&mut self, limit: usize) {
        self.entities_to_process_each_frame = limit;
    }
}

impl<S> Deref for QueueProcessingSystem<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> DerefMut for QueueProcessingSystem<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: ProcessEntity> System for QueueProcessingSystem<S> {
    fn tracks_entities(&self) -> bool {
        false
    }

    fn load_content(&mut self, world: &World) {
        self.inner.load_content(world);
    }

    fn unload_content(&mut self, world: &World) {
        self.inner.unload_content(world);
    }

    fn process_entities(&mut self, world: &World, _entities: &ActiveEntities) {
        let size = self.queue.len().min(self.entities_to_process_each_frame);
        for entity in self.queue.drain(..size).collect::<Vec<_>>() {
            self.inner.process(world, entity);
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Logic applied to items drained from a shared queue
pub trait ProcessQueued<T>: Send + 'static {
    /// Called once when the system is initialized
    fn load_content(&mut self, _world: &World) {}

    /// Process one drained item
    fn process(&mut self, world: &World, item: T);

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

struct QueueState<T> {
    items: VecDeque<T>,
    limit: usize,
}

type SharedQueue<T> = Mutex<QueueState<T>>;

trait ErasedQueue: Send + Sync {
    fn len(&self) -> usize;
    fn limit(&self) -> usize;
    fn set_limit(&self, limit: usize);
    fn item_type(&self) -> &'static str;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Send + 'static> ErasedQueue for SharedQueue<T> {
    fn len(&self) -> usize {
        self.lock().items.len()
    }

    fn limit(&self) -> usize {
        self.lock().limit
    }

    fn set_limit(&self, limit: usize) {
        self.lock().limit = limit;
    }

    fn item_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

struct QueueSlot {
    queue: Arc<dyn ErasedQueue>,
    leases: usize,
}

type QueueMap = HashMap<TypeId, QueueSlot>;

/// Per-processor-type queues shared between threads
///
/// Owned by the world. A queue exists while at least one [`QueueLease`]
/// for its processor type is alive.
#[derive(Clone, Default)]
pub struct SharedQueues {
    map: Arc<Mutex<QueueMap>>,
}

impl SharedQueues {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a lease on the queue of processor type `S`, creating it if needed
    ///
    /// # Panics
    ///
    /// Panics if the queue of `S` already exists with a different item type.
    pub fn acquire<S: 'static, T: Send + 'static>(&self) -> QueueLease<T> {
        let mut map = self.map.lock();
        let slot = map.entry(TypeId::of::<S>()).or_insert_with(|| {
            tracing::debug!(system = std::any::type_name::<S>(), "shared queue created");
            QueueSlot {
                queue: Arc::new(Mutex::new(QueueState::<T> {
                    items: VecDeque::new(),
                    limit: DEFAULT_ENTITIES_PER_FRAME,
                })),
                leases: 0,
            }
        });
        let queue = Arc::clone(&slot.queue)
            .into_any()
            .downcast::<SharedQueue<T>>()
            .unwrap_or_else(|_| {
                panic!(
                    "Shared queue of `{}` holds `{}`, not `{}`",
                    std::any::type_name::<S>(),
                    slot.queue.item_type(),
                    std::any::type_name::<T>()
                )
            });
        slot.leases += 1;
        QueueLease {
            key: TypeId::of::<S>(),
            queue,
            map: Arc::clone(&self.map),
        }
    }

    fn erased<S: 'static>(&self) -> Result<Arc<dyn ErasedQueue>> {
        self.map
            .lock()
            .get(&TypeId::of::<S>())
            .map(|slot| Arc::clone(&slot.queue))
            .ok_or(EcsError::QueueNotRegistered(std::any::type_name::<S>()))
    }

    /// Enqueue `item` on the queue of processor type `S`
    pub fn add_to_queue<S: 'static, T: Send + 'static>(&self, item: T) -> Result<()> {
        let queue = self
            .erased::<S>()?
            .into_any()
            .downcast::<SharedQueue<T>>()
            .map_err(|_| EcsError::QueueNotRegistered(std::any::type_name::<S>()))?;
        queue.lock().items.push_back(item);
        Ok(())
    }

    /// Number of items waiting on the queue of `S`
    pub fn queue_count<S: 'static>(&self) -> Result<usize> {
        Ok(self.erased::<S>()?.len())
    }

    /// Per-run batch size of the queue of `S`
    pub fn queue_processing_limit<S: 'static>(&self) -> Result<usize> {
        Ok(self.erased::<S>()?.limit())
    }

    /// Change the per-run batch size of the queue of `S`
    pub fn set_queue_processing_limit<S: 'static>(&self, limit: usize) -> Result<()> {
        self.erased::<S>()?.set_limit(limit);
        Ok(())
    }

    /// True while some lease on the queue of `S` is alive
    pub fn is_registered<S: 'static>(&self) -> bool {
        self.map.lock().contains_key(&TypeId::of::<S>())
    }

    /// Number of live leases on the queue of `S`
    pub fn lease_count<S: 'static>(&self) -> usize {
        self.map
            .lock()
            .get(&TypeId::of::<S>())
            .map_or(0, |slot| slot.leases)
    }
}

impl fmt::Debug for SharedQueues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedQueues")
            .field("queues", &self.map.lock().len())
            .finish()
    }
}

/// Reference-counted access to one shared queue
///
/// Dropping the last lease for a processor type discards its queue and
/// any items still in it.
pub struct QueueLease<T> {
    key: TypeId,
    queue: Arc<SharedQueue<T>>,
    map: Arc<Mutex<QueueMap>>,
}

impl<T> QueueLease<T> {
    /// Drain up to the queue's limit, in FIFO order
    pub fn drain_batch(&self) -> Vec<T> {
        let mut state = self.queue.lock();
        let size = state.items.len().min(state.limit);
        state.items.drain(..size).collect()
    }

    /// Enqueue `item`
    pub fn push(&self, item: T) {
        self.queue.lock().items.push_back(item);
    }

    /// Number of waiting items
    pub fn len(&self) -> usize {
        self.queue.lock().items.len()
    }

    /// True when nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.lock().items.is_empty()
    }
}

impl<T> Drop for QueueLease<T> {
    fn drop(&mut self) {
        let mut map = self.map.lock();
        if let Some(slot) = map.get_mut(&self.key) {
            slot.leases -= 1;
            if slot.leases == 0 {
                map.remove(&self.key);
                tracing::debug!("shared queue released");
            }
        }
    }
}

impl<T> fmt::Debug for QueueLease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueLease")
            .field("item", &std::any::type_name::<T>())
            .finish()
    }
}

/// Runs [`ProcessQueued::process`] on items from the queue shared by every
/// instance with the same processor type `S`
pub struct QueueSystemProcessingThreadSafe<S, T = Entity> {
    lease: QueueLease<T>,
    inner: S,
    _marker: PhantomData<fn(T)>,
}

impl<S: ProcessQueued<T>, T: Send + 'static> QueueSystemProcessingThreadSafe<S, T> {
    /// Wrap `inner`, taking a lease on the queue of `S` in `world`
    pub fn new(world: &World, inner: S) -> Self {
        QueueSystemProcessingThreadSafe {
            lease: world.shared_queues().acquire::<S, T>(),
            inner,
            _marker: PhantomData,
        }
    }

    /// The lease this system holds
    pub fn lease(&self) -> &QueueLease<T> {
        &self.lease
    }
}

impl<S, T> Deref for QueueSystemProcessingThreadSafe<S, T> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S, T> DerefMut for QueueSystemProcessingThreadSafe<S, T> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: ProcessQueued<T>, T: Send + 'static> System for QueueSystemProcessingThreadSafe<S, T> {
    fn tracks_entities(&self) -> bool {
        false
    }

    fn load_content(&mut self, world: &World) {
        self.inner.load_content(world);
    }

    fn process_entities(&mut self, world: &World, _entities: &ActiveEntities) {
        for item in self.lease.drain_batch() {
            self.inner.process(world, item);
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<S, T> fmt::Debug for QueueSystemProcessingThreadSafe<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueSystemProcessingThreadSafe")
            .field("processor", &std::any::type_name::<S>())
            .finish()
    }
}
