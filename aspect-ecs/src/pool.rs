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
//! Component pooling for reducing allocation churn
//!
//! A [`ComponentPool`] preallocates instances of a [`Poolable`] component and
//! hands them out on request. Slots are either valid (in use) or invalid
//! (free); [`ComponentPool::clean_up`] compacts the valid slots to the
//! front. Every instance carries its slot id so the world can return it
//! automatically when it is removed from an entity.
//!
//! [`ComponentPoolMultiThread`] wraps a pool in a single mutex so it can be
//! shared between systems. Pools registered with a world always use it.

use crate::ecs::component::{Component, ComponentCell, ComponentRef, ErasedCell};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Lifecycle hooks for pooled components
pub trait Poolable: Component {
    /// Called each time the instance is handed out
    fn initialize(&mut self) {}

    /// Called each time the instance is returned
    fn clean_up(&mut self) {}
}

/// Configuration for pool sizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of instances allocated up front
    pub initial_size: usize,
    /// Number of instances added each time the pool grows
    pub resize_amount: usize,
    /// Whether the pool may grow once every instance is in use
    pub resizable: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            initial_size: 10,
            resize_amount: 10,
            resizable: true,
        }
    }
}

impl PoolConfig {
    /// Create a resizable pool configuration
    pub fn new(initial_size: usize, resize_amount: usize) -> Self {
        PoolConfig {
            initial_size,
            resize_amount,
            resizable: true,
        }
    }

    /// Never grow past the initial size
    pub fn fixed_size(mut self) -> Self {
        self.resizable = false;
        self
    }

    /// Set the number of instances added on each growth
    pub fn with_resize_amount(mut self, amount: usize) -> Self {
        assert!(amount > 0, "Resize amount must be > 0");
        self.resize_amount = amount;
        self
    }
}

/// Snapshot of pool occupancy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances currently handed out
    pub valid: usize,
    /// Instances available for reuse
    pub invalid: usize,
    /// Number of times the pool grew
    pub resize_count: usize,
}

impl PoolStats {
    /// Total number of instances owned by the pool
    pub fn capacity(&self) -> usize {
        self.valid + self.invalid
    }
}

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Preallocated, optionally growable set of reusable components
pub struct ComponentPool<T: Poolable> {
    items: Vec<ComponentRef<T>>,
    valid: Vec<bool>,
    valid_count: usize,
    resize_count: usize,
    config: PoolConfig,
    factory: Factory<T>,
}

impl<T: Poolable + Default> ComponentPool<T> {
    /// Create a pool whose instances are built with `T::default`
    pub fn new(config: PoolConfig) -> Self {
        Self::with_factory(config, T::default)
    }
}

impl<T: Poolable> ComponentPool<T> {
    /// Create a pool whose instances are built with `factory`
    pub fn with_factory(config: PoolConfig, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        assert!(
            !config.resizable || config.resize_amount > 0,
            "Resizable pools need a resize amount > 0"
        );
        let mut pool = ComponentPool {
            items: Vec::with_capacity(config.initial_size),
            valid: Vec::with_capacity(config.initial_size),
            valid_count: 0,
            resize_count: 0,
            factory: Box::new(factory),
            config,
        };
        let initial = pool.config.initial_size;
        pool.allocate(initial);
        pool
    }

    /// Hand out a free instance, growing the pool if allowed
    ///
    /// Returns `None` when every instance is in use and the pool is fixed
    /// size. The instance's [`Poolable::initialize`] hook runs before it is
    /// returned.
    pub fn new_component(&mut self) -> Option<ComponentRef<T>> {
        if self.invalid_count() == 0 {
            if !self.config.resizable {
                return None;
            }
            self.resize_count += 1;
            self.allocate(self.config.resize_amount);
            tracing::debug!(
                component = std::any::type_name::<T>(),
                capacity = self.capacity(),
                "component pool grew"
            );
        }

        let slot = self.valid.iter().position(|v| !v)?;
        self.valid[slot] = true;
        self.valid_count += 1;

        let item = self.items[slot].clone();
        item.write().initialize();
        Some(item)
    }

    /// Take an instance back, running its [`Poolable::clean_up`] hook
    ///
    /// Instances that do not belong to this pool, or that are already free,
    /// are ignored.
    pub fn return_object(&mut self, item: &ComponentRef<T>) {
        let Some(slot) = item.pool_id() else {
            return;
        };
        let owned = self
            .items
            .get(slot)
            .map_or(false, |held| ComponentRef::ptr_eq(held, item));
        if !owned {
            tracing::warn!(
                component = std::any::type_name::<T>(),
                slot,
                "returned component does not belong to this pool"
            );
            return;
        }
        if !self.valid[slot] {
            tracing::warn!(
                component = std::any::type_name::<T>(),
                slot,
                "component returned to pool twice"
            );
            return;
        }

        self.valid[slot] = false;
        self.valid_count -= 1;
        item.write().clean_up();
    }

    /// Move free slots behind the valid ones
    ///
    /// Returns the number of instances that changed slot. Their pool ids
    /// are updated in place so live handles stay returnable.
    pub fn clean_up(&mut self) -> usize {
        let mut moved = 0;
        let mut front = 0;
        let mut back = self.items.len();

        loop {
            while front < back && self.valid[front] {
                front += 1;
            }
            while back > front && !self.valid[back - 1] {
                back -= 1;
            }
            if back - front < 2 {
                break;
            }

            let last = back - 1;
            self.items.swap(front, last);
            self.valid.swap(front, last);
            self.items[front].set_pool_id(front);
            self.items[last].set_pool_id(last);
            moved += 1;
        }

        if moved > 0 {
            tracing::debug!(
                component = std::any::type_name::<T>(),
                moved,
                "compacted component pool"
            );
        }
        moved
    }

    /// Instance in `slot`, whether valid or not
    pub fn get(&self, slot: usize) -> Option<&ComponentRef<T>> {
        self.items.get(slot)
    }

    /// Instances currently handed out
    pub fn valid_count(&self) -> usize {
        self.valid_count
    }

    /// Instances available for reuse
    pub fn invalid_count(&self) -> usize {
        self.items.len() - self.valid_count
    }

    /// Total number of instances
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Instances added on each growth
    pub fn resize_amount(&self) -> usize {
        self.config.resize_amount
    }

    /// Whether the pool grows when exhausted
    pub fn is_resizable(&self) -> bool {
        self.config.resizable
    }

    /// Current occupancy
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            valid: self.valid_count,
            invalid: self.invalid_count(),
            resize_count: self.resize_count,
        }
    }

    fn allocate(&mut self, count: usize) {
        let start = self.items.len();
        for slot in start..start + count {
            self.items.push(ComponentRef::with_pool_id((self.factory)(), slot));
            self.valid.push(false);
        }
    }
}

impl<T: Poolable> fmt::Debug for ComponentPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentPool")
            .field("component", &std::any::type_name::<T>())
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

/// A [`ComponentPool`] guarded by one mutex per pool
pub struct ComponentPoolMultiThread<T: Poolable> {
    inner: Mutex<ComponentPool<T>>,
}

impl<T: Poolable + Default> ComponentPoolMultiThread<T> {
    /// Create a locked pool whose instances are built with `T::default`
    pub fn new(config: PoolConfig) -> Self {
        ComponentPool::new(config).into()
    }
}

impl<T: Poolable> ComponentPoolMultiThread<T> {
    /// See [`ComponentPool::new_component`]
    pub fn new_component(&self) -> Option<ComponentRef<T>> {
        self.inner.lock().new_component()
    }

    /// See [`ComponentPool::return_object`]
    pub fn return_object(&self, item: &ComponentRef<T>) {
        self.inner.lock().return_object(item)
    }

    /// See [`ComponentPool::clean_up`]
    pub fn clean_up(&self) -> usize {
        self.inner.lock().clean_up()
    }

    /// Instances currently handed out
    pub fn valid_count(&self) -> usize {
        self.inner.lock().valid_count()
    }

    /// Instances available for reuse
    pub fn invalid_count(&self) -> usize {
        self.inner.lock().invalid_count()
    }

    /// Total number of instances
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Current occupancy
    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }
}

impl<T: Poolable> From<ComponentPool<T>> for ComponentPoolMultiThread<T> {
    fn from(pool: ComponentPool<T>) -> Self {
        ComponentPoolMultiThread {
            inner: Mutex::new(pool),
        }
    }
}

/// Type-erased pool operations used by the world
pub(crate) trait ErasedPool: Send + Sync {
    fn return_erased(&self, cell: Arc<dyn ErasedCell>);
    fn clean_up(&self) -> usize;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Poolable> ErasedPool for ComponentPoolMultiThread<T> {
    fn return_erased(&self, cell: Arc<dyn ErasedCell>) {
        if let Ok(cell) = cell.into_any().downcast::<ComponentCell<T>>() {
            self.return_object(&ComponentRef::from_cell(cell));
        }
    }

    fn clean_up(&self) -> usize {
        ComponentPoolMultiThread::clean_up(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Particle {
        life: u32,
        initialized: u32,
        cleaned: u32,
    }

    impl Component for Particle {}

    impl Poolable for Particle {
        fn initialize(&mut self) {
            self.initialized += 1;
            self.life = 100;
        }

        fn clean_up(&mut self) {
            self.cleaned += 1;
            self.life = 0;
        }
    }

    #[test]
    fn test_pool_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.initial_size, 10);
        assert_eq!(config.resize_amount, 10);
        assert!(config.resizable);
    }

    #[test]
    fn test_pool_config_custom() {
        let config = PoolConfig::new(4, 2).with_resize_amount(8).fixed_size();
        assert_eq!(config.initial_size, 4);
        assert_eq!(config.resize_amount, 8);
        assert!(!config.resizable);
    }

    #[test]
    #[should_panic(expected = "Resize amount must be > 0")]
    fn test_pool_config_zero_resize() {
        PoolConfig::default().with_resize_amount(0);
    }

    #[test]
    fn test_round_trip_reinitializes() {
        let mut pool = ComponentPool::<Particle>::new(PoolConfig::new(1, 1).fixed_size());

        let first = pool.new_component().expect("pool has one instance");
        assert_eq!(first.read().initialized, 1);
        first.write().life = 3;

        pool.return_object(&first);
        assert_eq!(first.read().cleaned, 1);

        let second = pool.new_component().expect("instance was returned");
        assert!(ComponentRef::ptr_eq(&first, &second));
        assert_eq!(second.read().initialized, 2);
        assert_eq!(second.read().life, 100);
    }

    #[test]
    fn test_fixed_pool_exhausts() {
        let mut pool = ComponentPool::<Particle>::new(PoolConfig::new(2, 1).fixed_size());
        assert!(pool.new_component().is_some());
        assert!(pool.new_component().is_some());
        assert!(pool.new_component().is_none());
        assert_eq!(pool.valid_count(), 2);
        assert_eq!(pool.invalid_count(), 0);
    }

    #[test]
    fn test_resizable_pool_grows() {
        let mut pool = ComponentPool::<Particle>::new(PoolConfig::new(1, 3));
        let _a = pool.new_component();
        let _b = pool.new_component();
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.stats().resize_count, 1);
        assert_eq!(pool.valid_count(), 2);
    }

    #[test]
    fn test_no_double_hand_out() {
        let mut pool = ComponentPool::<Particle>::new(PoolConfig::new(4, 4));
        let handed: Vec<_> = (0..4).filter_map(|_| pool.new_component()).collect();
        for (i, a) in handed.iter().enumerate() {
            for b in &handed[i + 1..] {
                assert!(!ComponentRef::ptr_eq(a, b));
            }
        }
    }

    #[test]
    fn test_double_return_is_ignored() {
        let mut pool = ComponentPool::<Particle>::new(PoolConfig::new(2, 2));
        let item = pool.new_component().expect("instance available");
        pool.return_object(&item);
        pool.return_object(&item);
        assert_eq!(pool.valid_count(), 0);
        assert_eq!(item.read().cleaned, 1);
    }

    #[test]
    fn test_clean_up_compacts_and_updates_ids() {
        let mut pool = ComponentPool::<Particle>::new(PoolConfig::new(5, 5));
        let items: Vec<_> = (0..5).filter_map(|_| pool.new_component()).collect();
        pool.return_object(&items[0]);
        pool.return_object(&items[2]);

        let moved = pool.clean_up();
        assert!(moved > 0);
        assert_eq!(pool.valid_count() + pool.invalid_count(), pool.capacity());

        for slot in 0..pool.valid_count() {
            let held = pool.get(slot).expect("slot exists");
            assert_eq!(held.pool_id(), Some(slot));
        }
        let still_valid = [&items[1], &items[3], &items[4]];
        for item in still_valid {
            let slot = item.pool_id().expect("pooled");
            assert!(slot < pool.valid_count());
        }

        pool.return_object(&items[4]);
        assert_eq!(pool.valid_count(), 2);
    }

    #[test]
    fn test_multi_thread_pool() {
        let pool = Arc::new(ComponentPoolMultiThread::<Particle>::new(PoolConfig::new(8, 8)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    let item = pool.new_component().expect("pool grows");
                    pool.return_object(&item);
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker finished");
        }
        assert_eq!(pool.valid_count(), 0);
        assert_eq!(pool.stats().capacity(), pool.capacity());
    }
}
