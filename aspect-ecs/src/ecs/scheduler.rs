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
//! Layered system scheduler with parallel execution support
//!
//! Systems are organized into layers per update phase. Layers execute in
//! ascending order. Within a layer the synchronous bucket runs first, in
//! registration order; the asynchronous bucket then runs concurrently on
//! Rayon and is joined before the next layer starts.

use crate::ecs::system::{ExecutionType, SharedSystem, System, SystemHandle, UpdateType};
use crate::ecs::World;
use crate::error::{EcsError, Result};
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Layer identifier; lower layers run first
pub type Layer = i32;

/// Systems scheduled at one layer
#[derive(Default, Clone)]
pub(crate) struct SystemLayer {
    synchronous: Vec<SharedSystem>,
    asynchronous: Vec<SharedSystem>,
}

impl SystemLayer {
    fn bucket_mut(&mut self, execution: ExecutionType) -> &mut Vec<SharedSystem> {
        match execution {
            ExecutionType::Synchronous => &mut self.synchronous,
            ExecutionType::Asynchronous => &mut self.asynchronous,
        }
    }

    /// Run the synchronous bucket, then the asynchronous one
    pub(crate) fn run(&self, world: &World) {
        for system in &self.synchronous {
            system.lock().process(world);
        }
        self.run_asynchronous(world);
    }

    #[cfg(feature = "parallel")]
    fn run_asynchronous(&self, world: &World) {
        use rayon::prelude::*;

        self.asynchronous
            .par_iter()
            .for_each(|system| system.lock().process(world));
    }

    #[cfg(not(feature = "parallel"))]
    fn run_asynchronous(&self, world: &World) {
        for system in &self.asynchronous {
            system.lock().process(world);
        }
    }
}

/// Registry of every system in a world and the layers they run in
#[derive(Default)]
pub(crate) struct SystemManager {
    systems: Vec<SharedSystem>,
    by_type: HashMap<TypeId, Vec<SharedSystem>>,
    frame_layers: BTreeMap<Layer, SystemLayer>,
    fixed_layers: BTreeMap<Layer, SystemLayer>,
    next_bit: usize,
}

impl SystemManager {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reserve the tracking bit for a new system; bits are never reused
    pub(crate) fn allocate_bit(&mut self) -> usize {
        let bit = self.next_bit;
        self.next_bit += 1;
        bit
    }

    /// Record a new system and place it in its first bucket
    pub(crate) fn register<S: System>(
        &mut self,
        system: SharedSystem,
        update: UpdateType,
        layer: Layer,
        execution: ExecutionType,
    ) {
        self.systems.push(Arc::clone(&system));
        self.by_type
            .entry(TypeId::of::<S>())
            .or_default()
            .push(Arc::clone(&system));
        self.schedule(&system, update, layer, execution);
    }

    /// Place an already registered system in a further bucket
    pub(crate) fn schedule(
        &mut self,
        system: &SharedSystem,
        update: UpdateType,
        layer: Layer,
        execution: ExecutionType,
    ) {
        let layers = match update {
            UpdateType::FrameUpdate => &mut self.frame_layers,
            UpdateType::FixedUpdate => &mut self.fixed_layers,
        };
        let bucket = layers.entry(layer).or_default().bucket_mut(execution);
        if !bucket.iter().any(|existing| Arc::ptr_eq(existing, system)) {
            bucket.push(Arc::clone(system));
        }
    }

    /// Snapshot of the layers of one phase, in execution order
    pub(crate) fn layers(&self, update: UpdateType) -> Vec<SystemLayer> {
        let layers = match update {
            UpdateType::FrameUpdate => &self.frame_layers,
            UpdateType::FixedUpdate => &self.fixed_layers,
        };
        layers.values().cloned().collect()
    }

    /// Every registered system, in registration order
    pub(crate) fn systems(&self) -> Vec<SharedSystem> {
        self.systems.clone()
    }

    /// The single registered instance of `S`
    pub(crate) fn get_system<S: System>(&self) -> Result<SystemHandle<S>> {
        match self.by_type.get(&TypeId::of::<S>()).map(Vec::as_slice) {
            None | Some([]) => Err(EcsError::SystemNotFound(std::any::type_name::<S>())),
            Some([system]) => Ok(SystemHandle::new(Arc::clone(system))),
            Some(systems) => Err(EcsError::AmbiguousSystem {
                name: std::any::type_name::<S>(),
                count: systems.len(),
            }),
        }
    }

    /// Every registered instance of `S`
    pub(crate) fn get_systems<S: System>(&self) -> Vec<SystemHandle<S>> {
        self.by_type
            .get(&TypeId::of::<S>())
            .map(|systems| {
                systems
                    .iter()
                    .map(|system| SystemHandle::new(Arc::clone(system)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.systems.len()
    }

    /// Drop every registration; the bit counter keeps counting
    pub(crate) fn clear(&mut self) {
        self.systems.clear();
        self.by_type.clear();
        self.frame_layers.clear();
        self.fixed_layers.clear();
    }
}
