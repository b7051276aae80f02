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
//! Component type registry
//!
//! Every distinct component kind gets a sequential id and the matching bit
//! the first time it is seen. The registry belongs to a [`World`], so two
//! worlds may number the same Rust type differently.
//!
//! [`World`]: crate::ecs::World

use crate::bits::Bits;
use crate::ecs::component::{Component, ComponentKey};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;

/// Id and bit assigned to one component kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentType {
    id: usize,
    bit: Bits,
    key: ComponentKey,
}

impl ComponentType {
    /// Sequential id, starting at 0
    pub fn id(&self) -> usize {
        self.id
    }

    /// Single-bit set at position `id`
    pub fn bit(&self) -> &Bits {
        &self.bit
    }

    /// Runtime descriptor of the component type
    pub fn key(&self) -> ComponentKey {
        self.key
    }

    /// Name of the component type
    pub fn name(&self) -> &'static str {
        self.key.name()
    }
}

#[derive(Default)]
struct RegistryInner {
    by_type: HashMap<TypeId, usize>,
    types: Vec<ComponentType>,
}

/// Lazily populated table of component types
///
/// Registration normally happens during setup, but the table is guarded by
/// a read-write lock so a running system may still introduce a new kind.
#[derive(Default)]
pub struct ComponentTypeRegistry {
    inner: RwLock<RegistryInner>,
}

impl ComponentTypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the type for `T`, registering it on first request
    pub fn type_for<T: Component>(&self) -> ComponentType {
        self.type_for_key(ComponentKey::of::<T>())
    }

    /// Get the type for a runtime descriptor, registering it on first request
    pub fn type_for_key(&self, key: ComponentKey) -> ComponentType {
        if let Some(found) = self.lookup_key(key) {
            return found;
        }

        let mut inner = self.inner.write();
        if let Some(&id) = inner.by_type.get(&key.type_id()) {
            return inner.types[id].clone();
        }
        let id = inner.types.len();
        let component_type = ComponentType {
            id,
            bit: Bits::with_bit(id),
            key,
        };
        inner.by_type.insert(key.type_id(), id);
        inner.types.push(component_type.clone());
        tracing::trace!(component = key.name(), id, "registered component type");
        component_type
    }

    /// Get the type for `T` without registering it
    pub fn lookup<T: Component>(&self) -> Option<ComponentType> {
        self.lookup_key(ComponentKey::of::<T>())
    }

    /// Get the type for a runtime descriptor without registering it
    pub fn lookup_key(&self, key: ComponentKey) -> Option<ComponentType> {
        let inner = self.inner.read();
        inner
            .by_type
            .get(&key.type_id())
            .map(|&id| inner.types[id].clone())
    }

    /// Look up a registered type by `TypeId`
    pub fn lookup_type_id(&self, type_id: TypeId) -> Option<ComponentType> {
        let inner = self.inner.read();
        inner.by_type.get(&type_id).map(|&id| inner.types[id].clone())
    }

    /// Bit of `T`, registering it on first request
    pub fn bit<T: Component>(&self) -> Bits {
        self.type_for::<T>().bit
    }

    /// Id of `T`, registering it on first request
    pub fn id<T: Component>(&self) -> usize {
        self.type_for::<T>().id
    }

    /// Register a batch of component kinds up front
    pub fn register_all(&self, keys: &[ComponentKey]) {
        for key in keys {
            self.type_for_key(*key);
        }
    }

    /// Descriptor of the type with the given id
    pub fn key_of(&self, id: usize) -> Option<ComponentKey> {
        self.inner.read().types.get(id).map(|t| t.key)
    }

    /// Descriptors of every registered type whose bit is set in `bits`
    pub fn types_from_bits(&self, bits: &Bits) -> Vec<ComponentKey> {
        let inner = self.inner.read();
        bits.iter_ones()
            .filter_map(|id| inner.types.get(id).map(|t| t.key))
            .collect()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.inner.read().types.len()
    }

    /// True when no type has been registered yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
