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
//! Components and component handles
//!
//! Components are data containers attached to entities. Each stored
//! component lives in a shared [`ComponentCell`] so that systems can hold a
//! [`ComponentRef`] and read or write it without keeping any world lock.
//! Storage columns are type-erased; typed access downcasts the cell and
//! fails softly (returns `None`) when the stored type does not match.

use crate::ecs::{Entity, World};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Pool slot id carried by components that were not created by a pool
pub const NOT_POOLED: usize = usize::MAX;

/// Trait that all components must implement
///
/// Components should be plain data structures without behavior.
///
/// # Examples
///
/// ```
/// use aspect_ecs::ecs::Component;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Health(u32);
/// impl Component for Health {}
/// ```
pub trait Component: Any + Send + Sync {
    /// Expose the optional reset capability
    ///
    /// Components that can be re-initialized in place override this to
    /// return `Some(self)`.
    fn as_resettable(&mut self) -> Option<&mut dyn ResettableComponent> {
        None
    }
}

/// Optional capability for components that can be reset with arguments
pub trait ResettableComponent {
    /// Overwrite the component state from `args`
    fn reset(&mut self, args: &[&dyn Any]);
}

/// Shared storage cell for one component instance
pub struct ComponentCell<T> {
    pool_id: AtomicUsize,
    value: RwLock<T>,
}

impl<T> ComponentCell<T> {
    fn new(value: T, pool_id: usize) -> Self {
        ComponentCell {
            pool_id: AtomicUsize::new(pool_id),
            value: RwLock::new(value),
        }
    }
}

/// Cloneable handle to a stored component
///
/// Cloning the handle does not clone the component; all clones refer to the
/// same cell.
pub struct ComponentRef<T: Component>(Arc<ComponentCell<T>>);

impl<T: Component> ComponentRef<T> {
    /// Wrap a fresh, unpooled component
    pub fn new(value: T) -> Self {
        ComponentRef(Arc::new(ComponentCell::new(value, NOT_POOLED)))
    }

    pub(crate) fn with_pool_id(value: T, pool_id: usize) -> Self {
        ComponentRef(Arc::new(ComponentCell::new(value, pool_id)))
    }

    pub(crate) fn from_cell(cell: Arc<ComponentCell<T>>) -> Self {
        ComponentRef(cell)
    }

    /// Lock the component for reading
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.value.read()
    }

    /// Lock the component for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.value.write()
    }

    /// Slot id in the owning pool, or `None` when the component is not pooled
    pub fn pool_id(&self) -> Option<usize> {
        match self.0.pool_id.load(Ordering::Acquire) {
            NOT_POOLED => None,
            id => Some(id),
        }
    }

    pub(crate) fn set_pool_id(&self, id: usize) {
        self.0.pool_id.store(id, Ordering::Release);
    }

    /// True when both handles refer to the same component instance
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn erased(&self) -> Arc<dyn ErasedCell> {
        self.0.clone()
    }
}

impl<T: Component> Clone for ComponentRef<T> {
    fn clone(&self) -> Self {
        ComponentRef(Arc::clone(&self.0))
    }
}

impl<T: Component + fmt::Debug> fmt::Debug for ComponentRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentRef").field(&*self.read()).finish()
    }
}

/// Type-erased view of a [`ComponentCell`]
pub(crate) trait ErasedCell: Send + Sync {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    fn component_type_id(&self) -> TypeId;
    fn type_name(&self) -> &'static str;
    fn pool_id(&self) -> usize;
}

impl<T: Component> ErasedCell for ComponentCell<T> {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn component_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn pool_id(&self) -> usize {
        self.pool_id.load(Ordering::Acquire)
    }
}

/// A stored component whose type is only known at runtime
#[derive(Clone)]
pub struct ErasedComponent {
    cell: Arc<dyn ErasedCell>,
}

impl ErasedComponent {
    pub(crate) fn new(cell: Arc<dyn ErasedCell>) -> Self {
        ErasedComponent { cell }
    }

    pub(crate) fn cell(&self) -> &Arc<dyn ErasedCell> {
        &self.cell
    }

    /// Name of the concrete component type
    pub fn type_name(&self) -> &'static str {
        self.cell.type_name()
    }

    /// `TypeId` of the concrete component type
    pub fn component_type_id(&self) -> TypeId {
        self.cell.component_type_id()
    }

    /// Runtime descriptor of the concrete component type
    pub fn key(&self) -> ComponentKey {
        ComponentKey {
            type_id: self.cell.component_type_id(),
            name: self.cell.type_name(),
        }
    }

    /// True when the component is a `T`
    pub fn is<T: Component>(&self) -> bool {
        self.component_type_id() == TypeId::of::<T>()
    }

    /// Recover the typed handle, or `None` if the component is not a `T`
    pub fn downcast<T: Component>(&self) -> Option<ComponentRef<T>> {
        Arc::clone(&self.cell)
            .into_any()
            .downcast::<ComponentCell<T>>()
            .ok()
            .map(ComponentRef::from_cell)
    }

    /// Slot id in the owning pool, or `None` when the component is not pooled
    pub fn pool_id(&self) -> Option<usize> {
        match self.cell.pool_id() {
            NOT_POOLED => None,
            id => Some(id),
        }
    }

    /// True when both values refer to the same component instance
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.cell, &b.cell)
    }
}

impl fmt::Debug for ErasedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedComponent")
            .field("type", &self.type_name())
            .field("pool_id", &self.pool_id())
            .finish()
    }
}

/// Runtime descriptor of a component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentKey {
    /// Descriptor for `T`
    pub fn of<T: Component>() -> Self {
        ComponentKey {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// `TypeId` of the component type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A fixed set of component types, fetched together
///
/// Implemented for tuples of one to five component types. Used to build
/// aspects that require every member and to fetch all members of an entity
/// in one call.
pub trait ComponentSet: Send + Sync + 'static {
    /// Tuple of handles, one per member type
    type Refs;

    /// Descriptors of the member types
    fn keys() -> Vec<ComponentKey>;

    /// Fetch every member from `entity`, or `None` if any is missing
    fn fetch(world: &World, entity: Entity) -> Option<Self::Refs>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            type Refs = ($(ComponentRef<$name>,)+);

            fn keys() -> Vec<ComponentKey> {
                vec![$(ComponentKey::of::<$name>()),+]
            }

            fn fetch(world: &World, entity: Entity) -> Option<Self::Refs> {
                Some(($(world.get_component::<$name>(entity)?,)+))
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Counter(u32);
    impl Component for Counter {}

    struct Other;
    impl Component for Other {}

    #[test]
    fn test_ref_shares_cell() {
        let a = ComponentRef::new(Counter(1));
        let b = a.clone();
        b.write().0 = 7;
        assert_eq!(a.read().0, 7);
        assert!(ComponentRef::ptr_eq(&a, &b));
        assert_eq!(a.pool_id(), None);
    }

    #[test]
    fn test_erased_downcast() {
        let typed = ComponentRef::with_pool_id(Counter(3), 4);
        let erased = ErasedComponent::new(typed.erased());

        assert!(erased.is::<Counter>());
        assert!(!erased.is::<Other>());
        assert!(erased.downcast::<Other>().is_none());
        assert_eq!(erased.pool_id(), Some(4));

        let back = erased.downcast::<Counter>().expect("stored type is Counter");
        assert!(ComponentRef::ptr_eq(&back, &typed));
    }

    #[test]
    fn test_set_keys() {
        let keys = <(Counter, Other)>::keys();
        assert_eq!(keys, vec![ComponentKey::of::<Counter>(), ComponentKey::of::<Other>()]);
    }
}
