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
//! Aspects: component signatures that systems match entities against
//!
//! An [`Aspect`] is an immutable predicate over an entity's component bits:
//! it must have every type in `all`, none of `exclude`, and at least one of
//! `one`. Aspects are described with an [`AspectBuilder`], which records
//! component types and is resolved against a world's registry when the
//! system is registered.
//!
//! # Examples
//!
//! ```
//! use aspect_ecs::ecs::{AspectBuilder, Component, ComponentTypeRegistry};
//!
//! struct Position;
//! impl Component for Position {}
//! struct Velocity;
//! impl Component for Velocity {}
//! struct Frozen;
//! impl Component for Frozen {}
//!
//! let registry = ComponentTypeRegistry::new();
//! let moving = AspectBuilder::new()
//!     .all::<Position>()
//!     .all::<Velocity>()
//!     .exclude::<Frozen>()
//!     .build(&registry);
//!
//! let mut bits = registry.bit::<Position>();
//! bits.union_with(&registry.bit::<Velocity>());
//! assert!(moving.interests(&bits));
//! ```

use crate::bits::Bits;
use crate::ecs::component::{Component, ComponentKey, ComponentSet};
use crate::ecs::component_type::ComponentTypeRegistry;

/// Resolved, immutable component signature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aspect {
    all: Bits,
    exclude: Bits,
    one: Bits,
}

impl Aspect {
    /// An aspect that matches nothing
    pub fn empty() -> Self {
        Aspect::default()
    }

    /// Build an aspect directly from resolved bitsets
    pub fn from_bits(all: Bits, one: Bits, exclude: Bits) -> Self {
        Aspect { all, exclude, one }
    }

    /// Aspect requiring every type of `S`
    pub fn all<S: ComponentSet>(registry: &ComponentTypeRegistry) -> Self {
        AspectBuilder::new().all_of::<S>().build(registry)
    }

    /// Aspect requiring at least one type of `S`
    pub fn one<S: ComponentSet>(registry: &ComponentTypeRegistry) -> Self {
        AspectBuilder::new().one_of::<S>().build(registry)
    }

    /// Aspect rejecting every type of `S`
    pub fn exclude<S: ComponentSet>(registry: &ComponentTypeRegistry) -> Self {
        AspectBuilder::new().exclude_of::<S>().build(registry)
    }

    /// Test an entity's component bits against the aspect
    ///
    /// An aspect with all three sets empty never matches.
    pub fn interests(&self, bits: &Bits) -> bool {
        if self.is_empty() {
            return false;
        }
        (self.one.is_zero() || self.one.intersects(bits))
            && (self.all.is_zero() || bits.contains_all(&self.all))
            && (self.exclude.is_zero() || !self.exclude.intersects(bits))
    }

    /// True when no set holds any bit
    pub fn is_empty(&self) -> bool {
        self.all.is_zero() && self.exclude.is_zero() && self.one.is_zero()
    }

    /// Bits that must all be present
    pub fn all_bits(&self) -> &Bits {
        &self.all
    }

    /// Bits of which at least one must be present
    pub fn one_bits(&self) -> &Bits {
        &self.one
    }

    /// Bits that must all be absent
    pub fn exclude_bits(&self) -> &Bits {
        &self.exclude
    }

    /// Human-readable form listing the type names in each set
    pub fn describe(&self, registry: &ComponentTypeRegistry) -> String {
        let names = |bits: &Bits| {
            registry
                .types_from_bits(bits)
                .iter()
                .map(|k| short_name(k.name()))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "all: [{}], one: [{}], exclude: [{}]",
            names(&self.all),
            names(&self.one),
            names(&self.exclude)
        )
    }
}

fn short_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Unresolved aspect description keyed by component type
///
/// Each chained call consumes and returns the builder, so a partially built
/// description can be cloned and extended without aliasing.
#[derive(Debug, Clone, Default)]
pub struct AspectBuilder {
    all: Vec<ComponentKey>,
    one: Vec<ComponentKey>,
    exclude: Vec<ComponentKey>,
}

impl AspectBuilder {
    /// Start an empty description
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `T`
    pub fn all<T: Component>(mut self) -> Self {
        self.all.push(ComponentKey::of::<T>());
        self
    }

    /// Accept entities that have `T` or any other `one` type
    pub fn one<T: Component>(mut self) -> Self {
        self.one.push(ComponentKey::of::<T>());
        self
    }

    /// Reject entities that have `T`
    pub fn exclude<T: Component>(mut self) -> Self {
        self.exclude.push(ComponentKey::of::<T>());
        self
    }

    /// Require every type of `S`
    pub fn all_of<S: ComponentSet>(mut self) -> Self {
        self.all.extend(S::keys());
        self
    }

    /// Accept entities that have any type of `S`
    pub fn one_of<S: ComponentSet>(mut self) -> Self {
        self.one.extend(S::keys());
        self
    }

    /// Reject entities that have any type of `S`
    pub fn exclude_of<S: ComponentSet>(mut self) -> Self {
        self.exclude.extend(S::keys());
        self
    }

    /// Require a runtime-described type
    pub fn all_key(mut self, key: ComponentKey) -> Self {
        self.all.push(key);
        self
    }

    /// True when no type has been named
    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.one.is_empty() && self.exclude.is_empty()
    }

    /// Resolve the description, registering any type seen for the first time
    pub fn build(&self, registry: &ComponentTypeRegistry) -> Aspect {
        let resolve = |keys: &[ComponentKey]| {
            keys.iter()
                .map(|k| registry.type_for_key(*k).id())
                .collect::<Bits>()
        };
        Aspect {
            all: resolve(self.all.as_slice()),
            exclude: resolve(self.exclude.as_slice()),
            one: resolve(self.one.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    impl Component for A {}
    struct B;
    impl Component for B {}
    struct C;
    impl Component for C {}

    fn bits(ids: &[usize]) -> Bits {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_empty_never_matches() {
        let empty = Aspect::empty();
        assert!(!empty.interests(&Bits::new()));
        assert!(!empty.interests(&[0, 1, 2].into_iter().collect()));
    }

    #[test]
    fn test_single_all() {
        let registry = ComponentTypeRegistry::new();
        let aspect = Aspect::all::<(A,)>(&registry);
        let a = registry.id::<A>();
        let b = registry.id::<B>();

        assert!(aspect.interests(&bits(&[a])));
        assert!(aspect.interests(&bits(&[a, b])));
        assert!(!aspect.interests(&bits(&[b])));
        assert!(!aspect.interests(&Bits::new()));
    }

    #[test]
    fn test_exclude() {
        let registry = ComponentTypeRegistry::new();
        let aspect = AspectBuilder::new().all::<A>().exclude::<C>().build(&registry);
        let (a, c) = (registry.id::<A>(), registry.id::<C>());

        assert!(aspect.interests(&bits(&[a])));
        assert!(!aspect.interests(&bits(&[a, c])));
    }

    #[test]
    fn test_exclude_only_matches_everything_else() {
        let registry = ComponentTypeRegistry::new();
        let aspect = Aspect::exclude::<(C,)>(&registry);
        let (a, c) = (registry.id::<A>(), registry.id::<C>());

        assert!(aspect.interests(&Bits::new()));
        assert!(aspect.interests(&bits(&[a])));
        assert!(!aspect.interests(&bits(&[c])));
    }

    #[test]
    fn test_one() {
        let registry = ComponentTypeRegistry::new();
        let aspect = Aspect::one::<(A, B)>(&registry);
        let (a, b, c) = (registry.id::<A>(), registry.id::<B>(), registry.id::<C>());

        assert!(aspect.interests(&bits(&[a])));
        assert!(aspect.interests(&bits(&[b, c])));
        assert!(!aspect.interests(&bits(&[c])));
    }

    #[test]
    fn test_builder_clone_does_not_alias() {
        let registry = ComponentTypeRegistry::new();
        let base = AspectBuilder::new().all::<A>();
        let narrowed = base.clone().all::<B>().build(&registry);
        let wide = base.build(&registry);

        let a_only = bits(&[registry.id::<A>()]);
        assert!(wide.interests(&a_only));
        assert!(!narrowed.interests(&a_only));
    }

    #[test]
    fn test_describe() {
        let registry = ComponentTypeRegistry::new();
        let aspect = AspectBuilder::new().all::<A>().exclude::<B>().build(&registry);
        assert_eq!(aspect.describe(&registry), "all: [A], one: [], exclude: [B]");
    }
}
