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
//! # Aspect ECS
//!
//! An Entity Component System runtime with aspect-driven system membership
//! and layered scheduling.
//!
//! ## Features
//!
//! - **Entities**: stable unique ids, recycled slots, enable/disable, tags and groups
//! - **Aspects**: all-of, one-of and exclude component signatures
//! - **Systems**: per-entity, per-component, interval, delayed, tag, queue and
//!   parallel specializations, ordered by layer
//! - **Parallelization**: asynchronous buckets and chunked processing on Rayon
//! - **Pooling**: reusable component instances returned on removal
//! - **Blackboard**: typed key/value store with triggers
//!
//! ## Example
//!
//! ```rust
//! use aspect_ecs::ecs::systems::{EntityProcessingSystem, ProcessEntity};
//! use aspect_ecs::ecs::{AspectBuilder, Component, Entity, ExecutionType, UpdateType, World};
//! use std::time::Duration;
//!
//! struct Position(f32);
//! impl Component for Position {}
//!
//! struct Velocity(f32);
//! impl Component for Velocity {}
//!
//! struct Movement;
//!
//! impl ProcessEntity for Movement {
//!     fn aspect(&self) -> AspectBuilder {
//!         AspectBuilder::new().all::<Position>().all::<Velocity>()
//!     }
//!
//!     fn process(&mut self, world: &World, entity: Entity) {
//!         let (Some(position), Some(velocity)) = (
//!             world.get_component::<Position>(entity),
//!             world.get_component::<Velocity>(entity),
//!         ) else {
//!             return;
//!         };
//!         position.write().0 += velocity.read().0 * world.delta().as_secs_f32();
//!     }
//! }
//!
//! let mut world = World::new();
//! world.set_system(
//!     EntityProcessingSystem::new(Movement),
//!     UpdateType::FixedUpdate,
//!     0,
//!     ExecutionType::Synchronous,
//! );
//!
//! let entity = world.create_entity();
//! let position = entity.add_component(Position(0.0));
//! entity.add_component(Velocity(2.0));
//!
//! world.fixed_update_with(Duration::from_secs(1));
//! assert_eq!(position.read().0, 2.0);
//! ```

#![warn(missing_docs)]

/// Growable slot-indexed storage
pub mod bag;

/// Dynamic bit sets for component and system membership
pub mod bits;

/// Typed key/value store with change triggers
pub mod blackboard;

/// World and system configuration documents
pub mod config;

/// Declarative and configuration-driven registration
pub mod declare;

/// Entity Component System implementation
pub mod ecs;

/// Error types
pub mod error;

/// Memory pooling for reducing allocation churn
pub mod pool;

/// Accumulating countdown timers
pub mod timer;

pub use ecs::{Entity, World};
pub use error::{EcsError, Result};
