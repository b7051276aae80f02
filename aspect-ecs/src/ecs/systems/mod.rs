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
//! Ready-made system shapes
//!
//! Each specialization wraps a small user trait and implements [`System`]
//! for it, so user code only writes the per-entity (or per-run) logic.
//!
//! | Wrapper | User trait | Runs |
//! |---------|------------|------|
//! | [`ProcessingSystem`] | [`ProcessSystem`] | once per run, no tracking |
//! | [`EntityProcessingSystem`] | [`ProcessEntity`] | per active entity |
//! | [`EntityComponentProcessingSystem`] | [`ProcessComponents`] | per active entity, with its components |
//! | [`IntervalEntitySystem`] | any [`System`] | when its interval elapses |
//! | [`DelayedEntitySystem`] | [`ProcessDelayed`] | once, after a started delay |
//! | [`TagSystem`] | [`ProcessEntity`] | on the tagged entity |
//! | [`QueueProcessingSystem`] | [`ProcessEntity`] | on queued entities, in batches |
//! | [`QueueSystemProcessingThreadSafe`] | [`ProcessQueued`] | on a queue shared per system type |
//! | [`ParallelEntityProcessingSystem`] | [`ProcessEntityShared`] | per active entity, in parallel chunks |
//!
//! [`System`]: crate::ecs::System

pub mod component_processing;
pub mod delayed;
pub mod entity_processing;
pub mod interval;
pub mod parallel;
pub mod processing;
pub mod queue;
pub mod tag;

pub use component_processing::{EntityComponentProcessingSystem, ProcessComponents};
pub use delayed::{
    DelayedEntities, DelayedEntityProcessingSystem, DelayedEntitySystem, ProcessDelayed,
    ProcessDelayedEntity,
};
pub use entity_processing::{EntityProcessingSystem, ProcessEntity};
pub use interval::{IntervalEntityProcessingSystem, IntervalEntitySystem, IntervalTagSystem};
pub use parallel::{ParallelEntityProcessingSystem, ProcessEntityShared};
pub use processing::{ProcessSystem, ProcessingSystem};
pub use queue::{
    ProcessQueued, QueueLease, QueueProcessingSystem, QueueSystemProcessingThreadSafe,
    SharedQueues, DEFAULT_ENTITIES_PER_FRAME,
};
pub use tag::TagSystem;
