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
//! Error types
//!
//! Missing registrations and ambiguous lookups are reported as [`EcsError`].
//! Plain data absence (a component an entity does not have, an exhausted
//! pool) is `None`, and programmer errors such as empty tag names panic.

use crate::ecs::{Entity, EntityId};
use thiserror::Error;

/// Errors returned by world, registry and system operations
#[derive(Debug, Error)]
pub enum EcsError {
    /// No pool was registered for the requested component type
    #[error("no component pool registered for `{0}`")]
    MissingPool(&'static str),

    /// A non-resizable pool has no free instance left
    #[error("component pool for `{0}` is exhausted")]
    PoolExhausted(&'static str),

    /// No entity template was registered under the name
    #[error("no entity template registered under `{0}`")]
    MissingEntityTemplate(String),

    /// No system of the requested type is registered
    #[error("no system of type `{0}` is registered")]
    SystemNotFound(&'static str),

    /// More than one system of the requested type is registered
    #[error("{count} systems of type `{name}` are registered, use get_systems")]
    AmbiguousSystem {
        /// System type name
        name: &'static str,
        /// Number of registered instances
        count: usize,
    },

    /// The unique id is already held by a live entity
    #[error("entity id {0} is already in use")]
    DuplicateEntityId(EntityId),

    /// The entity handle refers to an entity that no longer exists
    #[error("{0} is not alive")]
    DeadEntity(Entity),

    /// No shared queue is held for the system type
    #[error("no shared queue is registered for `{0}`")]
    QueueNotRegistered(&'static str),

    /// A delayed system was stopped before it was ever started
    #[error("start_delayed_run must be called before stop")]
    DelayNotStarted,

    /// A configuration entry names a system with no registered factory
    #[error("unknown system `{0}` in configuration")]
    UnknownSystem(String),

    /// The configuration document could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EcsError>;
