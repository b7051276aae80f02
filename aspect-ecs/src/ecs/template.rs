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
//! Entity templates

use crate::ecs::EntityRef;
use std::any::Any;

/// Recipe that populates a freshly created entity
///
/// Registered with [`World::set_entity_template`] and invoked by
/// [`World::create_entity_from_template`], which refreshes the entity
/// afterwards.
///
/// [`World::set_entity_template`]: crate::ecs::World::set_entity_template
/// [`World::create_entity_from_template`]: crate::ecs::World::create_entity_from_template
pub trait EntityTemplate: Send + Sync {
    /// Attach components to `entity`, using `args` as the template wishes
    fn build_entity(&self, entity: &EntityRef<'_>, args: &[&dyn Any]);
}
