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
//! Shared key/value store with change triggers
//!
//! Every world owns a [`BlackBoard`]. Systems publish named values on it and
//! register [`Trigger`]s that fire when monitored entries are added,
//! changed or removed.
//!
//! # Concurrency
//!
//! One reentrant lock guards each board. Mutations and trigger dispatch
//! happen while it is held, so a trigger action may write to the same board
//! from its callback. A trigger that is already firing is skipped rather
//! than re-entered.
//!
//! # Example
//!
//! ```
//! use aspect_ecs::blackboard::{BlackBoard, Trigger};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let board = BlackBoard::new();
//! let alarms = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&alarms);
//! board.add_trigger(
//!     Trigger::new(["threat"], move |_, _| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }),
//!     false,
//! );
//!
//! board.set_entry("threat", 3u32);
//! assert_eq!(board.get_entry::<u32>("threat"), Some(3));
//! assert_eq!(alarms.load(Ordering::SeqCst), 1);
//! ```

use parking_lot::ReentrantMutex;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Why a trigger is being fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerStateType {
    /// A monitored entry was set for the first time
    ValueAdded,
    /// A monitored entry was overwritten
    ValueChanged,
    /// A monitored entry was removed
    ValueRemoved,
    /// The trigger was registered with immediate evaluation
    TriggerAdded,
}

type Condition = Box<dyn Fn(&BlackBoard, TriggerStateType) -> bool + Send + Sync>;
type Action = Box<dyn Fn(&BlackBoard, TriggerStateType) + Send + Sync>;

/// Callback bound to a set of entry names
pub struct Trigger {
    monitored: Vec<String>,
    condition: Condition,
    action: Action,
    firing: AtomicBool,
}

impl Trigger {
    /// Run `action` whenever any of `monitored` changes
    pub fn new<I, S>(monitored: I, action: impl Fn(&BlackBoard, TriggerStateType) + Send + Sync + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Trigger {
            monitored: monitored.into_iter().map(Into::into).collect(),
            condition: Box::new(|_, _| true),
            action: Box::new(action),
            firing: AtomicBool::new(false),
        }
    }

    /// Only run the action when `condition` holds
    pub fn with_condition(
        mut self,
        condition: impl Fn(&BlackBoard, TriggerStateType) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = Box::new(condition);
        self
    }

    /// Entry names this trigger monitors
    pub fn monitored(&self) -> &[String] {
        &self.monitored
    }

    /// True while the action is running
    pub fn is_firing(&self) -> bool {
        self.firing.load(Ordering::Acquire)
    }

    fn fire(&self, board: &BlackBoard, state: TriggerStateType) {
        if self
            .firing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        if (self.condition)(board, state) {
            (self.action)(board, state);
        }
        self.firing.store(false, Ordering::Release);
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("monitored", &self.monitored)
            .field("firing", &self.is_firing())
            .finish()
    }
}

/// Identifier returned by [`BlackBoard::add_trigger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerId(u64);

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct BoardState {
    entries: HashMap<String, Entry>,
    triggers: HashMap<String, Vec<(TriggerId, Arc<Trigger>)>>,
    next_trigger: u64,
}

impl BoardState {
    fn triggers_for(&self, name: &str) -> Vec<Arc<Trigger>> {
        self.triggers
            .get(name)
            .map(|list| list.iter().map(|(_, t)| Arc::clone(t)).collect())
            .unwrap_or_default()
    }
}

/// Named values shared between systems
#[derive(Default)]
pub struct BlackBoard {
    state: ReentrantMutex<RefCell<BoardState>>,
}

impl BlackBoard {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name` and fire the triggers monitoring it
    pub fn set_entry<T: Any + Send + Sync>(&self, name: &str, value: T) {
        let guard = self.state.lock();
        let (state_type, triggers) = {
            let mut state = guard.borrow_mut();
            let previous = state.entries.insert(name.to_owned(), Arc::new(value));
            let state_type = if previous.is_some() {
                TriggerStateType::ValueChanged
            } else {
                TriggerStateType::ValueAdded
            };
            (state_type, state.triggers_for(name))
        };
        for trigger in triggers {
            trigger.fire(self, state_type);
        }
    }

    /// Store `value` under its type name
    pub fn set_entry_by_type<T: Any + Send + Sync>(&self, value: T) {
        self.set_entry(std::any::type_name::<T>(), value);
    }

    /// Value stored under `name`, if it is a `T`
    pub fn get_entry<T: Any + Clone>(&self, name: &str) -> Option<T> {
        let guard = self.state.lock();
        let state = guard.borrow();
        state.entries.get(name)?.downcast_ref::<T>().cloned()
    }

    /// Value stored under the type name of `T`
    pub fn get_entry_by_type<T: Any + Clone>(&self) -> Option<T> {
        self.get_entry(std::any::type_name::<T>())
    }

    /// True when an entry named `name` exists
    pub fn contains_entry(&self, name: &str) -> bool {
        self.state.lock().borrow().entries.contains_key(name)
    }

    /// Remove the entry and fire the triggers monitoring it
    ///
    /// Triggers fire even when no entry existed.
    pub fn remove_entry(&self, name: &str) {
        let guard = self.state.lock();
        let triggers = {
            let mut state = guard.borrow_mut();
            state.entries.remove(name);
            state.triggers_for(name)
        };
        for trigger in triggers {
            trigger.fire(self, TriggerStateType::ValueRemoved);
        }
    }

    /// Register `trigger`; with `evaluate_now` it fires once immediately
    pub fn add_trigger(&self, trigger: Trigger, evaluate_now: bool) -> TriggerId {
        let guard = self.state.lock();
        let trigger = Arc::new(trigger);
        let id = {
            let mut state = guard.borrow_mut();
            let id = TriggerId(state.next_trigger);
            state.next_trigger += 1;
            for name in trigger.monitored() {
                state
                    .triggers
                    .entry(name.clone())
                    .or_default()
                    .push((id, Arc::clone(&trigger)));
            }
            id
        };
        if evaluate_now {
            trigger.fire(self, TriggerStateType::TriggerAdded);
        }
        id
    }

    /// Unregister a trigger; returns false if it was not registered
    pub fn remove_trigger(&self, id: TriggerId) -> bool {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        let mut removed = false;
        state.triggers.retain(|_, list| {
            let before = list.len();
            list.retain(|(existing, _)| *existing != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Number of triggers monitoring `name`
    pub fn trigger_count(&self, name: &str) -> usize {
        self.state
            .lock()
            .borrow()
            .triggers
            .get(name)
            .map_or(0, Vec::len)
    }

    /// Run `operation` with the board locked, so a read-modify-write
    /// sequence is not interleaved with other threads
    pub fn atomic_operate_on_entry<R>(&self, operation: impl FnOnce(&BlackBoard) -> R) -> R {
        let _guard = self.state.lock();
        operation(self)
    }
}

impl fmt::Debug for BlackBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.state.lock();
        let state = guard.borrow();
        f.debug_struct("BlackBoard")
            .field("entries", &state.entries.len())
            .field("triggers", &state.triggers.len())
            .finish()
    }
}
