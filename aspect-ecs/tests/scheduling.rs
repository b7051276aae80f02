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
//! Scheduler tests
//!
//! Layer ordering, synchronous and asynchronous buckets, phase separation
//! and system lookup.

use aspect_ecs::ecs::systems::{ProcessSystem, ProcessingSystem};
use aspect_ecs::ecs::{ActiveEntities, ExecutionType, System, UpdateType, World};
use aspect_ecs::EcsError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const STEP: Duration = Duration::from_millis(16);

type Log = Arc<Mutex<Vec<&'static str>>>;

struct Recorder {
    label: &'static str,
    log: Log,
}

impl ProcessSystem for Recorder {
    fn process_system(&mut self, _world: &World) {
        self.log.lock().push(self.label);
    }
}

fn recorder(label: &'static str, log: &Log) -> ProcessingSystem<Recorder> {
    ProcessingSystem::new(Recorder {
        label,
        log: Arc::clone(log),
    })
}

#[test]
fn test_layers_run_in_ascending_order() {
    let mut world = World::new();
    let log = Log::default();
    world.set_system(recorder("late", &log), UpdateType::FixedUpdate, 10, ExecutionType::Synchronous);
    world.set_system(recorder("early", &log), UpdateType::FixedUpdate, -5, ExecutionType::Synchronous);
    world.set_system(recorder("middle", &log), UpdateType::FixedUpdate, 0, ExecutionType::Synchronous);
    world.set_system(recorder("middle-2", &log), UpdateType::FixedUpdate, 0, ExecutionType::Synchronous);

    world.fixed_update_with(STEP);
    assert_eq!(*log.lock(), vec!["early", "middle", "middle-2", "late"]);
}

#[test]
fn test_synchronous_bucket_runs_before_asynchronous() {
    let mut world = World::new();
    let log = Log::default();
    world.set_system(recorder("async", &log), UpdateType::FrameUpdate, 0, ExecutionType::Asynchronous);
    world.set_system(recorder("sync", &log), UpdateType::FrameUpdate, 0, ExecutionType::Synchronous);
    world.set_system(recorder("next", &log), UpdateType::FrameUpdate, 1, ExecutionType::Synchronous);

    world.frame_update();
    assert_eq!(*log.lock(), vec!["sync", "async", "next"]);
}

struct Slow {
    done: Arc<AtomicUsize>,
}

impl ProcessSystem for Slow {
    fn process_system(&mut self, _world: &World) {
        thread::sleep(Duration::from_millis(20));
        self.done.fetch_add(1, Ordering::SeqCst);
    }
}

struct Barrier {
    done: Arc<AtomicUsize>,
    observed: Vec<usize>,
}

impl ProcessSystem for Barrier {
    fn process_system(&mut self, _world: &World) {
        self.observed.push(self.done.load(Ordering::SeqCst));
    }
}

#[test]
fn test_asynchronous_bucket_joins_before_next_layer() {
    let mut world = World::new();
    let done = Arc::new(AtomicUsize::new(0));
    for _ in 0..3 {
        world.set_system(
            ProcessingSystem::new(Slow {
                done: Arc::clone(&done),
            }),
            UpdateType::FixedUpdate,
            0,
            ExecutionType::Asynchronous,
        );
    }
    let barrier = world.set_system(
        ProcessingSystem::new(Barrier {
            done: Arc::clone(&done),
            observed: Vec::new(),
        }),
        UpdateType::FixedUpdate,
        1,
        ExecutionType::Synchronous,
    );

    world.fixed_update_with(STEP);
    world.fixed_update_with(STEP);
    assert_eq!(barrier.lock().observed, vec![3, 6]);
}

#[test]
fn test_phases_are_independent() {
    let mut world = World::new();
    let log = Log::default();
    world.set_system(recorder("fixed", &log), UpdateType::FixedUpdate, 0, ExecutionType::Synchronous);
    world.set_system(recorder("frame", &log), UpdateType::FrameUpdate, 0, ExecutionType::Synchronous);

    world.frame_update();
    world.frame_update();
    world.fixed_update_with(STEP);
    assert_eq!(*log.lock(), vec!["frame", "frame", "fixed"]);
}

#[test]
fn test_system_scheduled_in_several_buckets() {
    let mut world = World::new();
    let log = Log::default();
    let handle = world.set_system(recorder("shared", &log), UpdateType::FixedUpdate, 0, ExecutionType::Synchronous);
    world.schedule(&handle, UpdateType::FixedUpdate, 0, ExecutionType::Synchronous);
    world.schedule(&handle, UpdateType::FixedUpdate, 3, ExecutionType::Synchronous);
    world.schedule(&handle, UpdateType::FrameUpdate, 0, ExecutionType::Asynchronous);

    world.fixed_update_with(STEP);
    assert_eq!(log.lock().len(), 2);
    world.frame_update();
    assert_eq!(log.lock().len(), 3);
    assert_eq!(world.system_count(), 1);
}

#[test]
fn test_disabled_system_is_skipped() {
    let mut world = World::new();
    let log = Log::default();
    let handle = world.set_system(recorder("a", &log), UpdateType::FixedUpdate, 0, ExecutionType::Synchronous);

    handle.set_enabled(false);
    world.fixed_update_with(STEP);
    assert!(log.lock().is_empty());

    handle.toggle();
    assert!(handle.is_enabled());
    world.fixed_update_with(STEP);
    assert_eq!(log.lock().len(), 1);
}

struct Counter(usize);

impl System for Counter {
    fn tracks_entities(&self) -> bool {
        false
    }

    fn process_entities(&mut self, _world: &World, _entities: &ActiveEntities) {
        self.0 += 1;
    }
}

struct Other;

impl System for Other {
    fn process_entities(&mut self, _world: &World, _entities: &ActiveEntities) {}
}

#[test]
fn test_get_system_by_type() {
    let world = World::new();
    assert!(matches!(world.get_system::<Counter>(), Err(EcsError::SystemNotFound(_))));

    world.set_system(Counter(0), UpdateType::FixedUpdate, 0, ExecutionType::Synchronous);
    world.set_system(Other, UpdateType::FixedUpdate, 0, ExecutionType::Synchronous);
    let counter = world.get_system::<Counter>().expect("one counter");
    counter.lock().0 = 7;
    assert_eq!(world.get_systems::<Counter>()[0].lock().0, 7);

    world.set_system(Counter(0), UpdateType::FrameUpdate, 0, ExecutionType::Synchronous);
    assert!(matches!(
        world.get_system::<Counter>(),
        Err(EcsError::AmbiguousSystem { count: 2, .. })
    ));
    assert_eq!(world.get_systems::<Counter>().len(), 2);
}

#[derive(Default)]
struct Lifecycle {
    loaded: Arc<AtomicUsize>,
    unloaded: Arc<AtomicUsize>,
}

impl ProcessSystem for Lifecycle {
    fn load_content(&mut self, _world: &World) {
        self.loaded.fetch_add(1, Ordering::SeqCst);
    }

    fn unload_content(&mut self, _world: &World) {
        self.unloaded.fetch_add(1, Ordering::SeqCst);
    }

    fn process_system(&mut self, _world: &World) {}
}

#[test]
fn test_load_and_unload_content() {
    let mut world = World::new();
    let lifecycle = Lifecycle::default();
    let (loaded, unloaded) = (Arc::clone(&lifecycle.loaded), Arc::clone(&lifecycle.unloaded));

    world.initialize_system(
        ProcessingSystem::new(lifecycle),
        UpdateType::FixedUpdate,
        0,
        ExecutionType::Synchronous,
    );
    assert_eq!(loaded.load(Ordering::SeqCst), 1);

    world.unload_content();
    assert_eq!(unloaded.load(Ordering::SeqCst), 1);
    assert_eq!(world.system_count(), 0);

    // nothing left to run
    world.fixed_update_with(STEP);
    assert_eq!(loaded.load(Ordering::SeqCst), 1);
}
