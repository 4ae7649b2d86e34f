// Copyright 2025 eraflo
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

//! Completion counters and the generational table that hands them out.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Identifies one submitted batch of jobs.
///
/// A handle is only valid until it is freed. Freeing bumps the generation of
/// its slot, so a stale copy is detected instead of aliasing a newer batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterHandle {
    index: u32,
    generation: u32,
}

impl CounterHandle {
    /// The slot this handle points to.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation of the slot at the time the handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for CounterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The number of jobs of a batch that have not finished yet.
#[derive(Debug)]
pub(crate) struct Counter {
    remaining: AtomicUsize,
    panicked: AtomicUsize,
    lock: Mutex<()>,
    signal: Condvar,
}

impl Counter {
    pub(crate) fn new(jobs: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(jobs),
            panicked: AtomicUsize::new(0),
            lock: Mutex::new(()),
            signal: Condvar::new(),
        }
    }

    #[inline]
    pub(crate) fn value(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub(crate) fn panicked(&self) -> usize {
        self.panicked.load(Ordering::Acquire)
    }

    /// Records one finished job. Called exactly once per job, panicked or not.
    pub(crate) fn complete(&self, panicked: bool) {
        if panicked {
            self.panicked.fetch_add(1, Ordering::AcqRel);
        }
        // Decrement under the lock so a waiter cannot miss the wakeup between
        // its check and its wait.
        let _guard = lock(&self.lock);
        self.remaining.fetch_sub(1, Ordering::AcqRel);
        self.signal.notify_all();
    }

    /// Blocks the calling thread until the counter is `<= target`.
    pub(crate) fn wait_until(&self, target: usize) {
        let mut guard = lock(&self.lock);
        while self.value() > target {
            guard = self
                .signal
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Blocks for at most `timeout`. Returns `true` once the counter is `<= target`.
    pub(crate) fn wait_timeout(&self, target: usize, timeout: Duration) -> bool {
        let guard = lock(&self.lock);
        if self.value() <= target {
            return true;
        }
        let _ = self
            .signal
            .wait_timeout(guard, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        self.value() <= target
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    counter: Option<Arc<Counter>>,
}

/// Fixed-capacity table of live counters.
#[derive(Debug)]
pub(crate) struct CounterTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl CounterTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                counter: None,
            })
            .collect();
        // Reversed so that slot 0 is handed out first.
        let free = (0..capacity as u32).rev().collect();
        Self { slots, free }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Takes a free slot and arms it for `jobs` completions.
    pub(crate) fn allocate(&mut self, jobs: usize) -> Option<(CounterHandle, Arc<Counter>)> {
        let index = self.free.pop()?;
        let slot = &mut self.slots[index as usize];
        let counter = Arc::new(Counter::new(jobs));
        slot.counter = Some(Arc::clone(&counter));
        let handle = CounterHandle {
            index,
            generation: slot.generation,
        };
        Some((handle, counter))
    }

    pub(crate) fn get(&self, handle: CounterHandle) -> Option<Arc<Counter>> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.counter.clone()
    }

    /// Releases the slot. The counter itself lives on while jobs still reference it.
    pub(crate) fn free(&mut self, handle: CounterHandle) -> Option<Arc<Counter>> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let counter = slot.counter.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(counter)
    }
}
