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

//! The worker pool itself.

use super::counter::{lock, Counter, CounterHandle, CounterTable};
use super::{Job, JobError, JobSystemConfig};
use crossbeam_channel::{Receiver, SendError, Sender};
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How long a helping waiter sleeps when the queue is empty before re-checking.
const HELP_POLL_INTERVAL: Duration = Duration::from_micros(200);

thread_local! {
    static IS_WORKER: Cell<bool> = const { Cell::new(false) };
}

struct Task {
    job: Job<'static>,
    counter: Arc<Counter>,
}

fn execute(task: Task) {
    let Task { job, counter } = task;
    let result = panic::catch_unwind(AssertUnwindSafe(job));
    if result.is_err() {
        log::error!(
            "Job panicked on thread '{}'",
            thread::current().name().unwrap_or("<unnamed>")
        );
    }
    counter.complete(result.is_err());
}

fn worker_loop(index: usize, receiver: Receiver<Task>) {
    IS_WORKER.with(|flag| flag.set(true));
    log::debug!("Worker {index} started.");
    // `recv` keeps returning queued tasks after the sender is gone, so the
    // queue is drained before the worker exits.
    while let Ok(task) = receiver.recv() {
        execute(task);
    }
    log::debug!("Worker {index} stopped.");
}

/// A fixed pool of worker threads consuming a shared job queue.
///
/// Dropping the system closes the queue, lets the workers finish everything
/// already queued and joins them.
pub struct JobSystem {
    config: JobSystemConfig,
    sender: Option<Sender<Task>>,
    receiver: Receiver<Task>,
    counters: Mutex<CounterTable>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl JobSystem {
    /// Validates `config` and starts the worker threads.
    pub fn new(config: JobSystemConfig) -> Result<Self, JobError> {
        config.validate()?;

        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut system = Self {
            config,
            sender: Some(sender),
            receiver,
            counters: Mutex::new(CounterTable::with_capacity(config.fiber_count)),
            workers: Vec::with_capacity(config.worker_count),
        };

        for index in 0..config.worker_count {
            let receiver = system.receiver.clone();
            // On failure `system` is dropped here, which joins the workers
            // spawned so far.
            let handle = thread::Builder::new()
                .name(format!("vireo-worker-{index}"))
                .stack_size(config.fiber_stack_size)
                .spawn(move || worker_loop(index, receiver))
                .map_err(|e| JobError::SpawnFailed(e.to_string()))?;
            system.workers.push(handle);
        }

        log::info!(
            "Job system started: {} workers, {} counters, {} KiB stacks.",
            config.worker_count,
            config.fiber_count,
            config.fiber_stack_size / 1024
        );
        Ok(system)
    }

    /// The configuration the pool was started with.
    pub fn config(&self) -> &JobSystemConfig {
        &self.config
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of counters currently allocated.
    pub fn outstanding_counters(&self) -> usize {
        lock(&self.counters).in_use()
    }

    /// Returns `true` when called from one of this crate's worker threads.
    pub fn is_worker_thread() -> bool {
        IS_WORKER.with(|flag| flag.get())
    }

    /// Enqueues a batch of jobs and returns immediately.
    ///
    /// The returned handle must eventually be freed with one of the
    /// `*_and_free` waits. An empty batch yields an already-completed counter.
    pub fn run_jobs(&self, jobs: Vec<Job<'static>>) -> Result<CounterHandle, JobError> {
        let sender = self.sender.as_ref().ok_or(JobError::ShutDown)?;
        let (handle, counter) = self.allocate(jobs.len())?;
        for job in jobs {
            Self::submit(sender, job, &counter);
        }
        Ok(handle)
    }

    /// Waits until the counter is `<= target`, executing queued jobs meanwhile.
    pub fn wait_for_counter(&self, handle: CounterHandle, target: usize) -> Result<(), JobError> {
        let counter = self.lookup(handle)?;
        self.help_until(&counter, target);
        Ok(())
    }

    /// Same as [`wait_for_counter`](Self::wait_for_counter), then frees the handle.
    ///
    /// Returns [`JobError::JobPanicked`] if any job of the batch panicked.
    pub fn wait_for_counter_and_free(
        &self,
        handle: CounterHandle,
        target: usize,
    ) -> Result<(), JobError> {
        self.wait_for_counter(handle, target)?;
        self.free(handle)
    }

    /// Blocks the calling thread, without helping, until the batch is done,
    /// then frees the handle.
    pub fn wait_for_counter_and_free_without_fiber(
        &self,
        handle: CounterHandle,
    ) -> Result<(), JobError> {
        let counter = self.lookup(handle)?;
        counter.wait_until(0);
        self.free(handle)
    }

    /// Runs a batch of jobs that may borrow from the caller and returns once
    /// all of them have finished.
    ///
    /// On a worker thread the caller helps drain the queue; elsewhere it
    /// blocks.
    pub fn run_scoped<'scope>(&self, jobs: Vec<Job<'scope>>) -> Result<(), JobError> {
        if jobs.is_empty() {
            return Ok(());
        }
        let sender = self.sender.as_ref().ok_or(JobError::ShutDown)?;
        let (handle, counter) = self.allocate(jobs.len())?;

        for job in jobs {
            // SAFETY: the lifetime is only erased for the time the job sits in
            // the queue. Nothing below can return before the counter reaches
            // zero, so every borrow captured by the job outlives its execution.
            let job: Job<'static> =
                unsafe { std::mem::transmute::<Job<'scope>, Job<'static>>(job) };
            Self::submit(sender, job, &counter);
        }

        if Self::is_worker_thread() {
            self.help_until(&counter, 0);
        } else {
            counter.wait_until(0);
        }
        self.free(handle)
    }

    fn submit(sender: &Sender<Task>, job: Job<'static>, counter: &Arc<Counter>) {
        let task = Task {
            job,
            counter: Arc::clone(counter),
        };
        // The pool keeps a receiver alive, so this only fails if the channel
        // is torn down; run the job inline so the counter still completes.
        if let Err(SendError(task)) = sender.send(task) {
            execute(task);
        }
    }

    fn allocate(&self, jobs: usize) -> Result<(CounterHandle, Arc<Counter>), JobError> {
        let mut table = lock(&self.counters);
        let capacity = table.capacity();
        table
            .allocate(jobs)
            .ok_or(JobError::CounterPoolExhausted { capacity })
    }

    fn lookup(&self, handle: CounterHandle) -> Result<Arc<Counter>, JobError> {
        lock(&self.counters)
            .get(handle)
            .ok_or(JobError::InvalidCounter(handle))
    }

    fn free(&self, handle: CounterHandle) -> Result<(), JobError> {
        let counter = lock(&self.counters)
            .free(handle)
            .ok_or(JobError::InvalidCounter(handle))?;
        match counter.panicked() {
            0 => Ok(()),
            count => Err(JobError::JobPanicked { count }),
        }
    }

    fn help_until(&self, counter: &Counter, target: usize) {
        while counter.value() > target {
            match self.receiver.try_recv() {
                Ok(task) => execute(task),
                Err(_) => {
                    counter.wait_timeout(target, HELP_POLL_INTERVAL);
                }
            }
        }
    }
}

impl fmt::Debug for JobSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobSystem")
            .field("config", &self.config)
            .field("workers", &self.workers.len())
            .field("queued", &self.receiver.len())
            .finish()
    }
}

impl Drop for JobSystem {
    fn drop(&mut self) {
        self.sender.take();
        let current = thread::current().id();
        for handle in self.workers.drain(..) {
            // The last reference may be released by a job running on a worker.
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                log::error!("A job system worker terminated abnormally.");
            }
        }
        log::info!("Job system shut down.");
    }
}
