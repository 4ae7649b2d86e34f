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

//! A fixed-size worker pool with completion counters.
//!
//! Work is submitted in batches. Each batch gets a [`CounterHandle`] that
//! reaches zero once every job of the batch has run. Waiting on a counter
//! from inside a job does not block the worker: the waiting thread keeps
//! executing queued jobs until its condition holds, so nested batches cannot
//! starve the pool.

mod counter;
mod error;
mod system;

pub use counter::CounterHandle;
pub use error::JobError;
pub use system::JobSystem;

use serde::{Deserialize, Serialize};

/// A unit of work. `'static` for [`JobSystem::run_jobs`], scoped for
/// [`JobSystem::run_scoped`].
pub type Job<'a> = Box<dyn FnOnce() + Send + 'a>;

/// Upper bound on the number of worker threads.
pub const MAX_WORKER_THREADS: usize = 128;
/// Upper bound on the number of completion counters alive at once.
pub const MAX_FIBERS: usize = 256;
/// Smallest accepted worker stack size.
pub const MIN_FIBER_STACK_SIZE: usize = 64 * 1024;

/// Configuration for the [`JobSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSystemConfig {
    /// Number of worker threads to start.
    pub worker_count: usize,
    /// Number of completion counters (wait contexts) that may be outstanding at once.
    pub fiber_count: usize,
    /// Stack size of each worker thread, in bytes.
    pub fiber_stack_size: usize,
}

impl Default for JobSystemConfig {
    fn default() -> Self {
        let worker_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .min(MAX_WORKER_THREADS);
        Self {
            worker_count,
            fiber_count: 128,
            fiber_stack_size: 256 * 1024,
        }
    }
}

impl JobSystemConfig {
    /// Checks the configuration against the supported limits.
    pub fn validate(&self) -> Result<(), JobError> {
        if !(1..=MAX_WORKER_THREADS).contains(&self.worker_count) {
            return Err(JobError::InvalidConfig(format!(
                "worker_count must be in 1..={MAX_WORKER_THREADS}, got {}",
                self.worker_count
            )));
        }
        if !(1..=MAX_FIBERS).contains(&self.fiber_count) {
            return Err(JobError::InvalidConfig(format!(
                "fiber_count must be in 1..={MAX_FIBERS}, got {}",
                self.fiber_count
            )));
        }
        if self.fiber_stack_size < MIN_FIBER_STACK_SIZE {
            return Err(JobError::InvalidConfig(format!(
                "fiber_stack_size must be at least {MIN_FIBER_STACK_SIZE} bytes, got {}",
                self.fiber_stack_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(JobSystemConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_limits() {
        let base = JobSystemConfig {
            worker_count: 2,
            fiber_count: 16,
            fiber_stack_size: MIN_FIBER_STACK_SIZE,
        };
        assert!(base.validate().is_ok());

        for bad in [
            JobSystemConfig { worker_count: 0, ..base },
            JobSystemConfig { worker_count: MAX_WORKER_THREADS + 1, ..base },
            JobSystemConfig { fiber_count: 0, ..base },
            JobSystemConfig { fiber_count: MAX_FIBERS + 1, ..base },
            JobSystemConfig { fiber_stack_size: MIN_FIBER_STACK_SIZE - 1, ..base },
        ] {
            assert!(matches!(bad.validate(), Err(JobError::InvalidConfig(_))));
        }
    }
}
