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

use super::CounterHandle;
use thiserror::Error;

/// Errors reported by the [`JobSystem`](super::JobSystem).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// The configuration passed to `JobSystem::new` is outside the supported limits.
    #[error("Invalid job system configuration: {0}")]
    InvalidConfig(String),
    /// The operating system refused to start a worker thread.
    #[error("Failed to spawn worker thread: {0}")]
    SpawnFailed(String),
    /// Every completion counter is currently allocated.
    #[error("All {capacity} completion counters are in use")]
    CounterPoolExhausted {
        /// The configured number of counters.
        capacity: usize,
    },
    /// The handle was already freed or never came from this job system.
    #[error("Completion counter {0} is stale or unknown")]
    InvalidCounter(CounterHandle),
    /// Jobs of the waited batch panicked. They still counted as completed.
    #[error("{count} job(s) panicked")]
    JobPanicked {
        /// Number of panicking jobs in the batch.
        count: usize,
    },
    /// The worker pool is no longer accepting work.
    #[error("The job system has shut down")]
    ShutDown,
}
