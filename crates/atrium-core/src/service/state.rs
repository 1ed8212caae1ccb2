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

//! Lifecycle states for managed services.

use std::fmt;

/// The lifecycle state of a managed service.
///
/// The core lifecycle only drives `Inactive` and `Idle`; `Running` and
/// `Stopping` are available to services that perform ongoing work and
/// want finer-grained reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceState {
    /// Never initialized.
    #[default]
    Inactive,
    /// Initialized and ready to serve.
    Idle,
    /// Actively performing work.
    Running,
    /// Winding down before returning to `Inactive`.
    Stopping,
}

impl ServiceState {
    /// Whether the service is usable in this state.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, ServiceState::Idle | ServiceState::Running)
    }

    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// Same-state transitions are permitted no-ops.
    #[must_use]
    pub fn can_transition_to(self, next: ServiceState) -> bool {
        use ServiceState::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Inactive, Idle)
                | (Idle, Running)
                | (Running, Idle)
                | (Idle, Stopping)
                | (Running, Stopping)
                | (Stopping, Inactive)
        )
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::Inactive => "inactive",
            ServiceState::Idle => "idle",
            ServiceState::Running => "running",
            ServiceState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}
