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

//! One-time initialization guard and state tracking for services.

use crate::service::state::ServiceState;

/// Tracks the initialization flag and lifecycle state a concrete service
/// embeds.
///
/// Every service type gets its own independent `Lifecycle` value simply by
/// holding one as a field; there is no shared or per-type static storage.
/// Typical use inside [`Service::initialize`](crate::Service::initialize):
///
/// ```rust
/// # use atrium_core::{Lifecycle, ServiceError};
/// # struct AudioMixer { lifecycle: Lifecycle }
/// # impl AudioMixer {
/// fn initialize(&mut self) -> Result<(), ServiceError> {
///     if !self.lifecycle.initialize() {
///         return Ok(());
///     }
///     // one-time setup goes here
///     Ok(())
/// }
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    state: ServiceState,
    initialized: bool,
}

impl Lifecycle {
    /// Creates a fresh, never-initialized lifecycle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One-time initialization guard.
    ///
    /// The first call flips the service to initialized and
    /// [`ServiceState::Idle`] and returns `true`. Every later call returns
    /// `false`, letting the caller bail out immediately and keep
    /// `initialize` idempotent.
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        self.state = ServiceState::Idle;
        true
    }

    /// Whether the one-time initialization already ran.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Applies a validated state transition.
    ///
    /// Invalid transitions are rejected, logged at warn, and leave the
    /// state unchanged.
    pub fn transition_to(&mut self, next: ServiceState) -> bool {
        if !self.state.can_transition_to(next) {
            log::warn!("invalid service state transition {} -> {}", self.state, next);
            return false;
        }
        self.state = next;
        true
    }

    /// Returns the lifecycle to `Inactive` and clears the initialized flag.
    ///
    /// This is the teardown escape hatch, not a transition: it bypasses
    /// [`ServiceState::can_transition_to`] so a service torn down from any
    /// state can report itself dead.
    pub fn reset(&mut self) {
        self.initialized = false;
        self.state = ServiceState::Inactive;
    }
}
