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

//! Error and outcome types for service lifecycle operations.

use crate::service::state::ServiceState;
use std::fmt;

/// An error surfaced by the unchecked registry and lifecycle operations.
///
/// Checked operations (`try_get`, `try_end`, ...) signal failure through
/// their return value and never produce one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// An unchecked lookup found no live service for the type key.
    NotFound {
        /// Type name of the missing service.
        service: &'static str,
    },
    /// A lifecycle operation was attempted in a state that does not allow it.
    InvalidState {
        /// Type name of the service.
        service: &'static str,
        /// The state the service was in when the operation was attempted.
        state: ServiceState,
        /// What was attempted.
        detail: String,
    },
    /// A service's one-time setup reported a failure.
    InitFailed {
        /// Type name of the service.
        service: &'static str,
        /// The failure reported by the service.
        detail: String,
    },
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::NotFound { service } => {
                write!(f, "no live service registered for type '{service}'")
            }
            ServiceError::InvalidState {
                service,
                state,
                detail,
            } => {
                write!(f, "service '{service}' is {state}: {detail}")
            }
            ServiceError::InitFailed { service, detail } => {
                write!(f, "initialization of service '{service}' failed: {detail}")
            }
        }
    }
}

impl std::error::Error for ServiceError {}

/// Outcome of initializing a service in place.
///
/// Replaces unwinding control flow for the expected "not started through
/// the registry yet" condition; real faults surface as
/// [`Err(ServiceError)`](ServiceError).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The attached instance completed its one-time setup.
    Ready,
    /// The instance was already initialized; the call was a no-op.
    AlreadyReady,
    /// No instance was attached for the type. A placeholder was attached as
    /// a repair side effect; the service must be started through the
    /// registry before use.
    NeedsRegistryStart,
}
