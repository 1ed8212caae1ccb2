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

//! The service capability contract and its supporting types.

pub mod error;
pub mod lifecycle;
pub mod state;

use error::ServiceError;
use state::ServiceState;
use std::any::Any;

/// The foundational interface for a singleton-scoped engine service.
///
/// One live instance per concrete type, owned by the root container and
/// managed through the registry. Concrete services usually embed a
/// [`Lifecycle`](crate::Lifecycle) to satisfy the state-machine half of
/// this contract.
pub trait Service: Send + Sync {
    /// Performs the service's one-time setup.
    ///
    /// Must be idempotent: calls after the first successful one are no-ops.
    fn initialize(&mut self) -> Result<(), ServiceError>;

    /// Current lifecycle state.
    fn state(&self) -> ServiceState;

    /// The service's own notion of readiness, independent of the registry
    /// table.
    fn is_ready(&self) -> bool {
        self.state().is_live()
    }

    /// Teardown hook, run by the registry before the instance is destroyed.
    fn shutdown(&mut self) {}

    /// Allows downcasting to concrete service types.
    fn as_any(&self) -> &dyn Any;

    /// Allows mutable downcasting to concrete service types.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
