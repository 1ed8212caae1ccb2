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

//! # Atrium Core
//!
//! Foundational crate containing the service capability contract, the
//! lifecycle state machine, and the error types shared by the Atrium
//! service registry.

#![warn(missing_docs)]

pub mod key;
pub mod service;

pub use key::ServiceKey;
pub use service::error::{InitOutcome, ServiceError};
pub use service::lifecycle::Lifecycle;
pub use service::state::ServiceState;
pub use service::Service;
