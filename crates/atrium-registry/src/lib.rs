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

//! # Atrium Registry
//!
//! Management layer for engine services: the [`RootContainer`] that
//! physically owns every instance, the [`ServiceRegistry`] that tracks
//! which services are alive and drives their lifecycle, and the
//! [`ServiceRegistration`] mechanism that replaces runtime reflection
//! with distributed, link-time-collected registrations.

#![warn(missing_docs)]

pub mod registration;
pub mod registry;
pub mod root;

pub use registration::ServiceRegistration;
pub use registry::{DiscoveryPolicy, RegistryConfig, ServiceOrigin, ServiceRegistry};
pub use root::RootContainer;
