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

//! Distributed service registration consumed by registry bootstrap.
//!
//! Instead of reflecting over the loaded program for service types, each
//! service module contributes a [`ServiceRegistration`] via
//! [`inventory::submit!`]; [`bootstrap`](crate::ServiceRegistry::bootstrap)
//! iterates the collected set.
//!
//! ```rust,ignore
//! inventory::submit! {
//!     ServiceRegistration::auto::<AudioMixerService>("AudioMixerService")
//! }
//! ```

use atrium_core::{Service, ServiceKey};

/// A service type's registration: identity, constructor, and whether
/// bootstrap starts it automatically.
pub struct ServiceRegistration {
    name: &'static str,
    key: fn() -> ServiceKey,
    construct: fn() -> Box<dyn Service>,
    auto_start: bool,
}

impl ServiceRegistration {
    /// Registration for a service started automatically during bootstrap.
    pub const fn auto<T: Service + Default + 'static>(name: &'static str) -> Self {
        Self {
            name,
            key: ServiceKey::of::<T>,
            construct: construct_default::<T>,
            auto_start: true,
        }
    }

    /// Registration for a service excluded from bootstrap.
    ///
    /// Such services are added explicitly by the host, either through
    /// [`try_add_external`](crate::ServiceRegistry::try_add_external) or an
    /// on-demand [`start`](crate::ServiceRegistry::start).
    pub const fn manual<T: Service + Default + 'static>(name: &'static str) -> Self {
        Self {
            name,
            key: ServiceKey::of::<T>,
            construct: construct_default::<T>,
            auto_start: false,
        }
    }

    /// Display name of the registered service.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type key this registration resolves to.
    #[must_use]
    pub fn key(&self) -> ServiceKey {
        (self.key)()
    }

    /// Whether bootstrap starts this service.
    #[must_use]
    pub fn auto_start(&self) -> bool {
        self.auto_start
    }

    /// Constructs a fresh, uninitialized instance.
    #[must_use]
    pub fn construct(&self) -> Box<dyn Service> {
        (self.construct)()
    }
}

inventory::collect!(ServiceRegistration);

pub(crate) fn construct_default<T: Service + Default + 'static>() -> Box<dyn Service> {
    Box::new(T::default())
}
