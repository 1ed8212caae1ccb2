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

//! The root container that physically owns every service instance.

use atrium_core::{InitOutcome, Service, ServiceError, ServiceKey};
use std::collections::HashMap;
use std::fmt;

/// The single persistent object hosting all live service instances.
///
/// The registry owns zero or one of these. Slots are keyed by
/// [`ServiceKey`]; a slot may exist without a matching registry table
/// entry (a placeholder left behind by a failed direct initialize, see
/// [`initialize_service`](RootContainer::initialize_service)).
pub struct RootContainer {
    label: String,
    persistent: bool,
    slots: HashMap<ServiceKey, Box<dyn Service>>,
}

impl RootContainer {
    /// Creates an empty container with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            persistent: false,
            slots: HashMap::new(),
        }
    }

    /// The container's display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the container has been marked persistent.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Marks the container as living for the rest of the registry's
    /// lifetime. Idempotent.
    pub fn make_persistent(&mut self) {
        if !self.persistent {
            self.persistent = true;
            log::info!("root container '{}' marked persistent", self.label);
        }
    }

    /// Attaches an instance under `key`.
    ///
    /// Refuses (and drops the offered instance) when the slot is already
    /// occupied; callers check [`contains`](RootContainer::contains) first
    /// when they need the existing instance preserved.
    pub fn attach(&mut self, key: ServiceKey, service: Box<dyn Service>) -> bool {
        if self.slots.contains_key(&key) {
            log::warn!("slot for {key} already occupied; attach refused");
            return false;
        }
        self.slots.insert(key, service);
        true
    }

    /// Detaches and returns the instance under `key`, if any.
    pub fn detach(&mut self, key: &ServiceKey) -> Option<Box<dyn Service>> {
        self.slots.remove(key)
    }

    /// The attached instance under `key`, type-erased.
    #[must_use]
    pub fn get(&self, key: &ServiceKey) -> Option<&dyn Service> {
        self.slots.get(key).map(|service| service.as_ref())
    }

    /// Mutable access to the attached instance under `key`, type-erased.
    pub fn get_mut(&mut self, key: &ServiceKey) -> Option<&mut (dyn Service + '_)> {
        self.slots.get_mut(key).map(|service| service.as_mut() as &mut (dyn Service + '_))
    }

    /// The attached instance of concrete type `T`, if any.
    #[must_use]
    pub fn get_as<T: Service + 'static>(&self) -> Option<&T> {
        self.slots
            .get(&ServiceKey::of::<T>())
            .and_then(|service| service.as_any().downcast_ref::<T>())
    }

    /// Mutable access to the attached instance of concrete type `T`.
    pub fn get_as_mut<T: Service + 'static>(&mut self) -> Option<&mut T> {
        self.slots
            .get_mut(&ServiceKey::of::<T>())
            .and_then(|service| service.as_any_mut().downcast_mut::<T>())
    }

    /// Whether an instance is attached under `key`.
    #[must_use]
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of attached instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no instances are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Initializes the instance attached under `key`.
    ///
    /// Live instances report [`InitOutcome::AlreadyReady`] without being
    /// touched. A missing slot is a hard [`ServiceError::NotFound`]; use
    /// [`initialize_service`](RootContainer::initialize_service) for the
    /// repairing variant.
    pub fn initialize_slot(&mut self, key: &ServiceKey) -> Result<InitOutcome, ServiceError> {
        let service = self.slots.get_mut(key).ok_or(ServiceError::NotFound {
            service: key.name(),
        })?;
        if service.state().is_live() {
            return Ok(InitOutcome::AlreadyReady);
        }
        service.initialize()?;
        log::debug!("service {key} initialized");
        Ok(InitOutcome::Ready)
    }

    /// Initializes the attached instance of type `T`, repairing a missing
    /// slot.
    ///
    /// When no instance of `T` is attached, a default-constructed
    /// placeholder is attached as a side effect and the call reports
    /// [`InitOutcome::NeedsRegistryStart`]: the service is structurally
    /// present but must still be started through the registry. A later
    /// registry start finds the placeholder and initializes it in place.
    pub fn initialize_service<T: Service + Default + 'static>(
        &mut self,
    ) -> Result<InitOutcome, ServiceError> {
        let key = ServiceKey::of::<T>();
        if !self.contains(&key) {
            self.attach(key, Box::new(T::default()));
            log::debug!("placeholder for {key} attached; start it through the registry");
            return Ok(InitOutcome::NeedsRegistryStart);
        }
        self.initialize_slot(&key)
    }
}

impl fmt::Debug for RootContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootContainer")
            .field("label", &self.label)
            .field("persistent", &self.persistent)
            .field("services", &self.slots.len())
            .finish()
    }
}
