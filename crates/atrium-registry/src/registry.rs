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

//! The service registry: live-service table, lifecycle operations, and
//! bootstrap discovery.
//!
//! The registry is an explicit owned object, not a hidden global: the host
//! constructs one at startup and passes it to whatever needs services. All
//! operations run synchronously to completion on the caller's thread; the
//! table and container carry no internal synchronization, so concurrent
//! access requires external serialization.

use crate::registration::{construct_default, ServiceRegistration};
use crate::root::RootContainer;
use atrium_core::{Service, ServiceError, ServiceKey, ServiceState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How bootstrap reacts to a service whose initialization fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiscoveryPolicy {
    /// Abort the pass on the first failure, leaving later registrations
    /// unstarted. This mirrors the historical behavior and is the default.
    #[default]
    FailFast,
    /// Log the failure, discard the failed instance, and continue with the
    /// remaining registrations.
    SkipFailed,
}

/// Configuration for a [`ServiceRegistry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Label given to the root container.
    #[serde(default = "default_root_label")]
    pub root_label: String,
    /// Bootstrap failure policy.
    #[serde(default)]
    pub discovery: DiscoveryPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root_label: default_root_label(),
            discovery: DiscoveryPolicy::default(),
        }
    }
}

impl RegistryConfig {
    /// Parses a configuration from its JSON representation.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn default_root_label() -> String {
    "services".to_string()
}

/// How a live service came to be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOrigin {
    /// Started by bootstrap discovery.
    Discovered,
    /// Started on demand through [`ServiceRegistry::start`] or
    /// [`ServiceRegistry::force_start`].
    Started,
    /// An instance constructed outside the registry and handed in via
    /// [`ServiceRegistry::try_add_external`].
    External,
}

struct ServiceEntry {
    origin: ServiceOrigin,
}

/// The table of live services plus the operations that start, stop, and
/// look them up.
///
/// Invariant: at most one live instance per type key. Instances are
/// physically owned by the registry's [`RootContainer`]; the table records
/// which of them are registered and how they got there.
pub struct ServiceRegistry {
    config: RegistryConfig,
    entries: HashMap<ServiceKey, ServiceEntry>,
    root: Option<RootContainer>,
}

impl ServiceRegistry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            root: None,
        }
    }

    /// The registry's configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Runs one-time service discovery.
    ///
    /// Clears the table, creates a fresh root container, and starts every
    /// collected [`ServiceRegistration`] not excluded from auto-start,
    /// marking the root persistent afterwards. Returns the number of
    /// services started. Initialization failures follow the configured
    /// [`DiscoveryPolicy`].
    pub fn bootstrap(&mut self) -> Result<usize, ServiceError> {
        if !self.entries.is_empty() || self.root.is_some() {
            log::warn!(
                "re-bootstrapping registry; dropping {} live service(s)",
                self.entries.len()
            );
        }
        self.entries.clear();
        self.root = Some(RootContainer::new(self.config.root_label.clone()));
        log::info!(
            "bootstrap: root container '{}' created",
            self.config.root_label
        );

        let mut started = 0usize;
        for registration in inventory::iter::<ServiceRegistration> {
            if !registration.auto_start() {
                log::debug!(
                    "bootstrap: '{}' excluded from auto-start",
                    registration.name()
                );
                continue;
            }
            let key = registration.key();
            match self.start_slot(key, || registration.construct(), ServiceOrigin::Discovered) {
                Ok(()) => started += 1,
                Err(err) => match self.config.discovery {
                    DiscoveryPolicy::FailFast => return Err(err),
                    DiscoveryPolicy::SkipFailed => {
                        log::warn!("bootstrap: skipping '{}': {err}", registration.name());
                        if let Some(root) = self.root.as_mut() {
                            root.detach(&key);
                        }
                    }
                },
            }
        }
        if let Some(root) = self.root.as_mut() {
            root.make_persistent();
        }
        log::info!("bootstrap complete: {started} service(s) started");
        Ok(started)
    }

    /// Whether a live service of type `T` is registered.
    #[must_use]
    pub fn contains<T: Service + 'static>(&self) -> bool {
        self.entries.contains_key(&ServiceKey::of::<T>())
    }

    /// Number of live services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no services are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the keys of all live services.
    pub fn keys(&self) -> impl Iterator<Item = &ServiceKey> {
        self.entries.keys()
    }

    /// The root container, if bootstrap or a start has created it.
    #[must_use]
    pub fn root(&self) -> Option<&RootContainer> {
        self.root.as_ref()
    }

    /// Checked lookup. Never fails; `None` on a miss, state unchanged.
    #[must_use]
    pub fn try_get<T: Service + 'static>(&self) -> Option<&T> {
        let key = ServiceKey::of::<T>();
        if !self.entries.contains_key(&key) {
            return None;
        }
        let found = self.root.as_ref().and_then(|root| root.get_as::<T>());
        if found.is_none() {
            log::warn!("table entry for {key} has no backing instance");
        }
        found
    }

    /// Checked mutable lookup.
    pub fn try_get_mut<T: Service + 'static>(&mut self) -> Option<&mut T> {
        let key = ServiceKey::of::<T>();
        if !self.entries.contains_key(&key) {
            return None;
        }
        self.root.as_mut().and_then(|root| root.get_as_mut::<T>())
    }

    /// Unchecked lookup; [`ServiceError::NotFound`] when absent.
    pub fn get<T: Service + 'static>(&self) -> Result<&T, ServiceError> {
        self.try_get::<T>().ok_or(ServiceError::NotFound {
            service: ServiceKey::of::<T>().name(),
        })
    }

    /// Unchecked mutable lookup; [`ServiceError::NotFound`] when absent.
    pub fn get_mut<T: Service + 'static>(&mut self) -> Result<&mut T, ServiceError> {
        self.try_get_mut::<T>().ok_or(ServiceError::NotFound {
            service: ServiceKey::of::<T>().name(),
        })
    }

    /// Returns the live instance of `T`, force-starting one if absent.
    ///
    /// The only lookup guaranteed to hand back a live instance; it fails
    /// only when a fresh instance's initialization faults.
    pub fn get_required<T: Service + Default + 'static>(
        &mut self,
    ) -> Result<&mut T, ServiceError> {
        if self.contains::<T>() {
            return self.get_mut::<T>();
        }
        self.force_start::<T>()
    }

    /// Starts a service of type `T`.
    ///
    /// Returns `Ok(false)` without touching anything when `T` is already
    /// live. Otherwise attaches a new instance (reusing a placeholder slot
    /// when one is present), initializes it, and registers it. An
    /// initialization fault propagates and leaves the table unchanged.
    pub fn start<T: Service + Default + 'static>(&mut self) -> Result<bool, ServiceError> {
        let key = ServiceKey::of::<T>();
        if self.entries.contains_key(&key) {
            return Ok(false);
        }
        self.start_slot(key, construct_default::<T>, ServiceOrigin::Started)?;
        Ok(true)
    }

    /// Ends the service of type `T`: runs its shutdown hook, removes the
    /// table entry, and destroys the instance.
    ///
    /// [`ServiceError::NotFound`] when `T` is not live; see
    /// [`try_end`](ServiceRegistry::try_end) for the checked variant.
    pub fn end<T: Service + 'static>(&mut self) -> Result<(), ServiceError> {
        let key = ServiceKey::of::<T>();
        if self.end_key(&key) {
            Ok(())
        } else {
            Err(ServiceError::NotFound {
                service: key.name(),
            })
        }
    }

    /// Checked variant of [`end`](ServiceRegistry::end): `false` when `T`
    /// is not live.
    pub fn try_end<T: Service + 'static>(&mut self) -> bool {
        self.end_key(&ServiceKey::of::<T>())
    }

    /// Ends any live instance of `T`, then starts and returns a fresh one.
    ///
    /// The returned instance is guaranteed to be new: a live instance is
    /// shut down and destroyed first, and an orphan placeholder slot is
    /// discarded rather than reused.
    pub fn force_start<T: Service + Default + 'static>(
        &mut self,
    ) -> Result<&mut T, ServiceError> {
        let key = ServiceKey::of::<T>();
        self.end_key(&key);
        if let Some(root) = self.root.as_mut() {
            root.detach(&key);
        }
        self.start_slot(key, construct_default::<T>, ServiceOrigin::Started)?;
        self.get_mut::<T>()
    }

    /// Registers an instance constructed outside the registry.
    ///
    /// Returns `Ok(false)` when `T` is already live, in which case the
    /// offered instance is dropped and the stored one is untouched.
    /// Otherwise the instance is attached to the root (replacing any orphan
    /// placeholder) and registered; with `initialize` set, its one-time
    /// setup runs after registration, so a setup fault propagates with the
    /// service still registered.
    pub fn try_add_external<T: Service + 'static>(
        &mut self,
        service: T,
        initialize: bool,
    ) -> Result<bool, ServiceError> {
        let key = ServiceKey::of::<T>();
        if self.entries.contains_key(&key) {
            log::debug!("external add refused: {key} already live");
            return Ok(false);
        }
        let root = self.ensure_root();
        root.detach(&key);
        root.attach(key, Box::new(service));
        self.entries.insert(
            key,
            ServiceEntry {
                origin: ServiceOrigin::External,
            },
        );
        log::info!("external service {key} registered");
        if initialize {
            if let Some(root) = self.root.as_mut() {
                root.initialize_slot(&key)?;
            }
        }
        Ok(true)
    }

    /// Removes `T` from registry control without running its shutdown
    /// hook, handing the instance to the caller.
    ///
    /// `None` when `T` is not live. The caller takes ownership; the
    /// registry treats the service as gone.
    pub fn release<T: Service + 'static>(&mut self) -> Option<Box<dyn Service>> {
        let key = ServiceKey::of::<T>();
        self.entries.remove(&key)?;
        let instance = self.root.as_mut().and_then(|root| root.detach(&key));
        log::info!("service {key} released from registry control");
        instance
    }

    /// Reports that a service was torn down outside the registry.
    ///
    /// The table entry and the backing slot are discarded without the
    /// shutdown hook running, so teardown logic cannot run twice. Returns
    /// `false` when no live service matched the key.
    pub fn notify_teardown(&mut self, key: &ServiceKey) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }
        if let Some(root) = self.root.as_mut() {
            root.detach(key);
        }
        log::info!("service {key} removed after external teardown");
        true
    }

    /// Lifecycle state of the live service of type `T`, if any.
    #[must_use]
    pub fn state_of<T: Service + 'static>(&self) -> Option<ServiceState> {
        let key = ServiceKey::of::<T>();
        if !self.entries.contains_key(&key) {
            return None;
        }
        self.root
            .as_ref()
            .and_then(|root| root.get(&key))
            .map(|service| service.state())
    }

    /// How the live service of type `T` was registered, if any.
    #[must_use]
    pub fn origin_of<T: Service + 'static>(&self) -> Option<ServiceOrigin> {
        self.entries
            .get(&ServiceKey::of::<T>())
            .map(|entry| entry.origin)
    }

    fn ensure_root(&mut self) -> &mut RootContainer {
        if self.root.is_none() {
            log::info!("root container '{}' created", self.config.root_label);
        }
        let label = &self.config.root_label;
        self.root
            .get_or_insert_with(|| RootContainer::new(label.clone()))
    }

    fn start_slot(
        &mut self,
        key: ServiceKey,
        construct: impl FnOnce() -> Box<dyn Service>,
        origin: ServiceOrigin,
    ) -> Result<(), ServiceError> {
        let root = self.ensure_root();
        if root.contains(&key) {
            log::debug!("reusing attached placeholder for {key}");
        } else {
            root.attach(key, construct());
        }
        root.initialize_slot(&key)?;
        self.entries.insert(key, ServiceEntry { origin });
        log::info!("service {key} started ({origin:?})");
        Ok(())
    }

    fn end_key(&mut self, key: &ServiceKey) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }
        if let Some(mut service) = self.root.as_mut().and_then(|root| root.detach(key)) {
            service.shutdown();
        }
        log::info!("service {key} ended");
        true
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::{InitOutcome, Lifecycle};
    use std::any::Any;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    static NEXT_SERIAL: AtomicU32 = AtomicU32::new(1);

    struct ProbeService {
        lifecycle: Lifecycle,
        serial: u32,
        shutdown_flag: Option<Arc<AtomicBool>>,
    }

    impl Default for ProbeService {
        fn default() -> Self {
            Self {
                lifecycle: Lifecycle::new(),
                serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
                shutdown_flag: None,
            }
        }
    }

    impl Service for ProbeService {
        fn initialize(&mut self) -> Result<(), ServiceError> {
            if !self.lifecycle.initialize() {
                return Ok(());
            }
            Ok(())
        }

        fn state(&self) -> ServiceState {
            self.lifecycle.state()
        }

        fn shutdown(&mut self) {
            if let Some(flag) = &self.shutdown_flag {
                flag.store(true, Ordering::Relaxed);
            }
            self.lifecycle.reset();
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct FussyService {
        lifecycle: Lifecycle,
    }

    impl Service for FussyService {
        fn initialize(&mut self) -> Result<(), ServiceError> {
            Err(ServiceError::InitFailed {
                service: "FussyService",
                detail: "backing device unavailable".to_string(),
            })
        }

        fn state(&self) -> ServiceState {
            self.lifecycle.state()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_try_get_never_started_is_none() {
        let registry = ServiceRegistry::new();
        assert!(registry.try_get::<ProbeService>().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_unchecked_not_found() {
        let registry = ServiceRegistry::new();
        assert!(matches!(
            registry.get::<ProbeService>(),
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_start_twice_keeps_single_entry() {
        let mut registry = ServiceRegistry::new();
        assert!(registry.start::<ProbeService>().unwrap());
        let serial = registry.get::<ProbeService>().unwrap().serial;

        assert!(!registry.start::<ProbeService>().unwrap());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get::<ProbeService>().unwrap().serial, serial);
    }

    #[test]
    fn test_started_service_is_idle() {
        let mut registry = ServiceRegistry::new();
        registry.start::<ProbeService>().unwrap();
        assert_eq!(registry.state_of::<ProbeService>(), Some(ServiceState::Idle));
        assert_eq!(
            registry.origin_of::<ProbeService>(),
            Some(ServiceOrigin::Started)
        );
    }

    #[test]
    fn test_end_then_lookup_misses() {
        let mut registry = ServiceRegistry::new();
        registry.start::<ProbeService>().unwrap();
        registry.end::<ProbeService>().unwrap();
        assert!(registry.try_get::<ProbeService>().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_end_runs_shutdown_hook() {
        let mut registry = ServiceRegistry::new();
        let flag = Arc::new(AtomicBool::new(false));
        let service = ProbeService {
            shutdown_flag: Some(Arc::clone(&flag)),
            ..Default::default()
        };
        registry.try_add_external(service, true).unwrap();
        assert!(registry.try_end::<ProbeService>());
        assert!(flag.load(Ordering::Relaxed), "end must run the shutdown hook");
    }

    #[test]
    fn test_unchecked_end_missing_errors() {
        let mut registry = ServiceRegistry::new();
        assert!(matches!(
            registry.end::<ProbeService>(),
            Err(ServiceError::NotFound { .. })
        ));
        assert!(!registry.try_end::<ProbeService>());
    }

    #[test]
    fn test_force_start_yields_new_identity() {
        let mut registry = ServiceRegistry::new();
        registry.start::<ProbeService>().unwrap();
        let before = registry.get::<ProbeService>().unwrap().serial;

        let after = registry.force_start::<ProbeService>().unwrap().serial;
        assert_ne!(before, after);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.state_of::<ProbeService>(), Some(ServiceState::Idle));
    }

    #[test]
    fn test_force_start_without_prior_instance() {
        let mut registry = ServiceRegistry::new();
        let service = registry.force_start::<ProbeService>().unwrap();
        assert!(service.is_ready());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_external_add_then_get_same_instance() {
        let mut registry = ServiceRegistry::new();
        let service = ProbeService::default();
        let serial = service.serial;

        assert!(registry.try_add_external(service, false).unwrap());
        assert_eq!(registry.get::<ProbeService>().unwrap().serial, serial);
        assert_eq!(
            registry.origin_of::<ProbeService>(),
            Some(ServiceOrigin::External)
        );
        assert_eq!(
            registry.state_of::<ProbeService>(),
            Some(ServiceState::Inactive),
            "external add without initialize must leave the service untouched"
        );
    }

    #[test]
    fn test_external_add_duplicate_keeps_first() {
        let mut registry = ServiceRegistry::new();
        let first = ProbeService::default();
        let serial = first.serial;
        registry.try_add_external(first, true).unwrap();

        let added = registry
            .try_add_external(ProbeService::default(), true)
            .unwrap();
        assert!(!added);
        assert_eq!(registry.get::<ProbeService>().unwrap().serial, serial);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_external_add_can_initialize() {
        let mut registry = ServiceRegistry::new();
        registry
            .try_add_external(ProbeService::default(), true)
            .unwrap();
        assert_eq!(registry.state_of::<ProbeService>(), Some(ServiceState::Idle));
    }

    #[test]
    fn test_get_required_force_starts_on_miss() {
        let mut registry = ServiceRegistry::new();
        assert!(!registry.contains::<ProbeService>());
        let serial = registry.get_required::<ProbeService>().unwrap().serial;
        assert!(registry.contains::<ProbeService>());

        // A second call returns the existing instance.
        assert_eq!(registry.get_required::<ProbeService>().unwrap().serial, serial);
    }

    #[test]
    fn test_release_skips_shutdown_hook() {
        let mut registry = ServiceRegistry::new();
        let flag = Arc::new(AtomicBool::new(false));
        let service = ProbeService {
            shutdown_flag: Some(Arc::clone(&flag)),
            ..Default::default()
        };
        registry.try_add_external(service, true).unwrap();

        let released = registry.release::<ProbeService>().unwrap();
        assert!(!flag.load(Ordering::Relaxed), "release must not run shutdown");
        assert!(released.as_any().downcast_ref::<ProbeService>().is_some());
        assert!(released.is_ready(), "released instance stays live");
        assert!(registry.try_get::<ProbeService>().is_none());
    }

    #[test]
    fn test_notify_teardown_forgets_service() {
        let mut registry = ServiceRegistry::new();
        let flag = Arc::new(AtomicBool::new(false));
        let service = ProbeService {
            shutdown_flag: Some(Arc::clone(&flag)),
            ..Default::default()
        };
        registry.try_add_external(service, true).unwrap();

        let key = ServiceKey::of::<ProbeService>();
        assert!(registry.notify_teardown(&key));
        assert!(registry.try_get::<ProbeService>().is_none());
        assert!(
            !flag.load(Ordering::Relaxed),
            "externally torn-down services must not be shut down again"
        );
        assert!(!registry.notify_teardown(&key));
    }

    #[test]
    fn test_start_failure_leaves_table_unchanged() {
        let mut registry = ServiceRegistry::new();
        assert!(matches!(
            registry.start::<FussyService>(),
            Err(ServiceError::InitFailed { .. })
        ));
        assert!(!registry.contains::<FussyService>());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_start_adopts_placeholder_slot() {
        let mut registry = ServiceRegistry::new();
        // A direct initialize attempt leaves a placeholder behind.
        let outcome = registry
            .ensure_root()
            .initialize_service::<ProbeService>()
            .unwrap();
        assert_eq!(outcome, InitOutcome::NeedsRegistryStart);
        assert!(!registry.contains::<ProbeService>());

        // Starting afterwards adopts the placeholder instead of replacing it.
        let placeholder_serial = registry
            .root()
            .and_then(|root| root.get_as::<ProbeService>())
            .map(|service| service.serial)
            .unwrap();
        assert!(registry.start::<ProbeService>().unwrap());
        assert_eq!(
            registry.get::<ProbeService>().unwrap().serial,
            placeholder_serial
        );
        assert_eq!(registry.state_of::<ProbeService>(), Some(ServiceState::Idle));
    }

    #[test]
    fn test_bootstrap_without_registrations() {
        // The unit-test binary submits no registrations, so bootstrap only
        // sets up the root container.
        let mut registry = ServiceRegistry::new();
        let started = registry.bootstrap().unwrap();
        assert_eq!(started, 0);
        let root = registry.root().unwrap();
        assert!(root.is_persistent());
        assert_eq!(root.label(), "services");
    }

    #[test]
    fn test_config_from_json_applies_defaults() {
        let config = RegistryConfig::from_json("{}").unwrap();
        assert_eq!(config.root_label, "services");
        assert_eq!(config.discovery, DiscoveryPolicy::FailFast);

        let config =
            RegistryConfig::from_json(r#"{"root_label":"engine","discovery":"SkipFailed"}"#)
                .unwrap();
        assert_eq!(config.root_label, "engine");
        assert_eq!(config.discovery, DiscoveryPolicy::SkipFailed);
    }
}
