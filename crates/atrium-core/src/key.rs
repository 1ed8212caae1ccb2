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

//! Stable type identity for registered services.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a service by its concrete Rust type.
///
/// The [`TypeId`] is the identity; the type name rides along purely for
/// log lines and error messages. Equality and hashing consider the
/// `TypeId` only, so two keys built for the same type always collide
/// regardless of how their names render.
#[derive(Debug, Clone, Copy)]
pub struct ServiceKey {
    type_id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    /// Builds the key for the concrete type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The full type name, including the module path.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path, for compact log lines.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AudioMixer;
    struct InputRouter;

    #[test]
    fn same_type_keys_are_equal() {
        assert_eq!(ServiceKey::of::<AudioMixer>(), ServiceKey::of::<AudioMixer>());
    }

    #[test]
    fn distinct_type_keys_differ() {
        assert_ne!(ServiceKey::of::<AudioMixer>(), ServiceKey::of::<InputRouter>());
    }

    #[test]
    fn short_name_strips_module_path() {
        let key = ServiceKey::of::<AudioMixer>();
        assert_eq!(key.short_name(), "AudioMixer");
        assert!(key.name().ends_with("AudioMixer"));
        assert_eq!(format!("{key}"), "AudioMixer");
    }
}
