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

//! Sandbox binary wiring the service registry into a miniature engine loop.
//!
//! Pass an optional JSON config path as the first argument, e.g.
//! `sandbox registry.json` with `{"root_label":"engine","discovery":"SkipFailed"}`.

mod services;

use anyhow::{Context, Result};
use atrium_registry::{RegistryConfig, ServiceRegistry};
use services::{AssetCacheService, FrameClockService, ReplayCaptureService};
use std::env;
use std::fs;

fn main() -> Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading registry config '{path}'"))?;
            RegistryConfig::from_json(&raw)
                .with_context(|| format!("parsing registry config '{path}'"))?
        }
        None => RegistryConfig::default(),
    };

    let mut registry = ServiceRegistry::with_config(config);
    let started = registry.bootstrap()?;
    log::info!("sandbox: {started} service(s) online after bootstrap");

    // Replay capture is excluded from auto-start; opt in explicitly.
    registry.try_add_external(ReplayCaptureService::default(), true)?;

    // A miniature frame loop.
    for _ in 0..5 {
        let frame = {
            let clock = registry.get_mut::<FrameClockService>()?;
            clock.begin_frame();
            clock.frames()
        };
        let resident = registry.get::<AssetCacheService>()?.resident_count();
        registry
            .get_mut::<ReplayCaptureService>()?
            .record(frame, resident);
        registry.get_mut::<FrameClockService>()?.end_frame();
    }

    let cache = registry.get_mut::<AssetCacheService>()?;
    cache.retain("levels/atrium_entrance.scene");
    log::info!(
        "sandbox: cache holds {} asset(s), entrance scene resident: {}",
        cache.resident_count(),
        cache.is_resident("levels/atrium_entrance.scene")
    );

    // What an external scheduler's delayed restart boils down to: end now,
    // make the later synchronous calls when the timer fires.
    registry.end::<ReplayCaptureService>()?;
    let replay = registry.get_required::<ReplayCaptureService>()?;
    log::info!(
        "sandbox: replay capture restarted with {} buffered mark(s)",
        replay.mark_count()
    );

    // Forcing a restart hands back a fresh cache, dropping everything the
    // old instance had pinned.
    let fresh_cache = registry.force_start::<AssetCacheService>()?;
    log::info!(
        "sandbox: asset cache restarted, {} asset(s) resident",
        fresh_cache.resident_count()
    );

    // Orderly shutdown.
    registry.try_end::<ReplayCaptureService>();
    registry.try_end::<AssetCacheService>();
    registry.try_end::<FrameClockService>();
    log::info!("sandbox: {} service(s) still live at exit", registry.len());

    Ok(())
}
