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

//! Demo services managed by the sandbox registry.

use atrium_core::{Lifecycle, Service, ServiceError, ServiceState};
use atrium_registry::ServiceRegistration;
use std::any::Any;
use std::time::Instant;

/// Counts frames and tracks how long the engine loop has been alive.
#[derive(Default)]
pub struct FrameClockService {
    lifecycle: Lifecycle,
    frames: u64,
    started_at: Option<Instant>,
}

impl FrameClockService {
    /// Marks the beginning of a frame.
    pub fn begin_frame(&mut self) {
        self.lifecycle.transition_to(ServiceState::Running);
        self.frames += 1;
    }

    /// Marks the end of a frame.
    pub fn end_frame(&mut self) {
        self.lifecycle.transition_to(ServiceState::Idle);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Service for FrameClockService {
    fn initialize(&mut self) -> Result<(), ServiceError> {
        if !self.lifecycle.initialize() {
            return Ok(());
        }
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn state(&self) -> ServiceState {
        self.lifecycle.state()
    }

    fn shutdown(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            log::info!(
                "frame clock stopping after {} frame(s) in {:.2?}",
                self.frames,
                started_at.elapsed()
            );
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

/// Tracks which assets are resident in memory.
#[derive(Default)]
pub struct AssetCacheService {
    lifecycle: Lifecycle,
    resident: Vec<String>,
}

impl AssetCacheService {
    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    pub fn is_resident(&self, path: &str) -> bool {
        self.resident.iter().any(|entry| entry == path)
    }

    /// Pins an asset into the cache.
    pub fn retain(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.is_resident(&path) {
            log::debug!("asset '{path}' now resident");
            self.resident.push(path);
        }
    }
}

impl Service for AssetCacheService {
    fn initialize(&mut self) -> Result<(), ServiceError> {
        if !self.lifecycle.initialize() {
            return Ok(());
        }
        // Warm the cache with the assets every scene needs.
        self.retain("shaders/forward.wgsl");
        self.retain("audio/ui_click.ogg");
        Ok(())
    }

    fn state(&self) -> ServiceState {
        self.lifecycle.state()
    }

    fn shutdown(&mut self) {
        log::info!("evicting {} resident asset(s)", self.resident.len());
        self.resident.clear();
        self.lifecycle.reset();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Buffers per-frame marks for replay capture.
///
/// Excluded from auto-start: capture costs memory, so the host opts in
/// explicitly.
#[derive(Default)]
pub struct ReplayCaptureService {
    lifecycle: Lifecycle,
    marks: Vec<(u64, usize)>,
}

impl ReplayCaptureService {
    /// Records one frame's mark: frame number and resident asset count.
    pub fn record(&mut self, frame: u64, resident_assets: usize) {
        self.marks.push((frame, resident_assets));
    }

    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }
}

impl Service for ReplayCaptureService {
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
        log::info!("flushing {} replay mark(s)", self.marks.len());
        self.marks.clear();
        self.lifecycle.reset();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

inventory::submit! {
    ServiceRegistration::auto::<FrameClockService>("FrameClockService")
}

inventory::submit! {
    ServiceRegistration::auto::<AssetCacheService>("AssetCacheService")
}

inventory::submit! {
    ServiceRegistration::manual::<ReplayCaptureService>("ReplayCaptureService")
}
