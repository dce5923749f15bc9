// Copyright 2026 Daniel Pelikan
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

//! Readiness checks gating a scan.
//!
//! The checks always run in the same order and stop at the first one that
//! fails: adapter present, location permission, location services, radio.

use anyhow::Result;

use crate::platform::{BluetoothService, LocationService, PermissionService, Platform};

/// Verdict of a readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// No adapter; scanning is unavailable for this session.
    Unsupported,
    /// The location permission has to be requested.
    PermissionRequired,
    /// Location services have to be turned on in settings.
    LocationServicesRequired,
    /// The radio is powered off.
    RadioOff,
    /// Everything holds; a scan may start.
    Ready,
}

impl Readiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::Unsupported => "Unsupported",
            Readiness::PermissionRequired => "Permission required",
            Readiness::LocationServicesRequired => "Location services required",
            Readiness::RadioOff => "Bluetooth off",
            Readiness::Ready => "Ready",
        }
    }
}

/// Point-in-time view of every readiness condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessState {
    pub bluetooth_supported: bool,
    pub location_permission_granted: bool,
    pub gps_enabled: bool,
    pub bluetooth_enabled: bool,
}

impl ReadinessState {
    /// Query every condition, without short-circuiting.
    pub async fn snapshot<P: Platform>(platform: &P) -> Result<Self> {
        let bluetooth_supported = platform.bluetooth().is_present();
        let bluetooth_enabled = if bluetooth_supported {
            platform.bluetooth().is_enabled().await?
        } else {
            false
        };

        Ok(Self {
            bluetooth_supported,
            location_permission_granted: platform.permissions().is_location_granted(),
            gps_enabled: platform.location().services_enabled(),
            bluetooth_enabled,
        })
    }

    /// The verdict [`check`] would reach for this state.
    pub fn verdict(&self) -> Readiness {
        if !self.bluetooth_supported {
            Readiness::Unsupported
        } else if !self.location_permission_granted {
            Readiness::PermissionRequired
        } else if !self.gps_enabled {
            Readiness::LocationServicesRequired
        } else if !self.bluetooth_enabled {
            Readiness::RadioOff
        } else {
            Readiness::Ready
        }
    }
}

/// Run the checks against live platform state, querying only as far as
/// the first failing condition.
pub async fn check<P: Platform>(platform: &P) -> Result<Readiness> {
    if !platform.bluetooth().is_present() {
        return Ok(Readiness::Unsupported);
    }
    if !platform.permissions().is_location_granted() {
        return Ok(Readiness::PermissionRequired);
    }
    if !platform.location().services_enabled() {
        return Ok(Readiness::LocationServicesRequired);
    }
    if !platform.bluetooth().is_enabled().await? {
        return Ok(Readiness::RadioOff);
    }
    Ok(Readiness::Ready)
}
